//! Field visibility
//!
//! A field is active when it has no `depends_on`, or when its dependency
//! target is itself active and the predicate holds over the target's
//! answer. An inactive target therefore deactivates every dependent, and
//! dependencies chain transitively. Evaluation walks the schema's
//! topological order so each target is decided before its dependents.

use crate::answer::{AnswerSet, AnswerValue};
use indexmap::IndexSet;
use intake_schema::{FieldId, FormSchema, Predicate};

/// Active subset of a schema's fields for one answer set
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveSet {
    flags: Vec<bool>,
    ids: IndexSet<FieldId>,
}

impl ActiveSet {
    /// Whether field `id` is active
    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    /// Whether the field at schema position `index` is active
    #[inline]
    #[must_use]
    pub fn is_active_at(&self, index: usize) -> bool {
        self.flags.get(index).copied().unwrap_or(false)
    }

    /// Active ids in schema order
    pub fn iter(&self) -> impl Iterator<Item = &FieldId> {
        self.ids.iter()
    }

    /// Number of active fields
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Whether no field is active
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

/// Compute the active field set
///
/// Pure function of `(schema, answers)`.
#[must_use]
pub fn active_fields(schema: &FormSchema, answers: &AnswerSet) -> ActiveSet {
    let mut flags = vec![false; schema.len()];

    for (i, field) in schema.evaluation_order() {
        flags[i] = match &field.depends_on {
            None => true,
            Some(predicate) => {
                let target_active = schema
                    .position(predicate.field.as_str())
                    .is_some_and(|t| flags[t]);
                target_active && holds(predicate, answers.get(predicate.field.as_str()))
            }
        };
    }

    let ids = schema
        .fields()
        .iter()
        .zip(&flags)
        .filter(|(_, active)| **active)
        .map(|(f, _)| f.id.clone())
        .collect();

    ActiveSet { flags, ids }
}

/// Answer of `id` as seen by dependents: unset when the field is inactive
#[must_use]
pub fn effective_answer<'a>(
    schema: &FormSchema,
    active: &ActiveSet,
    answers: &'a AnswerSet,
    id: &str,
) -> Option<&'a AnswerValue> {
    schema
        .position(id)
        .filter(|&i| active.is_active_at(i))
        .and_then(|_| answers.get(id))
}

/// Apply a predicate to an answer
#[must_use]
pub fn holds(predicate: &Predicate, answer: Option<&AnswerValue>) -> bool {
    predicate.test(
        answer.and_then(AnswerValue::as_text),
        answer.and_then(AnswerValue::as_list),
    )
}
