//! Normalized member records

use crate::activity::active_fields;
use crate::answer::{AnswerSet, AnswerValue};
use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use intake_schema::{FieldId, FormSchema};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Identifier of one researcher visit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntryId(Uuid);

impl EntryId {
    /// Fresh random (v4) id
    #[must_use]
    pub fn new_v4() -> Self {
        Self(Uuid::new_v4())
    }

    /// Wrap an existing UUID
    #[inline]
    #[must_use]
    pub fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    /// Inner UUID
    #[inline]
    #[must_use]
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for EntryId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

/// Output value of one field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RecordValue {
    /// Scalar; `""` when inactive or unanswered
    Text(String),
    /// Option names; `[]` when inactive or unanswered
    List(Vec<String>),
}

impl RecordValue {
    /// Text view
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            RecordValue::Text(s) => Some(s),
            RecordValue::List(_) => None,
        }
    }

    /// List view
    #[must_use]
    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            RecordValue::Text(_) => None,
            RecordValue::List(items) => Some(items),
        }
    }

    /// Cell text, joining lists with `separator`
    #[must_use]
    pub fn flatten(&self, separator: &str) -> String {
        match self {
            RecordValue::Text(s) => s.clone(),
            RecordValue::List(items) => items.join(separator),
        }
    }
}

/// Schema-complete output of one member form
///
/// `values` holds every schema field id exactly once, in schema order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberRecord {
    /// Owning visit
    pub entry_id: EntryId,
    /// When the member form was completed
    pub submitted_at: DateTime<Utc>,
    /// Field values
    #[serde(flatten)]
    pub values: IndexMap<FieldId, RecordValue>,
}

impl MemberRecord {
    /// Value of one field
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&RecordValue> {
        self.values.get(id)
    }

    /// Field ids in output order
    pub fn keys(&self) -> impl Iterator<Item = &FieldId> {
        self.values.keys()
    }
}

/// Produce the record for a completed answer set
///
/// Inactive and unanswered fields take their kind's default. An active
/// answer whose shape does not match the field kind is also defaulted;
/// validation reports it separately.
#[must_use]
pub fn normalize(
    schema: &FormSchema,
    answers: &AnswerSet,
    entry_id: EntryId,
    now: DateTime<Utc>,
) -> MemberRecord {
    let active = active_fields(schema, answers);

    let values = schema
        .fields()
        .iter()
        .enumerate()
        .map(|(i, field)| {
            let answer = answers.get(field.id.as_str()).filter(|_| active.is_active_at(i));
            let value = match (field.kind.is_list(), answer) {
                (false, Some(AnswerValue::Text(text))) => RecordValue::Text(text.clone()),
                (true, Some(AnswerValue::Many(items))) => RecordValue::List(items.clone()),
                (false, _) => RecordValue::Text(String::new()),
                (true, _) => RecordValue::List(Vec::new()),
            };
            (field.id.clone(), value)
        })
        .collect();

    MemberRecord {
        entry_id,
        submitted_at: now,
        values,
    }
}
