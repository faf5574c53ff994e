//! Predicates over another field's answer
//!
//! Used both for field visibility (`depends_on`) and for cross-field
//! required-if rules. A predicate names one target field and one test.

use crate::field::FieldId;
use serde::{Deserialize, Serialize};

/// Test applied to the target field's answer
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Condition {
    /// Scalar answer equals the value, or list answer contains it
    Equals(String),
    /// Negation of [`Condition::Equals`]
    NotEquals(String),
    /// Answer is present and non-empty
    Answered,
}

/// `{field, value?, anti_value?}` predicate
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawPredicate", into = "RawPredicate")]
pub struct Predicate {
    /// Field whose answer is tested
    pub field: FieldId,
    /// Test to apply
    pub condition: Condition,
}

impl Predicate {
    /// Active when `field` equals (or contains) `value`
    #[must_use]
    pub fn equals(field: impl Into<FieldId>, value: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            condition: Condition::Equals(value.into()),
        }
    }

    /// Active when `field` does not equal (or contain) `value`
    #[must_use]
    pub fn not_equals(field: impl Into<FieldId>, value: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            condition: Condition::NotEquals(value.into()),
        }
    }

    /// Active when `field` has any non-empty answer
    #[must_use]
    pub fn answered(field: impl Into<FieldId>) -> Self {
        Self {
            field: field.into(),
            condition: Condition::Answered,
        }
    }

    /// Apply the test to a target answer
    ///
    /// `scalar` is the target's text answer, `list` its list answer; at most
    /// one is `Some`. An unset target is `(None, None)`.
    #[must_use]
    pub fn test(&self, scalar: Option<&str>, list: Option<&[String]>) -> bool {
        let matches = |v: &str| match (scalar, list) {
            (Some(s), _) => s == v,
            (None, Some(items)) => items.iter().any(|i| i == v),
            (None, None) => false,
        };
        match &self.condition {
            Condition::Equals(v) => matches(v),
            Condition::NotEquals(v) => !matches(v),
            Condition::Answered => match (scalar, list) {
                (Some(s), _) => !s.is_empty(),
                (None, Some(items)) => !items.is_empty(),
                (None, None) => false,
            },
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawPredicate {
    field: FieldId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    value: Option<String>,
    #[serde(default, alias = "antiValue", skip_serializing_if = "Option::is_none")]
    anti_value: Option<String>,
}

impl TryFrom<RawPredicate> for Predicate {
    type Error = String;

    fn try_from(raw: RawPredicate) -> Result<Self, Self::Error> {
        let condition = match (raw.value, raw.anti_value) {
            (Some(_), Some(_)) => {
                return Err(format!(
                    "predicate on '{}' sets both value and anti_value",
                    raw.field
                ))
            }
            (Some(v), None) => Condition::Equals(v),
            (None, Some(v)) => Condition::NotEquals(v),
            (None, None) => Condition::Answered,
        };
        Ok(Self {
            field: raw.field,
            condition,
        })
    }
}

impl From<Predicate> for RawPredicate {
    fn from(p: Predicate) -> Self {
        let (value, anti_value) = match p.condition {
            Condition::Equals(v) => (Some(v), None),
            Condition::NotEquals(v) => (None, Some(v)),
            Condition::Answered => (None, None),
        };
        Self {
            field: p.field,
            value,
            anti_value,
        }
    }
}
