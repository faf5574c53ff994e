//! Cross-field conditional requiredness

use crate::field::FieldId;
use crate::predicate::Predicate;
use serde::{Deserialize, Serialize};

/// Makes `field` required whenever `when` holds
///
/// Layered on top of the field's static `required` flag. Rules only affect
/// active fields; an inactive field is never validated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RequiredIfRule {
    /// Field that becomes required
    pub field: FieldId,
    /// Condition over another field's answer
    pub when: Predicate,
    /// Message shown instead of the generic "required" text
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl RequiredIfRule {
    /// Create rule
    #[must_use]
    pub fn new(field: impl Into<FieldId>, when: Predicate) -> Self {
        Self {
            field: field.into(),
            when,
            message: None,
        }
    }

    /// Attach a specific message
    #[must_use]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}
