//! User-facing validation texts

use serde::{Deserialize, Serialize};

/// Messages attached to field issues
///
/// `max_length` and `min_length` substitute `{n}` with the limit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationMessages {
    /// Required field left empty
    pub required: String,
    /// Non-Arabic characters in an Arabic-only field
    pub arabic_only: String,
    /// Non-digit characters in a digits-only field
    pub digits_only: String,
    /// Malformed Egyptian mobile number
    pub egyptian_mobile: String,
    /// Text longer than allowed
    pub max_length: String,
    /// Text shorter than allowed
    pub min_length: String,
    /// Select answer not among the option names
    pub invalid_option: String,
    /// List given for a scalar field or vice versa
    pub invalid_value: String,
}

impl Default for ValidationMessages {
    fn default() -> Self {
        Self {
            required: "هذا الحقل مطلوب".to_string(),
            arabic_only: "يجب إدخال الاسم باللغة العربية فقط".to_string(),
            digits_only: "يجب إدخال أرقام فقط".to_string(),
            egyptian_mobile: "رقم الهاتف غير صحيح".to_string(),
            max_length: "يجب ألا يزيد عن {n} حرف".to_string(),
            min_length: "يجب ألا يقل عن {n} حرف".to_string(),
            invalid_option: "يرجى اختيار قيمة صحيحة".to_string(),
            invalid_value: "قيمة غير صالحة".to_string(),
        }
    }
}

impl ValidationMessages {
    /// Rendered max-length message
    #[must_use]
    pub fn too_long(&self, n: usize) -> String {
        self.max_length.replace("{n}", &n.to_string())
    }

    /// Rendered min-length message
    #[must_use]
    pub fn too_short(&self, n: usize) -> String {
        self.min_length.replace("{n}", &n.to_string())
    }

    /// Override the required message
    #[inline]
    #[must_use]
    pub fn with_required(mut self, message: impl Into<String>) -> Self {
        self.required = message.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn length_placeholders_render() {
        let messages = ValidationMessages::default();
        assert_eq!(messages.too_long(14), "يجب ألا يزيد عن 14 حرف");
        assert_eq!(messages.too_short(3), "يجب ألا يقل عن 3 حرف");
    }

    #[test]
    fn partial_override_keeps_defaults() {
        let messages: ValidationMessages = serde_json::from_str(r#"{"required": "required"}"#).unwrap();
        assert_eq!(messages.required, "required");
        assert_eq!(messages.digits_only, ValidationMessages::default().digits_only);
    }
}
