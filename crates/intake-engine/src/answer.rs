//! In-progress answers

use indexmap::IndexMap;
use intake_schema::FieldId;
use serde::{Deserialize, Serialize};

/// Current value of one field
///
/// Select answers hold option **names**. Multi-select answers are lists.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AnswerValue {
    /// Text or single-select answer
    Text(String),
    /// Multi-select answer
    Many(Vec<String>),
}

impl AnswerValue {
    /// Text view
    #[inline]
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            AnswerValue::Text(s) => Some(s),
            AnswerValue::Many(_) => None,
        }
    }

    /// List view
    #[inline]
    #[must_use]
    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            AnswerValue::Text(_) => None,
            AnswerValue::Many(items) => Some(items),
        }
    }

    /// Empty string or empty list
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        match self {
            AnswerValue::Text(s) => s.is_empty(),
            AnswerValue::Many(items) => items.is_empty(),
        }
    }
}

impl From<&str> for AnswerValue {
    fn from(value: &str) -> Self {
        AnswerValue::Text(value.to_string())
    }
}

impl From<String> for AnswerValue {
    fn from(value: String) -> Self {
        AnswerValue::Text(value)
    }
}

impl From<Vec<String>> for AnswerValue {
    fn from(value: Vec<String>) -> Self {
        AnswerValue::Many(value)
    }
}

/// Answers for one member form, keyed by field id
///
/// A missing key means the field is unanswered.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AnswerSet {
    values: IndexMap<FieldId, AnswerValue>,
}

impl AnswerSet {
    /// Create empty answer set
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a field's answer, returning the previous one
    pub fn set(&mut self, id: impl Into<FieldId>, value: impl Into<AnswerValue>) -> Option<AnswerValue> {
        self.values.insert(id.into(), value.into())
    }

    /// Builder form of [`set`](Self::set)
    #[must_use]
    pub fn with(mut self, id: impl Into<FieldId>, value: impl Into<AnswerValue>) -> Self {
        self.set(id, value);
        self
    }

    /// Builder for a multi-select answer
    #[must_use]
    pub fn with_many<I, S>(self, id: impl Into<FieldId>, items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let items: Vec<String> = items.into_iter().map(Into::into).collect();
        self.with(id, AnswerValue::Many(items))
    }

    /// Clear a field's answer
    pub fn remove(&mut self, id: &str) -> Option<AnswerValue> {
        self.values.shift_remove(id)
    }

    /// Current answer for a field
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&AnswerValue> {
        self.values.get(id)
    }

    /// Answers in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&FieldId, &AnswerValue)> {
        self.values.iter()
    }

    /// Number of answered keys
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether nothing has been answered
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for AnswerSet
where
    K: Into<FieldId>,
    V: Into<AnswerValue>,
{
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self {
            values: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_mixed_json() {
        let json = r#"{"name": "أحمد", "chronicDiseases": ["Diabetes", "Heart"]}"#;
        let answers: AnswerSet = serde_json::from_str(json).unwrap();
        assert_eq!(answers.get("name").and_then(AnswerValue::as_text), Some("أحمد"));
        assert_eq!(
            answers.get("chronicDiseases").and_then(AnswerValue::as_list).map(<[String]>::len),
            Some(2)
        );
    }

    #[test]
    fn emptiness() {
        assert!(AnswerValue::from("").is_empty());
        assert!(AnswerValue::Many(vec![]).is_empty());
        assert!(!AnswerValue::from("x").is_empty());
    }

    #[test]
    fn remove_keeps_order_of_rest() {
        let mut answers = AnswerSet::new().with("a", "1").with("b", "2").with("c", "3");
        answers.remove("b");
        let keys: Vec<_> = answers.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, vec!["a", "c"]);
    }
}
