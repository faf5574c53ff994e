//! Schema authoring errors

use crate::field::FieldId;

/// Errors detected while building or loading a schema
#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    /// Two descriptors share an id
    #[error("duplicate field id: '{0}'")]
    DuplicateField(FieldId),

    /// `depends_on` names a field that is not in the schema
    #[error("field '{field}' depends on unknown field '{target}'")]
    UnknownDependency {
        /// Field carrying the predicate
        field: FieldId,
        /// Missing target
        target: FieldId,
    },

    /// Field id collides with a record or sheet metadata column
    #[error("field id '{0}' is reserved for record metadata")]
    ReservedField(FieldId),

    /// A field depends on itself
    #[error("field '{0}' depends on itself")]
    SelfDependency(FieldId),

    /// Dependencies form a cycle
    #[error("dependency cycle through field '{0}'")]
    DependencyCycle(FieldId),

    /// A required-if rule references an unknown field
    #[error("required-if rule references unknown field '{0}'")]
    UnknownRuleField(FieldId),

    /// Schema has no fields
    #[error("schema has no fields")]
    Empty,

    /// JSON document could not be parsed
    #[error("invalid schema json: {0}")]
    InvalidJson(#[source] serde_json::Error),

    /// YAML document could not be parsed
    #[error("invalid schema yaml: {0}")]
    InvalidYaml(#[source] serde_yaml::Error),
}

impl SchemaError {
    /// Field the error is about, if any
    #[must_use]
    pub fn field(&self) -> Option<&FieldId> {
        match self {
            Self::DuplicateField(f)
            | Self::ReservedField(f)
            | Self::SelfDependency(f)
            | Self::DependencyCycle(f)
            | Self::UnknownRuleField(f) => Some(f),
            Self::UnknownDependency { field, .. } => Some(field),
            Self::Empty | Self::InvalidJson(_) | Self::InvalidYaml(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_names_both_fields() {
        let err = SchemaError::UnknownDependency {
            field: FieldId::new("nationalId"),
            target: FieldId::new("hasId"),
        };
        let text = err.to_string();
        assert!(text.contains("nationalId"));
        assert!(text.contains("hasId"));
        assert_eq!(err.field().map(FieldId::as_str), Some("nationalId"));
    }
}
