//! Form schema
//!
//! An ordered field list plus cross-field rules. Construction checks the
//! structural invariants (unique ids, resolvable references, acyclic
//! dependencies) and precomputes the order in which visibility must be
//! evaluated so that every field is visited after the field it depends on.

use crate::error::SchemaError;
use crate::field::{FieldDescriptor, FieldId, Section};
use crate::options::{OptionCatalog, OptionGroupKey, OptionsSource};
use crate::rules::RequiredIfRule;
use petgraph::algo::toposort;
use petgraph::graphmap::DiGraphMap;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

/// Names of metadata that records and sheet rows carry next to field values
///
/// A field with one of these ids would overwrite the metadata cell, so
/// schemas may not declare them.
pub const RESERVED_FIELD_IDS: [&str; 5] = [
    "Timestamp",
    "EntryID",
    "MemberIndex",
    "entryId",
    "submittedAt",
];

/// Validated, immutable form schema
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "SchemaDocument", into = "SchemaDocument")]
pub struct FormSchema {
    fields: Vec<FieldDescriptor>,
    rules: Vec<RequiredIfRule>,
    index: HashMap<FieldId, usize>,
    order: Vec<usize>,
}

/// Serialized form of a schema
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct SchemaDocument {
    fields: Vec<FieldDescriptor>,
    #[serde(default, alias = "requiredIf", skip_serializing_if = "Vec::is_empty")]
    required_if: Vec<RequiredIfRule>,
}

impl TryFrom<SchemaDocument> for FormSchema {
    type Error = SchemaError;

    fn try_from(doc: SchemaDocument) -> Result<Self, Self::Error> {
        FormSchema::new(doc.fields, doc.required_if)
    }
}

impl From<FormSchema> for SchemaDocument {
    fn from(schema: FormSchema) -> Self {
        Self {
            fields: schema.fields,
            required_if: schema.rules,
        }
    }
}

impl FormSchema {
    /// Build and check a schema
    ///
    /// # Errors
    /// Returns the first structural violation found.
    pub fn new(
        fields: Vec<FieldDescriptor>,
        rules: Vec<RequiredIfRule>,
    ) -> Result<Self, SchemaError> {
        if fields.is_empty() {
            return Err(SchemaError::Empty);
        }

        let mut index = HashMap::with_capacity(fields.len());
        for (i, field) in fields.iter().enumerate() {
            if RESERVED_FIELD_IDS.contains(&field.id.as_str()) {
                return Err(SchemaError::ReservedField(field.id.clone()));
            }
            if index.insert(field.id.clone(), i).is_some() {
                return Err(SchemaError::DuplicateField(field.id.clone()));
            }
        }

        // Edges run from the target to the dependent field
        let mut graph: DiGraphMap<usize, ()> = DiGraphMap::with_capacity(fields.len(), fields.len());
        for i in 0..fields.len() {
            graph.add_node(i);
        }
        for (i, field) in fields.iter().enumerate() {
            let Some(predicate) = &field.depends_on else {
                continue;
            };
            if predicate.field == field.id {
                return Err(SchemaError::SelfDependency(field.id.clone()));
            }
            let target = *index.get(&predicate.field).ok_or_else(|| {
                SchemaError::UnknownDependency {
                    field: field.id.clone(),
                    target: predicate.field.clone(),
                }
            })?;
            graph.add_edge(target, i, ());
        }

        let order = toposort(&graph, None)
            .map_err(|cycle| SchemaError::DependencyCycle(fields[cycle.node_id()].id.clone()))?;

        for rule in &rules {
            if !index.contains_key(&rule.field) {
                return Err(SchemaError::UnknownRuleField(rule.field.clone()));
            }
            if !index.contains_key(&rule.when.field) {
                return Err(SchemaError::UnknownRuleField(rule.when.field.clone()));
            }
        }

        tracing::debug!(
            fields = fields.len(),
            rules = rules.len(),
            "form schema built"
        );

        Ok(Self {
            fields,
            rules,
            index,
            order,
        })
    }

    /// Parse from a JSON document `{fields: [...], required_if: [...]}`
    ///
    /// # Errors
    /// Returns error if JSON is invalid or the schema is malformed
    pub fn from_json(json: &str) -> Result<Self, SchemaError> {
        let doc: SchemaDocument = serde_json::from_str(json).map_err(SchemaError::InvalidJson)?;
        Self::try_from(doc)
    }

    /// Parse from a YAML document
    ///
    /// # Errors
    /// Returns error if YAML is invalid or the schema is malformed
    pub fn from_yaml(yaml: &str) -> Result<Self, SchemaError> {
        let doc: SchemaDocument = serde_yaml::from_str(yaml).map_err(SchemaError::InvalidYaml)?;
        Self::try_from(doc)
    }

    /// Serialize to pretty JSON
    ///
    /// # Errors
    /// Returns error if serialization fails
    pub fn to_json(&self) -> Result<String, SchemaError> {
        serde_json::to_string_pretty(&SchemaDocument::from(self.clone())).map_err(SchemaError::InvalidJson)
    }

    /// Fields in declaration order
    #[inline]
    #[must_use]
    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    /// Cross-field required-if rules
    #[inline]
    #[must_use]
    pub fn rules(&self) -> &[RequiredIfRule] {
        &self.rules
    }

    /// Look up field by id
    #[must_use]
    pub fn field(&self, id: &str) -> Option<&FieldDescriptor> {
        self.index.get(id).map(|&i| &self.fields[i])
    }

    /// Declaration index of a field
    #[must_use]
    pub fn position(&self, id: &str) -> Option<usize> {
        self.index.get(id).copied()
    }

    /// Whether the schema declares `id`
    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    /// Fields ordered so that every field follows its dependency target
    pub fn evaluation_order(&self) -> impl Iterator<Item = (usize, &FieldDescriptor)> {
        self.order.iter().map(|&i| (i, &self.fields[i]))
    }

    /// Fields whose `depends_on` targets `id` directly
    pub fn dependents_of<'a>(&'a self, id: &'a str) -> impl Iterator<Item = &'a FieldDescriptor> + 'a {
        self.fields.iter().filter(move |f| {
            f.depends_on
                .as_ref()
                .is_some_and(|p| p.field.as_str() == id)
        })
    }

    /// Number of fields
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Always false: construction rejects empty schemas
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Fields grouped by section in display order; empty sections omitted
    #[must_use]
    pub fn by_section(&self) -> Vec<(Section, Vec<&FieldDescriptor>)> {
        Section::ALL
            .iter()
            .filter_map(|section| {
                let fields: Vec<_> = self.fields.iter().filter(|f| f.section == *section).collect();
                (!fields.is_empty()).then_some((*section, fields))
            })
            .collect()
    }

    /// Referenced option groups that `catalog` does not provide
    #[must_use]
    pub fn missing_option_groups<'a>(&'a self, catalog: &OptionCatalog) -> Vec<&'a OptionGroupKey> {
        self.option_groups()
            .into_iter()
            .filter(|key| !catalog.contains_group(key.as_str()))
            .collect()
    }

    /// External option groups referenced by select fields
    #[must_use]
    pub fn option_groups(&self) -> BTreeSet<&OptionGroupKey> {
        self.fields
            .iter()
            .filter_map(|f| match f.kind.options() {
                Some(OptionsSource::Group(key)) => Some(key),
                _ => None,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::OptionsSource;
    use crate::predicate::Predicate;

    fn yes_no(id: &str) -> FieldDescriptor {
        FieldDescriptor::select(id, id, Section::Basic, OptionsSource::group("yesNo")).required()
    }

    #[test]
    fn builds_and_orders_dependencies() {
        // Dependent declared before its target
        let schema = FormSchema::new(
            vec![
                FieldDescriptor::text("nationalId", "id", Section::Basic)
                    .depends_on(Predicate::equals("hasNationalId", "نعم")),
                yes_no("hasNationalId"),
            ],
            vec![],
        )
        .unwrap();

        let order: Vec<_> = schema.evaluation_order().map(|(_, f)| f.id.as_str()).collect();
        assert_eq!(order, vec!["hasNationalId", "nationalId"]);
        assert_eq!(schema.position("nationalId"), Some(0));
    }

    #[test]
    fn rejects_duplicate_ids() {
        let err = FormSchema::new(vec![yes_no("a"), yes_no("a")], vec![]).unwrap_err();
        assert!(matches!(err, SchemaError::DuplicateField(ref f) if f.as_str() == "a"));
    }

    #[test]
    fn rejects_unknown_dependency() {
        let err = FormSchema::new(
            vec![yes_no("a").depends_on(Predicate::equals("missing", "x"))],
            vec![],
        )
        .unwrap_err();
        assert!(matches!(err, SchemaError::UnknownDependency { .. }));
    }

    #[test]
    fn rejects_self_dependency() {
        let err = FormSchema::new(
            vec![yes_no("a").depends_on(Predicate::equals("a", "x"))],
            vec![],
        )
        .unwrap_err();
        assert!(matches!(err, SchemaError::SelfDependency(_)));
    }

    #[test]
    fn rejects_cycles() {
        let err = FormSchema::new(
            vec![
                yes_no("a").depends_on(Predicate::equals("c", "x")),
                yes_no("b").depends_on(Predicate::equals("a", "x")),
                yes_no("c").depends_on(Predicate::equals("b", "x")),
            ],
            vec![],
        )
        .unwrap_err();
        assert!(matches!(err, SchemaError::DependencyCycle(_)));
    }

    #[test]
    fn rejects_rules_on_unknown_fields() {
        let err = FormSchema::new(
            vec![yes_no("a")],
            vec![RequiredIfRule::new("b", Predicate::equals("a", "نعم"))],
        )
        .unwrap_err();
        assert!(matches!(err, SchemaError::UnknownRuleField(ref f) if f.as_str() == "b"));
    }

    #[test]
    fn rejects_metadata_column_ids() {
        for id in RESERVED_FIELD_IDS {
            let err = FormSchema::new(vec![yes_no("a"), yes_no(id)], vec![]).unwrap_err();
            assert!(matches!(err, SchemaError::ReservedField(ref f) if f.as_str() == id));
        }
    }

    #[test]
    fn reserved_ids_are_rejected_in_documents() {
        let json = r#"{"fields": [{"id": "Timestamp", "type": "text", "label": "t", "section": "basic"}]}"#;
        assert!(matches!(
            FormSchema::from_json(json),
            Err(SchemaError::ReservedField(ref f)) if f.as_str() == "Timestamp"
        ));
    }

    #[test]
    fn rejects_unknown_document_keys() {
        let json = r#"{"fields": [{"id": "a", "type": "text", "label": "a", "section": "basic"}], "rules": []}"#;
        assert!(matches!(FormSchema::from_json(json), Err(SchemaError::InvalidJson(_))));
    }

    #[test]
    fn camel_case_document_keeps_dependencies() {
        let yaml = r#"
fields:
  - {id: hasNationalId, type: select, label: h, section: basic, options: {group: hasId}}
  - id: nationalId
    type: text
    label: n
    section: basic
    required: true
    maxLength: 14
    dependsOn: {field: hasNationalId, value: نعم}
requiredIf:
  - field: nationalId
    when: {field: hasNationalId, antiValue: لا}
"#;
        let schema = FormSchema::from_yaml(yaml).unwrap();
        let field = schema.field("nationalId").unwrap();
        assert_eq!(field.depends_on, Some(Predicate::equals("hasNationalId", "نعم")));
        assert_eq!(schema.rules().len(), 1);
        assert_eq!(schema.dependents_of("hasNationalId").count(), 1);
    }

    #[test]
    fn rejects_empty_schema() {
        assert!(matches!(FormSchema::new(vec![], vec![]), Err(SchemaError::Empty)));
    }

    #[test]
    fn loads_from_yaml_document() {
        let yaml = r#"
fields:
  - id: hasNationalId
    type: select
    label: هل لديه رقم قومي؟
    section: basic
    required: true
    options:
      group: hasId
  - id: nationalId
    type: text
    label: الرقم القومي
    section: basic
    required: true
    max_length: 14
    pattern: digits_only
    depends_on:
      field: hasNationalId
      value: نعم
required_if:
  - field: nationalId
    when:
      field: hasNationalId
      value: نعم
"#;
        let schema = FormSchema::from_yaml(yaml).unwrap();
        assert_eq!(schema.len(), 2);
        assert_eq!(schema.rules().len(), 1);
        assert_eq!(
            schema.option_groups().into_iter().map(|k| k.as_str()).collect::<Vec<_>>(),
            vec!["hasId"]
        );
    }

    #[test]
    fn yaml_cycle_surfaces_schema_error() {
        let yaml = r#"
fields:
  - {id: a, type: text, label: a, section: basic, depends_on: {field: b}}
  - {id: b, type: text, label: b, section: basic, depends_on: {field: a}}
"#;
        let err = FormSchema::from_yaml(yaml).unwrap_err();
        assert!(matches!(err, SchemaError::DependencyCycle(_)));
        assert!(err.to_string().contains("cycle"));
    }

    #[test]
    fn json_round_trip_preserves_fields() {
        let schema = FormSchema::new(vec![yes_no("a"), yes_no("b")], vec![]).unwrap();
        let json = schema.to_json().unwrap();
        let back = FormSchema::from_json(&json).unwrap();
        assert_eq!(back.fields(), schema.fields());
    }

    #[test]
    fn reports_missing_option_groups() {
        let schema = FormSchema::new(vec![yes_no("a")], vec![]).unwrap();
        let empty = OptionCatalog::new();
        assert_eq!(schema.missing_option_groups(&empty).len(), 1);

        let full = OptionCatalog::new().with_group("yesNo", vec![]);
        assert!(schema.missing_option_groups(&full).is_empty());
    }

    #[test]
    fn groups_by_section_in_display_order() {
        let schema = FormSchema::new(
            vec![
                FieldDescriptor::text("h", "h", Section::Health),
                FieldDescriptor::text("b", "b", Section::Basic),
            ],
            vec![],
        )
        .unwrap();
        let sections: Vec<_> = schema.by_section().into_iter().map(|(s, _)| s).collect();
        assert_eq!(sections, vec![Section::Basic, Section::Health]);
    }
}
