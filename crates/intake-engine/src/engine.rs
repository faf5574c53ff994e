//! Form engine
//!
//! Binds one schema to its option catalog, messages and list separator so
//! callers evaluate answer sets through a single handle.

use crate::activity::{active_fields, ActiveSet};
use crate::answer::AnswerSet;
use crate::messages::ValidationMessages;
use crate::record::{normalize, EntryId, MemberRecord};
use crate::sheet::{SheetRow, DEFAULT_SEPARATOR};
use crate::validation::{ValidationReport, Validator};
use chrono::{DateTime, Utc};
use intake_schema::{FieldId, FormSchema, OptionCatalog};
use serde::Serialize;
use std::sync::Arc;

/// Snapshot of one answer set's evaluation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Evaluation {
    /// Active field ids in schema order
    pub active: Vec<FieldId>,
    /// Outcome per active field
    pub report: ValidationReport,
}

impl Evaluation {
    /// Whether the answer set may be submitted
    #[inline]
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.report.is_valid()
    }
}

/// Schema-bound evaluator
#[derive(Debug, Clone)]
pub struct FormEngine {
    /// Form definition
    schema: Arc<FormSchema>,
    /// Loaded options; `None` skips group membership checks
    catalog: Option<Arc<OptionCatalog>>,
    /// Issue texts
    messages: ValidationMessages,
    /// Cell separator for list values
    separator: String,
}

impl FormEngine {
    /// Create engine for a schema
    #[inline]
    #[must_use]
    pub fn new(schema: impl Into<Arc<FormSchema>>) -> Self {
        Self {
            schema: schema.into(),
            catalog: None,
            messages: ValidationMessages::default(),
            separator: DEFAULT_SEPARATOR.to_string(),
        }
    }

    /// Attach an option catalog
    #[inline]
    #[must_use]
    pub fn with_catalog(mut self, catalog: impl Into<Arc<OptionCatalog>>) -> Self {
        self.catalog = Some(catalog.into());
        self
    }

    /// Set validation messages
    #[inline]
    #[must_use]
    pub fn with_messages(mut self, messages: ValidationMessages) -> Self {
        self.messages = messages;
        self
    }

    /// Set list separator used for sheet rows
    #[inline]
    #[must_use]
    pub fn with_separator(mut self, separator: impl Into<String>) -> Self {
        self.separator = separator.into();
        self
    }

    /// Form definition
    #[must_use]
    pub fn schema(&self) -> &FormSchema {
        &self.schema
    }

    /// Shared handle to the form definition
    #[must_use]
    pub fn schema_arc(&self) -> Arc<FormSchema> {
        Arc::clone(&self.schema)
    }

    /// Loaded option catalog
    #[must_use]
    pub fn catalog(&self) -> Option<&OptionCatalog> {
        self.catalog.as_deref()
    }

    /// List separator
    #[must_use]
    pub fn separator(&self) -> &str {
        &self.separator
    }

    /// Active fields for `answers`
    #[must_use]
    pub fn active_fields(&self, answers: &AnswerSet) -> ActiveSet {
        active_fields(&self.schema, answers)
    }

    /// Validate `answers`
    #[must_use]
    pub fn validate(&self, answers: &AnswerSet) -> ValidationReport {
        self.validator().validate(answers)
    }

    /// Active set and validation in one pass
    #[must_use]
    pub fn evaluate(&self, answers: &AnswerSet) -> Evaluation {
        let active = self.active_fields(answers);
        let report = self.validator().validate_active(&active, answers);
        Evaluation {
            active: active.iter().cloned().collect(),
            report,
        }
    }

    /// Normalize a completed answer set
    #[must_use]
    pub fn normalize(&self, answers: &AnswerSet, entry_id: EntryId, now: DateTime<Utc>) -> MemberRecord {
        normalize(&self.schema, answers, entry_id, now)
    }

    /// Sheet row for a record at member position `index`
    #[must_use]
    pub fn sheet_row(&self, record: &MemberRecord, index: usize) -> SheetRow {
        SheetRow::from_member(record, index, &self.separator)
    }

    fn validator(&self) -> Validator<'_> {
        let validator = Validator::new(&self.schema).with_messages(&self.messages);
        match self.catalog.as_deref() {
            Some(catalog) => validator.with_catalog(catalog),
            None => validator,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use intake_schema::{household_member_schema, Choice};

    #[test]
    fn evaluate_reports_active_and_errors() {
        let engine = FormEngine::new(household_member_schema());
        let answers = AnswerSet::new().with("hasNationalId", "نعم");
        let evaluation = engine.evaluate(&answers);
        assert!(evaluation.active.iter().any(|id| id.as_str() == "nationalId"));
        assert!(!evaluation.is_valid());
        assert!(evaluation.report.error_map().contains_key("nationalId"));
    }

    #[test]
    fn catalog_enables_group_checks() {
        let catalog = OptionCatalog::new().with_group("gender", vec![Choice::new("m", "ذكر")]);
        let engine = FormEngine::new(household_member_schema()).with_catalog(catalog);
        let report = engine.validate(&AnswerSet::new().with("gender", "m"));
        assert!(report.error_map().contains_key("gender"));
    }

    #[test]
    fn sheet_row_uses_separator() {
        let engine = FormEngine::new(household_member_schema()).with_separator(" / ");
        let answers = AnswerSet::new()
            .with("hasHealthIssue", "نعم")
            .with_many("chronicDiseases", ["Diabetes", "Heart"]);
        let now = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let record = engine.normalize(&answers, EntryId::new_v4(), now);
        assert_eq!(engine.sheet_row(&record, 0).get("chronicDiseases"), Some("Diabetes / Heart"));
    }
}
