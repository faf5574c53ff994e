//! Field validation
//!
//! Only active fields are validated. Each active field receives exactly one
//! [`Outcome`]; inactive fields never appear in a [`ValidationReport`] and
//! never block submission.

use crate::activity::{active_fields, effective_answer, holds, ActiveSet};
use crate::answer::{AnswerSet, AnswerValue};
use crate::messages::ValidationMessages;
use indexmap::IndexMap;
use intake_schema::{
    Choice, FieldDescriptor, FieldId, FieldKind, FormSchema, OptionCatalog, OptionsSource, PatternKind,
    TextRules,
};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

static ARABIC_ONLY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[\x{0600}-\x{06FF}\s]+$").expect("arabic pattern compiles"));
static DIGITS_ONLY: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[0-9]+$").expect("digits pattern compiles"));
static EGYPTIAN_MOBILE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(010|011|012|015)[0-9]{8}$").expect("mobile pattern compiles"));

static DEFAULT_MESSAGES: Lazy<ValidationMessages> = Lazy::new(ValidationMessages::default);

/// Whether `text` satisfies a pattern
#[must_use]
pub fn matches_pattern(pattern: PatternKind, text: &str) -> bool {
    match pattern {
        PatternKind::ArabicOnly => ARABIC_ONLY.is_match(text),
        PatternKind::DigitsOnly => DIGITS_ONLY.is_match(text),
        PatternKind::EgyptianMobile => EGYPTIAN_MOBILE.is_match(text),
    }
}

/// Which check failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rule {
    /// Statically required field is empty
    Required,
    /// Field required by a cross-field rule is empty
    RequiredIf,
    /// Text does not match its pattern
    Pattern(PatternKind),
    /// Text longer than the limit
    MaxLength(usize),
    /// Text shorter than the limit
    MinLength(usize),
    /// Select answer is not an option name
    InvalidOption,
    /// List answer for a scalar field or vice versa
    ShapeMismatch,
}

/// A failed check with its display message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldIssue {
    /// Check that failed
    pub rule: Rule,
    /// Message to show next to the field
    pub message: String,
}

impl FieldIssue {
    fn new(rule: Rule, message: impl Into<String>) -> Self {
        Self {
            rule,
            message: message.into(),
        }
    }
}

/// Result for one active field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum Outcome {
    /// All checks passed
    Pass,
    /// First failing check
    Fail(FieldIssue),
}

impl Outcome {
    /// Whether this outcome passed
    #[inline]
    #[must_use]
    pub fn is_pass(&self) -> bool {
        matches!(self, Outcome::Pass)
    }
}

/// Outcomes for every active field, in schema order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ValidationReport {
    outcomes: IndexMap<FieldId, Outcome>,
}

impl ValidationReport {
    /// True when no active field failed
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.outcomes.values().all(Outcome::is_pass)
    }

    /// Outcome for one field; `None` for inactive or unknown fields
    #[must_use]
    pub fn outcome(&self, id: &str) -> Option<&Outcome> {
        self.outcomes.get(id)
    }

    /// Failed fields with their issues
    pub fn errors(&self) -> impl Iterator<Item = (&FieldId, &FieldIssue)> {
        self.outcomes.iter().filter_map(|(id, outcome)| match outcome {
            Outcome::Fail(issue) => Some((id, issue)),
            Outcome::Pass => None,
        })
    }

    /// Owned error view keyed by field id
    #[must_use]
    pub fn error_map(&self) -> IndexMap<FieldId, FieldIssue> {
        self.errors().map(|(id, issue)| (id.clone(), issue.clone())).collect()
    }

    /// Number of failed fields
    #[must_use]
    pub fn error_count(&self) -> usize {
        self.errors().count()
    }

    /// All outcomes
    pub fn iter(&self) -> impl Iterator<Item = (&FieldId, &Outcome)> {
        self.outcomes.iter()
    }

    /// Number of validated (active) fields
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    /// Whether no field was validated
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }
}

/// Validates answer sets against one schema
///
/// With a catalog, select answers are also checked against group option
/// names. Inline options are always checked.
#[derive(Debug, Clone, Copy)]
pub struct Validator<'a> {
    schema: &'a FormSchema,
    catalog: Option<&'a OptionCatalog>,
    messages: &'a ValidationMessages,
}

impl<'a> Validator<'a> {
    /// Validator with default messages and no catalog
    #[must_use]
    pub fn new(schema: &'a FormSchema) -> Self {
        Self {
            schema,
            catalog: None,
            messages: &DEFAULT_MESSAGES,
        }
    }

    /// Check group options against a catalog
    #[inline]
    #[must_use]
    pub fn with_catalog(mut self, catalog: &'a OptionCatalog) -> Self {
        self.catalog = Some(catalog);
        self
    }

    /// Use custom messages
    #[inline]
    #[must_use]
    pub fn with_messages(mut self, messages: &'a ValidationMessages) -> Self {
        self.messages = messages;
        self
    }

    /// Validate answers, computing the active set
    #[must_use]
    pub fn validate(&self, answers: &AnswerSet) -> ValidationReport {
        let active = active_fields(self.schema, answers);
        self.validate_active(&active, answers)
    }

    /// Validate answers against a precomputed active set
    #[must_use]
    pub fn validate_active(&self, active: &ActiveSet, answers: &AnswerSet) -> ValidationReport {
        let conditional = self.conditional_requirements(active, answers);

        let outcomes: IndexMap<FieldId, Outcome> = self
            .schema
            .fields()
            .iter()
            .enumerate()
            .filter(|(i, _)| active.is_active_at(*i))
            .map(|(_, field)| {
                let id = field.id.as_str();
                let outcome = self.check_field(field, answers.get(id), conditional.get(id).copied());
                (field.id.clone(), outcome)
            })
            .collect();

        let report = ValidationReport { outcomes };
        tracing::debug!(
            active = report.len(),
            errors = report.error_count(),
            "Validated answer set"
        );
        report
    }

    /// Fields made required by a holding rule, with the rule's message
    fn conditional_requirements(
        &self,
        active: &ActiveSet,
        answers: &AnswerSet,
    ) -> HashMap<&'a str, Option<&'a str>> {
        let mut required = HashMap::new();
        for rule in self.schema.rules() {
            if !active.contains(rule.field.as_str()) {
                continue;
            }
            let target = effective_answer(self.schema, active, answers, rule.when.field.as_str());
            if holds(&rule.when, target) {
                required.insert(rule.field.as_str(), rule.message.as_deref());
            }
        }
        required
    }

    fn check_field(
        &self,
        field: &FieldDescriptor,
        answer: Option<&AnswerValue>,
        required_by_rule: Option<Option<&str>>,
    ) -> Outcome {
        let Some(answer) = answer.filter(|a| !a.is_empty()) else {
            if field.required {
                return Outcome::Fail(FieldIssue::new(Rule::Required, &self.messages.required));
            }
            if let Some(message) = required_by_rule {
                let message = message.unwrap_or(self.messages.required.as_str());
                return Outcome::Fail(FieldIssue::new(Rule::RequiredIf, message));
            }
            return Outcome::Pass;
        };

        let result = match (&field.kind, answer) {
            (FieldKind::Text(rules), AnswerValue::Text(text)) => self.check_text(rules, text),
            (FieldKind::SingleSelect { options }, AnswerValue::Text(name)) => {
                self.check_membership(options, std::iter::once(name.as_str()))
            }
            (FieldKind::MultiSelectGroup { options }, AnswerValue::Many(names)) => {
                self.check_membership(options, names.iter().map(String::as_str))
            }
            _ => Err(FieldIssue::new(Rule::ShapeMismatch, &self.messages.invalid_value)),
        };

        match result {
            Ok(()) => Outcome::Pass,
            Err(issue) => Outcome::Fail(issue),
        }
    }

    fn check_text(&self, rules: &TextRules, text: &str) -> Result<(), FieldIssue> {
        if let Some(pattern) = rules.pattern {
            if !matches_pattern(pattern, text) {
                let message = match pattern {
                    PatternKind::ArabicOnly => &self.messages.arabic_only,
                    PatternKind::DigitsOnly => &self.messages.digits_only,
                    PatternKind::EgyptianMobile => &self.messages.egyptian_mobile,
                };
                return Err(FieldIssue::new(Rule::Pattern(pattern), message));
            }
        }

        let chars = text.chars().count();
        if let Some(max) = rules.max_length {
            if chars > max {
                return Err(FieldIssue::new(Rule::MaxLength(max), self.messages.too_long(max)));
            }
        }
        if let Some(min) = rules.min_length {
            if chars < min {
                return Err(FieldIssue::new(Rule::MinLength(min), self.messages.too_short(min)));
            }
        }
        Ok(())
    }

    fn check_membership<'n>(
        &self,
        source: &OptionsSource,
        mut names: impl Iterator<Item = &'n str>,
    ) -> Result<(), FieldIssue> {
        let choices: Option<&[Choice]> = match (source, self.catalog) {
            (OptionsSource::Inline(choices), _) => Some(choices.as_slice()),
            (OptionsSource::Group(key), Some(catalog)) => catalog.group(key.as_str()),
            (OptionsSource::Group(_), None) => None,
        };

        let Some(choices) = choices else {
            return Ok(());
        };

        if names.all(|name| choices.iter().any(|c| c.name == name)) {
            Ok(())
        } else {
            Err(FieldIssue::new(Rule::InvalidOption, &self.messages.invalid_option))
        }
    }
}

/// Validate answers with default messages and no catalog
#[must_use]
pub fn validate(schema: &FormSchema, answers: &AnswerSet) -> ValidationReport {
    Validator::new(schema).validate(answers)
}

#[cfg(test)]
mod tests {
    use super::*;
    use intake_schema::{Predicate, RequiredIfRule, Section};

    fn id_schema() -> FormSchema {
        FormSchema::new(
            vec![
                FieldDescriptor::select(
                    "hasNationalId",
                    "id?",
                    Section::Basic,
                    OptionsSource::inline_pairs(&[("y", "نعم"), ("n", "لا")]),
                )
                .required(),
                FieldDescriptor::text("nationalId", "id", Section::Basic)
                    .required()
                    .max_length(14)
                    .pattern(PatternKind::DigitsOnly)
                    .depends_on(Predicate::equals("hasNationalId", "نعم")),
            ],
            vec![],
        )
        .unwrap()
    }

    #[test]
    fn patterns() {
        assert!(matches_pattern(PatternKind::ArabicOnly, "محمد أحمد"));
        assert!(!matches_pattern(PatternKind::ArabicOnly, "Mohamed"));
        assert!(matches_pattern(PatternKind::DigitsOnly, "0123"));
        assert!(!matches_pattern(PatternKind::DigitsOnly, "١٢٣"));
        assert!(matches_pattern(PatternKind::EgyptianMobile, "01012345678"));
        assert!(!matches_pattern(PatternKind::EgyptianMobile, "01312345678"));
        assert!(!matches_pattern(PatternKind::EgyptianMobile, "0101234567"));
    }

    #[test]
    fn inactive_field_is_not_validated() {
        let answers = AnswerSet::new().with("hasNationalId", "لا");
        let report = validate(&id_schema(), &answers);
        assert!(report.is_valid());
        assert!(report.outcome("nationalId").is_none());
    }

    #[test]
    fn active_required_field_fails_when_empty() {
        let answers = AnswerSet::new().with("hasNationalId", "نعم").with("nationalId", "");
        let report = validate(&id_schema(), &answers);
        let errors = report.error_map();
        assert_eq!(errors["nationalId"].rule, Rule::Required);
        assert_eq!(errors["nationalId"].message, "هذا الحقل مطلوب");
    }

    #[test]
    fn max_length_counts_chars() {
        let answers = AnswerSet::new()
            .with("hasNationalId", "نعم")
            .with("nationalId", "123456789012345");
        let report = validate(&id_schema(), &answers);
        assert_eq!(report.error_map()["nationalId"].rule, Rule::MaxLength(14));
    }

    #[test]
    fn pattern_checked_before_length() {
        let answers = AnswerSet::new().with("hasNationalId", "نعم").with("nationalId", "12a");
        let report = validate(&id_schema(), &answers);
        assert_eq!(
            report.error_map()["nationalId"].rule,
            Rule::Pattern(PatternKind::DigitsOnly)
        );
    }

    #[test]
    fn every_active_field_gets_one_outcome() {
        let answers = AnswerSet::new()
            .with("hasNationalId", "نعم")
            .with("nationalId", "29801011234567");
        let report = validate(&id_schema(), &answers);
        assert_eq!(report.len(), 2);
        assert!(report.is_valid());
    }

    #[test]
    fn inline_options_checked_without_catalog() {
        let answers = AnswerSet::new().with("hasNationalId", "y");
        let report = validate(&id_schema(), &answers);
        assert_eq!(report.error_map()["hasNationalId"].rule, Rule::InvalidOption);
    }

    #[test]
    fn group_options_checked_with_catalog() {
        let schema = FormSchema::new(
            vec![FieldDescriptor::checkbox_group("diseases", "d", Section::Health, OptionsSource::group("c"))],
            vec![],
        )
        .unwrap();
        let catalog = OptionCatalog::new().with_group(
            "c",
            vec![Choice::new("1", "Diabetes"), Choice::new("2", "Heart")],
        );

        let by_name = AnswerSet::new().with_many("diseases", ["Diabetes", "Heart"]);
        assert!(Validator::new(&schema).with_catalog(&catalog).validate(&by_name).is_valid());

        let by_id = AnswerSet::new().with_many("diseases", ["1"]);
        assert!(validate(&schema, &by_id).is_valid());
        assert!(!Validator::new(&schema).with_catalog(&catalog).validate(&by_id).is_valid());
    }

    #[test]
    fn shape_mismatch_fails() {
        let answers = AnswerSet::new().with_many("hasNationalId", ["نعم"]);
        let report = validate(&id_schema(), &answers);
        assert_eq!(report.error_map()["hasNationalId"].rule, Rule::ShapeMismatch);
    }

    #[test]
    fn optional_empty_passes_length_rules() {
        let schema = FormSchema::new(
            vec![FieldDescriptor::text("note", "n", Section::Special).min_length(3)],
            vec![],
        )
        .unwrap();
        assert!(validate(&schema, &AnswerSet::new().with("note", "")).is_valid());
        assert!(!validate(&schema, &AnswerSet::new().with("note", "ab")).is_valid());
    }

    #[test]
    fn optional_over_max_length_fails() {
        let schema = FormSchema::new(
            vec![FieldDescriptor::text("note", "n", Section::Special).max_length(3)],
            vec![],
        )
        .unwrap();
        assert!(validate(&schema, &AnswerSet::new().with("note", "abc")).is_valid());

        let report = validate(&schema, &AnswerSet::new().with("note", "abcd"));
        assert_eq!(report.error_map()["note"].rule, Rule::MaxLength(3));
        assert_eq!(report.error_map()["note"].message, ValidationMessages::default().too_long(3));
    }

    #[test]
    fn required_if_rule_applies_only_when_holding() {
        let schema = FormSchema::new(
            vec![
                FieldDescriptor::select(
                    "hasBusiness",
                    "b",
                    Section::Employment,
                    OptionsSource::inline_pairs(&[("y", "نعم"), ("n", "لا")]),
                ),
                FieldDescriptor::text("businessType", "t", Section::Employment),
            ],
            vec![RequiredIfRule::new("businessType", Predicate::equals("hasBusiness", "نعم")).with_message("needed")],
        )
        .unwrap();

        let yes = AnswerSet::new().with("hasBusiness", "نعم");
        let issue = &validate(&schema, &yes).error_map()["businessType"];
        assert_eq!(issue.rule, Rule::RequiredIf);
        assert_eq!(issue.message, "needed");

        let no = AnswerSet::new().with("hasBusiness", "لا");
        assert!(validate(&schema, &no).is_valid());
    }

    #[test]
    fn custom_messages_are_used() {
        let messages = ValidationMessages::default().with_required("required");
        let report = Validator::new(&id_schema())
            .with_messages(&messages)
            .validate(&AnswerSet::new());
        assert_eq!(report.error_map()["hasNationalId"].message, "required");
    }
}
