//! Field descriptors
//!
//! A [`FieldDescriptor`] declares one form field: its key, kind-specific
//! rules, grouping, and an optional visibility predicate. Descriptors are
//! authored once and never mutated at runtime.

use crate::options::OptionsSource;
use crate::predicate::Predicate;
use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;

/// Unique field key, shared by answer maps and output records
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldId(String);

impl FieldId {
    /// Create field id
    #[inline]
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow as string slice
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FieldId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for FieldId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for FieldId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for FieldId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Display grouping
///
/// Declaration order is the fixed display order. Sections never affect
/// validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Section {
    /// Identity and household role
    Basic,
    /// Schooling and literacy
    Education,
    /// Work, business, skills, training
    Employment,
    /// Illness, disability, treatment
    Health,
    /// Sensitive household questions
    Special,
}

impl Section {
    /// All sections in display order
    pub const ALL: [Section; 5] = [
        Section::Basic,
        Section::Education,
        Section::Employment,
        Section::Health,
        Section::Special,
    ];

    /// Stable lowercase name
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Section::Basic => "basic",
            Section::Education => "education",
            Section::Employment => "employment",
            Section::Health => "health",
            Section::Special => "special",
        }
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Character-class restriction for text answers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PatternKind {
    /// Arabic block (U+0600..U+06FF) and whitespace only
    ArabicOnly,
    /// ASCII digits only
    DigitsOnly,
    /// Egyptian mobile number: 010/011/012/015 followed by eight digits
    EgyptianMobile,
}

/// Rules carried by text fields
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextRules {
    /// Maximum length in characters
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_length: Option<usize>,
    /// Minimum length in characters (only checked for non-empty answers)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_length: Option<usize>,
    /// Character-class restriction
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<PatternKind>,
}

/// Field kind with its kind-specific rule payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum FieldKind {
    /// Free text
    Text(TextRules),
    /// Exactly one option name
    #[serde(rename = "select")]
    SingleSelect {
        /// Where the option list comes from
        options: OptionsSource,
    },
    /// Zero or more option names
    #[serde(rename = "checkbox-group")]
    MultiSelectGroup {
        /// Where the option list comes from
        options: OptionsSource,
    },
}

impl FieldKind {
    /// Whether answers for this kind are lists
    #[inline]
    #[must_use]
    pub fn is_list(&self) -> bool {
        matches!(self, FieldKind::MultiSelectGroup { .. })
    }

    /// Option source, for select kinds
    #[must_use]
    pub fn options(&self) -> Option<&OptionsSource> {
        match self {
            FieldKind::Text(_) => None,
            FieldKind::SingleSelect { options } | FieldKind::MultiSelectGroup { options } => {
                Some(options)
            }
        }
    }

    /// Short kind name as used in serialized schemas
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        match self {
            FieldKind::Text(_) => "text",
            FieldKind::SingleSelect { .. } => "select",
            FieldKind::MultiSelectGroup { .. } => "checkbox-group",
        }
    }
}

/// Static declaration of one form field
///
/// Documents are read strictly: unknown keys, options on a text field and
/// text rules on a select field are all rejected. Rule keys may be written
/// in snake or camel case.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawDescriptor")]
pub struct FieldDescriptor {
    /// Unique key
    pub id: FieldId,
    /// Kind and kind-specific rules
    #[serde(flatten)]
    pub kind: FieldKind,
    /// Prompt shown to the researcher
    pub label: String,
    /// Display grouping
    pub section: Section,
    /// Static requiredness
    #[serde(default)]
    pub required: bool,
    /// Visibility predicate over another field's answer
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub depends_on: Option<Predicate>,
    /// Input hint
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "kebab-case")]
enum KindTag {
    Text,
    Select,
    CheckboxGroup,
}

/// Flat wire form of a descriptor
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawDescriptor {
    id: FieldId,
    #[serde(rename = "type")]
    kind: KindTag,
    label: String,
    section: Section,
    #[serde(default)]
    required: bool,
    #[serde(default, alias = "dependsOn")]
    depends_on: Option<Predicate>,
    #[serde(default)]
    placeholder: Option<String>,
    #[serde(default, alias = "maxLength")]
    max_length: Option<usize>,
    #[serde(default, alias = "minLength")]
    min_length: Option<usize>,
    #[serde(default)]
    pattern: Option<PatternKind>,
    #[serde(default)]
    options: Option<OptionsSource>,
}

impl TryFrom<RawDescriptor> for FieldDescriptor {
    type Error = String;

    fn try_from(raw: RawDescriptor) -> Result<Self, Self::Error> {
        let has_text_rules = raw.max_length.is_some() || raw.min_length.is_some() || raw.pattern.is_some();
        let kind = match (raw.kind, raw.options) {
            (KindTag::Text, None) => FieldKind::Text(TextRules {
                max_length: raw.max_length,
                min_length: raw.min_length,
                pattern: raw.pattern,
            }),
            (KindTag::Text, Some(_)) => return Err(format!("text field '{}' takes no options", raw.id)),
            (_, None) => return Err(format!("select field '{}' has no options", raw.id)),
            (_, Some(_)) if has_text_rules => {
                return Err(format!("select field '{}' takes no length or pattern rules", raw.id))
            }
            (KindTag::Select, Some(options)) => FieldKind::SingleSelect { options },
            (KindTag::CheckboxGroup, Some(options)) => FieldKind::MultiSelectGroup { options },
        };

        Ok(Self {
            id: raw.id,
            kind,
            label: raw.label,
            section: raw.section,
            required: raw.required,
            depends_on: raw.depends_on,
            placeholder: raw.placeholder,
        })
    }
}

impl FieldDescriptor {
    fn new(id: impl Into<FieldId>, kind: FieldKind, label: impl Into<String>, section: Section) -> Self {
        Self {
            id: id.into(),
            kind,
            label: label.into(),
            section,
            required: false,
            depends_on: None,
            placeholder: None,
        }
    }

    /// Text field with no restrictions
    #[must_use]
    pub fn text(id: impl Into<FieldId>, label: impl Into<String>, section: Section) -> Self {
        Self::new(id, FieldKind::Text(TextRules::default()), label, section)
    }

    /// Single-select field
    #[must_use]
    pub fn select(
        id: impl Into<FieldId>,
        label: impl Into<String>,
        section: Section,
        options: OptionsSource,
    ) -> Self {
        Self::new(id, FieldKind::SingleSelect { options }, label, section)
    }

    /// Multi-select checkbox group
    #[must_use]
    pub fn checkbox_group(
        id: impl Into<FieldId>,
        label: impl Into<String>,
        section: Section,
        options: OptionsSource,
    ) -> Self {
        Self::new(id, FieldKind::MultiSelectGroup { options }, label, section)
    }

    /// Mark as required
    #[inline]
    #[must_use]
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Attach visibility predicate
    #[inline]
    #[must_use]
    pub fn depends_on(mut self, predicate: Predicate) -> Self {
        self.depends_on = Some(predicate);
        self
    }

    /// Attach input hint
    #[inline]
    #[must_use]
    pub fn placeholder(mut self, hint: impl Into<String>) -> Self {
        self.placeholder = Some(hint.into());
        self
    }

    /// Set maximum length (text fields only; ignored otherwise)
    #[must_use]
    pub fn max_length(mut self, n: usize) -> Self {
        if let FieldKind::Text(rules) = &mut self.kind {
            rules.max_length = Some(n);
        }
        self
    }

    /// Set minimum length (text fields only; ignored otherwise)
    #[must_use]
    pub fn min_length(mut self, n: usize) -> Self {
        if let FieldKind::Text(rules) = &mut self.kind {
            rules.min_length = Some(n);
        }
        self
    }

    /// Set character-class pattern (text fields only; ignored otherwise)
    #[must_use]
    pub fn pattern(mut self, pattern: PatternKind) -> Self {
        if let FieldKind::Text(rules) = &mut self.kind {
            rules.pattern = Some(pattern);
        }
        self
    }
}
