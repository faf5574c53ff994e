//! Enumerated options
//!
//! Options are `{id, name}` pairs. The **name** is what gets stored as the
//! answer when an option is chosen; the id only identifies the option in
//! its source list.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;

/// One selectable option
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Choice {
    /// Identifier within the source list
    pub id: String,
    /// Display name, stored as the answer value
    pub name: String,
}

impl Choice {
    /// Create option
    #[inline]
    #[must_use]
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

/// Key of an externally supplied option group
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OptionGroupKey(String);

impl OptionGroupKey {
    /// Create key
    #[inline]
    #[must_use]
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// Borrow as string slice
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OptionGroupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for OptionGroupKey {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for OptionGroupKey {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// Where a select field's options come from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OptionsSource {
    /// Group fetched from the option source at session start
    Group(OptionGroupKey),
    /// Static list authored with the schema
    Inline(Vec<Choice>),
}

impl OptionsSource {
    /// Reference an external group
    #[inline]
    #[must_use]
    pub fn group(key: impl Into<String>) -> Self {
        Self::Group(OptionGroupKey::new(key))
    }

    /// Inline static list
    #[inline]
    #[must_use]
    pub fn inline(choices: Vec<Choice>) -> Self {
        Self::Inline(choices)
    }

    /// Inline list built from `(id, name)` pairs
    #[must_use]
    pub fn inline_pairs(pairs: &[(&str, &str)]) -> Self {
        Self::Inline(pairs.iter().map(|(id, name)| Choice::new(*id, *name)).collect())
    }
}

/// Option groups fetched from the option source
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OptionCatalog {
    groups: IndexMap<OptionGroupKey, Vec<Choice>>,
}

impl OptionCatalog {
    /// Researchers group key
    pub const RESEARCHERS: &'static str = "researchers";
    /// Coordinators group key
    pub const COORDINATORS: &'static str = "coordinators";

    /// Create empty catalog
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a group
    pub fn insert(&mut self, key: impl Into<String>, choices: Vec<Choice>) -> Option<Vec<Choice>> {
        self.groups.insert(OptionGroupKey::new(key), choices)
    }

    /// Builder form of [`insert`](Self::insert)
    #[must_use]
    pub fn with_group(mut self, key: impl Into<String>, choices: Vec<Choice>) -> Self {
        self.insert(key, choices);
        self
    }

    /// Look up group
    #[must_use]
    pub fn group(&self, key: &str) -> Option<&[Choice]> {
        self.groups.get(key).map(Vec::as_slice)
    }

    /// Whether a group is present
    #[must_use]
    pub fn contains_group(&self, key: &str) -> bool {
        self.groups.contains_key(key)
    }

    /// Resolve an options source against this catalog
    ///
    /// Inline lists always resolve; groups resolve when present.
    #[must_use]
    pub fn resolve<'a>(&'a self, source: &'a OptionsSource) -> Option<&'a [Choice]> {
        match source {
            OptionsSource::Inline(choices) => Some(choices.as_slice()),
            OptionsSource::Group(key) => self.group(key.as_str()),
        }
    }

    /// Find option by id within a group
    #[must_use]
    pub fn find_by_id(&self, key: &str, id: &str) -> Option<&Choice> {
        self.group(key)?.iter().find(|c| c.id == id)
    }

    /// Group keys in insertion order
    pub fn keys(&self) -> impl Iterator<Item = &OptionGroupKey> {
        self.groups.keys()
    }

    /// Number of groups
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    /// Whether the catalog has no groups
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}
