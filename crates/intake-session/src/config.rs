//! Session configuration
//!
//! Loaded from TOML; every key is optional.
//!
//! ```toml
//! list_separator = " | "
//! max_family_size = 12
//! options_file = "options.yaml"
//! output_dir = "out"
//!
//! [messages]
//! required = "هذا الحقل مطلوب"
//! ```

use crate::error::ConfigError;
use intake_engine::{ValidationMessages, DEFAULT_SEPARATOR};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Intake configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IntakeConfig {
    /// Separator used when flattening list answers into cells
    pub list_separator: String,
    /// Largest accepted family size
    pub max_family_size: usize,
    /// Validation message overrides
    pub messages: ValidationMessages,
    /// Options file used when none is given on the command line
    pub options_file: Option<PathBuf>,
    /// Directory for JSON-lines sheets
    pub output_dir: PathBuf,
}

impl Default for IntakeConfig {
    fn default() -> Self {
        Self {
            list_separator: DEFAULT_SEPARATOR.to_string(),
            max_family_size: 20,
            messages: ValidationMessages::default(),
            options_file: None,
            output_dir: PathBuf::from("intake-out"),
        }
    }
}

impl IntakeConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse TOML text
    ///
    /// # Errors
    /// Returns [`ConfigError::Parse`] for malformed TOML and
    /// [`ConfigError::Invalid`] for unusable values.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse a TOML file
    ///
    /// # Errors
    /// Returns [`ConfigError::Io`] when the file cannot be read.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&text)?;
        tracing::debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Check value ranges
    ///
    /// # Errors
    /// Returns [`ConfigError::Invalid`] describing the first bad value.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_family_size == 0 {
            return Err(ConfigError::Invalid("max_family_size must be at least 1".into()));
        }
        Ok(())
    }

    /// With list separator
    #[inline]
    #[must_use]
    pub fn with_separator(mut self, separator: impl Into<String>) -> Self {
        self.list_separator = separator.into();
        self
    }

    /// With maximum family size
    #[inline]
    #[must_use]
    pub fn with_max_family_size(mut self, max: usize) -> Self {
        self.max_family_size = max;
        self
    }

    /// With validation messages
    #[inline]
    #[must_use]
    pub fn with_messages(mut self, messages: ValidationMessages) -> Self {
        self.messages = messages;
        self
    }

    /// With default options file
    #[inline]
    #[must_use]
    pub fn with_options_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.options_file = Some(path.into());
        self
    }

    /// With output directory
    #[inline]
    #[must_use]
    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = dir.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_toml_is_default() {
        assert_eq!(IntakeConfig::from_toml_str("").unwrap(), IntakeConfig::default());
    }

    #[test]
    fn partial_toml_overrides() {
        let config = IntakeConfig::from_toml_str(
            r#"
            list_separator = " | "
            max_family_size = 8

            [messages]
            required = "required"
            "#,
        )
        .unwrap();
        assert_eq!(config.list_separator, " | ");
        assert_eq!(config.max_family_size, 8);
        assert_eq!(config.messages.required, "required");
        assert_eq!(config.messages.digits_only, ValidationMessages::default().digits_only);
    }

    #[test]
    fn zero_family_size_rejected() {
        let err = IntakeConfig::from_toml_str("max_family_size = 0").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn type_errors_are_parse_errors() {
        let err = IntakeConfig::from_toml_str("max_family_size = \"many\"").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn builders() {
        let config = IntakeConfig::new()
            .with_separator(";")
            .with_max_family_size(3)
            .with_output_dir("/tmp/x")
            .with_options_file("opts.json");
        assert_eq!(config.list_separator, ";");
        assert_eq!(config.max_family_size, 3);
        assert_eq!(config.options_file.as_deref(), Some(Path::new("opts.json")));
    }
}
