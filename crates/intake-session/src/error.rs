//! Error types for intake sessions
//!
//! - Option loading failures (gate engine construction)
//! - Entry step and beneficiary problems
//! - Member wizard misuse
//! - Sink failures during submission
//! - Configuration loading

use crate::submit::SubmissionPhase;
use intake_engine::ValidationReport;
use std::path::PathBuf;

/// Option catalog could not be loaded
#[derive(Debug, thiserror::Error)]
pub enum OptionLoadError {
    /// Reading the source failed
    #[error("failed to read options from {path}: {source}")]
    Io {
        /// Source file
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// Source content is not a valid catalog
    #[error("malformed options in {path}: {message}")]
    Malformed {
        /// Source file
        path: PathBuf,
        /// Parser message
        message: String,
    },

    /// Groups referenced by the forms are absent
    #[error("option groups missing from catalog: {}", .0.join(", "))]
    MissingGroups(Vec<String>),

    /// Remote or in-memory source is not available right now
    #[error("option source unavailable: {0}")]
    Unavailable(String),
}

impl OptionLoadError {
    /// Whether trying again may succeed without changing the data
    #[inline]
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, OptionLoadError::Io { .. } | OptionLoadError::Unavailable(_))
    }

    /// Whether the catalog data itself must be fixed
    #[inline]
    #[must_use]
    pub fn is_user_error(&self) -> bool {
        matches!(self, OptionLoadError::Malformed { .. } | OptionLoadError::MissingGroups(_))
    }
}

/// Entry step or beneficiary step rejected
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// Researcher id is not in the catalog
    #[error("unknown researcher: {0}")]
    UnknownResearcher(String),

    /// Coordinator id is not in the catalog
    #[error("unknown coordinator: {0}")]
    UnknownCoordinator(String),

    /// Beneficiary answers failed validation
    #[error("beneficiary data invalid ({} fields)", .0.error_count())]
    InvalidBeneficiary(ValidationReport),

    /// Family size outside `1..=max`
    #[error("family size {size} outside 1..={max}")]
    FamilySizeOutOfRange {
        /// Requested size
        size: usize,
        /// Configured maximum
        max: usize,
    },
}

impl SessionError {
    /// Field-level report when validation caused the error
    #[must_use]
    pub fn report(&self) -> Option<&ValidationReport> {
        match self {
            SessionError::InvalidBeneficiary(report) => Some(report),
            _ => None,
        }
    }
}

/// Member wizard operation rejected
#[derive(Debug, thiserror::Error)]
pub enum WizardError {
    /// Member answers failed validation; state unchanged
    #[error("member {index} has {} invalid fields", .report.error_count())]
    InvalidMember {
        /// Member position
        index: usize,
        /// Field outcomes
        report: ValidationReport,
    },

    /// `back` at the first member
    #[error("already at the first member")]
    AtFirstMember,

    /// Member submitted after every member is stored
    #[error("all {0} members are already stored")]
    AlreadyComplete(usize),
}

impl WizardError {
    /// Field report of a rejected member
    #[must_use]
    pub fn report(&self) -> Option<&ValidationReport> {
        match self {
            WizardError::InvalidMember { report, .. } => Some(report),
            _ => None,
        }
    }
}

/// Sink could not persist rows
#[derive(Debug, thiserror::Error)]
pub enum SinkError {
    /// Filesystem failure
    #[error("sink io error: {0}")]
    Io(#[from] std::io::Error),

    /// Row could not be encoded
    #[error("sink encoding error: {0}")]
    Encode(#[from] serde_json::Error),

    /// Backend refused the write
    #[error("sink rejected write: {0}")]
    Rejected(String),
}

/// Final submission failed
#[derive(Debug, thiserror::Error)]
pub enum SubmissionError {
    /// Not every member has been stored
    #[error("session incomplete: {stored} of {expected} members stored")]
    Incomplete {
        /// Stored records
        stored: usize,
        /// Family size
        expected: usize,
    },

    /// Every member is stored but the wizard was moved back to edit one
    #[error("member {index} is reopened for editing; resubmit it before submitting the session")]
    MemberReopened {
        /// Member position being edited
        index: usize,
    },

    /// A sink write failed
    #[error("{phase} write failed: {source}")]
    Sink {
        /// Phase that failed
        phase: SubmissionPhase,
        /// Underlying error
        #[source]
        source: SinkError,
    },
}

impl SubmissionError {
    /// Whether retrying the same session may succeed
    #[inline]
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, SubmissionError::Sink { .. })
    }
}

/// Configuration could not be loaded
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Reading the file failed
    #[error("failed to read config {path}: {source}")]
    Io {
        /// Config file
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// TOML syntax or type error
    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),

    /// Values parse but are unusable
    #[error("invalid config value: {0}")]
    Invalid(String),
}
