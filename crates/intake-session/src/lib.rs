//! Intake Session
//!
//! One researcher visit from the entry step to the final submission:
//!
//! 1. **Options**: fetch the catalog and build the form engines ([`load_forms`])
//! 2. **Entry**: resolve researcher and coordinator ([`EntryDetails`])
//! 3. **Beneficiary**: validate identity data and family size ([`Beneficiary`])
//! 4. **Members**: collect one record per member ([`MemberWizard`])
//! 5. **Submit**: beneficiary row, then member rows ([`MemberWizard::submit`])
//!
//! A failed submission hands the wizard back so nothing entered is lost.

#![warn(missing_docs)]

pub mod beneficiary;
pub mod config;
pub mod entry;
pub mod error;
pub mod sink;
pub mod source;
pub mod submit;
pub mod wizard;

pub use beneficiary::Beneficiary;
pub use config::IntakeConfig;
pub use entry::EntryDetails;
pub use error::{ConfigError, OptionLoadError, SessionError, SinkError, SubmissionError, WizardError};
pub use sink::{JsonlSink, MemorySink, PersistenceSink};
pub use source::{load_forms, FileOptionSource, IntakeForms, OptionSource, StaticOptionSource};
pub use submit::{FailedSubmission, SubmissionKey, SubmissionPhase, SubmissionReceipt};
pub use wizard::{EntrySession, MemberWizard, WizardState};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
