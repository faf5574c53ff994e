//! Intake Engine
//!
//! Evaluates answer sets against a [`FormSchema`](intake_schema::FormSchema):
//! which fields are active, whether the active ones are valid, and the
//! schema-complete record a finished form produces.
//!
//! Every operation here is a pure function of its inputs.
//!
//! # Example
//!
//! ```rust
//! use intake_engine::{AnswerSet, FormEngine};
//! use intake_schema::household_member_schema;
//!
//! let engine = FormEngine::new(household_member_schema());
//! let answers = AnswerSet::new().with("hasNationalId", "لا");
//!
//! let evaluation = engine.evaluate(&answers);
//! assert!(!evaluation.active.iter().any(|id| id.as_str() == "nationalId"));
//! ```

#![warn(missing_docs)]

pub mod activity;
pub mod answer;
pub mod engine;
pub mod messages;
pub mod record;
pub mod sheet;
pub mod validation;

pub use activity::{active_fields, ActiveSet};
pub use answer::{AnswerSet, AnswerValue};
pub use engine::{Evaluation, FormEngine};
pub use messages::ValidationMessages;
pub use record::{normalize, EntryId, MemberRecord, RecordValue};
pub use sheet::{SheetRow, DEFAULT_SEPARATOR};
pub use validation::{validate, FieldIssue, Outcome, Rule, ValidationReport, Validator};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
