//! Intake Schema
//!
//! Declarative field schema for conditional survey forms.
//!
//! # Overview
//!
//! - **FieldDescriptor**: one field's kind, rules, section and visibility predicate
//! - **FormSchema**: checked, ordered field list with cross-field rules
//! - **OptionCatalog**: externally supplied `{id, name}` option groups
//! - **builtin**: the household-member and beneficiary forms
//!
//! # Example
//!
//! ```rust
//! use intake_schema::{FieldDescriptor, FormSchema, OptionsSource, Predicate, Section};
//!
//! let schema = FormSchema::new(
//!     vec![
//!         FieldDescriptor::select("hasNationalId", "Has id?", Section::Basic, OptionsSource::group("hasId"))
//!             .required(),
//!         FieldDescriptor::text("nationalId", "National id", Section::Basic)
//!             .required()
//!             .max_length(14)
//!             .depends_on(Predicate::equals("hasNationalId", "نعم")),
//!     ],
//!     vec![],
//! )
//! .unwrap();
//!
//! assert_eq!(schema.len(), 2);
//! ```

#![warn(missing_docs)]

pub mod builtin;
pub mod error;
pub mod field;
pub mod options;
pub mod predicate;
pub mod rules;
pub mod schema;

// Re-exports
pub use builtin::{beneficiary_schema, household_member_schema, NO, OTHER, YES};
pub use error::SchemaError;
pub use field::{FieldDescriptor, FieldId, FieldKind, PatternKind, Section, TextRules};
pub use options::{Choice, OptionCatalog, OptionGroupKey, OptionsSource};
pub use predicate::{Condition, Predicate};
pub use rules::RequiredIfRule;
pub use schema::{FormSchema, RESERVED_FIELD_IDS};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
