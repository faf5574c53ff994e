//! `survey-intake` command-line front end

#![warn(missing_docs)]

pub mod cli;
pub mod commands;
pub mod logging;
pub mod replay;

pub use cli::build_cli;
pub use replay::{replay, VisitScript};
