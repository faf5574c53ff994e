//! Command-line definition

use clap::{value_parser, Arg, ArgAction, Command};
use std::path::PathBuf;

fn path_arg(name: &'static str, help: &'static str) -> Arg {
    Arg::new(name)
        .long(name)
        .value_name("FILE")
        .value_parser(value_parser!(PathBuf))
        .help(help)
}

fn beneficiary_flag() -> Arg {
    Arg::new("beneficiary")
        .long("beneficiary")
        .action(ArgAction::SetTrue)
        .conflicts_with("schema")
        .help("Use the built-in beneficiary form instead of the member form")
}

/// Build the `survey-intake` command
#[must_use]
pub fn build_cli() -> Command {
    Command::new("survey-intake")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Household survey intake: conditional forms, member wizard, sheet export")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(path_arg("config", "TOML configuration file").global(true))
        .arg(
            Arg::new("log-json")
                .long("log-json")
                .action(ArgAction::SetTrue)
                .global(true)
                .help("Emit logs as JSON lines"),
        )
        .subcommand(
            Command::new("schema")
                .about("Check a form schema and list its fields by section")
                .arg(path_arg("schema", "Schema file (JSON or YAML); defaults to the member form"))
                .arg(beneficiary_flag())
                .arg(
                    Arg::new("json")
                        .long("json")
                        .action(ArgAction::SetTrue)
                        .help("Print the schema document as JSON"),
                ),
        )
        .subcommand(
            Command::new("evaluate")
                .about("Print active fields and validation outcomes for an answer file")
                .arg(path_arg("answers", "Answer file (JSON or YAML)").required(true))
                .arg(path_arg("schema", "Schema file (JSON or YAML); defaults to the member form"))
                .arg(beneficiary_flag())
                .arg(path_arg("options", "Option catalog used for option-name checks")),
        )
        .subcommand(
            Command::new("normalize")
                .about("Print the normalized record for an answer file")
                .arg(path_arg("answers", "Answer file (JSON or YAML)").required(true))
                .arg(path_arg("schema", "Schema file (JSON or YAML); defaults to the member form"))
                .arg(beneficiary_flag())
                .arg(
                    Arg::new("entry-id")
                        .long("entry-id")
                        .value_name("UUID")
                        .help("Entry id to stamp on the record; random when omitted"),
                )
                .arg(
                    Arg::new("flat")
                        .long("flat")
                        .action(ArgAction::SetTrue)
                        .help("Print the flattened sheet row instead"),
                ),
        )
        .subcommand(
            Command::new("submit")
                .about("Replay a recorded visit through the wizard and submit it")
                .arg(path_arg("session", "Recorded visit (JSON or YAML)").required(true))
                .arg(path_arg("options", "Option catalog; defaults to options_file from config"))
                .arg(
                    Arg::new("out")
                        .long("out")
                        .value_name("DIR")
                        .value_parser(value_parser!(PathBuf))
                        .help("Output directory for JSON-lines sheets; defaults to output_dir from config"),
                ),
        )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_is_well_formed() {
        build_cli().debug_assert();
    }

    #[test]
    fn global_config_after_subcommand() {
        let matches = build_cli()
            .try_get_matches_from(["survey-intake", "schema", "--config", "intake.toml"])
            .unwrap();
        assert_eq!(
            matches.get_one::<PathBuf>("config"),
            Some(&PathBuf::from("intake.toml"))
        );
    }

    #[test]
    fn evaluate_requires_answers() {
        assert!(build_cli()
            .try_get_matches_from(["survey-intake", "evaluate"])
            .is_err());
    }
}
