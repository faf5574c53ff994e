use anyhow::Context;
use clap::ArgMatches;
use intake_cli::commands::{self, SchemaChoice};
use intake_cli::{build_cli, logging};
use intake_session::IntakeConfig;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

fn path<'a>(args: &'a ArgMatches, name: &str) -> Option<&'a Path> {
    args.get_one::<PathBuf>(name).map(PathBuf::as_path)
}

fn schema_choice(args: &ArgMatches) -> SchemaChoice {
    if args.get_flag("beneficiary") {
        SchemaChoice::Beneficiary
    } else if let Some(file) = path(args, "schema") {
        SchemaChoice::File(file.to_path_buf())
    } else {
        SchemaChoice::Member
    }
}

fn required<'a>(args: &'a ArgMatches, name: &str) -> anyhow::Result<&'a Path> {
    path(args, name).with_context(|| format!("--{name} is required"))
}

async fn run(matches: &ArgMatches) -> anyhow::Result<bool> {
    let config = match path(matches, "config") {
        Some(file) => IntakeConfig::load(file)?,
        None => IntakeConfig::default(),
    };

    let mut stdout = std::io::stdout().lock();
    match matches.subcommand() {
        Some(("schema", args)) => commands::schema(&schema_choice(args), args.get_flag("json"), &mut stdout),
        Some(("evaluate", args)) => {
            commands::evaluate(
                &schema_choice(args),
                required(args, "answers")?,
                path(args, "options"),
                &config,
                &mut stdout,
            )
            .await
        }
        Some(("normalize", args)) => commands::normalize(
            &schema_choice(args),
            required(args, "answers")?,
            args.get_one::<String>("entry-id").map(String::as_str),
            args.get_flag("flat"),
            &config,
            &mut stdout,
        ),
        Some(("submit", args)) => {
            commands::submit(
                required(args, "session")?,
                path(args, "options"),
                path(args, "out"),
                &config,
                &mut stdout,
            )
            .await
        }
        _ => Ok(false),
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let matches = build_cli().get_matches();
    logging::init(matches.get_flag("log-json"));

    match run(&matches).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            tracing::error!("{:#}", e);
            eprintln!("error: {e:#}");
            ExitCode::from(2)
        }
    }
}
