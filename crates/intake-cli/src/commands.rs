//! Subcommand implementations
//!
//! Each command writes its result to `out` and reports success as a bool;
//! `main` maps that to the exit status.

use crate::replay::{replay, VisitScript};
use anyhow::{anyhow, Context};
use chrono::Utc;
use intake_engine::{AnswerSet, EntryId, FormEngine};
use intake_schema::{beneficiary_schema, household_member_schema, FormSchema};
use intake_session::{load_forms, FileOptionSource, IntakeConfig, JsonlSink, OptionSource};
use serde::de::DeserializeOwned;
use std::io::Write;
use std::path::{Path, PathBuf};

fn is_yaml(path: &Path) -> bool {
    matches!(path.extension().and_then(|e| e.to_str()), Some("yaml" | "yml"))
}

/// Read a JSON or YAML document, chosen by file extension
///
/// # Errors
/// Fails when the file cannot be read or parsed.
pub fn read_document<T: DeserializeOwned>(path: &Path) -> anyhow::Result<T> {
    let text = std::fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
    if is_yaml(path) {
        serde_yaml::from_str(&text).with_context(|| format!("invalid YAML in {}", path.display()))
    } else {
        serde_json::from_str(&text).with_context(|| format!("invalid JSON in {}", path.display()))
    }
}

/// Which schema a command works on
#[derive(Debug, Clone, Default)]
pub enum SchemaChoice {
    /// Built-in household-member form
    #[default]
    Member,
    /// Built-in beneficiary form
    Beneficiary,
    /// Schema file
    File(PathBuf),
}

impl SchemaChoice {
    /// Load and check the schema
    ///
    /// # Errors
    /// Fails when a schema file cannot be read or is malformed.
    pub fn load(&self) -> anyhow::Result<FormSchema> {
        match self {
            SchemaChoice::Member => Ok(household_member_schema()),
            SchemaChoice::Beneficiary => Ok(beneficiary_schema()),
            SchemaChoice::File(path) => {
                let text =
                    std::fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
                let schema = if is_yaml(path) {
                    FormSchema::from_yaml(&text)
                } else {
                    FormSchema::from_json(&text)
                };
                schema.with_context(|| format!("invalid schema {}", path.display()))
            }
        }
    }
}

/// `schema`: list fields by section, or print the document
///
/// # Errors
/// Fails when the schema cannot be loaded.
pub fn schema(choice: &SchemaChoice, json: bool, out: &mut dyn Write) -> anyhow::Result<bool> {
    let schema = choice.load()?;
    if json {
        writeln!(out, "{}", schema.to_json()?)?;
        return Ok(true);
    }

    writeln!(out, "{} fields, {} rules", schema.len(), schema.rules().len())?;
    for (section, fields) in schema.by_section() {
        writeln!(out, "[{}]", section.as_str())?;
        for field in fields {
            let required = if field.required { "*" } else { " " };
            let dependency = field
                .depends_on
                .as_ref()
                .map(|p| format!("  (after {})", p.field))
                .unwrap_or_default();
            writeln!(
                out,
                "  {required} {:<32} {:<15} {}{dependency}",
                field.id.as_str(),
                field.kind.type_name(),
                field.label
            )?;
        }
    }
    Ok(true)
}

async fn engine_for(choice: &SchemaChoice, options: Option<&Path>, config: &IntakeConfig) -> anyhow::Result<FormEngine> {
    let schema = choice.load()?;
    let mut engine = FormEngine::new(schema)
        .with_messages(config.messages.clone())
        .with_separator(config.list_separator.clone());

    if let Some(path) = options {
        let catalog = FileOptionSource::new(path).fetch_options().await?;
        let missing: Vec<_> = engine
            .schema()
            .missing_option_groups(&catalog)
            .into_iter()
            .map(|k| k.as_str().to_string())
            .collect();
        if !missing.is_empty() {
            tracing::warn!("Options file lacks groups {}; their answers are not checked", missing.join(", "));
        }
        engine = engine.with_catalog(catalog);
    }
    Ok(engine)
}

/// `evaluate`: active fields and outcomes as JSON; `false` when invalid
///
/// # Errors
/// Fails when inputs cannot be loaded.
pub async fn evaluate(
    choice: &SchemaChoice,
    answers: &Path,
    options: Option<&Path>,
    config: &IntakeConfig,
    out: &mut dyn Write,
) -> anyhow::Result<bool> {
    let engine = engine_for(choice, options, config).await?;
    let answers: AnswerSet = read_document(answers)?;

    let evaluation = engine.evaluate(&answers);
    let output = serde_json::json!({
        "valid": evaluation.is_valid(),
        "active": evaluation.active,
        "outcomes": evaluation.report,
    });
    writeln!(out, "{}", serde_json::to_string_pretty(&output)?)?;
    Ok(evaluation.is_valid())
}

/// `normalize`: print the record or its sheet row
///
/// # Errors
/// Fails when inputs cannot be loaded or the entry id is malformed.
pub fn normalize(
    choice: &SchemaChoice,
    answers: &Path,
    entry_id: Option<&str>,
    flat: bool,
    config: &IntakeConfig,
    out: &mut dyn Write,
) -> anyhow::Result<bool> {
    let engine = FormEngine::new(choice.load()?).with_separator(config.list_separator.clone());
    let answers: AnswerSet = read_document(answers)?;
    let entry_id = match entry_id {
        Some(text) => text
            .parse::<EntryId>()
            .with_context(|| format!("invalid entry id {text}"))?,
        None => EntryId::new_v4(),
    };

    let record = engine.normalize(&answers, entry_id, Utc::now());
    let text = if flat {
        serde_json::to_string_pretty(&engine.sheet_row(&record, 0))?
    } else {
        serde_json::to_string_pretty(&record)?
    };
    writeln!(out, "{text}")?;
    Ok(true)
}

/// `submit`: replay a visit and write it to JSON-lines sheets
///
/// # Errors
/// Fails when options cannot be loaded, the visit is rejected, or the sink
/// write fails.
pub async fn submit(
    visit: &Path,
    options: Option<&Path>,
    out_dir: Option<&Path>,
    config: &IntakeConfig,
    out: &mut dyn Write,
) -> anyhow::Result<bool> {
    let options = options
        .map(Path::to_path_buf)
        .or_else(|| config.options_file.clone())
        .ok_or_else(|| anyhow!("no options file given and none configured"))?;
    let out_dir = out_dir.map_or_else(|| config.output_dir.clone(), Path::to_path_buf);

    let forms = load_forms(&FileOptionSource::new(&options), config)
        .await
        .context("failed to load options")?;
    let script: VisitScript = read_document(visit)?;
    let wizard = replay(&script, &forms, config)?;

    let sink = JsonlSink::new(&out_dir);
    match wizard.submit(&sink, Utc::now()).await {
        Ok(receipt) => {
            writeln!(out, "{}", serde_json::to_string_pretty(&receipt)?)?;
            Ok(true)
        }
        Err(failed) => {
            let retryable = failed.error.is_retryable();
            tracing::error!("Submission failed (retryable: {}): {}", retryable, failed.error);
            Err(anyhow!(failed.error)).context("submission failed")
        }
    }
}
