//! Option sources
//!
//! Option groups come from outside the schema. Loading gates engine
//! construction: a catalog missing any group the forms reference is
//! rejected before a session can start.

use crate::config::IntakeConfig;
use crate::error::OptionLoadError;
use intake_engine::FormEngine;
use intake_schema::{beneficiary_schema, household_member_schema, FormSchema, OptionCatalog};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Supplies the option catalog
#[async_trait::async_trait]
pub trait OptionSource: Send + Sync {
    /// Fetch every option group
    async fn fetch_options(&self) -> Result<OptionCatalog, OptionLoadError>;
}

/// In-memory catalog
#[derive(Debug, Clone, Default)]
pub struct StaticOptionSource {
    catalog: OptionCatalog,
}

impl StaticOptionSource {
    /// Serve a fixed catalog
    #[must_use]
    pub fn new(catalog: OptionCatalog) -> Self {
        Self { catalog }
    }
}

#[async_trait::async_trait]
impl OptionSource for StaticOptionSource {
    async fn fetch_options(&self) -> Result<OptionCatalog, OptionLoadError> {
        Ok(self.catalog.clone())
    }
}

/// Catalog stored as a JSON or YAML map of group key to `[{id, name}]`
///
/// Files ending in `.yaml` or `.yml` are read as YAML, anything else as JSON.
#[derive(Debug, Clone)]
pub struct FileOptionSource {
    path: PathBuf,
}

impl FileOptionSource {
    /// Read from `path`
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Source file
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn is_yaml(&self) -> bool {
        matches!(
            self.path.extension().and_then(|e| e.to_str()),
            Some("yaml" | "yml")
        )
    }
}

#[async_trait::async_trait]
impl OptionSource for FileOptionSource {
    async fn fetch_options(&self) -> Result<OptionCatalog, OptionLoadError> {
        let text = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|source| OptionLoadError::Io {
                path: self.path.clone(),
                source,
            })?;

        let malformed = |message: String| OptionLoadError::Malformed {
            path: self.path.clone(),
            message,
        };
        let catalog: OptionCatalog = if self.is_yaml() {
            serde_yaml::from_str(&text).map_err(|e| malformed(e.to_string()))?
        } else {
            serde_json::from_str(&text).map_err(|e| malformed(e.to_string()))?
        };

        tracing::debug!("Read {} option groups from {}", catalog.len(), self.path.display());
        Ok(catalog)
    }
}

/// Engines for both built-in forms sharing one catalog
#[derive(Debug, Clone)]
pub struct IntakeForms {
    /// Household-member form
    pub member: FormEngine,
    /// Beneficiary identity form
    pub beneficiary: FormEngine,
    /// Loaded options, including researchers and coordinators
    pub catalog: Arc<OptionCatalog>,
}

/// Group keys `schemas` and the entry step need but `catalog` lacks
#[must_use]
pub fn missing_groups(catalog: &OptionCatalog, schemas: &[&FormSchema]) -> Vec<String> {
    let mut missing: Vec<String> = schemas
        .iter()
        .flat_map(|schema| schema.missing_option_groups(catalog))
        .map(|key| key.as_str().to_string())
        .collect();

    for key in [OptionCatalog::RESEARCHERS, OptionCatalog::COORDINATORS] {
        if !catalog.contains_group(key) {
            missing.push(key.to_string());
        }
    }

    missing.sort();
    missing.dedup();
    missing
}

/// Fetch options and build engines for the built-in forms
///
/// # Errors
/// Propagates the source's error, or [`OptionLoadError::MissingGroups`]
/// when the catalog does not cover every referenced group.
pub async fn load_forms(
    source: &dyn OptionSource,
    config: &IntakeConfig,
) -> Result<IntakeForms, OptionLoadError> {
    let catalog = match source.fetch_options().await {
        Ok(catalog) => catalog,
        Err(e) => {
            tracing::warn!("Option fetch failed: {}", e);
            return Err(e);
        }
    };

    let member = household_member_schema();
    let beneficiary = beneficiary_schema();

    let missing = missing_groups(&catalog, &[&member, &beneficiary]);
    if !missing.is_empty() {
        tracing::error!("Catalog is missing {} option groups", missing.len());
        return Err(OptionLoadError::MissingGroups(missing));
    }

    let catalog = Arc::new(catalog);
    let build = |schema: FormSchema| {
        FormEngine::new(schema)
            .with_catalog(Arc::clone(&catalog))
            .with_messages(config.messages.clone())
            .with_separator(config.list_separator.clone())
    };

    tracing::info!("Loaded {} option groups", catalog.len());
    Ok(IntakeForms {
        member: build(member),
        beneficiary: build(beneficiary),
        catalog: Arc::clone(&catalog),
    })
}
