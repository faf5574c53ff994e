//! Entry step: who is visiting, when

use crate::error::SessionError;
use chrono::NaiveDate;
use intake_engine::EntryId;
use intake_schema::{Choice, OptionCatalog};
use serde::{Deserialize, Serialize};

/// Visit header resolved against the catalog
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntryDetails {
    /// Visit id shared by every row of this session
    pub entry_id: EntryId,
    /// Field researcher
    pub researcher: Choice,
    /// Supervising coordinator
    pub coordinator: Choice,
    /// Day of the visit
    pub visit_date: NaiveDate,
}

impl EntryDetails {
    /// Resolve staff ids and allocate a fresh entry id
    ///
    /// # Errors
    /// Returns [`SessionError::UnknownResearcher`] or
    /// [`SessionError::UnknownCoordinator`] when an id is not in the catalog.
    pub fn start(
        catalog: &OptionCatalog,
        researcher_id: &str,
        coordinator_id: &str,
        visit_date: NaiveDate,
    ) -> Result<Self, SessionError> {
        Self::resolve(catalog, EntryId::new_v4(), researcher_id, coordinator_id, visit_date)
    }

    /// Resolve staff ids for a known entry id
    ///
    /// # Errors
    /// Same as [`start`](Self::start).
    pub fn resolve(
        catalog: &OptionCatalog,
        entry_id: EntryId,
        researcher_id: &str,
        coordinator_id: &str,
        visit_date: NaiveDate,
    ) -> Result<Self, SessionError> {
        let researcher = catalog
            .find_by_id(OptionCatalog::RESEARCHERS, researcher_id)
            .cloned()
            .ok_or_else(|| SessionError::UnknownResearcher(researcher_id.to_string()))?;
        let coordinator = catalog
            .find_by_id(OptionCatalog::COORDINATORS, coordinator_id)
            .cloned()
            .ok_or_else(|| SessionError::UnknownCoordinator(coordinator_id.to_string()))?;

        tracing::info!(
            "Started entry {} for researcher {} on {}",
            entry_id,
            researcher.name,
            visit_date
        );
        Ok(Self {
            entry_id,
            researcher,
            coordinator,
            visit_date,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use intake_test_utils::{full_catalog, COORDINATOR_ID, COORDINATOR_NAME, RESEARCHER_ID, RESEARCHER_NAME};

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()
    }

    #[test]
    fn resolves_names_from_ids() {
        let entry = EntryDetails::start(&full_catalog(), RESEARCHER_ID, COORDINATOR_ID, date()).unwrap();
        assert_eq!(entry.researcher.name, RESEARCHER_NAME);
        assert_eq!(entry.coordinator.name, COORDINATOR_NAME);
    }

    #[test]
    fn fresh_entries_get_distinct_ids() {
        let a = EntryDetails::start(&full_catalog(), RESEARCHER_ID, COORDINATOR_ID, date()).unwrap();
        let b = EntryDetails::start(&full_catalog(), RESEARCHER_ID, COORDINATOR_ID, date()).unwrap();
        assert_ne!(a.entry_id, b.entry_id);
    }

    #[test]
    fn unknown_staff_rejected() {
        let err = EntryDetails::start(&full_catalog(), "nobody", COORDINATOR_ID, date()).unwrap_err();
        assert!(matches!(err, SessionError::UnknownResearcher(id) if id == "nobody"));

        let err = EntryDetails::start(&full_catalog(), RESEARCHER_ID, "nobody", date()).unwrap_err();
        assert!(matches!(err, SessionError::UnknownCoordinator(_)));
    }
}
