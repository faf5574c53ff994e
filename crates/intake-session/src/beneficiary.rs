//! Beneficiary identity step

use crate::entry::EntryDetails;
use crate::error::SessionError;
use chrono::{DateTime, Utc};
use intake_engine::sheet::timestamp_cell;
use intake_engine::{AnswerSet, AnswerValue, FormEngine, SheetRow};
use intake_schema::builtin::beneficiary_fields as f;
use serde::{Deserialize, Serialize};

/// Validated identity data of the household's beneficiary
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Beneficiary {
    /// Full name, Arabic script
    pub name: String,
    /// 14-digit national id
    pub national_id: String,
    /// Gender option name
    pub gender: String,
    /// Primary mobile number
    pub phone1: String,
    /// Secondary mobile number
    pub phone2: Option<String>,
    /// WhatsApp number
    pub whatsapp: Option<String>,
    /// Number of household members, head included
    pub family_size: usize,
}

fn text(answers: &AnswerSet, id: &str) -> Option<String> {
    answers
        .get(id)
        .and_then(AnswerValue::as_text)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

impl Beneficiary {
    /// Validate beneficiary answers with `engine` (bound to the beneficiary form)
    ///
    /// # Errors
    /// Returns [`SessionError::InvalidBeneficiary`] with the field report, or
    /// [`SessionError::FamilySizeOutOfRange`] when the size is not in
    /// `1..=max_family_size`.
    pub fn from_answers(
        engine: &FormEngine,
        answers: &AnswerSet,
        max_family_size: usize,
    ) -> Result<Self, SessionError> {
        let report = engine.validate(answers);
        if !report.is_valid() {
            tracing::debug!("Beneficiary rejected with {} field errors", report.error_count());
            return Err(SessionError::InvalidBeneficiary(report));
        }

        // digits-only with at most two chars, so parsing cannot overflow
        let family_size = text(answers, f::FAMILY_SIZE)
            .and_then(|s| s.parse::<usize>().ok())
            .unwrap_or(0);
        if family_size == 0 || family_size > max_family_size {
            return Err(SessionError::FamilySizeOutOfRange {
                size: family_size,
                max: max_family_size,
            });
        }

        Ok(Self {
            name: text(answers, f::NAME).unwrap_or_default(),
            national_id: text(answers, f::NATIONAL_ID).unwrap_or_default(),
            gender: text(answers, f::GENDER).unwrap_or_default(),
            phone1: text(answers, f::PHONE1).unwrap_or_default(),
            phone2: text(answers, f::PHONE2),
            whatsapp: text(answers, f::WHATSAPP),
            family_size,
        })
    }

    /// Beneficiary sheet row for one visit
    #[must_use]
    pub fn sheet_row(&self, entry: &EntryDetails, now: DateTime<Utc>) -> SheetRow {
        SheetRow::new()
            .with("entryId", entry.entry_id.to_string())
            .with("researcherId", entry.researcher.id.as_str())
            .with("researcherName", entry.researcher.name.as_str())
            .with("coordinatorId", entry.coordinator.id.as_str())
            .with("coordinatorName", entry.coordinator.name.as_str())
            .with("visitDate", entry.visit_date.to_string())
            .with("beneficiaryName", self.name.as_str())
            .with("nationalId", self.national_id.as_str())
            .with("gender", self.gender.as_str())
            .with("phone1", self.phone1.as_str())
            .with("phone2", self.phone2.clone().unwrap_or_default())
            .with("whatsapp", self.whatsapp.clone().unwrap_or_default())
            .with("familySize", self.family_size.to_string())
            .with("timestamp", timestamp_cell(&now))
    }
}
