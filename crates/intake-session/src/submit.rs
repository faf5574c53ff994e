//! Two-phase final submission
//!
//! Phase one writes the beneficiary row, phase two the member rows. The
//! session remembers a successful phase one, so retrying after a phase-two
//! failure never writes the beneficiary twice. Both writes carry the same
//! [`SubmissionKey`].

use crate::error::SubmissionError;
use crate::sink::PersistenceSink;
use crate::wizard::{MemberWizard, WizardState};
use chrono::{DateTime, Utc};
use intake_engine::{EntryId, SheetRow};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Idempotency key shared by both writes of one session
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SubmissionKey(String);

impl SubmissionKey {
    /// Key derived from the entry id
    #[must_use]
    pub fn for_entry(entry_id: EntryId) -> Self {
        Self(format!("entry-{entry_id}"))
    }

    /// Key text
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SubmissionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Write stage of a submission
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmissionPhase {
    /// Beneficiary row
    Beneficiary,
    /// Member rows
    Members,
}

impl fmt::Display for SubmissionPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SubmissionPhase::Beneficiary => f.write_str("beneficiary"),
            SubmissionPhase::Members => f.write_str("members"),
        }
    }
}

/// Outcome of a successful submission
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionReceipt {
    /// Key both writes used
    pub key: SubmissionKey,
    /// Submitted visit
    pub entry_id: EntryId,
    /// Member rows written
    pub member_rows: usize,
    /// Beneficiary write skipped because an earlier attempt stored it
    pub beneficiary_skipped: bool,
}

/// Failed submission; the wizard and all answers are handed back
#[derive(Debug, thiserror::Error)]
#[error("submission failed: {error}")]
pub struct FailedSubmission {
    /// Wizard to retry with
    pub wizard: MemberWizard,
    /// Cause
    #[source]
    pub error: SubmissionError,
}

impl FailedSubmission {
    /// Recover the wizard for another attempt
    #[must_use]
    pub fn into_wizard(self) -> MemberWizard {
        self.wizard
    }
}

impl MemberWizard {
    /// Submit a complete session to `sink`
    ///
    /// Consumes the wizard on success.
    ///
    /// # Errors
    /// Returns the wizard inside [`FailedSubmission`] when the session is
    /// incomplete, a stored member is reopened for editing, or a sink write
    /// fails.
    pub async fn submit(
        mut self,
        sink: &dyn PersistenceSink,
        now: DateTime<Utc>,
    ) -> Result<SubmissionReceipt, Box<FailedSubmission>> {
        let session = self.session();
        if !session.is_complete() {
            let error = SubmissionError::Incomplete {
                stored: session.members.len(),
                expected: session.family_size(),
            };
            return Err(Box::new(FailedSubmission { wizard: self, error }));
        }
        if let WizardState::AwaitingMember(index) = self.state() {
            let error = SubmissionError::MemberReopened { index };
            return Err(Box::new(FailedSubmission { wizard: self, error }));
        }

        let entry_id = session.entry.entry_id;
        let key = SubmissionKey::for_entry(entry_id);
        let skipped = session.beneficiary_written();

        if skipped {
            tracing::info!("Beneficiary for {} already stored; skipping", key);
        } else {
            let row = session.beneficiary.sheet_row(&session.entry, now);
            if let Err(source) = sink.append_beneficiary(&key, row).await {
                tracing::warn!("Beneficiary write for {} failed: {}", key, source);
                let error = SubmissionError::Sink {
                    phase: SubmissionPhase::Beneficiary,
                    source,
                };
                return Err(Box::new(FailedSubmission { wizard: self, error }));
            }
            self.session_mut().beneficiary_written = true;
        }

        let rows: Vec<SheetRow> = self
            .session()
            .members
            .iter()
            .enumerate()
            .map(|(i, record)| self.engine().sheet_row(record, i))
            .collect();
        let member_rows = rows.len();

        if let Err(source) = sink.append_member_records(&key, entry_id, rows).await {
            tracing::warn!("Member write for {} failed: {}", key, source);
            let error = SubmissionError::Sink {
                phase: SubmissionPhase::Members,
                source,
            };
            return Err(Box::new(FailedSubmission { wizard: self, error }));
        }

        tracing::info!("Submitted {} with {} members", key, member_rows);
        Ok(SubmissionReceipt {
            key,
            entry_id,
            member_rows,
            beneficiary_skipped: skipped,
        })
    }
}
