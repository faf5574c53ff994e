//! Recorded visits
//!
//! A visit file captures what a researcher entered: the entry step, the
//! beneficiary answers and one answer set per member. Replaying it drives
//! the same session steps an interactive front end would.

use anyhow::{anyhow, Context};
use chrono::{NaiveDate, Utc};
use intake_engine::{AnswerSet, EntryId};
use intake_session::{Beneficiary, EntryDetails, EntrySession, IntakeConfig, IntakeForms, MemberWizard};
use serde::{Deserialize, Serialize};

/// One recorded visit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VisitScript {
    /// Fixed entry id; a fresh one is allocated when absent
    #[serde(default)]
    pub entry_id: Option<EntryId>,
    /// Researcher option id
    pub researcher_id: String,
    /// Coordinator option id
    pub coordinator_id: String,
    /// Day of the visit
    pub visit_date: NaiveDate,
    /// Beneficiary form answers
    pub beneficiary: AnswerSet,
    /// Member form answers, household head first
    pub members: Vec<AnswerSet>,
}

/// Run a recorded visit through the entry, beneficiary and member steps
///
/// # Errors
/// Fails on unknown staff, invalid beneficiary data, a member count that
/// differs from the family size, or an invalid member answer set.
pub fn replay(script: &VisitScript, forms: &IntakeForms, config: &IntakeConfig) -> anyhow::Result<MemberWizard> {
    let entry = match script.entry_id {
        Some(id) => EntryDetails::resolve(
            &forms.catalog,
            id,
            &script.researcher_id,
            &script.coordinator_id,
            script.visit_date,
        ),
        None => EntryDetails::start(
            &forms.catalog,
            &script.researcher_id,
            &script.coordinator_id,
            script.visit_date,
        ),
    }
    .context("entry step rejected")?;

    let beneficiary = Beneficiary::from_answers(&forms.beneficiary, &script.beneficiary, config.max_family_size)
        .map_err(|e| match e.report().map(describe_errors) {
            Some(detail) => anyhow!("{e}: {detail}"),
            None => anyhow!(e),
        })
        .context("beneficiary step rejected")?;

    if script.members.len() != beneficiary.family_size {
        return Err(anyhow!(
            "visit records {} members but family size is {}",
            script.members.len(),
            beneficiary.family_size
        ));
    }

    let mut wizard = MemberWizard::new(forms.member.clone(), EntrySession::new(entry, beneficiary));
    for (i, answers) in script.members.iter().enumerate() {
        wizard
            .submit_member(answers.clone(), Utc::now())
            .map_err(|e| match e.report().map(describe_errors) {
                Some(detail) => anyhow!("{e}: {detail}"),
                None => anyhow!(e),
            })
            .with_context(|| format!("member {} rejected", i + 1))?;
    }
    Ok(wizard)
}

/// `field: message` pairs joined for one-line error output
#[must_use]
pub fn describe_errors(report: &intake_engine::ValidationReport) -> String {
    report
        .errors()
        .map(|(id, issue)| format!("{id}: {}", issue.message))
        .collect::<Vec<_>>()
        .join("; ")
}
