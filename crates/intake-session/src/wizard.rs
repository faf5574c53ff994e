//! Member wizard
//!
//! Walks the household one member at a time. States are
//! `AwaitingMember(i)` for `i` in `0..family_size` and `Complete`.
//!
//! ```text
//! AwaitingMember(0) --submit--> AwaitingMember(1) --submit--> ... --submit--> Complete
//!        ^                              |                                      |
//!        +------------back--------------+           AwaitingMember(n-1) <--back+
//! ```
//!
//! Stored records are never discarded by `back`; resubmitting a member
//! replaces its record in place.

use crate::beneficiary::Beneficiary;
use crate::entry::EntryDetails;
use crate::error::WizardError;
use chrono::{DateTime, Utc};
use intake_engine::{AnswerSet, Evaluation, FormEngine, MemberRecord};
use serde::Serialize;
use std::fmt;

/// Wizard position
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "state", content = "index", rename_all = "snake_case")]
pub enum WizardState {
    /// Waiting for the member at this index (0 = household head)
    AwaitingMember(usize),
    /// Every member is stored
    Complete,
}

impl fmt::Display for WizardState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WizardState::AwaitingMember(i) => write!(f, "awaiting member {}", i + 1),
            WizardState::Complete => f.write_str("complete"),
        }
    }
}

/// Everything collected during one visit
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EntrySession {
    /// Visit header
    pub entry: EntryDetails,
    /// Household beneficiary
    pub beneficiary: Beneficiary,
    /// One record per completed member, index 0 = household head
    pub members: Vec<MemberRecord>,
    /// Answers each record was built from
    #[serde(skip)]
    pub(crate) answers: Vec<AnswerSet>,
    /// Beneficiary row already persisted by an earlier attempt
    #[serde(skip)]
    pub(crate) beneficiary_written: bool,
}

impl EntrySession {
    /// New session with no members stored
    #[must_use]
    pub fn new(entry: EntryDetails, beneficiary: Beneficiary) -> Self {
        Self {
            entry,
            beneficiary,
            members: Vec::new(),
            answers: Vec::new(),
            beneficiary_written: false,
        }
    }

    /// Declared household size
    #[inline]
    #[must_use]
    pub fn family_size(&self) -> usize {
        self.beneficiary.family_size
    }

    /// Whether every member is stored
    #[inline]
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.members.len() == self.family_size()
    }

    /// Whether the beneficiary phase of submission already succeeded
    #[inline]
    #[must_use]
    pub fn beneficiary_written(&self) -> bool {
        self.beneficiary_written
    }
}

/// Multi-member coordinator over one [`EntrySession`]
#[derive(Debug, Clone)]
pub struct MemberWizard {
    engine: FormEngine,
    session: EntrySession,
    state: WizardState,
}

impl MemberWizard {
    /// Start at the household head; `engine` must be bound to the member form
    #[must_use]
    pub fn new(engine: FormEngine, session: EntrySession) -> Self {
        let state = if session.family_size() == 0 {
            WizardState::Complete
        } else {
            WizardState::AwaitingMember(0)
        };
        Self {
            engine,
            session,
            state,
        }
    }

    /// Current position
    #[inline]
    #[must_use]
    pub fn state(&self) -> WizardState {
        self.state
    }

    /// Collected data
    #[inline]
    #[must_use]
    pub fn session(&self) -> &EntrySession {
        &self.session
    }

    pub(crate) fn session_mut(&mut self) -> &mut EntrySession {
        &mut self.session
    }

    /// Bound member-form engine
    #[inline]
    #[must_use]
    pub fn engine(&self) -> &FormEngine {
        &self.engine
    }

    /// Whether every member is stored
    #[inline]
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.state == WizardState::Complete
    }

    /// Previously stored answers for the current member, if any
    #[must_use]
    pub fn current_answers(&self) -> Option<&AnswerSet> {
        match self.state {
            WizardState::AwaitingMember(i) => self.session.answers.get(i),
            WizardState::Complete => None,
        }
    }

    /// Live evaluation of in-progress answers
    #[must_use]
    pub fn preview(&self, answers: &AnswerSet) -> Evaluation {
        self.engine.evaluate(answers)
    }

    /// Submit the current member's answers
    ///
    /// On success the record is stored at the current index, replacing any
    /// earlier one, and the wizard advances.
    ///
    /// # Errors
    /// Returns [`WizardError::InvalidMember`] with the field report, leaving
    /// the state unchanged, or [`WizardError::AlreadyComplete`].
    pub fn submit_member(
        &mut self,
        answers: AnswerSet,
        now: DateTime<Utc>,
    ) -> Result<WizardState, WizardError> {
        let index = match self.state {
            WizardState::AwaitingMember(i) => i,
            WizardState::Complete => {
                return Err(WizardError::AlreadyComplete(self.session.family_size()));
            }
        };

        let report = self.engine.validate(&answers);
        if !report.is_valid() {
            tracing::debug!("Member {} rejected with {} field errors", index, report.error_count());
            return Err(WizardError::InvalidMember { index, report });
        }

        let record = self.engine.normalize(&answers, self.session.entry.entry_id, now);
        if index < self.session.members.len() {
            self.session.members[index] = record;
            self.session.answers[index] = answers;
        } else {
            self.session.members.push(record);
            self.session.answers.push(answers);
        }

        self.state = if index + 1 >= self.session.family_size() {
            WizardState::Complete
        } else {
            WizardState::AwaitingMember(index + 1)
        };
        tracing::debug!("Stored member {}; now {}", index, self.state);
        Ok(self.state)
    }

    /// Return to the previous member
    ///
    /// # Errors
    /// Returns [`WizardError::AtFirstMember`] at the household head.
    pub fn back(&mut self) -> Result<WizardState, WizardError> {
        self.state = match self.state {
            WizardState::AwaitingMember(0) => return Err(WizardError::AtFirstMember),
            WizardState::AwaitingMember(i) => WizardState::AwaitingMember(i - 1),
            WizardState::Complete => match self.session.family_size().checked_sub(1) {
                Some(last) => WizardState::AwaitingMember(last),
                None => return Err(WizardError::AtFirstMember),
            },
        };
        tracing::debug!("Moved back; now {}", self.state);
        Ok(self.state)
    }

    /// Give up the wizard, keeping the collected data
    #[must_use]
    pub fn into_session(self) -> EntrySession {
        self.session
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use intake_schema::{beneficiary_schema, household_member_schema};
    use intake_test_utils::{
        beneficiary_answers, fixed_now, full_catalog, member_answers, COORDINATOR_ID, RESEARCHER_ID,
    };

    fn wizard(size: u8) -> MemberWizard {
        let catalog = full_catalog();
        let entry = EntryDetails::start(
            &catalog,
            RESEARCHER_ID,
            COORDINATOR_ID,
            NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
        )
        .unwrap();
        let beneficiary_engine = FormEngine::new(beneficiary_schema()).with_catalog(catalog.clone());
        let beneficiary = Beneficiary::from_answers(&beneficiary_engine, &beneficiary_answers(size), 20).unwrap();
        let engine = FormEngine::new(household_member_schema()).with_catalog(catalog);
        MemberWizard::new(engine, EntrySession::new(entry, beneficiary))
    }

    #[test]
    fn starts_at_head() {
        assert_eq!(wizard(2).state(), WizardState::AwaitingMember(0));
    }

    #[test]
    fn invalid_submit_keeps_state() {
        let mut wizard = wizard(2);
        let err = wizard.submit_member(AnswerSet::new(), fixed_now()).unwrap_err();
        match err {
            WizardError::InvalidMember { index, report } => {
                assert_eq!(index, 0);
                assert!(report.error_map().contains_key("name"));
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(wizard.state(), WizardState::AwaitingMember(0));
        assert!(wizard.session().members.is_empty());
    }

    #[test]
    fn back_at_head_is_rejected() {
        let mut wizard = wizard(2);
        assert!(matches!(wizard.back(), Err(WizardError::AtFirstMember)));
    }

    #[test]
    fn submit_after_complete_is_rejected() {
        let mut wizard = wizard(1);
        assert_eq!(
            wizard.submit_member(member_answers("علي"), fixed_now()).unwrap(),
            WizardState::Complete
        );
        assert!(matches!(
            wizard.submit_member(member_answers("علي"), fixed_now()),
            Err(WizardError::AlreadyComplete(1))
        ));
    }

    #[test]
    fn back_from_complete_reopens_last_member() {
        let mut wizard = wizard(2);
        wizard.submit_member(member_answers("علي"), fixed_now()).unwrap();
        wizard.submit_member(member_answers("سارة"), fixed_now()).unwrap();
        assert!(wizard.is_complete());

        assert_eq!(wizard.back().unwrap(), WizardState::AwaitingMember(1));
        assert_eq!(
            wizard.current_answers().and_then(|a| a.get("name")).and_then(|v| v.as_text()),
            Some("سارة")
        );
        assert_eq!(wizard.session().members.len(), 2);
    }
}
