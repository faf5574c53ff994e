use chrono::NaiveDate;
use intake_session::sink::{BENEFICIARY_SHEET, MEMBER_SHEET};
use intake_session::{
    load_forms, Beneficiary, EntryDetails, EntrySession, IntakeConfig, JsonlSink, MemberWizard, MemorySink,
    StaticOptionSource, SubmissionError, SubmissionPhase, WizardState,
};
use intake_test_utils::{
    beneficiary_answers, fixed_now, full_catalog, member_answers, sick_worker_answers, COORDINATOR_ID,
    RESEARCHER_ID,
};
use pretty_assertions::assert_eq;

async fn wizard_with(config: &IntakeConfig, family_size: u8) -> MemberWizard {
    let forms = load_forms(&StaticOptionSource::new(full_catalog()), config)
        .await
        .unwrap();
    let entry = EntryDetails::start(
        &forms.catalog,
        RESEARCHER_ID,
        COORDINATOR_ID,
        NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
    )
    .unwrap();
    let beneficiary = Beneficiary::from_answers(
        &forms.beneficiary,
        &beneficiary_answers(family_size),
        config.max_family_size,
    )
    .unwrap();
    MemberWizard::new(forms.member, EntrySession::new(entry, beneficiary))
}

async fn wizard(family_size: u8) -> MemberWizard {
    wizard_with(&IntakeConfig::default(), family_size).await
}

async fn completed(family_size: u8) -> MemberWizard {
    let mut wizard = wizard(family_size).await;
    for _ in 0..family_size {
        wizard.submit_member(member_answers("فرد"), fixed_now()).unwrap();
    }
    wizard
}

#[tokio::test]
async fn family_of_three_with_correction() {
    let mut wizard = wizard(3).await;

    assert_eq!(
        wizard.submit_member(sick_worker_answers("أحمد"), fixed_now()).unwrap(),
        WizardState::AwaitingMember(1)
    );
    assert_eq!(
        wizard.submit_member(member_answers("منى"), fixed_now()).unwrap(),
        WizardState::AwaitingMember(2)
    );

    // correct member 1 before finishing
    assert_eq!(wizard.back().unwrap(), WizardState::AwaitingMember(1));
    let previous = wizard.current_answers().cloned().unwrap();
    let corrected = previous.with("name", "منى محمد");
    assert_eq!(
        wizard.submit_member(corrected, fixed_now()).unwrap(),
        WizardState::AwaitingMember(2)
    );
    assert_eq!(wizard.session().members.len(), 2);

    assert_eq!(
        wizard.submit_member(member_answers("يوسف"), fixed_now()).unwrap(),
        WizardState::Complete
    );

    let members = &wizard.session().members;
    assert_eq!(members.len(), 3);
    assert_eq!(members[1].get("name").and_then(|v| v.as_text()), Some("منى محمد"));

    let sink = MemorySink::new();
    let receipt = wizard.submit(&sink, fixed_now()).await.unwrap();
    assert_eq!(receipt.member_rows, 3);
    assert!(!receipt.beneficiary_skipped);

    let rows = sink.member_rows();
    assert_eq!(rows.len(), 3);
    assert_eq!(rows[0].get("chronicDiseases"), Some("Diabetes, Heart"));
    assert_eq!(rows[2].get("MemberIndex"), Some("2"));
    assert_eq!(sink.beneficiary_rows().len(), 1);
}

#[tokio::test]
async fn incomplete_session_is_handed_back() {
    let mut wizard = wizard(2).await;
    wizard.submit_member(member_answers("علي"), fixed_now()).unwrap();

    let sink = MemorySink::new();
    let failed = wizard.submit(&sink, fixed_now()).await.unwrap_err();
    assert!(matches!(
        failed.error,
        SubmissionError::Incomplete { stored: 1, expected: 2 }
    ));
    assert!(sink.beneficiary_rows().is_empty());

    let wizard = failed.into_wizard();
    assert_eq!(wizard.state(), WizardState::AwaitingMember(1));
    assert_eq!(wizard.session().members.len(), 1);
}

#[tokio::test]
async fn reopened_member_blocks_submission_until_resubmitted() {
    let mut wizard = completed(2).await;
    assert_eq!(wizard.back().unwrap(), WizardState::AwaitingMember(1));

    let sink = MemorySink::new();
    let failed = wizard.submit(&sink, fixed_now()).await.unwrap_err();
    assert!(matches!(failed.error, SubmissionError::MemberReopened { index: 1 }));
    assert!(failed.error.to_string().contains("reopened"));
    assert!(!failed.error.is_retryable());
    assert!(sink.beneficiary_rows().is_empty());

    let mut wizard = failed.into_wizard();
    wizard.submit_member(member_answers("سارة"), fixed_now()).unwrap();
    let receipt = wizard.submit(&sink, fixed_now()).await.unwrap();
    assert_eq!(receipt.member_rows, 2);
    assert_eq!(sink.member_rows()[1].get("name"), Some("سارة"));
}

#[tokio::test]
async fn member_failure_retry_does_not_duplicate_beneficiary() {
    let wizard = completed(2).await;
    let sink = MemorySink::new();
    sink.fail_next(SubmissionPhase::Members, 1);

    let failed = wizard.submit(&sink, fixed_now()).await.unwrap_err();
    assert!(matches!(
        failed.error,
        SubmissionError::Sink { phase: SubmissionPhase::Members, .. }
    ));
    assert!(failed.error.is_retryable());
    assert_eq!(sink.beneficiary_rows().len(), 1);
    assert!(sink.member_rows().is_empty());

    let wizard = failed.into_wizard();
    assert!(wizard.session().beneficiary_written());
    assert_eq!(wizard.session().members.len(), 2);

    let receipt = wizard.submit(&sink, fixed_now()).await.unwrap();
    assert!(receipt.beneficiary_skipped);
    assert_eq!(sink.beneficiary_rows().len(), 1);
    assert_eq!(sink.member_rows().len(), 2);
}

#[tokio::test]
async fn beneficiary_failure_retries_both_phases() {
    let wizard = completed(1).await;
    let sink = MemorySink::new();
    sink.fail_next(SubmissionPhase::Beneficiary, 1);

    let failed = wizard.submit(&sink, fixed_now()).await.unwrap_err();
    assert!(matches!(
        failed.error,
        SubmissionError::Sink { phase: SubmissionPhase::Beneficiary, .. }
    ));
    assert!(!failed.wizard.session().beneficiary_written());

    let receipt = failed.into_wizard().submit(&sink, fixed_now()).await.unwrap();
    assert!(!receipt.beneficiary_skipped);
    assert_eq!(sink.beneficiary_rows().len(), 1);
    assert_eq!(sink.member_rows().len(), 1);
}

#[tokio::test]
async fn jsonl_sink_receives_both_sheets() {
    let dir = tempfile::tempdir().unwrap();
    let config = IntakeConfig::default().with_separator(" | ");
    let mut wizard = wizard_with(&config, 1).await;
    wizard.submit_member(sick_worker_answers("أحمد"), fixed_now()).unwrap();

    let sink = JsonlSink::new(dir.path());
    let receipt = wizard.submit(&sink, fixed_now()).await.unwrap();

    let beneficiaries = std::fs::read_to_string(dir.path().join(BENEFICIARY_SHEET)).unwrap();
    let members = std::fs::read_to_string(dir.path().join(MEMBER_SHEET)).unwrap();
    assert_eq!(beneficiaries.lines().count(), 1);
    assert_eq!(members.lines().count(), 1);

    let member: serde_json::Value = serde_json::from_str(members.lines().next().unwrap()).unwrap();
    assert_eq!(member["chronicDiseases"], "Diabetes | Heart");
    assert_eq!(member["submissionKey"], receipt.key.as_str());
    assert_eq!(member["EntryID"], receipt.entry_id.to_string());
}
