//! Testing utilities for the intake workspace
//!
//! Shared fixtures: a catalog covering every built-in option group and
//! answer sets that pass the built-in forms.

#![allow(missing_docs)]

use chrono::{DateTime, TimeZone, Utc};
use intake_engine::AnswerSet;
use intake_schema::builtin::beneficiary_fields as b;
use intake_schema::{beneficiary_schema, household_member_schema, Choice, OptionCatalog, NO, OTHER, YES};

pub const RESEARCHER_ID: &str = "r-01";
pub const RESEARCHER_NAME: &str = "منى حسن";
pub const COORDINATOR_ID: &str = "c-01";
pub const COORDINATOR_NAME: &str = "خالد إبراهيم";

fn choices(names: &[&str]) -> Vec<Choice> {
    names
        .iter()
        .enumerate()
        .map(|(i, name)| Choice::new(format!("{}", i + 1), *name))
        .collect()
}

/// Catalog with every group either built-in form references
pub fn full_catalog() -> OptionCatalog {
    let mut catalog = OptionCatalog::new();

    let member = household_member_schema();
    let beneficiary = beneficiary_schema();
    for key in member.option_groups().into_iter().chain(beneficiary.option_groups()) {
        catalog.insert(key.as_str(), choices(&[YES, NO, OTHER]));
    }

    catalog
        .with_group("gender", choices(&["ذكر", "أنثى"]))
        .with_group("relationship", choices(&["رب الأسرة", "زوجة", "ابن", "ابنة"]))
        .with_group("age", choices(&["أقل من 6", "6-18", "18-60", "أكبر من 60"]))
        .with_group("maritalStatus", choices(&["أعزب", "متزوج", "أرمل"]))
        .with_group("chronicIllnessTypes", choices(&["Diabetes", "Heart", OTHER]))
        .with_group(
            OptionCatalog::RESEARCHERS,
            vec![Choice::new(RESEARCHER_ID, RESEARCHER_NAME), Choice::new("r-02", "سامي علي")],
        )
        .with_group(
            OptionCatalog::COORDINATORS,
            vec![Choice::new(COORDINATOR_ID, COORDINATOR_NAME)],
        )
}

/// Valid member answers taking every "no" branch
pub fn member_answers(name: &str) -> AnswerSet {
    AnswerSet::new()
        .with("name", name)
        .with("kinshipRelation", "ابن")
        .with("gender", "ذكر")
        .with("ageGroup", "6-18")
        .with("maritalStatus", "أعزب")
        .with("hasNationalId", NO)
        .with("hasAttendedSchool", YES)
        .with("wentToSchool", YES)
        .with("lastEducationalStage", YES)
        .with("isCurrentlyEnrolled", YES)
        .with("canReadAndWrite", YES)
        .with("isWorking", NO)
        .with("notWorkingReason", "مازال صغير/ة")
        .with("hasPrivateBusiness", NO)
        .with("hasUnusedSkill", NO)
        .with("wantsTraining", NO)
        .with("hasHealthIssue", NO)
}

/// Valid member answers for a working adult with chronic illness
pub fn sick_worker_answers(name: &str) -> AnswerSet {
    member_answers(name)
        .with("kinshipRelation", "رب الأسرة")
        .with("ageGroup", "18-60")
        .with("maritalStatus", "متزوج")
        .with("hasNationalId", YES)
        .with("nationalId", "27501011234567")
        .with("isWorking", YES)
        .with("jobType", YES)
        .with("sector", YES)
        .with("workNature", YES)
        .with("hasHealthIssue", YES)
        .with_many("chronicDiseases", ["Diabetes", "Heart"])
        .with("treatmentLocation", YES)
        .with("medicalExpensesCoverage", YES)
        .with_many("requiredMedicalAssistance", ["علاج شهري"])
}

/// Valid beneficiary answers with the given family size
pub fn beneficiary_answers(family_size: u8) -> AnswerSet {
    AnswerSet::new()
        .with(b::NAME, "محمد أحمد")
        .with(b::NATIONAL_ID, "27501011234567")
        .with(b::GENDER, "ذكر")
        .with(b::PHONE1, "01012345678")
        .with(b::WHATSAPP, "01112345678")
        .with(b::FAMILY_SIZE, family_size.to_string())
}

/// Fixed instant for deterministic records
pub fn fixed_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0)
        .single()
        .unwrap_or_default()
}
