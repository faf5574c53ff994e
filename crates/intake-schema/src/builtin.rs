//! Built-in schemas for the household survey
//!
//! The family-member form covers basic data, education, employment, health
//! and a small set of special questions. The beneficiary form covers the
//! identity data captured once per visit.

use crate::field::{FieldDescriptor, PatternKind, Section};
use crate::options::OptionsSource;
use crate::predicate::Predicate;
use crate::rules::RequiredIfRule;
use crate::schema::FormSchema;

/// Affirmative option name
pub const YES: &str = "نعم";
/// Negative option name
pub const NO: &str = "لا";
/// "Other" option name; choosing it reveals a free-text follow-up
pub const OTHER: &str = "أخرى";

/// Field ids of the beneficiary form
pub mod beneficiary_fields {
    /// Beneficiary full name
    pub const NAME: &str = "beneficiaryName";
    /// 14-digit national id
    pub const NATIONAL_ID: &str = "nationalId";
    /// Gender option name
    pub const GENDER: &str = "gender";
    /// Primary phone
    pub const PHONE1: &str = "phone1";
    /// Secondary phone
    pub const PHONE2: &str = "phone2";
    /// WhatsApp number
    pub const WHATSAPP: &str = "whatsapp";
    /// Declared number of family members
    pub const FAMILY_SIZE: &str = "familySize";
}

fn group(key: &str) -> OptionsSource {
    OptionsSource::group(key)
}

fn other_text(id: &str, label: &str, section: Section, parent: &str) -> FieldDescriptor {
    FieldDescriptor::text(id, label, section)
        .required()
        .max_length(50)
        .depends_on(Predicate::equals(parent, OTHER))
}

fn basic_fields() -> Vec<FieldDescriptor> {
    vec![
        FieldDescriptor::text("name", "الاسم", Section::Basic)
            .required()
            .pattern(PatternKind::ArabicOnly),
        FieldDescriptor::select("kinshipRelation", "صلة القرابة", Section::Basic, group("relationship"))
            .required(),
        FieldDescriptor::select("gender", "النوع", Section::Basic, group("gender")).required(),
        FieldDescriptor::select("ageGroup", "الفئة العمرية", Section::Basic, group("age")).required(),
        FieldDescriptor::select(
            "maritalStatus",
            "الحالة الاجتماعية",
            Section::Basic,
            group("maritalStatus"),
        )
        .required(),
        FieldDescriptor::select("hasNationalId", "هل لديه رقم قومي؟", Section::Basic, group("hasId"))
            .required(),
        FieldDescriptor::text("nationalId", "الرقم القومي", Section::Basic)
            .required()
            .max_length(14)
            .pattern(PatternKind::DigitsOnly)
            .placeholder("14 رقم")
            .depends_on(Predicate::equals("hasNationalId", YES)),
    ]
}

fn education_fields() -> Vec<FieldDescriptor> {
    vec![
        FieldDescriptor::select(
            "hasAttendedSchool",
            "هل التحق بالمدرسة؟",
            Section::Education,
            group("hasBeenToSchool"),
        )
        .required(),
        FieldDescriptor::select(
            "wentToSchool",
            "هل سبق له الذهاب للمدرسة؟",
            Section::Education,
            group("regularityInStudy"),
        )
        .required(),
        FieldDescriptor::select(
            "reasonForNotAttending",
            "لماذا لم يذهب للمدرسة؟",
            Section::Education,
            OptionsSource::inline_pairs(&[
                ("tooYoung", "دون سن الإلتحاق"),
                ("academic", "ضعف دراسي/رسوب"),
                ("financial", "العمل للمساعدة المالية"),
                ("marriage", "بسبب الزواج"),
            ]),
        )
        .required()
        .depends_on(Predicate::equals("wentToSchool", NO)),
        FieldDescriptor::select(
            "lastEducationalStage",
            "ما آخر مرحلة تعليمية التحق بها؟",
            Section::Education,
            group("educationLevel"),
        )
        .required()
        .depends_on(Predicate::equals("wentToSchool", YES)),
        FieldDescriptor::select(
            "isCurrentlyEnrolled",
            "هل الاسم منتظم في الدراسة لهذا العام؟",
            Section::Education,
            group("regularityInStudy"),
        )
        .required(),
        FieldDescriptor::select(
            "reasonForNotEnrolled",
            "ما هي أسباب عدم الذهاب للمدرسة لهذا العام؟",
            Section::Education,
            group("reasonForNotStudying"),
        )
        .required()
        .depends_on(Predicate::equals("isCurrentlyEnrolled", NO)),
        FieldDescriptor::select(
            "hasLiteracyCertificate",
            "هل حاصل على شهادة محو الأمية؟",
            Section::Education,
            group("literacyCertificate"),
        )
        .required()
        .depends_on(Predicate::equals("wentToSchool", NO)),
        FieldDescriptor::select(
            "canReadAndWrite",
            "هل يجيد القراءة والكتابة؟",
            Section::Education,
            group("canReadAndWrite"),
        )
        .required(),
    ]
}

fn employment_fields() -> Vec<FieldDescriptor> {
    let working = || Predicate::equals("isWorking", YES);
    vec![
        FieldDescriptor::select("isWorking", "هل يعمل؟", Section::Employment, group("doesWork"))
            .required(),
        FieldDescriptor::select("jobType", "ما هو العمل؟", Section::Employment, group("typeOfWork"))
            .required()
            .depends_on(working()),
        FieldDescriptor::select("sector", "ما هو القطاع؟", Section::Employment, group("sector"))
            .required()
            .depends_on(working()),
        FieldDescriptor::select(
            "workNature",
            "ما هي طبيعة العمل؟",
            Section::Employment,
            group("workNature"),
        )
        .required()
        .depends_on(working()),
        FieldDescriptor::select(
            "notWorkingReason",
            "لماذا لا يعمل؟",
            Section::Employment,
            OptionsSource::inline_pairs(&[
                ("tooYoung", "مازال صغير/ة"),
                ("sick", "مريض/ة"),
                ("housewife", "ربة منزل"),
                ("imprisoned", "مسجون"),
            ]),
        )
        .required()
        .depends_on(Predicate::equals("isWorking", NO)),
        FieldDescriptor::select(
            "hasPrivateBusiness",
            "هل لديك مشروع خاص؟",
            Section::Employment,
            group("hasPrivateProject"),
        )
        .required(),
        // Requiredness comes from the schema's required-if rule
        FieldDescriptor::text("businessType", "ما هو نوع المشروع؟", Section::Employment)
            .max_length(100)
            .depends_on(Predicate::equals("hasPrivateBusiness", YES)),
        FieldDescriptor::select(
            "hasUnusedSkill",
            "هل لديه مهارة أو حرفة ولا يمارسها؟",
            Section::Employment,
            group("hasUnusedSkill"),
        )
        .required(),
        FieldDescriptor::select(
            "skillType",
            "ما هي المهارة أو الحرفة؟",
            Section::Employment,
            group("unusedSkillType"),
        )
        .required()
        .depends_on(Predicate::equals("hasUnusedSkill", YES)),
        other_text("otherSkillType", "اذكر نوع المهارة", Section::Employment, "skillType"),
        FieldDescriptor::select(
            "wantsTraining",
            "هل لديك استعداد للتدريب على مهنة معينة أو مجال معين؟",
            Section::Employment,
            group("willingToTrain"),
        )
        .required(),
        FieldDescriptor::select(
            "trainingField",
            "ما هو المجال الذي ترغب في التدريب عليه؟",
            Section::Employment,
            group("desiredTrainingField"),
        )
        .required()
        .depends_on(Predicate::equals("wantsTraining", YES)),
        other_text("otherTrainingField", "اذكر مجال التدريب", Section::Employment, "trainingField"),
    ]
}

fn health_fields() -> Vec<FieldDescriptor> {
    let ill = || Predicate::equals("hasHealthIssue", YES);
    vec![
        FieldDescriptor::select(
            "hasHealthIssue",
            "هل يعاني من مرض مزمن أو إعاقة أو مرض نفسي؟",
            Section::Health,
            group("hasChronicIllnessOrDisability"),
        )
        .required(),
        FieldDescriptor::checkbox_group(
            "chronicDiseases",
            "الأمراض المزمنة",
            Section::Health,
            group("chronicIllnessTypes"),
        )
        .required()
        .depends_on(ill()),
        other_text("otherChronicDisease", "حدد المرض المزمن", Section::Health, "chronicDiseases"),
        FieldDescriptor::select("disabilityType", "نوع الإعاقة", Section::Health, group("disabilityTypes"))
            .depends_on(ill()),
        FieldDescriptor::select(
            "treatmentLocation",
            "مكان تلقي العلاج",
            Section::Health,
            group("treatmentLocations"),
        )
        .required()
        .depends_on(ill()),
        other_text(
            "otherTreatmentLocation",
            "حدد مكان العلاج",
            Section::Health,
            "treatmentLocation",
        ),
        FieldDescriptor::select(
            "medicalExpensesCoverage",
            "كيف تغطي تكاليف العلاج؟",
            Section::Health,
            group("treatmentCostsCovered"),
        )
        .required()
        .depends_on(ill()),
        other_text(
            "otherMedicalExpensesCoverage",
            "حدد طريقة تغطية التكاليف",
            Section::Health,
            "medicalExpensesCoverage",
        ),
        FieldDescriptor::checkbox_group(
            "requiredMedicalAssistance",
            "المساعدة الطبية المطلوبة من المؤسسة",
            Section::Health,
            OptionsSource::inline_pairs(&[
                ("monthly", "علاج شهري"),
                ("surgery", "إجراء عملية"),
                ("wheelchair", "كرسي متحرك"),
                ("tests", "أشعة وتحاليل"),
            ]),
        )
        .required()
        .depends_on(ill()),
    ]
}

fn special_fields() -> Vec<FieldDescriptor> {
    vec![
        FieldDescriptor::select(
            "hasMarriedDaughterUnder18",
            "هل لديك ابنة متزوجة أقل من 18 سنة؟",
            Section::Special,
            group("hasMarriedDaughterUnder18"),
        ),
        FieldDescriptor::select("hasFGM", "هل تم إجراء الختان؟", Section::Special, group("hadCircumcision")),
        FieldDescriptor::select(
            "whereFGM",
            "من قام بإجراء الختان؟",
            Section::Special,
            group("circumcisionPerformer"),
        )
        .required()
        .depends_on(Predicate::equals("hasFGM", YES)),
        other_text("otherWhereFGM", "حدد من قام بالإجراء", Section::Special, "whereFGM"),
    ]
}

/// Family-member form
#[must_use]
pub fn household_member_schema() -> FormSchema {
    let fields = [
        basic_fields(),
        education_fields(),
        employment_fields(),
        health_fields(),
        special_fields(),
    ]
    .concat();

    let rules = vec![RequiredIfRule::new(
        "businessType",
        Predicate::equals("hasPrivateBusiness", YES),
    )
    .with_message("نوع المشروع مطلوب عند اختيار 'نعم' في وجود مشروع خاص")];

    match FormSchema::new(fields, rules) {
        Ok(schema) => schema,
        Err(e) => unreachable!("built-in member schema is malformed: {e}"),
    }
}

/// Beneficiary identity form
#[must_use]
pub fn beneficiary_schema() -> FormSchema {
    use beneficiary_fields as f;

    let fields = vec![
        FieldDescriptor::text(f::NAME, "اسم المستفيد", Section::Basic)
            .required()
            .pattern(PatternKind::ArabicOnly),
        FieldDescriptor::text(f::NATIONAL_ID, "الرقم القومي", Section::Basic)
            .required()
            .min_length(14)
            .max_length(14)
            .pattern(PatternKind::DigitsOnly)
            .placeholder("14 رقم"),
        FieldDescriptor::select(f::GENDER, "النوع", Section::Basic, group("gender")).required(),
        FieldDescriptor::text(f::PHONE1, "رقم الهاتف 1", Section::Basic)
            .required()
            .pattern(PatternKind::EgyptianMobile),
        FieldDescriptor::text(f::PHONE2, "رقم الهاتف 2", Section::Basic).pattern(PatternKind::EgyptianMobile),
        FieldDescriptor::text(f::WHATSAPP, "رقم الواتساب", Section::Basic).pattern(PatternKind::EgyptianMobile),
        FieldDescriptor::text(f::FAMILY_SIZE, "عدد أفراد الأسرة", Section::Basic)
            .required()
            .max_length(2)
            .pattern(PatternKind::DigitsOnly),
    ];

    match FormSchema::new(fields, Vec::new()) {
        Ok(schema) => schema,
        Err(e) => unreachable!("built-in beneficiary schema is malformed: {e}"),
    }
}
