//! Student profile forms and their cleaning rules.
//!
//! Forms carry raw client input. `clean` trims text, parses choices,
//! numbers and dates, and reports every problem keyed by field name.

use std::str::FromStr;

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use utoipa::ToSchema;
use validator::{Validate, ValidateEmail, ValidateUrl};

use super::account::AccountChanges;
use super::choices::{
    DegreeLevel, DiseaseStatus, EducationFunding, Gender, MaritalStatus, StudentLevel,
};
use super::student::StudentProfile;
use crate::config::{MAX_NAME_LENGTH, MAX_SEMESTER_LEVEL, MIN_SEMESTER_LEVEL, MSG_FIELD_REQUIRED};
use crate::errors::FieldErrors;

static PHONE_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\+?[0-9][0-9 \-]{5,19}$").expect("valid phone regex"));

static NIK_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[0-9]{1,16}$").expect("valid NIK regex"));

/// Largest value a `numeric(4,2)` grade column holds.
const MAX_GRADE: Decimal = Decimal::from_parts(9999, 0, 0, false, 2);

/// Largest value a `numeric(10,2)` money column holds.
const MAX_AMOUNT: Decimal = Decimal::from_parts(1_410_065_407, 2, 0, false, 2);

/// How a staff save should treat incomplete records.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum SaveMode {
    /// Complete record; required fields are enforced.
    #[default]
    Save,
    /// Incomplete record; missing required choices keep their current values.
    Draft,
}

impl SaveMode {
    pub fn is_draft(&self) -> bool {
        matches!(self, SaveMode::Draft)
    }
}

/// Accept a JSON string or number, normalising both to text.
fn scalar<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Number(serde_json::Number),
        Flag(bool),
    }

    Ok(Option::<Raw>::deserialize(deserializer)?.map(|raw| match raw {
        Raw::Text(text) => text,
        Raw::Number(number) => number.to_string(),
        Raw::Flag(flag) => flag.to_string(),
    }))
}

/// Profile fields as submitted by a student or staff member.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
#[serde(default)]
pub struct StudentProfileForm {
    #[schema(example = "+62 812 3456 7890")]
    #[validate(length(max = 20))]
    pub whatsapp_number: Option<String>,
    #[validate(length(max = 100))]
    pub birth_place: Option<String>,
    #[serde(deserialize_with = "scalar")]
    #[schema(example = "2003-04-21")]
    pub birth_date: Option<String>,
    #[serde(deserialize_with = "scalar")]
    #[schema(example = "M")]
    pub gender: Option<String>,
    #[serde(deserialize_with = "scalar")]
    #[schema(example = "single")]
    pub marital_status: Option<String>,
    #[validate(length(max = 50))]
    pub citizenship_status: Option<String>,
    #[validate(length(max = 80))]
    pub region_origin: Option<String>,

    #[validate(length(max = 150))]
    pub parents_name: Option<String>,
    #[validate(length(max = 20))]
    pub parents_phone: Option<String>,
    #[validate(length(max = 150))]
    pub guardian_name: Option<String>,
    #[validate(length(max = 20))]
    pub guardian_phone: Option<String>,
    #[validate(length(max = 200))]
    pub photo_url: Option<String>,

    #[serde(deserialize_with = "scalar")]
    #[schema(example = "regular")]
    pub level: Option<String>,
    #[validate(length(max = 120))]
    pub institution: Option<String>,
    #[validate(length(max = 120))]
    pub faculty: Option<String>,
    #[validate(length(max = 120))]
    pub major: Option<String>,
    #[serde(deserialize_with = "scalar")]
    #[schema(example = "S1")]
    pub degree_level: Option<String>,
    #[serde(deserialize_with = "scalar")]
    #[schema(example = "3")]
    pub semester_level: Option<String>,
    #[serde(deserialize_with = "scalar")]
    #[schema(example = "3.75")]
    pub latest_grade: Option<String>,
    #[validate(length(max = 120))]
    pub school_origin: Option<String>,

    #[validate(length(max = 20))]
    pub passport_number: Option<String>,
    #[serde(deserialize_with = "scalar")]
    #[validate(length(max = 16))]
    pub nik: Option<String>,
    #[validate(length(max = 30))]
    pub lapdik_number: Option<String>,
    #[serde(deserialize_with = "scalar")]
    pub arrival_date: Option<String>,

    #[validate(length(max = 80))]
    pub home_name: Option<String>,
    #[validate(length(max = 150))]
    pub home_location: Option<String>,

    #[validate(length(max = 255))]
    pub disease_history: Option<String>,
    #[serde(deserialize_with = "scalar")]
    #[schema(example = "sembuh")]
    pub disease_status: Option<String>,

    #[validate(length(max = 120))]
    pub sport_interest: Option<String>,
    pub sport_achievement: Option<String>,
    #[validate(length(max = 120))]
    pub art_interest: Option<String>,
    pub art_achievement: Option<String>,
    #[validate(length(max = 120))]
    pub literacy_interest: Option<String>,
    pub literacy_achievement: Option<String>,
    #[validate(length(max = 120))]
    pub science_interest: Option<String>,
    pub science_achievement: Option<String>,
    #[validate(length(max = 120))]
    pub mtq_interest: Option<String>,
    pub mtq_achievement: Option<String>,
    #[validate(length(max = 120))]
    pub media_interest: Option<String>,
    pub media_achievement: Option<String>,

    pub organization_history: Option<String>,

    #[serde(deserialize_with = "scalar")]
    #[schema(example = "beasiswa")]
    pub education_funding: Option<String>,
    #[validate(length(max = 150))]
    pub scholarship_source: Option<String>,
    #[serde(deserialize_with = "scalar")]
    #[schema(example = "1500000.00")]
    pub living_cost: Option<String>,
    #[serde(deserialize_with = "scalar")]
    #[schema(example = "0.00")]
    pub monthly_income: Option<String>,
}

/// Result of parsing one optional raw value.
enum Parsed<T> {
    Missing,
    Invalid,
    Value(T),
}

impl<T> Parsed<T> {
    fn into_option(self) -> Option<T> {
        match self {
            Parsed::Value(value) => Some(value),
            _ => None,
        }
    }
}

struct Cleaner {
    mode: SaveMode,
    errors: FieldErrors,
}

impl Cleaner {
    fn text(&self, value: Option<String>) -> String {
        value.map(|v| v.trim().to_string()).unwrap_or_default()
    }

    fn optional_text(&self, value: Option<String>) -> Option<String> {
        Some(self.text(value)).filter(|v| !v.is_empty())
    }

    fn phone(&mut self, field: &str, value: Option<String>) -> String {
        let value = self.text(value);
        if !value.is_empty() && !PHONE_REGEX.is_match(&value) {
            self.errors.add(field, "Enter a valid phone number.");
        }
        value
    }

    fn parse<T>(&mut self, field: &str, value: Option<String>, invalid: &str) -> Parsed<T>
    where
        T: FromStr,
    {
        match self.optional_text(value) {
            None => Parsed::Missing,
            Some(raw) => match raw.parse::<T>() {
                Ok(parsed) => Parsed::Value(parsed),
                Err(_) => {
                    self.errors.add(field, invalid.replace("{}", &raw));
                    Parsed::Invalid
                }
            },
        }
    }

    fn choice<T: FromStr>(&mut self, field: &str, value: Option<String>) -> Parsed<T> {
        self.parse(
            field,
            value,
            "Select a valid choice. {} is not one of the available choices.",
        )
    }

    fn date(&mut self, field: &str, value: Option<String>) -> Option<NaiveDate> {
        match self.optional_text(value) {
            None => None,
            Some(raw) => match NaiveDate::parse_from_str(&raw, "%Y-%m-%d") {
                Ok(date) => Some(date),
                Err(_) => {
                    self.errors.add(field, "Enter a valid date.");
                    None
                }
            },
        }
    }

    fn amount(&mut self, field: &str, value: Option<String>, max: Decimal) -> Option<Decimal> {
        let amount = self.parse::<Decimal>(field, value, "Enter a number.").into_option()?;
        if amount < Decimal::ZERO {
            self.errors
                .add(field, "Ensure this value is greater than or equal to 0.");
        } else if amount > max {
            self.errors
                .add(field, format!("Ensure this value is less than or equal to {}.", max));
        } else if amount.normalize().scale() > 2 {
            self.errors
                .add(field, "Ensure that there are no more than 2 decimal places.");
        }
        Some(amount.round_dp(2))
    }

    /// Value of a required field; drafts fall back to the current value.
    fn required<T>(&mut self, field: &str, parsed: Parsed<T>, current: T) -> T {
        match parsed {
            Parsed::Value(value) => value,
            Parsed::Invalid => current,
            Parsed::Missing => {
                if !self.mode.is_draft() {
                    self.errors.add(field, MSG_FIELD_REQUIRED);
                }
                current
            }
        }
    }
}

macro_rules! trim_fields {
    ($form:ident, $($field:ident),+ $(,)?) => {
        $(
            $form.$field = $form.$field.map(|value| value.trim().to_string());
        )+
    };
}

impl StudentProfileForm {
    /// Copy with surrounding whitespace removed from every value, so length
    /// rules apply to what is stored.
    fn trimmed(self) -> Self {
        let mut form = self;
        trim_fields!(
            form,
            whatsapp_number, birth_place, birth_date, gender, marital_status,
            citizenship_status, region_origin, parents_name, parents_phone, guardian_name,
            guardian_phone, photo_url, level, institution, faculty, major, degree_level,
            semester_level, latest_grade, school_origin, passport_number, nik,
            lapdik_number, arrival_date, home_name, home_location, disease_history,
            disease_status, sport_interest, sport_achievement, art_interest,
            art_achievement, literacy_interest, literacy_achievement, science_interest,
            science_achievement, mtq_interest, mtq_achievement, media_interest,
            media_achievement, organization_history, education_funding, scholarship_source,
            living_cost, monthly_income
        );
        form
    }

    /// Clean the submitted values into a profile.
    ///
    /// `current` supplies values for required fields left blank in a draft
    /// and for the enrollment level when it is not submitted.
    pub fn clean(self, current: &StudentProfile, mode: SaveMode) -> Result<StudentProfile, FieldErrors> {
        let form = self.trimmed();
        let mut cleaner = Cleaner {
            mode,
            errors: FieldErrors::new(),
        };
        if let Err(errors) = form.validate() {
            cleaner.errors.merge(errors.into());
        }

        let gender = cleaner.choice::<Gender>("gender", form.gender);
        let gender = cleaner.required("gender", gender, current.gender);
        let marital_status = cleaner.choice::<MaritalStatus>("marital_status", form.marital_status);
        let marital_status = cleaner.required("marital_status", marital_status, current.marital_status);
        let degree_level = cleaner.choice::<DegreeLevel>("degree_level", form.degree_level);
        let degree_level = cleaner.required("degree_level", degree_level, current.degree_level);

        let semester_level = cleaner.parse::<i16>("semester_level", form.semester_level, "Enter a whole number.");
        let semester_level = cleaner.required("semester_level", semester_level, current.semester_level);
        if !(MIN_SEMESTER_LEVEL..=MAX_SEMESTER_LEVEL).contains(&semester_level) {
            cleaner.errors.add(
                "semester_level",
                format!("Must be between {} and {}.", MIN_SEMESTER_LEVEL, MAX_SEMESTER_LEVEL),
            );
        }

        let level = cleaner
            .choice::<StudentLevel>("level", form.level)
            .into_option()
            .unwrap_or(current.level);
        let disease_status = cleaner
            .choice::<DiseaseStatus>("disease_status", form.disease_status)
            .into_option();
        let education_funding = cleaner
            .choice::<EducationFunding>("education_funding", form.education_funding)
            .into_option();

        let photo_url = cleaner.optional_text(form.photo_url);
        if let Some(url) = &photo_url {
            if !url.validate_url() {
                cleaner.errors.add("photo_url", "Enter a valid URL.");
            }
        }

        let nik = cleaner.optional_text(form.nik);
        if let Some(value) = &nik {
            if !NIK_REGEX.is_match(value) {
                cleaner.errors.add("nik", "NIK must contain only digits.");
            }
        }

        let profile = StudentProfile {
            whatsapp_number: cleaner.phone("whatsapp_number", form.whatsapp_number),
            birth_place: cleaner.text(form.birth_place),
            birth_date: cleaner.date("birth_date", form.birth_date),
            gender,
            marital_status,
            citizenship_status: cleaner.text(form.citizenship_status),
            region_origin: cleaner.text(form.region_origin),
            parents_name: cleaner.text(form.parents_name),
            parents_phone: cleaner.phone("parents_phone", form.parents_phone),
            guardian_name: cleaner.text(form.guardian_name),
            guardian_phone: cleaner.phone("guardian_phone", form.guardian_phone),
            photo_url,
            level,
            institution: cleaner.text(form.institution),
            faculty: cleaner.text(form.faculty),
            major: cleaner.text(form.major),
            degree_level,
            semester_level,
            latest_grade: cleaner.amount("latest_grade", form.latest_grade, MAX_GRADE),
            school_origin: cleaner.text(form.school_origin),
            passport_number: cleaner.optional_text(form.passport_number),
            nik,
            lapdik_number: cleaner.text(form.lapdik_number),
            arrival_date: cleaner.date("arrival_date", form.arrival_date),
            home_name: cleaner.text(form.home_name),
            home_location: cleaner.text(form.home_location),
            disease_history: cleaner.text(form.disease_history),
            disease_status,
            sport_interest: cleaner.text(form.sport_interest),
            sport_achievement: cleaner.text(form.sport_achievement),
            art_interest: cleaner.text(form.art_interest),
            art_achievement: cleaner.text(form.art_achievement),
            literacy_interest: cleaner.text(form.literacy_interest),
            literacy_achievement: cleaner.text(form.literacy_achievement),
            science_interest: cleaner.text(form.science_interest),
            science_achievement: cleaner.text(form.science_achievement),
            mtq_interest: cleaner.text(form.mtq_interest),
            mtq_achievement: cleaner.text(form.mtq_achievement),
            media_interest: cleaner.text(form.media_interest),
            media_achievement: cleaner.text(form.media_achievement),
            organization_history: cleaner.text(form.organization_history),
            education_funding,
            scholarship_source: cleaner.optional_text(form.scholarship_source),
            living_cost: cleaner.amount("living_cost", form.living_cost, MAX_AMOUNT),
            monthly_income: cleaner.amount("monthly_income", form.monthly_income, MAX_AMOUNT),
        };

        if cleaner.errors.is_empty() {
            Ok(profile)
        } else {
            Err(cleaner.errors)
        }
    }
}

/// Student record form used by staff: profile fields plus the account
/// identity and the save mode.
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
#[serde(default)]
pub struct StaffStudentForm {
    #[schema(example = "budi@example.com")]
    #[validate(length(max = 254))]
    pub email: Option<String>,
    #[schema(example = "Budi")]
    pub first_name: Option<String>,
    #[schema(example = "Santoso")]
    pub last_name: Option<String>,
    /// `save` (default) or `draft`
    pub action: Option<SaveMode>,
    #[serde(flatten)]
    pub profile: StudentProfileForm,
}

impl StaffStudentForm {
    pub fn mode(&self) -> SaveMode {
        self.action.unwrap_or_default()
    }

    /// Trim and check the account fields.
    ///
    /// When `creating`, email and first name are required; otherwise absent
    /// fields are left unchanged. Emails are lowercased.
    pub fn clean_account(&self, creating: bool) -> Result<AccountChanges, FieldErrors> {
        let email = self.email.as_deref().map(|e| e.trim().to_lowercase());
        let first_name = self.first_name.as_deref().map(|n| n.trim().to_string());
        let last_name = self.last_name.as_deref().map(|n| n.trim().to_string());

        let mut errors = FieldErrors::new();
        let account_fields = Self {
            email: email.clone(),
            first_name: first_name.clone(),
            last_name: last_name.clone(),
            action: self.action,
            profile: StudentProfileForm::default(),
        };
        if let Err(validation) = account_fields.validate() {
            errors.merge(validation.into());
        }

        match email.as_deref() {
            None if creating => errors.add("email", MSG_FIELD_REQUIRED),
            Some("") => errors.add("email", MSG_FIELD_REQUIRED),
            Some(value) if !value.validate_email() => {
                errors.add("email", "Enter a valid email address.")
            }
            _ => {}
        }

        match first_name.as_deref() {
            None if creating => errors.add("first_name", MSG_FIELD_REQUIRED),
            Some("") => errors.add("first_name", MSG_FIELD_REQUIRED),
            _ => {}
        }

        for (field, value) in [("first_name", &first_name), ("last_name", &last_name)] {
            if value.as_ref().map_or(0, |v| v.chars().count()) as u64 > MAX_NAME_LENGTH {
                errors.add(
                    field,
                    format!("Ensure this value has at most {} characters.", MAX_NAME_LENGTH),
                );
            }
        }

        if errors.is_empty() {
            Ok(AccountChanges {
                email,
                first_name,
                last_name,
            })
        } else {
            Err(errors)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn complete_form() -> StudentProfileForm {
        StudentProfileForm {
            gender: Some("F".into()),
            marital_status: Some("married".into()),
            degree_level: Some("S2".into()),
            semester_level: Some("3".into()),
            level: Some("maba".into()),
            ..Default::default()
        }
    }

    #[test]
    fn clean_accepts_complete_form() {
        let profile = complete_form()
            .clean(&StudentProfile::provisioned(), SaveMode::Save)
            .unwrap();

        assert_eq!(profile.gender, Gender::Female);
        assert_eq!(profile.marital_status, MaritalStatus::Married);
        assert_eq!(profile.degree_level, DegreeLevel::S2);
        assert_eq!(profile.semester_level, 3);
        assert_eq!(profile.level, StudentLevel::NewStudent);
    }

    #[test]
    fn clean_requires_core_choices_when_saving() {
        let errors = StudentProfileForm::default()
            .clean(&StudentProfile::provisioned(), SaveMode::Save)
            .unwrap_err();

        for field in ["gender", "marital_status", "degree_level", "semester_level"] {
            assert_eq!(errors.get(field), [MSG_FIELD_REQUIRED.to_string()], "{}", field);
        }
    }

    #[test]
    fn draft_falls_back_to_current_values() {
        let mut current = StudentProfile::provisioned();
        current.degree_level = DegreeLevel::D3;

        let profile = StudentProfileForm::default()
            .clean(&current, SaveMode::Draft)
            .unwrap();

        assert_eq!(profile.degree_level, DegreeLevel::D3);
        assert_eq!(profile.gender, Gender::Male);
        assert_eq!(profile.semester_level, 1);
    }

    #[test]
    fn semester_out_of_range_is_rejected() {
        for value in ["0", "15"] {
            let mut form = complete_form();
            form.semester_level = Some(value.into());
            let errors = form
                .clean(&StudentProfile::provisioned(), SaveMode::Save)
                .unwrap_err();
            assert_eq!(errors.get("semester_level"), ["Must be between 1 and 14.".to_string()]);
        }

        let mut form = complete_form();
        form.semester_level = Some("14".into());
        assert!(form.clean(&StudentProfile::provisioned(), SaveMode::Save).is_ok());
    }

    #[test]
    fn semester_range_applies_to_drafts() {
        let mut form = StudentProfileForm::default();
        form.semester_level = Some("20".into());

        let errors = form
            .clean(&StudentProfile::provisioned(), SaveMode::Draft)
            .unwrap_err();
        assert!(errors.contains("semester_level"));
    }

    #[test]
    fn blank_identity_numbers_become_none() {
        let mut form = complete_form();
        form.passport_number = Some("   ".into());
        form.nik = Some("".into());

        let profile = form.clean(&StudentProfile::provisioned(), SaveMode::Save).unwrap();
        assert!(profile.passport_number.is_none());
        assert!(profile.nik.is_none());
    }

    #[test]
    fn identity_numbers_are_trimmed() {
        let mut form = complete_form();
        form.passport_number = Some("  A1234567 ".into());
        form.nik = Some(" 3201234567890001 ".into());

        let profile = form.clean(&StudentProfile::provisioned(), SaveMode::Save).unwrap();
        assert_eq!(profile.passport_number.as_deref(), Some("A1234567"));
        assert_eq!(profile.nik.as_deref(), Some("3201234567890001"));
    }

    #[test]
    fn length_limits_apply_after_trimming() {
        let mut form = complete_form();
        form.passport_number = Some(" ABCDEFGHIJ0123456789 ".into());

        let profile = form.clean(&StudentProfile::provisioned(), SaveMode::Save).unwrap();
        assert_eq!(profile.passport_number.as_deref(), Some("ABCDEFGHIJ0123456789"));

        let mut form = complete_form();
        form.passport_number = Some("ABCDEFGHIJ0123456789X".into());
        let errors = form
            .clean(&StudentProfile::provisioned(), SaveMode::Save)
            .unwrap_err();
        assert!(errors.contains("passport_number"));
    }

    #[test]
    fn non_numeric_nik_is_rejected() {
        let mut form = complete_form();
        form.nik = Some("32-01".into());

        let errors = form
            .clean(&StudentProfile::provisioned(), SaveMode::Save)
            .unwrap_err();
        assert!(errors.contains("nik"));
    }

    #[test]
    fn invalid_choice_is_reported_once() {
        let mut form = complete_form();
        form.gender = Some("X".into());

        let errors = form
            .clean(&StudentProfile::provisioned(), SaveMode::Save)
            .unwrap_err();
        assert_eq!(errors.get("gender").len(), 1);
        assert!(errors.get("gender")[0].contains("X is not one of the available choices"));
    }

    #[test]
    fn amounts_must_be_non_negative() {
        let mut form = complete_form();
        form.living_cost = Some("-1".into());
        form.latest_grade = Some("100".into());

        let errors = form
            .clean(&StudentProfile::provisioned(), SaveMode::Save)
            .unwrap_err();
        assert!(errors.contains("living_cost"));
        assert!(errors.contains("latest_grade"));
    }

    #[test]
    fn amounts_parse_decimal_text() {
        let mut form = complete_form();
        form.living_cost = Some("1500000.50".into());
        form.latest_grade = Some("3.75".into());

        let profile = form.clean(&StudentProfile::provisioned(), SaveMode::Save).unwrap();
        assert_eq!(profile.living_cost, Some(Decimal::new(150000050, 2)));
        assert_eq!(profile.latest_grade, Some(Decimal::new(375, 2)));
    }

    #[test]
    fn phone_and_url_formats_are_checked() {
        let mut form = complete_form();
        form.whatsapp_number = Some("call me".into());
        form.photo_url = Some("not a url".into());
        form.parents_phone = Some("+62 812-3456-789".into());

        let errors = form
            .clean(&StudentProfile::provisioned(), SaveMode::Save)
            .unwrap_err();
        assert!(errors.contains("whatsapp_number"));
        assert!(errors.contains("photo_url"));
        assert!(!errors.contains("parents_phone"));
    }

    #[test]
    fn json_numbers_are_accepted_for_scalar_fields() {
        let form: StudentProfileForm = serde_json::from_value(serde_json::json!({
            "gender": "M",
            "marital_status": "single",
            "degree_level": "S1",
            "semester_level": 5,
            "latest_grade": 3.5,
            "birth_date": "2002-01-31",
            "faculty": null
        }))
        .unwrap();

        let profile = form.clean(&StudentProfile::provisioned(), SaveMode::Save).unwrap();
        assert_eq!(profile.semester_level, 5);
        assert_eq!(profile.latest_grade, Some(Decimal::new(35, 1)));
        assert_eq!(profile.birth_date, NaiveDate::from_ymd_opt(2002, 1, 31));
        assert_eq!(profile.faculty, "");
    }

    #[test]
    fn staff_form_requires_identity_on_create() {
        let form = StaffStudentForm::default();
        let errors = form.clean_account(true).unwrap_err();

        assert!(errors.contains("email"));
        assert!(errors.contains("first_name"));
        assert!(form.clean_account(false).unwrap().is_empty());
    }

    #[test]
    fn staff_form_normalises_email() {
        let form = StaffStudentForm {
            email: Some("  Budi@Example.COM ".into()),
            first_name: Some(" Budi ".into()),
            ..Default::default()
        };

        let changes = form.clean_account(true).unwrap();
        assert_eq!(changes.email.as_deref(), Some("budi@example.com"));
        assert_eq!(changes.first_name.as_deref(), Some("Budi"));
    }

    #[test]
    fn staff_email_length_is_checked_after_trimming() {
        let label = "b".repeat(61);
        let email = format!("{}@{}.{}.{}.com", "a".repeat(64), label, label, label);
        assert_eq!(email.len(), 254);
        let form = StaffStudentForm {
            email: Some(format!("   {}   ", email)),
            first_name: Some("Budi".into()),
            ..Default::default()
        };

        let changes = form.clean_account(true).unwrap();
        assert_eq!(changes.email.map(|e| e.len()), Some(254));
    }

    #[test]
    fn staff_form_reads_flattened_profile() {
        let form: StaffStudentForm = serde_json::from_value(serde_json::json!({
            "email": "budi@example.com",
            "first_name": "Budi",
            "action": "draft",
            "faculty": "Engineering"
        }))
        .unwrap();

        assert_eq!(form.mode(), SaveMode::Draft);
        assert_eq!(form.profile.faculty.as_deref(), Some("Engineering"));
    }
}
