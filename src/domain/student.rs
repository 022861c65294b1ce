//! Student record entity and related types.
//!
//! A student record is the profile half of a student: everything the
//! registry office tracks about a person apart from their login. Identity
//! (email, name) lives on the linked [`Account`].

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::account::Account;
use super::choices::{
    DegreeLevel, DiseaseStatus, EducationFunding, Gender, MaritalStatus, StudentLevel,
};

/// Editable profile fields of a student record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct StudentProfile {
    // Personal
    pub whatsapp_number: String,
    pub birth_place: String,
    pub birth_date: Option<NaiveDate>,
    pub gender: Gender,
    pub marital_status: MaritalStatus,
    pub citizenship_status: String,
    pub region_origin: String,

    // Family
    pub parents_name: String,
    pub parents_phone: String,
    pub guardian_name: String,
    pub guardian_phone: String,
    pub photo_url: Option<String>,

    // Academic
    pub level: StudentLevel,
    pub institution: String,
    pub faculty: String,
    pub major: String,
    pub degree_level: DegreeLevel,
    #[schema(minimum = 1, maximum = 14)]
    pub semester_level: i16,
    #[schema(value_type = Option<String>, example = "3.75")]
    pub latest_grade: Option<Decimal>,
    pub school_origin: String,

    // Identity documents
    pub passport_number: Option<String>,
    pub nik: Option<String>,
    pub lapdik_number: String,
    pub arrival_date: Option<NaiveDate>,

    // Residence
    pub home_name: String,
    pub home_location: String,

    // Health
    pub disease_history: String,
    pub disease_status: Option<DiseaseStatus>,

    // Interests and achievements
    pub sport_interest: String,
    pub sport_achievement: String,
    pub art_interest: String,
    pub art_achievement: String,
    pub literacy_interest: String,
    pub literacy_achievement: String,
    pub science_interest: String,
    pub science_achievement: String,
    pub mtq_interest: String,
    pub mtq_achievement: String,
    pub media_interest: String,
    pub media_achievement: String,

    pub organization_history: String,

    // Financial
    pub education_funding: Option<EducationFunding>,
    pub scholarship_source: Option<String>,
    #[schema(value_type = Option<String>, example = "1500000.00")]
    pub living_cost: Option<Decimal>,
    #[schema(value_type = Option<String>, example = "0.00")]
    pub monthly_income: Option<Decimal>,
}

impl StudentProfile {
    /// Profile created for every new student account.
    pub fn provisioned() -> Self {
        Self {
            whatsapp_number: String::new(),
            birth_place: String::new(),
            birth_date: None,
            gender: Gender::Male,
            marital_status: MaritalStatus::Single,
            citizenship_status: String::new(),
            region_origin: String::new(),
            parents_name: String::new(),
            parents_phone: String::new(),
            guardian_name: String::new(),
            guardian_phone: String::new(),
            photo_url: None,
            level: StudentLevel::Regular,
            institution: String::new(),
            faculty: String::new(),
            major: String::new(),
            degree_level: DegreeLevel::S1,
            semester_level: 1,
            latest_grade: None,
            school_origin: String::new(),
            passport_number: None,
            nik: None,
            lapdik_number: String::new(),
            arrival_date: None,
            home_name: String::new(),
            home_location: String::new(),
            disease_history: String::new(),
            disease_status: None,
            sport_interest: String::new(),
            sport_achievement: String::new(),
            art_interest: String::new(),
            art_achievement: String::new(),
            literacy_interest: String::new(),
            literacy_achievement: String::new(),
            science_interest: String::new(),
            science_achievement: String::new(),
            mtq_interest: String::new(),
            mtq_achievement: String::new(),
            media_interest: String::new(),
            media_achievement: String::new(),
            organization_history: String::new(),
            education_funding: Some(EducationFunding::SelfFunded),
            scholarship_source: None,
            living_cost: Some(Decimal::ZERO),
            monthly_income: None,
        }
    }
}

impl Default for StudentProfile {
    fn default() -> Self {
        Self::provisioned()
    }
}

/// Student record as stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Student {
    pub id: Uuid,
    pub account_id: Uuid,
    pub profile: StudentProfile,
    pub is_draft: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Student {
    /// Freshly provisioned record for an account.
    pub fn provision(account_id: Uuid) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            account_id,
            profile: StudentProfile::provisioned(),
            is_draft: false,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Cleaned profile values to store, with the draft flag.
#[derive(Debug, Clone, PartialEq)]
pub struct ProfileChanges {
    pub profile: StudentProfile,
    pub is_draft: bool,
}

/// Head counts shown on the staff dashboard.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, ToSchema)]
pub struct StudentStats {
    pub total: u64,
    pub drafts: u64,
    pub new_students: u64,
    pub regular: u64,
    pub alumni: u64,
}

/// A student record joined with its login account.
#[derive(Debug, Clone)]
pub struct StudentRecord {
    pub student: Student,
    pub account: Account,
}

impl StudentRecord {
    pub fn new(student: Student, account: Account) -> Self {
        Self { student, account }
    }

    pub fn id(&self) -> Uuid {
        self.student.id
    }

    pub fn email(&self) -> &str {
        &self.account.email
    }

    pub fn full_name(&self) -> String {
        self.account.full_name()
    }
}

/// Full student record returned to clients.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct StudentResponse {
    #[schema(example = "550e8400-e29b-41d4-a716-446655440000")]
    pub id: Uuid,
    pub account_id: Uuid,
    #[schema(example = "budi")]
    pub username: String,
    #[schema(example = "budi@example.com")]
    pub email: String,
    #[schema(example = "Budi")]
    pub first_name: String,
    #[schema(example = "Santoso")]
    pub last_name: String,
    #[schema(example = "Budi Santoso")]
    pub full_name: String,
    #[serde(flatten)]
    pub profile: StudentProfile,
    pub is_draft: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<StudentRecord> for StudentResponse {
    fn from(record: StudentRecord) -> Self {
        let full_name = record.full_name();
        let StudentRecord { student, account } = record;
        Self {
            id: student.id,
            account_id: account.id,
            username: account.username,
            email: account.email,
            first_name: account.first_name,
            last_name: account.last_name,
            full_name,
            profile: student.profile,
            is_draft: student.is_draft,
            created_at: student.created_at,
            updated_at: student.updated_at,
        }
    }
}

/// Row of the staff student list.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct StudentSummary {
    pub id: Uuid,
    #[schema(example = "budi")]
    pub username: String,
    #[schema(example = "Budi Santoso")]
    pub full_name: String,
    #[schema(example = "budi@example.com")]
    pub email: String,
    pub level: StudentLevel,
    pub faculty: String,
    pub major: String,
    pub degree_level: DegreeLevel,
    pub semester_level: i16,
    pub region_origin: String,
    pub is_draft: bool,
    pub updated_at: DateTime<Utc>,
}

impl From<StudentRecord> for StudentSummary {
    fn from(record: StudentRecord) -> Self {
        let full_name = record.full_name();
        let StudentRecord { student, account } = record;
        Self {
            id: student.id,
            username: account.username,
            full_name,
            email: account.email,
            level: student.profile.level,
            faculty: student.profile.faculty,
            major: student.profile.major,
            degree_level: student.profile.degree_level,
            semester_level: student.profile.semester_level,
            region_origin: student.profile.region_origin,
            is_draft: student.is_draft,
            updated_at: student.updated_at,
        }
    }
}
