//! Student database entity for SeaORM.
//!
//! Choice fields are stored as their short codes.

use sea_orm::entity::prelude::*;
use sea_orm::Set;

use crate::domain::{Student, StudentProfile};
use crate::errors::{AppError, AppResult};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "students")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub account_id: Uuid,

    pub whatsapp_number: String,
    pub birth_place: String,
    pub birth_date: Option<Date>,
    pub gender: String,
    pub marital_status: String,
    pub citizenship_status: String,
    pub region_origin: String,

    pub parents_name: String,
    pub parents_phone: String,
    pub guardian_name: String,
    pub guardian_phone: String,
    pub photo_url: Option<String>,

    pub level: String,
    pub institution: String,
    pub faculty: String,
    pub major: String,
    pub degree_level: String,
    pub semester_level: i16,
    #[sea_orm(column_type = "Decimal(Some((4, 2)))", nullable)]
    pub latest_grade: Option<Decimal>,
    pub school_origin: String,

    #[sea_orm(unique)]
    pub passport_number: Option<String>,
    #[sea_orm(unique)]
    pub nik: Option<String>,
    pub lapdik_number: String,
    pub arrival_date: Option<Date>,

    pub home_name: String,
    pub home_location: String,

    pub disease_history: String,
    pub disease_status: Option<String>,

    pub sport_interest: String,
    #[sea_orm(column_type = "Text")]
    pub sport_achievement: String,
    pub art_interest: String,
    #[sea_orm(column_type = "Text")]
    pub art_achievement: String,
    pub literacy_interest: String,
    #[sea_orm(column_type = "Text")]
    pub literacy_achievement: String,
    pub science_interest: String,
    #[sea_orm(column_type = "Text")]
    pub science_achievement: String,
    pub mtq_interest: String,
    #[sea_orm(column_type = "Text")]
    pub mtq_achievement: String,
    pub media_interest: String,
    #[sea_orm(column_type = "Text")]
    pub media_achievement: String,

    #[sea_orm(column_type = "Text")]
    pub organization_history: String,

    pub education_funding: Option<String>,
    pub scholarship_source: Option<String>,
    #[sea_orm(column_type = "Decimal(Some((10, 2)))", nullable)]
    pub living_cost: Option<Decimal>,
    #[sea_orm(column_type = "Decimal(Some((10, 2)))", nullable)]
    pub monthly_income: Option<Decimal>,

    pub is_draft: bool,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::account::Entity",
        from = "Column::AccountId",
        to = "super::account::Column::Id",
        on_delete = "Cascade"
    )]
    Account,
}

impl Related<super::account::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Account.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

fn decode<T>(column: &str, value: &str) -> AppResult<T>
where
    T: std::str::FromStr,
{
    value
        .parse()
        .map_err(|_| AppError::internal(format!("Unexpected {} value stored: {}", column, value)))
}

fn decode_optional<T>(column: &str, value: Option<&str>) -> AppResult<Option<T>>
where
    T: std::str::FromStr,
{
    value.map(|v| decode(column, v)).transpose()
}

/// Convert database model to domain entity
impl TryFrom<Model> for Student {
    type Error = AppError;

    fn try_from(model: Model) -> AppResult<Self> {
        let profile = StudentProfile {
            gender: decode("gender", &model.gender)?,
            marital_status: decode("marital_status", &model.marital_status)?,
            level: decode("level", &model.level)?,
            degree_level: decode("degree_level", &model.degree_level)?,
            disease_status: decode_optional("disease_status", model.disease_status.as_deref())?,
            education_funding: decode_optional(
                "education_funding",
                model.education_funding.as_deref(),
            )?,
            whatsapp_number: model.whatsapp_number,
            birth_place: model.birth_place,
            birth_date: model.birth_date,
            citizenship_status: model.citizenship_status,
            region_origin: model.region_origin,
            parents_name: model.parents_name,
            parents_phone: model.parents_phone,
            guardian_name: model.guardian_name,
            guardian_phone: model.guardian_phone,
            photo_url: model.photo_url,
            institution: model.institution,
            faculty: model.faculty,
            major: model.major,
            semester_level: model.semester_level,
            latest_grade: model.latest_grade,
            school_origin: model.school_origin,
            passport_number: model.passport_number,
            nik: model.nik,
            lapdik_number: model.lapdik_number,
            arrival_date: model.arrival_date,
            home_name: model.home_name,
            home_location: model.home_location,
            disease_history: model.disease_history,
            sport_interest: model.sport_interest,
            sport_achievement: model.sport_achievement,
            art_interest: model.art_interest,
            art_achievement: model.art_achievement,
            literacy_interest: model.literacy_interest,
            literacy_achievement: model.literacy_achievement,
            science_interest: model.science_interest,
            science_achievement: model.science_achievement,
            mtq_interest: model.mtq_interest,
            mtq_achievement: model.mtq_achievement,
            media_interest: model.media_interest,
            media_achievement: model.media_achievement,
            organization_history: model.organization_history,
            scholarship_source: model.scholarship_source,
            living_cost: model.living_cost,
            monthly_income: model.monthly_income,
        };

        Ok(Student {
            id: model.id,
            account_id: model.account_id,
            profile,
            is_draft: model.is_draft,
            created_at: model.created_at,
            updated_at: model.updated_at,
        })
    }
}

impl ActiveModel {
    /// Copy every profile field onto the active model.
    pub fn set_profile(&mut self, profile: &StudentProfile) {
        let p = profile.clone();
        self.whatsapp_number = Set(p.whatsapp_number);
        self.birth_place = Set(p.birth_place);
        self.birth_date = Set(p.birth_date);
        self.gender = Set(p.gender.as_str().to_string());
        self.marital_status = Set(p.marital_status.as_str().to_string());
        self.citizenship_status = Set(p.citizenship_status);
        self.region_origin = Set(p.region_origin);
        self.parents_name = Set(p.parents_name);
        self.parents_phone = Set(p.parents_phone);
        self.guardian_name = Set(p.guardian_name);
        self.guardian_phone = Set(p.guardian_phone);
        self.photo_url = Set(p.photo_url);
        self.level = Set(p.level.as_str().to_string());
        self.institution = Set(p.institution);
        self.faculty = Set(p.faculty);
        self.major = Set(p.major);
        self.degree_level = Set(p.degree_level.as_str().to_string());
        self.semester_level = Set(p.semester_level);
        self.latest_grade = Set(p.latest_grade);
        self.school_origin = Set(p.school_origin);
        self.passport_number = Set(p.passport_number);
        self.nik = Set(p.nik);
        self.lapdik_number = Set(p.lapdik_number);
        self.arrival_date = Set(p.arrival_date);
        self.home_name = Set(p.home_name);
        self.home_location = Set(p.home_location);
        self.disease_history = Set(p.disease_history);
        self.disease_status = Set(p.disease_status.map(|s| s.as_str().to_string()));
        self.sport_interest = Set(p.sport_interest);
        self.sport_achievement = Set(p.sport_achievement);
        self.art_interest = Set(p.art_interest);
        self.art_achievement = Set(p.art_achievement);
        self.literacy_interest = Set(p.literacy_interest);
        self.literacy_achievement = Set(p.literacy_achievement);
        self.science_interest = Set(p.science_interest);
        self.science_achievement = Set(p.science_achievement);
        self.mtq_interest = Set(p.mtq_interest);
        self.mtq_achievement = Set(p.mtq_achievement);
        self.media_interest = Set(p.media_interest);
        self.media_achievement = Set(p.media_achievement);
        self.organization_history = Set(p.organization_history);
        self.education_funding = Set(p.education_funding.map(|f| f.as_str().to_string()));
        self.scholarship_source = Set(p.scholarship_source);
        self.living_cost = Set(p.living_cost);
        self.monthly_income = Set(p.monthly_income);
    }

    /// Active model for a new student row.
    pub fn from_student(student: &Student) -> Self {
        let mut active = ActiveModel {
            id: Set(student.id),
            account_id: Set(student.account_id),
            is_draft: Set(student.is_draft),
            created_at: Set(student.created_at),
            updated_at: Set(student.updated_at),
            ..Default::default()
        };
        active.set_profile(&student.profile);
        active
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::ActiveValue;

    #[test]
    fn active_model_stores_choice_codes() {
        let student = Student::provision(Uuid::new_v4());
        let active = ActiveModel::from_student(&student);

        assert_eq!(active.gender, ActiveValue::Set("M".to_string()));
        assert_eq!(active.level, ActiveValue::Set("regular".to_string()));
        assert_eq!(
            active.education_funding,
            ActiveValue::Set(Some("non-beasiswa".to_string()))
        );
    }

    #[test]
    fn unknown_stored_choice_is_an_internal_error() {
        let result: AppResult<crate::domain::Gender> = decode("gender", "Z");
        assert!(matches!(result, Err(AppError::Internal(_))));
    }
}
