//! Student service - the student record lifecycle.
//!
//! Students edit their own profile; staff search, create, edit, export and
//! delete any record and issue credentials. Staff-created accounts get a
//! username derived from their email and a generated password, which is
//! emailed and returned exactly once.

use async_trait::async_trait;
use serde::Serialize;
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::config::Config;
use crate::domain::{
    AccountChanges, AccountResponse, AccountRole, IssuedCredentials, NewAccount, Password,
    ProfileChanges, SaveMode, StaffStudentForm, StudentProfile, StudentProfileForm, StudentQuery,
    StudentRecord, StudentStats, StudentSummary,
};
use crate::errors::{AppError, AppResult, FieldErrors, OptionExt};
use crate::infra::UnitOfWork;
use crate::jobs::Mailer;
use crate::types::{Paginated, PaginationParams};
use crate::utils::{credentials_email, username_base, username_candidates, CsvWriter};

const MSG_EMAIL_TAKEN: &str = "Email already registered.";
const MSG_PASSPORT_TAKEN: &str = "Passport already registered.";
const MSG_NIK_TAKEN: &str = "NIK already registered.";

/// A staff-created record with its one-time credentials.
#[derive(Debug, Clone)]
pub struct CreatedStudent {
    pub record: StudentRecord,
    pub credentials: IssuedCredentials,
}

/// Landing data after sign-in.
#[derive(Debug, Serialize, ToSchema)]
pub struct Dashboard {
    pub account: AccountResponse,
    /// The signed-in student's record, if one exists
    pub profile: Option<StudentSummary>,
    /// Head counts, staff only
    pub stats: Option<StudentStats>,
}

/// Student service trait for dependency injection.
#[async_trait]
pub trait StudentService: Send + Sync {
    /// The record owned by an account; `None` when it has none.
    async fn my_profile(&self, account_id: Uuid) -> AppResult<Option<StudentRecord>>;

    /// Full self-service save. Clears the draft flag.
    async fn update_my_profile(&self, account_id: Uuid, form: StudentProfileForm) -> AppResult<StudentRecord>;

    /// Search, filter, sort and paginate records
    async fn list(&self, query: StudentQuery, page: PaginationParams) -> AppResult<Paginated<StudentSummary>>;

    /// Get a record by ID
    async fn get(&self, id: Uuid) -> AppResult<StudentRecord>;

    /// Create an account and its record from a staff form
    async fn create(&self, staff_id: Uuid, form: StaffStudentForm) -> AppResult<CreatedStudent>;

    /// Staff edit of a record and its account fields
    async fn update(&self, staff_id: Uuid, id: Uuid, form: StaffStudentForm) -> AppResult<StudentRecord>;

    /// Issue a new password for the record's account
    async fn reset_credentials(&self, staff_id: Uuid, id: Uuid) -> AppResult<IssuedCredentials>;

    /// Delete a record and its account
    async fn delete(&self, staff_id: Uuid, id: Uuid) -> AppResult<()>;

    /// Every matching record as CSV
    async fn export_csv(&self, staff_id: Uuid, query: StudentQuery) -> AppResult<String>;

    /// Role-dependent landing data
    async fn dashboard(&self, account_id: Uuid) -> AppResult<Dashboard>;
}

/// Concrete implementation of StudentService using Unit of Work.
pub struct StudentManager<U: UnitOfWork> {
    uow: Arc<U>,
    mailer: Arc<dyn Mailer>,
    config: Config,
}

impl<U: UnitOfWork> StudentManager<U> {
    pub fn new(uow: Arc<U>, mailer: Arc<dyn Mailer>, config: Config) -> Self {
        Self { uow, mailer, config }
    }

    /// Record passport/NIK collisions with other records.
    async fn check_identity(
        &self,
        profile: &StudentProfile,
        except: Option<Uuid>,
        errors: &mut FieldErrors,
    ) -> AppResult<()> {
        let students = self.uow.students();
        if let Some(passport) = &profile.passport_number {
            if students.passport_exists(passport, except).await? {
                errors.add("passport_number", MSG_PASSPORT_TAKEN);
            }
        }
        if let Some(nik) = &profile.nik {
            if students.nik_exists(nik, except).await? {
                errors.add("nik", MSG_NIK_TAKEN);
            }
        }
        Ok(())
    }

    async fn check_email(
        &self,
        changes: &AccountChanges,
        except: Option<Uuid>,
        errors: &mut FieldErrors,
    ) -> AppResult<()> {
        if let Some(email) = &changes.email {
            if self.uow.accounts().email_exists(email, except).await? {
                errors.add("email", MSG_EMAIL_TAKEN);
            }
        }
        Ok(())
    }

    async fn unique_username(&self, email: &str) -> AppResult<String> {
        let base = username_base(email);
        for candidate in username_candidates(&base) {
            if !self.uow.accounts().username_exists(&candidate).await? {
                return Ok(candidate);
            }
        }
        Err(AppError::internal("Username candidates exhausted"))
    }

    async fn send_credentials(&self, record: &StudentRecord, credentials: &IssuedCredentials) {
        let message = credentials_email(
            record.email(),
            &record.full_name(),
            &credentials.username,
            &credentials.password,
            &self.config.login_url(),
        );
        if let Err(e) = self.mailer.send(message).await {
            tracing::warn!(student_id = %record.id(), error = %e, "Failed to queue credentials email");
        }
    }
}

/// Keep the value, or move its errors into `errors`.
fn collect<T>(errors: &mut FieldErrors, result: Result<T, FieldErrors>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(e) => {
            errors.merge(e);
            None
        }
    }
}

#[async_trait]
impl<U: UnitOfWork> StudentService for StudentManager<U> {
    async fn my_profile(&self, account_id: Uuid) -> AppResult<Option<StudentRecord>> {
        self.uow.students().find_by_account(account_id).await
    }

    async fn update_my_profile(&self, account_id: Uuid, form: StudentProfileForm) -> AppResult<StudentRecord> {
        let record = self
            .uow
            .students()
            .find_by_account(account_id)
            .await?
            .ok_or_not_found()?;

        let profile = form.clean(&record.student.profile, SaveMode::Save)?;
        let mut errors = FieldErrors::new();
        self.check_identity(&profile, Some(record.id()), &mut errors).await?;
        errors.into_result()?;

        let updated = self
            .uow
            .students()
            .update(
                record.id(),
                ProfileChanges {
                    profile,
                    is_draft: false,
                },
                AccountChanges::default(),
            )
            .await?;

        tracing::info!(account_id = %account_id, student_id = %updated.id(), "Profile updated by student");
        Ok(updated)
    }

    async fn list(&self, query: StudentQuery, page: PaginationParams) -> AppResult<Paginated<StudentSummary>> {
        let filter = query.into_filter()?;
        let (records, total) = self.uow.students().search(filter, Some(page)).await?;

        Ok(Paginated::new(
            records.into_iter().map(StudentSummary::from).collect(),
            page.page(),
            page.limit(),
            total,
        ))
    }

    async fn get(&self, id: Uuid) -> AppResult<StudentRecord> {
        self.uow.students().find_by_id(id).await?.ok_or_not_found()
    }

    async fn create(&self, staff_id: Uuid, form: StaffStudentForm) -> AppResult<CreatedStudent> {
        let mode = form.mode();
        let mut errors = FieldErrors::new();

        let changes = collect(&mut errors, form.clean_account(true));
        // Blank required choices of a draft fall back to the provisioning defaults.
        let profile = collect(
            &mut errors,
            form.profile.clean(&StudentProfile::provisioned(), mode),
        );

        if let Some(changes) = &changes {
            self.check_email(changes, None, &mut errors).await?;
        }
        if let Some(profile) = &profile {
            self.check_identity(profile, None, &mut errors).await?;
        }
        errors.into_result()?;

        let (Some(changes), Some(profile)) = (changes, profile) else {
            return Err(AppError::internal("Cleaned form is missing values"));
        };
        let email = changes.email.unwrap_or_default();

        let username = self.unique_username(&email).await?;
        let password = Password::generate_temporary();
        let password_hash = Password::new(&password)?.into_string();

        let account = self
            .uow
            .accounts()
            .create(
                NewAccount {
                    username,
                    email,
                    first_name: changes.first_name.unwrap_or_default(),
                    last_name: changes.last_name.unwrap_or_default(),
                    password_hash,
                    role: AccountRole::Student,
                },
                Some(ProfileChanges {
                    profile,
                    is_draft: mode.is_draft(),
                }),
            )
            .await?;

        let record = self
            .uow
            .students()
            .find_by_account(account.id)
            .await?
            .ok_or_else(|| AppError::internal(format!("Account {} has no student record", account.id)))?;

        let credentials = IssuedCredentials {
            username: account.username,
            password,
        };
        self.send_credentials(&record, &credentials).await;

        tracing::info!(
            staff_id = %staff_id,
            student_id = %record.id(),
            draft = mode.is_draft(),
            "Student record created"
        );
        Ok(CreatedStudent {
            record,
            credentials,
        })
    }

    async fn update(&self, staff_id: Uuid, id: Uuid, form: StaffStudentForm) -> AppResult<StudentRecord> {
        let record = self.get(id).await?;
        let mode = form.mode();
        let mut errors = FieldErrors::new();

        let changes = collect(&mut errors, form.clean_account(false));
        let profile = collect(&mut errors, form.profile.clean(&record.student.profile, mode));

        if let Some(changes) = &changes {
            self.check_email(changes, Some(record.account.id), &mut errors).await?;
        }
        if let Some(profile) = &profile {
            self.check_identity(profile, Some(record.id()), &mut errors).await?;
        }
        errors.into_result()?;

        let (Some(changes), Some(profile)) = (changes, profile) else {
            return Err(AppError::internal("Cleaned form is missing values"));
        };

        let updated = self
            .uow
            .students()
            .update(
                id,
                ProfileChanges {
                    profile,
                    is_draft: mode.is_draft(),
                },
                changes,
            )
            .await?;

        tracing::info!(staff_id = %staff_id, student_id = %id, draft = mode.is_draft(), "Student record updated");
        Ok(updated)
    }

    async fn reset_credentials(&self, staff_id: Uuid, id: Uuid) -> AppResult<IssuedCredentials> {
        let record = self.get(id).await?;

        let password = Password::generate_temporary();
        let password_hash = Password::new(&password)?.into_string();
        self.uow
            .accounts()
            .set_password(record.account.id, password_hash)
            .await?;

        let credentials = IssuedCredentials {
            username: record.account.username.clone(),
            password,
        };
        self.send_credentials(&record, &credentials).await;

        tracing::info!(staff_id = %staff_id, student_id = %id, "Student credentials reset");
        Ok(credentials)
    }

    async fn delete(&self, staff_id: Uuid, id: Uuid) -> AppResult<()> {
        self.uow.students().delete_with_account(id).await?;
        tracing::info!(staff_id = %staff_id, student_id = %id, "Student record deleted");
        Ok(())
    }

    async fn export_csv(&self, staff_id: Uuid, query: StudentQuery) -> AppResult<String> {
        let filter = query.into_filter()?;
        let (records, total) = self.uow.students().search(filter, None).await?;

        let mut writer = CsvWriter::new();
        writer.write_record(EXPORT_HEADER);
        for record in &records {
            writer.write_record(export_row(record));
        }

        tracing::info!(staff_id = %staff_id, rows = total, "Student records exported");
        Ok(writer.finish())
    }

    async fn dashboard(&self, account_id: Uuid) -> AppResult<Dashboard> {
        let account = self
            .uow
            .accounts()
            .find_by_id(account_id)
            .await?
            .ok_or(AppError::Unauthorized)?;

        let (profile, stats) = if account.is_staff() {
            (None, Some(self.uow.students().stats().await?))
        } else {
            let record = self.uow.students().find_by_account(account_id).await?;
            (record.map(StudentSummary::from), None)
        };

        Ok(Dashboard {
            account: account.into(),
            profile,
            stats,
        })
    }
}

const EXPORT_HEADER: &[&str] = &[
    "id",
    "username",
    "full_name",
    "email",
    "first_name",
    "last_name",
    "whatsapp_number",
    "birth_place",
    "birth_date",
    "gender",
    "marital_status",
    "citizenship_status",
    "region_origin",
    "parents_name",
    "parents_phone",
    "guardian_name",
    "guardian_phone",
    "photo_url",
    "level",
    "institution",
    "faculty",
    "major",
    "degree_level",
    "semester_level",
    "latest_grade",
    "school_origin",
    "passport_number",
    "nik",
    "lapdik_number",
    "arrival_date",
    "home_name",
    "home_location",
    "disease_history",
    "disease_status",
    "sport_interest",
    "sport_achievement",
    "art_interest",
    "art_achievement",
    "literacy_interest",
    "literacy_achievement",
    "science_interest",
    "science_achievement",
    "mtq_interest",
    "mtq_achievement",
    "media_interest",
    "media_achievement",
    "organization_history",
    "education_funding",
    "scholarship_source",
    "living_cost",
    "monthly_income",
    "is_draft",
    "created_at",
    "updated_at",
];

fn opt<T: ToString>(value: &Option<T>) -> String {
    value.as_ref().map(ToString::to_string).unwrap_or_default()
}

fn export_row(record: &StudentRecord) -> Vec<String> {
    let account = &record.account;
    let student = &record.student;
    let p = &student.profile;

    vec![
        student.id.to_string(),
        account.username.clone(),
        account.full_name(),
        account.email.clone(),
        account.first_name.clone(),
        account.last_name.clone(),
        p.whatsapp_number.clone(),
        p.birth_place.clone(),
        opt(&p.birth_date),
        p.gender.label().to_string(),
        p.marital_status.label().to_string(),
        p.citizenship_status.clone(),
        p.region_origin.clone(),
        p.parents_name.clone(),
        p.parents_phone.clone(),
        p.guardian_name.clone(),
        p.guardian_phone.clone(),
        opt(&p.photo_url),
        p.level.label().to_string(),
        p.institution.clone(),
        p.faculty.clone(),
        p.major.clone(),
        p.degree_level.label().to_string(),
        p.semester_level.to_string(),
        opt(&p.latest_grade),
        p.school_origin.clone(),
        opt(&p.passport_number),
        opt(&p.nik),
        p.lapdik_number.clone(),
        opt(&p.arrival_date),
        p.home_name.clone(),
        p.home_location.clone(),
        p.disease_history.clone(),
        p.disease_status.map(|s| s.label().to_string()).unwrap_or_default(),
        p.sport_interest.clone(),
        p.sport_achievement.clone(),
        p.art_interest.clone(),
        p.art_achievement.clone(),
        p.literacy_interest.clone(),
        p.literacy_achievement.clone(),
        p.science_interest.clone(),
        p.science_achievement.clone(),
        p.mtq_interest.clone(),
        p.mtq_achievement.clone(),
        p.media_interest.clone(),
        p.media_achievement.clone(),
        p.organization_history.clone(),
        p.education_funding.map(|f| f.label().to_string()).unwrap_or_default(),
        opt(&p.scholarship_source),
        opt(&p.living_cost),
        opt(&p.monthly_income),
        student.is_draft.to_string(),
        student.created_at.to_rfc3339(),
        student.updated_at.to_rfc3339(),
    ]
}
