//! Student repository implementation.
//!
//! Records are always loaded together with their account. Edits that touch
//! both tables and deletions run inside one transaction.

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::sea_query::{Expr, Func, LikeExpr};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, Order,
    PaginatorTrait, QueryFilter, QueryOrder, Select, SelectTwo, Set,
};
use uuid::Uuid;

use super::entities::account::{self, ActiveModel as AccountActiveModel, Entity as AccountEntity};
use super::entities::student::{self, ActiveModel, Entity as StudentEntity};
use crate::domain::{
    Account, AccountChanges, ProfileChanges, SortField, Student, StudentFilter, StudentLevel,
    StudentRecord, StudentStats,
};
use crate::errors::{AppError, AppResult};
use crate::infra::unit_of_work::run_in_transaction;
use crate::types::PaginationParams;

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Student repository trait for dependency injection.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait StudentRepository: Send + Sync {
    /// Find record by student ID
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<StudentRecord>>;

    /// Find the record owned by an account
    async fn find_by_account(&self, account_id: Uuid) -> AppResult<Option<StudentRecord>>;

    /// Check whether a passport number belongs to a record other than `except`
    async fn passport_exists(&self, passport: &str, except: Option<Uuid>) -> AppResult<bool>;

    /// Check whether a NIK belongs to a record other than `except`
    async fn nik_exists(&self, nik: &str, except: Option<Uuid>) -> AppResult<bool>;

    /// Store profile values and account changes together
    async fn update(
        &self,
        id: Uuid,
        changes: ProfileChanges,
        account: AccountChanges,
    ) -> AppResult<StudentRecord>;

    /// Delete a record together with its account
    async fn delete_with_account(&self, id: Uuid) -> AppResult<()>;

    /// Filtered, sorted records; paginated when `page` is given.
    ///
    /// Returns the page and the total number of matches.
    async fn search(
        &self,
        filter: StudentFilter,
        page: Option<PaginationParams>,
    ) -> AppResult<(Vec<StudentRecord>, u64)>;

    /// Dashboard head counts
    async fn stats(&self) -> AppResult<StudentStats>;
}

/// Concrete implementation of StudentRepository
pub struct StudentStore {
    db: DatabaseConnection,
}

impl StudentStore {
    /// Create new repository instance
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    async fn count_where(&self, condition: Condition) -> AppResult<u64> {
        Ok(StudentEntity::find()
            .filter(condition)
            .count(&self.db)
            .await?)
    }
}

fn to_record(pair: (student::Model, Option<account::Model>)) -> AppResult<StudentRecord> {
    let (student, account) = pair;
    let account = account.ok_or_else(|| {
        AppError::internal(format!("Student {} has no account", student.id))
    })?;
    Ok(StudentRecord::new(Student::try_from(student)?, Account::from(account)))
}

/// Escape LIKE wildcards so user input matches literally.
fn like_pattern(term: &str) -> String {
    let escaped = term
        .to_lowercase()
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{}%", escaped)
}

fn search_condition(filter: &StudentFilter) -> Condition {
    let mut condition = Condition::all();

    if let Some(term) = &filter.search {
        let pattern = like_pattern(term);
        let columns = [
            Expr::col((AccountEntity, account::Column::FirstName)),
            Expr::col((AccountEntity, account::Column::LastName)),
            Expr::col((AccountEntity, account::Column::Username)),
            Expr::col((AccountEntity, account::Column::Email)),
            Expr::col((StudentEntity, student::Column::PassportNumber)),
            Expr::col((StudentEntity, student::Column::Nik)),
        ];
        let any = columns.into_iter().fold(Condition::any(), |any, column| {
            any.add(Expr::expr(Func::lower(column)).like(LikeExpr::new(pattern.clone()).escape('\\')))
        });
        condition = condition.add(any);
    }
    if let Some(level) = filter.level {
        condition = condition.add(student::Column::Level.eq(level.as_str()));
    }
    if let Some(faculty) = &filter.faculty {
        condition = condition.add(student::Column::Faculty.eq(faculty.as_str()));
    }
    if let Some(gender) = filter.gender {
        condition = condition.add(student::Column::Gender.eq(gender.as_str()));
    }
    if let Some(region) = &filter.region_origin {
        condition = condition.add(student::Column::RegionOrigin.eq(region.as_str()));
    }
    if let Some(degree) = filter.degree_level {
        condition = condition.add(student::Column::DegreeLevel.eq(degree.as_str()));
    }
    if let Some(is_draft) = filter.is_draft {
        condition = condition.add(student::Column::IsDraft.eq(is_draft));
    }

    condition
}

fn apply_sort(
    query: SelectTwo<StudentEntity, AccountEntity>,
    filter: &StudentFilter,
) -> SelectTwo<StudentEntity, AccountEntity> {
    let order = if filter.sort.descending {
        Order::Desc
    } else {
        Order::Asc
    };

    let query = match filter.sort.field {
        SortField::FullName => query
            .order_by(account::Column::FirstName, order.clone())
            .order_by(account::Column::LastName, order.clone())
            .order_by(account::Column::Username, order),
        SortField::CreatedAt => query.order_by(student::Column::CreatedAt, order),
        SortField::UpdatedAt => query.order_by(student::Column::UpdatedAt, order),
        SortField::SemesterLevel => query.order_by(student::Column::SemesterLevel, order),
        SortField::Level => query.order_by(student::Column::Level, order),
        SortField::Faculty => query.order_by(student::Column::Faculty, order),
        SortField::Major => query.order_by(student::Column::Major, order),
        SortField::DegreeLevel => query.order_by(student::Column::DegreeLevel, order),
    };

    // Stable pages when the sort key ties.
    query.order_by_asc(student::Column::Id)
}

fn with_account(query: Select<StudentEntity>) -> SelectTwo<StudentEntity, AccountEntity> {
    query.find_also_related(AccountEntity)
}

#[async_trait]
impl StudentRepository for StudentStore {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<StudentRecord>> {
        with_account(StudentEntity::find_by_id(id))
            .one(&self.db)
            .await?
            .map(to_record)
            .transpose()
    }

    async fn find_by_account(&self, account_id: Uuid) -> AppResult<Option<StudentRecord>> {
        with_account(StudentEntity::find().filter(student::Column::AccountId.eq(account_id)))
            .one(&self.db)
            .await?
            .map(to_record)
            .transpose()
    }

    async fn passport_exists(&self, passport: &str, except: Option<Uuid>) -> AppResult<bool> {
        let mut condition = Condition::all().add(student::Column::PassportNumber.eq(passport));
        if let Some(id) = except {
            condition = condition.add(student::Column::Id.ne(id));
        }
        Ok(self.count_where(condition).await? > 0)
    }

    async fn nik_exists(&self, nik: &str, except: Option<Uuid>) -> AppResult<bool> {
        let mut condition = Condition::all().add(student::Column::Nik.eq(nik));
        if let Some(id) = except {
            condition = condition.add(student::Column::Id.ne(id));
        }
        Ok(self.count_where(condition).await? > 0)
    }

    async fn update(
        &self,
        id: Uuid,
        changes: ProfileChanges,
        account_changes: AccountChanges,
    ) -> AppResult<StudentRecord> {
        run_in_transaction(&self.db, move |txn| {
            Box::pin(async move {
                let (student_model, account_model) = with_account(StudentEntity::find_by_id(id))
                    .one(txn)
                    .await?
                    .ok_or(AppError::NotFound)?;
                let account_model = account_model
                    .ok_or_else(|| AppError::internal(format!("Student {} has no account", id)))?;

                let now = Utc::now();
                let account_model = if account_changes.is_empty() {
                    account_model
                } else {
                    let mut active: AccountActiveModel = account_model.into();
                    if let Some(email) = account_changes.email {
                        active.email = Set(email.to_lowercase());
                    }
                    if let Some(first_name) = account_changes.first_name {
                        active.first_name = Set(first_name);
                    }
                    if let Some(last_name) = account_changes.last_name {
                        active.last_name = Set(last_name);
                    }
                    active.updated_at = Set(now);
                    active
                        .update(txn)
                        .await
                        .map_err(|e| AppError::from_db(e, "Account"))?
                };

                let mut active: ActiveModel = student_model.into();
                active.set_profile(&changes.profile);
                active.is_draft = Set(changes.is_draft);
                active.updated_at = Set(now);
                let student_model = active
                    .update(txn)
                    .await
                    .map_err(|e| AppError::from_db(e, "Student"))?;

                to_record((student_model, Some(account_model)))
            })
        })
        .await
    }

    async fn delete_with_account(&self, id: Uuid) -> AppResult<()> {
        run_in_transaction(&self.db, move |txn| {
            Box::pin(async move {
                let student_model = StudentEntity::find_by_id(id)
                    .one(txn)
                    .await?
                    .ok_or(AppError::NotFound)?;

                StudentEntity::delete_by_id(student_model.id)
                    .exec(txn)
                    .await?;
                AccountEntity::delete_by_id(student_model.account_id)
                    .exec(txn)
                    .await?;
                Ok(())
            })
        })
        .await
    }

    async fn search(
        &self,
        filter: StudentFilter,
        page: Option<PaginationParams>,
    ) -> AppResult<(Vec<StudentRecord>, u64)> {
        let query = with_account(StudentEntity::find()).filter(search_condition(&filter));
        let query = apply_sort(query, &filter);

        let (rows, total) = match page {
            Some(params) => {
                let paginator = query.paginate(&self.db, params.limit());
                let total = paginator.num_items().await?;
                let rows = paginator.fetch_page(params.page() - 1).await?;
                (rows, total)
            }
            None => {
                let rows = query.all(&self.db).await?;
                let total = rows.len() as u64;
                (rows, total)
            }
        };

        let records = rows
            .into_iter()
            .map(to_record)
            .collect::<AppResult<Vec<_>>>()?;
        Ok((records, total))
    }

    async fn stats(&self) -> AppResult<StudentStats> {
        let level_count = |level: StudentLevel| {
            self.count_where(Condition::all().add(student::Column::Level.eq(level.as_str())))
        };

        Ok(StudentStats {
            total: self.count_where(Condition::all()).await?,
            drafts: self
                .count_where(Condition::all().add(student::Column::IsDraft.eq(true)))
                .await?,
            new_students: level_count(StudentLevel::NewStudent).await?,
            regular: level_count(StudentLevel::Regular).await?,
            alumni: level_count(StudentLevel::Alumni).await?,
        })
    }
}
