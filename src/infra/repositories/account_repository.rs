//! Account repository implementation.
//!
//! Creating a student account also provisions its student record in the
//! same transaction.

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, Set,
};
use uuid::Uuid;

use super::entities::account::{self, ActiveModel, Entity as AccountEntity};
use super::entities::student::ActiveModel as StudentActiveModel;
use crate::domain::{Account, AccountRole, NewAccount, ProfileChanges, Student};
use crate::errors::{AppError, AppResult};
use crate::infra::unit_of_work::run_in_transaction;

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Account repository trait for dependency injection.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait AccountRepository: Send + Sync {
    /// Find account by ID
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Account>>;

    /// Find account by exact username
    async fn find_by_username(&self, username: &str) -> AppResult<Option<Account>>;

    /// Find account by email (case-insensitive)
    async fn find_by_email(&self, email: &str) -> AppResult<Option<Account>>;

    /// Check whether a username is in use
    async fn username_exists(&self, username: &str) -> AppResult<bool>;

    /// Check whether an email is in use by an account other than `except`
    async fn email_exists(&self, email: &str, except: Option<Uuid>) -> AppResult<bool>;

    /// Insert an account.
    ///
    /// Student accounts get a provisioned student record in the same
    /// transaction; `profile` replaces the provisioned values when given.
    async fn create(&self, account: NewAccount, profile: Option<ProfileChanges>) -> AppResult<Account>;

    /// Replace the password hash
    async fn set_password(&self, id: Uuid, password_hash: String) -> AppResult<()>;

    /// Stamp the last successful login
    async fn record_login(&self, id: Uuid) -> AppResult<()>;
}

/// Concrete implementation of AccountRepository
pub struct AccountStore {
    db: DatabaseConnection,
}

impl AccountStore {
    /// Create new repository instance
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

/// Insert an account and, for students, its record.
async fn insert_account<C>(
    conn: &C,
    account: NewAccount,
    profile: Option<ProfileChanges>,
) -> AppResult<Account>
where
    C: ConnectionTrait,
{
    let now = Utc::now();
    let role = account.role;
    let model = ActiveModel {
        id: Set(Uuid::new_v4()),
        username: Set(account.username),
        email: Set(account.email.to_lowercase()),
        first_name: Set(account.first_name),
        last_name: Set(account.last_name),
        password_hash: Set(account.password_hash),
        role: Set(role.as_str().to_string()),
        is_active: Set(true),
        last_login_at: Set(None),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(conn)
    .await
    .map_err(|e| AppError::from_db(e, "Account"))?;

    if role == AccountRole::Student {
        let mut student = Student::provision(model.id);
        if let Some(changes) = profile {
            student.profile = changes.profile;
            student.is_draft = changes.is_draft;
        }
        StudentActiveModel::from_student(&student)
            .insert(conn)
            .await
            .map_err(|e| AppError::from_db(e, "Student"))?;
        tracing::debug!(account_id = %model.id, student_id = %student.id, "Student record provisioned");
    }

    Ok(Account::from(model))
}

#[async_trait]
impl AccountRepository for AccountStore {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Account>> {
        let result = AccountEntity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(AppError::from)?;

        Ok(result.map(Account::from))
    }

    async fn find_by_username(&self, username: &str) -> AppResult<Option<Account>> {
        let result = AccountEntity::find()
            .filter(account::Column::Username.eq(username))
            .one(&self.db)
            .await
            .map_err(AppError::from)?;

        Ok(result.map(Account::from))
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<Account>> {
        let result = AccountEntity::find()
            .filter(account::Column::Email.eq(email.trim().to_lowercase()))
            .one(&self.db)
            .await
            .map_err(AppError::from)?;

        Ok(result.map(Account::from))
    }

    async fn username_exists(&self, username: &str) -> AppResult<bool> {
        let count = AccountEntity::find()
            .filter(account::Column::Username.eq(username))
            .count(&self.db)
            .await?;
        Ok(count > 0)
    }

    async fn email_exists(&self, email: &str, except: Option<Uuid>) -> AppResult<bool> {
        let mut query =
            AccountEntity::find().filter(account::Column::Email.eq(email.trim().to_lowercase()));
        if let Some(id) = except {
            query = query.filter(account::Column::Id.ne(id));
        }
        Ok(query.count(&self.db).await? > 0)
    }

    async fn create(&self, account: NewAccount, profile: Option<ProfileChanges>) -> AppResult<Account> {
        run_in_transaction(&self.db, move |txn| {
            Box::pin(async move { insert_account(txn, account, profile).await })
        })
        .await
    }

    async fn set_password(&self, id: Uuid, password_hash: String) -> AppResult<()> {
        let model = AccountEntity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(AppError::NotFound)?;

        let mut active: ActiveModel = model.into();
        active.password_hash = Set(password_hash);
        active.updated_at = Set(Utc::now());
        active.update(&self.db).await.map_err(AppError::from)?;
        Ok(())
    }

    async fn record_login(&self, id: Uuid) -> AppResult<()> {
        AccountEntity::update_many()
            .col_expr(
                account::Column::LastLoginAt,
                sea_orm::sea_query::Expr::value(Some(Utc::now())),
            )
            .filter(account::Column::Id.eq(id))
            .exec(&self.db)
            .await
            .map_err(AppError::from)?;
        Ok(())
    }
}
