//! Login account entity and related types.

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::config::{ROLE_STAFF, ROLE_STUDENT};
use crate::errors::FieldErrors;

/// Letters, digits and `@ . + - _`.
static USERNAME_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[\w.@+-]+$").expect("valid username regex"));

/// Account roles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum AccountRole {
    Student,
    Staff,
}

impl AccountRole {
    /// Check if this role belongs to the staff group
    pub fn is_staff(&self) -> bool {
        matches!(self, AccountRole::Staff)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AccountRole::Student => ROLE_STUDENT,
            AccountRole::Staff => ROLE_STAFF,
        }
    }
}

impl From<&str> for AccountRole {
    fn from(s: &str) -> Self {
        match s {
            ROLE_STAFF => AccountRole::Staff,
            _ => AccountRole::Student,
        }
    }
}

impl std::fmt::Display for AccountRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Login account
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub role: AccountRole,
    pub is_active: bool,
    pub last_login_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Account {
    /// "First Last", falling back to the username when no name is set.
    pub fn full_name(&self) -> String {
        let full = format!("{} {}", self.first_name.trim(), self.last_name.trim());
        let full = full.trim();
        if full.is_empty() {
            self.username.clone()
        } else {
            full.to_string()
        }
    }

    pub fn is_staff(&self) -> bool {
        self.role.is_staff()
    }
}

/// Data needed to insert an account
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub password_hash: String,
    pub role: AccountRole,
}

/// Account fields staff may change while editing a student record
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AccountChanges {
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

impl AccountChanges {
    pub fn is_empty(&self) -> bool {
        self.email.is_none() && self.first_name.is_none() && self.last_name.is_none()
    }

    /// Apply the changes to an in-memory account
    pub fn apply(&self, account: &mut Account) {
        if let Some(email) = &self.email {
            account.email = email.clone();
        }
        if let Some(first_name) = &self.first_name {
            account.first_name = first_name.clone();
        }
        if let Some(last_name) = &self.last_name {
            account.last_name = last_name.clone();
        }
    }
}

/// Self-registration payload
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct RegisterAccount {
    #[schema(example = "budi")]
    #[validate(
        length(min = 1, max = 150, message = "Enter a valid username."),
        regex(path = *USERNAME_REGEX, message = "Enter a valid username.")
    )]
    pub username: String,
    #[schema(example = "budi@example.com")]
    #[validate(email(message = "Enter a valid email address."))]
    pub email: String,
    #[schema(example = "Budi")]
    #[serde(default)]
    #[validate(length(max = 150))]
    pub first_name: String,
    #[schema(example = "Santoso")]
    #[serde(default)]
    #[validate(length(max = 150))]
    pub last_name: String,
    #[schema(example = "SecurePass123!", min_length = 8)]
    #[serde(default)]
    pub password1: String,
    #[schema(example = "SecurePass123!")]
    #[serde(default)]
    pub password2: String,
}

impl RegisterAccount {
    /// Trim the identity fields, lowercase the email and validate the result.
    pub fn clean(self) -> Result<Self, FieldErrors> {
        let cleaned = Self {
            username: self.username.trim().to_string(),
            email: self.email.trim().to_lowercase(),
            first_name: self.first_name.trim().to_string(),
            last_name: self.last_name.trim().to_string(),
            ..self
        };
        cleaned.validate()?;
        Ok(cleaned)
    }
}

/// Login payload
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct LoginRequest {
    #[schema(example = "budi")]
    #[validate(length(min = 1, message = "Field is required."))]
    pub username: String,
    #[schema(example = "SecurePass123!")]
    #[validate(length(min = 1, message = "Field is required."))]
    pub password: String,
}

/// Password reset request payload
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct PasswordResetRequest {
    #[schema(example = "budi@example.com")]
    #[validate(email(message = "Enter a valid email address."))]
    pub email: String,
}

/// Password reset confirmation payload
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct PasswordResetConfirm {
    #[validate(length(min = 1, message = "Field is required."))]
    pub token: String,
    #[schema(min_length = 8)]
    #[serde(default)]
    #[validate(length(max = 128))]
    pub new_password1: String,
    #[serde(default)]
    pub new_password2: String,
}

/// Account as returned to clients
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AccountResponse {
    #[schema(example = "550e8400-e29b-41d4-a716-446655440000")]
    pub id: Uuid,
    #[schema(example = "budi")]
    pub username: String,
    #[schema(example = "budi@example.com")]
    pub email: String,
    #[schema(example = "Budi Santoso")]
    pub full_name: String,
    #[schema(example = "student")]
    pub role: String,
    pub last_login_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl From<Account> for AccountResponse {
    fn from(account: Account) -> Self {
        Self {
            full_name: account.full_name(),
            role: account.role.to_string(),
            id: account.id,
            username: account.username,
            email: account.email,
            last_login_at: account.last_login_at,
            created_at: account.created_at,
        }
    }
}

/// Credentials issued by staff, shown exactly once.
#[derive(Clone, Serialize, ToSchema)]
pub struct IssuedCredentials {
    #[schema(example = "budi")]
    pub username: String,
    #[schema(example = "x7Qp9mKa2!Lr")]
    pub password: String,
}

impl std::fmt::Debug for IssuedCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IssuedCredentials")
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .finish()
    }
}
