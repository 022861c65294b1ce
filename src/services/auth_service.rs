//! Authentication service - accounts, sessions and password resets.
//!
//! Session tokens and reset tokens are both HS256 JWTs signed with the
//! configured secret, but carry disjoint claim sets so neither decodes as
//! the other. A reset token embeds a keyed fingerprint of the password hash
//! it was issued against and stops validating once the password changes.

use async_trait::async_trait;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::config::{Config, ROLE_STAFF, SECONDS_PER_HOUR, TOKEN_PURPOSE_PASSWORD_RESET, TOKEN_TYPE_BEARER};
use crate::domain::{
    Account, AccountRole, NewAccount, Password, PasswordResetConfirm, RegisterAccount,
};
use crate::errors::{AppError, AppResult};
use crate::infra::UnitOfWork;
use crate::jobs::Mailer;
use crate::utils::password_reset_email;

/// Verified against when the username is unknown, so both paths hash.
static DUMMY_HASH: Lazy<Password> = Lazy::new(|| {
    Password::new("not-a-real-password")
        .unwrap_or_else(|_| Password::from_hash(String::new()))
});

/// Which login page a sign-in came through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Portal {
    Student,
    Staff,
}

/// JWT claims payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub username: String,
    pub role: String,
    /// Token id, revoked on logout
    pub jti: Uuid,
    pub exp: i64,
    pub iat: i64,
}

impl Claims {
    pub fn is_staff(&self) -> bool {
        self.role == ROLE_STAFF
    }

    /// Seconds until the token expires (zero once expired).
    pub fn remaining_seconds(&self) -> u64 {
        (self.exp - Utc::now().timestamp()).max(0) as u64
    }
}

/// Claims of a password reset link
#[derive(Debug, Serialize, Deserialize)]
struct ResetClaims {
    sub: Uuid,
    purpose: String,
    fp: String,
    exp: i64,
    iat: i64,
}

/// Token response returned after successful authentication
#[derive(Debug, Serialize, ToSchema)]
pub struct TokenResponse {
    /// JWT access token
    #[schema(example = "eyJhbGciOiJIUzI1NiIsInR5cCI6IkpXVCJ9...")]
    pub access_token: String,
    /// Token type (always "Bearer")
    #[schema(example = "Bearer")]
    pub token_type: String,
    /// Token expiration time in seconds
    #[schema(example = 86400)]
    pub expires_in: i64,
    /// `student` or `staff`
    #[schema(example = "student")]
    pub role: String,
}

/// Authentication service trait for dependency injection.
#[async_trait]
pub trait AuthService: Send + Sync {
    /// Self-register a student account; its profile is provisioned alongside.
    async fn register(&self, input: RegisterAccount) -> AppResult<Account>;

    /// Check credentials on the given portal and issue a session token
    async fn login(&self, username: String, password: String, portal: Portal) -> AppResult<TokenResponse>;

    /// Verify JWT token and extract claims
    fn verify_token(&self, token: &str) -> AppResult<Claims>;

    /// Email a reset link when an active account has this address.
    ///
    /// Succeeds whether or not the address is known.
    async fn request_password_reset(&self, email: String) -> AppResult<()>;

    /// Set a new password using a reset link token
    async fn confirm_password_reset(&self, input: PasswordResetConfirm) -> AppResult<()>;
}

/// Generate JWT token for an account
fn generate_token(account: &Account, config: &Config) -> AppResult<TokenResponse> {
    let now = Utc::now();
    let expires_at = now + Duration::hours(config.jwt_expiration_hours);

    let claims = Claims {
        sub: account.id,
        username: account.username.clone(),
        role: account.role.to_string(),
        jti: Uuid::new_v4(),
        exp: expires_at.timestamp(),
        iat: now.timestamp(),
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.jwt_secret_bytes()),
    )?;

    Ok(TokenResponse {
        access_token: token,
        token_type: TOKEN_TYPE_BEARER.to_string(),
        expires_in: config.jwt_expiration_hours * SECONDS_PER_HOUR,
        role: account.role.to_string(),
    })
}

fn verify_token_internal(token: &str, config: &Config) -> AppResult<Claims> {
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.jwt_secret_bytes()),
        &Validation::default(),
    )?;

    Ok(token_data.claims)
}

fn generate_reset_token(account: &Account, config: &Config) -> AppResult<String> {
    let now = Utc::now();
    let claims = ResetClaims {
        sub: account.id,
        purpose: TOKEN_PURPOSE_PASSWORD_RESET.to_string(),
        fp: Password::from_hash(account.password_hash.clone()).fingerprint(config.jwt_secret_bytes())?,
        exp: (now + Duration::minutes(config.password_reset_ttl_minutes)).timestamp(),
        iat: now.timestamp(),
    };

    Ok(encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.jwt_secret_bytes()),
    )?)
}

fn decode_reset_token(token: &str, config: &Config) -> AppResult<ResetClaims> {
    let claims = decode::<ResetClaims>(
        token,
        &DecodingKey::from_secret(config.jwt_secret_bytes()),
        &Validation::default(),
    )
    .map_err(|_| AppError::InvalidResetToken)?
    .claims;

    if claims.purpose != TOKEN_PURPOSE_PASSWORD_RESET {
        return Err(AppError::InvalidResetToken);
    }
    Ok(claims)
}

/// Concrete implementation of AuthService using Unit of Work.
pub struct Authenticator<U: UnitOfWork> {
    uow: Arc<U>,
    mailer: Arc<dyn Mailer>,
    config: Config,
}

impl<U: UnitOfWork> Authenticator<U> {
    pub fn new(uow: Arc<U>, mailer: Arc<dyn Mailer>, config: Config) -> Self {
        Self { uow, mailer, config }
    }
}

#[async_trait]
impl<U: UnitOfWork> AuthService for Authenticator<U> {
    async fn register(&self, input: RegisterAccount) -> AppResult<Account> {
        let input = input.clean()?;
        Password::check_pair(&input.password1, &input.password2, "password1", "password2")?;

        let username = input.username;
        let email = input.email;

        let accounts = self.uow.accounts();
        if accounts.username_exists(&username).await? {
            return Err(AppError::conflict("Username"));
        }
        if accounts.email_exists(&email, None).await? {
            return Err(AppError::conflict("Email"));
        }

        let password_hash = Password::new(&input.password1)?.into_string();
        let account = accounts
            .create(
                NewAccount {
                    username,
                    email,
                    first_name: input.first_name,
                    last_name: input.last_name,
                    password_hash,
                    role: AccountRole::Student,
                },
                None,
            )
            .await?;

        tracing::info!(account_id = %account.id, username = %account.username, "Student registered");
        Ok(account)
    }

    async fn login(&self, username: String, password: String, portal: Portal) -> AppResult<TokenResponse> {
        let account = self.uow.accounts().find_by_username(username.trim()).await?;

        let password_valid = match &account {
            Some(account) => Password::from_hash(account.password_hash.clone()).verify(&password),
            None => {
                DUMMY_HASH.verify(&password);
                false
            }
        };

        let account = match account {
            Some(account) if password_valid && account.is_active => account,
            _ => {
                tracing::warn!(username = %username, ?portal, "Failed login attempt");
                return Err(AppError::InvalidCredentials);
            }
        };

        if portal == Portal::Staff && !account.is_staff() {
            tracing::warn!(account_id = %account.id, "Non-staff login on staff portal");
            return Err(AppError::InvalidCredentials);
        }

        self.uow.accounts().record_login(account.id).await?;
        tracing::info!(account_id = %account.id, role = %account.role, "Login succeeded");

        generate_token(&account, &self.config)
    }

    fn verify_token(&self, token: &str) -> AppResult<Claims> {
        verify_token_internal(token, &self.config)
    }

    async fn request_password_reset(&self, email: String) -> AppResult<()> {
        let account = match self.uow.accounts().find_by_email(&email).await? {
            Some(account) if account.is_active => account,
            _ => {
                tracing::debug!("Password reset requested for unknown address");
                return Ok(());
            }
        };

        let token = generate_reset_token(&account, &self.config)?;
        let message = password_reset_email(
            &account.email,
            &account.full_name(),
            &self.config.password_reset_url(&token),
            self.config.password_reset_ttl_minutes,
        );

        if let Err(e) = self.mailer.send(message).await {
            tracing::error!(account_id = %account.id, error = %e, "Failed to queue password reset email");
        } else {
            tracing::info!(account_id = %account.id, "Password reset email queued");
        }
        Ok(())
    }

    async fn confirm_password_reset(&self, input: PasswordResetConfirm) -> AppResult<()> {
        Password::check_pair(
            &input.new_password1,
            &input.new_password2,
            "new_password1",
            "new_password2",
        )?;

        let claims = decode_reset_token(&input.token, &self.config)?;
        let account = match self.uow.accounts().find_by_id(claims.sub).await? {
            Some(account) if account.is_active => account,
            _ => return Err(AppError::InvalidResetToken),
        };

        // Used links no longer match the stored hash.
        if !Password::from_hash(account.password_hash.clone())
            .matches_fingerprint(self.config.jwt_secret_bytes(), &claims.fp)
        {
            return Err(AppError::InvalidResetToken);
        }

        let password_hash = Password::new(&input.new_password1)?.into_string();
        self.uow.accounts().set_password(account.id, password_hash).await?;

        tracing::info!(account_id = %account.id, "Password reset completed");
        Ok(())
    }
}
