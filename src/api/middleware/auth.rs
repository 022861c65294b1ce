//! JWT authentication middleware.

use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};
use chrono::Utc;
use uuid::Uuid;

use crate::api::AppState;
use crate::config::BEARER_TOKEN_PREFIX;
use crate::domain::AccountRole;
use crate::errors::AppError;
use crate::services::Claims;

/// Authenticated account extracted from the session token
#[derive(Clone, Debug)]
pub struct CurrentUser {
    pub id: Uuid,
    pub username: String,
    pub role: AccountRole,
    /// Session token id
    pub jti: Uuid,
    /// Token expiry (unix seconds)
    pub expires_at: i64,
}

impl CurrentUser {
    pub fn is_staff(&self) -> bool {
        self.role.is_staff()
    }

    /// Seconds until the session token expires.
    pub fn remaining_seconds(&self) -> u64 {
        (self.expires_at - Utc::now().timestamp()).max(0) as u64
    }
}

impl From<Claims> for CurrentUser {
    fn from(claims: Claims) -> Self {
        Self {
            id: claims.sub,
            role: AccountRole::from(claims.role.as_str()),
            username: claims.username,
            jti: claims.jti,
            expires_at: claims.exp,
        }
    }
}

/// JWT authentication middleware.
///
/// Validates the bearer token, rejects tokens revoked by logout and injects
/// the [`CurrentUser`] into the request extensions. When the revocation list
/// cannot be read the request is refused with 503.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = bearer_token(&request).ok_or(AppError::Unauthorized)?;
    let claims = state.auth_service.verify_token(token)?;

    if state.cache.is_session_revoked(&claims.jti.to_string()).await? {
        tracing::debug!(account_id = %claims.sub, "Revoked session token presented");
        return Err(AppError::Unauthorized);
    }

    request.extensions_mut().insert(CurrentUser::from(claims));

    Ok(next.run(request).await)
}

fn bearer_token(request: &Request) -> Option<&str> {
    request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix(BEARER_TOKEN_PREFIX))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

/// Require the staff role, returns Forbidden otherwise.
pub fn require_staff(user: &CurrentUser) -> Result<(), AppError> {
    if user.is_staff() {
        Ok(())
    } else {
        Err(AppError::Forbidden)
    }
}

/// Require a student account, returns Forbidden for staff.
pub fn require_student(user: &CurrentUser) -> Result<(), AppError> {
    if user.role == AccountRole::Student {
        Ok(())
    } else {
        Err(AppError::Forbidden)
    }
}
