//! Authentication handlers.

use axum::{
    extract::{Extension, State},
    http::StatusCode,
    response::Json,
    routing::post,
    Router,
};

use crate::api::extractors::{JsonBody, ValidatedJson};
use crate::api::middleware::CurrentUser;
use crate::api::AppState;
use crate::domain::{
    AccountResponse, LoginRequest, PasswordResetConfirm, PasswordResetRequest, RegisterAccount,
};
use crate::errors::AppResult;
use crate::services::{Portal, TokenResponse};
use crate::types::MessageResponse;

/// Public authentication routes
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/staff/login", post(staff_login))
        .route("/password-reset", post(request_password_reset))
        .route("/password-reset/confirm", post(confirm_password_reset))
}

/// Routes that need a session
pub fn session_routes() -> Router<AppState> {
    Router::new().route("/logout", post(logout))
}

/// Register a student account
#[utoipa::path(
    post,
    path = "/auth/register",
    tag = "Authentication",
    request_body = RegisterAccount,
    responses(
        (status = 201, description = "Account registered and profile provisioned", body = AccountResponse),
        (status = 400, description = "Validation error"),
        (status = 409, description = "Username or email already in use")
    )
)]
pub async fn register(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<RegisterAccount>,
) -> AppResult<(StatusCode, Json<AccountResponse>)> {
    let account = state.auth_service.register(payload).await?;
    Ok((StatusCode::CREATED, Json(AccountResponse::from(account))))
}

/// Sign in on the student portal
#[utoipa::path(
    post,
    path = "/auth/login",
    tag = "Authentication",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = TokenResponse),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Invalid credentials")
    )
)]
pub async fn login(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<LoginRequest>,
) -> AppResult<Json<TokenResponse>> {
    let token = state
        .auth_service
        .login(payload.username, payload.password, Portal::Student)
        .await?;
    Ok(Json(token))
}

/// Sign in on the staff portal
#[utoipa::path(
    post,
    path = "/auth/staff/login",
    tag = "Authentication",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = TokenResponse),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Invalid credentials or not a staff account")
    )
)]
pub async fn staff_login(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<LoginRequest>,
) -> AppResult<Json<TokenResponse>> {
    let token = state
        .auth_service
        .login(payload.username, payload.password, Portal::Staff)
        .await?;
    Ok(Json(token))
}

/// Revoke the current session token
#[utoipa::path(
    post,
    path = "/auth/logout",
    tag = "Authentication",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Signed out", body = MessageResponse),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn logout(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
) -> AppResult<Json<MessageResponse>> {
    state
        .cache
        .revoke_session(&current_user.jti.to_string(), current_user.remaining_seconds())
        .await?;

    tracing::info!(account_id = %current_user.id, "Signed out");
    Ok(Json(MessageResponse::new("Signed out")))
}

/// Ask for a password reset link
#[utoipa::path(
    post,
    path = "/auth/password-reset",
    tag = "Authentication",
    request_body = PasswordResetRequest,
    responses(
        (status = 202, description = "Reset link sent if the address is registered", body = MessageResponse),
        (status = 400, description = "Validation error")
    )
)]
pub async fn request_password_reset(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<PasswordResetRequest>,
) -> AppResult<(StatusCode, Json<MessageResponse>)> {
    state.auth_service.request_password_reset(payload.email).await?;
    Ok((
        StatusCode::ACCEPTED,
        Json(MessageResponse::new(
            "If an account exists for this email, a reset link has been sent.",
        )),
    ))
}

/// Choose a new password with a reset link token
#[utoipa::path(
    post,
    path = "/auth/password-reset/confirm",
    tag = "Authentication",
    request_body = PasswordResetConfirm,
    responses(
        (status = 200, description = "Password changed", body = MessageResponse),
        (status = 400, description = "Invalid fields, or invalid, expired or used link")
    )
)]
pub async fn confirm_password_reset(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<PasswordResetConfirm>,
) -> AppResult<Json<MessageResponse>> {
    state.auth_service.confirm_password_reset(payload).await?;
    Ok(Json(MessageResponse::new("Your password has been changed.")))
}
