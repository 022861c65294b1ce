//! Student self-service handlers.

use axum::{
    extract::{Extension, State},
    response::Json,
    routing::get,
    Router,
};

use crate::api::extractors::JsonBody;
use crate::api::middleware::{require_student, CurrentUser};
use crate::api::AppState;
use crate::domain::{StudentProfileForm, StudentResponse};
use crate::errors::AppResult;
use crate::services::Dashboard;

/// Routes available to any signed-in account
pub fn dashboard_routes() -> Router<AppState> {
    Router::new().route("/", get(dashboard))
}

/// Student profile routes
pub fn profile_routes() -> Router<AppState> {
    Router::new().route("/", get(get_profile).put(update_profile))
}

/// Landing data for the signed-in account
#[utoipa::path(
    get,
    path = "/dashboard",
    tag = "Profile",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Account summary; staff also get head counts", body = Dashboard),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn dashboard(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
) -> AppResult<Json<Dashboard>> {
    Ok(Json(state.student_service.dashboard(current_user.id).await?))
}

/// The signed-in student's record (`null` when none exists)
#[utoipa::path(
    get,
    path = "/profile",
    tag = "Profile",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Student record or null", body = Option<StudentResponse>),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Staff accounts have no profile")
    )
)]
pub async fn get_profile(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
) -> AppResult<Json<Option<StudentResponse>>> {
    require_student(&current_user)?;
    let record = state.student_service.my_profile(current_user.id).await?;
    Ok(Json(record.map(StudentResponse::from)))
}

/// Save the signed-in student's record
#[utoipa::path(
    put,
    path = "/profile",
    tag = "Profile",
    security(("bearer_auth" = [])),
    request_body = StudentProfileForm,
    responses(
        (status = 200, description = "Saved record", body = StudentResponse),
        (status = 400, description = "Invalid fields"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Staff accounts have no profile"),
        (status = 404, description = "No record for this account")
    )
)]
pub async fn update_profile(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    JsonBody(form): JsonBody<StudentProfileForm>,
) -> AppResult<Json<StudentResponse>> {
    require_student(&current_user)?;
    let record = state
        .student_service
        .update_my_profile(current_user.id, form)
        .await?;
    Ok(Json(StudentResponse::from(record)))
}
