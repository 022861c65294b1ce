//! Staff student management handlers.

use axum::{
    extract::{Extension, Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::api::extractors::JsonBody;
use crate::api::middleware::{require_staff, CurrentUser};
use crate::api::AppState;
use crate::domain::{IssuedCredentials, StaffStudentForm, StudentQuery, StudentResponse};
use crate::errors::AppResult;
use crate::services::CreatedStudent;
use crate::types::{NoContent, PaginationParams, StudentPage};

/// New record with the credentials shown to staff once
#[derive(Debug, Serialize, ToSchema)]
pub struct StudentCreatedResponse {
    pub student: StudentResponse,
    pub credentials: IssuedCredentials,
}

impl From<CreatedStudent> for StudentCreatedResponse {
    fn from(created: CreatedStudent) -> Self {
        Self {
            student: created.record.into(),
            credentials: created.credentials,
        }
    }
}

/// Create staff student routes
pub fn student_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_students).post(create_student))
        .route("/export", get(export_students))
        .route(
            "/:id",
            get(get_student).put(update_student).delete(delete_student),
        )
        .route("/:id/reset-password", post(reset_credentials))
}

/// Search, filter and page through student records
#[utoipa::path(
    get,
    path = "/staff/students",
    tag = "Students",
    security(("bearer_auth" = [])),
    params(StudentQuery, PaginationParams),
    responses(
        (status = 200, description = "Page of student records", body = StudentPage),
        (status = 400, description = "Invalid filter value"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden - Staff only")
    )
)]
pub async fn list_students(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    Query(query): Query<StudentQuery>,
    Query(page): Query<PaginationParams>,
) -> AppResult<Json<StudentPage>> {
    require_staff(&current_user)?;
    Ok(Json(state.student_service.list(query, page).await?))
}

/// Create a student account and record
#[utoipa::path(
    post,
    path = "/staff/students",
    tag = "Students",
    security(("bearer_auth" = [])),
    request_body = StaffStudentForm,
    responses(
        (status = 201, description = "Record created; credentials are shown only here", body = StudentCreatedResponse),
        (status = 400, description = "Invalid or duplicate fields"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden - Staff only")
    )
)]
pub async fn create_student(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    JsonBody(form): JsonBody<StaffStudentForm>,
) -> AppResult<(StatusCode, Json<StudentCreatedResponse>)> {
    require_staff(&current_user)?;
    let created = state.student_service.create(current_user.id, form).await?;
    Ok((StatusCode::CREATED, Json(created.into())))
}

/// Download matching records as CSV
#[utoipa::path(
    get,
    path = "/staff/students/export",
    tag = "Students",
    security(("bearer_auth" = [])),
    params(StudentQuery),
    responses(
        (status = 200, description = "CSV file", content_type = "text/csv", body = String),
        (status = 400, description = "Invalid filter value"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden - Staff only")
    )
)]
pub async fn export_students(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    Query(query): Query<StudentQuery>,
) -> AppResult<Response> {
    require_staff(&current_user)?;
    let csv = state.student_service.export_csv(current_user.id, query).await?;

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8"),
            (header::CONTENT_DISPOSITION, "attachment; filename=\"students.csv\""),
        ],
        csv,
    )
        .into_response())
}

/// Get a student record
#[utoipa::path(
    get,
    path = "/staff/students/{id}",
    tag = "Students",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Student ID")),
    responses(
        (status = 200, description = "Student record", body = StudentResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden - Staff only"),
        (status = 404, description = "Student not found")
    )
)]
pub async fn get_student(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<StudentResponse>> {
    require_staff(&current_user)?;
    let record = state.student_service.get(id).await?;
    Ok(Json(record.into()))
}

/// Edit a student record
#[utoipa::path(
    put,
    path = "/staff/students/{id}",
    tag = "Students",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Student ID")),
    request_body = StaffStudentForm,
    responses(
        (status = 200, description = "Updated record", body = StudentResponse),
        (status = 400, description = "Invalid or duplicate fields"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden - Staff only"),
        (status = 404, description = "Student not found")
    )
)]
pub async fn update_student(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    JsonBody(form): JsonBody<StaffStudentForm>,
) -> AppResult<Json<StudentResponse>> {
    require_staff(&current_user)?;
    let record = state.student_service.update(current_user.id, id, form).await?;
    Ok(Json(record.into()))
}

/// Delete a student record and its account
#[utoipa::path(
    delete,
    path = "/staff/students/{id}",
    tag = "Students",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Student ID")),
    responses(
        (status = 204, description = "Record and account deleted"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden - Staff only"),
        (status = 404, description = "Student not found")
    )
)]
pub async fn delete_student(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<NoContent> {
    require_staff(&current_user)?;
    state.student_service.delete(current_user.id, id).await?;
    Ok(NoContent)
}

/// Issue a new password for the student's account
#[utoipa::path(
    post,
    path = "/staff/students/{id}/reset-password",
    tag = "Students",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Student ID")),
    responses(
        (status = 200, description = "New credentials, shown only here", body = IssuedCredentials),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden - Staff only"),
        (status = 404, description = "Student not found")
    )
)]
pub async fn reset_credentials(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<IssuedCredentials>> {
    require_staff(&current_user)?;
    let credentials = state
        .student_service
        .reset_credentials(current_user.id, id)
        .await?;
    Ok(Json(credentials))
}
