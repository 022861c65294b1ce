//! OpenAPI documentation configuration.
//!
//! Served through Swagger UI at `/swagger-ui`.

use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::api::handlers::{auth_handler, health_handler, profile_handler, student_handler};
use crate::domain::{
    AccountResponse, AccountRole, DegreeLevel, DiseaseStatus, EducationFunding, Gender,
    IssuedCredentials, LoginRequest, MaritalStatus, PasswordResetConfirm, PasswordResetRequest,
    RegisterAccount, SaveMode, StaffStudentForm, StudentLevel, StudentProfile, StudentProfileForm,
    StudentResponse, StudentStats, StudentSummary,
};
use crate::services::{Dashboard, TokenResponse};
use crate::types::{MessageResponse, PaginationMeta, StudentPage};

/// OpenAPI documentation for the student records portal
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Student Records Portal",
        version = "0.1.0",
        description = "Student self-service profiles and staff record management",
        license(name = "MIT", url = "https://opensource.org/licenses/MIT")
    ),
    servers(
        (url = "http://localhost:3000", description = "Local development server")
    ),
    paths(
        // Health
        health_handler::health,
        health_handler::ready,
        health_handler::alive,
        // Authentication
        auth_handler::register,
        auth_handler::login,
        auth_handler::staff_login,
        auth_handler::logout,
        auth_handler::request_password_reset,
        auth_handler::confirm_password_reset,
        // Student self-service
        profile_handler::dashboard,
        profile_handler::get_profile,
        profile_handler::update_profile,
        // Staff
        student_handler::list_students,
        student_handler::create_student,
        student_handler::export_students,
        student_handler::get_student,
        student_handler::update_student,
        student_handler::delete_student,
        student_handler::reset_credentials,
    ),
    components(
        schemas(
            // Accounts
            AccountRole,
            AccountResponse,
            RegisterAccount,
            LoginRequest,
            PasswordResetRequest,
            PasswordResetConfirm,
            IssuedCredentials,
            TokenResponse,
            // Student records
            Gender,
            MaritalStatus,
            DiseaseStatus,
            DegreeLevel,
            EducationFunding,
            StudentLevel,
            StudentProfile,
            StudentResponse,
            StudentSummary,
            StudentStats,
            SaveMode,
            StudentProfileForm,
            StaffStudentForm,
            Dashboard,
            StudentPage,
            PaginationMeta,
            student_handler::StudentCreatedResponse,
            // Misc
            MessageResponse,
            health_handler::HealthResponse,
            health_handler::ServiceHealth,
            health_handler::ServiceStatus,
            health_handler::ReadinessResponse,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Liveness and dependency checks"),
        (name = "Authentication", description = "Registration, sign-in and password reset"),
        (name = "Profile", description = "Student self-service"),
        (name = "Students", description = "Staff student record management")
    )
)]
pub struct ApiDoc;

/// Security scheme modifier for JWT Bearer authentication
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .description(Some(
                            "JWT obtained from /auth/login or /auth/staff/login",
                        ))
                        .build(),
                ),
            );
        }
    }
}
