//! Application route configuration.

use axum::{
    http::{header, HeaderValue, Method},
    middleware, Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use super::handlers::{
    auth_routes, dashboard_routes, health_routes, profile_routes, session_routes, student_routes,
};
use super::middleware::{auth_middleware, rate_limit_auth_middleware, rate_limit_middleware};
use super::openapi::ApiDoc;
use super::AppState;

/// Create the application router with all routes configured
pub fn create_router(state: AppState, portal_url: &str) -> Router {
    // Sign-in, registration and reset share one strict bucket; logout needs a session
    let auth = auth_routes()
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            rate_limit_auth_middleware,
        ))
        .merge(protected(session_routes(), &state));

    Router::new()
        // Health check endpoints (no rate limiting)
        .merge(health_routes())
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .nest("/auth", auth)
        .nest("/dashboard", protected(dashboard_routes(), &state))
        .nest("/profile", protected(profile_routes(), &state))
        .nest("/staff/students", protected(student_routes(), &state))
        // Global middleware
        .layer(cors_layer(portal_url))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// JWT authentication plus general rate limiting
fn protected(router: Router<AppState>, state: &AppState) -> Router<AppState> {
    router
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            rate_limit_middleware,
        ))
}

/// Browser access is limited to the portal origin.
fn cors_layer(portal_url: &str) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .expose_headers([header::CONTENT_DISPOSITION]);

    match HeaderValue::from_str(portal_url) {
        Ok(origin) => layer.allow_origin(origin),
        Err(_) => {
            tracing::warn!(portal_url, "Portal URL is not a valid origin; CORS disabled");
            layer
        }
    }
}
