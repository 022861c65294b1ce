//! API layer - HTTP handlers and middleware
//!
//! Public auth routes, the student self-service routes and the staff
//! student routes, plus Swagger UI and health probes.

pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod openapi;
pub mod routes;
pub mod state;

pub use openapi::ApiDoc;
pub use routes::create_router;
pub use state::AppState;
