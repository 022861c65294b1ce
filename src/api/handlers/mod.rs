//! HTTP request handlers.

pub mod auth_handler;
pub mod health_handler;
pub mod profile_handler;
pub mod student_handler;

pub use auth_handler::{auth_routes, session_routes};
pub use health_handler::health_routes;
pub use profile_handler::{dashboard_routes, profile_routes};
pub use student_handler::student_routes;
