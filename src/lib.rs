//! Student records portal
//!
//! Students register, sign in and maintain one profile record each; staff
//! search, edit, export and provision those records.
//!
//! # Architecture Layers
//!
//! - **cli** / **commands**: `serve`, `migrate`, `jobs`, `staff`
//! - **config**: settings and constants
//! - **domain**: accounts, student records, choice fields, form cleaning
//! - **services**: authentication and student record use cases
//! - **infra**: Postgres (SeaORM) and Redis
//! - **jobs**: queued outgoing email
//! - **api**: HTTP handlers, middleware and routes
//! - **types**, **utils**, **errors**: shared helpers
//!
//! # CLI Usage
//!
//! ```bash
//! student-records migrate up
//! student-records staff create --username admin --email admin@example.com --first-name Ada --password '...'
//! student-records serve
//! student-records jobs work
//! ```

pub mod api;
pub mod cli;
pub mod commands;
pub mod config;
pub mod domain;
pub mod errors;
pub mod infra;
pub mod jobs;
pub mod services;
pub mod types;
pub mod utils;

// Re-export commonly used types at crate root
pub use api::AppState;
pub use config::Config;
pub use domain::{Account, AccountRole, Password, StudentRecord};
pub use errors::{AppError, AppResult};
pub use infra::Cache;
