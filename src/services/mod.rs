//! Application services layer - use cases and business logic.
//!
//! Services orchestrate domain rules and infrastructure behind traits so the
//! API layer depends on abstractions. Repository access goes through the
//! Unit of Work.

mod auth_service;
pub mod container;
mod student_service;

pub use container::{ServiceContainer, Services};

pub use auth_service::{AuthService, Authenticator, Claims, Portal, TokenResponse};
pub use student_service::{CreatedStudent, Dashboard, StudentManager, StudentService};

#[cfg(any(test, feature = "test-utils"))]
pub use container::MockServiceContainer;
