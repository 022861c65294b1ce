//! Service container - centralized service access.

use std::sync::Arc;

use super::{AuthService, Authenticator, StudentManager, StudentService};
use crate::config::Config;
use crate::infra::Persistence;
use crate::jobs::Mailer;

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Service container trait for dependency injection.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
pub trait ServiceContainer: Send + Sync {
    /// Get authentication service
    fn auth(&self) -> Arc<dyn AuthService>;

    /// Get student record service
    fn students(&self) -> Arc<dyn StudentService>;
}

/// Concrete implementation of ServiceContainer
#[derive(Clone)]
pub struct Services {
    auth_service: Arc<dyn AuthService>,
    student_service: Arc<dyn StudentService>,
}

impl Services {
    /// Create a container from already built services
    pub fn new(auth_service: Arc<dyn AuthService>, student_service: Arc<dyn StudentService>) -> Self {
        Self {
            auth_service,
            student_service,
        }
    }

    /// Wire every service over one database connection and mailer
    pub fn from_connection(
        db: sea_orm::DatabaseConnection,
        mailer: Arc<dyn Mailer>,
        config: Config,
    ) -> Self {
        let uow = Arc::new(Persistence::new(db));
        let auth_service = Arc::new(Authenticator::new(uow.clone(), mailer.clone(), config.clone()));
        let student_service = Arc::new(StudentManager::new(uow, mailer, config));

        Self {
            auth_service,
            student_service,
        }
    }
}

impl ServiceContainer for Services {
    fn auth(&self) -> Arc<dyn AuthService> {
        self.auth_service.clone()
    }

    fn students(&self) -> Arc<dyn StudentService> {
        self.student_service.clone()
    }
}
