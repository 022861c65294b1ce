//! Application state shared by every handler.

use std::net::IpAddr;
use std::sync::Arc;

use crate::config::Config;
use crate::infra::{Cache, Database};
use crate::jobs::Mailer;
use crate::services::{AuthService, ServiceContainer, Services, StudentService};

/// Application state containing all services.
#[derive(Clone)]
pub struct AppState {
    /// Authentication service
    pub auth_service: Arc<dyn AuthService>,
    /// Student record service
    pub student_service: Arc<dyn StudentService>,
    /// Redis cache (rate limits, revoked sessions)
    pub cache: Arc<Cache>,
    /// Database handle for health and readiness checks
    pub database: Arc<Database>,
    /// Proxies allowed to report the client address
    pub trusted_proxies: Arc<[IpAddr]>,
}

impl AppState {
    /// Wire services over the database connection.
    pub fn from_config(
        database: Arc<Database>,
        cache: Arc<Cache>,
        mailer: Arc<dyn Mailer>,
        config: Config,
    ) -> Self {
        let trusted_proxies = Arc::from(config.trusted_proxies.clone());
        let services = Services::from_connection(database.get_connection(), mailer, config);

        Self {
            auth_service: services.auth(),
            student_service: services.students(),
            cache,
            database,
            trusted_proxies,
        }
    }
}
