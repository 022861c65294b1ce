//! Background jobs.
//!
//! Services hand outgoing email to a [`Mailer`]; the server uses
//! [`QueuedMailer`], which pushes onto the apalis Postgres queue drained by
//! `jobs work`.

mod email_job;

use async_trait::async_trait;
use apalis::prelude::Storage;
use apalis_sql::postgres::PostgresStorage;
use apalis_sql::sqlx::postgres::PgPoolOptions;

use crate::config::Config;
use crate::errors::{AppError, AppResult};

pub use email_job::{email_job_handler, EmailConfig, EmailJob};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Outgoing email seam.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait Mailer: Send + Sync {
    /// Queue an email for delivery.
    async fn send(&self, email: EmailJob) -> AppResult<()>;
}

/// Mailer backed by the apalis job queue.
#[derive(Clone)]
pub struct QueuedMailer {
    storage: PostgresStorage<EmailJob>,
}

impl QueuedMailer {
    pub fn new(storage: PostgresStorage<EmailJob>) -> Self {
        Self { storage }
    }

    /// Open the job store, creating the apalis tables when missing.
    pub async fn connect(config: &Config) -> AppResult<Self> {
        Ok(Self::new(email_storage(config).await?))
    }
}

#[async_trait]
impl Mailer for QueuedMailer {
    async fn send(&self, email: EmailJob) -> AppResult<()> {
        let to = email.to.clone();
        let mut storage = self.storage.clone();
        storage
            .push(email)
            .await
            .map_err(|e| AppError::internal(format!("Failed to queue email: {}", e)))?;

        tracing::debug!(to = %to, "Email queued");
        Ok(())
    }
}

/// Postgres-backed storage for email jobs.
pub async fn email_storage(config: &Config) -> AppResult<PostgresStorage<EmailJob>> {
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&config.database_url)
        .await
        .map_err(|e| AppError::internal(format!("Failed to connect to database: {}", e)))?;

    PostgresStorage::setup(&pool)
        .await
        .map_err(|e| AppError::internal(format!("Failed to setup job storage: {}", e)))?;

    Ok(PostgresStorage::new(pool))
}
