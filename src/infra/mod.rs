//! Infrastructure layer - External systems integration
//!
//! Postgres (SeaORM repositories, migrations, transactions) and Redis
//! (session revocation, rate limiting).

pub mod cache;
pub mod db;
pub mod repositories;
pub mod unit_of_work;

pub use cache::Cache;
pub use db::{Database, Migrator};
pub use repositories::{AccountRepository, AccountStore, StudentRepository, StudentStore};
pub use unit_of_work::{Persistence, UnitOfWork};

#[cfg(any(test, feature = "test-utils"))]
pub use repositories::{MockAccountRepository, MockStudentRepository};
#[cfg(any(test, feature = "test-utils"))]
pub use unit_of_work::MockUnitOfWork;
