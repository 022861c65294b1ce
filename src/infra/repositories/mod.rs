//! Repository layer - Data access abstraction
//!
//! Repositories hide SeaORM behind traits so services can be tested
//! against mocks or in-memory fakes.

mod account_repository;
pub(crate) mod entities;
mod student_repository;

pub use account_repository::{AccountRepository, AccountStore};
pub use student_repository::{StudentRepository, StudentStore};

// Export mocks for tests (both unit and integration)
#[cfg(any(test, feature = "test-utils"))]
pub use account_repository::MockAccountRepository;
#[cfg(any(test, feature = "test-utils"))]
pub use student_repository::MockStudentRepository;
