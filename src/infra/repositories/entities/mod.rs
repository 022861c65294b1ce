//! SeaORM entity definitions
//!
//! These are database-specific entities separate from domain models.

pub mod account;
pub mod student;

#[allow(unused_imports)]
pub use account::{ActiveModel as AccountActiveModel, Entity as AccountEntity, Model as AccountModel};
#[allow(unused_imports)]
pub use student::{ActiveModel as StudentActiveModel, Entity as StudentEntity, Model as StudentModel};
