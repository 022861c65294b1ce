//! Small helpers shared by services.

pub mod csv;
pub mod slug;
pub mod templates;

pub use csv::CsvWriter;
pub use slug::{slugify, username_base, username_candidates};
pub use templates::{credentials_email, password_reset_email};
