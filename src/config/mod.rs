//! Portal configuration.
//!
//! Environment-driven settings plus the constants shared by validation,
//! provisioning, rate limiting and pagination.

mod constants;
mod settings;

pub use constants::*;
pub use settings::Config;
