//! Shared request/response wrappers.

mod pagination;
mod response;

pub use pagination::{Paginated, PaginationMeta, PaginationParams, StudentPage};
pub use response::{MessageResponse, NoContent};
