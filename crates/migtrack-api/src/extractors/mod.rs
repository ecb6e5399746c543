//! Axum extractors for request handling
//!
//! Custom extractors that reject with the standard error body.

mod auth;
mod pagination;
mod path;
mod query;
mod validated;

pub use auth::AuthUser;
pub use pagination::{Pagination, PaginationParams};
pub use path::{IdPath, RecordPath};
pub use query::QueryParams;
pub use validated::ValidatedJson;
