//! Error types shared across crates

mod app_error;

pub use app_error::{domain_status, AppError, AppResult, ErrorResponse};
