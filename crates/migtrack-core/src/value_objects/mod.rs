//! Value objects - immutable types that represent domain concepts

mod pagination;
mod role;
mod text_enum;

pub use pagination::{total_pages, Page, PageRequest, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};
pub use role::UserRole;
pub use text_enum::ParseEnumError;

pub(crate) use text_enum::text_enum;
