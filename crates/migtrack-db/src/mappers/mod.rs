//! Model to entity mappers
//!
//! `From<Model> for Entity` converts database rows to domain objects. Text
//! columns holding enumerations go through [`parse_text`], which falls back to
//! a fixed variant when a row carries a value the domain does not know.

mod announcement;
mod application;
mod audit_log;
mod notification;
mod subtask;
mod task_assignment;
mod user;

use std::str::FromStr;

use tracing::warn;

/// Parse a stored enumeration, logging and substituting `fallback` on failure
pub(crate) fn parse_text<T: FromStr>(column: &'static str, value: &str, fallback: T) -> T {
    value.parse().unwrap_or_else(|_| {
        warn!(column, value, "Unknown stored value, using fallback");
        fallback
    })
}
