//! Route handlers
//!
//! Thin adapters from HTTP to the service layer, grouped by resource.

pub mod announcements;
pub mod applications;
pub mod audit;
pub mod auth;
pub mod dashboard;
pub mod health;
pub mod mcp;
pub mod menu;
pub mod notifications;
pub mod subtasks;
pub mod task_assignments;
pub mod users;
