//! # migtrack-db
//!
//! Database layer implementing repository traits with PostgreSQL via SQLx.
//!
//! ## Overview
//!
//! This crate provides PostgreSQL implementations for all repository traits
//! defined in `migtrack-core`. It handles:
//!
//! - Connection pool management and schema migrations
//! - Database models with SQLx `FromRow` derives
//! - Model → entity mappers
//! - Repository implementations, each audited write in a single transaction
//!
//! ## Usage
//!
//! ```rust,ignore
//! use migtrack_db::pool::{create_pool, run_migrations, DatabaseConfig};
//! use migtrack_db::repositories::PgApplicationRepository;
//! use migtrack_core::traits::ApplicationRepository;
//!
//! async fn example() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = DatabaseConfig::from_env();
//!     let pool = create_pool(&config).await?;
//!     run_migrations(&pool).await?;
//!     let application_repo = PgApplicationRepository::new(pool);
//!
//!     // Use the repository...
//!     Ok(())
//! }
//! ```

pub mod mappers;
pub mod models;
pub mod pool;
pub mod repositories;

// Re-export commonly used types
pub use pool::{create_pool, create_pool_from_env, run_migrations, DatabaseConfig, PgPool};
pub use repositories::{
    PgAnnouncementRepository, PgApplicationRepository, PgAuditLogRepository,
    PgNotificationRepository, PgQueryRepository, PgSubTaskRepository,
    PgTaskAssignmentRepository, PgUserRepository,
};
