//! Schema migrations
//!
//! SQL files live in this crate's `migrations/` directory and are applied with
//! the sqlx migrator, which records them in `_sqlx_migrations` and serializes
//! concurrent runners with an advisory lock.

use std::path::PathBuf;

use sqlx::migrate::{MigrateError, Migrator};
use sqlx::PgPool;
use tracing::info;

/// Directory holding the migration files. `MIGRATIONS_DIR` overrides the
/// in-tree location for deployments that ship the files elsewhere.
fn migrations_dir() -> PathBuf {
    std::env::var_os("MIGRATIONS_DIR")
        .map_or_else(|| PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("migrations"), PathBuf::from)
}

/// Apply every pending migration
pub async fn run_migrations(pool: &PgPool) -> Result<(), MigrateError> {
    let dir = migrations_dir();
    let migrator = Migrator::new(dir.as_path()).await?;
    info!(dir = %dir.display(), count = migrator.iter().count(), "Applying migrations");
    migrator.run(pool).await
}
