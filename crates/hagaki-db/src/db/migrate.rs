//! Embedded SQL migrations.

use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("../../migrations");

/// ## Summary
/// Runs all pending migrations over a short-lived synchronous connection.
///
/// Invoked once at startup, before the async pool is created.
///
/// ## Errors
/// Returns an error if the connection or any migration fails.
#[tracing::instrument(skip(database_url))]
pub fn run_migrations(database_url: &str) -> anyhow::Result<()> {
    use diesel::Connection;

    let mut conn = diesel::PgConnection::establish(database_url)?;

    let applied = conn
        .run_pending_migrations(MIGRATIONS)
        .map_err(|e| anyhow::anyhow!("migration failed: {e}"))?;

    if applied.is_empty() {
        tracing::debug!("No pending migrations");
    } else {
        tracing::info!(count = applied.len(), "Applied migrations");
    }

    Ok(())
}
