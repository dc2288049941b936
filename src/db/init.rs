//! Database initialization
//!
//! Creates the SQLite database on first run and applies the schema
//! idempotently, so opening an existing database and creating a fresh one
//! go through the same path.

use crate::error::Result;
use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};
use std::path::Path;
use tracing::info;

/// Initialize the database connection pool, creating the file and the
/// cards table if needed.
pub async fn init_database(db_path: &Path) -> Result<SqlitePool> {
    let newly_created = !db_path.exists();

    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let db_url = format!("sqlite://{}?mode=rwc", db_path.display());
    let pool = SqlitePoolOptions::new().max_connections(8).connect(&db_url).await?;

    if newly_created {
        info!("Initialized new database: {}", db_path.display());
    } else {
        info!("Opened existing database: {}", db_path.display());
    }

    // WAL keeps readers live while a worker writes
    sqlx::query("PRAGMA journal_mode = WAL").execute(&pool).await?;
    sqlx::query("PRAGMA busy_timeout = 5000").execute(&pool).await?;

    create_cards_table(&pool).await?;

    Ok(pool)
}

/// In-memory SQLite pool for tests and throwaway embedders
pub async fn init_database_in_memory() -> Result<SqlitePool> {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await?;
    create_cards_table(&pool).await?;
    Ok(pool)
}

async fn create_cards_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS cards (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name_zh TEXT NOT NULL DEFAULT '',
            name_en TEXT NOT NULL DEFAULT '',
            company_name_zh TEXT NOT NULL DEFAULT '',
            company_name_en TEXT NOT NULL DEFAULT '',
            position_zh TEXT NOT NULL DEFAULT '',
            position_en TEXT NOT NULL DEFAULT '',
            position1_zh TEXT NOT NULL DEFAULT '',
            position1_en TEXT NOT NULL DEFAULT '',
            department1_zh TEXT NOT NULL DEFAULT '',
            department1_en TEXT NOT NULL DEFAULT '',
            department2_zh TEXT NOT NULL DEFAULT '',
            department2_en TEXT NOT NULL DEFAULT '',
            department3_zh TEXT NOT NULL DEFAULT '',
            department3_en TEXT NOT NULL DEFAULT '',
            mobile_phone TEXT NOT NULL DEFAULT '',
            company_phone1 TEXT NOT NULL DEFAULT '',
            company_phone2 TEXT NOT NULL DEFAULT '',
            email TEXT NOT NULL DEFAULT '',
            line_id TEXT NOT NULL DEFAULT '',
            company_address1_zh TEXT NOT NULL DEFAULT '',
            company_address1_en TEXT NOT NULL DEFAULT '',
            company_address2_zh TEXT NOT NULL DEFAULT '',
            company_address2_en TEXT NOT NULL DEFAULT '',
            note1 TEXT NOT NULL DEFAULT '',
            note2 TEXT NOT NULL DEFAULT '',
            created_at TEXT NOT NULL DEFAULT '',
            updated_at TEXT NOT NULL DEFAULT '',
            health_status TEXT NOT NULL DEFAULT 'incomplete',
            image_path TEXT NOT NULL DEFAULT ''
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_cards_health_status ON cards(health_status)")
        .execute(pool)
        .await?;

    Ok(())
}
