// src/common/migrations.rs
//! Database schema management

use sqlx::SqlitePool;
use tracing::{info, warn};

/// Create the donations schema, optionally dropping it first.
///
/// The CHECK constraints repeat every field rule of the validator so the
/// table rejects bad rows even when a caller skips validation.
pub async fn run_migrations(pool: &SqlitePool, reset_db: bool) -> Result<(), sqlx::Error> {
    if reset_db {
        warn!("RESET_DB=true - dropping donation tables and recreating schema");
        drop_all_tables(pool).await?;
    } else {
        info!("Skipping table drop (RESET_DB not set). Tables will be created if they don't exist.");
    }

    create_donation_tables(pool).await?;
    create_indexes(pool).await?;

    info!("Database migration completed");

    Ok(())
}

async fn drop_all_tables(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    sqlx::query("DROP TABLE IF EXISTS donations")
        .execute(pool)
        .await?;
    Ok(())
}

async fn create_donation_tables(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    // AUTOINCREMENT keeps deleted ids from ever being handed out again
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS donations (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            donor_name TEXT NOT NULL
                CHECK (length(trim(donor_name)) BETWEEN 2 AND 100),
            donation_type TEXT NOT NULL
                CHECK (donation_type IN ('money', 'food', 'clothing', 'toys', 'books', 'household', 'other')),
            quantity REAL NOT NULL
                CHECK (typeof(quantity) IN ('real', 'integer') AND quantity > 0 AND quantity <= 1000000),
            date TEXT NOT NULL
                CHECK (date IS date(julianday(date))),
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            CHECK (created_at <= updated_at)
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_indexes(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    let indexes = vec![
        "CREATE INDEX IF NOT EXISTS idx_donations_date ON donations(date)",
        "CREATE INDEX IF NOT EXISTS idx_donations_type ON donations(donation_type)",
        "CREATE INDEX IF NOT EXISTS idx_donations_created_at ON donations(created_at)",
    ];

    for index in indexes {
        sqlx::query(index).execute(pool).await?;
    }

    Ok(())
}
