//! Database access for swimrec-ingest
//!
//! SQLite store with two tables: `canonical_records` (one row per canonical
//! key) and the append-only `audit_log`.

pub mod audit;
pub mod records;

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;
use swimrec_common::Result;
use tracing::info;

/// SQLite busy timeout per statement; longer contention goes through
/// `retry_on_transient`
const BUSY_TIMEOUT_MS: u64 = 250;

/// Open (creating if needed) the database at `db_path` and ensure tables exist
pub async fn init_database_pool(db_path: &Path) -> Result<SqlitePool> {
    let newly_created = !db_path.exists();

    if let Some(parent) = db_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let db_url = format!("sqlite://{}?mode=rwc", db_path.display());
    tracing::debug!("Connecting to database: {}", db_url);

    let options = SqliteConnectOptions::from_str(&db_url)?
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(Duration::from_millis(BUSY_TIMEOUT_MS));

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .acquire_timeout(Duration::from_secs(5))
        .connect_with(options)
        .await?;

    if newly_created {
        info!("Initialized new database: {}", db_path.display());
    } else {
        info!("Opened existing database: {}", db_path.display());
    }

    init_tables(&pool).await?;

    Ok(pool)
}

/// Create tables, indexes and append-only triggers (idempotent)
pub async fn init_tables(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS canonical_records (
            id TEXT PRIMARY KEY,
            gender TEXT NOT NULL,
            category TEXT NOT NULL,
            pool TEXT NOT NULL,
            stroke TEXT NOT NULL,
            event_kind TEXT NOT NULL,
            distance_m INTEGER NOT NULL,
            record_type TEXT NOT NULL,
            record_scope TEXT NOT NULL,
            time_ms INTEGER,
            time_clock TEXT NOT NULL DEFAULT '',
            time_source TEXT NOT NULL DEFAULT '',
            athlete_name TEXT NOT NULL DEFAULT '',
            athlete_country TEXT NOT NULL DEFAULT '',
            record_date TEXT NOT NULL DEFAULT '',
            competition_name TEXT NOT NULL DEFAULT '',
            competition_location TEXT NOT NULL DEFAULT '',
            source_name TEXT NOT NULL DEFAULT '',
            source_url TEXT NOT NULL DEFAULT '',
            source_note TEXT NOT NULL DEFAULT '',
            is_active INTEGER NOT NULL DEFAULT 1,
            created_at TEXT NOT NULL,
            last_updated TEXT NOT NULL,
            UNIQUE (gender, category, pool, stroke, event_kind, distance_m, record_type, record_scope)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS audit_log (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            logged_at TEXT NOT NULL,
            run_id TEXT NOT NULL,
            canonical_key TEXT,
            decision TEXT NOT NULL,
            source_name TEXT NOT NULL DEFAULT '',
            before_values TEXT NOT NULL DEFAULT '{}',
            after_values TEXT NOT NULL DEFAULT '{}',
            reason TEXT NOT NULL DEFAULT '',
            confidence TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_audit_log_run ON audit_log(run_id)")
        .execute(pool)
        .await?;

    sqlx::query(
        r#"
        CREATE TRIGGER IF NOT EXISTS audit_log_no_update
        BEFORE UPDATE ON audit_log
        BEGIN
            SELECT RAISE(ABORT, 'audit_log is append-only');
        END
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TRIGGER IF NOT EXISTS audit_log_no_delete
        BEFORE DELETE ON audit_log
        BEGIN
            SELECT RAISE(ABORT, 'audit_log is append-only');
        END
        "#,
    )
    .execute(pool)
    .await?;

    tracing::info!("Database tables initialized (canonical_records, audit_log)");

    Ok(())
}

/// Cheap connectivity check run before each ingest run
pub async fn preflight(pool: &SqlitePool) -> Result<()> {
    sqlx::query("SELECT 1").execute(pool).await?;
    Ok(())
}
