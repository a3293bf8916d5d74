//! Canonical record persistence
//!
//! Writes are guarded in SQL against the snapshot they were planned from: an
//! update lands whole or not at all. Fills only land on blank columns and a
//! time only lands when it is faster than the stored one.

use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use swimrec_common::{Error, Result};
use uuid::Uuid;

use crate::models::{CanonicalKey, CanonicalRecord, RecordField};

const RECORD_COLUMNS: &str = r#"
    id, gender, category, pool, stroke, event_kind, distance_m, record_type, record_scope,
    time_ms, time_clock, time_source,
    athlete_name, athlete_country, record_date, competition_name, competition_location,
    source_name, source_url, source_note, is_active, last_updated
"#;

/// Result of an insert attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    Inserted,
    /// Another writer already holds the canonical key
    Conflict,
}

/// New time for a guarded update
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeWrite {
    pub time_ms: i64,
    pub time_clock: String,
    pub time_source: String,
}

/// Partial update of one canonical record.
///
/// `expected_time_ms` and `expected_time_source` hold the stored time and its
/// source as they were when the update was planned. If either has moved the
/// whole update is refused.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordUpdate {
    pub expected_time_ms: Option<i64>,
    pub expected_time_source: String,
    pub time: Option<TimeWrite>,
    pub fills: Vec<(RecordField, String)>,
}

impl RecordUpdate {
    /// Empty update planned against `existing`
    pub fn against(existing: &CanonicalRecord) -> Self {
        Self {
            expected_time_ms: existing.time_ms,
            expected_time_source: existing.time_source.clone(),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.time.is_none() && self.fills.is_empty()
    }
}

/// SQL predicate matching blank-like column values
fn blank_predicate(column: &str) -> String {
    format!(
        "(TRIM(COALESCE({col}, '')) IN ('', '-', '—', '–', '?') \
         OR LOWER(TRIM({col})) IN ('null', 'none', 'n/a'))",
        col = column
    )
}

fn row_to_record(row: &SqliteRow) -> Result<CanonicalRecord> {
    let id: String = row.get("id");
    let gender: String = row.get("gender");
    let pool: String = row.get("pool");
    let stroke: String = row.get("stroke");
    let kind: String = row.get("event_kind");
    let distance_m: i64 = row.get("distance_m");
    let is_active: i64 = row.get("is_active");

    Ok(CanonicalRecord {
        id: Uuid::parse_str(&id)
            .map_err(|e| Error::Internal(format!("Invalid record id {:?}: {}", id, e)))?,
        key: CanonicalKey {
            gender: gender.parse()?,
            category: row.get("category"),
            pool: pool.parse()?,
            stroke: stroke.parse()?,
            kind: kind.parse()?,
            distance_m: u32::try_from(distance_m)
                .map_err(|_| Error::Internal(format!("Invalid distance {}", distance_m)))?,
            record_type: row.get("record_type"),
            record_scope: row.get("record_scope"),
        },
        time_ms: row.get("time_ms"),
        time_clock: row.get("time_clock"),
        time_source: row.get("time_source"),
        athlete_name: row.get("athlete_name"),
        athlete_country: row.get("athlete_country"),
        record_date: row.get("record_date"),
        competition_name: row.get("competition_name"),
        competition_location: row.get("competition_location"),
        source_name: row.get("source_name"),
        source_url: row.get("source_url"),
        source_note: row.get("source_note"),
        last_updated: row.get("last_updated"),
        is_active: is_active != 0,
    })
}

/// Load the record holding `key`
pub async fn load_by_key(pool: &SqlitePool, key: &CanonicalKey) -> Result<Option<CanonicalRecord>> {
    let sql = format!(
        r#"
        SELECT {}
        FROM canonical_records
        WHERE gender = ? AND category = ? AND pool = ? AND stroke = ? AND event_kind = ?
          AND distance_m = ? AND record_type = ? AND record_scope = ?
        "#,
        RECORD_COLUMNS
    );

    let row = sqlx::query(&sql)
        .bind(key.gender.as_str())
        .bind(&key.category)
        .bind(key.pool.as_str())
        .bind(key.stroke.as_str())
        .bind(key.kind.as_str())
        .bind(i64::from(key.distance_m))
        .bind(&key.record_type)
        .bind(&key.record_scope)
        .fetch_optional(pool)
        .await?;

    row.as_ref().map(row_to_record).transpose()
}

/// Load a record by id
pub async fn load_by_id(pool: &SqlitePool, id: Uuid) -> Result<Option<CanonicalRecord>> {
    let sql = format!("SELECT {} FROM canonical_records WHERE id = ?", RECORD_COLUMNS);
    let row = sqlx::query(&sql)
        .bind(id.to_string())
        .fetch_optional(pool)
        .await?;

    row.as_ref().map(row_to_record).transpose()
}

/// All records in key order
pub async fn list_records(pool: &SqlitePool) -> Result<Vec<CanonicalRecord>> {
    let sql = format!(
        "SELECT {} FROM canonical_records \
         ORDER BY gender, category, pool, stroke, event_kind, distance_m, record_type, record_scope",
        RECORD_COLUMNS
    );
    let rows = sqlx::query(&sql).fetch_all(pool).await?;
    rows.iter().map(row_to_record).collect()
}

pub async fn count_records(pool: &SqlitePool) -> Result<i64> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM canonical_records")
        .fetch_one(pool)
        .await?;
    Ok(count)
}

/// Insert a new record. A UNIQUE violation on the canonical key is reported as
/// `InsertOutcome::Conflict`, not as an error.
pub async fn insert_record(pool: &SqlitePool, record: &CanonicalRecord) -> Result<InsertOutcome> {
    let result = sqlx::query(
        r#"
        INSERT INTO canonical_records (
            id, gender, category, pool, stroke, event_kind, distance_m, record_type, record_scope,
            time_ms, time_clock, time_source,
            athlete_name, athlete_country, record_date, competition_name, competition_location,
            source_name, source_url, source_note, is_active, created_at, last_updated
        ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(record.id.to_string())
    .bind(record.key.gender.as_str())
    .bind(&record.key.category)
    .bind(record.key.pool.as_str())
    .bind(record.key.stroke.as_str())
    .bind(record.key.kind.as_str())
    .bind(i64::from(record.key.distance_m))
    .bind(&record.key.record_type)
    .bind(&record.key.record_scope)
    .bind(record.time_ms)
    .bind(&record.time_clock)
    .bind(&record.time_source)
    .bind(&record.athlete_name)
    .bind(&record.athlete_country)
    .bind(&record.record_date)
    .bind(&record.competition_name)
    .bind(&record.competition_location)
    .bind(&record.source_name)
    .bind(&record.source_url)
    .bind(&record.source_note)
    .bind(record.is_active)
    .bind(&record.last_updated)
    .bind(&record.last_updated)
    .execute(pool)
    .await;

    match result {
        Ok(_) => Ok(InsertOutcome::Inserted),
        Err(e) => {
            let err = Error::from(e);
            if err.is_unique_violation() {
                tracing::debug!(key = %record.key, "Insert hit UNIQUE constraint");
                Ok(InsertOutcome::Conflict)
            } else {
                Err(err)
            }
        }
    }
}

/// Apply a guarded partial update, all or nothing.
///
/// Every guard must hold: the stored time and time source still match the
/// snapshot, a new time is still faster and every filled column is still
/// blank. Returns false when any guard failed, in which case nothing was
/// written and the caller should re-read and re-plan.
pub async fn apply_update(
    pool: &SqlitePool,
    id: Uuid,
    update: &RecordUpdate,
    now: &str,
) -> Result<bool> {
    if update.is_empty() {
        return Ok(false);
    }

    let mut assignments: Vec<String> = Vec::new();
    let mut guards: Vec<String> = vec![
        "time_ms IS ?".to_string(),
        "time_source IS ?".to_string(),
    ];

    if update.time.is_some() {
        for column in ["time_ms", "time_clock", "time_source"] {
            assignments.push(format!("{} = ?", column));
        }
        guards.push("(time_ms IS NULL OR ? < time_ms)".to_string());
    }

    for (field, _) in &update.fills {
        assignments.push(format!("{} = ?", field.column()));
        guards.push(blank_predicate(field.column()));
    }

    let sql = format!(
        "UPDATE canonical_records SET {}, last_updated = ? WHERE id = ? AND {}",
        assignments.join(", "),
        guards.join(" AND ")
    );

    let mut query = sqlx::query(&sql);
    if let Some(time) = &update.time {
        query = query
            .bind(time.time_ms)
            .bind(&time.time_clock)
            .bind(&time.time_source);
    }
    for (_, value) in &update.fills {
        query = query.bind(value);
    }
    query = query
        .bind(now)
        .bind(id.to_string())
        .bind(update.expected_time_ms)
        .bind(&update.expected_time_source);
    if let Some(time) = &update.time {
        query = query.bind(time.time_ms);
    }

    let result = query.execute(pool).await?;
    Ok(result.rows_affected() > 0)
}
