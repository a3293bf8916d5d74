//! Audit log persistence
//!
//! `audit_log` is append-only; UPDATE and DELETE are rejected by triggers.

use serde::Serialize;
use serde_json::{Map, Value};
use sqlx::{Row, SqlitePool};
use swimrec_common::Result;
use uuid::Uuid;

use crate::models::{Confidence, Decision};

/// One decision to append
#[derive(Debug, Clone, PartialEq)]
pub struct AuditEntry {
    pub run_id: Uuid,
    /// Absent when the candidate never got a key
    pub canonical_key: Option<String>,
    pub decision: Decision,
    pub source_name: String,
    pub before: Map<String, Value>,
    pub after: Map<String, Value>,
    pub reason: String,
    pub confidence: Confidence,
}

/// Stored audit row
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AuditRow {
    pub id: i64,
    pub logged_at: String,
    pub run_id: String,
    pub canonical_key: Option<String>,
    pub decision: String,
    pub source_name: String,
    pub before_values: Value,
    pub after_values: Value,
    pub reason: String,
    pub confidence: String,
}

/// Append one entry; returns its row id
pub async fn insert_entry(pool: &SqlitePool, entry: &AuditEntry, logged_at: &str) -> Result<i64> {
    let before = serde_json::to_string(&entry.before)?;
    let after = serde_json::to_string(&entry.after)?;

    let result = sqlx::query(
        r#"
        INSERT INTO audit_log (
            logged_at, run_id, canonical_key, decision, source_name,
            before_values, after_values, reason, confidence
        ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(logged_at)
    .bind(entry.run_id.to_string())
    .bind(&entry.canonical_key)
    .bind(entry.decision.as_str())
    .bind(&entry.source_name)
    .bind(before)
    .bind(after)
    .bind(&entry.reason)
    .bind(entry.confidence.as_str())
    .execute(pool)
    .await?;

    Ok(result.last_insert_rowid())
}

/// Entries of one run, in insertion order
pub async fn list_entries_for_run(pool: &SqlitePool, run_id: Uuid) -> Result<Vec<AuditRow>> {
    let rows = sqlx::query(
        r#"
        SELECT id, logged_at, run_id, canonical_key, decision, source_name,
               before_values, after_values, reason, confidence
        FROM audit_log
        WHERE run_id = ?
        ORDER BY id
        "#,
    )
    .bind(run_id.to_string())
    .fetch_all(pool)
    .await?;

    rows.iter()
        .map(|row| -> Result<AuditRow> {
            let before: String = row.get("before_values");
            let after: String = row.get("after_values");
            Ok(AuditRow {
                id: row.get("id"),
                logged_at: row.get("logged_at"),
                run_id: row.get("run_id"),
                canonical_key: row.get("canonical_key"),
                decision: row.get("decision"),
                source_name: row.get("source_name"),
                before_values: serde_json::from_str(&before)?,
                after_values: serde_json::from_str(&after)?,
                reason: row.get("reason"),
                confidence: row.get("confidence"),
            })
        })
        .collect()
}

pub async fn count_entries(pool: &SqlitePool) -> Result<i64> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM audit_log")
        .fetch_one(pool)
        .await?;
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init_tables;
    use sqlx::sqlite::SqlitePoolOptions;

    async fn setup_test_db() -> SqlitePool {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        init_tables(&pool).await.unwrap();
        pool
    }

    fn entry(run_id: Uuid) -> AuditEntry {
        let mut after = Map::new();
        after.insert("time_ms".to_string(), Value::from(25_000));
        AuditEntry {
            run_id,
            canonical_key: Some("M/Open/LCM/Freestyle/50/WR/World".to_string()),
            decision: Decision::Insert,
            source_name: "World Aquatics".to_string(),
            before: Map::new(),
            after,
            reason: "new canonical record".to_string(),
            confidence: Confidence::High,
        }
    }

    #[tokio::test]
    async fn test_insert_and_list() {
        let pool = setup_test_db().await;
        let run_id = Uuid::new_v4();

        insert_entry(&pool, &entry(run_id), "2025-01-01T00:00:00.000Z")
            .await
            .unwrap();
        insert_entry(&pool, &entry(Uuid::new_v4()), "2025-01-01T00:00:00.000Z")
            .await
            .unwrap();

        let rows = list_entries_for_run(&pool, run_id).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].decision, "INSERT");
        assert_eq!(rows[0].confidence, "high");
        assert_eq!(rows[0].after_values["time_ms"], 25_000);
        assert_eq!(rows[0].before_values, Value::Object(Map::new()));
    }

    #[tokio::test]
    async fn test_audit_log_is_append_only() {
        let pool = setup_test_db().await;
        insert_entry(&pool, &entry(Uuid::new_v4()), "2025-01-01T00:00:00.000Z")
            .await
            .unwrap();

        let update = sqlx::query("UPDATE audit_log SET reason = 'tampered'")
            .execute(&pool)
            .await;
        assert!(update.is_err());

        let delete = sqlx::query("DELETE FROM audit_log").execute(&pool).await;
        assert!(delete.is_err());

        assert_eq!(count_entries(&pool).await.unwrap(), 1);
    }
}
