//! Test Helper Utilities
//!
//! Shared setup for swimrec-ingest integration tests

#![allow(dead_code)]

use anyhow::Result;
use sqlx::SqlitePool;
use std::collections::HashMap;
use tempfile::TempDir;

use swimrec_ingest::config::SourcePriorities;
use swimrec_ingest::models::{CandidateRecord, TableRef};
use swimrec_ingest::IngestConfig;

/// Create a temporary on-disk database with tables created
///
/// Returns (TempDir, SqlitePool) - TempDir must be kept alive for duration of test
pub async fn create_test_db() -> Result<(TempDir, SqlitePool)> {
    let temp_dir = TempDir::new()?;
    let db_path = temp_dir.path().join("swimrec.db");
    let pool = swimrec_ingest::db::init_database_pool(&db_path).await?;
    Ok((temp_dir, pool))
}

/// Config with "Official" ranked above "Aggregator"
pub fn test_config() -> IngestConfig {
    let mut ranks = HashMap::new();
    ranks.insert("Official".to_string(), 10);
    ranks.insert("Aggregator".to_string(), 1);

    IngestConfig {
        max_lock_wait_ms: 500,
        priorities: SourcePriorities::new(&ranks, 5),
        ..IngestConfig::default()
    }
}

/// Fully-resolved national-record candidate for the men's LCM 50 free slot
pub fn candidate(source: &str, raw_time: &str) -> CandidateRecord {
    CandidateRecord {
        source_name: source.to_string(),
        source_url: format!("https://{}.example/records", source.to_lowercase()),
        raw_event: "Men 50m Freestyle".to_string(),
        raw_time: raw_time.to_string(),
        pool_hint: Some("LCM".to_string()),
        record_scope: "Argentina".to_string(),
        record_type: "NR".to_string(),
        category: "Open".to_string(),
        ..Default::default()
    }
}

pub fn with_athlete(mut candidate: CandidateRecord, name: &str) -> CandidateRecord {
    candidate.athlete_name_raw = name.to_string();
    candidate
}

/// Row from a table with no gender signal of its own
pub fn table_row(page: &str, index: u32, raw_event: &str, raw_time: &str) -> CandidateRecord {
    CandidateRecord {
        source_name: "Official".to_string(),
        raw_event: raw_event.to_string(),
        raw_time: raw_time.to_string(),
        pool_hint: Some("LCM".to_string()),
        record_scope: "Sudamericano".to_string(),
        record_type: "CR".to_string(),
        category: "Open".to_string(),
        table: Some(TableRef::new(page, index)),
        ..Default::default()
    }
}
