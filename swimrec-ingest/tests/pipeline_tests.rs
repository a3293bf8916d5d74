//! Integration tests for the ingest pipeline
//!
//! End-to-end runs against an on-disk database: convergence, idempotence,
//! non-regression, source priority, in-run dedup, probe pairing and the
//! audit trail.

mod helpers;

use helpers::{candidate, create_test_db, table_row, test_config, with_athlete};
use swimrec_ingest::db::{audit, records};
use swimrec_ingest::models::{CanonicalKey, EventKind, Gender, PoolCourse, Stroke};
use swimrec_ingest::{IngestError, IngestPipeline};
use tokio_util::sync::CancellationToken;

fn men_lcm_50_free_nr() -> CanonicalKey {
    CanonicalKey {
        gender: Gender::Men,
        category: "Open".to_string(),
        pool: PoolCourse::Lcm,
        stroke: Stroke::Freestyle,
        kind: EventKind::Individual,
        distance_m: 50,
        record_type: "NR".to_string(),
        record_scope: "Argentina".to_string(),
    }
}

// ============================================================================
// Convergence
// ============================================================================

#[tokio::test]
async fn test_insert_block_fill_then_improve() {
    let (_temp_dir, pool) = create_test_db().await.unwrap();
    let pipeline = IngestPipeline::new(pool.clone(), &test_config());

    // A: empty slot, no athlete
    let a = pipeline.run(vec![candidate("Official", "25.00")]).await.unwrap();
    assert_eq!(a.inserted, 1);

    // B: faster but lower priority, brings an athlete name
    let b = pipeline
        .run(vec![with_athlete(candidate("Aggregator", "24.50"), "Ana Pérez")])
        .await
        .unwrap();
    assert_eq!(b.field_filled, 1);
    assert_eq!(b.time_updated, 0);

    let after_b = records::load_by_key(&pool, &men_lcm_50_free_nr())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(after_b.time_ms, Some(25_000));
    assert_eq!(after_b.time_source, "Official");
    assert_eq!(after_b.athlete_name, "Ana Pérez");

    // C: same source as A, faster
    let c = pipeline.run(vec![candidate("Official", "24.80")]).await.unwrap();
    assert_eq!(c.time_updated, 1);

    let after_c = records::load_by_key(&pool, &men_lcm_50_free_nr())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(after_c.time_ms, Some(24_800));
    assert_eq!(after_c.time_clock, "24.80");
    assert_eq!(after_c.athlete_name, "Ana Pérez");
    assert_eq!(after_c.id, after_b.id);
    assert_eq!(records::count_records(&pool).await.unwrap(), 1);
}

#[tokio::test]
async fn test_rerun_is_idempotent() {
    let (_temp_dir, pool) = create_test_db().await.unwrap();
    let pipeline = IngestPipeline::new(pool.clone(), &test_config());
    let batch = vec![
        with_athlete(candidate("Official", "24.10"), "Someone"),
        table_row("p1", 0, "Men 100 Libre", "48.90"),
    ];

    let first = pipeline.run(batch.clone()).await.unwrap();
    assert_eq!(first.inserted, 2);
    let snapshot = records::list_records(&pool).await.unwrap();

    let second = pipeline.run(batch).await.unwrap();
    assert_eq!(second.inserted, 0);
    assert_eq!(second.unchanged, 2);

    let again = records::list_records(&pool).await.unwrap();
    assert_eq!(again, snapshot);
}

#[tokio::test]
async fn test_slower_time_never_regresses() {
    let (_temp_dir, pool) = create_test_db().await.unwrap();
    let pipeline = IngestPipeline::new(pool.clone(), &test_config());

    pipeline.run(vec![candidate("Aggregator", "24.00")]).await.unwrap();
    let summary = pipeline
        .run(vec![candidate("Official", "1:00.00")])
        .await
        .unwrap();
    assert_eq!(summary.unchanged, 1);

    let stored = records::load_by_key(&pool, &men_lcm_50_free_nr())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.time_ms, Some(24_000));
    assert_eq!(stored.time_source, "Aggregator");
}

#[tokio::test]
async fn test_fill_never_overwrites_populated_field() {
    let (_temp_dir, pool) = create_test_db().await.unwrap();
    let pipeline = IngestPipeline::new(pool.clone(), &test_config());

    pipeline
        .run(vec![with_athlete(candidate("Official", "24.50"), "First Holder")])
        .await
        .unwrap();
    let summary = pipeline
        .run(vec![with_athlete(candidate("Official", "24.40"), "Second Name")])
        .await
        .unwrap();
    assert_eq!(summary.time_updated, 1);

    let stored = records::load_by_key(&pool, &men_lcm_50_free_nr())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.time_ms, Some(24_400));
    assert_eq!(stored.athlete_name, "First Holder");
}

#[tokio::test]
async fn test_lower_priority_alone_is_priority_blocked() {
    let (_temp_dir, pool) = create_test_db().await.unwrap();
    let pipeline = IngestPipeline::new(pool.clone(), &test_config());

    pipeline.run(vec![candidate("Official", "24.50")]).await.unwrap();
    let mut lower = candidate("Aggregator", "24.00");
    lower.source_url = "https://official.example/records".to_string();
    let summary = pipeline.run(vec![lower]).await.unwrap();

    assert_eq!(summary.priority_blocked, 1);
    let stored = records::load_by_key(&pool, &men_lcm_50_free_nr())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.time_ms, Some(24_500));
}

// ============================================================================
// Batch handling
// ============================================================================

#[tokio::test]
async fn test_same_key_in_one_run_first_seen_wins() {
    let (_temp_dir, pool) = create_test_db().await.unwrap();
    let pipeline = IngestPipeline::new(pool.clone(), &test_config());

    let summary = pipeline
        .run(vec![
            candidate("Official", "24.90"),
            candidate("Official", "24.10"),
        ])
        .await
        .unwrap();

    assert_eq!(summary.seen, 2);
    assert_eq!(summary.inserted, 1);
    assert_eq!(summary.deduplicated, 1);

    let stored = records::load_by_key(&pool, &men_lcm_50_free_nr())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.time_ms, Some(24_900));
}

#[tokio::test]
async fn test_relay_and_individual_of_same_distance_are_separate_records() {
    let (_temp_dir, pool) = create_test_db().await.unwrap();
    let pipeline = IngestPipeline::new(pool.clone(), &test_config());

    let mut individual = candidate("Official", "3:40.00");
    individual.raw_event = "Men 400m Freestyle".to_string();
    let mut relay = candidate("Official", "3:10.00");
    relay.raw_event = "Men 4x100m Freestyle Relay".to_string();

    let summary = pipeline
        .run(vec![individual, relay.clone()])
        .await
        .unwrap();
    assert_eq!(summary.inserted, 2);
    assert_eq!(summary.deduplicated, 0);
    assert_eq!(records::list_records(&pool).await.unwrap().len(), 2);

    // A faster relay must only touch the relay slot
    relay.raw_time = "3:09.00".to_string();
    let second = pipeline.run(vec![relay]).await.unwrap();
    assert_eq!(second.time_updated, 1);

    let individual_key = CanonicalKey {
        distance_m: 400,
        ..men_lcm_50_free_nr()
    };
    let stored = records::load_by_key(&pool, &individual_key)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.time_ms, Some(220_000));

    let relay_key = CanonicalKey {
        kind: EventKind::Relay,
        ..individual_key
    };
    let stored = records::load_by_key(&pool, &relay_key)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.time_ms, Some(189_000));
}

#[tokio::test]
async fn test_bad_rows_do_not_stop_the_run() {
    let (_temp_dir, pool) = create_test_db().await.unwrap();
    let pipeline = IngestPipeline::new(pool.clone(), &test_config());

    let mut no_category = candidate("Official", "2:01.00");
    no_category.raw_event = "Men 200m Freestyle".to_string();
    no_category.category = " ".to_string();

    let summary = pipeline
        .run(vec![
            candidate("Official", "NT"),
            candidate("Official", "DQ"),
            no_category,
            candidate("Official", "24.30"),
        ])
        .await
        .unwrap();

    assert_eq!(summary.skipped, 2);
    assert_eq!(summary.rejected, 1);
    assert_eq!(summary.inserted, 1);
    assert_eq!(summary.decided(), 4);
    assert_eq!(summary.error_samples.len(), 1);
    assert!(summary.error_samples[0].contains("category"));
}

#[tokio::test]
async fn test_sibling_tables_paired_by_probe_time() {
    let (_temp_dir, pool) = create_test_db().await.unwrap();
    let pipeline = IngestPipeline::new(pool.clone(), &test_config());

    let summary = pipeline
        .run(vec![
            table_row("page-1", 0, "50 Libre", "24.60"),
            table_row("page-1", 0, "100 Libre", "53.10"),
            table_row("page-1", 1, "50 Libre", "21.90"),
            table_row("page-1", 1, "100 Libre", "47.80"),
        ])
        .await
        .unwrap();

    assert_eq!(summary.inserted, 4);
    assert_eq!(summary.low_confidence, 4);

    let men_key = CanonicalKey {
        gender: Gender::Men,
        category: "Open".to_string(),
        pool: PoolCourse::Lcm,
        stroke: Stroke::Freestyle,
        kind: EventKind::Individual,
        distance_m: 100,
        record_type: "CR".to_string(),
        record_scope: "Sudamericano".to_string(),
    };
    let men = records::load_by_key(&pool, &men_key).await.unwrap().unwrap();
    assert_eq!(men.time_ms, Some(47_800));

    let women_key = CanonicalKey {
        gender: Gender::Women,
        ..men_key
    };
    let women = records::load_by_key(&pool, &women_key).await.unwrap().unwrap();
    assert_eq!(women.time_ms, Some(53_100));
}

#[tokio::test]
async fn test_lone_unlabelled_table_is_skipped_low_confidence() {
    let (_temp_dir, pool) = create_test_db().await.unwrap();
    let pipeline = IngestPipeline::new(pool.clone(), &test_config());

    let summary = pipeline
        .run(vec![table_row("page-2", 0, "50 Libre", "24.60")])
        .await
        .unwrap();
    assert_eq!(summary.skipped, 1);
    assert_eq!(summary.low_confidence, 1);
    assert!(summary.error_samples.is_empty());

    let rows = audit::list_entries_for_run(&pool, summary.run_id).await.unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].decision, "SKIP");
    assert_eq!(rows[0].confidence, "low");
    assert_eq!(rows[0].canonical_key, None);
    assert_eq!(records::count_records(&pool).await.unwrap(), 0);
}

// ============================================================================
// Audit trail
// ============================================================================

#[tokio::test]
async fn test_every_decision_is_audited_with_before_and_after() {
    let (_temp_dir, pool) = create_test_db().await.unwrap();
    let pipeline = IngestPipeline::new(pool.clone(), &test_config());

    pipeline.run(vec![candidate("Official", "25.00")]).await.unwrap();
    let summary = pipeline
        .run(vec![
            candidate("Official", "24.80"),
            candidate("Official", "?"),
        ])
        .await
        .unwrap();

    let rows = audit::list_entries_for_run(&pool, summary.run_id).await.unwrap();
    assert_eq!(rows.len(), 2);

    let update = &rows[0];
    assert_eq!(update.decision, "UPDATE_TIME");
    assert_eq!(
        update.canonical_key.as_deref(),
        Some("M/Open/LCM/Freestyle/50/NR/Argentina")
    );
    assert_eq!(update.before_values["time_ms"], 25_000);
    assert_eq!(update.after_values["time_ms"], 24_800);
    assert_eq!(update.after_values["time_clock"], "24.80");
    assert_eq!(update.confidence, "high");

    assert_eq!(rows[1].decision, "SKIP");
    assert_eq!(summary.audit_failures, 0);
}

// ============================================================================
// Concurrency and lifecycle
// ============================================================================

#[tokio::test]
async fn test_concurrent_runs_converge_on_one_record() {
    let (_temp_dir, pool) = create_test_db().await.unwrap();
    let config = test_config();
    let first = IngestPipeline::new(pool.clone(), &config);
    let second = IngestPipeline::new(pool.clone(), &config);

    let (a, b) = tokio::join!(
        first.run(vec![candidate("Official", "25.00")]),
        second.run(vec![candidate("Official", "24.80")]),
    );
    let (a, b) = (a.unwrap(), b.unwrap());

    assert_eq!(a.inserted + b.inserted, 1);
    assert_eq!(a.errored + b.errored, 0);
    assert_eq!(records::count_records(&pool).await.unwrap(), 1);

    let stored = records::load_by_key(&pool, &men_lcm_50_free_nr())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.time_ms, Some(24_800));
}

#[tokio::test]
async fn test_cancelled_run_reports_aborted() {
    let (_temp_dir, pool) = create_test_db().await.unwrap();
    let pipeline = IngestPipeline::new(pool.clone(), &test_config());

    let cancel = CancellationToken::new();
    cancel.cancel();
    let summary = pipeline
        .run_with_cancel(vec![candidate("Official", "24.00")], &cancel)
        .await
        .unwrap();

    assert!(summary.aborted);
    assert_eq!(summary.seen, 1);
    assert_eq!(summary.decided(), 0);
    assert_eq!(records::count_records(&pool).await.unwrap(), 0);
}

#[tokio::test]
async fn test_closed_storage_aborts_run() {
    let (_temp_dir, pool) = create_test_db().await.unwrap();
    let pipeline = IngestPipeline::new(pool.clone(), &test_config());
    pool.close().await;

    let err = pipeline
        .run(vec![candidate("Official", "24.00")])
        .await
        .unwrap_err();
    assert!(matches!(err, IngestError::StorageUnavailable(_)));
}
