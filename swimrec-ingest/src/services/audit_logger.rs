//! Audit logger
//!
//! Appends one `audit_log` row per terminal decision. A failed audit write is
//! warned and counted; it never fails the candidate or the run.

use serde_json::Map;
use sqlx::SqlitePool;
use tracing::warn;

use crate::db::audit::{self, AuditEntry};
use crate::models::{CanonicalKey, Confidence, Decision, ReconcileOutcome, RunContext};
use crate::utils::retry_on_transient;
use swimrec_common::time::now_rfc3339;

pub struct AuditLogger {
    db: SqlitePool,
    max_lock_wait_ms: u64,
}

impl AuditLogger {
    pub fn new(db: SqlitePool, max_lock_wait_ms: u64) -> Self {
        Self {
            db,
            max_lock_wait_ms,
        }
    }

    /// Append `entry`; failures are counted in `ctx`
    pub async fn log(&self, ctx: &mut RunContext, entry: AuditEntry) {
        let logged_at = now_rfc3339();
        let result = retry_on_transient("append audit entry", self.max_lock_wait_ms, || {
            audit::insert_entry(&self.db, &entry, &logged_at)
        })
        .await;

        if let Err(e) = result {
            warn!(
                run_id = %entry.run_id,
                decision = %entry.decision,
                key = entry.canonical_key.as_deref().unwrap_or("-"),
                error = %e,
                "Audit write failed"
            );
            ctx.record_audit_failure();
        }
    }

    /// Audit a reconciled candidate
    pub async fn log_outcome(
        &self,
        ctx: &mut RunContext,
        key: &CanonicalKey,
        source_name: &str,
        outcome: &ReconcileOutcome,
        confidence: Confidence,
    ) {
        let entry = AuditEntry {
            run_id: ctx.run_id(),
            canonical_key: Some(key.to_string()),
            decision: outcome.decision,
            source_name: source_name.to_string(),
            before: outcome.before.clone(),
            after: outcome.after.clone(),
            reason: outcome.reason.clone(),
            confidence,
        };
        self.log(ctx, entry).await;
    }

    /// Audit a candidate that never reached storage (skip, reject, error)
    pub async fn log_failure(
        &self,
        ctx: &mut RunContext,
        key: Option<&CanonicalKey>,
        source_name: &str,
        decision: Decision,
        reason: String,
        confidence: Confidence,
    ) {
        let entry = AuditEntry {
            run_id: ctx.run_id(),
            canonical_key: key.map(|k| k.to_string()),
            decision,
            source_name: source_name.to_string(),
            before: Map::new(),
            after: Map::new(),
            reason,
            confidence,
        };
        self.log(ctx, entry).await;
    }
}
