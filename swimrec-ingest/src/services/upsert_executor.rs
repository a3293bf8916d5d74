//! Upsert executor
//!
//! Applies reconciliation plans against storage.
//!
//! **Race protocol:**
//! 1. Look up the slot and plan against what was read
//! 2. Insert hitting the UNIQUE constraint, or a guarded update whose guards
//!    no longer hold, means another writer moved first: re-read and re-plan
//! 3. At most `max_insert_attempts` rounds, then `IngestError::Conflict`
//!
//! Every storage call goes through `retry_on_transient`.

use serde_json::Map;
use sqlx::SqlitePool;
use tracing::{debug, warn};

use super::reconciler::{plan, ReconcilePlan};
use crate::config::SourcePriorities;
use crate::db::records::{self, InsertOutcome};
use crate::error::{IngestError, IngestResult};
use crate::models::{CanonicalKey, CanonicalRecord, Decision, NormalizedCandidate, ReconcileOutcome};
use crate::utils::retry_on_transient;
use swimrec_common::time::now_rfc3339;

/// Result of applying one plan
enum Applied {
    Done(ReconcileOutcome),
    /// Storage moved underneath the plan
    Stale,
}

pub struct UpsertExecutor {
    db: SqlitePool,
    priorities: SourcePriorities,
    max_insert_attempts: u32,
    max_lock_wait_ms: u64,
}

impl UpsertExecutor {
    pub fn new(
        db: SqlitePool,
        priorities: SourcePriorities,
        max_insert_attempts: u32,
        max_lock_wait_ms: u64,
    ) -> Self {
        Self {
            db,
            priorities,
            max_insert_attempts: max_insert_attempts.max(1),
            max_lock_wait_ms,
        }
    }

    /// Reconcile `candidate` into the slot for `key`
    pub async fn execute(
        &self,
        key: &CanonicalKey,
        candidate: &NormalizedCandidate,
    ) -> IngestResult<ReconcileOutcome> {
        let existing = self.load(key).await?;
        self.execute_from(key, candidate, existing).await
    }

    /// Reconcile starting from an already-read snapshot of the slot.
    ///
    /// The snapshot may be stale; a lost race falls back to a fresh read.
    pub async fn execute_from(
        &self,
        key: &CanonicalKey,
        candidate: &NormalizedCandidate,
        mut existing: Option<CanonicalRecord>,
    ) -> IngestResult<ReconcileOutcome> {
        for attempt in 1..=self.max_insert_attempts {
            let now = now_rfc3339();
            let planned = plan(existing.as_ref(), key, candidate, &self.priorities, &now);

            match self.apply(key, planned, &now).await? {
                Applied::Done(mut outcome) => {
                    outcome.attempts = attempt;
                    return Ok(outcome);
                }
                Applied::Stale => {
                    warn!(
                        key = %key,
                        source = candidate.source_name(),
                        attempt,
                        max_attempts = self.max_insert_attempts,
                        "Concurrent write on canonical key, re-reading"
                    );
                    existing = self.load(key).await?;
                }
            }
        }

        tracing::error!(
            key = %key,
            source = candidate.source_name(),
            attempts = self.max_insert_attempts,
            "Canonical key still contended after max attempts"
        );
        Err(IngestError::Conflict {
            attempts: self.max_insert_attempts,
        })
    }

    async fn load(&self, key: &CanonicalKey) -> IngestResult<Option<CanonicalRecord>> {
        let record = retry_on_transient("load canonical record", self.max_lock_wait_ms, || {
            records::load_by_key(&self.db, key)
        })
        .await?;
        Ok(record)
    }

    async fn apply(
        &self,
        key: &CanonicalKey,
        planned: ReconcilePlan,
        now: &str,
    ) -> IngestResult<Applied> {
        match planned {
            ReconcilePlan::Insert { record, reason } => {
                let outcome =
                    retry_on_transient("insert canonical record", self.max_lock_wait_ms, || {
                        records::insert_record(&self.db, &record)
                    })
                    .await?;

                match outcome {
                    InsertOutcome::Inserted => {
                        debug!(key = %key, id = %record.id, "Canonical record inserted");
                        Ok(Applied::Done(ReconcileOutcome {
                            decision: Decision::Insert,
                            record_id: Some(record.id),
                            before: Map::new(),
                            after: record.snapshot(),
                            reason,
                            attempts: 1,
                        }))
                    }
                    InsertOutcome::Conflict => Ok(Applied::Stale),
                }
            }
            ReconcilePlan::Update {
                record_id,
                decision,
                update,
                before,
                after,
                reason,
            } => {
                let written =
                    retry_on_transient("update canonical record", self.max_lock_wait_ms, || {
                        records::apply_update(&self.db, record_id, &update, now)
                    })
                    .await?;

                if !written {
                    return Ok(Applied::Stale);
                }
                debug!(
                    key = %key,
                    id = %record_id,
                    decision = %decision,
                    "Canonical record updated"
                );
                Ok(Applied::Done(ReconcileOutcome {
                    decision,
                    record_id: Some(record_id),
                    before,
                    after,
                    reason,
                    attempts: 1,
                }))
            }
            ReconcilePlan::NoChange {
                record_id,
                decision,
                reason,
            } => Ok(Applied::Done(ReconcileOutcome {
                decision,
                record_id: Some(record_id),
                before: Map::new(),
                after: Map::new(),
                reason,
                attempts: 1,
            })),
        }
    }
}
