//! Ingest pipeline: one run from raw candidates to a run summary
//!
//! Candidate → normalize → key → dedup → reconcile/upsert → audit.
//!
//! Candidates are processed sequentially. Per-candidate failures end as Skip,
//! Rejected or Error and the run continues; storage becoming unreachable
//! aborts the run.

use sqlx::SqlitePool;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use super::audit_logger::AuditLogger;
use super::batch_dedup::BatchDeduplicator;
use super::key_builder::build_key;
use super::upsert_executor::UpsertExecutor;
use crate::config::IngestConfig;
use crate::db;
use crate::error::{IngestError, IngestResult};
use crate::models::{CandidateRecord, CanonicalKey, Confidence, Decision, RunContext, RunSummary};
use crate::parsing::CandidateNormalizer;

pub struct IngestPipeline {
    db: SqlitePool,
    normalizer: CandidateNormalizer,
    executor: UpsertExecutor,
    audit: AuditLogger,
    max_error_samples: usize,
}

impl IngestPipeline {
    pub fn new(db: SqlitePool, config: &IngestConfig) -> Self {
        Self {
            executor: UpsertExecutor::new(
                db.clone(),
                config.priorities.clone(),
                config.max_insert_attempts,
                config.max_lock_wait_ms,
            ),
            audit: AuditLogger::new(db.clone(), config.max_lock_wait_ms),
            normalizer: CandidateNormalizer::new(),
            max_error_samples: config.max_error_samples,
            db,
        }
    }

    /// Run to completion
    pub async fn run(&self, candidates: Vec<CandidateRecord>) -> IngestResult<RunSummary> {
        self.run_with_cancel(candidates, &CancellationToken::new())
            .await
    }

    /// Run until done or until `cancel` fires (checked between candidates)
    pub async fn run_with_cancel(
        &self,
        candidates: Vec<CandidateRecord>,
        cancel: &CancellationToken,
    ) -> IngestResult<RunSummary> {
        let mut ctx = RunContext::new(self.max_error_samples);
        info!(
            run_id = %ctx.run_id(),
            candidates = candidates.len(),
            "Ingest run started"
        );

        if let Err(e) = db::preflight(&self.db).await {
            error!(run_id = %ctx.run_id(), error = %e, "Storage preflight failed, aborting run");
            return Err(IngestError::StorageUnavailable(e.to_string()));
        }

        ctx.record_seen(candidates.len());
        let normalized = self.normalizer.normalize_batch(candidates);
        let mut dedup = BatchDeduplicator::new();

        for item in normalized {
            if cancel.is_cancelled() {
                warn!(run_id = %ctx.run_id(), "Ingest run cancelled");
                ctx.mark_aborted();
                break;
            }

            let candidate = match item {
                Ok(candidate) => candidate,
                Err(failure) => {
                    let decision = failure.error.decision();
                    let reason = format!(
                        "{} [{}]",
                        failure.error,
                        failure.candidate.describe()
                    );
                    debug!(decision = %decision, reason = %reason, "Candidate not normalized");
                    self.finish_failure(
                        &mut ctx,
                        None,
                        &failure.candidate.source_name,
                        decision,
                        reason,
                        failure.confidence,
                    )
                    .await;
                    ctx.record_confidence(failure.confidence);
                    continue;
                }
            };

            let confidence = candidate.confidence();
            ctx.record_confidence(confidence);

            let key = match build_key(&candidate) {
                Ok(key) => key,
                Err(e) => {
                    let reason = format!("{} [{}]", e, candidate.raw.describe());
                    self.finish_failure(
                        &mut ctx,
                        None,
                        candidate.source_name(),
                        e.decision(),
                        reason,
                        confidence,
                    )
                    .await;
                    continue;
                }
            };

            if !dedup.claim(&key, candidate.source_name()) {
                ctx.record_duplicate();
                continue;
            }

            match self.executor.execute(&key, &candidate).await {
                Ok(outcome) => {
                    debug!(
                        key = %key,
                        source = candidate.source_name(),
                        decision = %outcome.decision,
                        attempts = outcome.attempts,
                        reason = %outcome.reason,
                        "Candidate reconciled"
                    );
                    ctx.record_decision(outcome.decision);
                    self.audit
                        .log_outcome(&mut ctx, &key, candidate.source_name(), &outcome, confidence)
                        .await;
                }
                Err(e) if e.is_fatal() => {
                    error!(
                        run_id = %ctx.run_id(),
                        key = %key,
                        error = %e,
                        "Storage lost, aborting run"
                    );
                    return Err(IngestError::StorageUnavailable(e.to_string()));
                }
                Err(e) => {
                    error!(
                        key = %key,
                        source = candidate.source_name(),
                        error = %e,
                        "Candidate failed"
                    );
                    let reason = format!("{} [{}]", e, candidate.raw.describe());
                    self.finish_failure(
                        &mut ctx,
                        Some(&key),
                        candidate.source_name(),
                        e.decision(),
                        reason,
                        confidence,
                    )
                    .await;
                }
            }
        }

        let summary = ctx.finish();
        info!(
            run_id = %summary.run_id,
            aborted = summary.aborted,
            "Ingest run finished: {}",
            summary.display_string()
        );
        Ok(summary)
    }

    /// Count, sample and audit a candidate that ends without touching storage
    async fn finish_failure(
        &self,
        ctx: &mut RunContext,
        key: Option<&CanonicalKey>,
        source_name: &str,
        decision: Decision,
        reason: String,
        confidence: Confidence,
    ) {
        ctx.record_decision(decision);
        if matches!(decision, Decision::Rejected | Decision::Error) {
            ctx.record_error_sample(reason.clone());
        }
        self.audit
            .log_failure(ctx, key, source_name, decision, reason, confidence)
            .await;
    }
}
