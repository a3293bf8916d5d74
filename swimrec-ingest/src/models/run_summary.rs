//! Run-level statistics
//!
//! A `RunContext` is owned by one pipeline run and threaded through every
//! stage; `finish` freezes it into the externally visible `RunSummary`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::decision::Decision;
use super::resolution::Confidence;

/// Mutable counters for one run
#[derive(Debug, Clone)]
pub struct RunContext {
    run_id: Uuid,
    started_at: DateTime<Utc>,
    max_error_samples: usize,
    seen: usize,
    inserted: usize,
    time_updated: usize,
    field_filled: usize,
    unchanged: usize,
    priority_blocked: usize,
    skipped: usize,
    rejected: usize,
    deduplicated: usize,
    errored: usize,
    low_confidence: usize,
    audit_failures: usize,
    error_samples: Vec<String>,
    aborted: bool,
}

impl RunContext {
    pub fn new(max_error_samples: usize) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            started_at: Utc::now(),
            max_error_samples,
            seen: 0,
            inserted: 0,
            time_updated: 0,
            field_filled: 0,
            unchanged: 0,
            priority_blocked: 0,
            skipped: 0,
            rejected: 0,
            deduplicated: 0,
            errored: 0,
            low_confidence: 0,
            audit_failures: 0,
            error_samples: Vec::new(),
            aborted: false,
        }
    }

    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    pub fn record_seen(&mut self, count: usize) {
        self.seen += count;
    }

    /// Count one terminal decision
    pub fn record_decision(&mut self, decision: Decision) {
        match decision {
            Decision::Insert => self.inserted += 1,
            Decision::UpdateTime => self.time_updated += 1,
            Decision::FillFields => self.field_filled += 1,
            Decision::Unchanged => self.unchanged += 1,
            Decision::PriorityBlocked => self.priority_blocked += 1,
            Decision::Skip => self.skipped += 1,
            Decision::Rejected => self.rejected += 1,
            Decision::Error => self.errored += 1,
        }
    }

    pub fn record_confidence(&mut self, confidence: Confidence) {
        if confidence == Confidence::Low {
            self.low_confidence += 1;
        }
    }

    pub fn record_duplicate(&mut self) {
        self.deduplicated += 1;
    }

    pub fn record_audit_failure(&mut self) {
        self.audit_failures += 1;
    }

    /// Keep an error message for the summary (capped)
    pub fn record_error_sample(&mut self, message: impl Into<String>) {
        if self.error_samples.len() < self.max_error_samples {
            self.error_samples.push(message.into());
        }
    }

    /// Run stopped before every candidate was processed
    pub fn mark_aborted(&mut self) {
        self.aborted = true;
    }

    /// Freeze into the immutable summary
    pub fn finish(self) -> RunSummary {
        RunSummary {
            run_id: self.run_id,
            started_at: self.started_at,
            finished_at: Utc::now(),
            seen: self.seen,
            inserted: self.inserted,
            time_updated: self.time_updated,
            field_filled: self.field_filled,
            unchanged: self.unchanged,
            priority_blocked: self.priority_blocked,
            skipped: self.skipped,
            rejected: self.rejected,
            deduplicated: self.deduplicated,
            errored: self.errored,
            low_confidence: self.low_confidence,
            audit_failures: self.audit_failures,
            error_samples: self.error_samples,
            aborted: self.aborted,
        }
    }
}

/// Immutable result of one run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub seen: usize,
    pub inserted: usize,
    pub time_updated: usize,
    pub field_filled: usize,
    pub unchanged: usize,
    pub priority_blocked: usize,
    pub skipped: usize,
    pub rejected: usize,
    pub deduplicated: usize,
    pub errored: usize,
    pub low_confidence: usize,
    pub audit_failures: usize,
    pub error_samples: Vec<String>,
    /// Cancelled between candidates
    pub aborted: bool,
}

impl RunSummary {
    /// One-line summary for logs
    pub fn display_string(&self) -> String {
        format!(
            "seen={} inserted={} updated={} filled={} unchanged={} blocked={} skipped={} rejected={} dedup={} errors={}",
            self.seen,
            self.inserted,
            self.time_updated,
            self.field_filled,
            self.unchanged,
            self.priority_blocked,
            self.skipped,
            self.rejected,
            self.deduplicated,
            self.errored
        )
    }

    /// Candidates that reached a terminal decision
    pub fn decided(&self) -> usize {
        self.inserted
            + self.time_updated
            + self.field_filled
            + self.unchanged
            + self.priority_blocked
            + self.skipped
            + self.rejected
            + self.errored
    }
}
