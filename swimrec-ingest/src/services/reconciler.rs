//! Reconciliation decision
//!
//! `plan` is a pure function of (existing record, candidate, priorities). It
//! never touches storage; the upsert executor applies what it returns.
//!
//! **Policy:**
//! - no record → Insert
//! - faster time (or none stored) → write time, unless a lower-priority
//!   source would replace a time set by a higher-priority one
//! - fillable fields are only staged when the stored value is blank and the
//!   candidate's is not
//! - time written → UpdateTime; else fills → FillFields; else blocked →
//!   PriorityBlocked; else Unchanged

use serde_json::{Map, Value};
use uuid::Uuid;

use crate::config::SourcePriorities;
use crate::db::records::{RecordUpdate, TimeWrite};
use crate::models::record::is_blank;
use crate::models::{CanonicalKey, CanonicalRecord, Decision, NormalizedCandidate, RecordField};
use swimrec_common::format_clock;

/// What reconciling one candidate should do
#[derive(Debug, Clone, PartialEq)]
pub enum ReconcilePlan {
    Insert {
        record: CanonicalRecord,
        reason: String,
    },
    Update {
        record_id: Uuid,
        decision: Decision,
        update: RecordUpdate,
        before: Map<String, Value>,
        after: Map<String, Value>,
        reason: String,
    },
    NoChange {
        record_id: Uuid,
        decision: Decision,
        reason: String,
    },
}

impl ReconcilePlan {
    pub fn decision(&self) -> Decision {
        match self {
            ReconcilePlan::Insert { .. } => Decision::Insert,
            ReconcilePlan::Update { decision, .. } | ReconcilePlan::NoChange { decision, .. } => {
                *decision
            }
        }
    }
}

/// Decide what `candidate` does to the slot currently holding `existing`
pub fn plan(
    existing: Option<&CanonicalRecord>,
    key: &CanonicalKey,
    candidate: &NormalizedCandidate,
    priorities: &SourcePriorities,
    now: &str,
) -> ReconcilePlan {
    let Some(existing) = existing else {
        let record = CanonicalRecord::from_candidate(key.clone(), candidate, now);
        return ReconcilePlan::Insert {
            reason: format!("new canonical record at {}", record.time_clock),
            record,
        };
    };

    let mut before = Map::new();
    let mut after = Map::new();
    let mut notes: Vec<String> = Vec::new();

    // Time
    let time_improved = existing
        .time_ms
        .map_or(true, |current| candidate.time_ms < current);

    let candidate_rank = priorities.rank(candidate.source_name());
    let holder_rank = priorities.rank(&existing.time_source);
    let blocked = time_improved && existing.time_ms.is_some() && candidate_rank < holder_rank;

    let time = if time_improved && !blocked {
        let write = TimeWrite {
            time_ms: candidate.time_ms,
            time_clock: format_clock(candidate.time_ms),
            time_source: candidate.source_name().to_string(),
        };
        before.insert("time_ms".to_string(), existing.time_ms.into());
        before.insert("time_clock".to_string(), existing.time_clock.clone().into());
        before.insert("time_source".to_string(), existing.time_source.clone().into());
        after.insert("time_ms".to_string(), write.time_ms.into());
        after.insert("time_clock".to_string(), write.time_clock.clone().into());
        after.insert("time_source".to_string(), write.time_source.clone().into());
        notes.push(match existing.time_ms {
            Some(_) => format!(
                "faster time {} -> {}",
                existing.time_clock, write.time_clock
            ),
            None => format!("time set to {}", write.time_clock),
        });
        Some(write)
    } else {
        None
    };

    // Fill-only-on-empty
    let mut fills = Vec::new();
    for field in RecordField::ALL {
        let current = existing.field(field);
        let offered = candidate.field_value(field);
        if is_blank(current) && !is_blank(offered) {
            before.insert(field.column().to_string(), current.into());
            after.insert(field.column().to_string(), offered.into());
            fills.push((field, offered.to_string()));
        }
    }
    if !fills.is_empty() {
        let columns: Vec<&str> = fills.iter().map(|(f, _)| f.column()).collect();
        notes.push(format!("filled {}", columns.join(", ")));
    }

    if blocked {
        notes.push(format!(
            "faster time {} from {:?} (priority {}) blocked by {:?} (priority {})",
            format_clock(candidate.time_ms),
            candidate.source_name(),
            candidate_rank,
            existing.time_source,
            holder_rank
        ));
    }

    let decision = if time.is_some() {
        Decision::UpdateTime
    } else if !fills.is_empty() {
        Decision::FillFields
    } else if blocked {
        Decision::PriorityBlocked
    } else {
        Decision::Unchanged
    };

    let reason = if notes.is_empty() {
        "no faster time and nothing to fill".to_string()
    } else {
        notes.join("; ")
    };

    match decision {
        Decision::UpdateTime | Decision::FillFields => ReconcilePlan::Update {
            record_id: existing.id,
            decision,
            update: RecordUpdate {
                time,
                fills,
                ..RecordUpdate::against(existing)
            },
            before,
            after,
            reason,
        },
        _ => ReconcilePlan::NoChange {
            record_id: existing.id,
            decision,
            reason,
        },
    }
}
