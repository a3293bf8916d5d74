//! Reconciliation decisions and per-candidate outcomes

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use uuid::Uuid;

/// Terminal state of one candidate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Decision {
    /// New canonical record created
    Insert,
    /// Faster time written (fills may ride along)
    UpdateTime,
    /// Only empty fields populated
    FillFields,
    /// Nothing to change
    Unchanged,
    /// Faster time from a lower-priority source, nothing else to fill
    PriorityBlocked,
    /// Unparsable or ambiguous input
    Skip,
    /// Missing canonical key field
    Rejected,
    /// Persistence failure after retries
    Error,
}

impl Decision {
    pub fn as_str(&self) -> &'static str {
        match self {
            Decision::Insert => "INSERT",
            Decision::UpdateTime => "UPDATE_TIME",
            Decision::FillFields => "FILL_FIELDS",
            Decision::Unchanged => "UNCHANGED",
            Decision::PriorityBlocked => "PRIORITY_BLOCKED",
            Decision::Skip => "SKIP",
            Decision::Rejected => "REJECTED",
            Decision::Error => "ERROR",
        }
    }

    /// True when the decision wrote to `canonical_records`
    pub fn is_write(&self) -> bool {
        matches!(
            self,
            Decision::Insert | Decision::UpdateTime | Decision::FillFields
        )
    }
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What reconciling one candidate did to storage
#[derive(Debug, Clone, PartialEq)]
pub struct ReconcileOutcome {
    pub decision: Decision,
    pub record_id: Option<Uuid>,
    /// Changed values before the write (empty for inserts)
    pub before: Map<String, Value>,
    /// Changed values after the write
    pub after: Map<String, Value>,
    pub reason: String,
    /// Lookup/insert rounds used (more than one means an insert race was lost)
    pub attempts: u32,
}
