//! Error types for swimrec-ingest
//!
//! Per-candidate failures are isolated: everything except `StorageUnavailable`
//! ends as a Skip, Rejected or Error decision for that one candidate.

use thiserror::Error;

use crate::models::Decision;

/// Which context dimension could not be resolved
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContextDimension {
    Gender,
    Pool,
}

impl ContextDimension {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContextDimension::Gender => "gender",
            ContextDimension::Pool => "pool",
        }
    }
}

/// Ingest error taxonomy
#[derive(Debug, Error)]
pub enum IngestError {
    /// Time text unrecognized
    #[error("Unparsable time: {raw:?}")]
    TimeParse { raw: String },

    /// Event text unrecognized
    #[error("Unrecognized event: {raw:?}")]
    EventParse { raw: String },

    /// Gender or pool unresolved after every inference step
    #[error("Ambiguous {} context for event {raw_event:?}", dimension.as_str())]
    AmbiguousContext {
        dimension: ContextDimension,
        raw_event: String,
    },

    /// Mandatory canonical key field missing
    #[error("Missing canonical key field: {field}")]
    Key { field: &'static str },

    /// Insert kept losing the uniqueness race
    #[error("Insert conflict unresolved after {attempts} attempts")]
    Conflict { attempts: u32 },

    /// Storage failure for one candidate (after retries)
    #[error("Persistence failure: {0}")]
    Persistence(#[from] swimrec_common::Error),

    /// Storage unreachable; aborts the run
    #[error("Storage unavailable: {0}")]
    StorageUnavailable(String),
}

impl IngestError {
    /// Decision recorded for a candidate that failed with this error
    pub fn decision(&self) -> Decision {
        match self {
            IngestError::TimeParse { .. }
            | IngestError::EventParse { .. }
            | IngestError::AmbiguousContext { .. } => Decision::Skip,
            IngestError::Key { .. } => Decision::Rejected,
            IngestError::Conflict { .. }
            | IngestError::Persistence(_)
            | IngestError::StorageUnavailable(_) => Decision::Error,
        }
    }

    /// Stable code for audit rows
    pub fn code(&self) -> &'static str {
        match self {
            IngestError::TimeParse { .. } | IngestError::EventParse { .. } => "PARSE_ERROR",
            IngestError::AmbiguousContext { .. } => "AMBIGUOUS_CONTEXT",
            IngestError::Key { .. } => "KEY_ERROR",
            IngestError::Conflict { .. } => "CONFLICT_ERROR",
            IngestError::Persistence(_) => "PERSISTENCE_ERROR",
            IngestError::StorageUnavailable(_) => "STORAGE_UNAVAILABLE",
        }
    }

    /// True when the whole run must stop
    pub fn is_fatal(&self) -> bool {
        match self {
            IngestError::StorageUnavailable(_) => true,
            IngestError::Persistence(err) => err.is_fatal(),
            _ => false,
        }
    }
}

/// Result type for ingest operations
pub type IngestResult<T> = Result<T, IngestError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decision_mapping() {
        let parse = IngestError::TimeParse {
            raw: "abc".to_string(),
        };
        assert_eq!(parse.decision(), Decision::Skip);
        assert_eq!(parse.code(), "PARSE_ERROR");

        let key = IngestError::Key { field: "category" };
        assert_eq!(key.decision(), Decision::Rejected);
        assert_eq!(key.to_string(), "Missing canonical key field: category");

        let conflict = IngestError::Conflict { attempts: 3 };
        assert_eq!(conflict.decision(), Decision::Error);
        assert!(!conflict.is_fatal());
    }

    #[test]
    fn test_ambiguous_message_names_dimension() {
        let err = IngestError::AmbiguousContext {
            dimension: ContextDimension::Gender,
            raw_event: "50 Free".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Ambiguous gender context for event \"50 Free\""
        );
    }

    #[test]
    fn test_pool_closed_is_fatal() {
        let err = IngestError::Persistence(swimrec_common::Error::Database(
            sqlx::Error::PoolClosed,
        ));
        assert!(err.is_fatal());
        assert!(IngestError::StorageUnavailable("down".to_string()).is_fatal());
    }
}
