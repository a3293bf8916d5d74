//! Data models for swimrec-ingest
//!
//! Typed shapes that flow through one ingest run: scraped candidates, their
//! normalized form, canonical records, decisions and the run summary.

pub mod candidate;
pub mod decision;
pub mod normalized;
pub mod record;
pub mod resolution;
pub mod run_summary;
pub mod swim;

pub use candidate::{parse_candidates, CandidateRecord, TableRef};
pub use decision::{Decision, ReconcileOutcome};
pub use normalized::NormalizedCandidate;
pub use record::{CanonicalKey, CanonicalRecord, RecordField};
pub use resolution::{Confidence, ContextVia, Resolution};
pub use run_summary::{RunContext, RunSummary};
pub use swim::{EventKind, Gender, PoolCourse, Stroke};
