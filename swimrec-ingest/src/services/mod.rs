//! Ingest services
//!
//! Stages applied to each normalized candidate, and the pipeline that drives
//! them over one batch.

pub mod audit_logger;
pub mod batch_dedup;
pub mod key_builder;
pub mod pipeline;
pub mod reconciler;
pub mod upsert_executor;

pub use audit_logger::AuditLogger;
pub use batch_dedup::BatchDeduplicator;
pub use key_builder::build_key;
pub use pipeline::IngestPipeline;
pub use reconciler::{plan, ReconcilePlan};
pub use upsert_executor::UpsertExecutor;
