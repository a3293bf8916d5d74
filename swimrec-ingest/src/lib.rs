//! swimrec-ingest library interface
//!
//! Converges scraped swim-record candidates into one canonical record per
//! (gender, category, pool, stroke, event kind, distance, record type, scope).

pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod parsing;
pub mod services;
pub mod utils;

pub use crate::config::IngestConfig;
pub use crate::error::{IngestError, IngestResult};
pub use crate::models::{CandidateRecord, RunSummary};
pub use crate::services::IngestPipeline;
