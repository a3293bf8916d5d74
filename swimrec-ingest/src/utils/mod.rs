//! Utility modules for swimrec-ingest

pub mod db_retry;

pub use db_retry::retry_on_transient;
