//! # SWIMREC Common Library
//!
//! Shared code for the swimrec workspace:
//! - Common error type
//! - TOML configuration loading and root folder resolution
//! - Clock text formatting for swim times
//! - Timestamp helpers

pub mod clock;
pub mod config;
pub mod error;
pub mod time;

pub use clock::format_clock;
pub use error::{Error, Result};
