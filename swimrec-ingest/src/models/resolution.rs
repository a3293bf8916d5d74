//! Tagged outcome of context inference
//!
//! Gender and pool course may come from the row, a heading, or a weak
//! heuristic. The tag travels with the value into the audit log.

use serde::{Deserialize, Serialize};

/// Where a resolved context value came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContextVia {
    /// Scraper-provided hint or keyword in the row text itself
    Explicit,
    /// Nearest preceding section heading or caption
    Heading,
    /// Probe-time comparison of sibling tables (gender only)
    Probe,
}

impl ContextVia {
    pub fn confidence(&self) -> Confidence {
        match self {
            ContextVia::Explicit | ContextVia::Heading => Confidence::High,
            ContextVia::Probe => Confidence::Low,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ContextVia::Explicit => "explicit",
            ContextVia::Heading => "heading",
            ContextVia::Probe => "probe",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    Low,
    High,
}

impl Confidence {
    pub fn as_str(&self) -> &'static str {
        match self {
            Confidence::Low => "low",
            Confidence::High => "high",
        }
    }
}

/// Result of resolving one context dimension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution<T> {
    Resolved { value: T, via: ContextVia },
    Unresolved,
}

impl<T: Copy> Resolution<T> {
    pub fn explicit(value: T) -> Self {
        Resolution::Resolved {
            value,
            via: ContextVia::Explicit,
        }
    }

    pub fn heading(value: T) -> Self {
        Resolution::Resolved {
            value,
            via: ContextVia::Heading,
        }
    }

    pub fn probe(value: T) -> Self {
        Resolution::Resolved {
            value,
            via: ContextVia::Probe,
        }
    }

    pub fn value(&self) -> Option<T> {
        match self {
            Resolution::Resolved { value, .. } => Some(*value),
            Resolution::Unresolved => None,
        }
    }

    pub fn via(&self) -> Option<ContextVia> {
        match self {
            Resolution::Resolved { via, .. } => Some(*via),
            Resolution::Unresolved => None,
        }
    }

    pub fn is_resolved(&self) -> bool {
        matches!(self, Resolution::Resolved { .. })
    }

    /// Keep `self` when resolved, otherwise evaluate the next signal
    pub fn or_else(self, next: impl FnOnce() -> Resolution<T>) -> Resolution<T> {
        match self {
            Resolution::Resolved { .. } => self,
            Resolution::Unresolved => next(),
        }
    }
}
