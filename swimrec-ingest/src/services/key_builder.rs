//! Canonical key assembly
//!
//! Fails closed: a key is only built when every component is present.

use crate::error::{IngestError, IngestResult};
use crate::models::record::is_blank;
use crate::models::{CanonicalKey, NormalizedCandidate};

/// Build the canonical key of `candidate`.
///
/// Gender, pool, stroke and event kind are typed and always present on a normalized
/// candidate; category, distance, record type and record scope are checked
/// here, in that order. The first missing one is named in the error.
pub fn build_key(candidate: &NormalizedCandidate) -> IngestResult<CanonicalKey> {
    if is_blank(&candidate.category) {
        return Err(IngestError::Key { field: "category" });
    }
    if candidate.distance_m == 0 {
        return Err(IngestError::Key {
            field: "distance_m",
        });
    }
    if is_blank(&candidate.record_type) {
        return Err(IngestError::Key {
            field: "record_type",
        });
    }
    if is_blank(&candidate.record_scope) {
        return Err(IngestError::Key {
            field: "record_scope",
        });
    }

    Ok(CanonicalKey {
        gender: candidate.gender,
        category: candidate.category.trim().to_string(),
        pool: candidate.pool,
        stroke: candidate.stroke,
        kind: candidate.kind,
        distance_m: candidate.distance_m,
        record_type: candidate.record_type.trim().to_string(),
        record_scope: candidate.record_scope.trim().to_string(),
    })
}
