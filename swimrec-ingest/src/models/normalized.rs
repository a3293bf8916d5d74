//! Normalized candidate: a candidate with every mandatory dimension resolved

use serde::Serialize;

use super::candidate::CandidateRecord;
use super::record::RecordField;
use super::resolution::{Confidence, ContextVia};
use super::swim::{EventKind, Gender, PoolCourse, Stroke};

/// A candidate that passed time parsing, event classification and context
/// inference. Text fields are whitespace-normalized and blank-like values are
/// already collapsed to empty strings.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NormalizedCandidate {
    /// The raw candidate, kept for audit context
    pub raw: CandidateRecord,
    pub gender: Gender,
    pub gender_via: ContextVia,
    pub pool: PoolCourse,
    pub pool_via: ContextVia,
    pub distance_m: u32,
    pub stroke: Stroke,
    pub kind: EventKind,
    pub time_ms: i64,
    pub category: String,
    pub record_type: String,
    pub record_scope: String,
    pub athlete_name: String,
    pub athlete_country: String,
    /// ISO `YYYY-MM-DD` when recognisable, else empty
    pub record_date: String,
    pub competition_name: String,
    pub competition_location: String,
    pub source_name: String,
    pub source_url: String,
    pub source_note: String,
}

impl NormalizedCandidate {
    pub fn source_name(&self) -> &str {
        &self.source_name
    }

    pub fn field_value(&self, field: RecordField) -> &str {
        match field {
            RecordField::AthleteName => &self.athlete_name,
            RecordField::AthleteCountry => &self.athlete_country,
            RecordField::RecordDate => &self.record_date,
            RecordField::CompetitionName => &self.competition_name,
            RecordField::CompetitionLocation => &self.competition_location,
            RecordField::SourceName => &self.source_name,
            RecordField::SourceUrl => &self.source_url,
            RecordField::SourceNote => &self.source_note,
        }
    }

    /// Lowest confidence across the inferred dimensions
    pub fn confidence(&self) -> Confidence {
        self.gender_via
            .confidence()
            .min(self.pool_via.confidence())
    }
}
