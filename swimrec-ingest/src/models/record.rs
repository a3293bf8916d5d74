//! Canonical record store types
//!
//! One `CanonicalRecord` exists per `CanonicalKey` (UNIQUE constraint in the
//! `canonical_records` table).

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use uuid::Uuid;

use super::normalized::NormalizedCandidate;
use super::swim::{EventKind, Gender, PoolCourse, Stroke};
use swimrec_common::format_clock;

/// Composite identity of a record slot.
///
/// `kind` keeps a relay apart from the individual event of the same total
/// distance (4x100 free relay vs 400 free).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CanonicalKey {
    pub gender: Gender,
    pub category: String,
    pub pool: PoolCourse,
    pub stroke: Stroke,
    pub kind: EventKind,
    pub distance_m: u32,
    pub record_type: String,
    pub record_scope: String,
}

impl fmt::Display for CanonicalKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let relay = match self.kind {
            EventKind::Relay => " Relay",
            EventKind::Individual => "",
        };
        write!(
            f,
            "{}/{}/{}/{}{}/{}/{}/{}",
            self.gender,
            self.category,
            self.pool,
            self.stroke,
            relay,
            self.distance_m,
            self.record_type,
            self.record_scope
        )
    }
}

/// Fillable value fields, governed by fill-only-on-empty
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RecordField {
    AthleteName,
    AthleteCountry,
    RecordDate,
    CompetitionName,
    CompetitionLocation,
    SourceName,
    SourceUrl,
    SourceNote,
}

impl RecordField {
    pub const ALL: [RecordField; 8] = [
        RecordField::AthleteName,
        RecordField::AthleteCountry,
        RecordField::RecordDate,
        RecordField::CompetitionName,
        RecordField::CompetitionLocation,
        RecordField::SourceName,
        RecordField::SourceUrl,
        RecordField::SourceNote,
    ];

    /// Column name in `canonical_records`
    pub fn column(&self) -> &'static str {
        match self {
            RecordField::AthleteName => "athlete_name",
            RecordField::AthleteCountry => "athlete_country",
            RecordField::RecordDate => "record_date",
            RecordField::CompetitionName => "competition_name",
            RecordField::CompetitionLocation => "competition_location",
            RecordField::SourceName => "source_name",
            RecordField::SourceUrl => "source_url",
            RecordField::SourceNote => "source_note",
        }
    }
}

/// Persisted canonical record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanonicalRecord {
    pub id: Uuid,
    pub key: CanonicalKey,
    pub time_ms: Option<i64>,
    /// Always `format_clock(time_ms)`
    pub time_clock: String,
    /// Source that set the current `time_ms`
    pub time_source: String,
    pub athlete_name: String,
    pub athlete_country: String,
    pub record_date: String,
    pub competition_name: String,
    pub competition_location: String,
    pub source_name: String,
    pub source_url: String,
    pub source_note: String,
    pub last_updated: String,
    pub is_active: bool,
}

impl CanonicalRecord {
    /// Build the record an Insert would create for `candidate`
    pub fn from_candidate(key: CanonicalKey, candidate: &NormalizedCandidate, now: &str) -> Self {
        Self {
            id: Uuid::new_v4(),
            key,
            time_ms: Some(candidate.time_ms),
            time_clock: format_clock(candidate.time_ms),
            time_source: candidate.source_name().to_string(),
            athlete_name: candidate.field_value(RecordField::AthleteName).to_string(),
            athlete_country: candidate.field_value(RecordField::AthleteCountry).to_string(),
            record_date: candidate.field_value(RecordField::RecordDate).to_string(),
            competition_name: candidate.field_value(RecordField::CompetitionName).to_string(),
            competition_location: candidate
                .field_value(RecordField::CompetitionLocation)
                .to_string(),
            source_name: candidate.field_value(RecordField::SourceName).to_string(),
            source_url: candidate.field_value(RecordField::SourceUrl).to_string(),
            source_note: candidate.field_value(RecordField::SourceNote).to_string(),
            last_updated: now.to_string(),
            is_active: true,
        }
    }

    pub fn field(&self, field: RecordField) -> &str {
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

    /// Value fields as a JSON object, for audit diffs
    pub fn snapshot(&self) -> Map<String, Value> {
        let mut values = Map::new();
        values.insert("time_ms".to_string(), self.time_ms.into());
        values.insert("time_clock".to_string(), self.time_clock.clone().into());
        values.insert("time_source".to_string(), self.time_source.clone().into());
        for field in RecordField::ALL {
            values.insert(field.column().to_string(), self.field(field).into());
        }
        values.insert("is_active".to_string(), self.is_active.into());
        values
    }
}

/// Blank-like text counts as empty for fill-only-on-empty
pub fn is_blank(value: &str) -> bool {
    let trimmed = value.trim();
    trimmed.is_empty()
        || matches!(trimmed, "-" | "—" | "–" | "?")
        || trimmed.eq_ignore_ascii_case("null")
        || trimmed.eq_ignore_ascii_case("none")
        || trimmed.eq_ignore_ascii_case("n/a")
}
