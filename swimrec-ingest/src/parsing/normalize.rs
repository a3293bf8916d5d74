//! Candidate normalization
//!
//! Runs time parsing, event classification and context inference over a whole
//! batch. The batch is needed because probe pairing compares sibling tables.

use chrono::{Datelike, NaiveDate};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeMap;
use tracing::debug;

use super::context::{infer_gender, infer_pool, pair_tables_by_probe, ProbeTable};
use super::event_classifier::{parse_event, ParsedEvent};
use super::time_parser::parse_time;
use crate::error::{ContextDimension, IngestError};
use crate::models::record::is_blank;
use crate::models::{
    CandidateRecord, Confidence, EventKind, Gender, NormalizedCandidate, PoolCourse, Resolution,
    Stroke, TableRef,
};

const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%d/%m/%Y",
    "%d-%m-%Y",
    "%Y/%m/%d",
    "%d.%m.%Y",
    "%d/%m/%y",
    "%d-%m-%y",
    "%d %b %Y",
    "%d %B %Y",
    "%b %d, %Y",
    "%B %d, %Y",
];

/// Two-digit years parse as 4-digit `%Y` years in the first century;
/// anything this old is a misparse.
const MIN_RECORD_YEAR: i32 = 1900;

static EMBEDDED_ISO_DATE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d{4})-(\d{2})-(\d{2})").expect("Invalid date regex"));

/// A candidate that could not be normalized
#[derive(Debug)]
pub struct NormalizeFailure {
    pub candidate: CandidateRecord,
    pub error: IngestError,
    pub confidence: Confidence,
}

/// Per-row parse state before probe pairing
struct RowState {
    candidate: CandidateRecord,
    event: Option<ParsedEvent>,
    time_ms: Option<i64>,
    gender: Resolution<Gender>,
    pool: Resolution<PoolCourse>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct CandidateNormalizer;

impl CandidateNormalizer {
    pub fn new() -> Self {
        Self
    }

    /// Normalize a batch, preserving input order
    pub fn normalize_batch(
        &self,
        candidates: Vec<CandidateRecord>,
    ) -> Vec<Result<NormalizedCandidate, NormalizeFailure>> {
        let mut rows: Vec<RowState> = candidates.into_iter().map(parse_row).collect();

        let probe_tables = collect_probe_tables(&rows);
        if !probe_tables.is_empty() {
            let assigned = pair_tables_by_probe(&probe_tables);
            for row in rows.iter_mut().filter(|r| !r.gender.is_resolved()) {
                let resolution = row.candidate.table.as_ref().and_then(|t| assigned.get(t));
                if let Some(resolution) = resolution {
                    row.gender = *resolution;
                }
            }
        }

        rows.into_iter().map(finish_row).collect()
    }
}

fn parse_row(candidate: CandidateRecord) -> RowState {
    let event = parse_event(&candidate.raw_event);
    let time_ms = parse_time(&candidate.raw_time);
    let heading = candidate.heading.as_deref();
    let gender = infer_gender(
        candidate.gender_hint.as_deref(),
        &candidate.raw_event,
        heading,
    );
    let pool = infer_pool(
        candidate.pool_hint.as_deref(),
        &candidate.raw_event,
        event.map(|e| e.yards).unwrap_or(false),
        heading,
    );

    RowState {
        candidate,
        event,
        time_ms,
        gender,
        pool,
    }
}

/// Tables holding gender-unresolved rows, with each table's first
/// 50 m freestyle individual time
fn collect_probe_tables(rows: &[RowState]) -> Vec<ProbeTable> {
    let mut tables: BTreeMap<TableRef, Option<i64>> = BTreeMap::new();

    for row in rows.iter().filter(|r| !r.gender.is_resolved()) {
        if let Some(table) = &row.candidate.table {
            tables.entry(table.clone()).or_insert(None);
        }
    }

    for row in rows {
        let Some(table) = &row.candidate.table else {
            continue;
        };
        let Some(probe) = tables.get_mut(table) else {
            continue;
        };
        if probe.is_some() {
            continue;
        }
        let is_probe_event = matches!(
            row.event,
            Some(ParsedEvent {
                distance_m: 50,
                stroke: Stroke::Freestyle,
                kind: EventKind::Individual,
                ..
            })
        );
        if is_probe_event {
            *probe = row.time_ms;
        }
    }

    tables
        .into_iter()
        .map(|(table, probe_time_ms)| ProbeTable {
            table,
            probe_time_ms,
        })
        .collect()
}

fn finish_row(row: RowState) -> Result<NormalizedCandidate, NormalizeFailure> {
    let RowState {
        candidate,
        event,
        time_ms,
        gender,
        pool,
    } = row;

    let fail = |candidate: CandidateRecord, error: IngestError, confidence: Confidence| {
        debug!(candidate = %candidate.describe(), error = %error, "Candidate skipped");
        Err(NormalizeFailure {
            candidate,
            error,
            confidence,
        })
    };

    let Some(event) = event else {
        let error = IngestError::EventParse {
            raw: candidate.raw_event.clone(),
        };
        return fail(candidate, error, Confidence::High);
    };

    let Some(time_ms) = time_ms.filter(|ms| *ms > 0) else {
        let error = IngestError::TimeParse {
            raw: candidate.raw_time.clone(),
        };
        return fail(candidate, error, Confidence::High);
    };

    let (gender, gender_via) = match gender {
        Resolution::Resolved { value, via } => (value, via),
        Resolution::Unresolved => {
            let error = IngestError::AmbiguousContext {
                dimension: ContextDimension::Gender,
                raw_event: candidate.raw_event.clone(),
            };
            return fail(candidate, error, Confidence::Low);
        }
    };

    let (pool, pool_via) = match pool {
        Resolution::Resolved { value, via } => (value, via),
        Resolution::Unresolved => {
            let error = IngestError::AmbiguousContext {
                dimension: ContextDimension::Pool,
                raw_event: candidate.raw_event.clone(),
            };
            return fail(candidate, error, Confidence::Low);
        }
    };

    Ok(NormalizedCandidate {
        gender,
        gender_via,
        pool,
        pool_via,
        distance_m: event.distance_m,
        stroke: event.stroke,
        kind: event.kind,
        time_ms,
        category: clean_text(&candidate.category),
        record_type: clean_text(&candidate.record_type),
        record_scope: clean_text(&candidate.record_scope),
        athlete_name: clean_text(&candidate.athlete_name_raw),
        athlete_country: clean_text(&candidate.country_raw),
        record_date: normalize_date(&candidate.date_raw).unwrap_or_default(),
        competition_name: clean_text(&candidate.competition_raw),
        competition_location: clean_text(&candidate.venue_raw),
        source_name: clean_text(&candidate.source_name),
        source_url: clean_text(&candidate.source_url),
        source_note: clean_text(&candidate.source_note),
        raw: candidate,
    })
}

/// Collapse whitespace; blank-like values become empty
pub fn clean_text(text: &str) -> String {
    if is_blank(text) {
        return String::new();
    }
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Date text → ISO `YYYY-MM-DD`, when recognisable
pub fn normalize_date(raw: &str) -> Option<String> {
    let text = clean_text(raw);
    if text.is_empty() {
        return None;
    }

    for format in DATE_FORMATS {
        match NaiveDate::parse_from_str(&text, format) {
            Ok(date) if date.year() >= MIN_RECORD_YEAR => {
                return Some(date.format("%Y-%m-%d").to_string())
            }
            _ => {}
        }
    }

    let caps = EMBEDDED_ISO_DATE.captures(&text)?;
    let date = NaiveDate::from_ymd_opt(
        caps[1].parse().ok()?,
        caps[2].parse().ok()?,
        caps[3].parse().ok()?,
    )?;
    Some(date.format("%Y-%m-%d").to_string())
}
