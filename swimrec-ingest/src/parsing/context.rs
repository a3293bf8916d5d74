//! Gender and pool course inference
//!
//! Resolution order, first success wins:
//! 1. explicit hint field, then the row's own event text
//! 2. nearest preceding heading
//! 3. gender only: probe-time pairing of two sibling tables
//!
//! Anything still unresolved is skipped by the normalizer.

use std::collections::BTreeMap;

use super::{fold_text, tokens};
use crate::models::{Gender, PoolCourse, Resolution, TableRef};

const MEN_WORDS: &[&str] = &[
    "men", "mens", "male", "males", "hombre", "hombres", "masculino", "masculinos", "varones",
    "varon", "boys", "caballeros",
];

const WOMEN_WORDS: &[&str] = &[
    "women", "womens", "female", "females", "mujer", "mujeres", "femenino", "femeninos",
    "feminino", "damas", "girls", "senoras",
];

const MIXED_WORDS: &[&str] = &["mixed", "mixto", "mixta", "mixtos", "mixtas"];

/// Gender from free text or a hint field.
///
/// Single-letter codes (`M`, `H`, `F`, `W`, `X`) count only when they are the
/// whole text, so `"200 m"` never reads as men. Text naming two genders is
/// ambiguous.
pub fn gender_from_text(text: &str) -> Option<Gender> {
    let words = tokens(text);
    if let [only] = words.as_slice() {
        match only.as_str() {
            "m" | "h" => return Some(Gender::Men),
            "f" | "w" => return Some(Gender::Women),
            "x" => return Some(Gender::Mixed),
            _ => {}
        }
    }

    let has = |vocabulary: &[&str]| words.iter().any(|w| vocabulary.contains(&w.as_str()));
    let found: Vec<Gender> = [
        (Gender::Men, has(MEN_WORDS)),
        (Gender::Women, has(WOMEN_WORDS)),
        (Gender::Mixed, has(MIXED_WORDS)),
    ]
    .into_iter()
    .filter_map(|(gender, present)| present.then_some(gender))
    .collect();

    match found.as_slice() {
        [gender] => Some(*gender),
        _ => None,
    }
}

/// Pool course from free text or a hint field. Text naming two courses is
/// ambiguous.
pub fn pool_from_text(text: &str) -> Option<PoolCourse> {
    let folded = fold_text(text)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    let words = tokens(text);
    let has_word = |vocabulary: &[&str]| words.iter().any(|w| vocabulary.contains(&w.as_str()));
    let has_phrase = |phrases: &[&str]| phrases.iter().any(|p| folded.contains(p));

    // Whole-field codes used by hint columns
    match folded.as_str() {
        "lcm" | "50m" | "50 m" | "pileta 50" | "pileta 50m" => return Some(PoolCourse::Lcm),
        "scm" | "25m" | "25 m" | "mts" | "metros" | "pileta 25" | "pileta 25m" => {
            return Some(PoolCourse::Scm)
        }
        "scy" | "y" | "yd" | "yds" | "yards" => return Some(PoolCourse::Scy),
        _ => {}
    }

    let yards = has_word(&["scy", "yards", "yds"]);
    let long = has_word(&["lcm"])
        || has_phrase(&[
            "long course",
            "piscina larga",
            "pileta 50",
            "piscina 50",
            "piscina olimpica",
            "curso largo",
        ]);
    let short = has_word(&["scm"])
        || has_phrase(&["piscina corta", "pileta 25", "piscina 25", "curso corto"])
        || (!yards && has_phrase(&["short course"]));

    match (long, short, yards) {
        (true, false, false) => Some(PoolCourse::Lcm),
        (false, true, false) => Some(PoolCourse::Scm),
        (false, false, true) => Some(PoolCourse::Scy),
        _ => None,
    }
}

/// Row-level and heading signals for gender
pub fn infer_gender(
    hint: Option<&str>,
    raw_event: &str,
    heading: Option<&str>,
) -> Resolution<Gender> {
    explicit(hint.and_then(gender_from_text))
        .or_else(|| explicit(gender_from_text(raw_event)))
        .or_else(|| match heading.and_then(gender_from_text) {
            Some(gender) => Resolution::heading(gender),
            None => Resolution::Unresolved,
        })
}

/// Row-level and heading signals for pool course. A yard unit in the event
/// text is an explicit SCY signal.
pub fn infer_pool(
    hint: Option<&str>,
    raw_event: &str,
    event_in_yards: bool,
    heading: Option<&str>,
) -> Resolution<PoolCourse> {
    explicit(hint.and_then(pool_from_text))
        .or_else(|| explicit(pool_from_text(raw_event)))
        .or_else(|| explicit(event_in_yards.then_some(PoolCourse::Scy)))
        .or_else(|| match heading.and_then(pool_from_text) {
            Some(pool) => Resolution::heading(pool),
            None => Resolution::Unresolved,
        })
}

fn explicit<T: Copy>(value: Option<T>) -> Resolution<T> {
    match value {
        Some(value) => Resolution::explicit(value),
        None => Resolution::Unresolved,
    }
}

/// One table whose rows still lack a gender, with its probe time
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeTable {
    pub table: TableRef,
    /// First 50 m freestyle individual time published in the table
    pub probe_time_ms: Option<i64>,
}

/// Pair sibling tables by probe time.
///
/// Applies only when a page has exactly two gender-unresolved tables and both
/// publish a probe time; the faster table is Men, the other Women. Equal or
/// missing probe times leave both unresolved. Every assignment is tagged
/// `Probe` (low confidence).
pub fn pair_tables_by_probe(tables: &[ProbeTable]) -> BTreeMap<TableRef, Resolution<Gender>> {
    let mut by_page: BTreeMap<&str, Vec<&ProbeTable>> = BTreeMap::new();
    for table in tables {
        by_page.entry(table.table.page.as_str()).or_default().push(table);
    }

    let mut assigned = BTreeMap::new();
    for (page, siblings) in by_page {
        let [first, second] = siblings.as_slice() else {
            tracing::debug!(
                page,
                tables = siblings.len(),
                "Probe pairing needs exactly two unresolved tables"
            );
            continue;
        };

        let (Some(first_ms), Some(second_ms)) = (first.probe_time_ms, second.probe_time_ms) else {
            tracing::debug!(page, "Probe time missing, gender left unresolved");
            continue;
        };

        if first_ms == second_ms {
            tracing::debug!(page, probe_ms = first_ms, "Equal probe times, gender left unresolved");
            continue;
        }

        let (men, women) = if first_ms < second_ms {
            (first, second)
        } else {
            (second, first)
        };
        tracing::info!(
            page,
            men_table = men.table.index,
            women_table = women.table.index,
            "Gender inferred from probe times (low confidence)"
        );
        assigned.insert(men.table.clone(), Resolution::probe(Gender::Men));
        assigned.insert(women.table.clone(), Resolution::probe(Gender::Women));
    }
    assigned
}
