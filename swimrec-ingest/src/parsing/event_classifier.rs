//! Event text → distance, stroke, individual/relay
//!
//! Handles English and Spanish vocabularies. Relay distance is always the
//! total (`4x100` → 400).

use serde::Serialize;

use super::tokens;
use crate::models::{EventKind, Stroke};

/// Race distances a record table can list
const RACE_DISTANCES: &[u32] = &[25, 50, 100, 200, 400, 800, 1000, 1500, 1650];

const RELAY_WORDS: &[&str] = &["relay", "relays", "posta", "postas", "relevo", "relevos"];

const YARD_WORDS: &[&str] = &["y", "yd", "yds", "yard", "yards"];

/// Words that name a stroke. Medley comes first so "medley relay" and
/// "individual medley" are not read as anything else.
const STROKE_WORDS: &[(Stroke, &[&str])] = &[
    (
        Stroke::Medley,
        &["medley", "im", "combinado", "combinados", "estilos", "ci"],
    ),
    (Stroke::Butterfly, &["butterfly", "fly", "bf", "mariposa"]),
    (
        Stroke::Breaststroke,
        &["breaststroke", "breast", "br", "pecho", "braza"],
    ),
    (
        Stroke::Backstroke,
        &["backstroke", "back", "bk", "espalda", "dorso"],
    ),
    (
        Stroke::Freestyle,
        &["freestyle", "free", "fr", "fs", "libre", "crol"],
    ),
];

/// Classified event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ParsedEvent {
    /// Total distance (relays: legs × leg distance)
    pub distance_m: u32,
    pub stroke: Stroke,
    pub kind: EventKind,
    /// A yard unit appeared in the event text
    pub yards: bool,
}

/// Classify raw event text; `None` when distance or stroke is missing
pub fn parse_event(raw: &str) -> Option<ParsedEvent> {
    let words = tokens(raw);
    if words.is_empty() {
        return None;
    }

    let stroke = find_stroke(&words)?;
    let relay_legs = find_relay_legs(&words);
    let relay_word = words.iter().any(|w| RELAY_WORDS.contains(&w.as_str()));

    let (distance_m, kind) = match relay_legs {
        Some((legs, leg_distance)) => (legs * leg_distance, EventKind::Relay),
        None => {
            let distance = find_distance(&words)?;
            let kind = if relay_word {
                EventKind::Relay
            } else {
                EventKind::Individual
            };
            (distance, kind)
        }
    };

    Some(ParsedEvent {
        distance_m,
        stroke,
        kind,
        yards: has_yard_unit(&words),
    })
}

fn find_stroke(words: &[String]) -> Option<Stroke> {
    STROKE_WORDS.iter().find_map(|(stroke, vocabulary)| {
        words
            .iter()
            .any(|w| vocabulary.contains(&w.as_str()))
            .then_some(*stroke)
    })
}

/// `<N> x <leg>` with a known leg distance
fn find_relay_legs(words: &[String]) -> Option<(u32, u32)> {
    words.windows(3).find_map(|window| {
        let [legs, x, leg] = window else {
            return None;
        };
        if x != "x" {
            return None;
        }
        let legs: u32 = legs.parse().ok()?;
        let leg: u32 = leg.parse().ok()?;
        ((2..=10).contains(&legs) && RACE_DISTANCES.contains(&leg)).then_some((legs, leg))
    })
}

/// First numeric token that is a recognised race distance
fn find_distance(words: &[String]) -> Option<u32> {
    words
        .iter()
        .filter_map(|w| w.parse::<u32>().ok())
        .find(|d| RACE_DISTANCES.contains(d))
}

/// A yard unit directly after a number, or spelled out anywhere
fn has_yard_unit(words: &[String]) -> bool {
    let after_number = words.windows(2).any(|pair| {
        pair[0].bytes().all(|b| b.is_ascii_digit()) && YARD_WORDS.contains(&pair[1].as_str())
    });
    after_number
        || words
            .iter()
            .any(|w| matches!(w.as_str(), "yards" | "yds" | "yard"))
}
