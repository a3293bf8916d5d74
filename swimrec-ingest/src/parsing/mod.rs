//! Pure text parsing stages
//!
//! Nothing in this module touches storage. Each stage maps raw scraped text to
//! canonical values or reports that it could not.

pub mod context;
pub mod event_classifier;
pub mod normalize;
pub mod time_parser;

pub use context::{infer_gender, infer_pool, pair_tables_by_probe, ProbeTable};
pub use event_classifier::{parse_event, ParsedEvent};
pub use normalize::{normalize_date, CandidateNormalizer, NormalizeFailure};
pub use time_parser::parse_time;

use once_cell::sync::Lazy;
use regex::Regex;

static WORD_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[a-z]+|[0-9]+").expect("Invalid word regex"));

/// Lowercase and strip Spanish/Portuguese diacritics
pub(crate) fn fold_text(text: &str) -> String {
    text.to_lowercase()
        .chars()
        .map(|c| match c {
            'á' | 'à' | 'ä' | 'â' | 'ã' => 'a',
            'é' | 'è' | 'ë' | 'ê' => 'e',
            'í' | 'ì' | 'ï' | 'î' => 'i',
            'ó' | 'ò' | 'ö' | 'ô' | 'õ' => 'o',
            'ú' | 'ù' | 'ü' | 'û' => 'u',
            'ñ' => 'n',
            'ç' => 'c',
            '×' => 'x',
            other => other,
        })
        .collect()
}

/// Folded words and digit runs, in order (`"4x100m Libre"` → `4 x 100 m libre`)
pub(crate) fn tokens(text: &str) -> Vec<String> {
    let folded = fold_text(text);
    WORD_PATTERN
        .find_iter(&folded)
        .map(|m| m.as_str().to_string())
        .collect()
}
