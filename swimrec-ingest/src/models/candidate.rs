//! Candidate records as delivered by scraper collaborators
//!
//! A candidate is one loosely-typed observation of a record. Nothing here is
//! trusted: every field is raw text and may be blank.

use serde::{Deserialize, Serialize};

/// Which table on which page a scraped row came from.
///
/// Sibling tables on the same page are candidates for gender pairing by the
/// probe-time heuristic.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TableRef {
    /// Page identity (URL, PDF path + page number, ...)
    pub page: String,
    /// Zero-based table position on the page
    pub index: u32,
}

impl TableRef {
    pub fn new(page: impl Into<String>, index: u32) -> Self {
        Self {
            page: page.into(),
            index,
        }
    }
}

/// One scraped, not-yet-reconciled observation of a record.
///
/// Deserialized from camelCase JSON; absent fields default to empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CandidateRecord {
    pub source_name: String,
    #[serde(rename = "sourceURL", alias = "sourceUrl")]
    pub source_url: String,
    pub raw_event: String,
    pub raw_time: String,
    pub athlete_name_raw: String,
    pub country_raw: String,
    pub date_raw: String,
    pub venue_raw: String,
    pub competition_raw: String,
    pub gender_hint: Option<String>,
    pub pool_hint: Option<String>,
    pub record_scope: String,
    pub record_type: String,
    /// Age group or "Open"; part of the canonical key
    pub category: String,
    pub source_note: String,
    /// Nearest preceding section heading or table caption
    pub heading: Option<String>,
    pub table: Option<TableRef>,
}

impl CandidateRecord {
    /// Short identification used in log lines and error samples
    pub fn describe(&self) -> String {
        format!(
            "{} | {} | {}",
            self.source_name.trim(),
            self.raw_event.trim(),
            self.raw_time.trim()
        )
    }
}

/// Parse a batch of candidates from a JSON array or JSON Lines text
pub fn parse_candidates(text: &str) -> serde_json::Result<Vec<CandidateRecord>> {
    let trimmed = text.trim_start();
    if trimmed.starts_with('[') {
        return serde_json::from_str(trimmed);
    }
    trimmed
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(serde_json::from_str)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_camel_case_with_defaults() {
        let json = r#"{
            "sourceName": "World Aquatics",
            "sourceURL": "https://example.org/records",
            "rawEvent": "Men 100m Freestyle",
            "rawTime": "46.40",
            "recordScope": "Mundial",
            "recordType": "WR",
            "category": "Open",
            "table": { "page": "p1", "index": 0 }
        }"#;

        let candidate: CandidateRecord = serde_json::from_str(json).unwrap();
        assert_eq!(candidate.source_name, "World Aquatics");
        assert_eq!(candidate.source_url, "https://example.org/records");
        assert_eq!(candidate.raw_time, "46.40");
        assert_eq!(candidate.athlete_name_raw, "");
        assert_eq!(candidate.gender_hint, None);
        assert_eq!(candidate.table, Some(TableRef::new("p1", 0)));
    }

    #[test]
    fn test_source_url_alias() {
        let json = r#"{ "sourceUrl": "https://a.example" }"#;
        let candidate: CandidateRecord = serde_json::from_str(json).unwrap();
        assert_eq!(candidate.source_url, "https://a.example");
    }

    #[test]
    fn test_describe() {
        let candidate = CandidateRecord {
            source_name: " CONSANAT ".to_string(),
            raw_event: "50 m Libre".to_string(),
            raw_time: "24.10".to_string(),
            ..Default::default()
        };
        assert_eq!(candidate.describe(), "CONSANAT | 50 m Libre | 24.10");
    }

    #[test]
    fn test_parse_candidates_array_and_lines() {
        let array = r#"[{"rawTime": "1:00.00"}, {"rawTime": "59.00"}]"#;
        assert_eq!(parse_candidates(array).unwrap().len(), 2);

        let lines = "{\"rawTime\": \"1:00.00\"}\n\n{\"rawTime\": \"59.00\"}\n";
        let parsed = parse_candidates(lines).unwrap();
        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed[1].raw_time, "59.00");

        assert!(parse_candidates("").unwrap().is_empty());
        assert!(parse_candidates("{not json").is_err());
    }
}
