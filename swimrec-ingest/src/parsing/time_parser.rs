//! Swim time text → milliseconds
//!
//! Accepted shapes:
//! - plain seconds: `23.76`, `23,76`
//! - `m:ss.ff`, `h:mm:ss.ff`
//! - dot separated `m.ss.ff`, `h.mm.ss.ff`
//! - `38"51` (quote as centisecond separator) and `1'05"32` (apostrophe as
//!   minute separator)
//!
//! Trailing annotations (`NV`, `*`, `+`, `WR`, quotes) are stripped first.
//! Fractions keep at most two digits; extra digits are truncated.

use once_cell::sync::Lazy;
use regex::Regex;

/// Leading markers, the time core, and whatever trails it
static TIME_SHAPE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"^[\s*+"'″]*([0-9][0-9:.,"'′″’´]*)(.*)$"#).expect("Invalid time regex")
});

/// Texts scrapers use for "no time"
const ABSENT_MARKERS: &[&str] = &["", "-", "—", "–", "NO TIME", "NT", "NO", "DNS", "DQ"];

/// Parse raw time text into milliseconds. `None` means absent or unparsable.
pub fn parse_time(raw: &str) -> Option<i64> {
    let trimmed = raw.trim();
    if ABSENT_MARKERS
        .iter()
        .any(|marker| trimmed.eq_ignore_ascii_case(marker))
    {
        return None;
    }

    let caps = TIME_SHAPE.captures(trimmed)?;
    let core = caps.get(1)?.as_str();
    let trailing = caps.get(2).map(|m| m.as_str()).unwrap_or("");

    // Trailing text may only be annotation, never another number
    if trailing.chars().any(|c| c.is_ascii_digit()) {
        return None;
    }

    let core = normalize_separators(core);
    split_components(&core).and_then(|parts| parts.to_ms())
}

/// Map quote/apostrophe/comma separators onto `:` and `.`
fn normalize_separators(core: &str) -> String {
    let core = core.trim_end_matches(|c: char| !c.is_ascii_digit());
    let mut out = String::with_capacity(core.len());
    for c in core.chars() {
        match c {
            '"' | '″' => out.push('.'),
            '\'' | '′' | '’' | '´' => out.push(':'),
            ',' => out.push('.'),
            other => out.push(other),
        }
    }
    out
}

#[derive(Debug, PartialEq)]
struct ClockParts<'a> {
    hours: Option<&'a str>,
    minutes: Option<&'a str>,
    seconds: &'a str,
    fraction: Option<&'a str>,
}

fn split_components(core: &str) -> Option<ClockParts<'_>> {
    if core.contains(':') {
        let colon_parts: Vec<&str> = core.split(':').collect();
        let (hours, minutes, last) = match colon_parts.as_slice() {
            [m, last] => (None, Some(*m), *last),
            [h, m, last] => (Some(*h), Some(*m), *last),
            _ => return None,
        };
        let (seconds, fraction) = match last.split('.').collect::<Vec<_>>().as_slice() {
            [s] => (*s, None),
            [s, f] => (*s, Some(*f)),
            _ => return None,
        };
        return Some(ClockParts {
            hours,
            minutes,
            seconds,
            fraction,
        });
    }

    let parts = match core.split('.').collect::<Vec<_>>().as_slice() {
        [s] => ClockParts {
            hours: None,
            minutes: None,
            seconds: *s,
            fraction: None,
        },
        [s, f] => ClockParts {
            hours: None,
            minutes: None,
            seconds: *s,
            fraction: Some(*f),
        },
        [m, s, f] => ClockParts {
            hours: None,
            minutes: Some(*m),
            seconds: *s,
            fraction: Some(*f),
        },
        [h, m, s, f] => ClockParts {
            hours: Some(*h),
            minutes: Some(*m),
            seconds: *s,
            fraction: Some(*f),
        },
        _ => return None,
    };
    Some(parts)
}

impl ClockParts<'_> {
    fn to_ms(&self) -> Option<i64> {
        let seconds = digits(self.seconds)?;
        let minutes = match self.minutes {
            Some(m) => Some(digits(m)?),
            None => None,
        };
        let hours = match self.hours {
            Some(h) => Some(digits(h)?),
            None => None,
        };

        if minutes.is_some() && seconds >= 60 {
            return None;
        }
        if let (Some(_), Some(m)) = (hours, minutes) {
            if m >= 60 {
                return None;
            }
        }

        let centis = match self.fraction {
            None => 0,
            Some(f) => fraction_centis(f)?,
        };

        let total_seconds = hours.unwrap_or(0) * 3600 + minutes.unwrap_or(0) * 60 + seconds;
        Some(total_seconds * 1000 + centis * 10)
    }
}

fn digits(text: &str) -> Option<i64> {
    if text.is_empty() || text.len() > 6 || !text.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    text.parse().ok()
}

/// One digit is tenths, two are hundredths, more are truncated
fn fraction_centis(fraction: &str) -> Option<i64> {
    if fraction.is_empty() || !fraction.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let value: i64 = match fraction.len() {
        1 => fraction.parse::<i64>().ok()? * 10,
        _ => fraction[..2].parse().ok()?,
    };
    Some(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use swimrec_common::format_clock;

    #[test]
    fn test_plain_seconds() {
        assert_eq!(parse_time("23.76"), Some(23_760));
        assert_eq!(parse_time("23,76"), Some(23_760));
        assert_eq!(parse_time(" 52.1 "), Some(52_100));
        assert_eq!(parse_time("58"), Some(58_000));
    }

    #[test]
    fn test_colon_formats() {
        assert_eq!(parse_time("1:41.32"), Some(101_320));
        assert_eq!(parse_time("00:01:41.3"), Some(101_300));
        assert_eq!(parse_time("00:52.69"), Some(52_690));
        assert_eq!(parse_time("1:02:03.45"), Some(3_723_450));
    }

    #[test]
    fn test_dot_separated_formats() {
        assert_eq!(parse_time("1.41.32"), Some(101_320));
        assert_eq!(parse_time("14.48.53"), Some(888_530));
        assert_eq!(parse_time("1.02.03.45"), Some(3_723_450));
    }

    #[test]
    fn test_quote_separators() {
        assert_eq!(parse_time("38\"51"), Some(38_510));
        assert_eq!(parse_time("1'05\"32"), Some(65_320));
    }

    #[test]
    fn test_annotations_stripped() {
        assert_eq!(parse_time("23.76 NV"), Some(23_760));
        assert_eq!(parse_time("23.76*"), Some(23_760));
        assert_eq!(parse_time("1:41.32 WR"), Some(101_320));
        assert_eq!(parse_time("+25.01"), Some(25_010));
        assert_eq!(parse_time("\"24.10\""), Some(24_100));
    }

    #[test]
    fn test_fraction_truncated_not_rounded() {
        assert_eq!(parse_time("23.769"), Some(23_760));
        assert_eq!(parse_time("1:41.329"), Some(101_320));
    }

    #[test]
    fn test_absent_markers() {
        for raw in ["", "  ", "-", "—", "–", "NO TIME", "no time", "NT", "NO"] {
            assert_eq!(parse_time(raw), None, "{:?}", raw);
        }
    }

    #[test]
    fn test_out_of_range_components() {
        assert_eq!(parse_time("1:75.00"), None);
        assert_eq!(parse_time("1:60:00.00"), None);
        assert_eq!(parse_time("1.60.00"), None);
    }

    #[test]
    fn test_garbage() {
        assert_eq!(parse_time("abc"), None);
        assert_eq!(parse_time("1:2:3:4"), None);
        assert_eq!(parse_time("23.76 / 24.01"), None);
        assert_eq!(parse_time("1..2"), None);
    }

    #[test]
    fn test_round_trip_with_format_clock() {
        for ms in [0, 10, 9_050, 23_760, 59_990, 60_000, 101_320, 888_530, 3_599_990, 3_723_450] {
            assert_eq!(parse_time(&format_clock(ms)), Some(ms), "ms={}", ms);
        }
    }
}
