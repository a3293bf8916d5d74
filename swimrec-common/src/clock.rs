//! Clock text formatting for swim times
//!
//! A record's `time_clock` column is always produced here from `time_ms`,
//! never copied from scraped text.

const MS_PER_SECOND: i64 = 1_000;
const MS_PER_MINUTE: i64 = 60 * MS_PER_SECOND;
const MS_PER_HOUR: i64 = 60 * MS_PER_MINUTE;

/// Format milliseconds as canonical clock text.
///
/// Format selection by magnitude:
/// - under a minute: `S.cc` (e.g. `23.76`)
/// - under an hour: `M:SS.cc` (e.g. `1:41.32`)
/// - otherwise: `H:MM:SS.cc`
///
/// Sub-centisecond precision is truncated, never rounded. Negative input is
/// clamped to zero since swim times cannot be negative.
///
/// # Examples
///
/// ```
/// use swimrec_common::clock::format_clock;
///
/// assert_eq!(format_clock(23_760), "23.76");
/// assert_eq!(format_clock(101_320), "1:41.32");
/// assert_eq!(format_clock(3_723_450), "1:02:03.45");
/// ```
pub fn format_clock(ms: i64) -> String {
    let ms = ms.max(0);

    let hours = ms / MS_PER_HOUR;
    let minutes = (ms % MS_PER_HOUR) / MS_PER_MINUTE;
    let seconds = (ms % MS_PER_MINUTE) / MS_PER_SECOND;
    let centis = (ms % MS_PER_SECOND) / 10;

    if hours > 0 {
        format!("{}:{:02}:{:02}.{:02}", hours, minutes, seconds, centis)
    } else if minutes > 0 {
        format!("{}:{:02}.{:02}", minutes, seconds, centis)
    } else {
        format!("{}.{:02}", seconds, centis)
    }
}
