use chrono::{DateTime, NaiveDate, NaiveDateTime};
use regex::Regex;
use std::sync::LazyLock;

pub const MIN_SWIM_TIME_SECONDS: f64 = 10.0;
pub const MAX_SWIM_TIME_SECONDS: f64 = 7200.0;

/// Largest value `format_from_seconds` renders to the hundredth (2^53 hundredths)
pub const MAX_EXACT_SECONDS: f64 = 90_071_992_547_409.91;

const SWIM_TIME_PATTERN: &str = r"^(\d+:)?\d+\.\d+s?$";

static SWIM_TIME_REGEX: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(SWIM_TIME_PATTERN).ok());

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%b %d, %Y", "%d %b %Y"];

/// Parse a race time such as `"23.45"` or `"1:23.45"` into seconds.
///
/// Returns NaN when the input has no usable number. An unreadable part on
/// either side of the colon counts as zero.
pub fn parse_to_seconds(raw: &str) -> f64 {
    let cleaned = strip_seconds_suffix(raw.trim());
    if cleaned.is_empty() {
        return f64::NAN;
    }

    match cleaned.rsplit_once(':') {
        Some((minutes, seconds)) => {
            let minutes = minutes.trim().parse::<u64>().unwrap_or(0);
            let seconds = seconds.trim().parse::<f64>().unwrap_or(0.0);
            minutes as f64 * 60.0 + seconds
        }
        None => cleaned.parse::<f64>().unwrap_or(f64::NAN),
    }
}

fn strip_seconds_suffix(value: &str) -> &str {
    value
        .strip_suffix('s')
        .or_else(|| value.strip_suffix('S'))
        .unwrap_or(value)
}

/// Format seconds as `SS.ss` below a minute and `M:SS.ss` otherwise.
///
/// Hundredths are exact while they fit an f64 mantissa, which covers every
/// value up to `MAX_EXACT_SECONDS`; larger values keep their magnitude but
/// lose digits.
pub fn format_from_seconds(seconds: f64) -> String {
    if !seconds.is_finite() {
        return "N/A".to_string();
    }
    if seconds < 0.0 {
        return format!("{:.2}", seconds);
    }

    // Round once so that 59.996 renders as 1:00.00 rather than 60.00
    let hundredths = (seconds * 100.0).round();
    if hundredths < 6000.0 {
        let hundredths = hundredths as u64;
        return format!("{}.{:02}", hundredths / 100, hundredths % 100);
    }

    let minutes = (hundredths / 6000.0).floor();
    let remainder = (hundredths - minutes * 6000.0).clamp(0.0, 5999.0) as u64;
    format!("{:.0}:{:02}.{:02}", minutes, remainder / 100, remainder % 100)
}

/// Check whether a scraped cell looks like a plausible swim time
pub fn is_valid_swim_time(raw: &str) -> bool {
    let candidate = raw.trim();
    let matches = SWIM_TIME_REGEX
        .as_ref()
        .is_some_and(|re| re.is_match(candidate));
    if !matches {
        return false;
    }

    let seconds = parse_to_seconds(candidate);
    (MIN_SWIM_TIME_SECONDS..=MAX_SWIM_TIME_SECONDS).contains(&seconds)
}

/// Render a delta in seconds as a signed string like `"+0.5s"`.
pub fn format_improvement(delta: f64) -> String {
    if !delta.is_finite() {
        return "0.0s".to_string();
    }

    let magnitude = format!("{:.1}", delta.abs());
    if magnitude == "0.0" {
        "0.0s".to_string()
    } else if delta > 0.0 {
        format!("+{}s", magnitude)
    } else {
        format!("-{}s", magnitude)
    }
}

/// Parse the date formats seen on results pages and in supplied records
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    date_candidates(trimmed)
        .into_iter()
        .find_map(parse_single_date)
}

fn date_candidates(value: &str) -> Vec<&str> {
    let mut candidates = vec![value];

    if let Some((head, _)) = value.split_once('(') {
        candidates.push(head.trim());
    }
    if let Some(first) = value.split_whitespace().next() {
        candidates.push(first);
    }

    candidates
}

fn parse_single_date(value: &str) -> Option<NaiveDate> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.date_naive());
    }

    if let Ok(dt) = NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S") {
        return Some(dt.date());
    }

    if value.contains('/') {
        return parse_slash_date(value);
    }

    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(value, format).ok())
}

/// `MM/DD/YYYY` or `MM/DD/YY`, picked by the width of the year.
///
/// chrono's `%Y` also accepts two digits, which would land in year 24.
fn parse_slash_date(value: &str) -> Option<NaiveDate> {
    let (_, year) = value.rsplit_once('/')?;
    let format = match year.len() {
        4 => "%m/%d/%Y",
        2 => "%m/%d/%y",
        _ => return None,
    };
    NaiveDate::parse_from_str(value, format).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_parse_plain_seconds() {
        assert!((parse_to_seconds("23.45") - 23.45).abs() < 1e-9);
        assert!((parse_to_seconds("23.45s") - 23.45).abs() < 1e-9);
    }

    #[test]
    fn test_parse_minutes_and_seconds() {
        assert!((parse_to_seconds("1:05.30") - 65.30).abs() < 1e-9);
        assert!((parse_to_seconds("11:12.34") - 672.34).abs() < 1e-9);
    }

    #[test]
    fn test_parse_defaults_bad_parts_to_zero() {
        assert!((parse_to_seconds("x:30.00") - 30.0).abs() < 1e-9);
        assert!((parse_to_seconds("2:") - 120.0).abs() < 1e-9);
    }

    #[test]
    fn test_parse_unparsable_is_nan() {
        assert!(parse_to_seconds("DQ").is_nan());
        assert!(parse_to_seconds("").is_nan());
        assert!(parse_to_seconds("   ").is_nan());
    }

    #[test]
    fn test_format_under_a_minute() {
        assert_eq!(format_from_seconds(22.9), "22.90");
        assert_eq!(format_from_seconds(5.0), "5.00");
    }

    #[test]
    fn test_format_over_a_minute() {
        assert_eq!(format_from_seconds(65.30), "1:05.30");
        assert_eq!(format_from_seconds(672.34), "11:12.34");
        assert_eq!(format_from_seconds(59.996), "1:00.00");
    }

    #[test]
    fn test_format_wide_values() {
        assert_eq!(format_from_seconds(1e9), "16666666:40.00");
        assert!((parse_to_seconds("16666666:40.00") - 1e9).abs() < 1e-6);

        let big = MAX_EXACT_SECONDS.floor();
        assert!((parse_to_seconds(&format_from_seconds(big)) - big).abs() <= 0.02);
    }

    #[test]
    fn test_format_nan() {
        assert_eq!(format_from_seconds(f64::NAN), "N/A");
    }

    #[test]
    fn test_valid_swim_time() {
        assert!(is_valid_swim_time("23.45"));
        assert!(is_valid_swim_time("1:58.34"));
        assert!(is_valid_swim_time(" 2:15.67s "));
        assert!(!is_valid_swim_time("DQ"));
        assert!(!is_valid_swim_time("5.10"));
        assert!(!is_valid_swim_time("125:00.00"));
        assert!(!is_valid_swim_time("2024-01-15"));
    }

    #[test]
    fn test_format_improvement() {
        assert_eq!(format_improvement(0.5), "+0.5s");
        assert_eq!(format_improvement(-1.23), "-1.2s");
        assert_eq!(format_improvement(0.01), "0.0s");
        assert_eq!(format_improvement(f64::NAN), "0.0s");
    }

    #[test]
    fn test_parse_date_formats() {
        let expected = NaiveDate::from_ymd_opt(2024, 2, 18);
        assert_eq!(parse_date("2024-02-18"), expected);
        assert_eq!(parse_date("02/18/2024"), expected);
        assert_eq!(parse_date("02/18/24"), expected);
        assert_eq!(parse_date("2/18/24"), expected);
        assert_eq!(parse_date("02/18/024"), None);
        assert_eq!(parse_date("Feb 18, 2024"), expected);
        assert_eq!(parse_date("2024-02-18 (M123)"), expected);
        assert_eq!(parse_date("2024-02-18T09:30:00Z"), expected);
        assert_eq!(parse_date("not a date"), None);
        assert_eq!(parse_date(""), None);
    }

    proptest! {
        #[test]
        fn prop_format_then_parse_round_trips(x in 0.0f64..1e9) {
            let parsed = parse_to_seconds(&format_from_seconds(x));
            prop_assert!((parsed - x).abs() <= 0.01);
        }

        #[test]
        fn prop_valid_strings_round_trip(minutes in 0u32..100, hundredths in 0u32..6000) {
            let raw = if minutes == 0 {
                format!("{}.{:02}", hundredths / 100, hundredths % 100)
            } else {
                format!("{}:{:02}.{:02}", minutes, hundredths / 100, hundredths % 100)
            };
            let seconds = parse_to_seconds(&raw);
            let reparsed = parse_to_seconds(&format_from_seconds(seconds));
            prop_assert!((reparsed - seconds).abs() <= 0.01);
        }
    }
}
