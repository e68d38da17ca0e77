//! HTTP request parsing.
//!
//! The transactions endpoint takes free-form `from`/`to` date text. Accepted
//! forms:
//!
//! - calendar dates: `2024-03-01`, `2024/03/01`, `01.03.2024`
//! - RFC 3339 timestamps (the date part is used)
//! - keywords: `today`, `now`, `yesterday`, `tomorrow`
//! - relative phrases: `30 days ago`, `2 weeks ago`, `-1 month`, `+3 days`

use std::sync::LazyLock;

use chrono::{DateTime, Days, Months, NaiveDate};
use regex::Regex;
use serde::Deserialize;

use crate::domain::banking::DateRange;

/// Phrase used when `from` is absent.
pub const DEFAULT_FROM: &str = "30 days ago";

/// Phrase used when `to` is absent.
pub const DEFAULT_TO: &str = "today";

const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%Y/%m/%d", "%d.%m.%Y"];

#[allow(clippy::expect_used)]
static RELATIVE_PHRASE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<sign>[+-])?\s*(?P<count>\d{1,6})\s*(?P<unit>day|week|month|year)s?(?P<ago>\s+ago)?$")
        .expect("static relative date pattern is valid")
});

/// Query parameters of `GET /api/transactions`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TransactionsQuery {
    /// Start of the range (inclusive).
    pub from: Option<String>,
    /// End of the range (inclusive).
    pub to: Option<String>,
}

impl TransactionsQuery {
    /// Resolve the query into a date range relative to `today`.
    ///
    /// # Errors
    ///
    /// Returns an error if either date cannot be parsed. An inverted range is
    /// not an error here; it reaches the bank as requested.
    pub fn resolve(&self, today: NaiveDate) -> Result<DateRange, DateParseError> {
        let from = resolve_param("from", self.from.as_deref(), DEFAULT_FROM, today)?;
        let to = resolve_param("to", self.to.as_deref(), DEFAULT_TO, today)?;
        Ok(DateRange::new(from, to))
    }
}

fn resolve_param(
    parameter: &'static str,
    value: Option<&str>,
    default: &str,
    today: NaiveDate,
) -> Result<NaiveDate, DateParseError> {
    let text = value.filter(|v| !v.trim().is_empty()).unwrap_or(default);
    parse_date_phrase(text, today).ok_or_else(|| DateParseError {
        parameter,
        input: text.to_string(),
    })
}

/// Parse free-form date text relative to `today`.
#[must_use]
pub fn parse_date_phrase(input: &str, today: NaiveDate) -> Option<NaiveDate> {
    let text = input.trim().to_lowercase();

    match text.as_str() {
        "today" | "now" | "midnight" => return Some(today),
        "yesterday" => return today.checked_sub_days(Days::new(1)),
        "tomorrow" => return today.checked_add_days(Days::new(1)),
        _ => {}
    }

    if let Some(date) = DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(&text, format).ok())
    {
        return Some(date);
    }

    if let Ok(timestamp) = DateTime::parse_from_rfc3339(input.trim()) {
        return Some(timestamp.date_naive());
    }

    parse_relative(&text, today)
}

fn parse_relative(text: &str, today: NaiveDate) -> Option<NaiveDate> {
    let captures = RELATIVE_PHRASE.captures(text)?;
    let count: u32 = captures.name("count")?.as_str().parse().ok()?;
    let negative_sign = captures.name("sign").is_some_and(|s| s.as_str() == "-");
    let backwards = negative_sign != captures.name("ago").is_some();

    match captures.name("unit")?.as_str() {
        "day" => shift_days(today, u64::from(count), backwards),
        "week" => shift_days(today, u64::from(count) * 7, backwards),
        "month" => shift_months(today, count, backwards),
        "year" => shift_months(today, count.checked_mul(12)?, backwards),
        _ => None,
    }
}

fn shift_days(date: NaiveDate, days: u64, backwards: bool) -> Option<NaiveDate> {
    if backwards {
        date.checked_sub_days(Days::new(days))
    } else {
        date.checked_add_days(Days::new(days))
    }
}

fn shift_months(date: NaiveDate, months: u32, backwards: bool) -> Option<NaiveDate> {
    if backwards {
        date.checked_sub_months(Months::new(months))
    } else {
        date.checked_add_months(Months::new(months))
    }
}

/// Date query parameter that is not a recognised date.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid date '{input}' for parameter '{parameter}'")]
pub struct DateParseError {
    /// `from` or `to`.
    pub parameter: &'static str,
    /// The text as received.
    pub input: String,
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;
    use test_case::test_case;

    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn today() -> NaiveDate {
        date(2024, 3, 31)
    }

    #[test_case("2024-03-01", date(2024, 3, 1); "iso date")]
    #[test_case("2024/03/01", date(2024, 3, 1); "slashed date")]
    #[test_case("01.03.2024", date(2024, 3, 1); "german date")]
    #[test_case("2024-03-01T23:30:00+01:00", date(2024, 3, 1); "rfc3339 timestamp")]
    #[test_case("today", date(2024, 3, 31); "today")]
    #[test_case("  Now ", date(2024, 3, 31); "now with whitespace")]
    #[test_case("yesterday", date(2024, 3, 30); "yesterday")]
    #[test_case("tomorrow", date(2024, 4, 1); "tomorrow")]
    #[test_case("30 days ago", date(2024, 3, 1); "days ago")]
    #[test_case("1 day ago", date(2024, 3, 30); "singular day")]
    #[test_case("2 weeks ago", date(2024, 3, 17); "weeks ago")]
    #[test_case("1 month ago", date(2024, 2, 29); "month ago clamps")]
    #[test_case("1 year ago", date(2023, 3, 31); "year ago")]
    #[test_case("-3 days", date(2024, 3, 28); "negative offset")]
    #[test_case("+3 days", date(2024, 4, 3); "positive offset")]
    fn parses_phrase(input: &str, expected: NaiveDate) {
        assert_eq!(parse_date_phrase(input, today()), Some(expected));
    }

    #[test_case("last tuesday"; "unsupported phrase")]
    #[test_case("2024-13-01"; "invalid month")]
    #[test_case("banana"; "garbage")]
    #[test_case("30 fortnights ago"; "unknown unit")]
    fn rejects_phrase(input: &str) {
        assert_eq!(parse_date_phrase(input, today()), None);
    }

    #[test]
    fn defaults_to_trailing_thirty_days() {
        let range = TransactionsQuery::default().resolve(today()).unwrap();
        assert_eq!(
            range,
            DateRange::trailing_days(today(), DateRange::DEFAULT_LOOKBACK_DAYS)
        );
    }

    #[test]
    fn empty_parameter_uses_default() {
        let query = TransactionsQuery {
            from: Some(String::new()),
            to: Some("  ".to_string()),
        };
        assert_eq!(query.resolve(today()).unwrap().to(), today());
    }

    #[test]
    fn explicit_range_is_echoed() {
        let query = TransactionsQuery {
            from: Some("2024-01-15".to_string()),
            to: Some("2024-02-15".to_string()),
        };
        let range = query.resolve(today()).unwrap();
        assert_eq!(range.from(), date(2024, 1, 15));
        assert_eq!(range.to(), date(2024, 2, 15));
    }

    #[test]
    fn unparseable_parameter_is_named() {
        let query = TransactionsQuery {
            from: None,
            to: Some("someday".to_string()),
        };
        assert_eq!(
            query.resolve(today()).unwrap_err(),
            DateParseError {
                parameter: "to",
                input: "someday".to_string(),
            }
        );
    }

    #[test]
    fn inverted_range_passes_through() {
        let query = TransactionsQuery {
            from: Some("2024-03-10".to_string()),
            to: Some("2024-03-01".to_string()),
        };
        let range = query.resolve(today()).unwrap();
        assert_eq!(range.from(), date(2024, 3, 10));
        assert_eq!(range.to(), date(2024, 3, 1));
    }

    #[test]
    fn unparseable_message_names_input_and_parameter() {
        let query = TransactionsQuery {
            from: Some("whenever".to_string()),
            to: None,
        };
        assert_eq!(
            query.resolve(today()).unwrap_err().to_string(),
            "Invalid date 'whenever' for parameter 'from'"
        );
    }

    proptest! {
        #[test]
        fn days_ago_matches_subtraction(days in 0u64..5_000) {
            let expected = today().checked_sub_days(Days::new(days)).unwrap();
            prop_assert_eq!(parse_date_phrase(&format!("{days} days ago"), today()), Some(expected));
            prop_assert_eq!(parse_date_phrase(&format!("-{days} days"), today()), Some(expected));
        }

        #[test]
        fn iso_dates_round_trip(offset in 0u64..20_000) {
            let date = date(1990, 1, 1).checked_add_days(Days::new(offset)).unwrap();
            let text = date.format("%Y-%m-%d").to_string();
            prop_assert_eq!(parse_date_phrase(&text, today()), Some(date));
        }
    }
}
