//! Date resolution for free-text deadline fragments.
//!
//! Tries patterns from most to least specific and returns the first one that
//! yields a real calendar date:
//!
//! 1. Month name + day + 4-digit year: "September 15, 2024", "Sept. 15th 2024"
//! 2. Month name + day, year inferred: "Sept 15"
//! 3. Numeric US form: "09/15/2024"
//! 4. ISO form: "2024-09-15"
//!
//! A fragment either resolves completely or not at all; there is no partial
//! result.

use std::sync::LazyLock;

use chrono::{Datelike, NaiveDate};
use regex::Regex;

/// Alternation matching English month names and their common abbreviations.
///
/// Longer forms come first inside each group so "September" is not cut to "Sep".
pub const MONTH_PATTERN: &str = r"(?:jan(?:uary)?|feb(?:ruary)?|mar(?:ch)?|apr(?:il)?|may|june?|july?|aug(?:ust)?|sep(?:t(?:ember)?)?|oct(?:ober)?|nov(?:ember)?|dec(?:ember)?)\.?";

static MONTH_DAY_YEAR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"(?i)\b({MONTH_PATTERN})\s+(\d{{1,2}})(?:st|nd|rd|th)?\b,?\s+(\d{{4}})\b"
    ))
    .expect("month-day-year pattern is valid")
});

static MONTH_DAY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"(?i)\b({MONTH_PATTERN})\s+(\d{{1,2}})(?:st|nd|rd|th)?\b"
    ))
    .expect("month-day pattern is valid")
});

static NUMERIC_US: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(\d{1,2})/(\d{1,2})/(\d{4})\b").expect("numeric date pattern is valid")
});

static ISO: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(\d{4})-(\d{2})-(\d{2})\b").expect("iso date pattern is valid")
});

static HAS_MONTH: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"(?i)\b{MONTH_PATTERN}")).expect("month pattern is valid")
});

static HAS_DAY_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b\d{1,2}(?:st|nd|rd|th)?\b").expect("day pattern is valid"));

/// Month number (1-12) for an English month name or abbreviation.
///
/// Only the first three letters are significant, so "Sept", "Sep." and
/// "September" all map to 9.
pub fn month_number(name: &str) -> Option<u32> {
    let prefix: String = name
        .chars()
        .filter(|c| c.is_ascii_alphabetic())
        .take(3)
        .collect::<String>()
        .to_ascii_lowercase();
    let month = match prefix.as_str() {
        "jan" => 1,
        "feb" => 2,
        "mar" => 3,
        "apr" => 4,
        "may" => 5,
        "jun" => 6,
        "jul" => 7,
        "aug" => 8,
        "sep" => 9,
        "oct" => 10,
        "nov" => 11,
        "dec" => 12,
        _ => return None,
    };
    Some(month)
}

/// Lightweight screen used by the extractor before a fragment becomes a candidate.
///
/// Passes when the text names a month and carries a 1-2 digit number.
pub fn looks_like_date(text: &str) -> bool {
    HAS_MONTH.is_match(text) && HAS_DAY_NUMBER.is_match(text)
}

/// Resolve the first date in `text`, inferring a missing year relative to `today`.
///
/// A month earlier than `today`'s month rolls into the next year; the same or
/// a later month stays in the current year.
pub fn resolve_date(text: &str, today: NaiveDate) -> Option<NaiveDate> {
    month_day_year(text)
        .or_else(|| month_day(text, today))
        .or_else(|| numeric_us(text))
        .or_else(|| iso(text))
}

fn month_day_year(text: &str) -> Option<NaiveDate> {
    let caps = MONTH_DAY_YEAR.captures(text)?;
    let month = month_number(&caps[1])?;
    let day: u32 = caps[2].parse().ok()?;
    let year: i32 = caps[3].parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}

fn month_day(text: &str, today: NaiveDate) -> Option<NaiveDate> {
    let caps = MONTH_DAY.captures(text)?;
    let month = month_number(&caps[1])?;
    let day: u32 = caps[2].parse().ok()?;
    NaiveDate::from_ymd_opt(infer_year(month, today), month, day)
}

fn numeric_us(text: &str) -> Option<NaiveDate> {
    let caps = NUMERIC_US.captures(text)?;
    let month: u32 = caps[1].parse().ok()?;
    let day: u32 = caps[2].parse().ok()?;
    let year: i32 = caps[3].parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}

fn iso(text: &str) -> Option<NaiveDate> {
    let caps = ISO.captures(text)?;
    let year: i32 = caps[1].parse().ok()?;
    let month: u32 = caps[2].parse().ok()?;
    let day: u32 = caps[3].parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}

/// Year for a month given without one.
pub fn infer_year(month: u32, today: NaiveDate) -> i32 {
    if month < today.month() {
        today.year() + 1
    } else {
        today.year()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn explicit_year() {
        let today = ymd(2030, 1, 1);
        assert_eq!(resolve_date("September 15, 2024", today), Some(ymd(2024, 9, 15)));
        assert_eq!(resolve_date("due Sept. 15th 2024", today), Some(ymd(2024, 9, 15)));
    }

    #[test]
    fn missing_year_rolls_forward_when_month_has_passed() {
        assert_eq!(resolve_date("September 15", ymd(2024, 10, 1)), Some(ymd(2025, 9, 15)));
    }

    #[test]
    fn missing_year_stays_when_month_is_ahead() {
        assert_eq!(resolve_date("September 15", ymd(2024, 6, 1)), Some(ymd(2024, 9, 15)));
    }

    #[test]
    fn missing_year_same_month_stays() {
        assert_eq!(resolve_date("Oct 2", ymd(2024, 10, 20)), Some(ymd(2024, 10, 2)));
    }

    #[test]
    fn numeric_and_iso() {
        let today = ymd(2024, 1, 1);
        assert_eq!(resolve_date("Lab 2: 03/07/2025", today), Some(ymd(2025, 3, 7)));
        assert_eq!(resolve_date("posted 2024-11-30", today), Some(ymd(2024, 11, 30)));
    }

    #[test]
    fn invalid_calendar_date_falls_through() {
        let today = ymd(2024, 1, 1);
        assert_eq!(resolve_date("February 30, 2024", today), None);
        // The impossible textual date is skipped in favour of a later valid pattern.
        assert_eq!(
            resolve_date("February 30, 2024 (moved to 2024-03-01)", today),
            Some(ymd(2024, 3, 1))
        );
    }

    #[test]
    fn no_date() {
        let today = ymd(2024, 1, 1);
        assert_eq!(resolve_date("Late submission policy", today), None);
        assert_eq!(resolve_date("September 2024", today), None);
    }

    #[test]
    fn month_numbers() {
        assert_eq!(month_number("Sept"), Some(9));
        assert_eq!(month_number("sep."), Some(9));
        assert_eq!(month_number("DECEMBER"), Some(12));
        assert_eq!(month_number("Smarch"), None);
    }

    #[test]
    fn date_screen() {
        assert!(looks_like_date("October 3"));
        assert!(looks_like_date("Nov 21st, 2024"));
        assert!(!looks_like_date("Week 3"));
        assert!(!looks_like_date("October"));
    }
}
