//! Title cleanup for raw deadline candidates.
//!
//! Strips role prefixes ("Due:", "Quiz:"), trailing due-phrases and trailing
//! date fragments so "Assignment 1: September 15, 2024" becomes
//! "Assignment 1". When only a date is left, a generic label is taken from
//! keywords in the original text.

use std::sync::LazyLock;

use regex::Regex;

use crate::date::MONTH_PATTERN;

/// Generic labels in lookup order for text that carries no usable title.
pub const GENERIC_LABELS: &[(&str, &str)] = &[
    ("assignment", "Assignment"),
    ("exam", "Exam"),
    ("project", "Project"),
    ("lab", "Lab"),
    ("quiz", "Quiz"),
];

/// Title used when nothing else applies.
pub const DEFAULT_TITLE: &str = "Assignment";

static LEADING_ROLE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\s*(?:due|deadline|assignment|quiz|exam|ends)\s*:\s*")
        .expect("leading role pattern is valid")
});

static TRAILING_DUE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\s*\b(?:due|deadline|ends)\b\s*:?.*$").expect("trailing due pattern is valid")
});

static TRAILING_TEXT_DATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"(?i)\s*[-–—]\s*{MONTH_PATTERN}\s+\d{{1,2}}.*$"))
        .expect("trailing text date pattern is valid")
});

static TRAILING_NUMERIC_DATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\s*\b\d{1,2}/\d{1,2}/\d{2,4}.*$").expect("trailing numeric date pattern is valid")
});

static TRAILING_COLON_DATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"(?i)\s*:\s*{MONTH_PATTERN}\s+\d{{1,2}}.*$"))
        .expect("trailing colon date pattern is valid")
});

static BARE_DATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"(?i)^{MONTH_PATTERN}\s+\d")).expect("bare date pattern is valid")
});

const EDGE_PUNCTUATION: &[char] = &['-', '–', '—', ':', '|', ',', ';', '.'];

/// Strip boilerplate from `raw`. `None` when nothing title-like remains.
pub fn clean_title(raw: &str) -> Option<String> {
    let mut title = LEADING_ROLE.replace(raw.trim(), "").into_owned();
    for pattern in [
        &*TRAILING_DUE,
        &*TRAILING_TEXT_DATE,
        &*TRAILING_NUMERIC_DATE,
        &*TRAILING_COLON_DATE,
    ] {
        title = pattern.replace(&title, "").into_owned();
    }

    let title = title
        .trim_matches(|c: char| c.is_whitespace() || EDGE_PUNCTUATION.contains(&c))
        .to_string();

    if title.is_empty() || BARE_DATE.is_match(&title) {
        None
    } else {
        Some(title)
    }
}

/// Generic label from the first keyword of [`GENERIC_LABELS`] found in `raw`.
pub fn generic_label(raw: &str) -> Option<&'static str> {
    let lower = raw.to_lowercase();
    GENERIC_LABELS
        .iter()
        .find(|(keyword, _)| lower.contains(keyword))
        .map(|(_, label)| *label)
}

/// Clean title for `raw`, never empty.
pub fn normalize_title(raw: &str) -> String {
    clean_title(raw)
        .or_else(|| generic_label(raw).map(str::to_string))
        .unwrap_or_else(|| DEFAULT_TITLE.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_trailing_colon_date() {
        assert_eq!(normalize_title("Assignment 1: September 15, 2024"), "Assignment 1");
        assert_eq!(normalize_title("Final Exam: Dec. 12"), "Final Exam");
    }

    #[test]
    fn strips_role_prefix() {
        assert_eq!(normalize_title("Quiz: Chapter 3 review - Oct 4"), "Chapter 3 review");
        assert_eq!(normalize_title("deadline: Term paper"), "Term paper");
    }

    #[test]
    fn strips_due_suffix() {
        assert_eq!(normalize_title("Lab report due: Nov 2"), "Lab report");
        assert_eq!(normalize_title("Semester ends December 10, 2024"), "Semester");
    }

    #[test]
    fn strips_dash_and_numeric_dates() {
        assert_eq!(normalize_title("Project proposal - March 3, 2025 at noon"), "Project proposal");
        assert_eq!(normalize_title("Essay 2 10/14/2024"), "Essay 2");
    }

    #[test]
    fn bare_date_uses_generic_label() {
        assert_eq!(normalize_title("September 15, 2024"), "Assignment");
        assert_eq!(clean_title("Oct 4"), None);
    }

    #[test]
    fn generic_label_lookup_order() {
        // "exam" is checked before "quiz" regardless of position.
        assert_eq!(generic_label("quiz before the exam"), Some("Exam"));
        assert_eq!(generic_label("lab safety"), Some("Lab"));
        assert_eq!(generic_label("nothing here"), None);
    }

    #[test]
    fn keyword_label_when_only_due_phrase() {
        assert_eq!(normalize_title("Due: Sept 15 (see project page)"), "Project");
    }

    #[test]
    fn never_empty() {
        assert_eq!(normalize_title(""), DEFAULT_TITLE);
        assert_eq!(normalize_title(" - : "), DEFAULT_TITLE);
    }
}
