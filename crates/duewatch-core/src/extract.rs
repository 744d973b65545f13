//! Candidate extraction: find probable deadline mentions in free text.
//!
//! Each matcher scans the whole text independently and may fire any number
//! of times. A match yields an optional context label and a date fragment;
//! fragments that fail [`looks_like_date`] are discarded. Candidates are
//! `"<label>: <date>"` (or just `"<date>"`) with delimiter noise removed.
//!
//! Textually identical candidates collapse here. Semantic dedup on
//! `(title, dueDate)` happens later in [`crate::normalize`].

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::{Captures, Regex};
use tracing::debug;

use crate::date::{MONTH_PATTERN, looks_like_date};

/// Labels longer than this many words keep only their tail.
const MAX_LABEL_WORDS: usize = 8;

static DUE_WORD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:due|deadline|submit)\b").expect("due word pattern is valid")
});

// Sentence end followed by a capitalized word, or a semicolon.
static SENTENCE_BREAK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"([.!?])\s+(\p{Lu})|;").expect("sentence break pattern is valid")
});

/// Words that end in a period without ending a sentence.
const ABBREVIATIONS: &[&str] = &[
    "approx", "ch", "dr", "e.g", "fig", "i.e", "mr", "mrs", "ms", "no", "pp", "prof", "pt", "sec",
    "st", "vol", "vs", "wk",
];

/// Where a matcher's context label comes from.
enum Label {
    /// Free text in this capture group, trimmed to its tail.
    Context(usize),
    /// A course/term/semester word in this group, rendered as "<Word> end".
    PeriodEnd(usize),
}

/// A single named pattern plus the capture groups holding its label and date.
struct Matcher {
    name: &'static str,
    regex: Regex,
    label: Label,
    date: usize,
}

impl Matcher {
    fn new(name: &'static str, pattern: &str, label: Label, date: usize) -> Self {
        Self {
            name,
            regex: Regex::new(pattern).expect("candidate pattern is valid"),
            label,
            date,
        }
    }

    fn label_of(&self, caps: &Captures<'_>) -> Option<String> {
        let label = match self.label {
            Label::Context(i) => tidy_label(caps.get(i)?.as_str()),
            Label::PeriodEnd(i) => format!("{} end", capitalize(caps.get(i)?.as_str())),
        };
        (!label.is_empty()).then_some(label)
    }
}

/// Ordered matchers. Order only affects which spelling of a duplicate is seen first.
static MATCHERS: LazyLock<Vec<Matcher>> = LazyLock::new(|| {
    let day = r"\d{1,2}(?:st|nd|rd|th)?";
    let full = format!(r"{MONTH_PATTERN}\s+{day},?\s+\d{{4}}");
    let partial = format!(r"{MONTH_PATTERN}\s+{day}(?:,?\s+\d{{4}})?");
    vec![
        // "Assignment 1 - Due September 15, 2024"
        Matcher::new(
            "label-dash-due",
            &format!(r"(?im)^[ \t]*([^\n|]+?)\s+[-–—]\s+due\b\s*:?\s*(?:on\s+|by\s+)?({full})"),
            Label::Context(1),
            2,
        ),
        // "| Midterm | 25% | Oct 20 |"
        Matcher::new(
            "table-row",
            &format!(r"(?im)^[ \t|]*([^|\n]+?)\s*\|\s*\d{{1,3}}(?:\.\d+)?\s*%\s*\|\s*({partial})"),
            Label::Context(1),
            2,
        ),
        // "Essay draft due on March 3, 2025", "Deadline: Nov 2"
        Matcher::new(
            "due-phrase",
            &format!(r"(?im)([^\n|]*?)\b(?:due|deadline|submit)\b(?:\s+(?:on|by|before))?\s*:?\s*({partial})"),
            Label::Context(1),
            2,
        ),
        // "The semester ends December 10, 2024"
        Matcher::new(
            "term-end",
            &format!(r"(?i)\b(course|term|semester|class)\s+ends?\b(?:\s+on)?\s*:?\s*({full})"),
            Label::PeriodEnd(1),
            2,
        ),
    ]
});

/// Unique candidate strings in first-discovery order.
pub fn extract_candidates(text: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut candidates = Vec::new();

    for matcher in MATCHERS.iter() {
        for caps in matcher.regex.captures_iter(text) {
            let Some(fragment) = caps.get(matcher.date).map(|m| m.as_str()) else {
                continue;
            };
            if !looks_like_date(fragment) {
                debug!(matcher = matcher.name, fragment, "rejected date fragment");
                continue;
            }

            let candidate = match matcher.label_of(&caps) {
                Some(label) if !DUE_WORD.is_match(&label) => format!("{label}: {fragment}"),
                _ => fragment.to_string(),
            };
            let candidate = clean_candidate(&candidate);
            if candidate.is_empty() {
                continue;
            }

            if seen.insert(candidate.clone()) {
                debug!(matcher = matcher.name, candidate = %candidate, "found candidate");
                candidates.push(candidate);
            }
        }
    }

    candidates
}

/// Trim a captured label to its last sentence and at most [`MAX_LABEL_WORDS`] words.
fn tidy_label(raw: &str) -> String {
    let clause = &raw[last_sentence_start(raw)..];
    let words: Vec<&str> = clause.split_whitespace().collect();
    let start = words.len().saturating_sub(MAX_LABEL_WORDS);
    clean_candidate(&words[start..].join(" "))
}

/// Byte offset where the last sentence of `raw` begins.
///
/// Periods inside numbering ("Lab 2.1") or after abbreviations ("Ch. 3",
/// "Dr. Smith") do not end a sentence. Parentheses never do.
fn last_sentence_start(raw: &str) -> usize {
    let mut start = 0;
    for caps in SENTENCE_BREAK.captures_iter(raw) {
        match (caps.get(1), caps.get(2)) {
            (Some(mark), Some(next)) => {
                if mark.as_str() == "." && ends_with_abbreviation(&raw[..mark.start()]) {
                    continue;
                }
                start = next.start();
            }
            _ => {
                if let Some(semicolon) = caps.get(0) {
                    start = semicolon.end();
                }
            }
        }
    }
    start
}

fn ends_with_abbreviation(before: &str) -> bool {
    let Some(word) = before.split_whitespace().last() else {
        return false;
    };
    let word = word
        .trim_start_matches(|c: char| !c.is_alphanumeric())
        .to_lowercase();
    let single_initial = word.chars().count() == 1 && word.chars().all(char::is_alphabetic);
    single_initial || ABBREVIATIONS.contains(&word.as_str())
}

/// Drop table pipes and bullet/dash debris, collapse whitespace.
fn clean_candidate(s: &str) -> String {
    let without_pipes = s.replace('|', " ");
    let collapsed = without_pipes.split_whitespace().collect::<Vec<_>>().join(" ");
    collapsed
        .trim_matches(|c: char| {
            c.is_whitespace() || matches!(c, '-' | '–' | '—' | '*' | '•' | ':' | ',')
        })
        .to_string()
}

fn capitalize(word: &str) -> String {
    let lower = word.to_lowercase();
    let mut chars = lower.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
