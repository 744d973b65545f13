//! Candidate -> Deadline normalization, dedup and ordering.

use std::cmp::Ordering;
use std::collections::HashSet;

use chrono::{DateTime, Utc};
use tracing::{debug, info};

use crate::categorize::categorize;
use crate::date::resolve_date;
use crate::extract::extract_candidates;
use crate::model::Deadline;
use crate::title::{clean_title, generic_label};

/// Build one deadline record from one raw candidate string.
///
/// `now` is the resolution time: it drives year inference and is stamped
/// as `extracted_at`.
pub fn normalize_candidate(raw: &str, now: DateTime<Utc>) -> Deadline {
    let category = categorize(raw);
    let title = clean_title(raw)
        .or_else(|| generic_label(raw).map(str::to_string))
        .unwrap_or_else(|| category.kind.label().to_string());

    Deadline {
        kind: category.kind,
        title,
        due_date: resolve_date(raw, now.date_naive()),
        raw_text: raw.to_string(),
        confidence: category.confidence,
        extracted_at: now,
    }
}

/// Drop undated records and repeated `(title, dueDate)` keys, then sort.
///
/// The first occurrence of a key wins.
pub fn dedup_deadlines(deadlines: Vec<Deadline>) -> Vec<Deadline> {
    let mut seen = HashSet::new();
    let mut kept: Vec<Deadline> = deadlines
        .into_iter()
        .filter(|d| match d.dedup_key() {
            Some(key) => seen.insert(key),
            None => {
                debug!(raw = %d.raw_text, "dropping undated deadline");
                false
            }
        })
        .collect();
    sort_deadlines(&mut kept);
    kept
}

/// Ascending by due date; undated records last, exams before quizzes before
/// assignments among them. Stable, so equal keys keep emission order.
pub fn sort_deadlines(deadlines: &mut [Deadline]) {
    deadlines.sort_by(|a, b| match (a.due_date, b.due_date) {
        (Some(x), Some(y)) => x.cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => a.kind.undated_priority().cmp(&b.kind.undated_priority()),
    });
}

/// Full pipeline: text -> candidates -> records -> deduplicated, sorted list.
pub fn extract_deadlines(text: &str, now: DateTime<Utc>) -> Vec<Deadline> {
    let candidates = extract_candidates(text);
    let records: Vec<Deadline> = candidates
        .iter()
        .map(|c| normalize_candidate(c, now))
        .collect();
    let deadlines = dedup_deadlines(records);
    info!(
        candidates = candidates.len(),
        deadlines = deadlines.len(),
        "extracted deadlines"
    );
    deadlines
}
