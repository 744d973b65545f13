//! Keyword-proximity categorization of deadline text.
//!
//! The keyword table is an ordered list: types are scanned in declaration
//! order and the first type with any keyword present wins. The order is
//! therefore also the tie-break for ambiguous text.

use crate::model::DeadlineType;

/// Ordered `type -> keywords` table. Earlier rows win.
pub const KEYWORDS: &[(DeadlineType, &[&str])] = &[
    (
        DeadlineType::Assignment,
        &[
            "assignment",
            "homework",
            "project",
            "report",
            "essay",
            "submission",
            "lab",
        ],
    ),
    (
        DeadlineType::Quiz,
        &["quiz", "test", "midterm", "assessment", "evaluation"],
    ),
    (DeadlineType::Exam, &["exam", "final", "examination"]),
];

/// Confidence when no keyword is found at all.
pub const DEFAULT_CONFIDENCE: f32 = 0.3;

/// Result of categorizing one piece of text.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Category {
    pub kind: DeadlineType,
    pub icon: &'static str,
    pub confidence: f32,
}

impl Category {
    fn new(kind: DeadlineType, confidence: f32) -> Self {
        Self {
            kind,
            icon: kind.icon(),
            confidence,
        }
    }
}

/// Assign a type and confidence to `text`.
///
/// Confidence reflects how early the matching keyword appears: within the
/// first three whitespace tokens scores 0.9, within the first six 0.7, later
/// 0.5. Text with no keyword defaults to an assignment at 0.3.
pub fn categorize(text: &str) -> Category {
    let lower = text.to_lowercase();

    for (kind, keywords) in KEYWORDS {
        if let Some(keyword) = keywords.iter().find(|k| lower.contains(*k)) {
            return Category::new(*kind, keyword_confidence(&lower, keyword));
        }
    }

    Category::new(DeadlineType::Assignment, DEFAULT_CONFIDENCE)
}

fn keyword_confidence(lower: &str, keyword: &str) -> f32 {
    match lower.split_whitespace().position(|tok| tok.contains(keyword)) {
        Some(i) if i < 3 => 0.9,
        Some(i) if i < 6 => 0.7,
        _ => 0.5,
    }
}
