//! Deadline records and per-course snapshots.

use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Semantic kind of a deadline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeadlineType {
    Assignment,
    Quiz,
    Exam,
}

impl DeadlineType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Assignment => "assignment",
            Self::Quiz => "quiz",
            Self::Exam => "exam",
        }
    }

    /// Capitalized form used as a last-resort title.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Assignment => "Assignment",
            Self::Quiz => "Quiz",
            Self::Exam => "Exam",
        }
    }

    /// Display tag for UI collaborators.
    pub fn icon(&self) -> &'static str {
        match self {
            Self::Assignment => "📝",
            Self::Quiz => "✏️",
            Self::Exam => "🎓",
        }
    }

    /// Ordering weight among undated records: exams first, then quizzes.
    pub fn undated_priority(&self) -> u8 {
        match self {
            Self::Exam => 0,
            Self::Quiz => 1,
            Self::Assignment => 2,
        }
    }
}

impl fmt::Display for DeadlineType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One canonical deadline produced from one raw candidate string.
///
/// Never mutated after creation. Identity for dedup is `(title, due_date)`;
/// `raw_text`, `confidence` and `extracted_at` are provenance only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Deadline {
    #[serde(rename = "type")]
    pub kind: DeadlineType,
    pub title: String,
    pub due_date: Option<NaiveDate>,
    pub raw_text: String,
    pub confidence: f32,
    pub extracted_at: DateTime<Utc>,
}

impl Deadline {
    /// Dedup key: `title:dueDate`. `None` for undated records, which never survive dedup.
    pub fn dedup_key(&self) -> Option<String> {
        self.due_date.map(|d| format!("{}:{}", self.title, d))
    }

    /// Cross-snapshot identity used when diffing: `title:type`.
    pub fn diff_key(&self) -> String {
        format!("{}:{}", self.title, self.kind)
    }

    /// `type:title:dueDate` line fed into the snapshot hash.
    fn hash_line(&self) -> String {
        let due = self.due_date.map(|d| d.to_string()).unwrap_or_default();
        format!("{}:{}:{}", self.kind, self.title, due)
    }
}

/// Last-known deadline list for one course.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub deadlines: Vec<Deadline>,
    pub hash: String,
    pub timestamp: DateTime<Utc>,
}

impl Snapshot {
    pub fn new(deadlines: Vec<Deadline>, timestamp: DateTime<Utc>) -> Self {
        let hash = deadlines_hash(&deadlines);
        Self {
            deadlines,
            hash,
            timestamp,
        }
    }
}

/// Order-independent checksum over the `(type, title, dueDate)` triples.
///
/// Lines are sorted before hashing, so emission order never affects the result.
pub fn deadlines_hash(deadlines: &[Deadline]) -> String {
    let mut lines: Vec<String> = deadlines.iter().map(Deadline::hash_line).collect();
    lines.sort();

    let mut hasher = Sha256::new();
    hasher.update(lines.join("\n").as_bytes());
    hasher
        .finalize()
        .iter()
        .map(|b| format!("{b:02x}"))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn deadline(kind: DeadlineType, title: &str, due: Option<(i32, u32, u32)>) -> Deadline {
        Deadline {
            kind,
            title: title.into(),
            due_date: due.and_then(|(y, m, d)| NaiveDate::from_ymd_opt(y, m, d)),
            raw_text: title.into(),
            confidence: 0.9,
            extracted_at: DateTime::parse_from_rfc3339("2024-09-01T12:00:00Z")
                .unwrap()
                .with_timezone(&Utc),
        }
    }

    #[test]
    fn json_uses_camel_case_contract() {
        let d = deadline(DeadlineType::Quiz, "Quiz 1", Some((2024, 9, 15)));
        let json = serde_json::to_value(&d).unwrap();
        assert_eq!(json["type"], "quiz");
        assert_eq!(json["dueDate"], "2024-09-15");
        assert_eq!(json["rawText"], "Quiz 1");
        assert!(json.get("extractedAt").is_some());

        let parsed: Deadline = serde_json::from_value(json).unwrap();
        assert_eq!(parsed, d);
    }

    #[test]
    fn undated_serializes_as_null() {
        let d = deadline(DeadlineType::Exam, "Final", None);
        let json = serde_json::to_value(&d).unwrap();
        assert!(json["dueDate"].is_null());
        assert_eq!(d.dedup_key(), None);
    }

    #[test]
    fn keys() {
        let d = deadline(DeadlineType::Assignment, "Essay", Some((2024, 9, 15)));
        assert_eq!(d.dedup_key().as_deref(), Some("Essay:2024-09-15"));
        assert_eq!(d.diff_key(), "Essay:assignment");
    }

    #[test]
    fn hash_ignores_order() {
        let a = deadline(DeadlineType::Assignment, "Essay", Some((2024, 9, 15)));
        let b = deadline(DeadlineType::Exam, "Midterm", Some((2024, 10, 2)));
        assert_eq!(
            deadlines_hash(&[a.clone(), b.clone()]),
            deadlines_hash(&[b, a])
        );
    }

    #[test]
    fn hash_ignores_provenance_but_not_dates() {
        let a = deadline(DeadlineType::Assignment, "Essay", Some((2024, 9, 15)));
        let mut same = a.clone();
        same.confidence = 0.3;
        same.raw_text = "something else".into();
        assert_eq!(deadlines_hash(&[a.clone()]), deadlines_hash(&[same]));

        let moved = deadline(DeadlineType::Assignment, "Essay", Some((2024, 9, 22)));
        assert_ne!(deadlines_hash(&[a]), deadlines_hash(&[moved]));
    }

    #[test]
    fn hash_is_hex_sha256() {
        let h = deadlines_hash(&[]);
        assert_eq!(h.len(), 64);
        assert!(h.chars().all(|c| c.is_ascii_hexdigit()));
    }
}
