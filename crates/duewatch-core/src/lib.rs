//! Course-outline deadline extraction.
//!
//! Pure, synchronous stages: candidate extraction, categorization, date
//! resolution, title cleanup, normalization and dedup. None of them read a
//! clock; the resolution time is always passed in.

pub mod categorize;
pub mod date;
pub mod extract;
pub mod model;
pub mod normalize;
pub mod title;

pub use categorize::{Category, categorize};
pub use date::resolve_date;
pub use extract::extract_candidates;
pub use model::{Deadline, DeadlineType, Snapshot, deadlines_hash};
pub use normalize::{dedup_deadlines, extract_deadlines, normalize_candidate, sort_deadlines};
pub use title::normalize_title;
