//! Change detection: compares each scrape of a course with its last stored
//! snapshot and reports additions, removals and date changes.

mod detector;

pub use detector::{ChangeDetector, ChangeReport, Modification, SNAPSHOT_KEY, diff};
