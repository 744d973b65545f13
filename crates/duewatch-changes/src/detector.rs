//! Snapshot-vs-snapshot change detection per course.
//!
//! All snapshots live under one namespaced key ([`SNAPSHOT_KEY`]) as a map of
//! `course_id -> Snapshot`. Detection for one course is serialized by a
//! per-course lock; the final write of the shared map is serialized across
//! courses and always re-reads the map first, so parallel detections for
//! different courses never drop each other's snapshot.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use duewatch_core::{Deadline, Snapshot, deadlines_hash};
use duewatch_store::{KeyValueStore, StoreError};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};

/// Storage key holding every course's snapshot.
pub const SNAPSHOT_KEY: &str = "course_snapshots";

/// A deadline matched across snapshots whose due date moved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Modification {
    pub old: Deadline,
    pub new: Deadline,
}

/// Outcome of one scrape compared against the stored snapshot.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeReport {
    pub has_changes: bool,
    pub is_first_scrape: bool,
    pub added: Vec<Deadline>,
    pub removed: Vec<Deadline>,
    pub modified: Vec<Modification>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ChangeReport {
    fn first_scrape(deadlines: Vec<Deadline>) -> Self {
        Self {
            has_changes: true,
            is_first_scrape: true,
            added: deadlines,
            ..Self::default()
        }
    }

    fn unchanged() -> Self {
        Self::default()
    }

    fn failed(message: String) -> Self {
        Self {
            error: Some(message),
            ..Self::default()
        }
    }
}

/// Diff two deadline lists keyed by `title:type`.
///
/// A record whose date moved is a modification. A record whose type changed
/// gets a new key, so it shows up as one removal plus one addition.
pub fn diff(old: &[Deadline], new: &[Deadline]) -> ChangeReport {
    let old_by_key: BTreeMap<String, &Deadline> = old.iter().map(|d| (d.diff_key(), d)).collect();
    let new_by_key: BTreeMap<String, &Deadline> = new.iter().map(|d| (d.diff_key(), d)).collect();

    let mut report = ChangeReport::default();
    for (key, current) in &new_by_key {
        match old_by_key.get(key) {
            None => report.added.push((*current).clone()),
            Some(previous) if previous.due_date != current.due_date => {
                report.modified.push(Modification {
                    old: (*previous).clone(),
                    new: (*current).clone(),
                });
            }
            Some(_) => {}
        }
    }
    for (key, previous) in &old_by_key {
        if !new_by_key.contains_key(key) {
            report.removed.push((*previous).clone());
        }
    }

    report.has_changes =
        !report.added.is_empty() || !report.removed.is_empty() || !report.modified.is_empty();
    report
}

/// Compares each scrape of a course against its last snapshot and keeps the
/// snapshot store current.
pub struct ChangeDetector<S> {
    store: S,
    course_locks: Mutex<HashMap<String, Arc<tokio::sync::Mutex<()>>>>,
    map_lock: tokio::sync::Mutex<()>,
}

impl<S: KeyValueStore> ChangeDetector<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            course_locks: Mutex::new(HashMap::new()),
            map_lock: tokio::sync::Mutex::new(()),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Compare `current` against the stored snapshot for `course_id`, stamping
    /// any new snapshot with the wall clock.
    pub async fn detect_changes(&self, course_id: &str, current: &[Deadline]) -> ChangeReport {
        self.detect_changes_at(course_id, current, Utc::now()).await
    }

    /// As [`detect_changes`](Self::detect_changes) with an explicit snapshot timestamp.
    ///
    /// Never fails: storage errors are logged and reported through
    /// [`ChangeReport::error`] with `has_changes: false`.
    pub async fn detect_changes_at(
        &self,
        course_id: &str,
        current: &[Deadline],
        now: DateTime<Utc>,
    ) -> ChangeReport {
        let lock = self.course_lock(course_id);
        let result = {
            let _guard = lock.lock().await;
            self.compare_and_store(course_id, current, now).await
        };
        self.release_course_lock(course_id, lock);

        match result {
            Ok(report) => report,
            Err(e) => {
                error!(course_id, error = %e, "change detection failed");
                ChangeReport::failed(e.to_string())
            }
        }
    }

    async fn compare_and_store(
        &self,
        course_id: &str,
        current: &[Deadline],
        now: DateTime<Utc>,
    ) -> Result<ChangeReport, StoreError> {
        let previous = self.snapshot(course_id).await?;
        let current_hash = deadlines_hash(current);

        let report = match previous {
            None => {
                self.save(course_id, Snapshot::new(current.to_vec(), now)).await?;
                info!(course_id, count = current.len(), "first scrape stored");
                ChangeReport::first_scrape(current.to_vec())
            }
            Some(previous) if previous.hash == current_hash => {
                debug!(course_id, hash = %current_hash, "snapshot unchanged");
                ChangeReport::unchanged()
            }
            Some(previous) => {
                let report = diff(&previous.deadlines, current);
                self.save(course_id, Snapshot::new(current.to_vec(), now)).await?;
                info!(
                    course_id,
                    added = report.added.len(),
                    removed = report.removed.len(),
                    modified = report.modified.len(),
                    "snapshot updated"
                );
                report
            }
        };
        Ok(report)
    }

    /// Stored snapshot for `course_id`, if any.
    pub async fn snapshot(&self, course_id: &str) -> Result<Option<Snapshot>, StoreError> {
        let mut all = self.load_all().await?;
        Ok(all.remove(course_id))
    }

    /// Drop the stored snapshot for `course_id`. Returns whether one existed.
    pub async fn forget(&self, course_id: &str) -> Result<bool, StoreError> {
        let lock = self.course_lock(course_id);
        let result = {
            let _guard = lock.lock().await;
            self.remove_snapshot(course_id).await
        };
        self.release_course_lock(course_id, lock);
        result
    }

    async fn remove_snapshot(&self, course_id: &str) -> Result<bool, StoreError> {
        let _map_guard = self.map_lock.lock().await;
        let mut all = self.load_all().await?;
        if all.remove(course_id).is_none() {
            return Ok(false);
        }
        self.store.set(SNAPSHOT_KEY, serde_json::to_value(&all)?).await?;
        info!(course_id, "snapshot removed");
        Ok(true)
    }

    /// Every stored snapshot, keyed by course.
    pub async fn load_all(&self) -> Result<BTreeMap<String, Snapshot>, StoreError> {
        match self.store.get(SNAPSHOT_KEY).await? {
            Some(value) => Ok(serde_json::from_value(value)?),
            None => Ok(BTreeMap::new()),
        }
    }

    async fn save(&self, course_id: &str, snapshot: Snapshot) -> Result<(), StoreError> {
        let _map_guard = self.map_lock.lock().await;
        let mut all = self.load_all().await?;
        all.insert(course_id.to_string(), snapshot);
        self.store.set(SNAPSHOT_KEY, serde_json::to_value(&all)?).await
    }

    fn course_lock(&self, course_id: &str) -> Arc<tokio::sync::Mutex<()>> {
        let mut locks = self
            .course_locks
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        Arc::clone(locks.entry(course_id.to_string()).or_default())
    }

    /// Drop our handle and forget the course's lock if nobody else holds it.
    /// Clones are only taken under `course_locks`, so a count of one here
    /// means no task is waiting on it.
    fn release_course_lock(&self, course_id: &str, lock: Arc<tokio::sync::Mutex<()>>) {
        drop(lock);
        let mut locks = self
            .course_locks
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if locks.get(course_id).is_some_and(|l| Arc::strong_count(l) == 1) {
            locks.remove(course_id);
        }
    }
}
