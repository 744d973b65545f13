//! Storage capability: a small async key-value interface with in-memory and
//! JSON-file backends.

mod error;
mod file;
mod memory;

pub use error::StoreError;
pub use file::FileStore;
pub use memory::MemoryStore;

use async_trait::async_trait;
use serde_json::Value;

/// Get/set access to JSON values by key.
///
/// Implementations may be network- or disk-backed; every failure surfaces as
/// a [`StoreError`] and callers decide how to degrade.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Value stored under `key`, or `None` if the key was never set.
    async fn get(&self, key: &str) -> Result<Option<Value>, StoreError>;

    /// Store `value` under `key`, replacing any previous value.
    async fn set(&self, key: &str, value: Value) -> Result<(), StoreError>;
}

