//! Key-value storage backends
//!
//! Every backend implements [`KvStore`], whose mutating methods are atomic
//! at the single-record level. Uniqueness is decided inside
//! [`KvStore::insert_if_absent`] under the backend's own lock, never by a
//! separate lookup followed by a write.
//!
//! ## [`MemoryStore`]
//! One map behind one read-write lock. Simple and predictable.
//!
//! ## [`ShardedStore`]
//! Keys are partitioned across several maps, each with its own lock, so
//! requests for different keys rarely contend.

use serde::{Deserialize, Serialize};
use serde_json::Value;


mod memory;
mod sharded;

pub use memory::MemoryStore;
pub use sharded::{ShardedStore, ShardedStoreBuilder};

/// One stored key and its value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyValueRecord {
    pub key: String,
    pub value: Value,
}

impl KeyValueRecord {
    pub fn new(key: impl Into<String>, value: Value) -> Self {
        KeyValueRecord {
            key: key.into(),
            value,
        }
    }
}

/// Store trait for key-value state
///
/// Implementations use interior locking so one instance can be shared
/// across request tasks.
pub trait KvStore: Send + Sync {
    /// Insert `value` under `key` unless the key is already present
    ///
    /// Returns `false`, leaving the existing value untouched, if the key exists.
    fn insert_if_absent(&self, key: &str, value: Value) -> bool;

    /// Replace the value of an existing key
    ///
    /// Returns `false` without inserting if the key is absent.
    fn replace_if_present(&self, key: &str, value: Value) -> bool;

    /// Get value
    fn get(&self, key: &str) -> Option<Value>;

    /// Remove a key, returning whether it was present
    fn remove(&self, key: &str) -> bool;

    /// Snapshot of every record, in no particular order
    fn records(&self) -> Vec<KeyValueRecord>;

    /// Number of stored records
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
