use super::{KeyValueRecord, KvStore};
use parking_lot::RwLock;
use serde_json::Value;
use std::collections::hash_map::Entry;
use std::hash::BuildHasher;

#[cfg(feature = "ahash")]
use ahash::{AHashMap as HashMap, RandomState};
#[cfg(not(feature = "ahash"))]
use std::collections::{HashMap, hash_map::RandomState};

// Configuration constants
const DEFAULT_CAPACITY: usize = 1000;
const DEFAULT_SHARD_COUNT: usize = 16;
const CAPACITY_OVERHEAD_FACTOR: f64 = 1.3;

/// Sharded in-memory store for improved concurrency
///
/// Keys are partitioned across multiple maps, each behind its own lock.
/// A record lives in exactly one shard, so every single-record operation
/// stays atomic while unrelated keys proceed in parallel.
///
/// # Example
///
/// ```
/// use kvgate::{KvStore, ShardedStore};
/// use serde_json::json;
///
/// let store = ShardedStore::builder()
///     .capacity(10_000)
///     .shard_count(32)
///     .build();
///
/// assert!(store.insert_if_absent("user:1", json!({"name": "ada"})));
/// assert!(store.replace_if_present("user:1", json!({"name": "grace"})));
/// ```
pub struct ShardedStore {
    shards: Vec<RwLock<HashMap<String, Value>>>,
    hasher: RandomState,
}

/// Builder for configuring a ShardedStore
pub struct ShardedStoreBuilder {
    capacity: usize,
    shard_count: usize,
}

impl ShardedStore {
    /// Create a new ShardedStore with default configuration
    ///
    /// Uses 16 shards and a total capacity of 1000 entries.
    pub fn new() -> Self {
        Self::builder().build()
    }

    pub fn builder() -> ShardedStoreBuilder {
        ShardedStoreBuilder {
            capacity: DEFAULT_CAPACITY,
            shard_count: DEFAULT_SHARD_COUNT,
        }
    }

    fn with_config(capacity: usize, shard_count: usize) -> Self {
        let shard_count = shard_count.max(1);
        let per_shard = ((capacity as f64 * CAPACITY_OVERHEAD_FACTOR) as usize) / shard_count;

        ShardedStore {
            shards: (0..shard_count)
                .map(|_| RwLock::new(HashMap::with_capacity(per_shard)))
                .collect(),
            hasher: RandomState::new(),
        }
    }

    pub fn shard_count(&self) -> usize {
        self.shards.len()
    }

    /// Get the shard a key belongs to
    fn shard(&self, key: &str) -> &RwLock<HashMap<String, Value>> {
        let index = (self.hasher.hash_one(key) as usize) % self.shards.len();
        &self.shards[index]
    }
}

impl Default for ShardedStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ShardedStoreBuilder {
    /// Set the expected total number of keys
    pub fn capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    /// Set the number of shards (at least one is always created)
    pub fn shard_count(mut self, shard_count: usize) -> Self {
        self.shard_count = shard_count;
        self
    }

    pub fn build(self) -> ShardedStore {
        ShardedStore::with_config(self.capacity, self.shard_count)
    }
}

impl KvStore for ShardedStore {
    fn insert_if_absent(&self, key: &str, value: Value) -> bool {
        match self.shard(key).write().entry(key.to_string()) {
            Entry::Occupied(_) => false,
            Entry::Vacant(slot) => {
                slot.insert(value);
                true
            }
        }
    }

    fn replace_if_present(&self, key: &str, value: Value) -> bool {
        match self.shard(key).write().get_mut(key) {
            Some(current) => {
                *current = value;
                true
            }
            None => false,
        }
    }

    fn get(&self, key: &str) -> Option<Value> {
        self.shard(key).read().get(key).cloned()
    }

    fn remove(&self, key: &str) -> bool {
        self.shard(key).write().remove(key).is_some()
    }

    fn records(&self) -> Vec<KeyValueRecord> {
        // Shards are read one at a time; the snapshot is per-shard consistent
        let mut records = Vec::with_capacity(self.len());
        for shard in &self.shards {
            records.extend(
                shard
                    .read()
                    .iter()
                    .map(|(key, value)| KeyValueRecord::new(key.clone(), value.clone())),
            );
        }
        records
    }

    fn len(&self) -> usize {
        self.shards.iter().map(|shard| shard.read().len()).sum()
    }
}
