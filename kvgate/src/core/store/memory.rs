use super::{KeyValueRecord, KvStore};
use parking_lot::RwLock;
use serde_json::Value;
use std::collections::hash_map::Entry;

#[cfg(feature = "ahash")]
use ahash::AHashMap as HashMap;
#[cfg(not(feature = "ahash"))]
use std::collections::HashMap;

// Configuration constants
const DEFAULT_CAPACITY: usize = 1000;
const CAPACITY_OVERHEAD_FACTOR: f64 = 1.3;

/// Single-lock in-memory store
///
/// Reads share the lock; every mutation takes it exclusively for exactly
/// one map operation.
///
/// # Example
///
/// ```
/// use kvgate::{KvStore, MemoryStore};
/// use serde_json::json;
///
/// let store = MemoryStore::new();
/// assert!(store.insert_if_absent("a", json!(1)));
/// assert!(!store.insert_if_absent("a", json!(2)));
/// assert_eq!(store.get("a"), Some(json!(1)));
/// ```
pub struct MemoryStore {
    data: RwLock<HashMap<String, Value>>,
}

impl MemoryStore {
    /// Create a new MemoryStore with default capacity
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// Create a new MemoryStore with specified capacity
    ///
    /// The store will allocate 30% more space to reduce rehashing.
    pub fn with_capacity(capacity: usize) -> Self {
        MemoryStore {
            data: RwLock::new(HashMap::with_capacity(
                (capacity as f64 * CAPACITY_OVERHEAD_FACTOR) as usize,
            )),
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl KvStore for MemoryStore {
    fn insert_if_absent(&self, key: &str, value: Value) -> bool {
        match self.data.write().entry(key.to_string()) {
            Entry::Occupied(_) => false,
            Entry::Vacant(slot) => {
                slot.insert(value);
                true
            }
        }
    }

    fn replace_if_present(&self, key: &str, value: Value) -> bool {
        match self.data.write().get_mut(key) {
            Some(current) => {
                *current = value;
                true
            }
            None => false,
        }
    }

    fn get(&self, key: &str) -> Option<Value> {
        self.data.read().get(key).cloned()
    }

    fn remove(&self, key: &str) -> bool {
        self.data.write().remove(key).is_some()
    }

    fn records(&self) -> Vec<KeyValueRecord> {
        self.data
            .read()
            .iter()
            .map(|(key, value)| KeyValueRecord::new(key.clone(), value.clone()))
            .collect()
    }

    fn len(&self) -> usize {
        self.data.read().len()
    }
}
