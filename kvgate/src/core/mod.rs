//! Core components of the kvgate library
//!
//! This module contains the fundamental building blocks:
//! - [`clock`]: Millisecond time sources
//! - [`admission`]: The sliding-window admission controller
//! - [`key`]: Key normalization
//! - [`store`]: Storage backends for key-value records
//! - [`service`]: Request-level operations combining admission and storage

pub mod admission;
pub mod clock;
pub mod key;
pub mod service;
pub mod store;

pub use admission::{
    AdmissionConfig, AdmissionController, AdmissionDecision, ArrivalLog, ArrivalRecord,
    DEFAULT_WINDOW_MS,
};
pub use clock::{Clock, ManualClock, SystemClock};
pub use key::{KeyError, normalize_key};
pub use service::KvService;
pub use store::{KeyValueRecord, KvStore, MemoryStore, ShardedStore, ShardedStoreBuilder};

use thiserror::Error;

/// Errors returned by key-value operations
///
/// Every variant is terminal for the request that produced it; none is
/// retried internally. The `Display` text is the message sent to clients.
///
/// # Example
///
/// ```
/// use kvgate::{KvError, KvService, MemoryStore, AdmissionConfig};
/// use serde_json::json;
///
/// let service = KvService::new(AdmissionConfig::disabled(), MemoryStore::new());
/// service.create(Some(&json!("a")), Some(json!(1))).unwrap();
///
/// match service.create(Some(&json!("a")), Some(json!(2))) {
///     Err(KvError::Conflict) => {}
///     other => panic!("expected conflict, got {other:?}"),
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KvError {
    /// Missing or malformed input; the client must fix the request
    #[error("Bad Request: {0}")]
    BadRequest(String),
    /// The key already exists
    #[error("Conflict: 'key' must be unique")]
    Conflict,
    /// The key does not exist
    #[error("Not Found")]
    NotFound,
    /// Rejected by admission control; retry after backing off
    #[error("Too Many Requests")]
    TooManyRequests,
}

impl KvError {
    /// Input is missing the named fields
    pub fn missing(fields: &[&str]) -> Self {
        let quoted: Vec<String> = fields.iter().map(|f| format!("'{f}'")).collect();
        let verb = if fields.len() > 1 { "are" } else { "is" };
        KvError::BadRequest(format!("{} {verb} expected", quoted.join(" and ")))
    }

    /// Short machine-readable name of the error kind
    pub fn kind(&self) -> &'static str {
        match self {
            KvError::BadRequest(_) => "bad_request",
            KvError::Conflict => "conflict",
            KvError::NotFound => "not_found",
            KvError::TooManyRequests => "too_many_requests",
        }
    }
}
