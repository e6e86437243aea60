//! # kvgate
//!
//! An in-memory key-value store guarded by a sliding-window admission controller.
//!
//! ## Overview
//!
//! kvgate provides the two pieces of a small key-value service that carry real
//! concurrency contracts:
//! - **Admission control**: a trailing-window request counter that rejects
//!   work once too many requests arrived in the last `window_ms`
//!   milliseconds. It expires old arrivals as part of each check, with no
//!   background sweeper.
//! - **Atomic storage**: stores whose create, update and delete are atomic
//!   per record, so concurrent creates of one key produce exactly one winner.
//!
//! ## Quick Start
//!
//! ```
//! use kvgate::{AdmissionConfig, KvError, KvService, ShardedStore};
//! use serde_json::json;
//!
//! // At most 100 requests per trailing second
//! let service = KvService::new(AdmissionConfig::per_second(100), ShardedStore::new());
//!
//! service.create(Some(&json!("user:1")), Some(json!({"name": "ada"})))?;
//! assert_eq!(service.get("user:1")?, json!({"name": "ada"}));
//!
//! match service.create(Some(&json!("user:1")), Some(json!({}))) {
//!     Err(KvError::Conflict) => println!("already exists"),
//!     Err(KvError::TooManyRequests) => println!("slow down"),
//!     other => println!("{other:?}"),
//! }
//! # Ok::<(), kvgate::KvError>(())
//! ```
//!
//! ## Store Types
//!
//! ### [`MemoryStore`]
//! One map behind one read-write lock.
//!
//! ```
//! use kvgate::MemoryStore;
//!
//! let store = MemoryStore::with_capacity(10_000);
//! ```
//!
//! ### [`ShardedStore`]
//! Keys spread across independently locked shards. Best under concurrent load.
//!
//! ```
//! use kvgate::ShardedStore;
//!
//! let store = ShardedStore::builder()
//!     .capacity(1_000_000)
//!     .shard_count(64)
//!     .build();
//! ```
//!
//! ## Admission Control
//!
//! The controller keeps one [`ArrivalRecord`] per checked request. A check:
//! 1. records the arrival (rejected requests are counted too)
//! 2. evicts arrivals older than the trailing window
//! 3. rejects if more than `max_per_window` arrivals remain
//!
//! A `max_per_window` of zero or less disables admission control.
//!
//! ```
//! use kvgate::{AdmissionConfig, AdmissionController};
//!
//! let controller = AdmissionController::new(AdmissionConfig::per_second(2));
//! assert!(controller.check());
//! ```
//!
//! ## Thread Safety
//!
//! [`KvService`], [`AdmissionController`] and both stores are `Send + Sync`
//! and lock internally. Share them with an `Arc`:
//!
//! ```
//! use std::sync::Arc;
//! use kvgate::{AdmissionConfig, KvService, ShardedStore};
//!
//! let service = Arc::new(KvService::new(AdmissionConfig::disabled(), ShardedStore::new()));
//! ```
//!
//! ## Features
//!
//! - `ahash` (default): Use AHash for faster hashing

pub mod core;

pub use core::{
    AdmissionConfig, AdmissionController, AdmissionDecision, ArrivalLog, ArrivalRecord, Clock,
    DEFAULT_WINDOW_MS, KeyError, KeyValueRecord, KvError, KvService, KvStore, ManualClock,
    MemoryStore, ShardedStore, ShardedStoreBuilder, SystemClock, normalize_key,
};
