//! # kvgate Server
//!
//! An HTTP key-value service that sheds load with a sliding-window
//! admission controller.
//!
//! ## Purpose
//!
//! Clients create, read, update, delete and (optionally) list JSON records
//! by key. Before any of that work happens, the server asks one shared
//! admission controller whether the request fits in the trailing window.
//! Requests past the limit get `429 Too Many Requests` without touching the
//! store.
//!
//! ## Installation
//!
//! ```bash
//! cargo install kvgate-server
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! # Show all available options
//! kvgate --help
//!
//! # At most 100 requests per second, with GET /kv enabled
//! kvgate --port 8080 --max-per-second 100 --enable-list
//!
//! # Single-lock store
//! kvgate --store memory --store-capacity 100000
//! ```
//!
//! ## Configuration
//!
//! Configure via CLI arguments or environment variables (CLI takes precedence):
//!
//! ```bash
//! export KVGATE_PORT=9090
//! export KVGATE_MAX_PER_SECOND=50
//! kvgate
//!
//! # List all available environment variables
//! kvgate --list-env-vars
//! ```
//!
//! ## Usage
//!
//! ```bash
//! curl -X POST http://localhost:8080/kv \
//!   -H "Content-Type: application/json" \
//!   -d '{"key": "user:123", "value": {"name": "ada"}}'
//!
//! curl http://localhost:8080/kv/user:123
//! ```
//!
//! ## Architecture
//!
//! ```text
//!  ┌─────────────┐
//!  │    HTTP     │
//!  │  Transport  │
//!  └──────┬──────┘
//!         │ Arc<KvService>
//!  ┌──────▼──────┐
//!  │  KvService  │──── AdmissionController (arrival log)
//!  └──────┬──────┘
//!         │
//!  ┌──────▼──────┐
//!  │   KvStore   │  memory | sharded
//!  └─────────────┘
//! ```
//!
//! Handlers call the service directly. State is guarded by short-lived
//! locks inside the library, never across an `.await`.

pub mod config;
pub mod metrics;
pub mod store;
pub mod transport;
pub mod types;
