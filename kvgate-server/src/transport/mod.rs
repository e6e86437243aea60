//! Transport layer for the key-value server
//!
//! A transport accepts client connections and turns protocol requests into
//! [`KvService`] calls. Transports implement the [`Transport`] trait and
//! share one service instance, so every client sees the same records and
//! the same admission window.
//!
//! # Available Transports
//!
//! - [`http`]: REST API with JSON bodies

pub mod http;

#[cfg(test)]
mod http_test;

use crate::metrics::Metrics;
use anyhow::Result;
use async_trait::async_trait;
use kvgate::KvService;
use std::sync::Arc;

/// Common interface for all transport implementations
///
/// Each transport is responsible for:
/// - Accepting client connections
/// - Parsing protocol-specific requests
/// - Calling the shared service
/// - Sending responses back to clients
#[async_trait]
pub trait Transport {
    /// Start the transport server
    ///
    /// This method should:
    /// 1. Bind to the configured address/port
    /// 2. Accept incoming connections
    /// 3. Handle requests using the provided service
    ///
    /// The method runs indefinitely until an error occurs or the server shuts down.
    async fn start(self, service: Arc<KvService>, metrics: Arc<Metrics>) -> Result<()>;
}
