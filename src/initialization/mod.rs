//! Application initialization and resource setup.
//!
//! This module provides functions to initialize all shared resources:
//! - HTTP clients (page fetch and classifier)
//! - DNS resolver
//! - Logger
//! - TLS crypto provider
//!
//! The history store has its own lifecycle (`HistoryStore::open` / `close`).

mod client;
mod logger;
mod resolver;

use std::sync::Arc;

use rustls::crypto::{ring::default_provider, CryptoProvider};
use tokio::sync::Semaphore;

// Re-export public API
pub use client::{init_classifier_client, init_client};
pub use logger::init_logger_with;
pub use resolver::init_resolver;

/// Initializes a semaphore for controlling concurrency.
///
/// Used by the watch mode to bound the number of background checks in flight.
pub fn init_semaphore(count: usize) -> Arc<Semaphore> {
    Arc::new(Semaphore::new(count))
}

/// Initializes the crypto provider for TLS operations.
///
/// Installs `ring` as the process-wide `rustls` provider. Must be called before
/// any TLS connection is established.
pub fn init_crypto_provider() {
    // Reinstalling the provider is harmless, the error only says one exists
    let _ = CryptoProvider::install_default(default_provider());
}
