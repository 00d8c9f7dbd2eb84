//! HTTP client initialization.
//!
//! This module provides functions to initialize the two HTTP clients: one for
//! fetching the scanned page and one for talking to the classifier.

use std::sync::Arc;
use std::time::Duration;

use crate::config::{Config, MAX_REDIRECT_HOPS};
use reqwest::ClientBuilder;

/// Initializes the page-fetch HTTP client.
///
/// Creates a `reqwest::Client` configured with:
/// - Identifying User-Agent header from config
/// - Separate connect and read timeouts (15s each by default)
/// - Redirect following enabled (up to `MAX_REDIRECT_HOPS`)
/// - Rustls TLS backend (no native TLS)
///
/// # Errors
///
/// Returns a `reqwest::Error` if client creation fails.
pub fn init_client(config: &Config) -> Result<Arc<reqwest::Client>, reqwest::Error> {
    let client = ClientBuilder::new()
        .connect_timeout(Duration::from_secs(config.fetch_connect_timeout_seconds))
        .read_timeout(Duration::from_secs(config.fetch_read_timeout_seconds))
        .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECT_HOPS))
        .user_agent(config.user_agent.clone())
        .build()?;
    Ok(Arc::new(client))
}

/// Initializes the HTTP client used for classifier requests.
///
/// The classifier is a plain JSON service; redirects are not followed so a
/// misconfigured base URL fails loudly instead of posting features elsewhere.
///
/// # Errors
///
/// Returns a `reqwest::Error` if client creation fails.
pub fn init_classifier_client(config: &Config) -> Result<Arc<reqwest::Client>, reqwest::Error> {
    let timeout = Duration::from_secs(config.classifier_timeout_seconds);
    let client = ClientBuilder::new()
        .connect_timeout(timeout)
        .timeout(timeout)
        .redirect(reqwest::redirect::Policy::none())
        .build()?;
    Ok(Arc::new(client))
}
