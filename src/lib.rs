//! pikephish library: URL threat assessment
//!
//! Collects technical signals about a URL (HTTP behavior, DNS, TLS certificate,
//! HTML content), asks a remote classification service for a phishing verdict,
//! and keeps recent verdicts in a SQLite history that doubles as a cache.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use pikephish::{init_resources, CheckSource, Config, TrustedDomains};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config {
//!     classifier_url: "http://127.0.0.1:8000/".to_string(),
//!     ..Default::default()
//! };
//!
//! let resources = init_resources(&config, Arc::new(TrustedDomains::new())).await?;
//! let outcome = resources
//!     .checker
//!     .check_url("example.com/login", CheckSource::Manual)
//!     .await?;
//! println!("{}: {}", outcome.target, outcome.verdict.label);
//! resources.shutdown().await;
//! # Ok(())
//! # }
//! ```
//!
//! # Requirements
//!
//! This library requires a Tokio runtime. Call `initialization::init_crypto_provider`
//! once before the first certificate inspection.

#![warn(missing_docs)]

pub mod checker;
pub mod classifier;
pub mod config;
pub mod dns;
pub mod error_handling;
pub mod fetch;
pub mod html;
pub mod initialization;
pub mod monitor;
pub mod normalize;
mod run;
pub mod scan;
pub mod storage;
pub mod tls;
mod utils;
pub mod whitelist;

// Re-export public API
pub use checker::{CheckOutcome, PhishingChecker, VerdictOrigin};
pub use classifier::{ClassificationVerdict, ClassifierClient, VerdictLabel};
pub use config::{Config, DuplicatePolicy, LogFormat, LogLevel, WhitelistPolicy};
pub use error_handling::{CheckError, ClassifierError, DatabaseError};
pub use monitor::{observe_urls, ObservationSummary};
pub use normalize::{normalize, CanonicalUrl, Scheme};
pub use run::{init_resources, open_store, CheckResources, NetworkChecker};
pub use scan::{FeaturePipeline, FeatureRecord, NetworkSignals, SignalSource, WebviewMisuse};
pub use storage::{CheckSource, HistoryRecord, HistoryStore};
pub use whitelist::{DomainTrust, TrustedDomains};
