//! Check resources and their lifecycle.
//!
//! Builds everything a check needs from a validated `Config`:
//! - Page-fetch and classifier HTTP clients
//! - DNS resolver
//! - History store (opened here, closed by `CheckResources::shutdown`)
//! - The `PhishingChecker` wiring them together

use std::sync::Arc;

use anyhow::{Context, Result};
use log::info;

use crate::checker::PhishingChecker;
use crate::classifier::ClassifierClient;
use crate::config::Config;
use crate::initialization::{init_classifier_client, init_client, init_resolver};
use crate::scan::{FeaturePipeline, NetworkSignals};
use crate::storage::HistoryStore;
use crate::whitelist::DomainTrust;

/// Checker backed by the real network.
pub type NetworkChecker = PhishingChecker<NetworkSignals>;

/// All resources initialized for checks.
pub struct CheckResources {
    /// The check entry point
    pub checker: Arc<NetworkChecker>,
    /// The history store shared with `checker`
    pub store: Arc<HistoryStore>,
}

impl CheckResources {
    /// Closes the history store.
    pub async fn shutdown(self) {
        self.store.close().await;
        info!("Resources released");
    }
}

/// Opens only the history store, for commands that never scan.
pub async fn open_store(config: &Config) -> Result<Arc<HistoryStore>> {
    config.validate()?;
    let store = HistoryStore::open(&config.db_path, config.duplicate_policy)
        .await
        .with_context(|| format!("Failed to open history at {}", config.db_path.display()))?;
    Ok(Arc::new(store))
}

/// Validates `config` and initializes every resource a check needs.
///
/// `trust` is installed as the whitelist; whether it is consulted depends on
/// `config.whitelist_policy`.
pub async fn init_resources(
    config: &Config,
    trust: Arc<dyn DomainTrust>,
) -> Result<CheckResources> {
    let store = open_store(config).await?;

    let client = init_client(config).context("Failed to build page-fetch client")?;
    let classifier_http =
        init_classifier_client(config).context("Failed to build classifier client")?;
    let classifier = ClassifierClient::new(classifier_http, &config.classifier_url)?;
    info!("Classifier endpoint: {}", classifier.endpoint());

    let pipeline = FeaturePipeline::new(NetworkSignals::new(client, init_resolver()));
    let checker = PhishingChecker::new(pipeline, classifier, Arc::clone(&store))
        .with_whitelist(trust, config.whitelist_policy)
        .with_history_limit(config.history_limit);

    Ok(CheckResources {
        checker: Arc::new(checker),
        store,
    })
}
