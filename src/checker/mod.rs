//! URL check orchestration.
//!
//! One check walks `normalize → cache lookup → (hit: done) | (miss: scan →
//! classify → persist + prune)`. Nothing is retried. A classification failure
//! ends the check with an error and writes nothing; a store failure after a
//! successful classification is reported next to the verdict.

use std::sync::Arc;

use log::{debug, error, info, warn};
use serde::Serialize;

use crate::classifier::{ClassificationVerdict, ClassifierClient, VerdictLabel};
use crate::config::{
    WhitelistPolicy, DEFAULT_HISTORY_LIMIT, FROM_CACHE_REASON, TRUSTED_DOMAIN_REASON,
};
use crate::error_handling::{CheckError, DatabaseError};
use crate::normalize::{normalize, CanonicalUrl};
use crate::scan::{extract_domain, FeaturePipeline, FeatureRecord, SignalSource};
use crate::storage::{CheckSource, HistoryStore};
use crate::whitelist::DomainTrust;

/// Where a verdict came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum VerdictOrigin {
    /// Stored verdict for the same canonical URL; no extraction ran
    Cache,
    /// Fresh classification of a new scan
    Classifier,
    /// Trusted domain under `WhitelistPolicy::SkipTrusted`
    Whitelist,
}

/// Result of a successful check.
#[derive(Debug)]
pub struct CheckOutcome {
    /// Canonical form of the checked URL
    pub target: CanonicalUrl,
    /// The verdict
    pub verdict: ClassificationVerdict,
    /// Where the verdict came from
    pub origin: VerdictOrigin,
    /// Scan output, present when the verdict comes from the classifier
    pub features: Option<FeatureRecord>,
    /// Store write failure after a successful classification
    pub persist_error: Option<DatabaseError>,
}

/// Entry point for manual and background URL checks.
pub struct PhishingChecker<S> {
    pipeline: FeaturePipeline<S>,
    classifier: ClassifierClient,
    store: Arc<HistoryStore>,
    trust: Option<Arc<dyn DomainTrust>>,
    whitelist_policy: WhitelistPolicy,
    history_limit: u32,
}

impl<S: SignalSource> PhishingChecker<S> {
    /// Creates a checker with the default history limit and no whitelist.
    pub fn new(
        pipeline: FeaturePipeline<S>,
        classifier: ClassifierClient,
        store: Arc<HistoryStore>,
    ) -> Self {
        Self {
            pipeline,
            classifier,
            store,
            trust: None,
            whitelist_policy: WhitelistPolicy::Ignore,
            history_limit: DEFAULT_HISTORY_LIMIT,
        }
    }

    /// Number of rows kept after each successful check.
    pub fn with_history_limit(mut self, limit: u32) -> Self {
        self.history_limit = limit;
        self
    }

    /// Installs a whitelist and the policy deciding whether it is consulted.
    pub fn with_whitelist(mut self, trust: Arc<dyn DomainTrust>, policy: WhitelistPolicy) -> Self {
        self.trust = Some(trust);
        self.whitelist_policy = policy;
        self
    }

    /// The history store this checker writes to.
    pub fn store(&self) -> &Arc<HistoryStore> {
        &self.store
    }

    /// Endpoint verdicts are requested from.
    pub fn classifier_endpoint(&self) -> &url::Url {
        self.classifier.endpoint()
    }

    /// The feature pipeline this checker scans with.
    pub fn pipeline(&self) -> &FeaturePipeline<S> {
        &self.pipeline
    }

    /// Checks one raw URL string.
    ///
    /// # Errors
    ///
    /// Returns `CheckError::Classification` when no verdict could be obtained.
    /// Nothing is persisted in that case.
    pub async fn check_url(&self, raw: &str, source: CheckSource) -> Result<CheckOutcome, CheckError> {
        let target = normalize(raw);
        let key = target.as_key();
        debug!("Checking {key} ({source})");

        if let Some(verdict) = self.trusted_verdict(&key) {
            info!("{key} is on the trusted list, skipping checks");
            return Ok(CheckOutcome {
                target,
                verdict,
                origin: VerdictOrigin::Whitelist,
                features: None,
                persist_error: None,
            });
        }

        match self.store.lookup(&key).await {
            Ok(Some(record)) => {
                let mut verdict = record.verdict();
                if verdict.reason.is_none() {
                    verdict.reason = Some(FROM_CACHE_REASON.to_string());
                }
                info!("Cache hit for {key} (checked at {})", record.checked_at);
                return Ok(CheckOutcome {
                    target,
                    verdict,
                    origin: VerdictOrigin::Cache,
                    features: None,
                    persist_error: None,
                });
            }
            Ok(None) => {}
            Err(e) => warn!("History lookup for {key} failed, scanning instead: {e}"),
        }

        let features = self.pipeline.scan(&target).await;
        let verdict = self.classifier.classify(&features).await.map_err(|e| {
            error!("Classification of {key} failed: {e}");
            CheckError::from(e)
        })?;

        let persist_error = match self
            .store
            .record_success(&verdict, &features, source, self.history_limit)
            .await
        {
            Ok(_) => None,
            Err(e) => {
                error!("Failed to save verdict for {key}: {e}");
                Some(e)
            }
        };

        info!(
            "{key}: {} (confidence {:.2})",
            verdict.label, verdict.confidence
        );
        Ok(CheckOutcome {
            target,
            verdict,
            origin: VerdictOrigin::Classifier,
            features: Some(features),
            persist_error,
        })
    }

    fn trusted_verdict(&self, key: &str) -> Option<ClassificationVerdict> {
        if self.whitelist_policy != WhitelistPolicy::SkipTrusted {
            return None;
        }
        let trust = self.trust.as_ref()?;
        let domain = extract_domain(key).ok()?;
        trust.is_trusted(&domain).then(|| ClassificationVerdict {
            is_phishing: false,
            confidence: 1.0,
            label: VerdictLabel::Legitimate,
            reason: Some(TRUSTED_DOMAIN_REASON.to_string()),
        })
    }
}
