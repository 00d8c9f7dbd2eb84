//! Feature extraction pipeline.
//!
//! One scan of one canonical URL:
//! 1. Domain extraction from the canonical string
//! 2. Page fetch followed by HTML analysis of the body
//! 3. DNS analysis of the domain
//! 4. Certificate inspection for https targets
//!
//! Steps 2-4 run concurrently. A scan never fails: each extractor failure is
//! recorded as one entry in the record's error list and leaves its fields
//! absent.

mod record;
mod sources;

use std::time::Instant;

use anyhow::{anyhow, Result};
use log::{debug, info};

use crate::error_handling::ExtractionSource;
use crate::normalize::CanonicalUrl;
use crate::utils::{duration_to_ms, now_millis};

pub use record::{FeatureRecord, WebviewMisuse};
pub use sources::{NetworkSignals, SignalSource};

/// Runs the extractors of a `SignalSource` and assembles a `FeatureRecord`.
pub struct FeaturePipeline<S> {
    signals: S,
}

impl<S: SignalSource> FeaturePipeline<S> {
    /// Creates a pipeline over the given signal source.
    pub fn new(signals: S) -> Self {
        Self { signals }
    }

    /// The underlying signal source.
    pub fn signals(&self) -> &S {
        &self.signals
    }

    /// Scans `target` and returns its feature record.
    ///
    /// All extractors complete (successfully or not) before the record is
    /// assembled.
    pub async fn scan(&self, target: &CanonicalUrl) -> FeatureRecord {
        let started = Instant::now();
        let url = target.as_key();
        let is_https = target.is_https();
        debug!("Scanning {url}");

        let domain = extract_domain(&url);

        let page_leg = async {
            match self.signals.fetch(&url).await {
                Ok(page) => {
                    let html = self.signals.inspect_html(page.body).await;
                    (Ok((page.final_url, page.status)), Some(html))
                }
                Err(e) => (Err(e), None),
            }
        };
        let dns_leg = async {
            match domain.as_deref() {
                Ok(d) => Some(self.signals.resolve(d).await),
                Err(_) => None,
            }
        };
        let tls_leg = async {
            match domain.as_deref() {
                Ok(d) if is_https => Some(self.signals.inspect_certificate(d).await),
                _ => None,
            }
        };

        let ((page, html), dns, ssl) = tokio::join!(page_leg, dns_leg, tls_leg);

        let mut errors = Vec::new();
        let domain = match domain {
            Ok(d) => Some(d),
            Err(e) => {
                errors.push(ExtractionSource::Domain.describe(e));
                None
            }
        };
        let (final_url, status_code) = match page {
            Ok((final_url, status)) => (Some(final_url), Some(status)),
            Err(e) => {
                errors.push(ExtractionSource::Http.describe(format!("{e:#}")));
                (None, None)
            }
        };
        let html = match html {
            Some(Ok(info)) => Some(info),
            Some(Err(e)) => {
                errors.push(ExtractionSource::Html.describe(format!("{e:#}")));
                None
            }
            None => None,
        };
        if let Some(reason) = dns.as_ref().and_then(|d| d.resolution_error.as_deref()) {
            errors.push(ExtractionSource::Dns.describe(reason));
        }
        let ssl = match ssl {
            Some(Ok(info)) => Some(info),
            Some(Err(e)) => {
                errors.push(ExtractionSource::Tls.describe(format!("{e:#}")));
                None
            }
            None => None,
        };

        let record = FeatureRecord {
            subdomain_count: domain.as_deref().map(FeatureRecord::count_subdomains),
            webview_misuse: WebviewMisuse::from_html(html.as_ref()),
            url,
            domain,
            is_https,
            final_url,
            status_code,
            ssl,
            dns,
            html,
            collected_at: now_millis(),
            scan_duration_ms: duration_to_ms(started.elapsed()),
            errors,
        };

        info!(
            "Scanned {} in {}ms ({} errors)",
            record.url,
            record.scan_duration_ms,
            record.errors.len()
        );
        record
    }
}

/// Extracts the host of a canonical URL string.
pub(crate) fn extract_domain(url: &str) -> Result<String> {
    let parsed = url::Url::parse(url)?;
    match parsed.host_str() {
        Some(host) if !host.is_empty() => Ok(host.to_string()),
        _ => Err(anyhow!("no host in {url}")),
    }
}
