//! Signal sources consulted by a scan.

use std::future::Future;
use std::sync::Arc;

use anyhow::{anyhow, Result};
use hickory_resolver::TokioAsyncResolver;

use crate::dns::{analyze_dns, DnsInfo};
use crate::fetch::{fetch_page, FetchedPage};
use crate::html::{analyze_html, HtmlInfo};
use crate::tls::{get_ssl_certificate_info, SslInfo};

/// The four extractors a `FeaturePipeline` drives.
///
/// `NetworkSignals` talks to the network; tests substitute counting stubs.
pub trait SignalSource: Send + Sync {
    /// Fetches the page at `url`, following redirects.
    fn fetch(&self, url: &str) -> impl Future<Output = Result<FetchedPage>> + Send;

    /// Runs the HTML heuristics over a fetched body.
    ///
    /// Parsing is CPU-bound, so the default runs it on the blocking pool. A
    /// panic inside the parser is reported as an error rather than propagated.
    fn inspect_html(&self, body: String) -> impl Future<Output = Result<HtmlInfo>> + Send {
        async move {
            tokio::task::spawn_blocking(move || analyze_html(&body))
                .await
                .map_err(|e| anyhow!("HTML analysis task failed: {e}"))
        }
    }

    /// Looks up the address and mail exchangers of `domain`.
    fn resolve(&self, domain: &str) -> impl Future<Output = DnsInfo> + Send;

    /// Reads the leaf certificate served by `domain` on port 443.
    fn inspect_certificate(&self, domain: &str) -> impl Future<Output = Result<SslInfo>> + Send;
}

/// Production signal source backed by a shared HTTP client and resolver.
#[derive(Clone)]
pub struct NetworkSignals {
    client: Arc<reqwest::Client>,
    resolver: Arc<TokioAsyncResolver>,
}

impl NetworkSignals {
    /// Creates a source from the clients built by `initialization`.
    pub fn new(client: Arc<reqwest::Client>, resolver: Arc<TokioAsyncResolver>) -> Self {
        Self { client, resolver }
    }
}

impl SignalSource for NetworkSignals {
    async fn fetch(&self, url: &str) -> Result<FetchedPage> {
        fetch_page(&self.client, url).await
    }

    async fn resolve(&self, domain: &str) -> DnsInfo {
        analyze_dns(domain, &self.resolver).await
    }

    async fn inspect_certificate(&self, domain: &str) -> Result<SslInfo> {
        get_ssl_certificate_info(domain).await
    }
}
