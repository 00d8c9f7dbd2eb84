// Shared test helpers: an offline signal source, a mock classifier and an
// in-memory history store.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use httptest::{matchers::*, responders::*, Expectation, Server};

use pikephish::dns::DnsInfo;
use pikephish::fetch::FetchedPage;
use pikephish::tls::SslInfo;
use pikephish::{
    ClassifierClient, DuplicatePolicy, FeaturePipeline, HistoryStore, PhishingChecker,
    SignalSource,
};

/// Signal source that never touches the network and counts every call.
#[derive(Default)]
pub struct StubSignals {
    /// Page body returned by `fetch`; `None` makes the fetch fail
    pub body: Option<String>,
    /// Address returned by `resolve`; `None` makes resolution fail
    pub ip: Option<String>,
    /// Whether certificate inspection succeeds
    pub certificate_ok: bool,
    pub fetches: AtomicUsize,
    pub resolves: AtomicUsize,
    pub certificates: AtomicUsize,
}

#[allow(dead_code)] // Not every test file uses every constructor
impl StubSignals {
    /// All extractors succeed, serving `body`.
    pub fn serving(body: &str) -> Self {
        Self {
            body: Some(body.to_string()),
            ip: Some("198.51.100.7".to_string()),
            certificate_ok: true,
            ..Self::default()
        }
    }

    /// Every extractor fails.
    pub fn failing() -> Self {
        Self::default()
    }

    /// Total extractor invocations so far.
    pub fn total_calls(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
            + self.resolves.load(Ordering::SeqCst)
            + self.certificates.load(Ordering::SeqCst)
    }
}

impl SignalSource for StubSignals {
    async fn fetch(&self, url: &str) -> anyhow::Result<FetchedPage> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        match &self.body {
            Some(body) => Ok(FetchedPage {
                final_url: url.to_string(),
                status: 200,
                body: body.clone(),
            }),
            None => Err(anyhow::anyhow!("connection timed out")),
        }
    }

    async fn resolve(&self, _domain: &str) -> DnsInfo {
        self.resolves.fetch_add(1, Ordering::SeqCst);
        match &self.ip {
            Some(ip) => DnsInfo::from_lookups(Ok(ip.clone()), Ok(Vec::new())),
            None => DnsInfo::from_lookups(Err(anyhow::anyhow!("no such host")), Ok(Vec::new())),
        }
    }

    async fn inspect_certificate(&self, _domain: &str) -> anyhow::Result<SslInfo> {
        self.certificates.fetch_add(1, Ordering::SeqCst);
        if !self.certificate_ok {
            anyhow::bail!("handshake failed");
        }
        let now = chrono::Utc::now();
        Ok(SslInfo {
            issuer: "CN=Stub CA".to_string(),
            valid_from: now - chrono::Duration::days(30),
            valid_to: now + chrono::Duration::days(60),
            is_valid: true,
        })
    }
}

/// Mock classifier expecting `times` predict calls, each answered with `verdict`.
#[allow(dead_code)]
pub fn mock_classifier(times: usize, verdict: serde_json::Value) -> (Server, ClassifierClient) {
    let server = Server::run();
    server.expect(
        Expectation::matching(request::method_path("POST", "/predict"))
            .times(times)
            .respond_with(json_encoded(verdict)),
    );
    let client = classifier_for(&server);
    (server, client)
}

/// Classifier client pointed at `server`.
pub fn classifier_for(server: &Server) -> ClassifierClient {
    let base = format!("http://{}/", server.addr());
    ClassifierClient::new(Arc::new(reqwest::Client::new()), &base)
        .expect("mock server address is a valid base URL")
}

/// A phishing verdict body.
#[allow(dead_code)]
pub fn phishing_verdict() -> serde_json::Value {
    serde_json::json!({
        "url": "ignored",
        "isPhishing": true,
        "confidence": 0.91,
        "prediction": "phishing",
        "reason": "credential form on lookalike domain"
    })
}

/// A legitimate verdict body without a reason.
#[allow(dead_code)]
pub fn legitimate_verdict() -> serde_json::Value {
    serde_json::json!({
        "isPhishing": false,
        "confidence": 0.07,
        "prediction": "legitimate",
        "reason": null
    })
}

/// Checker over `signals` and `classifier` with a fresh in-memory store.
pub async fn checker_with(
    signals: StubSignals,
    classifier: ClassifierClient,
    history_limit: u32,
) -> PhishingChecker<StubSignals> {
    let store = HistoryStore::in_memory(DuplicatePolicy::Append)
        .await
        .expect("Failed to open in-memory history");
    PhishingChecker::new(FeaturePipeline::new(signals), classifier, Arc::new(store))
        .with_history_limit(history_limit)
}
