//! Feature record model.

use serde::Serialize;
use strum_macros::{Display, EnumString, IntoStaticStr};

use crate::dns::DnsInfo;
use crate::html::HtmlInfo;
use crate::tls::SslInfo;

/// Coarse estimate of how a page could abuse an embedding webview.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Display, EnumString, IntoStaticStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum WebviewMisuse {
    /// Login form without a CSP meta tag
    Suspicious,
    /// No login form and no CSP meta tag
    Possible,
    /// Anything else, including pages whose HTML was not analyzed
    Unlikely,
}

impl WebviewMisuse {
    /// Derives the label from the HTML signals of a scan.
    ///
    /// The CSP meta tag always wins: a login form behind a CSP is `Unlikely`.
    pub fn from_html(html: Option<&HtmlInfo>) -> Self {
        match html {
            Some(info) if info.has_login_form && !info.has_csp => WebviewMisuse::Suspicious,
            Some(info) if !info.has_login_form && !info.has_csp => WebviewMisuse::Possible,
            _ => WebviewMisuse::Unlikely,
        }
    }
}

/// Signals collected by one scan of one canonical URL.
///
/// Only identity and metadata are guaranteed; every extractor's output is
/// independently optional and a failed extractor leaves one entry in `errors`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeatureRecord {
    /// Canonical URL string, also the cache key
    pub url: String,
    /// Host extracted from `url`
    pub domain: Option<String>,
    /// Labels in `domain` beyond the registrable two, absent without a domain
    pub subdomain_count: Option<u32>,
    /// Whether the canonical scheme is https
    pub is_https: bool,
    /// URL after redirects
    pub final_url: Option<String>,
    /// HTTP status of the final response
    pub status_code: Option<u16>,
    /// Leaf certificate, https targets only
    pub ssl: Option<SslInfo>,
    /// Address and mail exchangers
    pub dns: Option<DnsInfo>,
    /// Content heuristics, absent when no body was analyzed
    pub html: Option<HtmlInfo>,
    /// Derived webview label
    pub webview_misuse: WebviewMisuse,
    /// Assembly time in epoch milliseconds
    pub collected_at: i64,
    /// Wall time of the scan
    pub scan_duration_ms: u64,
    /// One entry per failed source, in source order
    pub errors: Vec<String>,
}

impl FeatureRecord {
    /// Number of labels in `domain` minus two, floored at zero.
    pub fn count_subdomains(domain: &str) -> u32 {
        let labels = domain.split('.').count();
        u32::try_from(labels.saturating_sub(2)).unwrap_or(u32::MAX)
    }
}
