//! DNS analysis.
//!
//! Resolves the address and the mail exchangers of a scanned domain. The two
//! lookups are independent: a failed address lookup does not hide MX data and
//! vice versa. Neither is fatal for a scan.

mod records;
mod resolution;

use hickory_resolver::TokioAsyncResolver;
use serde::Serialize;

// Re-export public API
pub use records::lookup_mx_records;
pub use resolution::resolve_host_to_ip;

/// DNS signals for one domain.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DnsInfo {
    /// First resolved address, absent when resolution failed
    pub ip: Option<String>,
    /// Whether at least one MX record exists
    pub has_mx: bool,
    /// Raw MX records in resolver order, absent when there are none
    pub mx_records: Option<Vec<String>>,
    /// Why `ip` is absent, if the address lookup failed
    #[serde(skip)]
    pub resolution_error: Option<String>,
}

impl DnsInfo {
    /// Builds the info from the two independent lookup outcomes.
    pub fn from_lookups(
        ip: anyhow::Result<String>,
        mx: anyhow::Result<Vec<String>>,
    ) -> Self {
        let (ip, resolution_error) = match ip {
            Ok(ip) => (Some(ip), None),
            Err(e) => (None, Some(format!("{e:#}"))),
        };
        let mx_records = mx.ok().filter(|records| !records.is_empty());
        Self {
            ip,
            has_mx: mx_records.is_some(),
            mx_records,
            resolution_error,
        }
    }
}

/// Resolves the address and MX records of `domain` concurrently.
pub async fn analyze_dns(domain: &str, resolver: &TokioAsyncResolver) -> DnsInfo {
    let (ip, mx) = tokio::join!(
        resolve_host_to_ip(domain, resolver),
        lookup_mx_records(domain, resolver)
    );
    if let Err(e) = &ip {
        log::warn!("IP resolution failed for {domain}: {e:#}");
    }
    let info = DnsInfo::from_lookups(ip, mx);
    log::debug!("DNS: IP={:?}, MX={} for {domain}", info.ip, info.has_mx);
    info
}
