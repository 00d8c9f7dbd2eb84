//! Mail exchanger record queries.

use std::time::Duration;

use anyhow::{Error, Result};
use hickory_resolver::error::{ResolveError, ResolveErrorKind};
use hickory_resolver::proto::rr::{RData, RecordType};
use hickory_resolver::TokioAsyncResolver;

use crate::config::DNS_LOOKUP_GUARD_SECS;

/// Queries MX (mail exchanger) records for a domain.
///
/// # Returns
///
/// The raw records as `"<preference> <exchange>"` strings, in the order the
/// resolver returned them. An empty vector means the domain has no MX records.
///
/// # Errors
///
/// Returns an error for real lookup failures (timeouts, network errors).
/// "No records" answers, including NXDomain, are reported as an empty vector.
pub async fn lookup_mx_records(domain: &str, resolver: &TokioAsyncResolver) -> Result<Vec<String>> {
    let lookup = tokio::time::timeout(
        Duration::from_secs(DNS_LOOKUP_GUARD_SECS),
        resolver.lookup(domain, RecordType::MX),
    )
    .await
    .map_err(|_| Error::msg(format!("MX lookup for {domain} timed out")))?;

    match lookup {
        Ok(lookup) => Ok(lookup
            .iter()
            .filter_map(|rdata| {
                if let RData::MX(mx) = rdata {
                    Some(format!("{} {}", mx.preference(), mx.exchange()))
                } else {
                    None
                }
            })
            .collect()),
        // Domains without mail servers are common and not a failure
        Err(e) if is_empty_answer(&e) => Ok(Vec::new()),
        Err(e) => {
            if matches!(e.kind(), ResolveErrorKind::Timeout) {
                log::warn!("MX record lookup timed out for {domain}: {e}");
            } else {
                log::warn!("Failed to lookup MX records for {domain}: {e}");
            }
            Err(e.into())
        }
    }
}

/// Whether a lookup failed only because the answer was empty (NoError or NXDomain).
fn is_empty_answer(error: &ResolveError) -> bool {
    matches!(error.kind(), ResolveErrorKind::NoRecordsFound { .. })
}
