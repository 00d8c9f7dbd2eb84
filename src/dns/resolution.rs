//! IP address resolution.

use std::time::Duration;

use anyhow::{Error, Result};
use hickory_resolver::TokioAsyncResolver;

use crate::config::DNS_LOOKUP_GUARD_SECS;

/// Resolves a hostname to an IP address using DNS.
///
/// # Returns
///
/// The first IP address found, as a string.
///
/// # Errors
///
/// Returns an error if resolution fails, times out, or yields no addresses.
pub async fn resolve_host_to_ip(host: &str, resolver: &TokioAsyncResolver) -> Result<String> {
    let lookup = tokio::time::timeout(
        Duration::from_secs(DNS_LOOKUP_GUARD_SECS),
        resolver.lookup_ip(host),
    )
    .await
    .map_err(|_| Error::msg(format!("address lookup for {host} timed out")))?
    .map_err(Error::new)?;

    let ip = lookup
        .iter()
        .next()
        .ok_or_else(|| Error::msg("No IP addresses found"))?
        .to_string();
    Ok(ip)
}
