//! TLS certificate inspection.
//!
//! Opens a dedicated TCP + TLS connection to port 443 of a domain, separate from
//! the page fetch, and reads the leaf certificate the server presents:
//! - Issuer distinguished name
//! - Validity period (not before / not after)
//! - Whether "now" lies inside that period
//!
//! The handshake accepts any certificate (see `verifier`), so expired and
//! self-signed certificates are reported instead of failing the handshake.
//! Uses `tokio-rustls` for the connection and `x509-parser` for parsing.

mod extract;
mod verifier;

use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, Result};
use chrono::{DateTime, Utc};
use log::{debug, warn};
use rustls::crypto::{ring::default_provider, CryptoProvider};
use rustls::pki_types::ServerName;
use serde::Serialize;
use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;
use tokio_rustls::rustls::ClientConfig;
use tokio_rustls::TlsConnector;

use crate::config::{TCP_CONNECT_TIMEOUT_SECS, TLS_HANDSHAKE_TIMEOUT_SECS, TLS_PORT};

use verifier::InspectOnlyVerifier;

/// Leaf certificate metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SslInfo {
    /// Issuer distinguished name
    pub issuer: String,
    /// Start of the validity window
    pub valid_from: DateTime<Utc>,
    /// End of the validity window
    pub valid_to: DateTime<Utc>,
    /// Whether the inspection time lies inside the validity window
    pub is_valid: bool,
}

/// Retrieves leaf certificate information for `domain` on port 443.
///
/// # Errors
///
/// Returns an error if:
/// - The domain is not a valid TLS server name
/// - TCP connection fails or times out
/// - TLS handshake fails or times out
/// - The server presents no certificate or it cannot be parsed
pub async fn get_ssl_certificate_info(domain: &str) -> Result<SslInfo> {
    inspect_certificate(domain, TLS_PORT).await
}

/// Certificate inspection against an arbitrary port.
///
/// The TCP socket is owned by the TLS stream for the whole function, so it is
/// closed on every return path; the success path also sends close_notify.
pub(crate) async fn inspect_certificate(domain: &str, port: u16) -> Result<SslInfo> {
    debug!("Attempting to get SSL info for domain: {domain}");

    let server_name = ServerName::try_from(domain.to_string())
        .map_err(|e| anyhow!("Invalid domain name {domain}: {e}"))?;

    let sock = match tokio::time::timeout(
        Duration::from_secs(TCP_CONNECT_TIMEOUT_SECS),
        TcpStream::connect((domain, port)),
    )
    .await
    {
        Ok(Ok(sock)) => sock,
        Ok(Err(e)) => {
            warn!("Failed to connect to {domain}:{port} - {e}");
            return Err(anyhow!("Failed to connect to {domain}:{port}: {e}"));
        }
        Err(_) => {
            return Err(anyhow!(
                "TCP connection timeout for {domain}:{port} ({TCP_CONNECT_TIMEOUT_SECS}s)"
            ));
        }
    };

    let connector = TlsConnector::from(Arc::new(inspection_config()?));
    let mut tls_stream = match tokio::time::timeout(
        Duration::from_secs(TLS_HANDSHAKE_TIMEOUT_SECS),
        connector.connect(server_name, sock),
    )
    .await
    {
        Ok(Ok(stream)) => stream,
        Ok(Err(e)) => {
            warn!("TLS handshake failed for {domain}: {e}");
            return Err(anyhow!("TLS handshake failed for {domain}: {e}"));
        }
        Err(_) => {
            return Err(anyhow!(
                "TLS handshake timeout for {domain} ({TLS_HANDSHAKE_TIMEOUT_SECS}s)"
            ));
        }
    };

    let info = tls_stream
        .get_ref()
        .1
        .peer_certificates()
        .and_then(|certs| certs.first())
        .ok_or_else(|| anyhow!("{domain} presented no certificate"))
        .and_then(|leaf| extract::certificate_info(leaf.as_ref(), Utc::now()));

    if let Err(e) = tls_stream.shutdown().await {
        debug!("TLS shutdown for {domain} failed: {e}");
    }

    let info = info?;
    debug!("SSL: Issuer={}, Valid={} for {domain}", info.issuer, info.is_valid);
    Ok(info)
}

fn inspection_config() -> Result<ClientConfig> {
    let provider = CryptoProvider::get_default()
        .cloned()
        .unwrap_or_else(|| Arc::new(default_provider()));
    let config = ClientConfig::builder_with_provider(Arc::clone(&provider))
        .with_safe_default_protocol_versions()?
        .dangerous()
        .with_custom_certificate_verifier(Arc::new(InspectOnlyVerifier::new(provider)))
        .with_no_client_auth();
    Ok(config)
}
