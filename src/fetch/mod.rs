//! Page fetching.
//!
//! Issues the single bounded GET of a scan. Redirects are followed by the
//! client; timeouts and the User-Agent come from `init_client`. Any HTTP status
//! is a successful fetch: a 404 or 503 is itself a signal for the classifier.
//! The body is decoded with the charset named in `Content-Type`, UTF-8 otherwise.

use anyhow::{Context, Result};
use encoding_rs::{Encoding, UTF_8};
use log::debug;
use reqwest::header::CONTENT_TYPE;

use crate::config::MAX_RESPONSE_BODY_SIZE;

/// Result of a page fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedPage {
    /// URL after all redirects
    pub final_url: String,
    /// HTTP status code of the final response
    pub status: u16,
    /// Response body decoded with its declared charset (lossy), truncated at
    /// `MAX_RESPONSE_BODY_SIZE` bytes before decoding
    pub body: String,
}

/// Fetches `url` with the given client and reads at most `MAX_RESPONSE_BODY_SIZE`
/// bytes of body.
///
/// # Errors
///
/// Returns an error if the request cannot be sent (DNS, connect, TLS, timeout,
/// redirect loop) or if reading the body fails midway.
pub async fn fetch_page(client: &reqwest::Client, url: &str) -> Result<FetchedPage> {
    let mut response = client
        .get(url)
        .send()
        .await
        .with_context(|| format!("request to {url} failed"))?;

    let status = response.status().as_u16();
    let final_url = response.url().to_string();
    let encoding = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .map_or(UTF_8, body_encoding);
    debug!("HTTP {status} for {url} (final: {final_url}, charset: {})", encoding.name());

    let mut body: Vec<u8> = Vec::new();
    while let Some(chunk) = response
        .chunk()
        .await
        .with_context(|| format!("reading body of {final_url} failed"))?
    {
        let remaining = MAX_RESPONSE_BODY_SIZE - body.len();
        if chunk.len() >= remaining {
            body.extend_from_slice(&chunk[..remaining]);
            debug!("Body of {final_url} truncated at {MAX_RESPONSE_BODY_SIZE} bytes");
            break;
        }
        body.extend_from_slice(&chunk);
    }

    Ok(FetchedPage {
        final_url,
        status,
        body: encoding.decode(&body).0.into_owned(),
    })
}

/// Encoding named by the `charset` parameter of a Content-Type value.
///
/// Missing or unknown labels fall back to UTF-8.
fn body_encoding(content_type: &str) -> &'static Encoding {
    content_type
        .split(';')
        .skip(1)
        .filter_map(|param| param.split_once('='))
        .find(|(name, _)| name.trim().eq_ignore_ascii_case("charset"))
        .and_then(|(_, label)| Encoding::for_label(label.trim().trim_matches('"').as_bytes()))
        .unwrap_or(UTF_8)
}
