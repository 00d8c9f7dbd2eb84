//! Configuration constants.
//!
//! Timeouts, size limits and defaults shared by the extractors, the classifier
//! client and the history store.

// HTTP fetch of the scanned page
/// TCP connect timeout for the page fetch, in seconds
pub const FETCH_CONNECT_TIMEOUT_SECS: u64 = 15;
/// Read timeout for the page fetch, in seconds
pub const FETCH_READ_TIMEOUT_SECS: u64 = 15;

/// Identifying User-Agent sent with every page fetch.
///
/// The scanner does not try to pass as a browser; sites that block it simply
/// show up as a failed or unusual HTTP signal in the feature record.
pub const DEFAULT_USER_AGENT: &str = "PikePhish/1.0 (+https://github.com/pikephish)";

// Network operation timeouts
/// DNS query timeout in seconds (per attempt)
/// Most DNS queries complete in <1s, 3s fails fast on unresponsive servers
pub const DNS_TIMEOUT_SECS: u64 = 3;
/// DNS attempts per query
pub const DNS_ATTEMPTS: usize = 2;
/// Outer guard around a whole DNS lookup (address or MX), in seconds
/// Covers both resolver attempts plus scheduling slack
pub const DNS_LOOKUP_GUARD_SECS: u64 = 8;
/// TCP connection timeout for the certificate inspection, in seconds
pub const TCP_CONNECT_TIMEOUT_SECS: u64 = 5;
/// TLS handshake timeout for the certificate inspection, in seconds
pub const TLS_HANDSHAKE_TIMEOUT_SECS: u64 = 5;
/// Port used for certificate inspection
pub const TLS_PORT: u16 = 443;

// Classifier
/// Default base URL of the classification service
pub const DEFAULT_CLASSIFIER_URL: &str = "http://127.0.0.1:8000/";
/// Endpoint (relative to the base URL) receiving feature records
pub const CLASSIFIER_PREDICT_PATH: &str = "predict";
/// Classifier connect/read/write timeout in seconds
pub const CLASSIFIER_TIMEOUT_SECS: u64 = 30;

// Response and body size limits
/// Maximum response body size in bytes (2MB)
/// Bodies are truncated at this size before HTML analysis
pub const MAX_RESPONSE_BODY_SIZE: usize = 2 * 1024 * 1024;

// Redirect handling
/// Maximum number of redirect hops to follow
pub const MAX_REDIRECT_HOPS: usize = 10;

// History store
/// Default SQLite database path
pub const DB_PATH: &str = "./pikephish.db";
/// Number of history records kept after each successful check
pub const DEFAULT_HISTORY_LIMIT: u32 = 15;
/// Upper bound accepted for `history_limit`
pub const MAX_HISTORY_LIMIT: u32 = 1000;

// Passive observation
/// Default number of background checks in flight at once
pub const DEFAULT_MAX_CONCURRENCY: usize = 8;
/// Upper bound accepted for `max_concurrency`
pub const MAX_CONCURRENCY_LIMIT: usize = 256;

/// Explanation attached to cached verdicts that carried no reason of their own
pub const FROM_CACHE_REASON: &str = "from cache";
/// Explanation attached to verdicts short-circuited by the whitelist
pub const TRUSTED_DOMAIN_REASON: &str = "trusted domain";

