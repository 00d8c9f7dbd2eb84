//! Security header name constants.
//!
//! Response headers are not threaded into the HTML analyzer, so these names are
//! matched against `<meta http-equiv=...>` tags as a proxy for the real headers.

/// Content Security Policy header
pub const HEADER_CONTENT_SECURITY_POLICY: &str = "Content-Security-Policy";
/// X-Frame-Options header
pub const HEADER_X_FRAME_OPTIONS: &str = "X-Frame-Options";

