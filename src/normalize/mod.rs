//! URL canonicalization.
//!
//! Turns user-typed or observed URL strings into the scheme + host identity used
//! as the history cache key and as the scan target. Normalization is total: it
//! never rejects input, degenerate inputs simply produce an empty host that the
//! scan later reports as a domain extraction failure.

use std::fmt;

const HTTPS_PREFIX: &str = "https://";
const HTTP_PREFIX: &str = "http://";

/// URL scheme of a canonical URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scheme {
    /// Plain HTTP
    Http,
    /// HTTP over TLS (default when the input names no scheme)
    Https,
}

impl Scheme {
    /// Lowercase scheme name without the `://` separator.
    pub fn as_str(&self) -> &'static str {
        match self {
            Scheme::Http => "http",
            Scheme::Https => "https",
        }
    }
}

impl fmt::Display for Scheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Scheme + host identity of a URL.
///
/// Two inputs share a `CanonicalUrl` iff they share scheme and host after the
/// scheme prefix is stripped case-insensitively. The host keeps its original
/// case.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CanonicalUrl {
    scheme: Scheme,
    host: String,
}

impl CanonicalUrl {
    /// Builds a canonical URL from parts.
    pub fn new(scheme: Scheme, host: impl Into<String>) -> Self {
        Self {
            scheme,
            host: host.into(),
        }
    }

    /// The scheme.
    pub fn scheme(&self) -> Scheme {
        self.scheme
    }

    /// The host segment (may contain a port, may be empty).
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Whether the scheme is `https`.
    pub fn is_https(&self) -> bool {
        self.scheme == Scheme::Https
    }

    /// The string form used as cache key and fetch target: `scheme://host`.
    pub fn as_key(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for CanonicalUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}://{}", self.scheme, self.host)
    }
}

/// Normalizes a raw URL string into its canonical scheme + host form.
///
/// - Surrounding whitespace is trimmed
/// - `https://` / `http://` prefixes are matched case-insensitively, anything
///   else is assumed to be `https`
/// - Everything from the first `/`, `?` or `#` after the host is dropped
///
/// # Examples
///
/// ```
/// use pikephish::normalize::{normalize, Scheme};
///
/// let canonical = normalize("  HTTP://Example.com/login?next=1 ");
/// assert_eq!(canonical.scheme(), Scheme::Http);
/// assert_eq!(canonical.host(), "Example.com");
/// assert_eq!(canonical.to_string(), "http://Example.com");
/// ```
pub fn normalize(raw: &str) -> CanonicalUrl {
    split_url(raw).0
}

/// Normalizes a raw URL and also returns the discarded remainder.
///
/// The remainder is the path, query and fragment exactly as typed (starting with
/// `/`, `?` or `#`), or an empty string. It is not part of the URL's identity.
pub fn split_url(raw: &str) -> (CanonicalUrl, &str) {
    let trimmed = raw.trim();
    let (scheme, rest) = strip_scheme(trimmed);
    let host_end = rest.find(['/', '?', '#']).unwrap_or(rest.len());
    let (host, remainder) = rest.split_at(host_end);
    (CanonicalUrl::new(scheme, host), remainder)
}

fn strip_scheme(input: &str) -> (Scheme, &str) {
    if starts_with_ignore_case(input, HTTPS_PREFIX) {
        (Scheme::Https, &input[HTTPS_PREFIX.len()..])
    } else if starts_with_ignore_case(input, HTTP_PREFIX) {
        (Scheme::Http, &input[HTTP_PREFIX.len()..])
    } else {
        (Scheme::Https, input)
    }
}

fn starts_with_ignore_case(input: &str, prefix: &str) -> bool {
    input
        .get(..prefix.len())
        .is_some_and(|head| head.eq_ignore_ascii_case(prefix))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_adds_https() {
        let canonical = normalize("example.com");
        assert_eq!(canonical.scheme(), Scheme::Https);
        assert_eq!(canonical.host(), "example.com");
    }

    #[test]
    fn test_normalize_strips_path() {
        let canonical = normalize("example.com/path");
        assert_eq!(canonical, CanonicalUrl::new(Scheme::Https, "example.com"));
    }

    #[test]
    fn test_normalize_preserves_http() {
        let canonical = normalize("http://example.com/a/b");
        assert_eq!(canonical.to_string(), "http://example.com");
        assert!(!canonical.is_https());
    }

    #[test]
    fn test_normalize_scheme_is_case_insensitive() {
        assert_eq!(normalize("HTTPS://example.com"), normalize("https://example.com"));
        assert_eq!(normalize("hTtP://example.com").scheme(), Scheme::Http);
    }

    #[test]
    fn test_normalize_trims_whitespace() {
        assert_eq!(normalize("  \texample.com/x \n"), normalize("example.com"));
    }

    #[test]
    fn test_normalize_drops_query_and_fragment_without_path() {
        assert_eq!(normalize("example.com?utm=1").host(), "example.com");
        assert_eq!(normalize("example.com#top").host(), "example.com");
    }

    #[test]
    fn test_normalize_keeps_port_and_host_case() {
        let canonical = normalize("https://Example.COM:8443/login");
        assert_eq!(canonical.host(), "Example.COM:8443");
    }

    #[test]
    fn test_normalize_empty_input_gives_empty_host() {
        let canonical = normalize("   ");
        assert_eq!(canonical.host(), "");
        assert_eq!(canonical.scheme(), Scheme::Https);
        assert_eq!(normalize("https:///path").host(), "");
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let inputs = [
            "example.com",
            "example.com/path?q=1#f",
            "http://sub.example.co.uk/x",
            "HTTPS://Mixed.Case.org",
            "  padded.net  ",
            "localhost:8080/admin",
            "",
        ];
        for input in inputs {
            let once = normalize(input);
            let twice = normalize(&once.to_string());
            assert_eq!(once, twice, "normalize is not idempotent for {input:?}");
        }
    }

    #[test]
    fn test_normalize_without_scheme_is_https() {
        for input in ["a.com", "b.org/x", "ftp.example.com", "http.example.com"] {
            assert_eq!(normalize(input).scheme(), Scheme::Https, "{input}");
        }
    }

    #[test]
    fn test_split_url_returns_remainder() {
        let (canonical, remainder) = split_url("http://example.com/login?next=%2F#top");
        assert_eq!(canonical.to_string(), "http://example.com");
        assert_eq!(remainder, "/login?next=%2F#top");

        let (_, remainder) = split_url("example.com");
        assert_eq!(remainder, "");
    }

    #[test]
    fn test_multibyte_input_does_not_panic() {
        // Prefix slicing must respect char boundaries
        let canonical = normalize("пример.рф/путь");
        assert_eq!(canonical.host(), "пример.рф");
        assert_eq!(normalize("ht").host(), "ht");
    }
}
