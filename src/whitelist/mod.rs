//! Trusted-domain whitelist.
//!
//! A built-in list of widely used domains plus custom domains added at
//! runtime. A domain is trusted when it equals a listed domain or is one of its
//! subdomains. Consulted by checks only under `WhitelistPolicy::SkipTrusted`.

use std::collections::{BTreeSet, HashSet};
use std::sync::{PoisonError, RwLock};

use log::debug;

/// Decides whether a domain is trusted.
pub trait DomainTrust: Send + Sync {
    /// Whether `domain` is trusted. Blank input is never trusted.
    fn is_trusted(&self, domain: &str) -> bool;
}

const DEFAULT_TRUSTED_DOMAINS: &[&str] = &[
    // Search and mail
    "google.com",
    "gmail.com",
    "google.ru",
    "yandex.ru",
    "yandex.com",
    "ya.ru",
    "mail.ru",
    "rambler.ru",
    // Social
    "vk.com",
    "vk.ru",
    "ok.ru",
    "odnoklassniki.ru",
    "facebook.com",
    "fb.com",
    "instagram.com",
    "twitter.com",
    "x.com",
    "linkedin.com",
    "tiktok.com",
    "telegram.org",
    // Video
    "youtube.com",
    "youtu.be",
    "rutube.ru",
    "twitch.tv",
    "vimeo.com",
    // Development
    "github.com",
    "gitlab.com",
    "stackoverflow.com",
    "stackexchange.com",
    "habr.com",
    // Shopping and reference
    "wikipedia.org",
    "amazon.com",
    "amazon.ru",
    "ozon.ru",
    "wildberries.ru",
    "avito.ru",
    "aliexpress.com",
    "aliexpress.ru",
    // Banks
    "sberbank.ru",
    "sbrf.ru",
    "tinkoff.ru",
    "alfabank.ru",
    "vtb.ru",
    // Government services
    "gosuslugi.ru",
    "esia.gosuslugi.ru",
    // Storage
    "drive.google.com",
    "dropbox.com",
    "cloud.mail.ru",
    "disk.yandex.ru",
    // Messaging
    "web.whatsapp.com",
    "web.telegram.org",
    // Other
    "microsoft.com",
    "office.com",
    "apple.com",
    "icloud.com",
    "reddit.com",
    "zoom.us",
];

/// Built-in trusted domains plus runtime additions.
#[derive(Debug, Default)]
pub struct TrustedDomains {
    custom: RwLock<HashSet<String>>,
}

fn normalize_domain(domain: &str) -> String {
    domain.trim().to_lowercase()
}

fn matches(domain: &str, trusted: &str) -> bool {
    domain == trusted
        || domain
            .strip_suffix(trusted)
            .is_some_and(|prefix| prefix.ends_with('.'))
}

impl TrustedDomains {
    /// Whitelist with only the built-in domains.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whitelist with the built-in domains and `custom`.
    pub fn with_custom<I, S>(custom: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let trusted = Self::new();
        for domain in custom {
            trusted.add_custom_domain(domain.as_ref());
        }
        trusted
    }

    /// Adds a custom domain. Returns `false` for blank or already present input.
    pub fn add_custom_domain(&self, domain: &str) -> bool {
        let normalized = normalize_domain(domain);
        if normalized.is_empty() {
            return false;
        }
        let added = self
            .custom
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(normalized);
        if added {
            debug!("Trusted custom domain {domain}");
        }
        added
    }

    /// Removes a custom domain. Returns whether it was present.
    pub fn remove_custom_domain(&self, domain: &str) -> bool {
        self.custom
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&normalize_domain(domain))
    }

    /// Removes every custom domain.
    pub fn clear_custom_domains(&self) {
        self.custom
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    /// Custom domains, sorted.
    pub fn custom_domains(&self) -> BTreeSet<String> {
        self.custom
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .cloned()
            .collect()
    }

    /// Built-in and custom domains, sorted.
    pub fn all_trusted_domains(&self) -> BTreeSet<String> {
        let mut all = self.custom_domains();
        all.extend(DEFAULT_TRUSTED_DOMAINS.iter().map(|d| d.to_string()));
        all
    }
}

impl DomainTrust for TrustedDomains {
    fn is_trusted(&self, domain: &str) -> bool {
        let domain = normalize_domain(domain);
        if domain.is_empty() {
            return false;
        }
        if DEFAULT_TRUSTED_DOMAINS.iter().any(|t| matches(&domain, t)) {
            return true;
        }
        self.custom
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .any(|t| matches(&domain, t))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_domains_and_subdomains() {
        let trusted = TrustedDomains::new();
        assert!(trusted.is_trusted("github.com"));
        assert!(trusted.is_trusted("  GitHub.COM "));
        assert!(trusted.is_trusted("gist.github.com"));
        assert!(!trusted.is_trusted("evilgithub.com"));
        assert!(!trusted.is_trusted("github.com.evil.test"));
        assert!(!trusted.is_trusted(""));
        assert!(!trusted.is_trusted("   "));
    }

    #[test]
    fn test_custom_domains_lifecycle() {
        let trusted = TrustedDomains::new();
        assert!(!trusted.is_trusted("intranet.corp"));

        assert!(trusted.add_custom_domain(" Intranet.Corp "));
        assert!(!trusted.add_custom_domain("intranet.corp"));
        assert!(!trusted.add_custom_domain("  "));
        assert!(trusted.is_trusted("wiki.intranet.corp"));
        assert_eq!(
            trusted.custom_domains().into_iter().collect::<Vec<_>>(),
            vec!["intranet.corp".to_string()]
        );

        assert!(trusted.remove_custom_domain("INTRANET.corp"));
        assert!(!trusted.remove_custom_domain("intranet.corp"));
        assert!(!trusted.is_trusted("intranet.corp"));
    }

    #[test]
    fn test_clear_and_all_trusted() {
        let trusted = TrustedDomains::with_custom(["a.test", "b.test"]);
        let all = trusted.all_trusted_domains();
        assert!(all.contains("a.test"));
        assert!(all.contains("zoom.us"));
        assert_eq!(all.len(), DEFAULT_TRUSTED_DOMAINS.len() + 2);

        trusted.clear_custom_domains();
        assert!(trusted.custom_domains().is_empty());
        assert!(!trusted.is_trusted("a.test"));
    }
}
