//! CSS selector parsing utilities.

use scraper::{Html, Selector};

/// Parses a CSS selector, logging instead of failing.
///
/// Returns `None` when the selector does not parse; callers treat a missing
/// selector as one that matches nothing.
///
/// # Arguments
///
/// * `selector_str` - The CSS selector string to parse
/// * `context` - Context description for error logging (e.g., "iframe detection")
pub(crate) fn parse_selector_with_fallback(selector_str: &str, context: &str) -> Option<Selector> {
    match Selector::parse(selector_str) {
        Ok(selector) => Some(selector),
        Err(e) => {
            log::error!(
                "Failed to parse CSS selector '{}' in {}: {}. Selector disabled.",
                selector_str,
                context,
                e
            );
            None
        }
    }
}

/// Whether `selector` matches at least one element of `document`.
pub(crate) fn matches_any(document: &Html, selector: Option<&Selector>) -> bool {
    selector.is_some_and(|s| document.select(s).next().is_some())
}
