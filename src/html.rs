//! HTML content heuristics.
//!
//! Pure analysis of a fetched page body. Parsing is best-effort (html5ever via
//! `scraper`), so malformed markup yields signals for whatever could be parsed
//! and never an error. Each heuristic is independent:
//! - Password input (login form)
//! - Iframe presence
//! - Inline scripts calling `eval(`
//! - Overlay styling (`position:fixed` or a large `z-index`)
//! - Inline scripts requesting notification permission
//! - Instant-app markers anywhere in the raw text
//! - CSP / X-Frame-Options `<meta http-equiv>` tags

use std::sync::LazyLock;

use regex::Regex;
use scraper::{Html, Selector};
use serde::Serialize;

use crate::config::{HEADER_CONTENT_SECURITY_POLICY, HEADER_X_FRAME_OPTIONS};
use crate::utils::{matches_any, parse_selector_with_fallback};

/// z-index values above this count as an overlay attempt.
const OVERLAY_Z_INDEX_THRESHOLD: u64 = 1000;

static INPUT_SELECTOR: LazyLock<Option<Selector>> =
    LazyLock::new(|| parse_selector_with_fallback("input[type]", "login form detection"));
static IFRAME_SELECTOR: LazyLock<Option<Selector>> =
    LazyLock::new(|| parse_selector_with_fallback("iframe", "iframe detection"));
static SCRIPT_SELECTOR: LazyLock<Option<Selector>> =
    LazyLock::new(|| parse_selector_with_fallback("script", "script inspection"));
static STYLED_SELECTOR: LazyLock<Option<Selector>> =
    LazyLock::new(|| parse_selector_with_fallback("[style]", "overlay detection"));
static META_HTTP_EQUIV_SELECTOR: LazyLock<Option<Selector>> =
    LazyLock::new(|| parse_selector_with_fallback("meta[http-equiv]", "meta header detection"));

// Only the first `z-index:` token of a style attribute is considered.
static Z_INDEX_RE: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(r"z-index:\s*(\d*)")
        .map_err(|e| log::error!("Failed to compile z-index pattern: {e}"))
        .ok()
});

/// Boolean signals extracted from one HTML document.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct HtmlInfo {
    /// A password-type input is present
    pub has_login_form: bool,
    /// An iframe element is present
    pub has_iframe: bool,
    /// An inline script contains `eval(`
    pub js_eval_like: bool,
    /// An element is styled as a fixed or high z-index overlay
    pub overlay_attempt: bool,
    /// An inline script requests notification permission
    pub notification_injection: bool,
    /// The raw text mentions instant apps
    pub instant_app_flag: bool,
    /// A Content-Security-Policy meta tag is present
    pub has_csp: bool,
    /// An X-Frame-Options meta tag is present
    pub has_xfo: bool,
}

/// Analyzes an HTML body.
///
/// Pure and total: no I/O and no failure mode. Text matches are
/// case-insensitive.
pub fn analyze_html(html: &str) -> HtmlInfo {
    let document = Html::parse_document(html);

    let (js_eval_like, notification_injection) = inspect_scripts(&document);
    let (has_csp, has_xfo) = inspect_meta_headers(&document);

    let info = HtmlInfo {
        has_login_form: has_password_input(&document),
        has_iframe: matches_any(&document, IFRAME_SELECTOR.as_ref()),
        js_eval_like,
        overlay_attempt: has_overlay(&document),
        notification_injection,
        instant_app_flag: html.to_ascii_lowercase().contains("instantapps"),
        has_csp,
        has_xfo,
    };

    log::debug!(
        "HTML: login={}, iframe={}, eval={}, overlay={}",
        info.has_login_form,
        info.has_iframe,
        info.js_eval_like,
        info.overlay_attempt
    );
    info
}

fn has_password_input(document: &Html) -> bool {
    let Some(selector) = INPUT_SELECTOR.as_ref() else {
        return false;
    };
    document.select(selector).any(|input| {
        input
            .value()
            .attr("type")
            .is_some_and(|t| t.trim().eq_ignore_ascii_case("password"))
    })
}

/// Returns `(eval_like, notification_request)` over all inline scripts.
fn inspect_scripts(document: &Html) -> (bool, bool) {
    let Some(selector) = SCRIPT_SELECTOR.as_ref() else {
        return (false, false);
    };
    let mut eval_like = false;
    let mut notification = false;
    for script in document.select(selector) {
        let text = script.text().collect::<String>().to_ascii_lowercase();
        eval_like |= text.contains("eval(");
        notification |= text.contains("notification.requestpermission");
        if eval_like && notification {
            break;
        }
    }
    (eval_like, notification)
}

fn has_overlay(document: &Html) -> bool {
    let Some(selector) = STYLED_SELECTOR.as_ref() else {
        return false;
    };
    document.select(selector).any(|element| {
        element
            .value()
            .attr("style")
            .is_some_and(is_overlay_style)
    })
}

/// Whether an inline style declares a fixed position or a z-index above the threshold.
pub(crate) fn is_overlay_style(style: &str) -> bool {
    let style = style.to_ascii_lowercase();
    if style.contains("position:fixed") {
        return true;
    }
    let Some(re) = Z_INDEX_RE.as_ref() else {
        return false;
    };
    re.captures(&style)
        .and_then(|caps| caps.get(1))
        .map(|digits| digits.as_str())
        .filter(|digits| !digits.is_empty())
        // A digit run too long for u64 is far above the threshold
        .is_some_and(|digits| {
            digits
                .parse::<u64>()
                .map_or(true, |z| z > OVERLAY_Z_INDEX_THRESHOLD)
        })
}

/// Returns `(csp, x_frame_options)` presence from `<meta http-equiv>` tags.
fn inspect_meta_headers(document: &Html) -> (bool, bool) {
    let Some(selector) = META_HTTP_EQUIV_SELECTOR.as_ref() else {
        return (false, false);
    };
    let mut csp = false;
    let mut xfo = false;
    for meta in document.select(selector) {
        if let Some(name) = meta.value().attr("http-equiv").map(str::trim) {
            csp |= name.eq_ignore_ascii_case(HEADER_CONTENT_SECURITY_POLICY);
            xfo |= name.eq_ignore_ascii_case(HEADER_X_FRAME_OPTIONS);
        }
    }
    (csp, xfo)
}
