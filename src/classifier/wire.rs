//! Wire format of the classifier's `predict` endpoint.
//!
//! Every request field is a string or `null`; booleans and numbers travel in
//! their `to_string` form and dates as `YYYY-MM-DDTHH:MM:SS` in UTC.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::scan::FeatureRecord;

const WIRE_DATE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Request body for `POST <base>/predict`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
#[allow(missing_docs)]
pub struct PredictRequest {
    pub url: String,
    pub final_url: Option<String>,
    pub status_code: Option<String>,
    pub is_https: Option<String>,
    pub ssl_issuer: Option<String>,
    pub ssl_valid_from: Option<String>,
    pub ssl_valid_to: Option<String>,
    /// Domain age lookups are not performed; always `null`
    pub age_days: Option<String>,
    /// Registrar lookups are not performed; always `null`
    pub registrar: Option<String>,
    pub has_mx: Option<String>,
    pub mx_records_json: Option<String>,
    pub ip: Option<String>,
    pub subdomain_count: Option<String>,
    pub has_login_form: Option<String>,
    pub has_iframe: Option<String>,
    pub js_eval_like: Option<String>,
    pub overlay_attempt: Option<String>,
    pub notification_injection: Option<String>,
    pub webview_misuse: Option<String>,
    pub instant_app_flag: Option<String>,
    pub collected_at: Option<String>,
}

fn wire_date(date: &DateTime<Utc>) -> String {
    date.format(WIRE_DATE_FORMAT).to_string()
}

impl From<&FeatureRecord> for PredictRequest {
    fn from(record: &FeatureRecord) -> Self {
        let ssl = record.ssl.as_ref();
        let dns = record.dns.as_ref();
        let html = record.html.as_ref();
        let flag = |f: fn(&crate::html::HtmlInfo) -> bool| html.map(|h| f(h).to_string());

        Self {
            url: record.url.clone(),
            final_url: record.final_url.clone(),
            status_code: record.status_code.map(|s| s.to_string()),
            is_https: Some(record.is_https.to_string()),
            ssl_issuer: ssl.map(|s| s.issuer.clone()),
            ssl_valid_from: ssl.map(|s| wire_date(&s.valid_from)),
            ssl_valid_to: ssl.map(|s| wire_date(&s.valid_to)),
            age_days: None,
            registrar: None,
            has_mx: dns.map(|d| d.has_mx.to_string()),
            mx_records_json: dns
                .and_then(|d| d.mx_records.as_ref())
                .map(|records| records.join(";")),
            ip: dns.and_then(|d| d.ip.clone()),
            subdomain_count: record.subdomain_count.map(|n| n.to_string()),
            has_login_form: flag(|h| h.has_login_form),
            has_iframe: flag(|h| h.has_iframe),
            js_eval_like: flag(|h| h.js_eval_like),
            overlay_attempt: flag(|h| h.overlay_attempt),
            notification_injection: flag(|h| h.notification_injection),
            webview_misuse: Some(record.webview_misuse.to_string()),
            instant_app_flag: flag(|h| h.instant_app_flag),
            collected_at: Some(record.collected_at.to_string()),
        }
    }
}

/// Response body of the `predict` endpoint.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
#[allow(missing_docs)]
pub struct PredictResponse {
    /// Echo of the classified URL, ignored
    #[serde(default)]
    pub url: Option<String>,
    pub is_phishing: bool,
    pub confidence: f64,
    pub prediction: String,
    #[serde(default)]
    pub reason: Option<String>,
}
