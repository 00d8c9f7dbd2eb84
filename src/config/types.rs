//! Configuration types.
//!
//! This module defines the library configuration struct, its validation, and the
//! small enums selecting logging and cache/whitelist policies.

use std::path::PathBuf;

use clap::ValueEnum;

use crate::config::constants::{
    CLASSIFIER_TIMEOUT_SECS, DB_PATH, DEFAULT_CLASSIFIER_URL, DEFAULT_HISTORY_LIMIT,
    DEFAULT_MAX_CONCURRENCY, DEFAULT_USER_AGENT, FETCH_CONNECT_TIMEOUT_SECS,
    FETCH_READ_TIMEOUT_SECS, MAX_CONCURRENCY_LIMIT, MAX_HISTORY_LIMIT,
};

/// Logging level for the application.
///
/// Controls the verbosity of log output, from most restrictive (Error) to most
/// verbose (Trace).
#[derive(Clone, Debug, ValueEnum)]
pub enum LogLevel {
    /// Only error messages
    Error,
    /// Error and warning messages
    Warn,
    /// Error, warning, and informational messages
    Info,
    /// All messages except trace
    Debug,
    /// All messages including trace
    Trace,
}

impl From<LogLevel> for log::LevelFilter {
    fn from(l: LogLevel) -> Self {
        match l {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

/// Log output format.
///
/// - `Plain`: Human-readable format with colors (default)
/// - `Json`: Structured JSON format for machine parsing
#[derive(Clone, Debug, ValueEnum)]
pub enum LogFormat {
    /// Human-readable format with colors (default)
    Plain,
    /// Structured JSON format for machine parsing
    Json,
}

/// Whether the trusted-domain whitelist is consulted before extraction.
///
/// The whitelist exists as a capability but is not part of the default check
/// path. `SkipTrusted` is an explicit opt-in that changes behavior: trusted
/// domains get a "legitimate" verdict without any network work, classification
/// or history write.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum WhitelistPolicy {
    /// Never consult the whitelist (default)
    #[default]
    Ignore,
    /// Return a trusted verdict for whitelisted domains
    SkipTrusted,
}

/// How the history store treats a new verdict for a URL that is already stored.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum DuplicatePolicy {
    /// Append a new row; older rows for the same URL remain until pruned (default)
    #[default]
    Append,
    /// Delete older rows for the same URL in the same transaction as the insert
    ReplaceExisting,
}

/// Library configuration (no CLI dependencies).
///
/// # Examples
///
/// ```no_run
/// use pikephish::Config;
/// use std::path::PathBuf;
///
/// let config = Config {
///     db_path: PathBuf::from("history.db"),
///     classifier_url: "http://10.0.2.2:8000/".to_string(),
///     ..Default::default()
/// };
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    /// Log level
    pub log_level: LogLevel,

    /// Log format
    pub log_format: LogFormat,

    /// Database path (SQLite file)
    pub db_path: PathBuf,

    /// Base URL of the classification service (the `predict` endpoint is joined to it)
    pub classifier_url: String,

    /// Number of history records retained after each successful check
    pub history_limit: u32,

    /// Page fetch connect timeout in seconds
    pub fetch_connect_timeout_seconds: u64,

    /// Page fetch read timeout in seconds
    pub fetch_read_timeout_seconds: u64,

    /// Classifier request timeout in seconds
    pub classifier_timeout_seconds: u64,

    /// HTTP User-Agent header value for page fetches
    pub user_agent: String,

    /// Maximum concurrent background checks in watch mode
    pub max_concurrency: usize,

    /// Whitelist consultation policy
    pub whitelist_policy: WhitelistPolicy,

    /// Duplicate URL handling in the history store
    pub duplicate_policy: DuplicatePolicy,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: LogLevel::Info,
            log_format: LogFormat::Plain,
            db_path: PathBuf::from(DB_PATH),
            classifier_url: DEFAULT_CLASSIFIER_URL.to_string(),
            history_limit: DEFAULT_HISTORY_LIMIT,
            fetch_connect_timeout_seconds: FETCH_CONNECT_TIMEOUT_SECS,
            fetch_read_timeout_seconds: FETCH_READ_TIMEOUT_SECS,
            classifier_timeout_seconds: CLASSIFIER_TIMEOUT_SECS,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            max_concurrency: DEFAULT_MAX_CONCURRENCY,
            whitelist_policy: WhitelistPolicy::Ignore,
            duplicate_policy: DuplicatePolicy::Append,
        }
    }
}

/// A configuration field that failed validation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid {field}: {message}")]
pub struct ConfigValidationError {
    /// Name of the offending field
    pub field: &'static str,
    /// What is wrong and what is accepted
    pub message: String,
}

impl ConfigValidationError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl Config {
    /// Checks that every field holds a usable value.
    ///
    /// # Errors
    ///
    /// Returns the first invalid field with a message describing the accepted range.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if self.history_limit == 0 || self.history_limit > MAX_HISTORY_LIMIT {
            return Err(ConfigValidationError::new(
                "history_limit",
                format!("must be between 1 and {MAX_HISTORY_LIMIT}"),
            ));
        }
        if self.max_concurrency == 0 || self.max_concurrency > MAX_CONCURRENCY_LIMIT {
            return Err(ConfigValidationError::new(
                "max_concurrency",
                format!("must be greater than 0 and at most {MAX_CONCURRENCY_LIMIT}"),
            ));
        }
        for (field, value) in [
            (
                "fetch_connect_timeout_seconds",
                self.fetch_connect_timeout_seconds,
            ),
            ("fetch_read_timeout_seconds", self.fetch_read_timeout_seconds),
            ("classifier_timeout_seconds", self.classifier_timeout_seconds),
        ] {
            if value == 0 {
                return Err(ConfigValidationError::new(field, "must be greater than 0"));
            }
        }
        if self.user_agent.trim().is_empty() {
            return Err(ConfigValidationError::new(
                "user_agent",
                "must not be empty",
            ));
        }
        match url::Url::parse(&self.classifier_url) {
            Ok(parsed) if matches!(parsed.scheme(), "http" | "https") => Ok(()),
            Ok(parsed) => Err(ConfigValidationError::new(
                "classifier_url",
                format!("unsupported scheme '{}', expected http or https", parsed.scheme()),
            )),
            Err(e) => Err(ConfigValidationError::new(
                "classifier_url",
                format!("not a valid URL ({e}), expected e.g. http://127.0.0.1:8000/"),
            )),
        }
    }
}
