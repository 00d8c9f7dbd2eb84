//! Logger initialization.
//!
//! Log lines name the pikephish component that wrote them (`scan`, `checker`,
//! `storage::history`, ...) rather than the full module path; dependency
//! targets are kept as is.

use std::io::Write;

use chrono::{SecondsFormat, Utc};
use colored::*;
use log::{Level, LevelFilter};

use crate::config::LogFormat;
use crate::error_handling::InitializationError;

/// Dependencies clamped below the requested level.
const DEPENDENCY_LEVELS: &[(&str, LevelFilter)] = &[
    ("html5ever", LevelFilter::Error),
    ("selectors", LevelFilter::Warn),
    ("sqlx", LevelFilter::Warn),
    ("reqwest", LevelFilter::Info),
    ("hyper", LevelFilter::Info),
    ("rustls", LevelFilter::Warn),
    // Truncated/malformed UDP answers are retried by hickory itself
    ("hickory_proto", LevelFilter::Error),
];

/// Initializes the logger with the specified level and format.
///
/// `RUST_LOG` is read first; `level` then applies to pikephish and, clamped by
/// `DEPENDENCY_LEVELS`, to its dependencies. Plain lines are colored, JSON
/// lines carry `ts` (RFC 3339, UTC), `level`, `component` and `msg`.
///
/// # Errors
///
/// Returns `InitializationError::LoggerError` if a logger is already installed.
///
/// # Examples
///
/// ```bash
/// RUST_LOG=hickory_resolver=debug pikephish check example.com
/// pikephish --log-format json watch observed.txt
/// ```
pub fn init_logger_with(level: LevelFilter, format: LogFormat) -> Result<(), InitializationError> {
    let mut builder = env_logger::Builder::from_default_env();

    builder.filter_level(level);
    for (module, cap) in DEPENDENCY_LEVELS {
        builder.filter_module(module, level.min(*cap));
    }
    builder.filter_module(env!("CARGO_CRATE_NAME"), level);

    match format {
        LogFormat::Json => builder.format(|buf, record| {
            let line = json_line(
                record.level(),
                component(record.target()),
                &record.args().to_string(),
            );
            writeln!(buf, "{line}")
        }),
        LogFormat::Plain => builder.format(|buf, record| {
            writeln!(
                buf,
                "{} {:<5} {} {}",
                Utc::now().format("%H:%M:%S%.3f").to_string().as_str().dimmed(),
                colored_level(record.level()),
                component(record.target()).cyan(),
                record.args()
            )
        }),
    };

    builder.try_init().map_err(InitializationError::from)
}

/// Strips the crate prefix from pikephish targets.
fn component(target: &str) -> &str {
    let crate_name = env!("CARGO_CRATE_NAME");
    match target.strip_prefix(crate_name) {
        Some("") => crate_name,
        Some(rest) => rest.strip_prefix("::").unwrap_or(target),
        None => target,
    }
}

fn colored_level(level: Level) -> ColoredString {
    let name = level.as_str();
    match level {
        Level::Error => name.red().bold(),
        Level::Warn => name.yellow(),
        Level::Info => name.green(),
        Level::Debug => name.blue(),
        Level::Trace => name.purple(),
    }
}

fn json_line(level: Level, component: &str, msg: &str) -> String {
    serde_json::json!({
        "ts": Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        "level": level.as_str(),
        "component": component,
        "msg": msg,
    })
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_component_strips_crate_prefix() {
        assert_eq!(component("pikephish::scan"), "scan");
        assert_eq!(component("pikephish::storage::history"), "storage::history");
        assert_eq!(component("pikephish"), "pikephish");
        assert_eq!(component("pikephishing::x"), "pikephishing::x");
        assert_eq!(component("hickory_proto::udp"), "hickory_proto::udp");
    }

    #[test]
    fn test_json_line_is_one_object() {
        let line = json_line(Level::Warn, "monitor", "Phishing detected: \"https://x.test\"\n");
        assert!(!line.contains('\n'));
        let value: serde_json::Value = serde_json::from_str(&line).expect("valid JSON");
        assert_eq!(value["level"], "WARN");
        assert_eq!(value["component"], "monitor");
        assert_eq!(value["msg"], "Phishing detected: \"https://x.test\"\n");
        assert!(value["ts"].as_str().is_some_and(|ts| ts.ends_with('Z')));
    }

    #[test]
    fn test_init_logger_twice_does_not_panic() {
        let first = init_logger_with(LevelFilter::Info, LogFormat::Plain);
        let second = init_logger_with(LevelFilter::Debug, LogFormat::Json);
        // At most one logger can be installed per process
        assert!(first.is_err() || second.is_err());
    }
}
