//! Error type definitions.
//!
//! This module defines the typed errors surfaced to callers and the enum naming
//! each extraction source whose failure is recorded in a feature record.

use log::SetLoggerError;
use reqwest::Error as ReqwestError;
use strum_macros::EnumIter as EnumIterMacro;
use thiserror::Error;

/// Error types for initialization failures.
#[derive(Error, Debug)]
#[allow(clippy::enum_variant_names)] // All variants end with "Error" by convention
pub enum InitializationError {
    /// Error initializing the logger.
    #[error("Logger initialization error: {0}")]
    LoggerError(#[from] SetLoggerError),

    /// Error initializing an HTTP client.
    #[error("HTTP client initialization error: {0}")]
    HttpClientError(#[from] ReqwestError),

    /// The classifier base URL cannot be joined with the predict endpoint.
    #[error("Classifier URL error: {0}")]
    ClassifierUrlError(String),
}

/// Error types for history store operations.
#[derive(Error, Debug)]
pub enum DatabaseError {
    /// Error creating the database file.
    #[error("Database file creation error: {0}")]
    FileCreationError(String),

    /// SQL execution error.
    #[error("SQL error: {0}")]
    SqlError(#[from] sqlx::Error),

    /// Schema migration error.
    #[error("Migration error: {0}")]
    MigrationError(#[from] sqlx::migrate::MigrateError),

    /// A stored row holds a value the model cannot represent.
    #[error("Corrupt history row {id}: {reason}")]
    CorruptRow {
        /// Row id
        id: i64,
        /// What could not be decoded
        reason: String,
    },
}

/// Failure to obtain a verdict from the classification service.
///
/// No partial verdict is ever produced alongside one of these.
#[derive(Error, Debug)]
pub enum ClassifierError {
    /// The request could not be sent or the response could not be read.
    #[error("Classifier transport error: {0}")]
    Transport(#[from] ReqwestError),

    /// The service answered with a non-2xx status.
    #[error("Classifier server error: {status} {message}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Canonical reason phrase (or "unknown")
        message: String,
    },

    /// The service answered 2xx with an empty body.
    #[error("Classifier returned an empty body")]
    EmptyBody,

    /// The body is not a valid verdict.
    #[error("Classifier returned a malformed body: {0}")]
    MalformedBody(String),
}

/// Failure of a top-level URL check.
///
/// Store write failures are not represented here: a verdict that was obtained
/// but could not be persisted is still returned to the caller (see
/// `CheckOutcome::persist_error`).
#[derive(Error, Debug)]
pub enum CheckError {
    /// The classifier did not produce a verdict.
    #[error(transparent)]
    Classification(#[from] ClassifierError),
}

/// Sources whose failure is recorded as an entry in a feature record's error list.
///
/// The declaration order is the order in which error entries appear.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIterMacro)]
pub enum ExtractionSource {
    /// Host could not be extracted from the canonical URL
    Domain,
    /// Page fetch failed (connect, read, redirect, timeout)
    Http,
    /// HTML analysis failed on a fetched body
    Html,
    /// Address resolution failed
    Dns,
    /// Certificate inspection failed
    Tls,
}

impl std::fmt::Display for ExtractionSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl ExtractionSource {
    /// Prefix used for error-list entries of this source.
    pub fn as_str(&self) -> &'static str {
        match self {
            ExtractionSource::Domain => "Domain extraction failed",
            ExtractionSource::Http => "HTTP failed",
            ExtractionSource::Html => "HTML analysis failed",
            ExtractionSource::Dns => "DNS analysis failed",
            ExtractionSource::Tls => "SSL analysis failed",
        }
    }

    /// Formats an error-list entry for this source.
    pub fn describe(&self, detail: impl std::fmt::Display) -> String {
        format!("{}: {}", self.as_str(), detail)
    }
}
