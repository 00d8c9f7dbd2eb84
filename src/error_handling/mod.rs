//! Error handling.
//!
//! This module provides:
//! - Typed errors for initialization, the history store, the classifier and
//!   top-level checks
//! - `ExtractionSource`, naming each source whose failure degrades a feature
//!   record instead of aborting the scan
//!
//! Error kinds are kept apart on purpose:
//! - **Extraction failures** become strings in the feature record's error list
//! - **Classification failures** surface as `CheckError`, nothing is persisted
//! - **Store write failures** travel next to a successful verdict

mod types;

// Re-export public API
pub use types::{
    CheckError, ClassifierError, DatabaseError, ExtractionSource, InitializationError,
};

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn test_extraction_source_prefixes_are_distinct() {
        let prefixes: std::collections::HashSet<_> =
            ExtractionSource::iter().map(|s| s.as_str()).collect();
        assert_eq!(prefixes.len(), ExtractionSource::iter().count());
    }

    #[test]
    fn test_extraction_source_describe() {
        let entry = ExtractionSource::Http.describe("connection refused");
        assert_eq!(entry, "HTTP failed: connection refused");
    }

    #[test]
    fn test_extraction_source_order() {
        let order: Vec<_> = ExtractionSource::iter().collect();
        assert_eq!(
            order,
            vec![
                ExtractionSource::Domain,
                ExtractionSource::Http,
                ExtractionSource::Html,
                ExtractionSource::Dns,
                ExtractionSource::Tls,
            ]
        );
    }

    #[test]
    fn test_classifier_status_error_message() {
        let err = ClassifierError::Status {
            status: 500,
            message: "Internal Server Error".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Classifier server error: 500 Internal Server Error"
        );
        let check: CheckError = err.into();
        assert!(check.to_string().contains("500"));
    }
}
