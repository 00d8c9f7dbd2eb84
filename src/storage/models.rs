//! History row model.

use serde::Serialize;
use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use strum_macros::{AsRefStr, Display, EnumString};

use crate::classifier::{ClassificationVerdict, VerdictLabel};
use crate::error_handling::DatabaseError;

/// Who asked for a check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display, EnumString, AsRefStr)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum CheckSource {
    /// Explicit user request
    Manual,
    /// Passive observation of URLs in the environment
    Background,
}

/// One stored verdict. Callers always receive copies.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoryRecord {
    /// Row id, assigned by the store
    pub id: i64,
    /// Canonical URL string the verdict belongs to
    pub url: String,
    /// Host of `url`, when it could be extracted
    pub domain: Option<String>,
    /// Whether the URL was judged to be phishing
    pub is_phishing: bool,
    /// Classifier confidence in `[0, 1]`
    pub confidence: f64,
    /// Predicted label
    pub prediction: VerdictLabel,
    /// Optional explanation from the classifier
    pub reason: Option<String>,
    /// Check time in epoch milliseconds
    pub checked_at: i64,
    /// Who asked for the check
    pub source: CheckSource,
}

/// Column list matching `HistoryRecord::from_row`.
pub(crate) const HISTORY_COLUMNS: &str =
    "id, url, domain, is_phishing, confidence, prediction, reason, checked_at, source";

impl HistoryRecord {
    /// Decodes a row selected with `HISTORY_COLUMNS`.
    pub(crate) fn from_row(row: &SqliteRow) -> Result<Self, DatabaseError> {
        let id: i64 = row.try_get("id")?;
        let prediction: String = row.try_get("prediction")?;
        let source: String = row.try_get("source")?;

        Ok(Self {
            id,
            url: row.try_get("url")?,
            domain: row.try_get("domain")?,
            is_phishing: row.try_get("is_phishing")?,
            confidence: row.try_get("confidence")?,
            prediction: prediction.parse().map_err(|_| DatabaseError::CorruptRow {
                id,
                reason: format!("unknown prediction '{prediction}'"),
            })?,
            reason: row.try_get("reason")?,
            checked_at: row.try_get("checked_at")?,
            source: source.parse().map_err(|_| DatabaseError::CorruptRow {
                id,
                reason: format!("unknown source '{source}'"),
            })?,
        })
    }

    /// The stored verdict.
    pub fn verdict(&self) -> ClassificationVerdict {
        ClassificationVerdict {
            is_phishing: self.is_phishing,
            confidence: self.confidence,
            label: self.prediction,
            reason: self.reason.clone(),
        }
    }
}
