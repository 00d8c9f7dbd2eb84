//! Classification verdict.

use serde::Serialize;
use strum_macros::{AsRefStr, Display, EnumString};

use super::wire::PredictResponse;
use crate::error_handling::ClassifierError;

/// Label assigned by the classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display, EnumString, AsRefStr)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum VerdictLabel {
    /// The page is judged to be phishing
    Phishing,
    /// The page is judged to be legitimate
    Legitimate,
}

/// Outcome of classifying one feature record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassificationVerdict {
    /// Whether the URL is judged to be phishing
    pub is_phishing: bool,
    /// Confidence in `[0, 1]`
    pub confidence: f64,
    /// Predicted label
    pub label: VerdictLabel,
    /// Optional explanation
    pub reason: Option<String>,
}

impl TryFrom<PredictResponse> for ClassificationVerdict {
    type Error = ClassifierError;

    fn try_from(response: PredictResponse) -> Result<Self, Self::Error> {
        if !(0.0..=1.0).contains(&response.confidence) {
            return Err(ClassifierError::MalformedBody(format!(
                "confidence {} outside [0, 1]",
                response.confidence
            )));
        }
        let label = response
            .prediction
            .trim()
            .parse::<VerdictLabel>()
            .map_err(|_| {
                ClassifierError::MalformedBody(format!(
                    "unknown prediction label '{}'",
                    response.prediction
                ))
            })?;
        Ok(Self {
            is_phishing: response.is_phishing,
            confidence: response.confidence,
            label,
            reason: response.reason,
        })
    }
}
