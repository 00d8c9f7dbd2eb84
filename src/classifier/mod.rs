//! Remote classification.
//!
//! Sends a feature record to the classification service and turns its answer
//! into a `ClassificationVerdict`. A non-2xx status, an empty body or a body
//! that is not a valid verdict is a `ClassifierError`; there is no partial
//! verdict and no retry.

mod verdict;
mod wire;

use std::sync::Arc;

use log::{debug, error};
use url::Url;

use crate::config::CLASSIFIER_PREDICT_PATH;
use crate::error_handling::{ClassifierError, InitializationError};
use crate::scan::FeatureRecord;

pub use verdict::{ClassificationVerdict, VerdictLabel};
pub use wire::{PredictRequest, PredictResponse};

/// Client for the `predict` endpoint of the classification service.
#[derive(Clone)]
pub struct ClassifierClient {
    client: Arc<reqwest::Client>,
    endpoint: Url,
}

impl ClassifierClient {
    /// Creates a client posting to `<base_url>/predict`.
    ///
    /// A base URL without a trailing slash is treated as a directory, so
    /// `http://host/api` posts to `http://host/api/predict`.
    pub fn new(client: Arc<reqwest::Client>, base_url: &str) -> Result<Self, InitializationError> {
        Ok(Self {
            client,
            endpoint: predict_endpoint(base_url)?,
        })
    }

    /// Full URL of the `predict` endpoint.
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Classifies a feature record.
    ///
    /// # Errors
    ///
    /// - `Transport` if the request cannot be sent or the body cannot be read
    /// - `Status` for any non-2xx response
    /// - `EmptyBody` for a 2xx response without content
    /// - `MalformedBody` if the body is not JSON of the expected shape, the
    ///   label is unknown, or the confidence lies outside `[0, 1]`
    pub async fn classify(
        &self,
        features: &FeatureRecord,
    ) -> Result<ClassificationVerdict, ClassifierError> {
        let request = PredictRequest::from(features);
        debug!("Sending features of {} to {}", features.url, self.endpoint);

        let response = self
            .client
            .post(self.endpoint.clone())
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let err = ClassifierError::Status {
                status: status.as_u16(),
                message: status.canonical_reason().unwrap_or("unknown").to_string(),
            };
            error!("{err}");
            return Err(err);
        }

        let body = response.text().await?;
        if body.trim().is_empty() {
            return Err(ClassifierError::EmptyBody);
        }
        let parsed: PredictResponse = serde_json::from_str(&body)
            .map_err(|e| ClassifierError::MalformedBody(e.to_string()))?;
        let verdict = ClassificationVerdict::try_from(parsed)?;

        debug!(
            "Verdict for {}: is_phishing={}, confidence={}",
            features.url, verdict.is_phishing, verdict.confidence
        );
        Ok(verdict)
    }
}

fn predict_endpoint(base_url: &str) -> Result<Url, InitializationError> {
    let mut base = Url::parse(base_url.trim())
        .map_err(|e| InitializationError::ClassifierUrlError(format!("{base_url}: {e}")))?;
    if !matches!(base.scheme(), "http" | "https") {
        return Err(InitializationError::ClassifierUrlError(format!(
            "{base_url}: scheme must be http or https"
        )));
    }
    if !base.path().ends_with('/') {
        let path = format!("{}/", base.path());
        base.set_path(&path);
    }
    base.join(CLASSIFIER_PREDICT_PATH)
        .map_err(|e| InitializationError::ClassifierUrlError(format!("{base_url}: {e}")))
}
