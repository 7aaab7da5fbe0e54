use reqwest::Client;
use serde::de::DeserializeOwned;
use shared::{
    domain::{ConsultationResponse, RuleSummary, Symptom, SymptomId},
    error::ConsultError,
    protocol::{ApiEnvelope, DiagnoseRequest},
};
use tracing::warn;

/// Async HTTP client for the diagnosis service. Stateless apart from
/// the connection pool; one instance is shared by the whole app.
#[derive(Debug, Clone)]
pub struct DiagnosisClient {
    http: Client,
    base_url: String,
}

impl DiagnosisClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Self {
            http: Client::new(),
            base_url,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Fetches the full symptom catalog. Called once at startup and
    /// again on explicit retry; filtering is purely client-side.
    pub async fn fetch_symptoms(&self) -> Result<Vec<Symptom>, ConsultError> {
        let url = format!("{}/api/symptoms", self.base_url);
        let envelope: ApiEnvelope<Vec<Symptom>> = self
            .get_envelope(&url)
            .await
            .map_err(|reason| ConsultError::catalog_unavailable(reason))?;
        envelope
            .into_result()
            .map_err(|failure| ConsultError::catalog_unavailable(failure.message))
    }

    /// Submits one symptom snapshot and returns the ranked diagnoses
    /// with their reasoning trace. The snapshot is sent as-is; the
    /// service matches order-independently.
    pub async fn diagnose(
        &self,
        symptoms: &[SymptomId],
    ) -> Result<ConsultationResponse, ConsultError> {
        if symptoms.is_empty() {
            return Err(ConsultError::EmptySelection);
        }

        let url = format!("{}/api/diagnose", self.base_url);
        let request = DiagnoseRequest {
            symptoms: symptoms.to_vec(),
        };
        let response = self
            .http
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|err| ConsultError::request_failed(format!("failed to reach {url}: {err}")))?;

        let envelope: ApiEnvelope<ConsultationResponse> = response
            .json()
            .await
            .map_err(|err| ConsultError::malformed(err.to_string()))?;
        let mut consultation = envelope
            .into_result()
            .map_err(|failure| ConsultError::request_failed(failure.message))?;

        // The engine promises total_diagnoses == diagnoses.len(); on a
        // mismatch the list wins and the count is normalized.
        if consultation.total_diagnoses != consultation.diagnoses.len() {
            warn!(
                reported = consultation.total_diagnoses,
                actual = consultation.diagnoses.len(),
                "diagnosis count mismatch in service response"
            );
            consultation.total_diagnoses = consultation.diagnoses.len();
        }
        Ok(consultation)
    }

    /// Lists every rule in the knowledge base for the explanation
    /// facility.
    pub async fn fetch_rules(&self) -> Result<Vec<RuleSummary>, ConsultError> {
        let url = format!("{}/api/rules", self.base_url);
        let envelope: ApiEnvelope<Vec<RuleSummary>> = self
            .get_envelope(&url)
            .await
            .map_err(ConsultError::request_failed)?;
        envelope
            .into_result()
            .map_err(|failure| ConsultError::request_failed(failure.message))
    }

    async fn get_envelope<T: DeserializeOwned>(&self, url: &str) -> Result<ApiEnvelope<T>, String> {
        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|err| format!("failed to reach {url}: {err}"))?;
        response
            .json()
            .await
            .map_err(|err| format!("invalid response payload from {url}: {err}"))
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
