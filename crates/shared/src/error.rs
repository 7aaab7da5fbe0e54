use thiserror::Error;

/// Failure taxonomy for one consultation cycle. Every variant is
/// recoverable; the workflow always returns to symptom selection.
#[derive(Debug, Clone, Error)]
pub enum ConsultError {
    /// The symptom catalog could not be fetched; the UI keeps an empty
    /// catalog and offers a retry.
    #[error("symptom catalog unavailable: {reason}")]
    CatalogUnavailable { reason: String },

    /// Run attempted with nothing selected. Rejected before any
    /// network traffic.
    #[error("no symptoms selected")]
    EmptySelection,

    /// Network failure or a `success=false` envelope from the service.
    #[error("diagnosis request failed: {reason}")]
    RequestFailed { reason: String },

    /// The service answered but the payload did not decode.
    #[error("malformed diagnosis response: {reason}")]
    MalformedResponse { reason: String },
}

impl ConsultError {
    pub fn catalog_unavailable(reason: impl Into<String>) -> Self {
        Self::CatalogUnavailable {
            reason: reason.into(),
        }
    }

    pub fn request_failed(reason: impl Into<String>) -> Self {
        Self::RequestFailed {
            reason: reason.into(),
        }
    }

    pub fn malformed(reason: impl Into<String>) -> Self {
        Self::MalformedResponse {
            reason: reason.into(),
        }
    }
}
