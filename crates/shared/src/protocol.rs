use serde::{Deserialize, Serialize};

use crate::domain::SymptomId;

/// Uniform response envelope used by every service endpoint. A
/// `success=false` body is a failure regardless of HTTP status.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub struct ApiEnvelope<T> {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiEnvelope<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error.into()),
        }
    }

    /// Unwraps the envelope. The service's own `error` string is
    /// surfaced verbatim; a missing one falls back to a generic
    /// message so callers always have something to show.
    pub fn into_result(self) -> Result<T, ServiceFailure> {
        if !self.success {
            return Err(ServiceFailure {
                message: self
                    .error
                    .unwrap_or_else(|| "service reported failure".to_string()),
            });
        }
        self.data.ok_or(ServiceFailure {
            message: "service reported success without a payload".to_string(),
        })
    }
}

/// Verbatim failure text reported by (or synthesized for) the service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceFailure {
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiagnoseRequest {
    pub symptoms: Vec<SymptomId>,
}
