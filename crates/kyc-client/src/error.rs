//! KYC service client error types.

use kyc_core::{FormField, ValidationError};
use serde::Deserialize;

/// Errors from KYC service calls.
#[derive(Debug, thiserror::Error)]
pub enum KycApiError {
    /// HTTP transport error.
    #[error("HTTP error calling {endpoint}: {source}")]
    Http {
        endpoint: String,
        source: reqwest::Error,
    },
    /// The service could not be reached. Raised by service implementations
    /// that do not sit on top of `reqwest`.
    #[error("KYC service unavailable calling {endpoint}: {reason}")]
    Unavailable { endpoint: String, reason: String },
    /// The service returned a non-2xx status.
    #[error("KYC service {endpoint} returned {status}: {body}")]
    ApiError {
        endpoint: String,
        status: u16,
        body: String,
    },
    /// Response deserialization failed.
    #[error("failed to deserialize response from {endpoint}: {source}")]
    Deserialization {
        endpoint: String,
        source: reqwest::Error,
    },
    /// A multipart part could not be built.
    #[error("invalid multipart part {part}: {source}")]
    InvalidPart {
        part: &'static str,
        source: reqwest::Error,
    },
    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(#[from] super::config::ConfigError),
}

/// Error body shape returned by the service on failure.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

impl KycApiError {
    /// The user-facing `message` carried by a JSON error body, if any.
    pub fn remote_message(&self) -> Option<String> {
        match self {
            Self::ApiError { body, .. } => serde_json::from_str::<ErrorBody>(body)
                .ok()
                .and_then(|b| b.message)
                .filter(|m| !m.trim().is_empty()),
            _ => None,
        }
    }

    /// Whether the failure happened before any response was received.
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Http { .. } | Self::Unavailable { .. })
    }

    /// HTTP status of a rejected request.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::ApiError { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// The form could not be turned into a submission payload.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PayloadError {
    /// A required field is empty.
    #[error("{} is required", .0.label())]
    Missing(FormField),
    /// A text field failed its format check.
    #[error("{field}: {source}")]
    Invalid {
        field: FormField,
        source: ValidationError,
    },
}
