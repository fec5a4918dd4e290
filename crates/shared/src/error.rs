use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

/// Why raw input is not yet eligible for submission.
///
/// These never leave the input view: they block submission and are shown
/// inline, the controller's phase is left alone.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Input is empty")]
    EmptyInput,
    #[error("Invalid JSON format: {0}")]
    SyntaxError(String),
    #[error("Missing required fields: {}", .0.join(", "))]
    MissingRequiredField(Vec<String>),
}

impl ValidationError {
    pub fn missing_fields(&self) -> &[String] {
        match self {
            ValidationError::MissingRequiredField(fields) => fields,
            _ => &[],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestErrorKind {
    Transport,
    Http,
    Service,
    MalformedResponse,
    NoPlan,
}

/// Failure of the single plan-generation exchange.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RequestError {
    #[error("Could not reach the plan service: {0}")]
    TransportError(String),
    #[error("HTTP error! status: {0}")]
    HttpError(u16),
    #[error("{0}")]
    ServiceError(String),
    #[error("Malformed response from the plan service: {0}")]
    MalformedResponse(String),
    /// The learner is past the last stage. `document` is the body as sent,
    /// kept so the completion summary can be exported.
    #[error("No further plan: {summary}")]
    NoPlan {
        summary: String,
        document: Map<String, Value>,
    },
}

impl RequestError {
    pub fn kind(&self) -> RequestErrorKind {
        match self {
            RequestError::TransportError(_) => RequestErrorKind::Transport,
            RequestError::HttpError(_) => RequestErrorKind::Http,
            RequestError::ServiceError(_) => RequestErrorKind::Service,
            RequestError::MalformedResponse(_) => RequestErrorKind::MalformedResponse,
            RequestError::NoPlan { .. } => RequestErrorKind::NoPlan,
        }
    }

    pub fn status_code(&self) -> Option<u16> {
        match self {
            RequestError::HttpError(status) => Some(*status),
            _ => None,
        }
    }
}
