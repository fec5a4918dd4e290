//! Failure classification for the terminal status line.

use shared::error::RequestError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureCategory {
    Transport,
    Service,
    Validation,
    Response,
    Completed,
}

#[derive(Debug, Clone)]
pub struct FailureReport {
    category: FailureCategory,
    message: String,
    hint: &'static str,
}

impl FailureReport {
    pub fn from_request_error(err: &RequestError) -> Self {
        let (category, hint) = match err {
            RequestError::TransportError(_) => (
                FailureCategory::Transport,
                "Plan service unreachable; check the service URL/network and retry.",
            ),
            RequestError::HttpError(status) if (400..500).contains(status) => (
                FailureCategory::Validation,
                "The plan service rejected the record; check the input fields and retry.",
            ),
            RequestError::HttpError(_) => (
                FailureCategory::Service,
                "The plan service failed while generating the plan; retry later.",
            ),
            RequestError::ServiceError(_) => (
                FailureCategory::Service,
                "The plan service could not generate a plan for this record.",
            ),
            RequestError::MalformedResponse(_) => (
                FailureCategory::Response,
                "The plan service answered with an unexpected document.",
            ),
            RequestError::NoPlan { .. } => (
                FailureCategory::Completed,
                "The learner has completed the final stage; no further plan is needed.",
            ),
        };

        Self {
            category,
            message: err.to_string(),
            hint,
        }
    }

    pub fn category(&self) -> FailureCategory {
        self.category
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn hint(&self) -> &str {
        self.hint
    }

    pub fn is_retryable(&self) -> bool {
        matches!(
            self.category,
            FailureCategory::Transport | FailureCategory::Service
        )
    }
}
