use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use shared::{
    domain::{LearningPlan, StudentRecord},
    error::RequestError,
    protocol::{decode_plan_response, GeneratePlanRequest, GENERATE_PLAN_PATH},
};
use tracing::{debug, warn};
use url::Url;

pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(120);
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// One plan-generation exchange per call. No retries, no caching.
#[async_trait]
pub trait PlanService: Send + Sync {
    async fn request_plan(&self, record: &StudentRecord) -> Result<LearningPlan, RequestError>;
}

#[derive(Debug, Clone, Copy)]
pub struct PlanClientOptions {
    /// Deadline for the whole exchange, connect through body.
    pub request_timeout: Duration,
    pub connect_timeout: Duration,
}

impl Default for PlanClientOptions {
    fn default() -> Self {
        Self {
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
        }
    }
}

pub struct HttpPlanClient {
    http: Client,
    endpoint: Url,
    request_timeout: Duration,
}

impl HttpPlanClient {
    pub fn new(base_url: &str, options: PlanClientOptions) -> Result<Self> {
        let endpoint = plan_endpoint(base_url)?;
        let http = Client::builder()
            .connect_timeout(options.connect_timeout)
            .build()
            .context("failed to build HTTP client")?;
        Ok(Self {
            http,
            endpoint,
            request_timeout: options.request_timeout,
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    async fn exchange(&self, record: &StudentRecord) -> Result<LearningPlan, RequestError> {
        let body = GeneratePlanRequest {
            data: record.clone(),
        };
        let response = self
            .http
            .post(self.endpoint.clone())
            .json(&body)
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(RequestError::HttpError(status.as_u16()));
        }

        let bytes = response.bytes().await.map_err(transport_error)?;
        debug!(status = status.as_u16(), bytes = bytes.len(), "plan service responded");
        decode_plan_response(&bytes)
    }
}

#[async_trait]
impl PlanService for HttpPlanClient {
    async fn request_plan(&self, record: &StudentRecord) -> Result<LearningPlan, RequestError> {
        match tokio::time::timeout(self.request_timeout, self.exchange(record)).await {
            Ok(result) => result,
            Err(_) => {
                warn!(
                    endpoint = %self.endpoint,
                    timeout = ?self.request_timeout,
                    "plan request deadline expired"
                );
                Err(RequestError::TransportError(format!(
                    "request timed out after {}s",
                    self.request_timeout.as_secs_f64()
                )))
            }
        }
    }
}

/// `{base}/generate_plan`, keeping any path prefix the base URL carries.
pub fn plan_endpoint(base_url: &str) -> Result<Url> {
    let mut base =
        Url::parse(base_url).with_context(|| format!("invalid service url '{base_url}'"))?;
    if !base.path().ends_with('/') {
        let path = format!("{}/", base.path());
        base.set_path(&path);
    }
    base.join(GENERATE_PLAN_PATH)
        .with_context(|| format!("failed to build plan endpoint from '{base_url}'"))
}

fn transport_error(err: reqwest::Error) -> RequestError {
    let message = if err.is_timeout() {
        format!("request timed out: {err}")
    } else if err.is_connect() {
        format!("connection failed: {err}")
    } else {
        err.to_string()
    };
    RequestError::TransportError(message)
}

#[cfg(test)]
#[path = "tests/plan_client_tests.rs"]
mod tests;
