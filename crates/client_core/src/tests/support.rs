//! In-process stand-in for the plan service.

use std::{sync::Arc, time::Duration};

use anyhow::Result;
use axum::{
    extract::State,
    http::{header, StatusCode},
    response::IntoResponse,
    routing::post,
    Json, Router,
};
use serde_json::{json, Value};
use tokio::{net::TcpListener, sync::Mutex};

#[derive(Clone)]
pub struct MockPlanService {
    status: StatusCode,
    body: String,
    delay: Duration,
    received: Arc<Mutex<Vec<Value>>>,
}

impl MockPlanService {
    pub fn responding(status: StatusCode, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
            delay: Duration::ZERO,
            received: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn ok_json(body: &Value) -> Self {
        Self::responding(StatusCode::OK, body.to_string())
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub async fn received(&self) -> Vec<Value> {
        self.received.lock().await.clone()
    }

    /// Serves `/generate_plan` on an ephemeral port, returning the base URL.
    pub async fn spawn(&self) -> Result<String> {
        std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let app = Router::new()
            .route("/generate_plan", post(handle_generate_plan))
            .with_state(self.clone());
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });
        Ok(format!("http://{addr}"))
    }
}

async fn handle_generate_plan(
    State(state): State<MockPlanService>,
    Json(payload): Json<Value>,
) -> impl IntoResponse {
    state.received.lock().await.push(payload);
    if !state.delay.is_zero() {
        tokio::time::sleep(state.delay).await;
    }
    (
        state.status,
        [(header::CONTENT_TYPE, "application/json")],
        state.body.clone(),
    )
}

/// Base URL of a port nothing is listening on.
pub async fn refused_url() -> Result<String> {
    std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    drop(listener);
    Ok(format!("http://{addr}"))
}

pub fn agra_plan_body() -> Value {
    json!({
        "studentId": 1000001608,
        "current_class": "3",
        "current_level": "Foundation",
        "current_stage": "A",
        "next_level": "Foundation",
        "next_stage": "B",
        "analysis": "...",
        "plan_description": "...",
        "suggested_activities": ["..."],
        "required_outcomes_not_fulfilled": []
    })
}

pub const AGRA_INPUT: &str = r#"{"studentId": 1000001608, "roName": "AGRA", "Overall": 3.0}"#;
