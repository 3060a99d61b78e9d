//! HTTP client for the external seating solver
//!
//! Talks JSON to `POST {base}/v1/optimize` and `GET {base}/health`. Every
//! 2xx optimize reply is handed back as-is, including INFEASIBLE ones;
//! deciding what a status means is the planner's job.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use serde::Deserialize;

use shared::logging::Component;
use shared::{planner_debug, HealthResponse, OptimizeRequest, OptimizeResponse};

use crate::error::{PlannerError, PlannerResult};
use crate::traits::SolverClient;

/// Error body returned by the solver for rejected requests
#[derive(Deserialize)]
struct ErrorBody {
    detail: Option<serde_json::Value>,
}

/// Real solver client backed by reqwest
pub struct RealSolverClient {
    base_url: String,
    client: reqwest::Client,
}

impl RealSolverClient {
    pub fn new(base_url: &str, timeout: Duration) -> PlannerResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| PlannerError::config(format!("HTTP client: {e}")))?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Turn a non-2xx reply into `SolverRejected`, preferring the body's
    /// `detail` over the canonical status text
    async fn rejection(response: reqwest::Response) -> PlannerError {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();

        let detail = serde_json::from_str::<ErrorBody>(&body)
            .ok()
            .and_then(|b| b.detail)
            .map(|detail| match detail {
                serde_json::Value::String(text) => text,
                other => other.to_string(),
            });

        let message = detail.unwrap_or_else(|| {
            status
                .canonical_reason()
                .map(str::to_string)
                .unwrap_or_else(|| status.to_string())
        });

        PlannerError::SolverRejected {
            status: status.as_u16(),
            message,
        }
    }
}

#[async_trait]
impl SolverClient for RealSolverClient {
    async fn optimize(&self, request: &OptimizeRequest) -> PlannerResult<OptimizeResponse> {
        let url = format!("{}/v1/optimize", self.base_url);
        let started = Instant::now();

        let response = self
            .client
            .post(&url)
            .json(request)
            .send()
            .await
            .map_err(|e| PlannerError::SolverRequestFailed { message: e.to_string() })?;

        if !response.status().is_success() {
            return Err(Self::rejection(response).await);
        }

        let solved: OptimizeResponse = response
            .json()
            .await
            .map_err(|e| PlannerError::InvalidSolverResponse { message: e.to_string() })?;

        planner_debug!(
            Component::Solver,
            "🧮 Solver answered {} in {:?} (objective {:?}, {} branches)",
            solved.status,
            started.elapsed(),
            solved.objective_value,
            solved.solver_stats.branches
        );
        Ok(solved)
    }

    async fn health_check(&self) -> PlannerResult<HealthResponse> {
        let url = format!("{}/health", self.base_url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| PlannerError::SolverRequestFailed { message: e.to_string() })?;

        if !response.status().is_success() {
            return Err(Self::rejection(response).await);
        }

        response
            .json()
            .await
            .map_err(|e| PlannerError::InvalidSolverResponse { message: e.to_string() })
    }
}
