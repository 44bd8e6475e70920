//! HTTP client for the BB84 backend.
//!
//! Thin typed wrapper over the backend's REST surface. Every method maps
//! one endpoint; orchestration (ordering, pacing, retries-on-user-request)
//! is the application layer's job.

use std::time::Duration;

use bb84_core::{Basis, Qubit};
use serde::Deserialize;

use crate::{
    error::ApiError,
    types::{
        Actor, BobMeasureResponse, CompareBasesResponse, FinalKeyResponse, MeasureRequest,
        OverallVisualization, QubitVisualization,
    },
};

/// Per-request timeout, matching the backend's own worst-case latency.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Shape of the backend's structured error bodies.
#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    detail: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

/// Typed client for one backend instance.
#[derive(Debug, Clone)]
pub struct Bb84Api {
    base_url: String,
    http: reqwest::Client,
}

impl Bb84Api {
    /// Create a client for `base_url` (trailing slashes are stripped).
    pub fn new(base_url: impl Into<String>) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Ok(Self { base_url, http })
    }

    /// Backend base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// `POST /reset` — clear all backend protocol state.
    pub async fn reset(&self) -> Result<(), ApiError> {
        tracing::debug!("resetting backend state");
        let response = self.http.post(format!("{}/reset", self.base_url)).send().await?;
        check(response).await?;
        Ok(())
    }

    /// `POST /alice/send` — record Alice's prepared bit and basis.
    pub async fn send_qubit(&self, qubit: &Qubit) -> Result<(), ApiError> {
        tracing::debug!(bit = %qubit.bit, basis = %qubit.basis, "sending qubit");
        let response =
            self.http.post(format!("{}/alice/send", self.base_url)).json(qubit).send().await?;
        check(response).await?;
        Ok(())
    }

    /// `GET /eve/intercept/{index}` — simulate interception of one round.
    pub async fn eve_intercept(&self, index: usize) -> Result<(), ApiError> {
        tracing::debug!(index, "eve intercepting");
        let response =
            self.http.get(format!("{}/eve/intercept/{index}", self.base_url)).send().await?;
        check(response).await?;
        Ok(())
    }

    /// `POST /bob/measure/{index}` — measure one round in the given basis.
    pub async fn bob_measure(
        &self,
        index: usize,
        basis: Basis,
    ) -> Result<BobMeasureResponse, ApiError> {
        tracing::debug!(index, basis = %basis, "bob measuring");
        let response = self
            .http
            .post(format!("{}/bob/measure/{index}", self.base_url))
            .json(&MeasureRequest { basis })
            .send()
            .await?;
        Ok(check(response).await?.json().await?)
    }

    /// `GET /compare-bases` — sift matching-basis indices.
    pub async fn compare_bases(&self) -> Result<CompareBasesResponse, ApiError> {
        tracing::debug!("comparing bases");
        let response = self.http.get(format!("{}/compare-bases", self.base_url)).send().await?;
        Ok(check(response).await?.json().await?)
    }

    /// `GET /final-key` — derive the shared key and error rate.
    pub async fn final_key(&self) -> Result<FinalKeyResponse, ApiError> {
        tracing::debug!("requesting final key");
        let response = self.http.get(format!("{}/final-key", self.base_url)).send().await?;
        Ok(check(response).await?.json().await?)
    }

    /// `GET /visualize/{who}/{index}` — circuit and Bloch sphere for one
    /// actor's view of one round.
    pub async fn qubit_visualization(
        &self,
        actor: Actor,
        index: usize,
    ) -> Result<QubitVisualization, ApiError> {
        let who = actor.path_segment();
        let response =
            self.http.get(format!("{}/visualize/{who}/{index}", self.base_url)).send().await?;
        Ok(check(response).await?.json().await?)
    }

    /// `GET /visualize/overall/{who}` — one actor's overall circuit.
    pub async fn overall_visualization(
        &self,
        actor: Actor,
    ) -> Result<OverallVisualization, ApiError> {
        let who = actor.path_segment();
        let response =
            self.http.get(format!("{}/visualize/overall/{who}", self.base_url)).send().await?;
        Ok(check(response).await?.json().await?)
    }

    /// `GET /visualize/overall-circuit?eve=` — the full run's circuit.
    pub async fn overall_circuit(&self, eve: bool) -> Result<OverallVisualization, ApiError> {
        let response = self
            .http
            .get(format!("{}/visualize/overall-circuit", self.base_url))
            .query(&[("eve", eve)])
            .send()
            .await?;
        Ok(check(response).await?.json().await?)
    }

    /// `GET /health` — liveness probe. Any error counts as unhealthy.
    pub async fn health(&self) -> bool {
        match self.http.get(format!("{}/health", self.base_url)).send().await {
            Ok(response) => response.status().is_success(),
            Err(err) => {
                tracing::debug!(error = %err, "health probe failed");
                false
            },
        }
    }
}

/// Pass 2xx responses through; turn anything else into [`ApiError::Server`]
/// carrying the backend's `detail`/`message` when present.
async fn check(response: reqwest::Response) -> Result<reqwest::Response, ApiError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(ApiError::Server { status: status.as_u16(), detail: error_detail(&body) })
}

fn error_detail(body: &str) -> String {
    serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|parsed| parsed.detail.or(parsed.message))
        .unwrap_or_else(|| "Server error occurred".to_string())
}
