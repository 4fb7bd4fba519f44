use bytes::Bytes;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;
use tracing::warn;

use crate::models::OneCallResponse;

/// Normalized upstream failure. Timeouts are kept apart from other network
/// failures so handlers can answer 504 instead of 500.
#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("upstream request timed out")]
    Timeout,
    #[error("upstream request failed: {0}")]
    Network(String),
    #[error("upstream returned {status}: {message}")]
    Status { status: u16, message: String },
    #[error("upstream body failed to decode: {0}")]
    Decode(String),
}

// Error body the weather provider returns on non-2xx responses
#[derive(Debug, Deserialize)]
struct ApiError {
    message: Option<String>,
}

/// Outbound HTTP client with a uniform per-request timeout budget.
///
/// No retries: a single upstream failure is surfaced immediately.
pub struct UpstreamClient {
    http: Client,
    timeout: Duration,
}

impl UpstreamClient {
    pub fn new(timeout: Duration) -> Self {
        Self {
            http: Client::new(),
            timeout,
        }
    }

    /// Fetch a forecast from the One Call endpoint and validate it into the
    /// typed payload before anything touches its fields.
    pub async fn fetch_weather(
        &self,
        base: &str,
        lat: f64,
        lng: f64,
        api_key: &str,
        exclude: &str,
    ) -> Result<OneCallResponse, UpstreamError> {
        let res = self
            .http
            .get(base)
            .query(&[
                ("lat", lat.to_string()),
                ("lon", lng.to_string()),
                ("appid", api_key.to_string()),
                ("units", "metric".to_string()),
                ("exclude", exclude.to_string()),
            ])
            .timeout(self.timeout)
            .send()
            .await
            .map_err(classify)?;

        let status = res.status();
        if !status.is_success() {
            return Err(status_error(status, res).await);
        }

        let body = res.text().await.map_err(classify)?;
        serde_json::from_str(&body).map_err(|e| UpstreamError::Decode(e.to_string()))
    }

    /// Fetch one PNG tile and return its raw bytes.
    pub async fn fetch_tile(&self, url: &str) -> Result<Bytes, UpstreamError> {
        let res = self
            .http
            .get(url)
            .header(reqwest::header::ACCEPT, "image/png")
            .timeout(self.timeout)
            .send()
            .await
            .map_err(classify)?;

        let status = res.status();
        if !status.is_success() {
            return Err(status_error(status, res).await);
        }

        res.bytes().await.map_err(classify)
    }
}

fn classify(err: reqwest::Error) -> UpstreamError {
    if err.is_timeout() {
        UpstreamError::Timeout
    } else {
        UpstreamError::Network(err.to_string())
    }
}

// Pull a human-readable message out of a non-2xx body, falling back to the
// status reason. The parse attempt itself must never propagate an error.
async fn status_error(status: StatusCode, res: reqwest::Response) -> UpstreamError {
    let fallback = status
        .canonical_reason()
        .unwrap_or("upstream error")
        .to_string();
    let message = match res.json::<ApiError>().await {
        Ok(ApiError { message: Some(m) }) => m,
        _ => fallback,
    };
    warn!(status = status.as_u16(), %message, "upstream returned an error");
    UpstreamError::Status {
        status: status.as_u16(),
        message,
    }
}
