use axum::Json;
use axum::http::{HeaderName, StatusCode, header};
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;
use tracing::error;

use crate::upstream::UpstreamError;
use crate::validate::ValidateError;

/// Failure classes the proxy endpoints report to clients.
///
/// Every variant maps to exactly one status code and a short human-readable
/// message; raw provider errors never reach the client.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("{0}")]
    InvalidInput(String),
    #[error("Rate limit exceeded. Please try again later.")]
    QuotaExceeded {
        limit: u32,
        retry_after_secs: u64,
        reset_epoch: i64,
    },
    #[error("Weather API configuration error. Please contact support.")]
    Misconfigured,
    #[error("Weather data unavailable: {message}")]
    UpstreamFailure { status: u16, message: String },
    #[error("Weather data request timed out")]
    UpstreamTimeout,
    #[error("Internal server error")]
    InternalFault,
}

impl GatewayError {
    pub fn status(&self) -> StatusCode {
        match self {
            GatewayError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            GatewayError::QuotaExceeded { .. } => StatusCode::TOO_MANY_REQUESTS,
            GatewayError::Misconfigured | GatewayError::InternalFault => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            // relay the provider's own status when it makes sense
            GatewayError::UpstreamFailure { status, .. } => {
                StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_GATEWAY)
            }
            GatewayError::UpstreamTimeout => StatusCode::GATEWAY_TIMEOUT,
        }
    }
}

impl From<ValidateError> for GatewayError {
    fn from(err: ValidateError) -> Self {
        GatewayError::InvalidInput(err.to_string())
    }
}

impl From<UpstreamError> for GatewayError {
    fn from(err: UpstreamError) -> Self {
        match err {
            UpstreamError::Timeout => GatewayError::UpstreamTimeout,
            UpstreamError::Status { status, message } => {
                GatewayError::UpstreamFailure { status, message }
            }
            UpstreamError::Network(detail) => {
                error!(%detail, "upstream network failure");
                GatewayError::InternalFault
            }
            UpstreamError::Decode(detail) => {
                error!(%detail, "upstream payload failed to decode");
                GatewayError::InternalFault
            }
        }
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = Json(json!({ "error": self.to_string() }));

        match self {
            GatewayError::QuotaExceeded {
                limit,
                retry_after_secs,
                reset_epoch,
            } => {
                let headers = [
                    (header::RETRY_AFTER, retry_after_secs.to_string()),
                    (
                        HeaderName::from_static("x-ratelimit-limit"),
                        limit.to_string(),
                    ),
                    (
                        HeaderName::from_static("x-ratelimit-remaining"),
                        "0".to_string(),
                    ),
                    (
                        HeaderName::from_static("x-ratelimit-reset"),
                        reset_epoch.to_string(),
                    ),
                ];
                (status, headers, body).into_response()
            }
            _ => (status, body).into_response(),
        }
    }
}
