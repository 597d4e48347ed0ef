use std::path::PathBuf;

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;

/// Failure reported by a host collaborator (store, directory, messaging, events).
#[derive(Debug, Error)]
#[error("{0}")]
pub struct HostError(pub String);

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("block `{block}` is missing required input `{input}`")]
    MissingInput { block: String, input: String },

    #[error("invalid request URL: {0}")]
    InvalidUrl(String),

    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Failed to {operation}: {status} {status_text} - {body}")]
    Api {
        operation: String,
        status: u16,
        status_text: String,
        body: String,
    },

    #[error("response body is not valid JSON: {0}")]
    InvalidResponse(#[source] serde_json::Error),

    #[error(transparent)]
    Host(#[from] HostError),

    #[error("failed to read block manifest {path}: {source}")]
    ManifestRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid block manifest: {0}")]
    ManifestParse(#[source] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum WebhookError {
    #[error("Unauthorized: Invalid webhook secret")]
    Unauthorized,

    #[error("Missing request body")]
    MissingBody,

    #[error("Invalid JSON body")]
    InvalidBody(#[source] serde_json::Error),

    #[error("processing failed: {0}")]
    Processing(String),
}

impl WebhookError {
    pub fn status(&self) -> StatusCode {
        match self {
            WebhookError::Unauthorized => StatusCode::UNAUTHORIZED,
            WebhookError::MissingBody | WebhookError::InvalidBody(_) => StatusCode::BAD_REQUEST,
            WebhookError::Processing(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<HostError> for WebhookError {
    fn from(err: HostError) -> Self {
        WebhookError::Processing(err.0)
    }
}

impl IntoResponse for WebhookError {
    fn into_response(self) -> Response {
        let message = match &self {
            WebhookError::Processing(_) => "Internal server error".to_string(),
            other => other.to_string(),
        };
        (self.status(), Json(json!({ "error": message }))).into_response()
    }
}
