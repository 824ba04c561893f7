use axum::{
    Json,
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;
use tracing::{error, warn};

use crate::error::ServiceError;

/// Errors answered to HTTP clients. Only the display text reaches the client.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Not logged in")]
    Unauthorized,

    #[error("Unknown {0}")]
    NotFound(&'static str),

    #[error("Malformed request")]
    MalformedRequest(String),

    #[error("Failed to {op}")]
    Failed {
        op: &'static str,
        #[source]
        source: ServiceError,
    },
}

impl ApiError {
    /// Wraps a service failure for the operation `op`, logging it.
    pub fn failed(op: &'static str) -> impl FnOnce(ServiceError) -> ApiError {
        move |source| {
            error!(error = %source, "Failed to {op}");
            ApiError::Failed { op, source }
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        warn!(error = %rejection, "rejected request body");
        ApiError::MalformedRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        warn!(error = %rejection, "rejected query string");
        ApiError::MalformedRequest(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match self {
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::MalformedRequest(_) | ApiError::Failed { .. } => StatusCode::BAD_REQUEST,
        };

        (status, Json(json!({ "err": self.to_string() }))).into_response()
    }
}
