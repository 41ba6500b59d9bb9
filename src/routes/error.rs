// Request errors and their HTTP status

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::models::InvalidEntityGroup;
use crate::pipeline::RenderError;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("invalid metric name")]
    InvalidMetric,
    #[error("invalid entity name")]
    InvalidEntity(#[from] InvalidEntityGroup),
    #[error("{0}")]
    Render(#[from] RenderError),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::InvalidMetric | ApiError::InvalidEntity(_) => StatusCode::BAD_REQUEST,
            ApiError::Render(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let ApiError::Render(e) = &self {
            tracing::warn!(error = %e, "response rendering failed");
        }
        (self.status(), self.to_string()).into_response()
    }
}
