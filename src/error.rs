use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::crawler::ExternalSourceError;
use crate::export::ExportError;
use crate::utils::{error_codes, error_to_api_response};

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    InvalidInput(String),
    #[error("{0}")]
    Upstream(#[from] ExternalSourceError),
    /// A range fetch failed; which period is deliberately not reported.
    #[error("failed to fetch statistics for the requested range")]
    RangeUpstream,
    #[error("{0}")]
    Export(#[from] ExportError),
}

impl AppError {
    pub fn invalid(msg: impl Into<String>) -> Self {
        AppError::InvalidInput(msg.into())
    }

    fn status_and_code(&self) -> (StatusCode, i32) {
        match self {
            AppError::InvalidInput(_) => (StatusCode::BAD_REQUEST, error_codes::VALIDATION_ERROR),
            AppError::Upstream(_) | AppError::RangeUpstream => {
                (StatusCode::BAD_GATEWAY, error_codes::UPSTREAM_ERROR)
            }
            AppError::Export(_) => (StatusCode::INTERNAL_SERVER_ERROR, error_codes::EXPORT_ERROR),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();
        let body = error_to_api_response::<()>(code, self.to_string());
        (status, body).into_response()
    }
}
