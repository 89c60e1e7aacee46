use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;
use tracing::{error, warn};

use crate::models::common::ErrorMessage;

#[derive(Debug, Error)]
pub enum RelayError {
    #[error("{0} environment variable is not set")]
    MissingToken(String),

    /// Non-2xx from Langflow. `status` is what the caller receives.
    #[error("Langflow API error ({upstream}): {body}")]
    UpstreamStatus {
        status: StatusCode,
        upstream: StatusCode,
        body: String,
    },

    #[error("Request to Langflow API timed out")]
    Timeout,

    #[error("Failed to reach Langflow API: {0}")]
    Transport(String),

    #[error("Invalid response from Langflow API")]
    InvalidJson,

    #[error("Unexpected error: {0}")]
    Unexpected(String),

    #[error("{0}")]
    InvalidRequest(String),
}

impl RelayError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            RelayError::MissingToken(_) | RelayError::Unexpected(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            RelayError::UpstreamStatus { status, .. } => *status,
            RelayError::Timeout => StatusCode::GATEWAY_TIMEOUT,
            RelayError::Transport(_) | RelayError::InvalidJson => StatusCode::BAD_GATEWAY,
            RelayError::InvalidRequest(_) => StatusCode::UNPROCESSABLE_ENTITY,
        }
    }
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let detail = self.to_string();
        if status.is_server_error() {
            error!(status = status.as_u16(), "{detail}");
        } else {
            warn!(status = status.as_u16(), "{detail}");
        }
        (status, Json(ErrorMessage { detail })).into_response()
    }
}
