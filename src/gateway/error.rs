use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::pipeline::ErrorResponse;

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("invalid request: {0}")]
    InvalidRequest(#[from] JsonRejection),

    #[error("{}", .0.error)]
    Failed(ErrorResponse),
}

/// Body for rejected requests.
#[derive(serde::Serialize)]
pub struct RejectionBody {
    pub error: String,
    pub code: u16,
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        match self {
            GatewayError::InvalidRequest(rejection) => {
                let status = rejection.status();
                let body = Json(RejectionBody {
                    error: rejection.body_text(),
                    code: status.as_u16(),
                });
                (status, body).into_response()
            }
            GatewayError::Failed(error) => {
                (StatusCode::INTERNAL_SERVER_ERROR, Json(error)).into_response()
            }
        }
    }
}
