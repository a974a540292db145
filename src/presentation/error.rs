// API errors and their HTTP mapping
use crate::application::card_service::CardError;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    Card(#[from] CardError),
    #[error("{0}")]
    BadRequest(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Card(CardError::NotFound(_) | CardError::GraphDisabled(_)) => {
                StatusCode::NOT_FOUND
            }
            ApiError::Card(CardError::UnsupportedMode { .. } | CardError::NoTarget(_)) => {
                StatusCode::BAD_REQUEST
            }
            ApiError::Card(CardError::UnknownEntity(_) | CardError::Host(_)) => {
                StatusCode::BAD_GATEWAY
            }
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::warn!("Request failed: {}", self);
        }
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}
