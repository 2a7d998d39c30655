use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use places::PlacesError;
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("{0}")]
    Validation(&'static str),

    #[error("No restaurants found nearby")]
    NoRestaurants,

    #[error("Session not found")]
    UnknownSession,

    #[error("Session already exists")]
    DuplicateSession,

    #[error("{0}")]
    Upstream(#[from] PlacesError),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::NoRestaurants | AppError::UnknownSession => StatusCode::NOT_FOUND,
            AppError::DuplicateSession => StatusCode::CONFLICT,
            AppError::Upstream(PlacesError::UnknownPlace) => StatusCode::NOT_FOUND,
            AppError::Upstream(PlacesError::Status { .. }) => StatusCode::BAD_GATEWAY,
            AppError::Upstream(PlacesError::Http(_)) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}
