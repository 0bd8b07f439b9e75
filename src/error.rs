//! Error types for the lake atlas
//!
//! Provides unified error handling using thiserror.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::models::ErrorResponse;

// == Atlas Error Enum ==
/// Unified error type for the lake atlas.
#[derive(Error, Debug)]
pub enum AtlasError {
    /// Lake (or other resource) not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Invalid request data
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Lake dataset could not be loaded or is inconsistent
    #[error("Dataset error: {0}")]
    Dataset(String),

    /// Persistent storage access failed
    #[error("Storage error: {0}")]
    Storage(String),

    /// Weather provider failed or returned garbage
    #[error("Weather provider error: {0}")]
    Provider(String),

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),
}

// == IntoResponse Implementation ==
impl IntoResponse for AtlasError {
    fn into_response(self) -> Response {
        let status = match &self {
            AtlasError::NotFound(_) => StatusCode::NOT_FOUND,
            AtlasError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            AtlasError::Provider(_) => StatusCode::BAD_GATEWAY,
            AtlasError::Dataset(_) | AtlasError::Storage(_) | AtlasError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        let body = Json(ErrorResponse::new(self.to_string()));

        (status, body).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for the lake atlas.
pub type Result<T> = std::result::Result<T, AtlasError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_maps_to_404() {
        let response = AtlasError::NotFound("zuerichsee".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_invalid_request_maps_to_400() {
        let response = AtlasError::InvalidRequest("bad lat".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_provider_maps_to_502() {
        let response = AtlasError::Provider("timeout".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn test_error_display_includes_context() {
        let err = AtlasError::Dataset("duplicate id 'thunersee'".to_string());
        assert_eq!(err.to_string(), "Dataset error: duplicate id 'thunersee'");
    }
}
