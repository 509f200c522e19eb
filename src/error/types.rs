//! API error types
//!
//! Every handler failure ends up as an [`ApiError`], which renders as a
//! status code plus a short plain-text body. Internal detail (transport or
//! decode messages) is logged where the error is raised and never sent to
//! the caller.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    /// Malformed JSON or a missing required field
    #[error("{0}")]
    InvalidRequest(String),

    /// The provider could not be reached
    #[error("{0}")]
    UpstreamTransport(String),

    /// The provider answered with JSON that does not match its schema
    #[error("Error reading OpenAI response")]
    UpstreamDecode,

    /// The provider answered without any usable data
    #[error("{0}")]
    UpstreamEmpty(String),

    /// The text extractor reported that the URL could not be accessed
    #[error("Unable to access the requested URL")]
    ExtractionDenied,

    /// The text extractor could not be run
    #[error("{0}")]
    Extraction(String),

    #[error("Internal server error")]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    /// HTTP status for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::UpstreamTransport(_)
            | ApiError::UpstreamDecode
            | ApiError::UpstreamEmpty(_)
            | ApiError::ExtractionDenied
            | ApiError::Extraction(_)
            | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let ApiError::Internal(ref err) = self {
            tracing::error!(error = %err, "Internal error while handling request");
        }

        // `String` renders as text/plain; charset=utf-8
        (self.status_code(), self.to_string()).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            ApiError::InvalidRequest("bad".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(ApiError::UpstreamDecode.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(ApiError::ExtractionDenied.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            ApiError::UpstreamEmpty("No choices in OpenAI response".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_internal_error_hides_detail() {
        let err = ApiError::Internal(anyhow::anyhow!("connection pool poisoned"));
        assert_eq!(err.to_string(), "Internal server error");
    }

    #[test]
    fn test_response_is_plain_text() {
        let response = ApiError::InvalidRequest("Must pass a valid url".into()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let content_type = response
            .headers()
            .get(axum::http::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap();
        assert!(content_type.starts_with("text/plain"));
    }
}
