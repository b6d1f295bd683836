// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Maps [`ParleyError`] to HTTP responses.
//!
//! Gate classifications keep their real message in a structured 4xx body.
//! Everything after admission collapses to a generic 503; the chain goes to
//! the logs only.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use parley_core::error::ParleyError;

/// Wrapper so handlers can return `Result<_, ApiError>` with `?`.
pub struct ApiError(pub ParleyError);

/// Structured error body returned to the client.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

impl From<ParleyError> for ApiError {
    fn from(err: ParleyError) -> Self {
        ApiError(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            ParleyError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ParleyError::Unauthorized => StatusCode::UNAUTHORIZED,
            ParleyError::Forbidden(_) => StatusCode::FORBIDDEN,
            ParleyError::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
            _ => StatusCode::SERVICE_UNAVAILABLE,
        };
        if !self.0.is_client_fault() {
            tracing::error!(error = %self.0, "request failed");
        }
        let body = ErrorBody {
            error: self.0.client_message(),
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parley_core::error::GENERIC_FAILURE_MESSAGE;

    fn status_of(err: ParleyError) -> StatusCode {
        ApiError(err).into_response().status()
    }

    #[test]
    fn gate_errors_map_to_structured_4xx() {
        assert_eq!(
            status_of(ParleyError::BadRequest("x".into())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(status_of(ParleyError::Unauthorized), StatusCode::UNAUTHORIZED);
        assert_eq!(
            status_of(ParleyError::Forbidden("not owner".into())),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            status_of(ParleyError::RateLimited { limit: 20 }),
            StatusCode::TOO_MANY_REQUESTS
        );
    }

    #[test]
    fn post_admission_errors_map_to_generic_503() {
        let response = ApiError(ParleyError::Backend {
            message: "upstream returned 500: secret internals".into(),
            source: None,
        })
        .into_response();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn generic_body_never_leaks_detail() {
        let response = ApiError(ParleyError::Storage {
            source: Box::new(std::io::Error::other("disk gone")),
        })
        .into_response();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["error"], GENERIC_FAILURE_MESSAGE);
    }
}
