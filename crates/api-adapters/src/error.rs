//! HTTP mapping of domain failures.
//!
//! Validation failures render as `{"field": ["message"]}`, everything else
//! as `{"detail": "message"}`.

use axum::{
    extract::rejection::{JsonRejection, QueryRejection},
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use tracing::error;

use domains::DomainError;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error(transparent)]
    Domain(#[from] DomainError),
    /// Body or query string that could not be decoded at all.
    #[error("{0}")]
    BadRequest(String),
}

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Serialize)]
struct Detail {
    detail: String,
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<domains::ValidationErrors> for ApiError {
    fn from(errors: domains::ValidationErrors) -> Self {
        ApiError::Domain(DomainError::Validation(errors))
    }
}

fn detail(status: StatusCode, message: impl Into<String>) -> Response {
    (
        status,
        Json(Detail {
            detail: message.into(),
        }),
    )
        .into_response()
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let err = match self {
            ApiError::BadRequest(reason) => return detail(StatusCode::BAD_REQUEST, reason),
            ApiError::Domain(err) => err,
        };
        match err {
            DomainError::Validation(errors) => (StatusCode::BAD_REQUEST, Json(errors)).into_response(),
            DomainError::NotFound(..) => detail(StatusCode::NOT_FOUND, err.to_string()),
            DomainError::Unauthorized(reason) => {
                let mut response = detail(StatusCode::UNAUTHORIZED, reason);
                response
                    .headers_mut()
                    .insert(header::WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
                response
            }
            DomainError::Forbidden(reason) => detail(StatusCode::FORBIDDEN, reason),
            DomainError::Conflict(reason) => detail(StatusCode::CONFLICT, reason),
            DomainError::Protected(reason) => {
                error!(error = %reason, "delete refused by a protected reference");
                detail(StatusCode::INTERNAL_SERVER_ERROR, reason)
            }
            DomainError::Internal(reason) => {
                error!(error = %reason, "request failed");
                detail(StatusCode::INTERNAL_SERVER_ERROR, "A server error occurred.")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    async fn render(err: ApiError) -> (StatusCode, serde_json::Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn validation_renders_field_map() {
        let (status, body) = render(DomainError::field("title", "This field may not be blank.").into()).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, serde_json::json!({"title": ["This field may not be blank."]}));
    }

    #[tokio::test]
    async fn statuses_follow_the_error_kind() {
        let cases = [
            (DomainError::not_found("Goal", "x"), StatusCode::NOT_FOUND),
            (DomainError::Unauthorized("no".into()), StatusCode::UNAUTHORIZED),
            (DomainError::Forbidden("no".into()), StatusCode::FORBIDDEN),
            (DomainError::Conflict("dup".into()), StatusCode::CONFLICT),
            (DomainError::Protected("ref".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (err, expected) in cases {
            let (status, body) = render(err.into()).await;
            assert_eq!(status, expected);
            assert!(body["detail"].is_string());
        }
    }

    #[tokio::test]
    async fn internal_details_stay_in_the_log() {
        let (status, body) = render(DomainError::Internal("pool timed out".into()).into()).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["detail"], "A server error occurred.");
    }
}
