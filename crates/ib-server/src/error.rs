//! Error-to-HTTP response conversion.
//!
//! Implements `IntoResponse` for [`ib_core::Error`] so that route handlers
//! can return `Result<T, AppError>` and use `?` on service calls.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use crate::middleware::request_id::RequestId;

/// Wrapper so we can implement `IntoResponse` for an external type.
#[derive(Debug)]
pub struct AppError {
    inner: ib_core::Error,
    request_id: Option<String>,
}

impl AppError {
    pub fn new(inner: ib_core::Error) -> Self {
        Self {
            inner,
            request_id: None,
        }
    }

    pub fn with_request_id(mut self, id: String) -> Self {
        self.request_id = Some(id);
        self
    }
}

impl From<ib_core::Error> for AppError {
    fn from(e: ib_core::Error) -> Self {
        Self::new(e)
    }
}

/// Build a mapper that tags service errors with the current request ID.
pub(crate) fn tagged(rid: &RequestId) -> impl Fn(ib_core::Error) -> AppError + '_ {
    move |e| AppError::new(e).with_request_id(rid.0.clone())
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.inner.http_status())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        if status.is_server_error() {
            tracing::error!(
                status = %status,
                error = %self.inner,
                "Server error in API handler"
            );
        } else {
            tracing::debug!(status = %status, error = %self.inner, "Request rejected");
        }

        let body = json!({
            "error": self.inner.to_string(),
            "code": self.inner.code(),
            "request_id": self.request_id,
        });

        (status, axum::Json(body)).into_response()
    }
}
