//! Structured denial and error responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use gate_core::DenialCode;
use serde::{Deserialize, Serialize};

/// Error response body.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            code: code.into(),
        }
    }
}

/// A terminal authorization denial: a wire code plus a human-readable detail,
/// immutable once constructed.
#[derive(Debug)]
pub struct Denial {
    code: DenialCode,
    detail: String,
}

impl Denial {
    pub fn new(code: DenialCode, detail: impl Into<String>) -> Self {
        Self {
            code,
            detail: detail.into(),
        }
    }

    pub fn code(&self) -> DenialCode {
        self.code
    }

    pub fn detail(&self) -> &str {
        &self.detail
    }
}

impl IntoResponse for Denial {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.code.http_status()).unwrap_or(StatusCode::UNAUTHORIZED);
        (
            status,
            Json(ErrorResponse::new(self.detail, self.code.as_str())),
        )
            .into_response()
    }
}
