// SPDX-License-Identifier: Apache-2.0
//! Error types for the contact endpoint

use crate::mailer::DispatchError;
use crate::metrics::outcome;
use crate::validator::{FieldViolation, ValidationErrors};
use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

pub const INVALID_FORM_MESSAGE: &str = "Invalid form data";
pub const RATE_LIMITED_MESSAGE: &str =
    "You have recently submitted a message. Please wait before trying again.";
pub const NOTIFICATION_FAILED_MESSAGE: &str = "Failed to send notification email. Please try again.";
pub const UNEXPECTED_MESSAGE: &str = "An unexpected error occurred. Please try again.";

/// Everything the contact handler can answer with besides success.
#[derive(Debug, Error)]
pub enum ContactError {
    #[error("Invalid form data: {0}")]
    Validation(#[from] ValidationErrors),

    #[error("Submission rate limited for {retry_after_ms} ms")]
    RateLimited { retry_after_ms: u64 },

    #[error("Owner notification failed: {0}")]
    Notification(#[source] DispatchError),

    #[error("Unexpected error: {0}")]
    Unexpected(String),
}

impl ContactError {
    /// Metrics label for this failure.
    pub fn outcome(&self) -> &'static str {
        match self {
            ContactError::Validation(_) => outcome::INVALID,
            ContactError::RateLimited { .. } => outcome::RATE_LIMITED,
            ContactError::Notification(_) => outcome::DISPATCH_FAILED,
            ContactError::Unexpected(_) => outcome::ERROR,
        }
    }
}

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<FieldViolation>>,
    /// Milliseconds until the submitter may try again
    #[serde(rename = "retryAfter", skip_serializing_if = "Option::is_none")]
    pub retry_after: Option<u64>,
}

impl ErrorResponse {
    fn message(error: &'static str) -> Self {
        Self {
            error,
            details: None,
            retry_after: None,
        }
    }
}

/// `Retry-After` value: whole seconds, rounded up.
pub fn retry_after_secs(retry_after_ms: u64) -> u64 {
    retry_after_ms.div_ceil(1000)
}

impl IntoResponse for ContactError {
    fn into_response(self) -> Response {
        match self {
            ContactError::Validation(errors) => (
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse {
                    error: INVALID_FORM_MESSAGE,
                    details: Some(errors.0),
                    retry_after: None,
                }),
            )
                .into_response(),
            ContactError::RateLimited { retry_after_ms } => {
                let mut response = (
                    StatusCode::TOO_MANY_REQUESTS,
                    Json(ErrorResponse {
                        error: RATE_LIMITED_MESSAGE,
                        details: None,
                        retry_after: Some(retry_after_ms),
                    }),
                )
                    .into_response();
                response.headers_mut().insert(
                    header::RETRY_AFTER,
                    HeaderValue::from(retry_after_secs(retry_after_ms)),
                );
                response
            }
            ContactError::Notification(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse::message(NOTIFICATION_FAILED_MESSAGE)),
            )
                .into_response(),
            ContactError::Unexpected(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse::message(UNEXPECTED_MESSAGE)),
            )
                .into_response(),
        }
    }
}
