use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::fmt;
use thiserror::Error;

use crate::report;

/// Rejection raised by the calculators and the field parser.
///
/// Every variant names the offending field so the presentation layer can
/// point the user at it. A calculation that hits any of these produces no
/// partial result.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InvalidInputError {
    #[error("{field}: '{raw}' is not a number")]
    NotANumber { field: String, raw: String },

    #[error("{field}: value must be a finite number")]
    NotFinite { field: String },

    #[error("{field}: value must not be negative (got {value})")]
    Negative { field: String, value: f64 },

    #[error("{field}: {reason}")]
    OutOfRange { field: String, reason: String },

    #[error("unknown field '{0}'")]
    UnknownField(String),

    #[error("missing field '{0}'")]
    MissingField(String),

    #[error("field '{0}' is given more than once")]
    DuplicateField(String),
}

impl InvalidInputError {
    pub fn out_of_range(field: &str, reason: impl Into<String>) -> Self {
        Self::OutOfRange {
            field: field.to_string(),
            reason: reason.into(),
        }
    }

    /// Field the error refers to
    pub fn field(&self) -> &str {
        match self {
            Self::NotANumber { field, .. }
            | Self::NotFinite { field }
            | Self::Negative { field, .. }
            | Self::OutOfRange { field, .. } => field,
            Self::UnknownField(field)
            | Self::MissingField(field)
            | Self::DuplicateField(field) => field,
        }
    }
}

/// Application error types for the HTTP service
#[derive(Debug)]
pub enum AppError {
    /// Rejected calculator input
    InvalidInput(InvalidInputError),
    /// Request body could not be interpreted as a field map
    BadRequest(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidInput(err) => write!(f, "Invalid input: {}", err),
            Self::BadRequest(msg) => write!(f, "Bad request: {}", msg),
        }
    }
}

impl std::error::Error for AppError {}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match &self {
            Self::InvalidInput(err) => (StatusCode::BAD_REQUEST, err.to_string()),
            Self::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
        };

        let mut error = json!({
            "message": error_message,
            "type": error_type_name(&self),
        });
        if let Self::InvalidInput(err) = &self {
            error["field"] = json!(err.field());
            error["report"] = json!(report::render_error(err));
        }

        (status, Json(json!({ "error": error }))).into_response()
    }
}

pub fn error_type_name(error: &AppError) -> &'static str {
    match error {
        AppError::InvalidInput(_) => "invalid_input",
        AppError::BadRequest(_) => "bad_request",
    }
}

impl From<InvalidInputError> for AppError {
    fn from(err: InvalidInputError) -> Self {
        Self::InvalidInput(err)
    }
}
