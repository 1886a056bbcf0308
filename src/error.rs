//! Typed errors and HTTP mapping.
//!
//! Only failures that bypass the response envelope live here: malformed or
//! invalid requests (400) and unanticipated faults (500). Expected business
//! outcomes are reported through [`crate::response::ResponseEnvelope`].

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use std::fmt;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("duplicate field '{field}' in record type {record}")]
    DuplicateField { record: String, field: String },
    #[error("enum field '{0}' has no allowed values")]
    EmptyEnum(String),
    #[error("field '{field}' has contradictory length bound [{min}, {max}]")]
    InvalidLength { field: String, min: u32, max: u32 },
    #[error("field '{field}' has contradictory range [{min}, {max}]")]
    InvalidRange { field: String, min: f64, max: f64 },
    #[error("missing environment variable {0}")]
    MissingVar(&'static str),
    #[error("config load: {0}")]
    Load(String),
}

/// One failing field and a human-readable reason.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct FieldIssue {
    pub field: String,
    pub reason: String,
}

impl FieldIssue {
    pub fn new(field: impl Into<String>, reason: impl Into<String>) -> Self {
        FieldIssue {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

/// Input rejected by a derived schema. Always carries at least one issue.
#[derive(Clone, Debug, PartialEq)]
pub struct ValidationError {
    pub issues: Vec<FieldIssue>,
}

impl ValidationError {
    pub fn single(field: impl Into<String>, reason: impl Into<String>) -> Self {
        ValidationError {
            issues: vec![FieldIssue::new(field, reason)],
        }
    }

    pub fn has_field(&self, field: &str) -> bool {
        self.issues.iter().any(|i| i.field == field)
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reasons: Vec<&str> = self.issues.iter().map(|i| i.reason.as_str()).collect();
        write!(f, "{}", reasons.join("; "))
    }
}

impl std::error::Error for ValidationError {}

#[derive(Error, Debug)]
pub enum StoreError {
    /// A unique constraint rejected the write.
    #[error("conflict: {0}")]
    Conflict(String),
    /// Any other constraint (not null, check, foreign key) rejected the write.
    #[error("constraint violated: {0}")]
    Constraint(String),
    #[error("database: {0}")]
    Database(#[from] sqlx::Error),
    #[error("store unavailable: {0}")]
    Unavailable(String),
    #[error("decode: {0}")]
    Decode(#[from] serde_json::Error),
}

impl StoreError {
    /// Classify a sqlx error by the constraint kind PostgreSQL reported.
    pub fn from_sqlx(e: sqlx::Error) -> Self {
        use sqlx::error::ErrorKind;
        if let sqlx::Error::Database(db) = &e {
            match db.kind() {
                ErrorKind::UniqueViolation => {
                    return StoreError::Conflict(db.constraint().unwrap_or("unique").to_string());
                }
                ErrorKind::ForeignKeyViolation | ErrorKind::NotNullViolation | ErrorKind::CheckViolation => {
                    return StoreError::Constraint(db.message().to_string());
                }
                _ => {}
            }
        }
        StoreError::Database(e)
    }
}

/// Failures inside the credential and token capabilities themselves.
#[derive(Error, Debug)]
pub enum AuthError {
    #[error("password hashing failed: {0}")]
    Hash(String),
    #[error("stored password digest is malformed: {0}")]
    MalformedDigest(String),
    #[error("token signing failed: {0}")]
    Sign(String),
    #[error("token lifetime out of range: {0:?}")]
    TtlOutOfRange(std::time::Duration),
}

/// Why a presented token was not accepted.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenError {
    #[error("token expired")]
    Expired,
    #[error("invalid token")]
    Invalid,
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("{0}")]
    Validation(#[from] ValidationError),
    #[error("bad request: {0}")]
    BadRequest(String),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Auth(#[from] AuthError),
    #[error("internal: {0}")]
    Internal(String),
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

/// Minimal body for responses that bypass the envelope.
#[derive(Serialize)]
pub struct ErrorBody {
    pub error: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::Validation(_) | AppError::BadRequest(_) => {
                (StatusCode::BAD_REQUEST, self.to_string())
            }
            AppError::Config(_) | AppError::Store(_) | AppError::Auth(_) | AppError::Internal(_) => {
                tracing::error!(error = %self, "request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal server error".to_string(),
                )
            }
        };
        (status, Json(ErrorBody { error: message })).into_response()
    }
}
