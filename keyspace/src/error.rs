//! All error types for the keyspace crate.
//!
//! The engine operations (merge, scope, assemble, reconcile, coverage) are
//! total and never return these. They come from the boundary: decoding
//! category files, validating keys and locales, and file I/O.

use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid key `{key}` in {origin}: {reason}")]
    InvalidKey {
        key: String,
        origin: String,
        reason: String,
    },

    #[error("invalid value for key `{key}` in {origin}: expected string, found {found}")]
    InvalidValue {
        key: String,
        origin: String,
        found: String,
    },

    #[error("invalid locale `{0}`")]
    InvalidLocale(String),

    #[error("missing field `{field}` in {origin}")]
    MissingField { field: String, origin: String },

    #[error("validation error: {0}")]
    Validation(String),
}

/// Stable, serializable classification of [`Error`] for reports and exit codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    Io,
    Parse,
    InvalidKey,
    InvalidValue,
    InvalidLocale,
    MissingField,
    Validation,
}

impl Error {
    /// Creates a new invalid-key error.
    pub fn invalid_key(
        key: impl Into<String>,
        origin: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Error::InvalidKey {
            key: key.into(),
            origin: origin.into(),
            reason: reason.into(),
        }
    }

    /// Creates a new validation error
    pub fn validation_error(message: impl Into<String>) -> Self {
        Error::Validation(message.into())
    }

    pub fn error_code(&self) -> ErrorCode {
        match self {
            Error::Io(_) => ErrorCode::Io,
            Error::Parse(_) => ErrorCode::Parse,
            Error::InvalidKey { .. } => ErrorCode::InvalidKey,
            Error::InvalidValue { .. } => ErrorCode::InvalidValue,
            Error::InvalidLocale(_) => ErrorCode::InvalidLocale,
            Error::MissingField { .. } => ErrorCode::MissingField,
            Error::Validation(_) => ErrorCode::Validation,
        }
    }
}
