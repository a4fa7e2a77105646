//! Error types for the docbatch CLI.
//!
//! Provides structured error handling with:
//! - Machine-readable error codes (`ErrorCode`)
//! - Category-based exit codes (2=config, 3=not_found, 4=input, …)
//! - Context-aware remediation hints
//!
//! Every failure is fatal to the invocation: there are no retries and no
//! rollback of batches that were already committed. Partial completion is
//! reported through counts, not through a partial-success exit code.

use thiserror::Error;

use crate::store::StoreError;

/// Result type alias for docbatch operations.
pub type Result<T> = std::result::Result<T, Error>;

// ── Error Code ────────────────────────────────────────────────

/// Machine-readable error codes grouped by category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    // Config (exit 2)
    ConfigError,

    // Not Found (exit 3)
    NotFound,

    // Input (exit 4)
    FormatDetection,
    MalformedRecord,
    InvalidPath,
    InvalidCondition,
    UnsupportedType,
    InvalidValue,
    DuplicateKey,
    MissingDocumentIds,
    ValidationFailed,

    // Store (exit 5)
    AuthError,
    TransportError,
    StoreResponse,

    // I/O (exit 8)
    IoError,
    JsonError,
}

impl ErrorCode {
    /// Machine-readable SCREAMING_SNAKE code string.
    #[must_use]
    pub const fn as_str(&self) -> &str {
        match self {
            Self::ConfigError => "CONFIG_ERROR",
            Self::NotFound => "NOT_FOUND",
            Self::FormatDetection => "FORMAT_DETECTION",
            Self::MalformedRecord => "MALFORMED_RECORD",
            Self::InvalidPath => "INVALID_PATH",
            Self::InvalidCondition => "INVALID_CONDITION",
            Self::UnsupportedType => "UNSUPPORTED_TYPE",
            Self::InvalidValue => "INVALID_VALUE",
            Self::DuplicateKey => "DUPLICATE_KEY",
            Self::MissingDocumentIds => "MISSING_DOCUMENT_IDS",
            Self::ValidationFailed => "VALIDATION_FAILED",
            Self::AuthError => "AUTH_ERROR",
            Self::TransportError => "TRANSPORT_ERROR",
            Self::StoreResponse => "STORE_RESPONSE",
            Self::IoError => "IO_ERROR",
            Self::JsonError => "JSON_ERROR",
        }
    }

    /// Category-based exit code.
    #[must_use]
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::ConfigError => 2,
            Self::NotFound => 3,
            Self::FormatDetection
            | Self::MalformedRecord
            | Self::InvalidPath
            | Self::InvalidCondition
            | Self::UnsupportedType
            | Self::InvalidValue
            | Self::DuplicateKey
            | Self::MissingDocumentIds
            | Self::ValidationFailed => 4,
            Self::AuthError | Self::TransportError | Self::StoreResponse => 5,
            Self::IoError | Self::JsonError => 8,
        }
    }
}

// ── Error Enum ────────────────────────────────────────────────

/// Errors that can occur in docbatch operations.
#[derive(Error, Debug)]
pub enum Error {
    #[error("could not detect the input format")]
    FormatDetection,

    #[error("malformed record at line {line}: {message}")]
    MalformedRecord { line: usize, message: String },

    #[error("invalid path '{path}': {reason}")]
    InvalidPath { path: String, reason: String },

    #[error("invalid query condition: '{condition}'")]
    InvalidCondition { condition: String },

    #[error("cannot encode value: {detail}")]
    UnsupportedType { detail: String },

    #[error("invalid value: {detail}")]
    InvalidValue { detail: String },

    #[error("duplicate document id '{id}' in input")]
    DuplicateKey { id: String },

    #[error("no document ids found in the input file")]
    MissingDocumentIds,

    #[error("record validation failed: {detail}")]
    ValidationFailed { detail: String },

    #[error("configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Map this error to its structured `ErrorCode`.
    #[must_use]
    pub const fn error_code(&self) -> ErrorCode {
        match self {
            Self::FormatDetection => ErrorCode::FormatDetection,
            Self::MalformedRecord { .. } => ErrorCode::MalformedRecord,
            Self::InvalidPath { .. } => ErrorCode::InvalidPath,
            Self::InvalidCondition { .. } => ErrorCode::InvalidCondition,
            Self::UnsupportedType { .. } => ErrorCode::UnsupportedType,
            Self::InvalidValue { .. } => ErrorCode::InvalidValue,
            Self::DuplicateKey { .. } => ErrorCode::DuplicateKey,
            Self::MissingDocumentIds => ErrorCode::MissingDocumentIds,
            Self::ValidationFailed { .. } => ErrorCode::ValidationFailed,
            Self::Config(_) => ErrorCode::ConfigError,
            Self::Store(StoreError::NotFound { .. }) => ErrorCode::NotFound,
            Self::Store(StoreError::Auth { .. }) => ErrorCode::AuthError,
            Self::Store(StoreError::Transport { .. }) => ErrorCode::TransportError,
            Self::Store(StoreError::InvalidResponse { .. }) => ErrorCode::StoreResponse,
            Self::Io(_) => ErrorCode::IoError,
            Self::Json(_) => ErrorCode::JsonError,
        }
    }

    /// Category-based exit code, delegating to the `ErrorCode`.
    #[must_use]
    pub const fn exit_code(&self) -> u8 {
        self.error_code().exit_code()
    }

    /// Context-aware remediation hint for humans and scripts.
    ///
    /// Returns `None` if no actionable suggestion exists.
    #[must_use]
    pub fn hint(&self) -> Option<String> {
        match self {
            Self::FormatDetection => Some(
                "The input is neither a JSON document nor JSON Lines. \
                 Pass --format json or --format jsonl to skip detection."
                    .to_string(),
            ),

            Self::MissingDocumentIds => Some(
                "The file carries no __doc_id__ fields, so there is nothing to delete. \
                 Files exported with --raw drop document ids; re-export without --raw."
                    .to_string(),
            ),

            Self::DuplicateKey { id } => Some(format!(
                "Two input records share __doc_id__ '{id}'. \
                 Deduplicate the input; nothing was committed."
            )),

            Self::InvalidCondition { .. } => Some(
                "Conditions are written as \"<field> <operator> <value>\", e.g. \
                 \"age >= 21\" or \"name == 'Bob Smith'\"."
                    .to_string(),
            ),

            Self::InvalidPath { .. } => Some(
                "Paths alternate collection and document segments: \
                 \"users\" or \"users/u1/orders\" name collections, \
                 \"users/u1\" names a document."
                    .to_string(),
            ),

            Self::Store(StoreError::NotFound { .. }) => Some(
                "A strict update only touches existing documents. \
                 Retry with --upsert to create the missing ones. \
                 Batches committed before this failure remain committed."
                    .to_string(),
            ),

            Self::Store(StoreError::Auth { .. } | StoreError::Transport { .. }) => Some(
                "Check the connection to the document store. For Google Cloud:\n  \
                 gcloud auth login --no-launch-browser\n  \
                 gcloud auth application-default login --no-launch-browser\n  \
                 or export DOCBATCH_ACCESS_TOKEN with a valid access token. \
                 Against a local emulator, set FIRESTORE_EMULATOR_HOST."
                    .to_string(),
            ),

            Self::Config(_) => Some(
                "Set --project (or DOCBATCH_PROJECT / GOOGLE_CLOUD_PROJECT) to the \
                 target project id."
                    .to_string(),
            ),

            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes_by_category() {
        assert_eq!(Error::Config("x".into()).exit_code(), 2);
        assert_eq!(
            Error::Store(StoreError::NotFound { path: "p".into() }).exit_code(),
            3
        );
        assert_eq!(Error::FormatDetection.exit_code(), 4);
        assert_eq!(Error::DuplicateKey { id: "x".into() }.exit_code(), 4);
        assert_eq!(
            Error::Store(StoreError::Transport { message: "x".into() }).exit_code(),
            5
        );
    }

    #[test]
    fn test_not_found_hint_mentions_upsert() {
        let err = Error::Store(StoreError::NotFound { path: "users/u1".into() });
        assert!(err.hint().unwrap().contains("--upsert"));
    }

    #[test]
    fn test_auth_hint_mentions_gcloud() {
        let err = Error::Store(StoreError::Auth { message: "401".into() });
        assert!(err.hint().unwrap().contains("gcloud auth"));
    }
}
