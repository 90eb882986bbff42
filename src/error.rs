//! Unified error types for the translator application.

use thiserror::Error;

/// Errors returned by a translation service client.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Transport-level failure (DNS, TLS, connection reset, timeout).
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    /// HTTP 403
    #[error("authorization failed, check your authentication key")]
    AuthorizationFailed,
    /// HTTP 404
    #[error("resource not found")]
    NotFound,
    /// HTTP 429
    #[error("too many requests, try again later")]
    TooManyRequests,
    /// HTTP 456
    #[error("quota exceeded")]
    QuotaExceeded,
    /// Any other non-success status.
    #[error("service returned {status}: {message}")]
    Status { status: u16, message: String },
    /// The response body could not be understood.
    #[error("malformed response: {0}")]
    Malformed(String),
}

/// Result type for client calls.
pub type ClientResult<T> = std::result::Result<T, ClientError>;

/// Application-specific errors.
///
/// None of these terminate the process once the UI is running; they end up
/// in the status area.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Missing required authentication key.")]
    MissingAuthKey,
    #[error("Target language not set")]
    TargetLanguageNotSet,
    #[error(transparent)]
    Client(#[from] ClientError),
    #[error("Glossary not found: {0}")]
    GlossaryNotFound(String),
    #[error("Glossaries name mismatch: {expected} != {actual}")]
    GlossaryNameMismatch { expected: String, actual: String },
    #[error("Selection {index} out of range ({len} options)")]
    SelectionOutOfRange { index: usize, len: usize },
    #[error("Unsupported glossary language pair: {source_lang} -> {target_lang}")]
    UnsupportedLanguagePair {
        source_lang: String,
        target_lang: String,
    },
    /// The replacement glossary exists but the original could not be removed.
    #[error("Glossary update incomplete: created {replacement} but failed to delete {original}: {source}")]
    GlossaryUpdateIncomplete {
        original: String,
        replacement: String,
        #[source]
        source: ClientError,
    },
    #[error("Invalid command: {0}")]
    InvalidCommand(String),
    #[error("Terminal error: {0}")]
    Terminal(#[from] std::io::Error),
}

/// Type alias for Results in this application.
pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn target_language_message_matches_status_text() {
        assert_eq!(
            AppError::TargetLanguageNotSet.to_string(),
            "Target language not set"
        );
    }

    #[test]
    fn client_errors_display_through_app_error() {
        let err: AppError = ClientError::Status {
            status: 400,
            message: "Value for 'target_lang' not supported.".to_string(),
        }
        .into();
        assert_eq!(
            err.to_string(),
            "service returned 400: Value for 'target_lang' not supported."
        );
    }

    #[test]
    fn incomplete_update_names_both_glossaries() {
        let err = AppError::GlossaryUpdateIncomplete {
            original: "old-id".to_string(),
            replacement: "new-id".to_string(),
            source: ClientError::NotFound,
        };
        let text = err.to_string();
        assert!(text.contains("old-id"));
        assert!(text.contains("new-id"));
    }
}
