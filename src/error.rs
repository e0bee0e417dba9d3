//! Error types for the Batchflow worker
//!
//! Provides structured error handling with:
//! - Numeric error codes for machine parsing
//! - User-friendly messages with suggestions
//! - Error context and chaining
//! - Exit codes for CLI

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for worker operations
pub type Result<T> = std::result::Result<T, Error>;

/// Numeric error codes for machine parsing and documentation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u16)]
pub enum ErrorCode {
    // Configuration errors (1xx)
    ConfigNotFound = 100,
    ConfigParseError = 101,
    ConfigValidation = 102,

    // IO errors (2xx)
    IoRead = 200,
    IoWrite = 201,
    IoPermission = 202,
    IoNotFound = 203,

    // Event / input errors (3xx)
    EventMalformed = 300,
    TokenMissing = 301,

    // Callback delivery errors (4xx)
    CallbackDelivery = 400,
    CallbackRejected = 401,
    CallbackTimeout = 402,
    DuplicateReport = 403,

    // Work execution errors (5xx)
    WorkFailed = 500,
    WorkTimeout = 501,
    WorkPanicked = 502,

    // Internal errors (9xx)
    InternalError = 900,
    NotSupported = 902,
}

impl ErrorCode {
    /// Get the string code (e.g., "E400")
    pub fn as_str(&self) -> String {
        format!("E{}", *self as u16)
    }

    /// Get the exit code for CLI (maps to 1-125 range)
    pub fn exit_code(&self) -> i32 {
        match *self as u16 {
            100..=199 => 10, // Config errors
            200..=299 => 20, // IO errors
            300..=399 => 30, // Event errors
            400..=499 => 40, // Callback errors
            500..=599 => 50, // Work errors
            900..=999 => 90, // Internal errors
            _ => 1,
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Main error type for the worker
#[derive(Error, Debug)]
pub enum Error {
    // ─────────────────────────────────────────────────────────────
    // Configuration Errors
    // ─────────────────────────────────────────────────────────────

    /// Configuration file not found
    #[error("Configuration file not found: {path}")]
    ConfigNotFound {
        path: PathBuf,
        #[source]
        source: Option<std::io::Error>,
    },

    /// Configuration parse error
    #[error("Failed to parse configuration: {message}")]
    ConfigParse {
        message: String,
        #[source]
        source: Option<toml::de::Error>,
    },

    /// Configuration validation error
    #[error("Configuration validation failed: {message}")]
    ConfigValidation { message: String, field: Option<String> },

    /// Generic configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    // ─────────────────────────────────────────────────────────────
    // IO Errors
    // ─────────────────────────────────────────────────────────────

    /// File read error
    #[error("Failed to read file: {path}")]
    IoRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// File write error
    #[error("Failed to write file: {path}")]
    IoWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Generic IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// TOML serialization error
    #[error("TOML serialization error: {0}")]
    Toml(#[from] toml::ser::Error),

    // ─────────────────────────────────────────────────────────────
    // Event Errors
    // ─────────────────────────────────────────────────────────────

    /// The invocation event could not be parsed
    #[error("Malformed work order event: {message}")]
    EventMalformed {
        message: String,
        #[source]
        source: Option<serde_json::Error>,
    },

    /// No continuation token was supplied with the work order
    #[error("No continuation token supplied (flag, environment, or event field)")]
    TokenMissing,

    // ─────────────────────────────────────────────────────────────
    // Callback Errors
    // ─────────────────────────────────────────────────────────────

    /// Callback request failed in transit
    #[error("Callback delivery failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Orchestrator refused the report
    #[error("Orchestrator rejected report with status {status}: {body}")]
    CallbackRejected { status: u16, body: String },

    /// Callback request timed out
    #[error("Callback to {url} timed out after {timeout_secs}s")]
    CallbackTimeout { url: String, timeout_secs: u64 },

    /// A result was already reported for this token
    #[error("Result already reported for token {token}")]
    DuplicateReport { token: String },

    // ─────────────────────────────────────────────────────────────
    // Work Errors
    // ─────────────────────────────────────────────────────────────

    /// The unit of work failed
    #[error("Work execution failed: {message}")]
    WorkFailed {
        item_id: Option<String>,
        message: String,
    },

    /// The unit of work exceeded its deadline
    #[error("Work item {item_id} timed out after {timeout_secs}s")]
    WorkTimeout { item_id: String, timeout_secs: u64 },

    /// The work future panicked
    #[error("Work panicked: {message}")]
    WorkPanicked { message: String },

    // ─────────────────────────────────────────────────────────────
    // Internal Errors
    // ─────────────────────────────────────────────────────────────

    /// Feature not supported
    #[error("Not supported: {0}")]
    NotSupported(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    // ─────────────────────────────────────────────────────────────
    // Error Classification
    // ─────────────────────────────────────────────────────────────

    /// Get the numeric error code
    pub fn code(&self) -> ErrorCode {
        match self {
            Error::ConfigNotFound { .. } => ErrorCode::ConfigNotFound,
            Error::ConfigParse { .. } => ErrorCode::ConfigParseError,
            Error::ConfigValidation { .. } => ErrorCode::ConfigValidation,
            Error::Config(_) => ErrorCode::ConfigValidation,

            Error::IoRead { .. } => ErrorCode::IoRead,
            Error::IoWrite { .. } => ErrorCode::IoWrite,
            Error::Io(e) => match e.kind() {
                std::io::ErrorKind::NotFound => ErrorCode::IoNotFound,
                std::io::ErrorKind::PermissionDenied => ErrorCode::IoPermission,
                _ => ErrorCode::IoRead,
            },
            Error::Toml(_) => ErrorCode::ConfigParseError,

            Error::EventMalformed { .. } => ErrorCode::EventMalformed,
            Error::TokenMissing => ErrorCode::TokenMissing,

            Error::Http(e) if e.is_timeout() => ErrorCode::CallbackTimeout,
            Error::Http(_) => ErrorCode::CallbackDelivery,
            Error::CallbackRejected { .. } => ErrorCode::CallbackRejected,
            Error::CallbackTimeout { .. } => ErrorCode::CallbackTimeout,
            Error::DuplicateReport { .. } => ErrorCode::DuplicateReport,

            Error::WorkFailed { .. } => ErrorCode::WorkFailed,
            Error::WorkTimeout { .. } => ErrorCode::WorkTimeout,
            Error::WorkPanicked { .. } => ErrorCode::WorkPanicked,

            Error::NotSupported(_) => ErrorCode::NotSupported,
            Error::Internal(_) => ErrorCode::InternalError,
        }
    }

    /// Whether this is a work-execution error (reported to the
    /// orchestrator via the failure callback)
    pub fn is_work_error(&self) -> bool {
        matches!(
            self,
            Error::WorkFailed { .. } | Error::WorkTimeout { .. } | Error::WorkPanicked { .. }
        )
    }

    /// Whether this is a callback-delivery error (surfaced to the
    /// executor's caller, never absorbed)
    pub fn is_callback_error(&self) -> bool {
        matches!(
            self,
            Error::Http(_) | Error::CallbackRejected { .. } | Error::CallbackTimeout { .. }
        )
    }

    /// Check if the error is retryable by the hosting layer.
    ///
    /// The worker never retries internally; this classifies errors for
    /// whatever invoked it (a platform retry policy redelivers the whole
    /// invocation).
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Error::Http(_)
                | Error::CallbackRejected { .. }
                | Error::CallbackTimeout { .. }
                | Error::WorkTimeout { .. }
                | Error::Io(_)
                | Error::IoRead { .. }
                | Error::IoWrite { .. }
        )
    }

    /// Check if the error is fatal (worker should exit without retry)
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Error::ConfigNotFound { .. }
                | Error::ConfigParse { .. }
                | Error::ConfigValidation { .. }
                | Error::TokenMissing
                | Error::Internal(_)
        )
    }

    /// Get the exit code for CLI
    pub fn exit_code(&self) -> i32 {
        self.code().exit_code()
    }

    // ─────────────────────────────────────────────────────────────
    // User-Friendly Messages
    // ─────────────────────────────────────────────────────────────

    /// Get a user-friendly suggestion for how to fix this error
    pub fn suggestion(&self) -> Option<&'static str> {
        match self {
            Error::ConfigNotFound { .. } => Some(
                "Run 'batchflow-worker config init' to create a default configuration file."
            ),
            Error::ConfigParse { .. } => Some(
                "Check your configuration file syntax. Run 'batchflow-worker config validate' to see details."
            ),
            Error::ConfigValidation { .. } => Some(
                "Review the configuration file and fix the invalid values. See documentation for valid options."
            ),

            Error::EventMalformed { .. } => Some(
                "The work order event must be a JSON object. Check the file passed with --event."
            ),
            Error::TokenMissing => Some(
                "Pass the token with --token, set BATCHFLOW_TASK_TOKEN, or include a task_token field in the event."
            ),

            Error::Http(_) => Some(
                "Check your network connection and verify the orchestrator callback URL is correct."
            ),
            Error::CallbackRejected { .. } => Some(
                "The orchestrator refused the report. The token may have expired or already been consumed."
            ),
            Error::CallbackTimeout { .. } => Some(
                "The orchestrator may be down or unreachable. Check your firewall settings."
            ),
            Error::DuplicateReport { .. } => Some(
                "A result was already reported for this token. Each token accepts exactly one report."
            ),

            Error::WorkTimeout { .. } => Some(
                "Raise 'work_timeout_secs' in the [executor] config section, or set it to 0 to disable the deadline."
            ),

            _ => None,
        }
    }

    /// Format the error for terminal display with colors
    pub fn format_for_terminal(&self) -> String {
        let code = self.code();
        let suggestion = self.suggestion();

        let mut output = format!(
            "\x1b[31mError [{}]\x1b[0m: {}\n",
            code.as_str(),
            self
        );

        if let Some(hint) = suggestion {
            output.push_str(&format!("\n\x1b[33mHint\x1b[0m: {}\n", hint));
        }

        output
    }

    /// Format the error for logging (no colors)
    pub fn format_for_log(&self) -> String {
        let code = self.code();
        format!("[{}] {}", code.as_str(), self)
    }
}

// ─────────────────────────────────────────────────────────────────
// Error Constructors (for ergonomic error creation)
// ─────────────────────────────────────────────────────────────────

impl Error {
    /// Create a config not found error
    pub fn config_not_found(path: impl Into<PathBuf>) -> Self {
        Error::ConfigNotFound {
            path: path.into(),
            source: None,
        }
    }

    /// Create a config validation error
    pub fn config_validation(message: impl Into<String>) -> Self {
        Error::ConfigValidation {
            message: message.into(),
            field: None,
        }
    }

    /// Create a config validation error with field name
    pub fn config_field_invalid(field: impl Into<String>, message: impl Into<String>) -> Self {
        Error::ConfigValidation {
            message: message.into(),
            field: Some(field.into()),
        }
    }

    /// Create a malformed event error
    pub fn event_malformed(message: impl Into<String>) -> Self {
        Error::EventMalformed {
            message: message.into(),
            source: None,
        }
    }

    /// Create a rejected callback error
    pub fn callback_rejected(status: u16, body: impl Into<String>) -> Self {
        Error::CallbackRejected {
            status,
            body: body.into(),
        }
    }

    /// Create a duplicate report error
    pub fn duplicate_report(token: impl Into<String>) -> Self {
        Error::DuplicateReport {
            token: token.into(),
        }
    }

    /// Create a work failed error
    pub fn work_failed(message: impl Into<String>) -> Self {
        Error::WorkFailed {
            item_id: None,
            message: message.into(),
        }
    }

    /// Create a work failed error for a specific item
    pub fn work_failed_for(item_id: impl Into<String>, message: impl Into<String>) -> Self {
        Error::WorkFailed {
            item_id: Some(item_id.into()),
            message: message.into(),
        }
    }

    /// Create a work panicked error
    pub fn work_panicked(message: impl Into<String>) -> Self {
        Error::WorkPanicked {
            message: message.into(),
        }
    }
}

// ─────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_format() {
        assert_eq!(ErrorCode::ConfigNotFound.as_str(), "E100");
        assert_eq!(ErrorCode::CallbackDelivery.as_str(), "E400");
        assert_eq!(ErrorCode::WorkFailed.as_str(), "E500");
        assert_eq!(ErrorCode::InternalError.as_str(), "E900");
    }

    #[test]
    fn test_error_exit_codes() {
        assert_eq!(ErrorCode::ConfigNotFound.exit_code(), 10);
        assert_eq!(ErrorCode::IoRead.exit_code(), 20);
        assert_eq!(ErrorCode::EventMalformed.exit_code(), 30);
        assert_eq!(ErrorCode::CallbackRejected.exit_code(), 40);
        assert_eq!(ErrorCode::WorkFailed.exit_code(), 50);
        assert_eq!(ErrorCode::InternalError.exit_code(), 90);
    }

    #[test]
    fn test_error_display() {
        let err = Error::ConfigNotFound {
            path: PathBuf::from("/path/to/config.toml"),
            source: None,
        };
        assert!(err.to_string().contains("/path/to/config.toml"));
    }

    #[test]
    fn test_error_codes() {
        let err = Error::config_not_found("/test");
        assert_eq!(err.code(), ErrorCode::ConfigNotFound);

        let err = Error::callback_rejected(503, "unavailable");
        assert_eq!(err.code(), ErrorCode::CallbackRejected);

        let err = Error::work_failed("disk full");
        assert_eq!(err.code(), ErrorCode::WorkFailed);

        let err = Error::duplicate_report("tok");
        assert_eq!(err.code(), ErrorCode::DuplicateReport);
    }

    #[test]
    fn test_error_classification() {
        assert!(Error::work_failed("boom").is_work_error());
        assert!(Error::work_panicked("boom").is_work_error());
        assert!(!Error::work_failed("boom").is_callback_error());

        assert!(Error::callback_rejected(500, "oops").is_callback_error());
        assert!(!Error::callback_rejected(500, "oops").is_work_error());
    }

    #[test]
    fn test_error_retryable() {
        assert!(Error::callback_rejected(503, "unavailable").is_retryable());
        assert!(Error::CallbackTimeout { url: "http://o".into(), timeout_secs: 30 }.is_retryable());
        assert!(!Error::config_not_found("/test").is_retryable());
        assert!(!Error::work_failed("boom").is_retryable());
    }

    #[test]
    fn test_error_fatal() {
        assert!(Error::config_not_found("/test").is_fatal());
        assert!(Error::TokenMissing.is_fatal());
        assert!(!Error::callback_rejected(500, "oops").is_fatal());
    }

    #[test]
    fn test_error_suggestions() {
        let err = Error::config_not_found("/test");
        assert!(err.suggestion().is_some());
        assert!(err.suggestion().unwrap().contains("config init"));

        let err = Error::TokenMissing;
        assert!(err.suggestion().is_some());
        assert!(err.suggestion().unwrap().contains("BATCHFLOW_TASK_TOKEN"));
    }

    #[test]
    fn test_format_for_terminal() {
        let err = Error::config_not_found("/test/config.toml");
        let formatted = err.format_for_terminal();

        assert!(formatted.contains("E100"));
        assert!(formatted.contains("\x1b[31m"));
        assert!(formatted.contains("Hint"));
    }

    #[test]
    fn test_format_for_log() {
        let err = Error::config_not_found("/test/config.toml");
        let formatted = err.format_for_log();

        assert!(formatted.contains("[E100]"));
        assert!(!formatted.contains("\x1b["));
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: Error = io_err.into();

        assert_eq!(err.code(), ErrorCode::IoNotFound);
    }
}
