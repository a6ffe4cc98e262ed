//! Error types for persona-settings
//!
//! Provides structured error handling with:
//! - Numeric error codes for machine parsing
//! - User-friendly messages with suggestions
//! - Exit codes for CLI

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

use crate::types::Resource;

/// Result type alias for settings operations
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

    // Connection errors (3xx)
    ConnectionFailed = 300,
    ConnectionTimeout = 301,

    // Settings API errors (4xx)
    ApiStatus = 400,
    ApiMalformed = 401,

    // Form state errors (5xx)
    LoadFailed = 500,
    SaveFailed = 501,
    SaveInFlight = 502,
    FormNotReady = 503,

    // Persona / rotation errors (6xx)
    PersonaNotFound = 600,
    NoPersonas = 601,

    // Internal errors (9xx)
    InternalError = 900,
}

impl ErrorCode {
    /// Get the string code (e.g., "E100")
    pub fn as_str(&self) -> String {
        format!("E{}", *self as u16)
    }

    /// Get the exit code for CLI (maps to 1-125 range)
    pub fn exit_code(&self) -> i32 {
        match *self as u16 {
            100..=199 => 10, // Config errors
            200..=299 => 20, // IO errors
            300..=399 => 30, // Connection errors
            400..=499 => 40, // API errors
            500..=599 => 50, // Form errors
            600..=699 => 60, // Persona errors
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

/// Main error type
#[derive(Error, Debug)]
pub enum Error {
    // ─────────────────────────────────────────────────────────────
    // Configuration Errors
    // ─────────────────────────────────────────────────────────────

    /// Configuration file not found
    #[error("Configuration file not found: {path}")]
    ConfigNotFound { path: PathBuf },

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
    // Connection Errors
    // ─────────────────────────────────────────────────────────────

    /// Request could not be delivered
    #[error("Failed to reach {url}: {message}")]
    ConnectionFailed { url: String, message: String },

    /// Request timed out
    #[error("Request to {url} timed out after {timeout_secs}s")]
    ConnectionTimeout { url: String, timeout_secs: u64 },

    // ─────────────────────────────────────────────────────────────
    // Settings API Errors
    // ─────────────────────────────────────────────────────────────

    /// Non-success status on a read
    #[error("{url} returned status {status}")]
    ApiStatus { url: String, status: u16 },

    /// Response body did not match the expected shape
    #[error("Malformed response: {message}")]
    ApiMalformed { message: String },

    // ─────────────────────────────────────────────────────────────
    // Form Errors
    // ─────────────────────────────────────────────────────────────

    /// Personas or settings could not be fetched
    #[error("Failed to fetch {resource}: {message}")]
    LoadFailed { resource: Resource, message: String },

    /// The settings service rejected a save, or it never arrived
    #[error("Failed to save settings: {message}")]
    SaveFailed { status: Option<u16>, message: String },

    /// A save is already outstanding
    #[error("A save is already in progress")]
    SaveInFlight,

    /// The form has not finished loading
    #[error("Settings are still loading")]
    FormNotReady,

    // ─────────────────────────────────────────────────────────────
    // Persona Errors
    // ─────────────────────────────────────────────────────────────

    /// Persona id not present in the loaded list
    #[error("Persona not found: {id}")]
    PersonaNotFound { id: String },

    /// The persona list is empty
    #[error("No personas available")]
    NoPersonas,

    // ─────────────────────────────────────────────────────────────
    // Internal Errors
    // ─────────────────────────────────────────────────────────────

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

            Error::IoWrite { .. } => ErrorCode::IoWrite,
            Error::Io(e) => match e.kind() {
                std::io::ErrorKind::NotFound => ErrorCode::IoNotFound,
                std::io::ErrorKind::PermissionDenied => ErrorCode::IoPermission,
                _ => ErrorCode::IoRead,
            },
            Error::Toml(_) => ErrorCode::ConfigParseError,

            Error::ConnectionFailed { .. } => ErrorCode::ConnectionFailed,
            Error::ConnectionTimeout { .. } => ErrorCode::ConnectionTimeout,

            Error::ApiStatus { .. } => ErrorCode::ApiStatus,
            Error::ApiMalformed { .. } => ErrorCode::ApiMalformed,

            Error::LoadFailed { .. } => ErrorCode::LoadFailed,
            Error::SaveFailed { .. } => ErrorCode::SaveFailed,
            Error::SaveInFlight => ErrorCode::SaveInFlight,
            Error::FormNotReady => ErrorCode::FormNotReady,

            Error::PersonaNotFound { .. } => ErrorCode::PersonaNotFound,
            Error::NoPersonas => ErrorCode::NoPersonas,

            Error::Internal(_) => ErrorCode::InternalError,
        }
    }

    /// Check if retrying the same action may succeed
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Error::ConnectionFailed { .. }
                | Error::ConnectionTimeout { .. }
                | Error::ApiStatus { .. }
                | Error::LoadFailed { .. }
                | Error::SaveFailed { .. }
                | Error::SaveInFlight
                | Error::FormNotReady
        )
    }

    /// Check if the error should end the process
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Error::ConfigNotFound { .. }
                | Error::ConfigParse { .. }
                | Error::ConfigValidation { .. }
                | Error::Config(_)
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
                "Run 'persona-settings config init' to create a default configuration file."
            ),
            Error::ConfigParse { .. } => Some(
                "Check your configuration file syntax. Run 'persona-settings config validate' to see details."
            ),
            Error::ConfigValidation { .. } | Error::Config(_) => Some(
                "Review the configuration file and fix the invalid values."
            ),

            Error::ConnectionFailed { .. } => Some(
                "Check that the settings service is running and that [api] base_url is correct."
            ),
            Error::ConnectionTimeout { .. } => Some(
                "The settings service is slow or unreachable. Raise [api] timeout_secs or retry later."
            ),

            Error::LoadFailed { .. } => Some(
                "Settings could not be loaded. Run the command again to retry."
            ),
            Error::SaveFailed { .. } => Some(
                "Your changes were not saved. Run the command again to retry."
            ),
            Error::SaveInFlight => Some("Wait for the current save to finish."),

            Error::PersonaNotFound { .. } => Some(
                "Run 'persona-settings personas' to list the available persona ids."
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
        format!("[{}] {}", self.code().as_str(), self)
    }
}

// ─────────────────────────────────────────────────────────────────
// Error Constructors
// ─────────────────────────────────────────────────────────────────

impl Error {
    /// Create a config validation error with field name
    pub fn config_field_invalid(field: impl Into<String>, message: impl Into<String>) -> Self {
        Error::ConfigValidation {
            message: message.into(),
            field: Some(field.into()),
        }
    }

    /// Create a connection failed error
    pub fn connection_failed(url: impl Into<String>, message: impl Into<String>) -> Self {
        Error::ConnectionFailed {
            url: url.into(),
            message: message.into(),
        }
    }

    /// Create a load failure for one resource
    pub fn load_failed(resource: Resource, message: impl Into<String>) -> Self {
        Error::LoadFailed {
            resource,
            message: message.into(),
        }
    }

    /// Create a save failure
    pub fn save_failed(status: Option<u16>, message: impl Into<String>) -> Self {
        Error::SaveFailed {
            status,
            message: message.into(),
        }
    }
}

// ─────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────
