//! Error types for leaderboard loading and configuration.
//!
//! The transformation pipeline itself never fails: sentinel lap times become
//! "no data", unmatched cars fall into the `Other` class and malformed roster
//! rows are dropped. Errors only surface at the edges, where telemetry and
//! roster payloads are fetched or settings are read.
//!
//! ## Error Categories
//!
//! - **Network Errors**: transport failures and non-success HTTP statuses
//! - **File Errors**: local telemetry/roster/settings files that cannot be read
//! - **Parse Errors**: payloads or settings that fail structural decoding
//! - **Validation Errors**: URLs or settings values outside their allowed range
//!
//! ## Transient failures
//!
//! Nothing in this crate retries. Callers that want to schedule another
//! attempt can ask an error whether it looks transient:
//!
//! ```rust
//! use pitboard::TimingError;
//!
//! let error = TimingError::status("https://example.com/leaderboard.json", 503);
//! if error.is_transient() {
//!     for suggestion in error.recovery_suggestions() {
//!         println!("  - {}", suggestion);
//!     }
//! }
//! ```

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Result type alias for leaderboard operations.
pub type Result<T, E = TimingError> = std::result::Result<T, E>;

/// Main error type for leaderboard operations.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum TimingError {
    #[error("Request to {url} failed")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} returned HTTP {status}")]
    Status { url: String, status: u16 },

    #[error("File error: {path}")]
    File {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Parse error in {context}: {details}")]
    Parse { context: String, details: String },

    #[error("Invalid URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("Invalid setting '{field}': {reason}")]
    InvalidSetting { field: String, reason: String },

    #[error("Operation timed out after {duration:?}")]
    Timeout { duration: Duration },
}

impl TimingError {
    /// Returns whether a later attempt could plausibly succeed.
    ///
    /// This is informational only; the engine itself never retries.
    pub fn is_transient(&self) -> bool {
        match self {
            TimingError::Http { .. } => true,
            TimingError::Status { status, .. } => *status >= 500 || *status == 429,
            TimingError::Timeout { .. } => true,
            TimingError::File { .. } => false,
            TimingError::Parse { .. } => false,
            TimingError::InvalidUrl { .. } => false,
            TimingError::InvalidSetting { .. } => false,
        }
    }

    /// Returns suggested recovery actions for this error.
    pub fn recovery_suggestions(&self) -> Vec<&'static str> {
        match self {
            TimingError::Http { .. } => vec![
                "Check network connectivity",
                "Verify the timing server is online",
                "Check the configured server URL",
            ],
            TimingError::Status { .. } => vec![
                "Verify the endpoint path is correct",
                "Check that the server exposes live timings",
                "Wait for the next refresh",
            ],
            TimingError::File { .. } => vec![
                "Check file exists and is readable",
                "Check file permissions",
            ],
            TimingError::Parse { .. } => vec![
                "Check the payload is a live timings leaderboard",
                "Verify source data integrity",
            ],
            TimingError::InvalidUrl { .. } => vec![
                "Use an absolute http or https URL",
                "Leave the field empty to disable it",
            ],
            TimingError::InvalidSetting { .. } => vec![
                "Check the settings file against the documented defaults",
                "Remove the field to fall back to its default",
            ],
            TimingError::Timeout { .. } => vec![
                "Check the timing server is responding",
                "Wait for the next refresh",
            ],
        }
    }

    /// Helper constructor for transport errors with URL context.
    pub fn http(url: impl Into<String>, source: reqwest::Error) -> Self {
        TimingError::Http { url: url.into(), source }
    }

    /// Helper constructor for non-success HTTP statuses.
    pub fn status(url: impl Into<String>, status: u16) -> Self {
        TimingError::Status { url: url.into(), status }
    }

    /// Helper constructor for file errors with path context.
    pub fn file_error(path: PathBuf, source: std::io::Error) -> Self {
        TimingError::File { path, source }
    }

    /// Helper constructor for parse errors.
    pub fn parse(context: impl Into<String>, details: impl Into<String>) -> Self {
        TimingError::Parse { context: context.into(), details: details.into() }
    }

    /// Helper constructor for URL validation errors.
    pub fn invalid_url(url: impl Into<String>, reason: impl Into<String>) -> Self {
        TimingError::InvalidUrl { url: url.into(), reason: reason.into() }
    }

    /// Helper constructor for settings validation errors.
    pub fn invalid_setting(field: impl Into<String>, reason: impl Into<String>) -> Self {
        TimingError::InvalidSetting { field: field.into(), reason: reason.into() }
    }
}

impl From<serde_json::Error> for TimingError {
    fn from(err: serde_json::Error) -> Self {
        TimingError::Parse { context: "Leaderboard JSON".to_string(), details: err.to_string() }
    }
}

impl From<serde_yaml_ng::Error> for TimingError {
    fn from(err: serde_yaml_ng::Error) -> Self {
        TimingError::Parse { context: "YAML settings".to_string(), details: err.to_string() }
    }
}
