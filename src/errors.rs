//! License sentinel error types.

use thiserror::Error;

/// Errors that can occur during license validation.
///
/// Only `Configuration`, `Unexpected`, `InvalidLicense` and `NotInitialized`
/// ever escape [`LicenseValidator::validate`](crate::LicenseValidator::validate)
/// or the manager. Transport, connectivity and protocol failures are resolved
/// into a [`ValidationResult`](crate::ValidationResult) by the fallback policy.
#[derive(Debug, Error)]
pub enum SentinelError {
    /// Constructor input or configuration is invalid.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The license authority answered with a non-success HTTP status.
    #[error("{message}")]
    Transport {
        /// HTTP status code returned by the authority.
        status: u16,
        /// Machine-readable failure code.
        code: String,
        /// Human-readable description.
        message: String,
    },

    /// The authority could not be reached (connect failure, timeout, DNS).
    #[error("Connectivity error: {0}")]
    Connectivity(String),

    /// The authority answered with a malformed payload.
    #[error("Protocol error: {0}")]
    Protocol(String),

    /// A failure that carries no structured classification.
    #[error("Unexpected error: {0}")]
    Unexpected(String),

    /// Cache store read or write failed.
    #[error("Cache error: {0}")]
    Cache(String),

    /// License is invalid or expired.
    #[error("Invalid license")]
    InvalidLicense,

    /// The manager was used before `initialize()` succeeded.
    #[error("License client not initialized, call initialize() first")]
    NotInitialized,
}

/// Failure code for 5xx responses.
pub const CODE_SERVER_ERROR: &str = "SERVER_ERROR";

/// Failure code for 401/403 responses.
pub const CODE_INVALID_LICENSE: &str = "INVALID_LICENSE";

/// Failure code for any other non-success response.
pub const CODE_VALIDATION_FAILED: &str = "VALIDATION_FAILED";

impl SentinelError {
    /// Build a transport failure from an HTTP status, deriving its code.
    pub fn transport(status: u16, message: impl Into<String>) -> Self {
        let code = match status {
            500.. => CODE_SERVER_ERROR,
            401 | 403 => CODE_INVALID_LICENSE,
            _ => CODE_VALIDATION_FAILED,
        };
        Self::Transport {
            status,
            code: code.to_string(),
            message: message.into(),
        }
    }

    /// HTTP status carried by the failure, if any.
    ///
    /// Protocol failures report 500 so they are handled like an outage.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Transport { status, .. } => Some(*status),
            Self::Protocol(_) => Some(500),
            _ => None,
        }
    }

    /// Whether the carried status is retry-eligible.
    ///
    /// Untyped failures are judged by [`ErrorClassifier`](crate::ErrorClassifier).
    pub fn is_retryable(&self) -> bool {
        self.status().is_some_and(Self::is_retryable_status)
    }

    /// Whether the status alone makes this failure worth retrying.
    pub fn is_retryable_status(status: u16) -> bool {
        status >= 500 || status == 408 || status == 429
    }
}
