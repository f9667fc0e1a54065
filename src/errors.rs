//! Error types for crm-tools
//!
//! Every failure is fatal to the calling tool; these variants only exist so
//! the final log line says which phase went wrong.

use thiserror::Error;

/// Main error type for resource manager operations
#[derive(Error, Debug)]
pub enum CrmError {
    /// No credential source produced an access token
    #[error("Authentication failed: {0}")]
    Auth(String),

    /// Non-success response from the Resource Manager API
    #[error("Resource Manager API error ({code} {status}): {message}")]
    Api {
        code: u16,
        status: String,
        message: String,
    },

    /// HTTP client errors
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Result type alias for resource manager operations
pub type Result<T> = std::result::Result<T, CrmError>;

impl CrmError {
    /// Whether the service rejected the caller's credentials or permissions
    pub fn is_permission_denied(&self) -> bool {
        matches!(self, CrmError::Api { code: 401 | 403, .. })
    }
}
