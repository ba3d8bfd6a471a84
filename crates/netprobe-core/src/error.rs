//! Centralized error types for netprobe.
//!
//! Uses thiserror for ergonomic error handling with context.

use thiserror::Error;

/// Main error type for netprobe operations.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum NetProbeError {
    /// Invalid configuration detected.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Completion credential env var was not set when the chat route needed it.
    #[error("Missing credential: environment variable {var} is not set")]
    MissingCredential { var: String },

    /// Completion service answered with a non-success status.
    #[error("Upstream completion service returned status {status}: {body}")]
    UpstreamStatus { status: u16, body: String },

    /// Transport-level failure talking to the completion service
    /// (connect, timeout, malformed response body).
    #[error("Upstream transport error: {0}")]
    UpstreamTransport(String),

    /// Chat request carried an empty message.
    #[error("Chat message is empty")]
    EmptyMessage,

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML serialization/deserialization error.
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Generic error with context.
    #[error("{0}")]
    Other(String),
}

/// Convenient Result type alias.
pub type Result<T> = std::result::Result<T, NetProbeError>;

impl NetProbeError {
    /// Errors the client caused; everything else is a server-side failure.
    pub fn is_client_error(&self) -> bool {
        matches!(self, NetProbeError::EmptyMessage)
    }

    /// Errors an operator should read as "fix the deployment", not
    /// "the upstream had a bad moment".
    pub fn is_misconfiguration(&self) -> bool {
        matches!(
            self,
            NetProbeError::MissingCredential { .. } | NetProbeError::InvalidConfig(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = NetProbeError::UpstreamStatus {
            status: 429,
            body: "rate limited".to_string(),
        };
        assert!(err.to_string().contains("429"));
        assert!(err.to_string().contains("rate limited"));
        assert!(!err.is_client_error());
    }

    #[test]
    fn test_missing_credential_is_misconfiguration() {
        let err = NetProbeError::MissingCredential {
            var: "OPENAI_API_KEY".to_string(),
        };
        assert!(err.to_string().contains("OPENAI_API_KEY"));
        assert!(err.is_misconfiguration());
        assert!(!err.is_client_error());
    }

    #[test]
    fn test_empty_message_is_client_error() {
        let err = NetProbeError::EmptyMessage;
        assert!(err.is_client_error());
        assert!(!err.is_misconfiguration());
    }
}
