//! Error types for the Groove extension

use groovesource::ClientError;

/// Result type alias for Groove operations
pub type Result<T> = std::result::Result<T, GrooveError>;

/// Errors that can occur when talking to the worker API or converting its payloads
#[derive(Debug, thiserror::Error)]
pub enum GrooveError {
    /// A required parameter was blank or missing
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// The API answered with a non-2xx status
    #[error("Upstream returned HTTP {status}: {body}")]
    UpstreamHttp { status: u16, body: String },

    /// The request could not be sent or the response could not be read
    #[error("HTTP transport failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The response body is not the expected JSON
    #[error("JSON decoding failed: {0}")]
    Decode(#[from] serde_json::Error),

    /// A required field is absent from an otherwise valid payload
    #[error("Not found: {0}")]
    NotFound(String),

    /// The operation is not supported by this extension
    #[error("Not supported: {0}")]
    Unsupported(String),

    /// The host cancelled the operation
    #[error("Operation cancelled")]
    Cancelled,

    /// Configuration error (from grooveconfig/anyhow)
    #[error("Configuration error: {0}")]
    Config(#[from] anyhow::Error),
}

impl GrooveError {
    /// Create an invalid argument error
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }

    /// Create a not found error
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    /// Whether retrying the same request may succeed
    ///
    /// Only transport failures and HTTP errors qualify: a decoding failure will
    /// not go away on a second attempt.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::UpstreamHttp { .. } | Self::Transport(_))
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

impl From<GrooveError> for ClientError {
    fn from(error: GrooveError) -> Self {
        match error {
            GrooveError::Unsupported(msg) => ClientError::NotSupported(msg),
            other => ClientError::extension(other),
        }
    }
}
