use thiserror::Error;

/// Unified error type for release-notes operations
#[derive(Error, Debug)]
pub enum ReleaseError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Upstream error {status}: {body}")]
    Upstream { status: u16, body: String },

    #[error("Decode error: {0}")]
    Decode(String),

    #[error("Unknown bump type: {0}")]
    InvalidBumpKind(String),

    #[error("Git operation failed: {0}")]
    VersionControl(#[from] git2::Error),

    #[error("Manifest error: {0}")]
    Manifest(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience type alias for Results in git-release-notes
pub type Result<T> = std::result::Result<T, ReleaseError>;

impl ReleaseError {
    /// Create a configuration error with context
    pub fn config(msg: impl Into<String>) -> Self {
        ReleaseError::Config(msg.into())
    }

    /// Create a transport error with context
    pub fn transport(msg: impl Into<String>) -> Self {
        ReleaseError::Transport(msg.into())
    }

    /// Create an upstream error from a status code and response body
    pub fn upstream(status: u16, body: impl Into<String>) -> Self {
        ReleaseError::Upstream {
            status,
            body: body.into(),
        }
    }

    /// Create a decode error with context
    pub fn decode(msg: impl Into<String>) -> Self {
        ReleaseError::Decode(msg.into())
    }

    /// Create a manifest error with context
    pub fn manifest(msg: impl Into<String>) -> Self {
        ReleaseError::Manifest(msg.into())
    }
}
