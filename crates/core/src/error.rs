//! Error types for bunny-core

use thiserror::Error;

/// Result type alias using the crate's Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Configuration problems detected before any request is sent
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("storage zone required")]
    StorageZoneRequired,

    #[error("storage zone key required")]
    KeyRequired,

    #[error("endpoint required")]
    EndpointRequired,

    #[error("invalid endpoint: {0}")]
    InvalidEndpoint(u8),

    #[error("application name required")]
    ApplicationNameRequired,

    #[error("application version required")]
    ApplicationVersionRequired,

    #[error("application contact required")]
    ApplicationContactRequired,
}

/// Errors surfaced by storage operations
#[derive(Error, Debug)]
pub enum Error {
    #[error("invalid config: {0}")]
    Config(#[from] ConfigError),

    /// Connection-level failure worth another attempt (reset, timeout, refused)
    #[error("network error: {0}")]
    Network(String),

    /// Failure that another attempt would not fix
    #[error("request failed: {0}")]
    Request(String),

    /// The server answered with a transient status code
    #[error("server busy: HTTP {0}")]
    ServerBusy(u16),

    #[error("operation cancelled")]
    Cancelled,

    #[error("failed to decode response: {0}")]
    Decode(String),

    #[error("failed to drain response body: {0}")]
    Drain(String),

    #[error("invalid path: {0}")]
    InvalidPath(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Decode(err.to_string())
    }
}
