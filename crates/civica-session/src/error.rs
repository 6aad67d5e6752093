//! Error types for session and cache operations.

/// Error type for session and cache operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Login rejected because the credentials are wrong.
    #[error("Invalid username or password")]
    Credentials,

    /// Login rejected because the account lacks access.
    #[error("Permission denied: {0}")]
    Permission(String),

    /// The bearer token could not be decoded.
    #[error("Malformed token: {0}")]
    MalformedToken(String),

    /// Durable storage read/write failed.
    #[error("Storage error: {0}")]
    Storage(String),

    /// Password reset request or confirmation failed.
    #[error("Password reset failed: {0}")]
    Reset(String),

    /// Error from the underlying HTTP client, propagated unchanged.
    #[error(transparent)]
    Client(#[from] civica_client::Error),
}

/// Result type for session and cache operations.
pub type Result<T> = std::result::Result<T, Error>;
