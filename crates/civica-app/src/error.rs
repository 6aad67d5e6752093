//! Flow-level error types.

/// Error type for application flows.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A resource call came back 401 and the session has been cleared.
    ///
    /// The caller navigates back to the login surface; no modal is shown.
    #[error("Session expired")]
    SessionExpired,

    /// Error from the HTTP client, propagated unchanged.
    #[error(transparent)]
    Client(#[from] civica_client::Error),

    /// Error from the session or cache layer.
    #[error(transparent)]
    Session(#[from] civica_session::Error),

    /// Invalid configuration.
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Result type for application flows.
pub type Result<T> = std::result::Result<T, Error>;
