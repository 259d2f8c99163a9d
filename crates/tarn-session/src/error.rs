//! Error types for session store operations.

/// Error type for session store operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Key absent from a cache on an operation that requires presence.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Session or state is absent at the store level. Never created,
    /// explicitly deleted and silently evicted are indistinguishable.
    #[error("Session expired: {0}")]
    Expired(String),

    /// Invalid configuration, rejected at startup.
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Result type for session store operations.
pub type Result<T> = std::result::Result<T, Error>;
