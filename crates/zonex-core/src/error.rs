use thiserror::Error;

/// Result type alias for zonex operations
pub type Result<T> = std::result::Result<T, ZonexError>;

/// Errors that can surface to the caller of a scan
///
/// Per-probe network failures never reach this type: they are absorbed by the
/// probe that hit them. Only configuration problems, local I/O and collaborator
/// failures propagate this far.
#[derive(Error, Debug)]
pub enum ZonexError {
    /// Configuration error (malformed proxy, bad delay bounds, ...)
    #[error("configuration error: {0}")]
    Config(String),

    /// Invalid domain name
    #[error("invalid domain name: {0}")]
    InvalidDomain(String),

    /// Invalid IP address format
    #[error("invalid IP address: {0}")]
    InvalidIp(String),

    /// Invalid record type label
    #[error("invalid record type: {0:?}")]
    InvalidRecordType(String),

    /// DNS resolution failed
    #[error("DNS resolution failed: {0}")]
    Dns(String),

    /// Request timed out
    #[error("request timed out after {0} seconds")]
    Timeout(u64),

    /// Connection failed
    #[error("connection failed: {0}")]
    Connection(String),

    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Http(String),

    /// JSON parsing/serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Local I/O error (export files, config files)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic internal error
    #[error("internal error: {0}")]
    Internal(String),
}

impl ZonexError {
    /// Returns true if the error is a transient network condition
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::Timeout(_) | Self::Connection(_) | Self::Dns(_) | Self::Http(_)
        )
    }

    /// Returns true if the error stems from operator-supplied configuration
    #[must_use]
    pub const fn is_config_error(&self) -> bool {
        matches!(
            self,
            Self::Config(_) | Self::InvalidDomain(_) | Self::InvalidIp(_)
        )
    }
}
