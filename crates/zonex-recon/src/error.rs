use std::time::Duration;
use thiserror::Error;

/// Result type alias for reconnaissance operations
pub type ReconResult<T> = std::result::Result<T, ReconError>;

/// Errors from the reconnaissance engine
///
/// Everything except [`ReconError::Config`] and [`ReconError::InvalidDomain`]
/// is a transient network condition that probes absorb locally.
#[derive(Error, Debug)]
pub enum ReconError {
    /// Malformed operator configuration
    #[error("configuration error: {0}")]
    Config(String),

    /// Domain name could not be parsed
    #[error("invalid domain name '{0}'")]
    InvalidDomain(String),

    /// DNS protocol error (malformed message, error response code)
    #[error("DNS error: {0}")]
    Dns(String),

    /// Zone transfer refused, truncated or malformed
    #[error("zone transfer failed: {0}")]
    Transfer(String),

    /// SOCKS5 negotiation failed
    #[error("proxy error: {0}")]
    Proxy(String),

    /// Network I/O error
    #[error("network error: {0}")]
    Network(#[from] std::io::Error),

    /// Timeout
    #[error("operation timed out after {0:?}")]
    Timeout(Duration),
}

impl ReconError {
    /// Returns true for expected negative signals that never abort a scan
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        !matches!(self, Self::Config(_) | Self::InvalidDomain(_))
    }
}

impl From<hickory_proto::ProtoError> for ReconError {
    fn from(err: hickory_proto::ProtoError) -> Self {
        Self::Dns(err.to_string())
    }
}

impl From<tokio_socks::Error> for ReconError {
    fn from(err: tokio_socks::Error) -> Self {
        Self::Proxy(err.to_string())
    }
}

impl From<ReconError> for zonex_core::ZonexError {
    fn from(err: ReconError) -> Self {
        match err {
            ReconError::Config(msg) => Self::Config(msg),
            ReconError::InvalidDomain(domain) => Self::InvalidDomain(domain),
            ReconError::Dns(msg) | ReconError::Transfer(msg) => Self::Dns(msg),
            ReconError::Proxy(msg) => Self::Connection(msg),
            ReconError::Network(e) => Self::Connection(e.to_string()),
            ReconError::Timeout(after) => Self::Timeout(after.as_secs()),
        }
    }
}
