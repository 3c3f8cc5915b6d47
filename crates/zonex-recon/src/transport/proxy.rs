//! SOCKS5 proxy configuration.

use std::fmt;
use std::str::FromStr;

use crate::error::ReconError;

/// A SOCKS5 proxy endpoint given as `host:port`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxyConfig {
    host: String,
    port: u16,
}

impl ProxyConfig {
    /// Proxy host (name or address).
    #[must_use]
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Proxy port.
    #[must_use]
    pub const fn port(&self) -> u16 {
        self.port
    }
}

impl FromStr for ProxyConfig {
    type Err = ReconError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ReconError::Config(format!("invalid proxy '{s}': expected HOST:PORT"));

        let mut parts = s.trim().split(':');
        let (Some(host), Some(port), None) = (parts.next(), parts.next(), parts.next()) else {
            return Err(invalid());
        };
        if host.is_empty() {
            return Err(invalid());
        }
        let port: u16 = port.parse().map_err(|_| invalid())?;
        if port == 0 {
            return Err(invalid());
        }

        Ok(Self {
            host: host.to_string(),
            port,
        })
    }
}

impl fmt::Display for ProxyConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_host_and_port() {
        let proxy: ProxyConfig = "127.0.0.1:9050".parse().unwrap();
        assert_eq!(proxy.host(), "127.0.0.1");
        assert_eq!(proxy.port(), 9050);
        assert_eq!(proxy.to_string(), "127.0.0.1:9050");
    }

    #[test]
    fn accepts_hostnames() {
        let proxy: ProxyConfig = "tor.local:1080".parse().unwrap();
        assert_eq!(proxy.host(), "tor.local");
    }

    #[test]
    fn rejects_malformed_specs() {
        for bad in [
            "127.0.0.1",
            "127.0.0.1:",
            ":9050",
            "host:port",
            "a:1:2",
            "host:70000",
            "host:0",
            "",
        ] {
            let err = bad.parse::<ProxyConfig>().unwrap_err();
            assert!(matches!(err, ReconError::Config(_)), "{bad} should be rejected");
        }
    }
}
