//! Scan configuration and protocol constants.

use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::time::Duration;

use crate::error::{ReconError, ReconResult};
use crate::pacing::PacingConfig;

/// DNS port used for every nameserver probe.
pub const DNS_PORT: u16 = 53;

/// Per-query timeout of the recursive resolver.
pub const RESOLVER_TIMEOUT: Duration = Duration::from_secs(5);

/// Overall lifetime of one resolver lookup across all upstreams.
pub const RESOLVER_LIFETIME: Duration = Duration::from_secs(5);

/// Timeout of the SOA serial query sent directly to a nameserver.
pub const SOA_TIMEOUT: Duration = Duration::from_secs(5);

/// Lifetime bound of a whole AXFR/IXFR exchange.
pub const TRANSFER_LIFETIME: Duration = Duration::from_secs(10);

/// Timeout of a single NSEC walk hop.
pub const NSEC_TIMEOUT: Duration = Duration::from_secs(4);

/// Timeout of a single cache snooping probe.
pub const SNOOP_TIMEOUT: Duration = Duration::from_secs(3);

/// EDNS0 UDP payload size advertised on DNSSEC queries.
pub const EDNS_PAYLOAD: u16 = 4096;

/// Upper bound on NSEC walk hops.
pub const DEFAULT_MAX_HOPS: usize = 100;

/// Domains probed during cache snooping: general traffic, OS updates,
/// developer activity, policy violations and anonymity tooling.
pub const DEFAULT_SNOOP_TARGETS: [&str; 6] = [
    "google.com",
    "facebook.com",
    "update.microsoft.com",
    "github.com",
    "pornhub.com",
    "torproject.org",
];

/// Configuration for one reconnaissance scan.
///
/// Built once before the scan starts and shared read-only by every component.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanConfig {
    /// SOCKS5 proxy as `host:port`; all DNS traffic is tunnelled when set.
    #[serde(default)]
    pub proxy: Option<String>,

    /// Randomised delay inserted before each active probe.
    #[serde(default)]
    pub pacing: PacingConfig,

    /// Fall back to NSEC zone walking when transfers fail.
    #[serde(default)]
    pub walk: bool,

    /// Probe each nameserver's cache before attacking it.
    #[serde(default)]
    pub snoop: bool,

    /// Maximum NSEC walk hops per nameserver.
    #[serde(default = "default_max_hops")]
    pub max_hops: usize,

    /// Domains probed during cache snooping.
    #[serde(default = "default_snoop_targets")]
    pub snoop_targets: Vec<String>,

    /// Upstream recursive resolvers (empty: read from the system).
    #[serde(default)]
    pub resolvers: Vec<SocketAddr>,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            proxy: None,
            pacing: PacingConfig::default(),
            walk: false,
            snoop: false,
            max_hops: default_max_hops(),
            snoop_targets: default_snoop_targets(),
            resolvers: Vec::new(),
        }
    }
}

impl ScanConfig {
    /// Check values that would make a scan meaningless.
    pub fn validate(&self) -> ReconResult<()> {
        if self.max_hops == 0 {
            return Err(ReconError::Config("max_hops must be at least 1".into()));
        }
        self.pacing.validate()
    }
}

// Default value functions for serde.
const fn default_max_hops() -> usize {
    DEFAULT_MAX_HOPS
}

fn default_snoop_targets() -> Vec<String> {
    DEFAULT_SNOOP_TARGETS.iter().map(ToString::to_string).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ScanConfig::default();
        assert_eq!(config.max_hops, 100);
        assert_eq!(config.snoop_targets.len(), 6);
        assert!(config.proxy.is_none());
        assert!(!config.walk);
        assert!(!config.pacing.enabled);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: ScanConfig = serde_json::from_str(r#"{"walk": true}"#).unwrap();
        assert!(config.walk);
        assert_eq!(config.max_hops, DEFAULT_MAX_HOPS);
        assert_eq!(config.snoop_targets[3], "github.com");
    }

    #[test]
    fn test_zero_hops_rejected() {
        let config = ScanConfig {
            max_hops: 0,
            ..ScanConfig::default()
        };
        assert!(matches!(config.validate(), Err(ReconError::Config(_))));
    }
}
