//! DNS cache snooping.
//!
//! A server asked without recursion can only answer from its cache, so an
//! answer to an RD=0 query for a popular domain means some client resolved
//! that domain recently through this server.

use hickory_proto::rr::{Name, RecordType};
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use tracing::{debug, info, warn};
use zonex_core::Finding;

use crate::config::{DEFAULT_SNOOP_TARGETS, DNS_PORT, SNOOP_TIMEOUT};
use crate::pacing::Pacer;
use crate::query::{build_query, parse_domain};
use crate::transport::Transport;

/// Probes a nameserver's cache for a list of well-known domains.
pub struct CacheSnooper {
    transport: Arc<dyn Transport>,
    pacer: Pacer,
    targets: Vec<String>,
}

impl CacheSnooper {
    /// Snooper over the default target list.
    pub fn new(transport: Arc<dyn Transport>, pacer: Pacer) -> Self {
        Self {
            transport,
            pacer,
            targets: DEFAULT_SNOOP_TARGETS.iter().map(ToString::to_string).collect(),
        }
    }

    #[must_use]
    pub fn with_targets(mut self, targets: Vec<String>) -> Self {
        self.targets = targets;
        self
    }

    pub fn targets(&self) -> &[String] {
        &self.targets
    }

    /// Query every target with recursion disabled and report cache hits.
    ///
    /// Failed, empty or unparsable probes produce nothing and do not stop
    /// the remaining ones.
    pub async fn probe(&self, nameserver: IpAddr) -> Vec<Finding> {
        info!(nameserver = %nameserver, targets = self.targets.len(), "cache snooping");
        let server = SocketAddr::new(nameserver, DNS_PORT);
        let mut findings = Vec::new();

        for target in &self.targets {
            let name: Name = match parse_domain(target) {
                Ok(name) => name,
                Err(e) => {
                    debug!(target = %target, error = %e, "skipping snoop target");
                    continue;
                }
            };

            self.pacer.wait().await;
            let request = build_query(&name, RecordType::A, false);
            let response = match self.transport.query(server, &request, SNOOP_TIMEOUT).await {
                Ok(response) => response,
                Err(e) => {
                    debug!(target = %target, error = %e, "snoop probe failed");
                    continue;
                }
            };

            if let Some(record) = response.answers().first() {
                let message = format!(
                    "Cache HIT: {target} is in memory (TTL: {}s)",
                    record.ttl()
                );
                warn!(nameserver = %nameserver, "{message}");
                findings.push(Finding::medium(message));
            }
        }

        findings
    }
}
