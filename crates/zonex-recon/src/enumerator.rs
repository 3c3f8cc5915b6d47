//! Authoritative nameserver discovery and SOA serial lookups.

use hickory_proto::rr::{Name, RData, RecordType};
use std::collections::BTreeSet;
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use tracing::{debug, info, warn};
use zonex_core::{DnsRecord, RecordKind};

use crate::config::{DNS_PORT, SOA_TIMEOUT};
use crate::query::{build_query, display_name};
use crate::resolver::DnsResolver;
use crate::transport::Transport;

/// Result of nameserver discovery.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Discovery {
    /// The domain's NS records, one per nameserver host.
    pub hosts: Vec<DnsRecord>,
    /// IPv4 addresses of those hosts.
    pub addresses: BTreeSet<IpAddr>,
}

/// Finds the nameservers to attack and their zone serials.
pub struct NameserverEnumerator {
    resolver: DnsResolver,
    transport: Arc<dyn Transport>,
}

impl NameserverEnumerator {
    pub fn new(resolver: DnsResolver, transport: Arc<dyn Transport>) -> Self {
        Self {
            resolver,
            transport,
        }
    }

    /// Resolve the domain's NS set and every NS host's A records.
    ///
    /// A host that fails to resolve is skipped. If the NS lookup itself
    /// fails the result is empty and a warning is logged.
    pub async fn discover(&self, domain: &Name) -> Discovery {
        let mut discovery = Discovery::default();
        let zone = display_name(domain);

        let targets = match self.resolver.lookup_ns(domain).await {
            Ok(targets) => targets,
            Err(e) => {
                warn!(domain = %zone, error = %e, "could not enumerate nameservers");
                return discovery;
            }
        };

        for target in targets {
            discovery
                .hosts
                .push(DnsRecord::new(zone.clone(), RecordKind::Ns, display_name(&target)));
            match self.resolver.lookup_ipv4(&target).await {
                Ok(ips) => discovery.addresses.extend(ips.into_iter().map(IpAddr::V4)),
                Err(e) => debug!(host = %target, error = %e, "skipping unresolvable nameserver"),
            }
        }

        info!(domain = %zone, nameservers = discovery.addresses.len(), "found nameservers");
        discovery
    }

    /// IP addresses of the domain's nameservers, deduplicated.
    pub async fn discover_nameservers(&self, domain: &Name) -> BTreeSet<IpAddr> {
        self.discover(domain).await.addresses
    }

    /// Ask `nameserver` directly for the zone's SOA and return its serial.
    ///
    /// `None` when the server does not answer, refuses, or the first answer
    /// record is not a SOA.
    pub async fn fetch_soa_serial(&self, domain: &Name, nameserver: IpAddr) -> Option<u32> {
        let request = build_query(domain, RecordType::SOA, true);
        let server = SocketAddr::new(nameserver, DNS_PORT);

        let response = match self.transport.query(server, &request, SOA_TIMEOUT).await {
            Ok(response) => response,
            Err(e) => {
                debug!(nameserver = %nameserver, error = %e, "SOA query failed");
                return None;
            }
        };

        let serial = response.answers().first().and_then(|record| match record.data() {
            RData::SOA(soa) => Some(soa.serial()),
            _ => None,
        });
        debug!(nameserver = %nameserver, serial = ?serial, "SOA serial");
        serial
    }
}
