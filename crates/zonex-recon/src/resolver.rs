//! Recursive lookups through upstream resolvers.

use hickory_proto::op::ResponseCode;
use hickory_proto::rr::{Name, RData, Record, RecordType};
use std::net::{Ipv4Addr, SocketAddr};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::debug;

use crate::config::{ScanConfig, DNS_PORT, RESOLVER_LIFETIME, RESOLVER_TIMEOUT};
use crate::error::{ReconError, ReconResult};
use crate::query::{build_query, display_name};
use crate::transport::Transport;

/// Public resolvers used when the system configuration is unreadable.
const FALLBACK_RESOLVERS: [Ipv4Addr; 2] = [Ipv4Addr::new(1, 1, 1, 1), Ipv4Addr::new(8, 8, 8, 8)];

/// Stub resolver that sends RD=1 queries to upstreams through the scan
/// transport.
///
/// This is not hickory's `TokioResolver`: that resolver opens its own sockets,
/// and lookups here must go through the [`Transport`] so a configured SOCKS5
/// proxy carries them like every other query of the scan.
///
/// Each query waits at most 5 seconds and a whole lookup, across all
/// upstreams, is bounded by a 5 second lifetime.
#[derive(Clone)]
pub struct DnsResolver {
    transport: Arc<dyn Transport>,
    upstreams: Vec<SocketAddr>,
    timeout: Duration,
    lifetime: Duration,
}

impl std::fmt::Debug for DnsResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DnsResolver")
            .field("upstreams", &self.upstreams)
            .field("timeout", &self.timeout)
            .field("lifetime", &self.lifetime)
            .finish_non_exhaustive()
    }
}

impl DnsResolver {
    /// Create a resolver over explicit upstreams.
    pub fn new(transport: Arc<dyn Transport>, upstreams: Vec<SocketAddr>) -> Self {
        Self {
            transport,
            upstreams,
            timeout: RESOLVER_TIMEOUT,
            lifetime: RESOLVER_LIFETIME,
        }
    }

    /// Create a resolver from the scan configuration, reading the system's
    /// resolvers when none are configured.
    pub fn from_config(transport: Arc<dyn Transport>, config: &ScanConfig) -> Self {
        let upstreams = if config.resolvers.is_empty() {
            system_resolvers()
        } else {
            config.resolvers.clone()
        };
        Self::new(transport, upstreams)
    }

    /// Upstream resolvers in the order they are tried.
    pub fn upstreams(&self) -> &[SocketAddr] {
        &self.upstreams
    }

    /// Resolve `name` and return the answer records of the requested type.
    ///
    /// Upstreams are tried in order until one answers authoritatively for the
    /// question (NOERROR or NXDOMAIN) or the lifetime runs out.
    pub async fn lookup(&self, name: &Name, record_type: RecordType) -> ReconResult<Vec<Record>> {
        let deadline = Instant::now() + self.lifetime;
        let mut last_error = None;

        for &upstream in &self.upstreams {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                break;
            }

            let request = build_query(name, record_type, true);
            match self
                .transport
                .query(upstream, &request, self.timeout.min(remaining))
                .await
            {
                Ok(response) => match response.response_code() {
                    ResponseCode::NoError => {
                        return Ok(response
                            .answers()
                            .iter()
                            .filter(|record| record.record_type() == record_type)
                            .cloned()
                            .collect());
                    }
                    ResponseCode::NXDomain => {
                        return Err(ReconError::Dns(format!(
                            "{} does not exist",
                            display_name(name)
                        )));
                    }
                    code => {
                        debug!(upstream = %upstream, rcode = %code, "upstream failed lookup");
                        last_error = Some(ReconError::Dns(format!("{code} from {upstream}")));
                    }
                },
                Err(e) => {
                    debug!(upstream = %upstream, error = %e, "upstream unreachable");
                    last_error = Some(e);
                }
            }
        }

        Err(last_error.unwrap_or(ReconError::Timeout(self.lifetime)))
    }

    /// NS targets of a domain.
    pub async fn lookup_ns(&self, domain: &Name) -> ReconResult<Vec<Name>> {
        let records = self.lookup(domain, RecordType::NS).await?;
        Ok(records
            .iter()
            .filter_map(|record| match record.data() {
                RData::NS(ns) => Some(ns.0.clone()),
                _ => None,
            })
            .collect())
    }

    /// IPv4 addresses of a host.
    pub async fn lookup_ipv4(&self, host: &Name) -> ReconResult<Vec<Ipv4Addr>> {
        let records = self.lookup(host, RecordType::A).await?;
        Ok(records
            .iter()
            .filter_map(|record| match record.data() {
                RData::A(a) => Some(a.0),
                _ => None,
            })
            .collect())
    }
}

/// Resolvers from the system configuration, or public fallbacks.
pub fn system_resolvers() -> Vec<SocketAddr> {
    match hickory_resolver::system_conf::read_system_conf() {
        Ok((config, _)) => {
            let mut upstreams: Vec<SocketAddr> = Vec::new();
            for server in config.name_servers() {
                if !upstreams.contains(&server.socket_addr) {
                    upstreams.push(server.socket_addr);
                }
            }
            if !upstreams.is_empty() {
                return upstreams;
            }
        }
        Err(e) => debug!(error = %e, "could not read system resolver configuration"),
    }
    FALLBACK_RESOLVERS
        .iter()
        .map(|ip| SocketAddr::from((*ip, DNS_PORT)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::mock::{
        a_record, cname_record, name, ns_record, question, reply, server, MockTransport,
    };

    fn resolver(
        mock: MockTransport,
        upstreams: Vec<SocketAddr>,
    ) -> (DnsResolver, Arc<MockTransport>) {
        let mock = Arc::new(mock);
        (DnsResolver::new(mock.clone(), upstreams), mock)
    }

    #[tokio::test]
    async fn lookup_sets_recursion_desired() {
        let (resolver, mock) = resolver(
            MockTransport::new().on_query(|_, request| {
                Ok(reply(
                    request,
                    vec![a_record("www.example.com.", [192, 0, 2, 1], 60)],
                    Vec::new(),
                ))
            }),
            vec![server([9, 9, 9, 9])],
        );

        let ips = resolver.lookup_ipv4(&name("www.example.com.")).await.unwrap();
        assert_eq!(ips, vec![Ipv4Addr::new(192, 0, 2, 1)]);

        let requests = mock.requests();
        assert_eq!(requests.len(), 1);
        assert!(requests[0].recursion_desired);
        assert_eq!(requests[0].record_type, RecordType::A);
    }

    #[tokio::test]
    async fn answers_are_filtered_by_type() {
        let (resolver, _) = resolver(
            MockTransport::new().on_query(|_, request| {
                Ok(reply(
                    request,
                    vec![
                        cname_record("www.example.com.", "edge.example.net."),
                        a_record("edge.example.net.", [203, 0, 113, 5], 60),
                    ],
                    Vec::new(),
                ))
            }),
            vec![server([9, 9, 9, 9])],
        );

        let ips = resolver.lookup_ipv4(&name("www.example.com.")).await.unwrap();
        assert_eq!(ips, vec![Ipv4Addr::new(203, 0, 113, 5)]);
    }

    #[tokio::test]
    async fn falls_through_to_next_upstream() {
        let first = server([10, 0, 0, 1]);
        let (resolver, mock) = resolver(
            MockTransport::new().on_query(move |upstream, request| {
                if upstream == first {
                    return Err(ReconError::Timeout(Duration::from_secs(1)));
                }
                let (zone, _) = question(request);
                assert_eq!(zone, name("example.com."));
                Ok(reply(
                    request,
                    vec![
                        ns_record("example.com.", "ns1.example.com."),
                        ns_record("example.com.", "ns2.example.com."),
                    ],
                    Vec::new(),
                ))
            }),
            vec![first, server([10, 0, 0, 2])],
        );

        let targets = resolver.lookup_ns(&name("example.com.")).await.unwrap();
        assert_eq!(targets, vec![name("ns1.example.com."), name("ns2.example.com.")]);
        assert_eq!(mock.requests().len(), 2);
    }

    #[tokio::test]
    async fn nxdomain_stops_the_lookup() {
        let (resolver, mock) = resolver(
            MockTransport::new().on_query(|_, request| {
                let mut response = reply(request, Vec::new(), Vec::new());
                response.set_response_code(ResponseCode::NXDomain);
                Ok(response)
            }),
            vec![server([10, 0, 0, 1]), server([10, 0, 0, 2])],
        );

        let err = resolver.lookup_ns(&name("nope.example.")).await.unwrap_err();
        assert!(matches!(err, ReconError::Dns(_)));
        assert_eq!(mock.requests().len(), 1);
    }

    #[tokio::test]
    async fn all_upstreams_failing_reports_last_error() {
        let (resolver, _) = resolver(MockTransport::new(), vec![server([10, 0, 0, 1])]);
        let err = resolver.lookup_ns(&name("example.com.")).await.unwrap_err();
        assert!(err.is_transient());
    }

    #[test]
    fn system_resolvers_never_empty() {
        assert!(!system_resolvers().is_empty());
    }
}
