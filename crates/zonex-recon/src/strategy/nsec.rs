//! NSEC zone walking.
//!
//! A signed zone proves non-existence with NSEC records naming the next
//! owner in canonical order. Asking for a name that cannot exist right under
//! the apex returns the apex NSEC, whose next name is the first name of the
//! zone; asking each learned name for its NSEC yields the one after it, until
//! the chain points back at the apex.
//!
//! [`NsecWalk`] holds the walk as an explicit state machine and never touches
//! the network: the caller asks it for the next probe, sends it, and feeds the
//! response (or the failure) back. Every path ends in
//! [`WalkPhase::Terminated`], and the hop bound guarantees it does.

use async_trait::async_trait;
use hickory_proto::dnssec::rdata::DNSSECRData;
use hickory_proto::op::Message;
use hickory_proto::rr::{Name, RData, RecordType};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use tracing::{debug, info, warn};
use zonex_core::DnsRecord;

use super::{Technique, ZoneStrategy};
use crate::config::{DEFAULT_MAX_HOPS, DNS_PORT, NSEC_TIMEOUT};
use crate::error::{ReconError, ReconResult};
use crate::pacing::Pacer;
use crate::query::{build_dnssec_query, display_name};
use crate::transport::Transport;

/// Label of the synthetic name used for the first probe.
pub const NONEXISTENT_LABEL: &str = "00-nonexistent";

/// Why a walk stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WalkEnd {
    /// The chain pointed back at the apex: the whole zone was walked.
    Wrapped,
    /// The chain revisited a name other than the apex.
    Cycle,
    /// A response carried no NSEC record.
    NoNsec,
    /// The hop bound was reached.
    HopLimit,
    /// A probe failed at the transport level.
    Transport,
}

impl fmt::Display for WalkEnd {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Wrapped => write!(f, "chain wrapped to the apex"),
            Self::Cycle => write!(f, "cycle detected"),
            Self::NoNsec => write!(f, "no NSEC record in response"),
            Self::HopLimit => write!(f, "hop limit reached"),
            Self::Transport => write!(f, "probe failed"),
        }
    }
}

/// State of a walk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WalkPhase {
    /// Nothing sent yet.
    Start,
    /// A probe is in flight.
    Probing,
    /// A new next name was accepted and becomes the next probe.
    Advanced,
    Terminated(WalkEnd),
}

/// One NSEC walk over one zone.
#[derive(Debug, Clone)]
pub struct NsecWalk {
    domain: Name,
    origin_probe: Name,
    current: Name,
    visited: HashSet<Name>,
    discovered: Vec<Name>,
    hops: usize,
    max_hops: usize,
    phase: WalkPhase,
}

impl NsecWalk {
    /// Start a walk of `domain`, bounded by `max_hops` probes.
    pub fn new(domain: Name, max_hops: usize) -> ReconResult<Self> {
        let origin_probe = domain
            .prepend_label(NONEXISTENT_LABEL)
            .map_err(|e| ReconError::InvalidDomain(format!("{domain}: {e}")))?;
        Ok(Self {
            current: domain.clone(),
            domain,
            origin_probe,
            visited: HashSet::new(),
            discovered: Vec::new(),
            hops: 0,
            max_hops,
            phase: WalkPhase::Start,
        })
    }

    pub const fn phase(&self) -> WalkPhase {
        self.phase
    }

    /// How the walk ended, once it has.
    pub const fn end(&self) -> Option<WalkEnd> {
        match self.phase {
            WalkPhase::Terminated(end) => Some(end),
            _ => None,
        }
    }

    /// Probes sent so far.
    pub const fn hops(&self) -> usize {
        self.hops
    }

    /// Names learned so far, in discovery order.
    pub fn discovered(&self) -> &[Name] {
        &self.discovered
    }

    /// The name the next (or in-flight) probe asks about.
    fn probe_name(&self) -> &Name {
        if self.current == self.domain {
            &self.origin_probe
        } else {
            &self.current
        }
    }

    /// Build the next probe and move to [`WalkPhase::Probing`].
    ///
    /// `None` once the walk has terminated, including when this call is the
    /// one that hits the hop bound.
    pub fn next_probe(&mut self) -> Option<Message> {
        if let WalkPhase::Terminated(_) = self.phase {
            return None;
        }
        if self.hops >= self.max_hops {
            debug!(hops = self.hops, "NSEC walk hop limit reached");
            self.phase = WalkPhase::Terminated(WalkEnd::HopLimit);
            return None;
        }

        let request = if self.current == self.domain {
            build_dnssec_query(&self.origin_probe, RecordType::A)
        } else {
            build_dnssec_query(&self.current, RecordType::NSEC)
        };
        self.hops += 1;
        self.phase = WalkPhase::Probing;
        Some(request)
    }

    /// Feed the response to the probe in flight.
    pub fn observe(&mut self, response: &Message) -> WalkPhase {
        if self.phase != WalkPhase::Probing {
            return self.phase;
        }

        let Some(next) = next_owner(response, self.probe_name()) else {
            debug!(probe = %self.probe_name(), "no NSEC in response");
            self.phase = WalkPhase::Terminated(WalkEnd::NoNsec);
            return self.phase;
        };

        if next == self.domain {
            self.phase = WalkPhase::Terminated(WalkEnd::Wrapped);
        } else if self.visited.contains(&next) {
            warn!(
                name = %display_name(&next),
                "NSEC chain revisited a name before returning to the apex"
            );
            self.phase = WalkPhase::Terminated(WalkEnd::Cycle);
        } else {
            info!(name = %display_name(&next), "NSEC walk found name");
            self.visited.insert(next.clone());
            self.discovered.push(next.clone());
            self.current = next;
            self.phase = WalkPhase::Advanced;
        }
        self.phase
    }

    /// Record that the probe in flight failed.
    pub fn fail(&mut self, error: &ReconError) -> WalkPhase {
        debug!(error = %error, hops = self.hops, "NSEC walk interrupted");
        self.phase = WalkPhase::Terminated(WalkEnd::Transport);
        self.phase
    }

    /// The discovered names as `NSEC_WALKED` records.
    pub fn into_records(self) -> Vec<DnsRecord> {
        self.discovered
            .iter()
            .map(|name| DnsRecord::nsec_walked(display_name(name)))
            .collect()
    }
}

/// Next owner name from the NSEC record covering `probed`.
///
/// The authority section is searched first, then the answer section, and a
/// record owned by the probed name wins over any other.
fn next_owner(response: &Message, probed: &Name) -> Option<Name> {
    let mut first = None;
    for record in response.name_servers().iter().chain(response.answers()) {
        if let RData::DNSSEC(DNSSECRData::NSEC(nsec)) = record.data() {
            if record.name() == probed {
                return Some(nsec.next_domain_name().to_lowercase());
            }
            first.get_or_insert_with(|| nsec.next_domain_name().to_lowercase());
        }
    }
    first
}

/// NSEC walking as a zone strategy.
pub struct NsecWalkStrategy {
    transport: Arc<dyn Transport>,
    pacer: Pacer,
    max_hops: usize,
}

impl NsecWalkStrategy {
    pub fn new(transport: Arc<dyn Transport>, pacer: Pacer) -> Self {
        Self {
            transport,
            pacer,
            max_hops: DEFAULT_MAX_HOPS,
        }
    }

    #[must_use]
    pub const fn with_max_hops(mut self, max_hops: usize) -> Self {
        self.max_hops = max_hops;
        self
    }

    /// Walk `domain` on `nameserver` until the walk terminates.
    pub async fn walk(&self, domain: &Name, nameserver: IpAddr) -> ReconResult<NsecWalk> {
        info!(nameserver = %nameserver, "attempting NSEC zone walk");
        let mut walk = NsecWalk::new(domain.clone(), self.max_hops)?;
        let server = SocketAddr::new(nameserver, DNS_PORT);

        while let Some(request) = walk.next_probe() {
            self.pacer.wait().await;
            match self.transport.query(server, &request, NSEC_TIMEOUT).await {
                Ok(response) => walk.observe(&response),
                Err(e) => walk.fail(&e),
            };
        }

        info!(
            nameserver = %nameserver,
            names = walk.discovered().len(),
            hops = walk.hops(),
            end = ?walk.end(),
            "NSEC walk finished"
        );
        Ok(walk)
    }
}

#[async_trait]
impl ZoneStrategy for NsecWalkStrategy {
    fn technique(&self) -> Technique {
        Technique::NsecWalk
    }

    async fn execute(&self, domain: &Name, nameserver: IpAddr) -> Vec<DnsRecord> {
        match self.walk(domain, nameserver).await {
            Ok(walk) => walk.into_records(),
            Err(e) => {
                debug!(error = %e, "NSEC walk not started");
                Vec::new()
            }
        }
    }
}
