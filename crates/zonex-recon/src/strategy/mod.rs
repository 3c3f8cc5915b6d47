//! Zone acquisition strategies.
//!
//! Each strategy is one self-contained technique for obtaining a zone's
//! contents from a single nameserver. The scanner applies them in a fixed
//! order (AXFR, IXFR, NSEC walk) and stops at the first one that returns
//! records. Failures are expected and never surface: a strategy that cannot
//! get anything returns an empty list.

mod axfr;
mod ixfr;
mod nsec;

use async_trait::async_trait;
use hickory_proto::op::Message;
use hickory_proto::rr::Name;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use zonex_core::DnsRecord;

use crate::config::{DNS_PORT, TRANSFER_LIFETIME};
use crate::error::ReconResult;
use crate::transport::Transport;
use crate::xfr::{transfer_records, TransferKind};

pub use axfr::AxfrStrategy;
pub use ixfr::IxfrStrategy;
pub use nsec::{NsecWalk, NsecWalkStrategy, WalkEnd, WalkPhase, NONEXISTENT_LABEL};

/// The technique that produced a zone's records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Technique {
    Axfr,
    Ixfr,
    NsecWalk,
}

impl Technique {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Axfr => "AXFR",
            Self::Ixfr => "IXFR",
            Self::NsecWalk => "NSEC walk",
        }
    }
}

impl fmt::Display for Technique {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One zone acquisition technique against one nameserver.
#[async_trait]
pub trait ZoneStrategy: Send + Sync {
    /// Which technique this is.
    fn technique(&self) -> Technique;

    /// Try to obtain the zone; empty when the technique does not work here.
    async fn execute(&self, domain: &Name, nameserver: IpAddr) -> Vec<DnsRecord>;
}

/// Run one zone transfer against `nameserver` and normalize the result.
async fn run_transfer(
    transport: &dyn Transport,
    request: &Message,
    zone: &Name,
    nameserver: IpAddr,
) -> ReconResult<Vec<DnsRecord>> {
    let kind = TransferKind::for_request(request)?;
    let server = SocketAddr::new(nameserver, DNS_PORT);
    let messages = transport.transfer(server, request, TRANSFER_LIFETIME).await?;
    transfer_records(zone, kind, &messages)
}
