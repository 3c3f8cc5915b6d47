use async_trait::async_trait;
use hickory_proto::rr::Name;
use std::net::IpAddr;
use std::sync::Arc;
use tracing::{debug, info};
use zonex_core::DnsRecord;

use super::{run_transfer, Technique, ZoneStrategy};
use crate::pacing::Pacer;
use crate::query::build_ixfr_query;
use crate::transport::Transport;

/// Incremental zone transfer, seeded with the nameserver's current serial.
///
/// Without a serial there is nothing to send and the strategy returns
/// immediately.
pub struct IxfrStrategy {
    transport: Arc<dyn Transport>,
    pacer: Pacer,
    serial: Option<u32>,
}

impl IxfrStrategy {
    pub fn new(transport: Arc<dyn Transport>, pacer: Pacer, serial: Option<u32>) -> Self {
        Self {
            transport,
            pacer,
            serial,
        }
    }

    pub const fn serial(&self) -> Option<u32> {
        self.serial
    }
}

#[async_trait]
impl ZoneStrategy for IxfrStrategy {
    fn technique(&self) -> Technique {
        Technique::Ixfr
    }

    async fn execute(&self, domain: &Name, nameserver: IpAddr) -> Vec<DnsRecord> {
        let Some(serial) = self.serial else {
            return Vec::new();
        };

        self.pacer.wait().await;
        info!(nameserver = %nameserver, serial, "attempting IXFR");

        let request = build_ixfr_query(domain, serial);
        match run_transfer(self.transport.as_ref(), &request, domain, nameserver).await {
            Ok(records) => {
                info!(nameserver = %nameserver, records = records.len(), "IXFR successful");
                records
            }
            Err(e) => {
                debug!(nameserver = %nameserver, error = %e, "IXFR failed");
                Vec::new()
            }
        }
    }
}
