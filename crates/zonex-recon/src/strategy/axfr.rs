use async_trait::async_trait;
use hickory_proto::rr::Name;
use std::net::IpAddr;
use std::sync::Arc;
use tracing::{debug, info};
use zonex_core::DnsRecord;

use super::{run_transfer, Technique, ZoneStrategy};
use crate::pacing::Pacer;
use crate::query::build_axfr_query;
use crate::transport::Transport;

/// Full zone transfer.
pub struct AxfrStrategy {
    transport: Arc<dyn Transport>,
    pacer: Pacer,
}

impl AxfrStrategy {
    pub fn new(transport: Arc<dyn Transport>, pacer: Pacer) -> Self {
        Self { transport, pacer }
    }
}

#[async_trait]
impl ZoneStrategy for AxfrStrategy {
    fn technique(&self) -> Technique {
        Technique::Axfr
    }

    async fn execute(&self, domain: &Name, nameserver: IpAddr) -> Vec<DnsRecord> {
        self.pacer.wait().await;
        info!(nameserver = %nameserver, "attempting AXFR");

        let request = build_axfr_query(domain);
        match run_transfer(self.transport.as_ref(), &request, domain, nameserver).await {
            Ok(records) => {
                info!(nameserver = %nameserver, records = records.len(), "AXFR successful");
                records
            }
            Err(e) => {
                debug!(nameserver = %nameserver, error = %e, "AXFR failed");
                Vec::new()
            }
        }
    }
}
