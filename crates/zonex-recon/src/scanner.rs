//! Scan orchestration: enumerate, snoop, run the strategy chain, aggregate.

use chrono::{DateTime, Utc};
use hickory_proto::rr::Name;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::IpAddr;
use std::sync::Arc;
use tracing::{info, warn};
use zonex_core::{dedup_records, DnsRecord, Finding};

use crate::config::ScanConfig;
use crate::enumerator::NameserverEnumerator;
use crate::error::ReconResult;
use crate::pacing::Pacer;
use crate::query::{display_name, parse_domain};
use crate::resolver::DnsResolver;
use crate::snooper::CacheSnooper;
use crate::strategy::{
    AxfrStrategy, IxfrStrategy, NsecWalk, NsecWalkStrategy, Technique, ZoneStrategy,
};
use crate::transport::{NetworkTransport, Transport};

/// How a scan ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScanOutcome {
    /// A nameserver gave up zone data.
    ZoneObtained,
    /// Every nameserver resisted every enabled technique.
    Exhausted,
    /// No nameserver could be found for the domain.
    NoNameservers,
}

impl fmt::Display for ScanOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ZoneObtained => write!(f, "zone data obtained"),
            Self::Exhausted => write!(f, "no zone data obtained"),
            Self::NoNameservers => write!(f, "no nameservers found"),
        }
    }
}

/// Where the zone data came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZoneSource {
    pub nameserver: IpAddr,
    pub technique: Technique,
}

/// A nameserver and the zone serial it reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NameserverInfo {
    pub address: IpAddr,
    pub serial: Option<u32>,
}

/// Everything one scan produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanReport {
    /// Target domain, without the trailing dot
    pub domain: String,
    /// Nameserver addresses, in the order they were attacked
    pub nameservers: Vec<IpAddr>,
    /// The domain's NS records
    pub nameserver_records: Vec<DnsRecord>,
    /// Zone records, deduplicated by (name, type, value)
    pub records: Vec<DnsRecord>,
    /// Findings from cache snooping
    pub findings: Vec<Finding>,
    /// Nameserver and technique that yielded the records
    pub source: Option<ZoneSource>,
    pub outcome: ScanOutcome,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl ScanReport {
    fn new(domain: String) -> Self {
        let now = Utc::now();
        Self {
            domain,
            nameservers: Vec::new(),
            nameserver_records: Vec::new(),
            records: Vec::new(),
            findings: Vec::new(),
            source: None,
            outcome: ScanOutcome::Exhausted,
            started_at: now,
            finished_at: now,
        }
    }

    fn finish(mut self, outcome: ScanOutcome) -> Self {
        self.outcome = outcome;
        self.finished_at = Utc::now();
        self
    }

    /// Whether zone data was obtained.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.outcome == ScanOutcome::ZoneObtained
    }

    /// Wall-clock duration of the scan.
    #[must_use]
    pub fn duration(&self) -> chrono::Duration {
        self.finished_at - self.started_at
    }
}

/// Zone reconnaissance scanner.
///
/// All probes of a scan share one transport (and so one proxy setting) and
/// one pacer, both fixed when the scanner is built.
///
/// # Example
///
/// ```rust,no_run
/// use zonex_recon::{ScanConfig, ZoneScanner};
///
/// # async fn run() -> zonex_recon::ReconResult<()> {
/// let config = ScanConfig {
///     walk: true,
///     ..ScanConfig::default()
/// };
/// let report = ZoneScanner::new(config)?.scan("example.com").await?;
/// println!("{}: {} records", report.outcome, report.records.len());
/// # Ok(())
/// # }
/// ```
pub struct ZoneScanner {
    config: ScanConfig,
    transport: Arc<dyn Transport>,
    resolver: DnsResolver,
    pacer: Pacer,
}

impl ZoneScanner {
    /// Create a scanner that talks to the network, through the configured
    /// proxy if any.
    pub fn new(config: ScanConfig) -> ReconResult<Self> {
        config.validate()?;
        let transport = Arc::new(NetworkTransport::configure(config.proxy.as_deref()));
        Ok(Self::with_transport(config, transport))
    }

    /// Create a scanner over a custom transport.
    pub fn with_transport(config: ScanConfig, transport: Arc<dyn Transport>) -> Self {
        let resolver = DnsResolver::from_config(transport.clone(), &config);
        let pacer = Pacer::new(config.pacing);
        Self {
            config,
            transport,
            resolver,
            pacer,
        }
    }

    /// Replace the upstream resolver.
    #[must_use]
    pub fn resolver(mut self, resolver: DnsResolver) -> Self {
        self.resolver = resolver;
        self
    }

    pub const fn config(&self) -> &ScanConfig {
        &self.config
    }

    fn enumerator(&self) -> NameserverEnumerator {
        NameserverEnumerator::new(self.resolver.clone(), self.transport.clone())
    }

    fn snooper(&self) -> CacheSnooper {
        CacheSnooper::new(self.transport.clone(), self.pacer)
            .with_targets(self.config.snoop_targets.clone())
    }

    fn walker(&self) -> NsecWalkStrategy {
        NsecWalkStrategy::new(self.transport.clone(), self.pacer)
            .with_max_hops(self.config.max_hops)
    }

    /// Run a full scan of `domain`.
    ///
    /// Only an unparsable domain is an error. Failing to find nameservers or
    /// zone data is reported through [`ScanReport::outcome`].
    pub async fn scan(&self, domain: &str) -> ReconResult<ScanReport> {
        let zone = parse_domain(domain)?;
        let mut report = ScanReport::new(display_name(&zone));

        let enumerator = self.enumerator();
        let discovery = enumerator.discover(&zone).await;
        report.nameservers = discovery.addresses.iter().copied().collect();
        report.nameserver_records = discovery.hosts;

        if discovery.addresses.is_empty() {
            warn!(domain = %report.domain, "no nameservers found, cannot proceed");
            return Ok(report.finish(ScanOutcome::NoNameservers));
        }

        let mut records = Vec::new();
        for &nameserver in &discovery.addresses {
            info!(nameserver = %nameserver, "attacking nameserver");

            if self.config.snoop {
                report.findings.extend(self.snooper().probe(nameserver).await);
            }

            if let Some((technique, found)) = self.run_chain(&enumerator, &zone, nameserver).await {
                info!(
                    nameserver = %nameserver,
                    technique = %technique,
                    records = found.len(),
                    "zone dumped"
                );
                records.extend(found);
                report.source = Some(ZoneSource {
                    nameserver,
                    technique,
                });
                break;
            }
        }

        report.records = dedup_records(records);
        let outcome = if report.source.is_some() {
            ScanOutcome::ZoneObtained
        } else {
            warn!(domain = %report.domain, "no zone data obtained");
            ScanOutcome::Exhausted
        };
        Ok(report.finish(outcome))
    }

    /// Apply AXFR, then IXFR (when a serial is known), then the NSEC walk
    /// (when enabled), stopping at the first that yields records.
    async fn run_chain(
        &self,
        enumerator: &NameserverEnumerator,
        zone: &Name,
        nameserver: IpAddr,
    ) -> Option<(Technique, Vec<DnsRecord>)> {
        let axfr = AxfrStrategy::new(self.transport.clone(), self.pacer);
        if let Some(found) = attempt(&axfr, zone, nameserver).await {
            return Some(found);
        }

        let serial = enumerator.fetch_soa_serial(zone, nameserver).await;
        let ixfr = IxfrStrategy::new(self.transport.clone(), self.pacer, serial);
        if let Some(found) = attempt(&ixfr, zone, nameserver).await {
            return Some(found);
        }

        if self.config.walk {
            return attempt(&self.walker(), zone, nameserver).await;
        }
        None
    }

    /// Discover the domain's nameservers and the serial each one reports.
    pub async fn nameservers(&self, domain: &str) -> ReconResult<Vec<NameserverInfo>> {
        let zone = parse_domain(domain)?;
        let enumerator = self.enumerator();

        let mut nameservers = Vec::new();
        for address in enumerator.discover_nameservers(&zone).await {
            let serial = enumerator.fetch_soa_serial(&zone, address).await;
            nameservers.push(NameserverInfo { address, serial });
        }
        Ok(nameservers)
    }

    /// Cache-snoop a single nameserver or resolver.
    pub async fn snoop(&self, nameserver: IpAddr) -> Vec<Finding> {
        self.snooper().probe(nameserver).await
    }

    /// NSEC-walk `domain` on a single nameserver.
    pub async fn walk(&self, domain: &str, nameserver: IpAddr) -> ReconResult<NsecWalk> {
        let zone = parse_domain(domain)?;
        self.walker().walk(&zone, nameserver).await
    }
}

async fn attempt(
    strategy: &dyn ZoneStrategy,
    zone: &Name,
    nameserver: IpAddr,
) -> Option<(Technique, Vec<DnsRecord>)> {
    let records = strategy.execute(zone, nameserver).await;
    (!records.is_empty()).then(|| (strategy.technique(), records))
}
