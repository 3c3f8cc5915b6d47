//! Zone reconnaissance engine for zonex.
//!
//! Given a domain, the engine finds its authoritative nameservers and tries to
//! obtain the zone from each in turn:
//!
//! 1. full zone transfer (AXFR)
//! 2. incremental transfer (IXFR), when the nameserver reports a serial
//! 3. NSEC zone walking, when enabled
//!
//! The first nameserver that yields records ends the scan. Nameservers can
//! optionally be cache-snooped before they are attacked, and every probe can
//! be paced with a random delay and tunnelled through a SOCKS5 proxy.
//!
//! # Example
//!
//! ```rust,no_run
//! use zonex_recon::{PacingConfig, ScanConfig, ZoneScanner};
//! use std::time::Duration;
//!
//! # async fn run() -> zonex_recon::ReconResult<()> {
//! let config = ScanConfig {
//!     snoop: true,
//!     pacing: PacingConfig::between(Duration::from_millis(500), Duration::from_secs(2)),
//!     ..ScanConfig::default()
//! };
//!
//! let report = ZoneScanner::new(config)?.scan("example.com").await?;
//! for record in &report.records {
//!     println!("{} {} {}", record.name, record.record_type, record.value);
//! }
//! # Ok(())
//! # }
//! ```

#![doc(html_root_url = "https://docs.rs/zonex-recon/0.4.0")]

mod config;
mod enumerator;
mod error;
mod pacing;
mod query;
mod resolver;
mod scanner;
mod snooper;
pub mod strategy;
pub mod transport;
pub mod xfr;

pub use config::{
    ScanConfig, DEFAULT_MAX_HOPS, DEFAULT_SNOOP_TARGETS, DNS_PORT, NSEC_TIMEOUT,
    RESOLVER_LIFETIME, RESOLVER_TIMEOUT, SNOOP_TIMEOUT, SOA_TIMEOUT, TRANSFER_LIFETIME,
};
pub use enumerator::{Discovery, NameserverEnumerator};
pub use error::{ReconError, ReconResult};
pub use pacing::{Pacer, PacingConfig};
pub use query::{display_name, parse_domain};
pub use resolver::{system_resolvers, DnsResolver};
pub use scanner::{NameserverInfo, ScanOutcome, ScanReport, ZoneScanner, ZoneSource};
pub use snooper::CacheSnooper;
pub use strategy::{NsecWalk, Technique, WalkEnd, WalkPhase, ZoneStrategy};
pub use transport::{NetworkTransport, ProxyConfig, Transport};
