//! DNS zone reconnaissance for authorized assessments.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use zonex::{ScanConfig, ZoneScanner};
//!
//! #[tokio::main]
//! async fn main() -> zonex::Result<()> {
//!     let config = ScanConfig {
//!         walk: true,
//!         snoop: true,
//!         ..ScanConfig::default()
//!     };
//!
//!     let report = ZoneScanner::new(config)?.scan("example.com").await?;
//!     println!("{} via {:?}", report.outcome, report.source);
//!     for record in &report.records {
//!         println!("{:<40} {:<12} {}", record.name, record.record_type, record.value);
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! # Features
//!
//! - `default` - `rustls` and `intel`
//! - `rustls` - Use rustls for TLS (recommended)
//! - `native-tls` - Use system native TLS
//! - `intel` - Certificate transparency, takeover hunting, analysis, graph
//!   and export collaborators

#![doc(html_root_url = "https://docs.rs/zonex/0.4.0")]

// Re-export core types
pub use zonex_core::*;

// Re-export the engine
pub use zonex_recon::{
    NameserverInfo, NsecWalk, PacingConfig, ProxyConfig, ReconError, ScanConfig, ScanOutcome,
    ScanReport, Technique, WalkEnd, ZoneScanner, ZoneSource,
};
pub use zonex_recon as recon;

// Re-export collaborators if enabled
#[cfg(feature = "intel")]
pub use zonex_intel as intel;

// Re-export runtime for convenience
pub use serde;
pub use serde_json;
pub use tokio;
