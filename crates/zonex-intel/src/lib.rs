//! Collaborators that work on zonex scan results.
//!
//! Everything here consumes or produces the normalized [`DnsRecord`] list and
//! [`Finding`]s of a scan:
//!
//! - [`passive`]: subdomains from certificate transparency logs (crt.sh)
//! - [`cloud`]: dangling CNAMEs to unclaimed cloud resources
//! - [`analysis`]: heuristic findings over the record set
//! - [`graph`]: Graphviz topology of the zone
//! - [`export`]: JSON and CSV files
//!
//! [`DnsRecord`]: zonex_core::DnsRecord
//! [`Finding`]: zonex_core::Finding

#![doc(html_root_url = "https://docs.rs/zonex-intel/0.4.0")]

pub mod analysis;
pub mod cloud;
pub mod export;
pub mod graph;
pub mod passive;

pub use analysis::IntelAnalyzer;
pub use cloud::{TakeoverHunter, TakeoverSignature, SIGNATURES};
pub use export::Exporter;
pub use graph::TopologyGraph;
pub use passive::{CtClient, CtClientBuilder};
