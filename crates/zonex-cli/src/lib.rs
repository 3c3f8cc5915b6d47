//! # zonex-cli
//!
//! Command-line interface for the zonex reconnaissance engine.
//!
//! ## Features
//!
//! - **Zone scans**: AXFR, IXFR and NSEC walking against every nameserver
//! - **Cache snooping**: non-recursive probes for recently resolved domains
//! - **Collaborators**: CT log harvesting, takeover hunting, heuristic findings
//! - **Exports**: JSON/CSV record dumps and a Graphviz topology
//! - **Multiple output formats**: Pretty tables, JSON, CSV, YAML

pub mod cli;
pub mod config;
pub mod output;

pub use cli::run;
