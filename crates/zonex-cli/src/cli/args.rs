//! Command-line argument definitions using clap.

use crate::output::OutputFormat;
use clap::{ArgAction, Args, Parser, Subcommand};
use std::net::IpAddr;
use std::path::PathBuf;

/// DNS zone reconnaissance
///
/// Finds a domain's authoritative nameservers and tries to pull the zone
/// from each one: full transfer, incremental transfer, then NSEC walking.
///
/// Only scan domains you are authorized to test.
#[derive(Parser, Debug)]
#[command(name = "zonex")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output format
    #[arg(short, long, global = true, value_enum)]
    pub output: Option<OutputFormat>,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Config file (defaults to the platform config directory)
    #[arg(long, env = "ZONEX_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the full reconnaissance chain against a domain
    Scan(ScanArgs),

    /// List a domain's nameservers and the zone serial each reports
    Nameservers(NameserversArgs),

    /// Probe a nameserver's cache for well-known domains
    Snoop(SnoopArgs),

    /// Walk a DNSSEC zone's NSEC chain on one nameserver
    Walk(WalkArgs),

    /// Manage CLI configuration
    Config(ConfigArgs),
}

// ============================================================================
// Shared network options
// ============================================================================

#[derive(Args, Debug, Default, Clone)]
pub struct NetworkArgs {
    /// SOCKS5 proxy for all DNS traffic (host:port)
    #[arg(long, value_name = "HOST:PORT")]
    pub proxy: Option<String>,

    /// Insert a random delay before each probe
    #[arg(long)]
    pub jitter: bool,

    /// Minimum probe delay in milliseconds (implies --jitter)
    #[arg(long, value_name = "MS")]
    pub min_delay: Option<u64>,

    /// Maximum probe delay in milliseconds (implies --jitter)
    #[arg(long, value_name = "MS")]
    pub max_delay: Option<u64>,
}

// ============================================================================
// Scan command
// ============================================================================

#[derive(Args, Debug)]
pub struct ScanArgs {
    /// Target domain (e.g., example.com)
    pub domain: String,

    /// Fall back to NSEC walking when transfers are refused
    #[arg(long)]
    pub walk: bool,

    /// Cache-snoop every nameserver before attacking it
    #[arg(long)]
    pub snoop: bool,

    /// Harvest subdomains from certificate transparency logs
    #[arg(long)]
    pub passive: bool,

    /// Check CNAMEs for dangling cloud resources
    #[arg(long)]
    pub cloud: bool,

    /// Write a Graphviz topology of the results
    #[arg(long)]
    pub graph: bool,

    /// Enable walk, snoop, passive, cloud and graph
    #[arg(long)]
    pub all: bool,

    /// Maximum NSEC walk hops per nameserver
    #[arg(long, value_name = "N")]
    pub max_hops: Option<usize>,

    /// Directory for exported results
    #[arg(long, value_name = "DIR")]
    pub out_dir: Option<PathBuf>,

    /// Do not write JSON/CSV exports
    #[arg(long)]
    pub no_export: bool,

    #[command(flatten)]
    pub network: NetworkArgs,
}

impl ScanArgs {
    pub const fn walk(&self) -> bool {
        self.walk || self.all
    }

    pub const fn snoop(&self) -> bool {
        self.snoop || self.all
    }

    pub const fn passive(&self) -> bool {
        self.passive || self.all
    }

    pub const fn cloud(&self) -> bool {
        self.cloud || self.all
    }

    pub const fn graph(&self) -> bool {
        self.graph || self.all
    }
}

// ============================================================================
// Nameservers command
// ============================================================================

#[derive(Args, Debug)]
pub struct NameserversArgs {
    /// Target domain
    pub domain: String,

    #[command(flatten)]
    pub network: NetworkArgs,
}

// ============================================================================
// Snoop command
// ============================================================================

#[derive(Args, Debug)]
pub struct SnoopArgs {
    /// Nameserver or resolver address to probe
    pub nameserver: IpAddr,

    /// Domain to probe for (repeatable; replaces the default list)
    #[arg(short, long = "target", value_name = "DOMAIN")]
    pub targets: Vec<String>,

    #[command(flatten)]
    pub network: NetworkArgs,
}

// ============================================================================
// Walk command
// ============================================================================

#[derive(Args, Debug)]
pub struct WalkArgs {
    /// Zone to walk
    pub domain: String,

    /// Authoritative nameserver address
    pub nameserver: IpAddr,

    /// Maximum hops
    #[arg(long, value_name = "N")]
    pub max_hops: Option<usize>,

    #[command(flatten)]
    pub network: NetworkArgs,
}

// ============================================================================
// Config command
// ============================================================================

#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommands,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show current configuration
    Show,

    /// Set a configuration value
    Set {
        /// Key to set (e.g., output_format, proxy, max_hops)
        key: String,

        /// Value to set
        value: String,
    },

    /// Show config file path
    Path,
}
