//! Command implementations.

pub mod config;
pub mod nameservers;
pub mod scan;
pub mod snoop;
pub mod walk;

use anyhow::{Context as _, Result};
use std::future::Future;
use std::path::PathBuf;
use zonex::{ScanConfig, ZoneScanner};

use crate::cli::args::NetworkArgs;
use crate::config::Config;
use crate::output::OutputFormat;

/// Shared context for all commands.
#[derive(Debug, Clone)]
pub struct Context {
    /// Output format
    pub output_format: OutputFormat,

    /// Number of `-v` flags
    pub verbose: u8,

    /// Disable colors
    pub no_color: bool,

    /// Loaded configuration file
    pub config: Config,

    /// Where the configuration lives
    pub config_path: PathBuf,
}

impl Context {
    /// Scan settings from the config file with the network flags applied.
    pub fn scan_config(&self, network: &NetworkArgs) -> ScanConfig {
        let mut config = self.config.scan.clone();
        if let Some(proxy) = &network.proxy {
            config.proxy = Some(proxy.clone());
        }
        if network.jitter || network.min_delay.is_some() || network.max_delay.is_some() {
            config.pacing.enabled = true;
        }
        if let Some(min) = network.min_delay {
            config.pacing.min_delay_ms = min;
        }
        if let Some(max) = network.max_delay {
            config.pacing.max_delay_ms = max;
        }
        config
    }

    /// Build a scanner, rejecting invalid settings before any traffic.
    pub fn scanner(&self, config: ScanConfig) -> Result<ZoneScanner> {
        ZoneScanner::new(config).context("invalid scan configuration")
    }

    /// Whether human-oriented decoration (spinners, banners) is wanted.
    pub fn is_pretty(&self) -> bool {
        self.output_format == OutputFormat::Pretty
    }
}

/// Race `task` against Ctrl-C.
pub async fn abortable<F: Future>(task: F) -> Result<F::Output> {
    tokio::select! {
        output = task => Ok(output),
        _ = tokio::signal::ctrl_c() => anyhow::bail!("scan aborted by user"),
    }
}
