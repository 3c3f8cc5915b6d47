//! Configuration management.

use anyhow::{Context as _, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use zonex::ScanConfig;

use crate::output::OutputFormat;

/// Directory exports land in when nothing else is configured.
pub const DEFAULT_OUTPUT_DIR: &str = "results";

/// CLI configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Default output format.
    pub output_format: Option<OutputFormat>,

    /// Default export directory.
    pub output_dir: Option<PathBuf>,

    /// Scan defaults; command-line flags override them.
    #[serde(default)]
    pub scan: ScanConfig,
}

impl Config {
    /// Get the default config file path.
    pub fn default_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("io", "zonex", "zonex")
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    /// Resolve an explicit path or fall back to the default one.
    pub fn path(explicit: Option<&Path>) -> Result<PathBuf> {
        explicit.map_or_else(Self::default_path, |path| Ok(path.to_path_buf()))
    }

    /// Load configuration from file; a missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let config: Self = toml::from_str(&content)
            .with_context(|| format!("invalid config file {}", path.display()))?;

        Ok(config)
    }

    /// Save configuration to file.
    pub fn save(&self, path: &Path) -> Result<()> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;

        Ok(())
    }

    /// Export directory, configured or default.
    pub fn output_dir(&self) -> PathBuf {
        self.output_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_DIR))
    }

    /// Apply `key = value`; nothing changes unless the resulting scan
    /// settings are valid.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let mut updated = self.clone();
        updated.apply(key, value)?;
        updated.scan.validate()?;
        *self = updated;
        Ok(())
    }

    fn apply(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "output_format" | "output" => self.output_format = Some(value.parse()?),
            "output_dir" => self.output_dir = Some(PathBuf::from(value)),
            "proxy" => {
                self.scan.proxy = if value.is_empty() || value == "none" {
                    None
                } else {
                    value.parse::<zonex::ProxyConfig>()?;
                    Some(value.to_string())
                };
            }
            "walk" => self.scan.walk = value.parse()?,
            "snoop" => self.scan.snoop = value.parse()?,
            "jitter" => self.scan.pacing.enabled = value.parse()?,
            "min_delay" => self.scan.pacing.min_delay_ms = value.parse()?,
            "max_delay" => self.scan.pacing.max_delay_ms = value.parse()?,
            "max_hops" => self.scan.max_hops = value.parse()?,
            "resolvers" => {
                self.scan.resolvers = value
                    .split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(parse_resolver)
                    .collect::<Result<_>>()?;
            }
            _ => {
                anyhow::bail!(
                    "Unknown config key: {key}\n\n\
                     Available keys:\n  \
                     output_format  - Default output format (pretty/json/csv/yaml)\n  \
                     output_dir     - Default export directory\n  \
                     proxy          - SOCKS5 proxy host:port (none to clear)\n  \
                     walk           - NSEC walk by default (true/false)\n  \
                     snoop          - Cache snoop by default (true/false)\n  \
                     jitter         - Pace probes by default (true/false)\n  \
                     min_delay      - Minimum probe delay in ms\n  \
                     max_delay      - Maximum probe delay in ms\n  \
                     max_hops       - NSEC walk hop limit\n  \
                     resolvers      - Comma-separated upstream resolvers"
                );
            }
        }
        Ok(())
    }
}

/// `ip` or `ip:port`; the DNS port is assumed when omitted.
fn parse_resolver(value: &str) -> Result<std::net::SocketAddr> {
    if let Ok(addr) = value.parse() {
        return Ok(addr);
    }
    let ip: std::net::IpAddr = value
        .parse()
        .with_context(|| format!("invalid resolver address '{value}'"))?;
    Ok(std::net::SocketAddr::new(ip, zonex::recon::DNS_PORT))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.output_dir(), PathBuf::from("results"));
    }

    #[test]
    fn save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = Config::default();
        config.set("output_format", "json").unwrap();
        config.set("proxy", "127.0.0.1:9050").unwrap();
        config.set("max_hops", "250").unwrap();
        config.set("resolvers", "9.9.9.9, 1.1.1.1:5353").unwrap();
        config.save(&path).unwrap();

        let loaded = Config::load(&path).unwrap();
        assert_eq!(loaded, config);
        assert_eq!(loaded.scan.max_hops, 250);
        assert_eq!(loaded.scan.resolvers[0].port(), 53);
        assert_eq!(loaded.scan.resolvers[1].port(), 5353);
    }

    #[test]
    fn scan_table_is_partial() {
        let config: Config = toml::from_str(
            r#"
            output_format = "yaml"

            [scan]
            walk = true

            [scan.pacing]
            enabled = true
            "#,
        )
        .unwrap();
        assert_eq!(config.output_format, Some(OutputFormat::Yaml));
        assert!(config.scan.walk);
        assert!(config.scan.pacing.enabled);
        assert_eq!(config.scan.max_hops, zonex::recon::DEFAULT_MAX_HOPS);
    }

    #[test]
    fn rejects_bad_values() {
        let mut config = Config::default();
        assert!(config.set("proxy", "localhost").is_err());
        assert!(config.set("max_hops", "0").is_err());
        assert_eq!(config.scan.max_hops, zonex::recon::DEFAULT_MAX_HOPS);
        assert!(config.set("colour", "blue").is_err());
        config.set("proxy", "none").unwrap();
        assert!(config.scan.proxy.is_none());
    }
}
