//! Certificate transparency subdomain harvesting.

use reqwest::Client as HttpClient;
use serde::Deserialize;
use std::collections::BTreeSet;
use std::time::Duration;
use tracing::{debug, info, warn};
use zonex_core::{DnsRecord, Result, ZonexError};

/// The crt.sh base URL
const DEFAULT_BASE_URL: &str = "https://crt.sh";

/// Default request timeout
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Source label carried by harvested records
pub const CT_SOURCE: &str = "crt.sh";

#[derive(Debug, Deserialize)]
struct CtEntry {
    name_value: String,
}

/// crt.sh client
#[derive(Debug, Clone)]
pub struct CtClient {
    http: HttpClient,
    base_url: String,
}

impl CtClient {
    /// Create a client with default settings
    pub fn new() -> Result<Self> {
        CtClientBuilder::new().build()
    }

    /// Create a builder for custom configuration
    #[must_use]
    pub fn builder() -> CtClientBuilder {
        CtClientBuilder::new()
    }

    /// Names under `domain` seen in issued certificates
    ///
    /// Multi-name entries are split, wildcard names dropped and the result
    /// deduplicated.
    pub async fn subdomains(&self, domain: &str) -> Result<Vec<String>> {
        let url = format!("{}/", self.base_url.trim_end_matches('/'));
        let pattern = format!("%.{domain}");
        debug!(url = %url, q = %pattern, "GET request");

        let response = self
            .http
            .get(&url)
            .query(&[("q", pattern.as_str()), ("output", "json")])
            .send()
            .await
            .map_err(|e| ZonexError::Http(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ZonexError::Http(format!("crt.sh returned {status}")));
        }

        let body = response
            .text()
            .await
            .map_err(|e| ZonexError::Http(e.to_string()))?;
        let entries: Vec<CtEntry> = serde_json::from_str(&body)?;

        let names: BTreeSet<String> = entries
            .iter()
            .flat_map(|entry| entry.name_value.split('\n'))
            .map(str::trim)
            .filter(|name| !name.is_empty() && !name.contains('*'))
            .map(str::to_string)
            .collect();

        Ok(names.into_iter().collect())
    }

    /// Harvest `domain` as `OSINT` records; failures are logged and yield
    /// nothing.
    pub async fn harvest(&self, domain: &str) -> Vec<DnsRecord> {
        info!(domain, "querying certificate transparency logs");
        match self.subdomains(domain).await {
            Ok(names) => {
                info!(domain, subdomains = names.len(), "CT logs harvested");
                names
                    .into_iter()
                    .map(|name| DnsRecord::osint(name, CT_SOURCE))
                    .collect()
            }
            Err(e) => {
                warn!(domain, error = %e, "CT log query failed");
                Vec::new()
            }
        }
    }
}

/// Builder for configuring a [`CtClient`]
pub struct CtClientBuilder {
    base_url: String,
    timeout: Duration,
    user_agent: String,
}

impl Default for CtClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl CtClientBuilder {
    /// Create a new builder
    #[must_use]
    pub fn new() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
            user_agent: format!("zonex/{}", env!("CARGO_PKG_VERSION")),
        }
    }

    /// Set the base URL (useful for testing)
    #[must_use]
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set the request timeout
    #[must_use]
    pub const fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the User-Agent header
    #[must_use]
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = agent.into();
        self
    }

    /// Build the client
    pub fn build(self) -> Result<CtClient> {
        url::Url::parse(&self.base_url)
            .map_err(|e| ZonexError::Config(format!("invalid CT base URL: {e}")))?;

        let http = HttpClient::builder()
            .timeout(self.timeout)
            .user_agent(&self.user_agent)
            .gzip(true)
            .build()
            .map_err(|e| ZonexError::Http(e.to_string()))?;

        Ok(CtClient {
            http,
            base_url: self.base_url,
        })
    }
}
