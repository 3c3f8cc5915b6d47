//! Subdomain takeover detection for CNAMEs pointing at cloud storage.
//!
//! A CNAME to a bucket or pages site that nobody owns any more serves the
//! provider's "no such resource" page. Whoever claims the resource name
//! controls the subdomain.

use futures_util::future::join_all;
use reqwest::Client as HttpClient;
use std::time::Duration;
use tracing::{debug, error, info};
use zonex_core::{DnsRecord, Finding, RecordKind, Result, ZonexError};

/// Per-request timeout of takeover probes
const PROBE_TIMEOUT: Duration = Duration::from_secs(5);

/// URL fetched for a candidate subdomain; `{host}` is replaced by its name
const DEFAULT_URL_TEMPLATE: &str = "http://{host}";

/// Response that identifies an unclaimed resource at a provider
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TakeoverSignature {
    /// Suffix found in the CNAME target
    pub provider: &'static str,
    /// HTTP status of the unclaimed resource page
    pub status: u16,
    /// Text present in the unclaimed resource page
    pub marker: &'static str,
}

/// Known provider signatures
pub static SIGNATURES: [TakeoverSignature; 4] = [
    TakeoverSignature {
        provider: "s3.amazonaws.com",
        status: 404,
        marker: "NoSuchBucket",
    },
    TakeoverSignature {
        provider: "blob.core.windows.net",
        status: 404,
        marker: "ResourceNotFound",
    },
    TakeoverSignature {
        provider: "googleapis.com",
        status: 404,
        marker: "NoSuchBucket",
    },
    TakeoverSignature {
        provider: "github.io",
        status: 404,
        marker: "There isn't a GitHub Pages site here",
    },
];

/// Probes CNAME records for dangling cloud resources
#[derive(Debug, Clone)]
pub struct TakeoverHunter {
    http: HttpClient,
    url_template: String,
}

impl TakeoverHunter {
    /// Hunter fetching `http://<subdomain>`
    pub fn new() -> Result<Self> {
        Self::with_url_template(DEFAULT_URL_TEMPLATE)
    }

    /// Hunter fetching a custom URL per subdomain (`{host}` placeholder)
    pub fn with_url_template(template: impl Into<String>) -> Result<Self> {
        let http = HttpClient::builder()
            .timeout(PROBE_TIMEOUT)
            .user_agent(format!("zonex/{}", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ZonexError::Http(e.to_string()))?;
        Ok(Self {
            http,
            url_template: template.into(),
        })
    }

    /// CNAME records whose target belongs to a known provider
    #[must_use]
    pub fn candidates(records: &[DnsRecord]) -> Vec<(&DnsRecord, &'static TakeoverSignature)> {
        records
            .iter()
            .filter(|record| record.record_type == RecordKind::Cname)
            .flat_map(|record| {
                SIGNATURES
                    .iter()
                    .filter(move |signature| record.target().contains(signature.provider))
                    .map(move |signature| (record, signature))
            })
            .collect()
    }

    /// Probe every candidate concurrently and report confirmed takeovers
    pub async fn check(&self, records: &[DnsRecord]) -> Vec<Finding> {
        let candidates = Self::candidates(records);
        info!(candidates = candidates.len(), "hunting for cloud takeovers");

        let probes = candidates
            .into_iter()
            .map(|(record, signature)| self.verify(&record.name, record.target(), signature));

        join_all(probes).await.into_iter().flatten().collect()
    }

    async fn verify(
        &self,
        subdomain: &str,
        cname: &str,
        signature: &TakeoverSignature,
    ) -> Option<Finding> {
        let url = self.url_template.replace("{host}", subdomain);
        let response = match self.http.get(&url).send().await {
            Ok(response) => response,
            Err(e) => {
                debug!(url = %url, error = %e, "takeover probe failed");
                return None;
            }
        };

        let status = response.status().as_u16();
        let body = response.text().await.ok()?;
        if status != signature.status || !body.contains(signature.marker) {
            return None;
        }

        let message = format!("CONFIRMED TAKEOVER: {subdomain} -> {cname}");
        error!(provider = signature.provider, "{message}");
        Some(Finding::critical(message))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};
    use zonex_core::Severity;

    fn cname(name: &str, target: &str) -> DnsRecord {
        DnsRecord::new(name, RecordKind::Cname, target)
    }

    #[test]
    fn only_provider_cnames_are_candidates() {
        let records = vec![
            cname("assets.example.com", "assets-prod.s3.amazonaws.com."),
            cname("www.example.com", "lb.example.net."),
            DnsRecord::new("docs.example.com", RecordKind::A, "192.0.2.1"),
            cname("blog.example.com", "example.github.io."),
        ];
        let candidates = TakeoverHunter::candidates(&records);
        assert_eq!(candidates.len(), 2);
        assert_eq!(candidates[0].1.provider, "s3.amazonaws.com");
        assert_eq!(candidates[1].0.name, "blog.example.com");
    }

    #[tokio::test]
    async fn confirms_unclaimed_bucket() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/assets.example.com"))
            .respond_with(
                ResponseTemplate::new(404)
                    .set_body_string("<Error><Code>NoSuchBucket</Code></Error>"),
            )
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/blog.example.com"))
            .respond_with(ResponseTemplate::new(200).set_body_string("hello"))
            .mount(&server)
            .await;

        let hunter =
            TakeoverHunter::with_url_template(format!("{}/{{host}}", server.uri())).unwrap();
        let findings = hunter
            .check(&[
                cname("assets.example.com", "assets-prod.s3.amazonaws.com."),
                cname("blog.example.com", "example.github.io."),
            ])
            .await;

        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].severity, Severity::Critical);
        assert_eq!(
            findings[0].message,
            "CONFIRMED TAKEOVER: assets.example.com -> assets-prod.s3.amazonaws.com"
        );
    }

    #[tokio::test]
    async fn marker_without_status_is_not_a_takeover() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("NoSuchBucket"))
            .mount(&server)
            .await;

        let hunter =
            TakeoverHunter::with_url_template(format!("{}/{{host}}", server.uri())).unwrap();
        let findings = hunter
            .check(&[cname("assets.example.com", "x.s3.amazonaws.com")])
            .await;
        assert!(findings.is_empty());
    }

    #[tokio::test]
    async fn unreachable_hosts_are_skipped() {
        let hunter = TakeoverHunter::with_url_template("http://127.0.0.1:9/{host}").unwrap();
        let findings = hunter
            .check(&[cname("assets.example.com", "x.s3.amazonaws.com")])
            .await;
        assert!(findings.is_empty());
    }
}
