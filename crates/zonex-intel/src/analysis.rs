//! Heuristic findings over a record set.

use std::net::Ipv4Addr;
use tracing::debug;
use zonex_core::{DnsRecord, Finding, RecordKind};

/// Name fragments that usually mark internal or sensitive hosts
pub const HIGH_VALUE_KEYWORDS: [&str; 8] =
    ["git", "dev", "stg", "vpn", "admin", "jenkins", "k8s", "api"];

/// Flags exposure patterns in a zone's records
pub struct IntelAnalyzer<'a> {
    records: &'a [DnsRecord],
}

impl<'a> IntelAnalyzer<'a> {
    #[must_use]
    pub const fn new(records: &'a [DnsRecord]) -> Self {
        Self { records }
    }

    /// Run every check, most severe first
    #[must_use]
    pub fn run(&self) -> Vec<Finding> {
        let mut findings = self.private_addresses();
        findings.extend(self.mail_policy());
        findings.extend(self.high_value_targets());
        debug!(findings = findings.len(), "intel analysis complete");
        findings
    }

    /// A records that leak RFC 1918 addresses
    fn private_addresses(&self) -> Vec<Finding> {
        self.records
            .iter()
            .filter(|record| record.record_type == RecordKind::A)
            .filter(|record| {
                record
                    .value
                    .parse::<Ipv4Addr>()
                    .is_ok_and(|ip| ip.is_private())
            })
            .map(|record| {
                Finding::high(format!(
                    "Private IP Leakage: {} -> {}",
                    record.name, record.value
                ))
            })
            .collect()
    }

    /// Missing DMARC and SPF TXT records
    fn mail_policy(&self) -> Vec<Finding> {
        let txt = || {
            self.records
                .iter()
                .filter(|record| record.record_type == RecordKind::Txt)
        };
        let has_dmarc = txt().any(|record| record.name.contains("_dmarc"));
        let has_spf = txt().any(|record| record.value.contains("v=spf1"));

        let mut findings = Vec::new();
        if !has_dmarc {
            findings.push(Finding::medium("Missing DMARC record (Email Spoofing Risk)"));
        }
        if !has_spf {
            findings.push(Finding::medium("Missing SPF record"));
        }
        findings
    }

    /// Names containing a high-value keyword, one finding per record
    fn high_value_targets(&self) -> Vec<Finding> {
        self.records
            .iter()
            .filter(|record| {
                let name = record.name.to_ascii_lowercase();
                HIGH_VALUE_KEYWORDS.iter().any(|keyword| name.contains(keyword))
            })
            .map(|record| Finding::info(format!("High Value Target: {}", record.name)))
            .collect()
    }
}
