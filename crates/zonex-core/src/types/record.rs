use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::net::IpAddr;
use std::str::FromStr;

use crate::ZonexError;

/// Value used for records that carry no data of their own (NSEC-walked names)
pub const NO_VALUE: &str = "N/A";

/// Type label of a normalized record
///
/// Wire record types keep their standard mnemonic. Two synthetic kinds mark
/// records that did not come out of a zone transfer: [`RecordKind::NsecWalked`]
/// for names discovered by following NSEC chains, and [`RecordKind::Osint`]
/// for names harvested from passive sources.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum RecordKind {
    /// IPv4 address
    A,
    /// IPv6 address
    Aaaa,
    /// Authoritative nameserver
    Ns,
    /// Canonical name alias
    Cname,
    /// Mail exchanger
    Mx,
    /// Text record
    Txt,
    /// Start of authority
    Soa,
    /// Service locator
    Srv,
    /// Reverse pointer
    Ptr,
    /// Certification authority authorization
    Caa,
    /// DNSSEC next-secure record
    Nsec,
    /// Name discovered by NSEC zone walking
    NsecWalked,
    /// Name harvested from open-source intelligence
    Osint,
    /// Any other record type, stored by its uppercase mnemonic (never empty)
    Other(String),
}

impl RecordKind {
    /// The mnemonic used in reports and exports
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::A => "A",
            Self::Aaaa => "AAAA",
            Self::Ns => "NS",
            Self::Cname => "CNAME",
            Self::Mx => "MX",
            Self::Txt => "TXT",
            Self::Soa => "SOA",
            Self::Srv => "SRV",
            Self::Ptr => "PTR",
            Self::Caa => "CAA",
            Self::Nsec => "NSEC",
            Self::NsecWalked => "NSEC_WALKED",
            Self::Osint => "OSINT",
            Self::Other(label) => label,
        }
    }

    /// Returns true for kinds whose value names another host
    #[must_use]
    pub const fn is_alias_like(&self) -> bool {
        matches!(self, Self::Cname | Self::Mx | Self::Ns)
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RecordKind {
    type Err = ZonexError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let label = s.trim().to_ascii_uppercase();
        if label.is_empty() {
            return Err(ZonexError::InvalidRecordType(s.to_string()));
        }

        Ok(match label.as_str() {
            "A" => Self::A,
            "AAAA" => Self::Aaaa,
            "NS" => Self::Ns,
            "CNAME" => Self::Cname,
            "MX" => Self::Mx,
            "TXT" => Self::Txt,
            "SOA" => Self::Soa,
            "SRV" => Self::Srv,
            "PTR" => Self::Ptr,
            "CAA" => Self::Caa,
            "NSEC" => Self::Nsec,
            "NSEC_WALKED" => Self::NsecWalked,
            "OSINT" => Self::Osint,
            _ => Self::Other(label),
        })
    }
}

impl TryFrom<String> for RecordKind {
    type Error = ZonexError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<RecordKind> for String {
    fn from(kind: RecordKind) -> Self {
        kind.as_str().to_string()
    }
}

/// A normalized DNS record
///
/// Produced by every acquisition technique and immutable once created.
/// Two records are the same record when name, type and value all match.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DnsRecord {
    /// Owner name, without the trailing root dot
    pub name: String,

    /// Record type
    #[serde(rename = "type")]
    pub record_type: RecordKind,

    /// Record data in presentation format
    pub value: String,
}

impl DnsRecord {
    /// Create a record, normalizing the owner name
    #[must_use]
    pub fn new(name: impl Into<String>, record_type: RecordKind, value: impl Into<String>) -> Self {
        let mut name = name.into();
        if name.len() > 1 && name.ends_with('.') {
            name.pop();
        }
        Self {
            name,
            record_type,
            value: value.into(),
        }
    }

    /// A name discovered by NSEC walking
    #[must_use]
    pub fn nsec_walked(name: impl Into<String>) -> Self {
        Self::new(name, RecordKind::NsecWalked, NO_VALUE)
    }

    /// A name harvested from a passive source
    #[must_use]
    pub fn osint(name: impl Into<String>, source: impl Into<String>) -> Self {
        Self::new(name, RecordKind::Osint, source)
    }

    /// Try to parse the value as an IP address
    #[must_use]
    pub fn as_ip(&self) -> Option<IpAddr> {
        self.value.parse().ok()
    }

    /// Returns true if this is an A or AAAA record
    #[must_use]
    pub const fn is_address_record(&self) -> bool {
        matches!(self.record_type, RecordKind::A | RecordKind::Aaaa)
    }

    /// The value with any trailing root dot removed (for CNAME/MX/NS targets)
    #[must_use]
    pub fn target(&self) -> &str {
        let value = self.value.rsplit(' ').next().unwrap_or(&self.value);
        value.strip_suffix('.').unwrap_or(value)
    }
}

/// Remove duplicate records, keeping the first occurrence of each
///
/// Equality is over the full (name, type, value) triple.
#[must_use]
pub fn dedup_records(records: Vec<DnsRecord>) -> Vec<DnsRecord> {
    let mut seen = HashSet::with_capacity(records.len());
    records
        .into_iter()
        .filter(|record| seen.insert(record.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_kind_round_trips_known_labels() {
        for label in ["A", "AAAA", "NS", "CNAME", "MX", "TXT", "SOA", "NSEC_WALKED", "OSINT"] {
            let kind: RecordKind = label.parse().unwrap();
            assert_eq!(kind.to_string(), label);
        }
    }

    #[test]
    fn record_kind_keeps_unknown_types() {
        let kind: RecordKind = "hinfo".parse().unwrap();
        assert_eq!(kind, RecordKind::Other("HINFO".into()));
        assert_eq!(kind.as_str(), "HINFO");
    }

    #[test]
    fn record_kind_rejects_blank() {
        assert!("".parse::<RecordKind>().is_err());
        assert!("   ".parse::<RecordKind>().is_err());
    }

    #[test]
    fn record_serializes_with_type_key() {
        let record = DnsRecord::new("www.example.com.", RecordKind::Cname, "web.example.net.");
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["name"], "www.example.com");
        assert_eq!(json["type"], "CNAME");
        assert_eq!(json["value"], "web.example.net.");
    }

    #[test]
    fn record_deserialization_rejects_blank_type() {
        let json = r#"{"name":"a.example.com","type":"","value":"x"}"#;
        assert!(serde_json::from_str::<DnsRecord>(json).is_err());
    }

    #[test]
    fn target_strips_preference_and_dot() {
        let mx = DnsRecord::new("example.com", RecordKind::Mx, "10 mail.example.com.");
        assert_eq!(mx.target(), "mail.example.com");
        let cname = DnsRecord::new("www.example.com", RecordKind::Cname, "cdn.example.net.");
        assert_eq!(cname.target(), "cdn.example.net");
    }

    #[test]
    fn dedup_keeps_first_occurrence_order() {
        let records = vec![
            DnsRecord::new("b.example.com", RecordKind::A, "192.0.2.2"),
            DnsRecord::new("a.example.com", RecordKind::A, "192.0.2.1"),
            DnsRecord::new("b.example.com", RecordKind::A, "192.0.2.2"),
            DnsRecord::new("b.example.com", RecordKind::Txt, "192.0.2.2"),
        ];
        let unique = dedup_records(records);
        assert_eq!(unique.len(), 3);
        assert_eq!(unique[0].name, "b.example.com");
        assert_eq!(unique[1].name, "a.example.com");
        assert_eq!(unique[2].record_type, RecordKind::Txt);
    }

    #[test]
    fn dedup_output_has_no_equal_pairs() {
        let mut records = Vec::new();
        for i in 0..20 {
            records.push(DnsRecord::new(
                format!("h{}.example.com", i % 4),
                if i % 3 == 0 { RecordKind::A } else { RecordKind::NsecWalked },
                format!("v{}", i % 2),
            ));
        }
        let unique = dedup_records(records);
        for (i, left) in unique.iter().enumerate() {
            for right in &unique[i + 1..] {
                assert_ne!(left, right);
            }
        }
    }

    #[test]
    fn nsec_walked_uses_placeholder_value() {
        let record = DnsRecord::nsec_walked("mail.example.com.");
        assert_eq!(record.name, "mail.example.com");
        assert_eq!(record.value, NO_VALUE);
        assert_eq!(record.record_type, RecordKind::NsecWalked);
    }
}
