//! DNS message construction and name helpers.

use hickory_proto::op::{Edns, Message, MessageType, OpCode, Query};
use hickory_proto::rr::rdata::SOA;
use hickory_proto::rr::{Name, RData, Record, RecordType};
use zonex_core::RecordKind;

use crate::config::EDNS_PAYLOAD;
use crate::error::{ReconError, ReconResult};

/// Parse an operator-supplied domain into a lowercase FQDN.
pub fn parse_domain(domain: &str) -> ReconResult<Name> {
    let trimmed = domain.trim().trim_end_matches('.');
    if trimmed.is_empty() {
        return Err(ReconError::InvalidDomain(domain.to_string()));
    }
    Name::from_ascii(format!("{trimmed}."))
        .map(|name| name.to_lowercase())
        .map_err(|_| ReconError::InvalidDomain(domain.to_string()))
}

/// Render a name without its trailing root dot.
#[must_use]
pub fn display_name(name: &Name) -> String {
    let ascii = name.to_ascii();
    match ascii.strip_suffix('.') {
        Some(stripped) if !stripped.is_empty() => stripped.to_string(),
        _ => ascii,
    }
}

/// Qualify a zone owner as `<node-label>.<domain>`.
///
/// The apex is rendered as the domain itself and owners outside the zone keep
/// their absolute name.
#[must_use]
pub fn qualify(owner: &Name, zone: &Name) -> String {
    let zone_text = display_name(zone);
    if owner == zone {
        return zone_text;
    }
    let owner_text = display_name(owner);
    if !zone.zone_of(owner) || owner_text.len() <= zone_text.len() {
        return owner_text;
    }
    let label = &owner_text[..owner_text.len() - zone_text.len() - 1];
    format!("{label}.{zone_text}")
}

/// Map a wire record type onto the normalized record kind.
#[must_use]
pub fn record_kind(record_type: RecordType) -> RecordKind {
    record_type
        .to_string()
        .parse()
        .unwrap_or_else(|_| RecordKind::Other(format!("TYPE{}", u16::from(record_type))))
}

/// Build a standard query with a random ID.
#[must_use]
pub fn build_query(name: &Name, record_type: RecordType, recursion_desired: bool) -> Message {
    let mut message = Message::new();
    message
        .set_id(rand::random())
        .set_message_type(MessageType::Query)
        .set_op_code(OpCode::Query)
        .set_recursion_desired(recursion_desired);
    message.add_query(Query::query(name.clone(), record_type));
    message
}

/// Build a query advertising a 4096-byte EDNS buffer with the DNSSEC OK bit.
#[must_use]
pub fn build_dnssec_query(name: &Name, record_type: RecordType) -> Message {
    let mut message = build_query(name, record_type, true);
    let mut edns = Edns::new();
    edns.set_max_payload(EDNS_PAYLOAD);
    edns.set_version(0);
    edns.set_dnssec_ok(true);
    message.set_edns(edns);
    message
}

/// Build a zone transfer request (AXFR).
#[must_use]
pub fn build_axfr_query(zone: &Name) -> Message {
    build_query(zone, RecordType::AXFR, false)
}

/// Build an incremental transfer request seeded with the client's serial.
///
/// The serial travels in a SOA record in the authority section (RFC 1995).
#[must_use]
pub fn build_ixfr_query(zone: &Name, serial: u32) -> Message {
    let mut message = build_query(zone, RecordType::IXFR, false);
    let soa = SOA::new(Name::root(), Name::root(), serial, 0, 0, 0, 0);
    message.add_name_server(Record::from_rdata(zone.clone(), 0, RData::SOA(soa)));
    message
}

#[cfg(test)]
mod tests {
    use super::*;

    fn name(s: &str) -> Name {
        Name::from_ascii(s).unwrap()
    }

    #[test]
    fn parse_domain_normalizes() {
        let domain = parse_domain("Example.COM").unwrap();
        assert!(domain.is_fqdn());
        assert_eq!(display_name(&domain), "example.com");
        assert_eq!(parse_domain("example.com.").unwrap(), domain);
    }

    #[test]
    fn parse_domain_rejects_garbage() {
        assert!(parse_domain("").is_err());
        assert!(parse_domain("   ").is_err());
        assert!(parse_domain("...").is_err());
    }

    #[test]
    fn qualify_relative_owner() {
        let zone = name("example.com.");
        assert_eq!(qualify(&name("www.example.com."), &zone), "www.example.com");
        assert_eq!(qualify(&name("a.b.example.com."), &zone), "a.b.example.com");
        assert_eq!(qualify(&zone, &zone), "example.com");
        assert_eq!(qualify(&name("elsewhere.net."), &zone), "elsewhere.net");
    }

    #[test]
    fn record_kind_maps_wire_types() {
        assert_eq!(record_kind(RecordType::A), RecordKind::A);
        assert_eq!(record_kind(RecordType::MX), RecordKind::Mx);
        assert_eq!(record_kind(RecordType::NSEC), RecordKind::Nsec);
        assert_eq!(record_kind(RecordType::HINFO), RecordKind::Other("HINFO".into()));
    }

    #[test]
    fn plain_query_flags() {
        let message = build_query(&name("github.com."), RecordType::A, false);
        assert!(!message.recursion_desired());
        assert_eq!(message.queries().len(), 1);
        assert_eq!(message.queries()[0].query_type(), RecordType::A);
        assert!(message.extensions().is_none());
    }

    #[test]
    fn dnssec_query_advertises_buffer() {
        let message = build_dnssec_query(&name("00-nonexistent.example.com."), RecordType::A);
        let edns = message.extensions().as_ref().unwrap();
        assert_eq!(edns.max_payload(), 4096);
    }

    #[test]
    fn ixfr_query_carries_serial() {
        let message = build_ixfr_query(&name("example.com."), 2024_01_01);
        assert_eq!(message.queries()[0].query_type(), RecordType::IXFR);
        let soa = match message.name_servers()[0].data() {
            RData::SOA(soa) => soa.serial(),
            other => panic!("unexpected rdata {other:?}"),
        };
        assert_eq!(soa, 2024_01_01);
    }
}
