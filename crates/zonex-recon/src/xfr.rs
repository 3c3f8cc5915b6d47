//! Zone transfer stream handling (RFC 5936 AXFR, RFC 1995 IXFR).
//!
//! A transfer arrives as a sequence of messages whose answer sections, taken
//! together, are framed by SOA records. [`TransferCollector`] consumes that
//! sequence record by record, knows when it is complete, and keeps only the
//! records that describe the zone:
//!
//! | response                      | kept records                          |
//! |-------------------------------|---------------------------------------|
//! | AXFR                          | everything but the closing SOA        |
//! | IXFR in AXFR form             | same as AXFR                          |
//! | IXFR, single SOA (up to date) | nothing                               |
//! | IXFR, incremental             | new SOA and every added record        |

use hickory_proto::op::{Message, Query};
use hickory_proto::rr::{Name, RData, Record, RecordType};
use zonex_core::DnsRecord;

use crate::error::{ReconError, ReconResult};
use crate::query::{qualify, record_kind};

/// Which transfer a request asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferKind {
    /// Full zone transfer
    Full,
    /// Incremental transfer relative to the serial the client holds
    Incremental { serial: u32 },
}

impl TransferKind {
    /// Classify a request by its question type.
    ///
    /// An IXFR request must carry the client's SOA in its authority section.
    pub fn for_request(request: &Message) -> ReconResult<Self> {
        match request.queries().first().map(Query::query_type) {
            Some(RecordType::AXFR) => Ok(Self::Full),
            Some(RecordType::IXFR) => request
                .name_servers()
                .iter()
                .find_map(soa_serial)
                .map(|serial| Self::Incremental { serial })
                .ok_or_else(|| ReconError::Transfer("IXFR request carries no SOA".into())),
            other => Err(ReconError::Transfer(format!(
                "not a transfer request: {other:?}"
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    /// Nothing seen yet; the stream must open with a SOA.
    AwaitFirst,
    /// IXFR: only the opening SOA seen so far.
    AfterFirst,
    /// AXFR body, or IXFR answered in AXFR form.
    Body,
    /// IXFR: inside a deletion sequence.
    Deleting,
    /// IXFR: inside an addition sequence.
    Adding,
    Complete,
}

/// Incremental parser of a transfer response stream.
#[derive(Debug)]
pub struct TransferCollector {
    kind: TransferKind,
    phase: Phase,
    serial: u32,
    records: Vec<Record>,
}

impl TransferCollector {
    #[must_use]
    pub const fn new(kind: TransferKind) -> Self {
        Self {
            kind,
            phase: Phase::AwaitFirst,
            serial: 0,
            records: Vec::new(),
        }
    }

    /// Whether the closing SOA has been seen.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.phase == Phase::Complete
    }

    /// Consume the answer section of one response message.
    pub fn feed(&mut self, message: &Message) -> ReconResult<()> {
        for record in message.answers() {
            self.push(record)?;
        }
        match self.phase {
            Phase::AwaitFirst => Err(ReconError::Transfer("empty transfer response".into())),
            // A lone SOA no newer than the client's serial means it is current.
            // Anything newer is a delta split after its opening SOA.
            Phase::AfterFirst => {
                let current = matches!(
                    self.kind,
                    TransferKind::Incremental { serial } if !serial_newer(self.serial, serial)
                );
                if current {
                    self.records.clear();
                    self.phase = Phase::Complete;
                }
                Ok(())
            }
            _ => Ok(()),
        }
    }

    fn push(&mut self, record: &Record) -> ReconResult<()> {
        let serial = soa_serial(record);
        match (self.phase, serial) {
            (Phase::Complete, _) => {}
            (Phase::AwaitFirst, Some(serial)) => {
                self.serial = serial;
                self.records.push(record.clone());
                self.phase = match self.kind {
                    TransferKind::Full => Phase::Body,
                    TransferKind::Incremental { .. } => Phase::AfterFirst,
                };
            }
            (Phase::AwaitFirst, None) => {
                return Err(ReconError::Transfer(
                    "transfer does not start with a SOA record".into(),
                ));
            }
            (Phase::AfterFirst, Some(serial)) => {
                self.phase = if serial == self.serial {
                    Phase::Complete
                } else {
                    Phase::Deleting
                };
            }
            (Phase::AfterFirst | Phase::Body, None) => {
                self.records.push(record.clone());
                self.phase = Phase::Body;
            }
            (Phase::Body, Some(_)) => self.phase = Phase::Complete,
            (Phase::Deleting, Some(_)) => self.phase = Phase::Adding,
            (Phase::Deleting, None) => {}
            (Phase::Adding, Some(serial)) => {
                self.phase = if serial == self.serial {
                    Phase::Complete
                } else {
                    Phase::Deleting
                };
            }
            (Phase::Adding, None) => self.records.push(record.clone()),
        }
        Ok(())
    }

    /// The zone records kept so far.
    #[must_use]
    pub fn into_records(self) -> Vec<Record> {
        self.records
    }
}

fn soa_serial(record: &Record) -> Option<u32> {
    match record.data() {
        RData::SOA(soa) => Some(soa.serial()),
        _ => None,
    }
}

/// RFC 1982 serial number comparison: whether `a` is newer than `b`.
const fn serial_newer(a: u32, b: u32) -> bool {
    a != b && a.wrapping_sub(b) < 1 << 31
}

/// Turn a complete transfer response stream into normalized zone records.
pub fn transfer_records(
    zone: &Name,
    kind: TransferKind,
    messages: &[Message],
) -> ReconResult<Vec<DnsRecord>> {
    let mut collector = TransferCollector::new(kind);
    for message in messages {
        collector.feed(message)?;
    }
    if !collector.is_complete() {
        return Err(ReconError::Transfer("transfer ended before closing SOA".into()));
    }
    Ok(collector
        .into_records()
        .iter()
        .map(|record| zone_record(record, zone))
        .collect())
}

/// Normalize one wire record, naming it relative to `zone`.
#[must_use]
pub fn zone_record(record: &Record, zone: &Name) -> DnsRecord {
    DnsRecord::new(
        qualify(record.name(), zone),
        record_kind(record.record_type()),
        record.data().to_string(),
    )
}
