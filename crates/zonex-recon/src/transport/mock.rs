//! Scripted in-memory transport for engine tests.

use async_trait::async_trait;
use hickory_proto::dnssec::rdata::{DNSSECRData, NSEC};
use hickory_proto::op::{Message, MessageType, OpCode, ResponseCode};
use hickory_proto::rr::rdata::{A, CNAME, NS, SOA, TXT};
use hickory_proto::rr::{Name, RData, Record, RecordType};
use std::net::{Ipv4Addr, SocketAddr};
use std::sync::Mutex;
use std::time::Duration;

use super::Transport;
use crate::error::{ReconError, ReconResult};

type QueryHandler = dyn Fn(SocketAddr, &Message) -> ReconResult<Message> + Send + Sync;
type TransferHandler = dyn Fn(SocketAddr, &Message) -> ReconResult<Vec<Message>> + Send + Sync;

/// One request seen by the mock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedRequest {
    pub server: SocketAddr,
    pub name: Name,
    pub record_type: RecordType,
    pub recursion_desired: bool,
    pub edns_payload: Option<u16>,
    pub transfer: bool,
}

impl RecordedRequest {
    fn capture(server: SocketAddr, request: &Message, transfer: bool) -> Self {
        let query = &request.queries()[0];
        Self {
            server,
            name: query.name().clone(),
            record_type: query.query_type(),
            recursion_desired: request.recursion_desired(),
            edns_payload: request.extensions().as_ref().map(|edns| edns.max_payload()),
            transfer,
        }
    }
}

/// Transport answering from closures. Unscripted queries time out and
/// unscripted transfers are refused.
pub struct MockTransport {
    on_query: Box<QueryHandler>,
    on_transfer: Box<TransferHandler>,
    requests: Mutex<Vec<RecordedRequest>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self {
            on_query: Box::new(|_, _| Err(ReconError::Timeout(Duration::from_secs(1)))),
            on_transfer: Box::new(|_, _| Err(ReconError::Transfer("REFUSED".into()))),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn on_query<F>(mut self, handler: F) -> Self
    where
        F: Fn(SocketAddr, &Message) -> ReconResult<Message> + Send + Sync + 'static,
    {
        self.on_query = Box::new(handler);
        self
    }

    pub fn on_transfer<F>(mut self, handler: F) -> Self
    where
        F: Fn(SocketAddr, &Message) -> ReconResult<Vec<Message>> + Send + Sync + 'static,
    {
        self.on_transfer = Box::new(handler);
        self
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn requests_to(&self, server: SocketAddr) -> Vec<RecordedRequest> {
        self.requests()
            .into_iter()
            .filter(|request| request.server == server)
            .collect()
    }

    pub fn requests_of(&self, record_type: RecordType) -> Vec<RecordedRequest> {
        self.requests()
            .into_iter()
            .filter(|request| request.record_type == record_type)
            .collect()
    }
}

impl Default for MockTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn query(
        &self,
        server: SocketAddr,
        request: &Message,
        _timeout: Duration,
    ) -> ReconResult<Message> {
        self.requests
            .lock()
            .unwrap()
            .push(RecordedRequest::capture(server, request, false));
        (self.on_query)(server, request)
    }

    async fn transfer(
        &self,
        server: SocketAddr,
        request: &Message,
        _lifetime: Duration,
    ) -> ReconResult<Vec<Message>> {
        self.requests
            .lock()
            .unwrap()
            .push(RecordedRequest::capture(server, request, true));
        (self.on_transfer)(server, request)
    }
}

pub fn name(text: &str) -> Name {
    Name::from_ascii(text).unwrap()
}

pub fn server(ip: [u8; 4]) -> SocketAddr {
    SocketAddr::from((ip, 53))
}

/// The first question of a request.
pub fn question(request: &Message) -> (Name, RecordType) {
    let query = &request.queries()[0];
    (query.name().clone(), query.query_type())
}

/// A NOERROR response echoing the request's id and question.
pub fn reply(request: &Message, answers: Vec<Record>, authority: Vec<Record>) -> Message {
    let mut response = Message::new();
    response
        .set_id(request.id())
        .set_message_type(MessageType::Response)
        .set_op_code(OpCode::Query)
        .set_response_code(ResponseCode::NoError);
    for query in request.queries() {
        response.add_query(query.clone());
    }
    response.add_answers(answers);
    response.add_name_servers(authority);
    response
}

pub fn a_record(owner: &str, ip: [u8; 4], ttl: u32) -> Record {
    Record::from_rdata(name(owner), ttl, RData::A(A(Ipv4Addr::from(ip))))
}

pub fn ns_record(owner: &str, target: &str) -> Record {
    Record::from_rdata(name(owner), 3600, RData::NS(NS(name(target))))
}

pub fn cname_record(owner: &str, target: &str) -> Record {
    Record::from_rdata(name(owner), 300, RData::CNAME(CNAME(name(target))))
}

pub fn txt_record(owner: &str, text: &str) -> Record {
    Record::from_rdata(name(owner), 300, RData::TXT(TXT::new(vec![text.to_string()])))
}

pub fn soa_record(zone: &str, serial: u32) -> Record {
    let soa = SOA::new(
        name(&format!("ns1.{zone}")),
        name(&format!("hostmaster.{zone}")),
        serial,
        7200,
        3600,
        1_209_600,
        300,
    );
    Record::from_rdata(name(zone), 3600, RData::SOA(soa))
}

pub fn nsec_record(owner: &str, next: &str) -> Record {
    let nsec = NSEC::new(name(next), vec![RecordType::A, RecordType::NSEC]);
    Record::from_rdata(name(owner), 300, RData::DNSSEC(DNSSECRData::NSEC(nsec)))
}
