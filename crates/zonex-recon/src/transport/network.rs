//! Socket-backed transport: UDP with TCP fallback, optionally via SOCKS5.

use async_trait::async_trait;
use hickory_proto::op::{Message, ResponseCode};
use std::io;
use std::net::{Ipv4Addr, Ipv6Addr, SocketAddr};
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::net::{TcpStream, UdpSocket};
use tokio_socks::tcp::Socks5Stream;
use tracing::{debug, error, info};

use super::{ProxyConfig, Transport};
use crate::error::{ReconError, ReconResult};
use crate::xfr::{TransferCollector, TransferKind};

/// Largest datagram we accept.
const MAX_UDP_RESPONSE: usize = 65_535;

trait DnsStream: AsyncRead + AsyncWrite + Unpin + Send {}

impl<T: AsyncRead + AsyncWrite + Unpin + Send> DnsStream for T {}

/// Transport over real sockets.
///
/// Without a proxy, queries go over UDP and are retried over TCP when the
/// response is truncated. With a proxy, every exchange is DNS-over-TCP
/// through a SOCKS5 CONNECT tunnel. Zone transfers always use TCP.
#[derive(Debug, Clone, Default)]
pub struct NetworkTransport {
    proxy: Option<ProxyConfig>,
}

impl NetworkTransport {
    /// Transport talking to servers directly.
    #[must_use]
    pub const fn direct() -> Self {
        Self { proxy: None }
    }

    /// Transport tunnelling everything through a SOCKS5 proxy.
    #[must_use]
    pub const fn with_proxy(proxy: ProxyConfig) -> Self {
        Self { proxy: Some(proxy) }
    }

    /// Build the scan transport from an optional `host:port` proxy spec.
    ///
    /// A malformed spec is reported and the transport stays unproxied; the
    /// scan itself goes on.
    pub fn configure(proxy: Option<&str>) -> Self {
        match proxy.map(str::parse::<ProxyConfig>) {
            None => Self::direct(),
            Some(Ok(proxy)) => {
                info!(proxy = %proxy, "proxy enabled, routing DNS over SOCKS5");
                Self::with_proxy(proxy)
            }
            Some(Err(e)) => {
                error!(error = %e, "proxy disabled");
                Self::direct()
            }
        }
    }

    /// The active proxy, if any.
    #[must_use]
    pub const fn proxy(&self) -> Option<&ProxyConfig> {
        self.proxy.as_ref()
    }

    async fn connect(&self, server: SocketAddr) -> ReconResult<Box<dyn DnsStream>> {
        match &self.proxy {
            Some(proxy) => {
                let stream = Socks5Stream::connect((proxy.host(), proxy.port()), server).await?;
                Ok(Box::new(stream))
            }
            None => Ok(Box::new(TcpStream::connect(server).await?)),
        }
    }

    async fn exchange_tcp(
        &self,
        server: SocketAddr,
        bytes: &[u8],
        id: u16,
    ) -> ReconResult<Message> {
        let mut stream = self.connect(server).await?;
        write_frame(&mut stream, bytes).await?;
        loop {
            let frame = read_frame(&mut stream)
                .await?
                .ok_or_else(|| ReconError::Dns("connection closed before response".into()))?;
            let message = Message::from_vec(&frame)?;
            if message.id() == id {
                return Ok(message);
            }
        }
    }
}

#[async_trait]
impl Transport for NetworkTransport {
    async fn query(
        &self,
        server: SocketAddr,
        request: &Message,
        timeout: Duration,
    ) -> ReconResult<Message> {
        let bytes = request.to_vec()?;
        let id = request.id();

        let exchange = async {
            if self.proxy.is_some() {
                return self.exchange_tcp(server, &bytes, id).await;
            }
            let response = exchange_udp(server, &bytes, id).await?;
            if response.truncated() {
                debug!(server = %server, "truncated response, retrying over TCP");
                return self.exchange_tcp(server, &bytes, id).await;
            }
            Ok::<_, ReconError>(response)
        };

        tokio::time::timeout(timeout, exchange)
            .await
            .map_err(|_| ReconError::Timeout(timeout))?
    }

    async fn transfer(
        &self,
        server: SocketAddr,
        request: &Message,
        lifetime: Duration,
    ) -> ReconResult<Vec<Message>> {
        let kind = TransferKind::for_request(request)?;
        let bytes = request.to_vec()?;
        let id = request.id();

        let exchange = async {
            let mut stream = self.connect(server).await?;
            write_frame(&mut stream, &bytes).await?;

            let mut collector = TransferCollector::new(kind);
            let mut messages = Vec::new();
            while !collector.is_complete() {
                let Some(frame) = read_frame(&mut stream).await? else {
                    return Err(ReconError::Transfer(
                        "connection closed before transfer completed".into(),
                    ));
                };
                let message = Message::from_vec(&frame)?;
                if message.id() != id {
                    continue;
                }
                if message.response_code() != ResponseCode::NoError {
                    return Err(ReconError::Transfer(message.response_code().to_string()));
                }
                collector.feed(&message)?;
                messages.push(message);
            }
            Ok::<_, ReconError>(messages)
        };

        tokio::time::timeout(lifetime, exchange)
            .await
            .map_err(|_| ReconError::Timeout(lifetime))?
    }
}

async fn exchange_udp(server: SocketAddr, bytes: &[u8], id: u16) -> ReconResult<Message> {
    let bind: SocketAddr = if server.is_ipv4() {
        (Ipv4Addr::UNSPECIFIED, 0).into()
    } else {
        (Ipv6Addr::UNSPECIFIED, 0).into()
    };
    let socket = UdpSocket::bind(bind).await?;
    socket.connect(server).await?;
    socket.send(bytes).await?;

    let mut buf = vec![0u8; MAX_UDP_RESPONSE];
    loop {
        let len = socket.recv(&mut buf).await?;
        match Message::from_vec(&buf[..len]) {
            Ok(message) if message.id() == id => return Ok(message),
            Ok(message) => {
                debug!(expected = id, got = message.id(), "ignoring response with foreign id");
            }
            Err(e) => debug!(error = %e, "ignoring malformed datagram"),
        }
    }
}

/// Write one length-prefixed DNS message (RFC 1035 4.2.2).
async fn write_frame<S: AsyncWrite + Unpin>(stream: &mut S, bytes: &[u8]) -> ReconResult<()> {
    let len = u16::try_from(bytes.len())
        .map_err(|_| ReconError::Dns("message exceeds 65535 bytes".into()))?;
    stream.write_all(&len.to_be_bytes()).await?;
    stream.write_all(bytes).await?;
    stream.flush().await?;
    Ok(())
}

/// Read one length-prefixed DNS message; `None` on clean EOF.
async fn read_frame<S: AsyncRead + Unpin>(stream: &mut S) -> ReconResult<Option<Vec<u8>>> {
    let mut len = [0u8; 2];
    match stream.read_exact(&mut len).await {
        Ok(_) => {}
        Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => return Ok(None),
        Err(e) => return Err(e.into()),
    }
    let mut frame = vec![0u8; usize::from(u16::from_be_bytes(len))];
    stream.read_exact(&mut frame).await?;
    Ok(Some(frame))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::{build_axfr_query, build_query, parse_domain};
    use crate::transport::mock::{a_record, name, reply, soa_record};
    use crate::xfr::transfer_records;
    use hickory_proto::op::MessageType;
    use hickory_proto::rr::RecordType;
    use tokio::net::TcpListener;

    /// Serve one framed TCP exchange on a local port.
    ///
    /// With `linger` the server keeps the connection open after its last
    /// frame until the client hangs up; otherwise it closes straight away.
    async fn serve_tcp<F>(linger: bool, respond: F) -> SocketAddr
    where
        F: FnOnce(&Message) -> Vec<Message> + Send + 'static,
    {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.unwrap();
            let frame = read_frame(&mut stream).await.unwrap().unwrap();
            let request = Message::from_vec(&frame).unwrap();
            for message in respond(&request) {
                write_frame(&mut stream, &message.to_vec().unwrap()).await.unwrap();
            }
            if linger {
                let _ = read_frame(&mut stream).await;
            }
        });
        addr
    }

    /// An AXFR of example.com split across two messages.
    fn axfr_halves(request: &Message) -> Vec<Message> {
        vec![
            reply(
                request,
                vec![
                    soa_record("example.com.", 7),
                    a_record("www.example.com.", [192, 0, 2, 10], 300),
                ],
                Vec::new(),
            ),
            reply(
                request,
                vec![
                    a_record("vpn.example.com.", [10, 0, 0, 1], 300),
                    soa_record("example.com.", 7),
                ],
                Vec::new(),
            ),
        ]
    }

    #[test]
    fn configure_without_proxy_is_direct() {
        assert!(NetworkTransport::configure(None).proxy().is_none());
    }

    #[test]
    fn configure_with_valid_proxy() {
        let transport = NetworkTransport::configure(Some("127.0.0.1:9050"));
        assert_eq!(transport.proxy().map(ProxyConfig::port), Some(9050));
    }

    #[test]
    fn malformed_proxy_leaves_transport_unproxied() {
        let transport = NetworkTransport::configure(Some("127.0.0.1"));
        assert!(transport.proxy().is_none());
    }

    #[tokio::test]
    async fn frames_round_trip_through_a_buffer() {
        let (mut client, mut server) = tokio::io::duplex(1024);
        write_frame(&mut client, b"hello").await.unwrap();
        drop(client);
        assert_eq!(read_frame(&mut server).await.unwrap(), Some(b"hello".to_vec()));
        assert_eq!(read_frame(&mut server).await.unwrap(), None);
    }

    #[tokio::test]
    async fn udp_exchange_matches_ids() {
        let server = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let server_addr = server.local_addr().unwrap();

        let request = build_query(&parse_domain("example.com").unwrap(), RecordType::A, false);
        let request_id = request.id();

        tokio::spawn(async move {
            let mut buf = vec![0u8; 512];
            let (len, peer) = server.recv_from(&mut buf).await.unwrap();
            let query = Message::from_vec(&buf[..len]).unwrap();

            let mut stray = query.clone();
            stray.set_id(query.id().wrapping_add(1));
            stray.set_message_type(MessageType::Response);
            server.send_to(&stray.to_vec().unwrap(), peer).await.unwrap();

            let mut reply = query;
            reply.set_message_type(MessageType::Response);
            server.send_to(&reply.to_vec().unwrap(), peer).await.unwrap();
        });

        let response = NetworkTransport::direct()
            .query(server_addr, &request, Duration::from_secs(2))
            .await
            .unwrap();
        assert_eq!(response.id(), request_id);
        assert_eq!(response.message_type(), MessageType::Response);
    }

    #[tokio::test]
    async fn silent_server_times_out() {
        let server = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let request = build_query(&parse_domain("example.com").unwrap(), RecordType::A, false);
        let err = NetworkTransport::direct()
            .query(server.local_addr().unwrap(), &request, Duration::from_millis(100))
            .await
            .unwrap_err();
        assert!(matches!(err, ReconError::Timeout(_)));
    }

    #[tokio::test]
    async fn tcp_transfer_reads_frames_until_closing_soa() {
        let addr = serve_tcp(true, |request| {
            let mut stray = reply(
                request,
                vec![
                    soa_record("example.com.", 9),
                    a_record("stray.example.com.", [192, 0, 2, 66], 60),
                ],
                Vec::new(),
            );
            stray.set_id(request.id().wrapping_add(1));

            let mut messages = vec![stray];
            messages.extend(axfr_halves(request));
            messages
        })
        .await;

        let zone = name("example.com.");
        let messages = NetworkTransport::direct()
            .transfer(addr, &build_axfr_query(&zone), Duration::from_secs(2))
            .await
            .unwrap();
        assert_eq!(messages.len(), 2);

        let records = transfer_records(&zone, TransferKind::Full, &messages).unwrap();
        let names: Vec<&str> = records.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, ["example.com", "www.example.com", "vpn.example.com"]);
    }

    #[tokio::test]
    async fn refused_transfer_is_an_error() {
        let addr = serve_tcp(true, |request| {
            let mut refused = reply(request, Vec::new(), Vec::new());
            refused.set_response_code(ResponseCode::Refused);
            vec![refused]
        })
        .await;

        let err = NetworkTransport::direct()
            .transfer(addr, &build_axfr_query(&name("example.com.")), Duration::from_secs(2))
            .await
            .unwrap_err();
        assert!(matches!(err, ReconError::Transfer(_)), "{err:?}");
    }

    #[tokio::test]
    async fn transfer_cut_before_closing_soa_is_an_error() {
        let addr = serve_tcp(false, |request| {
            let mut halves = axfr_halves(request);
            halves.truncate(1);
            halves
        })
        .await;

        let err = NetworkTransport::direct()
            .transfer(addr, &build_axfr_query(&name("example.com.")), Duration::from_secs(2))
            .await
            .unwrap_err();
        assert!(matches!(err, ReconError::Transfer(_)), "{err:?}");
    }

    #[tokio::test]
    async fn truncated_udp_answer_is_retried_over_tcp() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let udp = UdpSocket::bind(addr).await.unwrap();

        tokio::spawn(async move {
            let mut buf = vec![0u8; 512];
            let (len, peer) = udp.recv_from(&mut buf).await.unwrap();
            let query = Message::from_vec(&buf[..len]).unwrap();
            let mut truncated = reply(&query, Vec::new(), Vec::new());
            truncated.set_truncated(true);
            udp.send_to(&truncated.to_vec().unwrap(), peer).await.unwrap();
        });
        tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.unwrap();
            let frame = read_frame(&mut stream).await.unwrap().unwrap();
            let query = Message::from_vec(&frame).unwrap();
            let full = reply(
                &query,
                vec![a_record("www.example.com.", [192, 0, 2, 10], 300)],
                Vec::new(),
            );
            write_frame(&mut stream, &full.to_vec().unwrap()).await.unwrap();
        });

        let request = build_query(&name("www.example.com."), RecordType::A, false);
        let response = NetworkTransport::direct()
            .query(addr, &request, Duration::from_secs(2))
            .await
            .unwrap();
        assert!(!response.truncated());
        assert_eq!(response.id(), request.id());
        assert_eq!(response.answers().len(), 1);
    }
}
