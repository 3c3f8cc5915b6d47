//! DNS transport: the single socket factory shared by every probe of a scan.
//!
//! All network I/O of the engine goes through [`Transport`], so routing the
//! whole scan through a SOCKS5 proxy is a matter of building one
//! [`NetworkTransport`] with a proxy and handing it to the scanner.

mod network;
mod proxy;

#[cfg(test)]
pub(crate) mod mock;

use async_trait::async_trait;
use hickory_proto::op::Message;
use std::net::SocketAddr;
use std::time::Duration;

use crate::error::ReconResult;

pub use network::NetworkTransport;
pub use proxy::ProxyConfig;

/// Request/response exchange with a DNS server.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send one query and wait up to `timeout` for the matching response.
    ///
    /// Responses with an error response code are returned as-is; only
    /// transport-level failures are errors.
    async fn query(
        &self,
        server: SocketAddr,
        request: &Message,
        timeout: Duration,
    ) -> ReconResult<Message>;

    /// Run a zone transfer (AXFR/IXFR) and return every response message.
    ///
    /// The whole exchange is bounded by `lifetime`. A refused or incomplete
    /// transfer is an error.
    async fn transfer(
        &self,
        server: SocketAddr,
        request: &Message,
        lifetime: Duration,
    ) -> ReconResult<Vec<Message>>;
}
