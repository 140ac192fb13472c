use super::error::TrackerError;
use super::response::{
    parse_compact_peers, parse_compact_peers6, AnnounceRequest, AnnounceResponse,
};
use crate::config::{RetryPolicy, TrackerConfig};
use crate::constants::{
    ACTION_ANNOUNCE, ACTION_CONNECT, ACTION_ERROR, UDP_ANNOUNCE_REQUEST_LEN,
    UDP_ANNOUNCE_RESPONSE_LEN, UDP_CONNECTION_ID_TTL, UDP_CONNECT_REQUEST_LEN,
    UDP_CONNECT_RESPONSE_LEN, UDP_MAX_PACKET_SIZE, UDP_PROTOCOL_ID,
};
use bytes::{Buf, BufMut, Bytes, BytesMut};
use rand::Rng as _;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::{lookup_host, UdpSocket};
use tokio::time::{timeout_at, Instant};
use tracing::{debug, trace};
use url::Url;

/// A UDP tracker (BEP-15).
///
/// The socket is connected to the tracker, so datagrams from other sources
/// never reach us. Replies are matched to requests by transaction id; a
/// datagram carrying any other id is dropped and the wait continues until
/// the phase deadline.
pub struct UdpTracker {
    url: String,
    socket: UdpSocket,
    addr: SocketAddr,
    timeout: Duration,
    retry: RetryPolicy,
    key: u32,
    connection: Option<(u64, Instant)>,
}

/// A reply whose transaction id matched, with the header already read.
struct Reply {
    action: u32,
    payload: Bytes,
}

impl UdpTracker {
    /// Resolves `udp://host:port[/path]` and binds a local socket for it.
    pub async fn new(url: &str, config: &TrackerConfig) -> Result<Self, TrackerError> {
        let parsed = Url::parse(url).map_err(|_| TrackerError::InvalidUrl(url.to_string()))?;
        if parsed.scheme() != "udp" {
            return Err(TrackerError::UnsupportedProtocol(url.to_string()));
        }
        let host = parsed
            .host_str()
            .map(|h| h.trim_start_matches('[').trim_end_matches(']'))
            .ok_or_else(|| TrackerError::InvalidUrl(url.to_string()))?;
        let port = parsed
            .port()
            .ok_or_else(|| TrackerError::InvalidUrl(url.to_string()))?;

        let addr = lookup_host((host, port))
            .await
            .map_err(|e| TrackerError::unreachable(url, e))?
            .next()
            .ok_or_else(|| TrackerError::unreachable(url, "host did not resolve"))?;

        let bind_addr = if addr.is_ipv4() { "0.0.0.0:0" } else { "[::]:0" };
        let socket = UdpSocket::bind(bind_addr)
            .await
            .map_err(|e| TrackerError::unreachable(url, e))?;
        socket
            .connect(addr)
            .await
            .map_err(|e| TrackerError::unreachable(url, e))?;

        Ok(Self {
            url: url.to_string(),
            socket,
            addr,
            timeout: config.udp_timeout(),
            retry: config.retry.clone(),
            key: rand::rng().random(),
            connection: None,
        })
    }

    /// Runs the connect phase (unless a connection id is still fresh) and
    /// then the announce phase.
    pub async fn announce(
        &mut self,
        req: &AnnounceRequest,
    ) -> Result<AnnounceResponse, TrackerError> {
        let connection_id = match self.fresh_connection() {
            Some(id) => id,
            None => {
                let id = self.connect().await?;
                self.connection = Some((id, Instant::now()));
                id
            }
        };

        let result = self.announce_with(connection_id, req).await;
        if result.is_err() {
            self.connection = None;
        }
        result
    }

    fn fresh_connection(&self) -> Option<u64> {
        match self.connection {
            Some((id, issued)) if issued.elapsed() < UDP_CONNECTION_ID_TTL => Some(id),
            _ => None,
        }
    }

    async fn connect(&self) -> Result<u64, TrackerError> {
        let transaction_id: u32 = rand::rng().random();

        let mut request = BytesMut::with_capacity(UDP_CONNECT_REQUEST_LEN);
        request.put_u64(UDP_PROTOCOL_ID);
        request.put_u32(ACTION_CONNECT);
        request.put_u32(transaction_id);

        debug!(url = %self.url, transaction_id, "sending udp connect");
        let mut reply = self.exchange(&request, transaction_id).await?;

        if reply.action != ACTION_CONNECT {
            return Err(TrackerError::unreachable(
                &self.url,
                format!("unexpected action {} in connect response", reply.action),
            ));
        }
        if reply.payload.len() < UDP_CONNECT_RESPONSE_LEN - 8 {
            return Err(TrackerError::unreachable(&self.url, "connect response too short"));
        }

        Ok(reply.payload.get_u64())
    }

    async fn announce_with(
        &self,
        connection_id: u64,
        req: &AnnounceRequest,
    ) -> Result<AnnounceResponse, TrackerError> {
        let transaction_id: u32 = rand::rng().random();

        let mut request = BytesMut::with_capacity(UDP_ANNOUNCE_REQUEST_LEN);
        request.put_u64(connection_id);
        request.put_u32(ACTION_ANNOUNCE);
        request.put_u32(transaction_id);
        request.put_slice(req.info_hash.as_bytes());
        request.put_slice(req.peer_id.as_bytes());
        request.put_u64(req.downloaded);
        request.put_u64(req.left);
        request.put_u64(req.uploaded);
        request.put_u32(req.event.as_udp_id());
        request.put_u32(0); // IP address: use the sender's
        request.put_u32(self.key);
        request.put_i32(-1); // num_want: tracker default
        request.put_u16(req.port);

        debug!(url = %self.url, transaction_id, "sending udp announce");
        let mut reply = self.exchange(&request, transaction_id).await?;

        if reply.action != ACTION_ANNOUNCE {
            return Err(TrackerError::unreachable(
                &self.url,
                format!("unexpected action {} in announce response", reply.action),
            ));
        }
        if reply.payload.len() < UDP_ANNOUNCE_RESPONSE_LEN - 8 {
            return Err(TrackerError::unreachable(&self.url, "announce response too short"));
        }

        let interval = reply.payload.get_u32();
        let leechers = reply.payload.get_u32();
        let seeders = reply.payload.get_u32();

        // BEP-15: the peer address family follows the tracker's.
        let peers = if self.addr.is_ipv6() {
            parse_compact_peers6(&reply.payload)
        } else {
            parse_compact_peers(&reply.payload)
        };

        let response = AnnounceResponse {
            interval: Some(interval),
            complete: Some(seeders),
            incomplete: Some(leechers),
            peers,
            ..AnnounceResponse::default()
        };
        debug!(url = %self.url, peers = response.peers.len(), interval, "udp announce complete");
        Ok(response)
    }

    /// Sends `request` and waits for the reply carrying `transaction_id`,
    /// re-sending after a timeout as the retry policy allows.
    async fn exchange(&self, request: &[u8], transaction_id: u32) -> Result<Reply, TrackerError> {
        let attempts = self.retry.attempts();
        let mut attempt = 0;

        loop {
            self.socket
                .send(request)
                .await
                .map_err(|e| TrackerError::unreachable(&self.url, e))?;

            match self.receive(transaction_id).await {
                Err(e) if e.is_retryable() && attempt + 1 < attempts => {
                    let delay = self.retry.delay_for_attempt(attempt);
                    debug!(url = %self.url, attempt, ?delay, error = %e, "retrying udp request");
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                result => return result,
            }
        }
    }

    async fn receive(&self, transaction_id: u32) -> Result<Reply, TrackerError> {
        let deadline = Instant::now() + self.timeout;
        let mut buf = vec![0u8; UDP_MAX_PACKET_SIZE];

        loop {
            let n = match timeout_at(deadline, self.socket.recv(&mut buf)).await {
                Err(_) => {
                    return Err(TrackerError::unreachable(
                        &self.url,
                        "timed out waiting for response",
                    ))
                }
                Ok(Err(e)) => return Err(TrackerError::unreachable(&self.url, e)),
                Ok(Ok(n)) => n,
            };

            if n < 8 {
                trace!(url = %self.url, len = n, "discarding runt datagram");
                continue;
            }

            let mut datagram = Bytes::copy_from_slice(&buf[..n]);
            let action = datagram.get_u32();
            let reply_tid = datagram.get_u32();

            if reply_tid != transaction_id {
                debug!(
                    url = %self.url,
                    expected = transaction_id,
                    got = reply_tid,
                    "discarding datagram with foreign transaction id"
                );
                continue;
            }

            if action == ACTION_ERROR {
                return Err(TrackerError::Failure {
                    url: self.url.clone(),
                    reason: String::from_utf8_lossy(&datagram).into_owned(),
                });
            }

            return Ok(Reply {
                action,
                payload: datagram,
            });
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }
}
