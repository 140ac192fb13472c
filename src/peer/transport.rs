use super::error::PeerError;
use super::message::Handshake;
use crate::constants::HANDSHAKE_LEN;
use bytes::BytesMut;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::time::timeout;

/// A TCP stream to one peer with deadline-bounded handshake I/O.
pub struct PeerTransport {
    stream: TcpStream,
    addr: SocketAddr,
    read_buf: BytesMut,
    io_timeout: Duration,
}

impl PeerTransport {
    /// Opens a connection, failing with `Unreachable` if it takes longer
    /// than `connect_timeout`.
    pub async fn connect(
        addr: SocketAddr,
        connect_timeout: Duration,
        io_timeout: Duration,
    ) -> Result<Self, PeerError> {
        let stream = timeout(connect_timeout, TcpStream::connect(addr))
            .await
            .map_err(|_| PeerError::unreachable(addr, "connect timed out"))?
            .map_err(|e| PeerError::unreachable(addr, e))?;

        Ok(Self::new(stream, addr, io_timeout))
    }

    pub fn new(stream: TcpStream, addr: SocketAddr, io_timeout: Duration) -> Self {
        Self {
            stream,
            addr,
            read_buf: BytesMut::with_capacity(HANDSHAKE_LEN),
            io_timeout,
        }
    }

    pub async fn send_handshake(&mut self, handshake: &Handshake) -> Result<(), PeerError> {
        let data = handshake.encode();
        timeout(self.io_timeout, self.stream.write_all(&data))
            .await
            .map_err(|_| PeerError::unreachable(self.addr, "write timed out"))?
            .map_err(|e| PeerError::unreachable(self.addr, e))?;
        Ok(())
    }

    /// Reads exactly one 68-byte handshake, however many reads it takes.
    ///
    /// The deadline covers the whole message, not each read.
    pub async fn receive_handshake(&mut self) -> Result<Handshake, PeerError> {
        let addr = self.addr;
        let stream = &mut self.stream;
        let read_buf = &mut self.read_buf;
        let read_all = async move {
            while read_buf.len() < HANDSHAKE_LEN {
                let n = stream.read_buf(&mut *read_buf).await?;
                if n == 0 {
                    return Err(std::io::Error::from(std::io::ErrorKind::UnexpectedEof));
                }
            }
            Ok::<(), std::io::Error>(())
        };

        timeout(self.io_timeout, read_all)
            .await
            .map_err(|_| PeerError::unreachable(addr, "handshake timed out"))?
            .map_err(|e| match e.kind() {
                std::io::ErrorKind::UnexpectedEof => {
                    PeerError::unreachable(addr, "connection closed during handshake")
                }
                _ => PeerError::unreachable(addr, e),
            })?;

        let data = self.read_buf.split_to(HANDSHAKE_LEN);
        Handshake::decode(&data).ok_or(PeerError::InvalidHandshake { addr })
    }
}
