use std::net::SocketAddr;

use thiserror::Error;

/// Handshake failures, each tied to the peer it concerns.
///
/// A failure against one peer never affects attempts against others.
#[derive(Debug, Error)]
pub enum PeerError {
    /// Connection refused, reset, closed early, or a deadline passed.
    #[error("peer {addr} unreachable: {reason}")]
    Unreachable { addr: SocketAddr, reason: String },

    /// The reply was not a BitTorrent handshake.
    #[error("peer {addr} sent an invalid handshake")]
    InvalidHandshake { addr: SocketAddr },

    /// The peer echoed a different info hash.
    #[error("peer {addr} answered for a different info hash")]
    Mismatch { addr: SocketAddr },

    /// The caller cancelled the attempt.
    #[error("handshake with {addr} cancelled")]
    Cancelled { addr: SocketAddr },
}

impl PeerError {
    pub fn addr(&self) -> SocketAddr {
        match self {
            PeerError::Unreachable { addr, .. }
            | PeerError::InvalidHandshake { addr }
            | PeerError::Mismatch { addr }
            | PeerError::Cancelled { addr } => *addr,
        }
    }

    pub(crate) fn unreachable(addr: SocketAddr, reason: impl ToString) -> Self {
        PeerError::Unreachable {
            addr,
            reason: reason.to_string(),
        }
    }
}
