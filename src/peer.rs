//! Peer wire handshake (BEP-3)
//!
//! Opens a TCP connection to a peer, exchanges the fixed 68-byte handshake
//! and returns the peer's self-reported id. Message exchange after the
//! handshake is not part of this crate.

mod error;
mod handshake;
mod message;
mod peer_id;
mod transport;

pub use error::PeerError;
pub use handshake::{handshake, handshake_all, RemotePeer};
pub use message::Handshake;
pub use peer_id::PeerId;
pub use transport::PeerTransport;
