//! Protocol constants and default tuning parameters.
//!
//! Wire values come from BEP-3 (handshake, HTTP announce) and BEP-15 (UDP
//! announce). The timeouts are the defaults behind [`crate::config`].

use std::time::Duration;

// ============================================================================
// Client identification
// ============================================================================

/// Client ID prefix for peer ID generation (Azureus-style)
pub const CLIENT_PREFIX: &[u8; 8] = b"-RD0100-";

/// User agent string for HTTP tracker requests
pub const USER_AGENT: &str = "rdisc/0.1.0";

/// Default BitTorrent listen port reported to trackers
pub const DEFAULT_PORT: u16 = 6881;

// ============================================================================
// UDP tracker protocol (BEP-15)
// ============================================================================

/// Magic constant opening every connect request
pub const UDP_PROTOCOL_ID: u64 = 0x0417_2710_1980;

pub const ACTION_CONNECT: u32 = 0;
pub const ACTION_ANNOUNCE: u32 = 1;
pub const ACTION_ERROR: u32 = 3;

/// Connect request: protocol id, action, transaction id
pub const UDP_CONNECT_REQUEST_LEN: usize = 16;

/// Connect response: action, transaction id, connection id
pub const UDP_CONNECT_RESPONSE_LEN: usize = 16;

/// Announce request, fixed layout
pub const UDP_ANNOUNCE_REQUEST_LEN: usize = 98;

/// Announce response header: action, transaction id, interval, leechers, seeders
pub const UDP_ANNOUNCE_RESPONSE_LEN: usize = 20;

/// A connection id may be reused for this long after it was issued
pub const UDP_CONNECTION_ID_TTL: Duration = Duration::from_secs(60);

/// Receive buffer for tracker datagrams
pub const UDP_MAX_PACKET_SIZE: usize = 2048;

// ============================================================================
// Peer wire handshake (BEP-3)
// ============================================================================

pub const HANDSHAKE_PROTOCOL: &[u8; 19] = b"BitTorrent protocol";

/// 1 + 19 + 8 reserved + 20 info hash + 20 peer id
pub const HANDSHAKE_LEN: usize = 68;

/// Size of a compact IPv4 peer entry: 4 bytes address, 2 bytes port
pub const COMPACT_PEER_LEN: usize = 6;

// ============================================================================
// Timeouts and limits
// ============================================================================

/// HTTP tracker request timeout
pub const HTTP_TRACKER_TIMEOUT: Duration = Duration::from_secs(15);

/// Wait for each UDP tracker response
pub const UDP_TRACKER_TIMEOUT: Duration = Duration::from_secs(10);

/// Upper bound for one tracker's whole announce, retries included
pub const ANNOUNCE_TIMEOUT: Duration = Duration::from_secs(60);

/// TCP connect timeout for peer handshakes
pub const PEER_CONNECT_TIMEOUT: Duration = Duration::from_secs(3);

/// Deadline for the peer's handshake reply
pub const PEER_HANDSHAKE_TIMEOUT: Duration = Duration::from_secs(5);

/// Handshakes allowed in flight at once
pub const MAX_CONCURRENT_HANDSHAKES: usize = 50;
