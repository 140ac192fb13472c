use crate::constants::{COMPACT_PEER_LEN, DEFAULT_PORT};
use crate::metainfo::{InfoHash, Metainfo};
use crate::peer::PeerId;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr};

const COMPACT_PEER6_LEN: usize = 18;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TrackerEvent {
    #[default]
    None,
    Started,
    Stopped,
    Completed,
}

impl TrackerEvent {
    /// Value of the HTTP `event` parameter; empty means "omit it".
    pub fn as_str(&self) -> &'static str {
        match self {
            TrackerEvent::None => "",
            TrackerEvent::Started => "started",
            TrackerEvent::Stopped => "stopped",
            TrackerEvent::Completed => "completed",
        }
    }

    pub fn as_udp_id(&self) -> u32 {
        match self {
            TrackerEvent::None => 0,
            TrackerEvent::Completed => 1,
            TrackerEvent::Started => 2,
            TrackerEvent::Stopped => 3,
        }
    }
}

/// What we tell a tracker about ourselves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnnounceRequest {
    pub info_hash: InfoHash,
    pub peer_id: PeerId,
    pub port: u16,
    pub uploaded: u64,
    pub downloaded: u64,
    pub left: u64,
    pub event: TrackerEvent,
}

impl AnnounceRequest {
    /// A fresh-start announce: nothing transferred, everything left.
    pub fn new(metainfo: &Metainfo, peer_id: PeerId) -> Self {
        Self {
            info_hash: metainfo.info_hash,
            peer_id,
            port: DEFAULT_PORT,
            uploaded: 0,
            downloaded: 0,
            left: metainfo.total_length(),
            event: TrackerEvent::None,
        }
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn with_event(mut self, event: TrackerEvent) -> Self {
        self.event = event;
        self
    }
}

/// A tracker's answer to one announce.
///
/// Only `peers` is guaranteed; trackers may leave everything else out.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnnounceResponse {
    /// Seconds until the next regular announce
    pub interval: Option<u32>,
    pub min_interval: Option<u32>,
    /// Seeders
    pub complete: Option<u32>,
    /// Leechers
    pub incomplete: Option<u32>,
    pub peers: Vec<SocketAddr>,
    pub warning_message: Option<String>,
    pub tracker_id: Option<String>,
}

/// One 6-byte packed peer entry: IPv4 address then big-endian port.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompactPeer {
    pub ip: IpAddr,
    pub port: u16,
}

impl CompactPeer {
    pub fn from_v4_bytes(bytes: &[u8]) -> Option<Self> {
        if bytes.len() < COMPACT_PEER_LEN {
            return None;
        }
        let ip = Ipv4Addr::new(bytes[0], bytes[1], bytes[2], bytes[3]);
        let port = u16::from_be_bytes([bytes[4], bytes[5]]);
        Some(Self {
            ip: IpAddr::V4(ip),
            port,
        })
    }

    pub fn from_v6_bytes(bytes: &[u8]) -> Option<Self> {
        if bytes.len() < COMPACT_PEER6_LEN {
            return None;
        }
        let mut octets = [0u8; 16];
        octets.copy_from_slice(&bytes[..16]);
        let port = u16::from_be_bytes([bytes[16], bytes[17]]);
        Some(Self {
            ip: IpAddr::V6(Ipv6Addr::from(octets)),
            port,
        })
    }

    pub fn to_socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.ip, self.port)
    }
}

/// Splits a packed IPv4 peer list. A trailing partial entry is ignored.
pub fn parse_compact_peers(data: &[u8]) -> Vec<SocketAddr> {
    data.chunks_exact(COMPACT_PEER_LEN)
        .filter_map(CompactPeer::from_v4_bytes)
        .map(|p| p.to_socket_addr())
        .collect()
}

/// Splits a packed IPv6 peer list (BEP-7 `peers6`).
pub fn parse_compact_peers6(data: &[u8]) -> Vec<SocketAddr> {
    data.chunks_exact(COMPACT_PEER6_LEN)
        .filter_map(CompactPeer::from_v6_bytes)
        .map(|p| p.to_socket_addr())
        .collect()
}
