//! rdisc - BitTorrent metadata and peer discovery
//!
//! Parses torrent files, announces them to HTTP and UDP trackers and
//! performs the peer wire handshake with the peers the trackers return,
//! following the BEP (BitTorrent Enhancement Proposals) specifications.
//!
//! # Modules
//!
//! - [`bencode`] - BEP-3 Bencode encoding/decoding
//! - [`metainfo`] - BEP-3 Torrent metainfo and info hash
//! - [`tracker`] - BEP-3/15/23 HTTP and UDP tracker announces
//! - [`peer`] - BEP-3 Peer wire handshake
//! - [`discovery`] - The metainfo -> trackers -> peers pipeline
//! - [`config`] - Timeouts, retries and concurrency limits

pub mod bencode;
pub mod config;
pub mod constants;
pub mod discovery;
pub mod metainfo;
pub mod peer;
pub mod tracker;

pub use bencode::{decode, encode, BencodeError, Value};
pub use config::{DiscoveryConfig, PeerConfig, RetryPolicy, TrackerConfig};
pub use discovery::{Discovery, DiscoveryReport};
pub use metainfo::{File, Info, InfoHash, Metainfo, MetainfoError};
pub use peer::{handshake, handshake_all, Handshake, PeerError, PeerId, RemotePeer};
pub use tracker::{
    announce_all, AnnounceRequest, AnnounceResponse, AnnounceSummary, CompactPeer, HttpTracker,
    Tracker, TrackerError, TrackerEvent, UdpTracker,
};
