//! Tracker protocol (BEP-3, BEP-15, BEP-23)
//!
//! Announces to HTTP and UDP trackers and collects the peers they return.
//! The protocol is picked once from the URL scheme; [`announce_all`] runs
//! every tracker of a torrent concurrently and merges the results.

mod client;
mod error;
mod http;
mod response;
mod udp;

pub use client::{announce_all, AnnounceSummary, Tracker};
pub use error::TrackerError;
pub use http::HttpTracker;
pub use response::{
    parse_compact_peers, AnnounceRequest, AnnounceResponse, CompactPeer, TrackerEvent,
};
pub use udp::UdpTracker;
