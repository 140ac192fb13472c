//! Metainfo to connected peers
//!
//! [`Discovery`] ties the other modules together: it announces a parsed
//! torrent to all of its trackers at once, then handshakes with every peer
//! they returned, a bounded number at a time.
//!
//! ```no_run
//! use rdisc::{Discovery, DiscoveryConfig, Metainfo};
//! use tokio_util::sync::CancellationToken;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let metainfo = Metainfo::from_bytes(&std::fs::read("example.torrent")?)?;
//! let discovery = Discovery::new(DiscoveryConfig::default());
//!
//! let report = discovery.run(&metainfo, &CancellationToken::new()).await?;
//! for peer in &report.connected {
//!     println!("{} ({})", peer.addr, peer.peer_id);
//! }
//! # Ok(())
//! # }
//! ```

use crate::config::DiscoveryConfig;
use crate::metainfo::Metainfo;
use crate::peer::{handshake_all, PeerError, PeerId, RemotePeer};
use crate::tracker::{announce_all, AnnounceRequest, AnnounceSummary, TrackerError};
use std::net::SocketAddr;
use tokio_util::sync::CancellationToken;
use tracing::info;

pub struct Discovery {
    config: DiscoveryConfig,
    peer_id: PeerId,
}

/// Everything one discovery round produced.
#[derive(Debug)]
pub struct DiscoveryReport {
    pub announce: AnnounceSummary,
    /// Peers that completed the handshake
    pub connected: Vec<RemotePeer>,
    /// Peers that did not, each error naming its address
    pub failed: Vec<PeerError>,
}

impl Discovery {
    /// A pipeline announcing under a freshly generated peer id.
    pub fn new(config: DiscoveryConfig) -> Self {
        Self::with_peer_id(config, PeerId::generate())
    }

    pub fn with_peer_id(config: DiscoveryConfig, peer_id: PeerId) -> Self {
        Self { config, peer_id }
    }

    pub fn peer_id(&self) -> &PeerId {
        &self.peer_id
    }

    pub fn config(&self) -> &DiscoveryConfig {
        &self.config
    }

    /// Announces to every tracker of `metainfo` concurrently.
    pub async fn announce(
        &self,
        metainfo: &Metainfo,
        cancel: &CancellationToken,
    ) -> Result<AnnounceSummary, TrackerError> {
        let request = AnnounceRequest::new(metainfo, self.peer_id).with_port(self.config.port);
        announce_all(metainfo.trackers(), &request, &self.config.tracker, cancel).await
    }

    /// Handshakes with `peers`, splitting the outcomes.
    pub async fn handshake_peers(
        &self,
        metainfo: &Metainfo,
        peers: &[SocketAddr],
        cancel: &CancellationToken,
    ) -> (Vec<RemotePeer>, Vec<PeerError>) {
        let results = handshake_all(
            peers,
            &metainfo.info_hash,
            &self.peer_id,
            &self.config.peer,
            cancel,
        )
        .await;

        let mut connected = Vec::new();
        let mut failed = Vec::new();
        for result in results {
            match result {
                Ok(peer) => connected.push(peer),
                Err(e) => failed.push(e),
            }
        }
        (connected, failed)
    }

    /// Announces, then handshakes with every peer the trackers returned.
    ///
    /// Fails only when no tracker answered; peer failures are reported in
    /// [`DiscoveryReport::failed`].
    pub async fn run(
        &self,
        metainfo: &Metainfo,
        cancel: &CancellationToken,
    ) -> Result<DiscoveryReport, TrackerError> {
        let announce = self.announce(metainfo, cancel).await?;
        info!(
            info_hash = %metainfo.info_hash,
            trackers = announce.responses.len(),
            peers = announce.peers.len(),
            "announce round complete"
        );

        let (connected, failed) = self
            .handshake_peers(metainfo, &announce.peers, cancel)
            .await;
        info!(
            info_hash = %metainfo.info_hash,
            connected = connected.len(),
            failed = failed.len(),
            "handshake round complete"
        );

        Ok(DiscoveryReport {
            announce,
            connected,
            failed,
        })
    }
}
