use super::error::PeerError;
use super::message::Handshake;
use super::peer_id::PeerId;
use super::transport::PeerTransport;
use crate::config::PeerConfig;
use crate::metainfo::InfoHash;
use futures::future::join_all;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// A peer that completed the handshake.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemotePeer {
    pub addr: SocketAddr,
    /// The id the peer reported for itself.
    pub peer_id: PeerId,
    /// The peer's reserved bytes (extension flags).
    pub reserved: [u8; 8],
}

/// Connects to `addr` and exchanges handshakes.
///
/// The connect and the reply each have their own deadline from `config`.
/// With `verify_info_hash` set, a reply carrying another info hash fails
/// with [`PeerError::Mismatch`].
///
/// ```no_run
/// use rdisc::config::PeerConfig;
/// use rdisc::metainfo::InfoHash;
/// use rdisc::peer::{handshake, PeerId};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let addr = "192.168.1.100:6881".parse()?;
/// let info_hash = InfoHash::from_hex("c12fe1c06bba254a9dc9f519b335aa7c1367a88a")?;
///
/// let remote = handshake(addr, &info_hash, &PeerId::generate(), &PeerConfig::default()).await?;
/// println!("{} is {}", remote.addr, remote.peer_id);
/// # Ok(())
/// # }
/// ```
pub async fn handshake(
    addr: SocketAddr,
    info_hash: &InfoHash,
    peer_id: &PeerId,
    config: &PeerConfig,
) -> Result<RemotePeer, PeerError> {
    let mut transport =
        PeerTransport::connect(addr, config.connect_timeout(), config.read_timeout()).await?;

    let ours = Handshake::new(*info_hash.as_bytes(), *peer_id.as_bytes());
    transport.send_handshake(&ours).await?;

    let theirs = transport.receive_handshake().await?;

    if config.verify_info_hash && theirs.info_hash != ours.info_hash {
        return Err(PeerError::Mismatch { addr });
    }

    let remote = RemotePeer {
        addr,
        peer_id: PeerId(theirs.peer_id),
        reserved: theirs.reserved,
    };
    debug!(%addr, peer_id = %remote.peer_id, "peer handshake complete");

    Ok(remote)
}

/// Handshakes with every address concurrently.
///
/// At most `config.max_concurrent` connections are open at once. Results
/// come back in the order of `addrs`; one peer failing does not affect the
/// others. Cancelling `cancel` aborts every attempt still in flight and
/// reports it as [`PeerError::Cancelled`].
pub async fn handshake_all(
    addrs: &[SocketAddr],
    info_hash: &InfoHash,
    peer_id: &PeerId,
    config: &PeerConfig,
    cancel: &CancellationToken,
) -> Vec<Result<RemotePeer, PeerError>> {
    let limit = Arc::new(Semaphore::new(config.max_concurrent.max(1)));

    let attempts = addrs.iter().map(|&addr| {
        let limit = Arc::clone(&limit);
        async move {
            let attempt = async {
                let _permit = limit
                    .acquire()
                    .await
                    .map_err(|_| PeerError::Cancelled { addr })?;
                handshake(addr, info_hash, peer_id, config).await
            };

            let result = tokio::select! {
                _ = cancel.cancelled() => Err(PeerError::Cancelled { addr }),
                result = attempt => result,
            };

            if let Err(ref e) = result {
                debug!(%addr, error = %e, "peer handshake failed");
            }
            result
        }
    });

    join_all(attempts).await
}
