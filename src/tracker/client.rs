use super::error::TrackerError;
use super::http::HttpTracker;
use super::response::{AnnounceRequest, AnnounceResponse};
use super::udp::UdpTracker;
use crate::config::TrackerConfig;
use futures::future::join_all;
use std::collections::HashSet;
use std::net::SocketAddr;
use tokio::time::timeout;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// A tracker of either protocol, chosen once from the URL scheme.
pub enum Tracker {
    Http(HttpTracker),
    Udp(UdpTracker),
}

impl Tracker {
    pub async fn new(url: &str, config: &TrackerConfig) -> Result<Self, TrackerError> {
        let scheme = url
            .split_once("://")
            .map(|(scheme, _)| scheme.to_ascii_lowercase())
            .ok_or_else(|| TrackerError::InvalidUrl(url.to_string()))?;

        match scheme.as_str() {
            "http" | "https" => Ok(Tracker::Http(HttpTracker::new(url, config)?)),
            "udp" => Ok(Tracker::Udp(UdpTracker::new(url, config).await?)),
            _ => Err(TrackerError::UnsupportedProtocol(url.to_string())),
        }
    }

    pub async fn announce(
        &mut self,
        req: &AnnounceRequest,
    ) -> Result<AnnounceResponse, TrackerError> {
        match self {
            Tracker::Http(tracker) => tracker.announce(req).await,
            Tracker::Udp(tracker) => tracker.announce(req).await,
        }
    }

    pub fn url(&self) -> &str {
        match self {
            Tracker::Http(tracker) => tracker.url(),
            Tracker::Udp(tracker) => tracker.url(),
        }
    }
}

/// Outcome of announcing to a group of trackers.
#[derive(Debug, Default)]
pub struct AnnounceSummary {
    /// Successful announces, keyed by tracker URL, in input order
    pub responses: Vec<(String, AnnounceResponse)>,
    /// Trackers that failed; each error names its URL
    pub failures: Vec<TrackerError>,
    /// Every peer from every response, first occurrence wins
    pub peers: Vec<SocketAddr>,
}

/// Announces to every URL at once.
///
/// Each tracker gets its own deadline (`config.announce_timeout()`) and a
/// failure is local to that tracker. The call fails with
/// [`TrackerError::AllFailed`] only when no tracker succeeded.
pub async fn announce_all(
    urls: &[String],
    req: &AnnounceRequest,
    config: &TrackerConfig,
    cancel: &CancellationToken,
) -> Result<AnnounceSummary, TrackerError> {
    let attempts = urls.iter().map(|url| async move {
        let attempt = async {
            let mut tracker = Tracker::new(url, config).await?;
            tracker.announce(req).await
        };

        let result = tokio::select! {
            _ = cancel.cancelled() => Err(TrackerError::Cancelled { url: url.clone() }),
            result = timeout(config.announce_timeout(), attempt) => match result {
                Ok(result) => result,
                Err(_) => Err(TrackerError::unreachable(url, "announce timed out")),
            },
        };
        (url.clone(), result)
    });

    let mut summary = AnnounceSummary::default();
    let mut seen = HashSet::new();

    for (url, result) in join_all(attempts).await {
        match result {
            Ok(response) => {
                summary
                    .peers
                    .extend(response.peers.iter().copied().filter(|p| seen.insert(*p)));
                summary.responses.push((url, response));
            }
            Err(e) => {
                warn!(%url, error = %e, "tracker announce failed");
                summary.failures.push(e);
            }
        }
    }

    if summary.responses.is_empty() {
        return Err(TrackerError::AllFailed(summary.failures));
    }

    debug!(
        trackers = summary.responses.len(),
        failed = summary.failures.len(),
        peers = summary.peers.len(),
        "announce round complete"
    );
    Ok(summary)
}
