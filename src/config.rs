//! Discovery configuration
//!
//! Timeouts, retry policy and concurrency limits for tracker announces and
//! peer handshakes. Every struct implements [`Default`] with the reference
//! behavior (single attempt, 10 s UDP wait, 3 s/5 s peer deadlines) and
//! deserializes with `#[serde(default)]`, so a partial config is enough.

use crate::constants::{
    ANNOUNCE_TIMEOUT, DEFAULT_PORT, HTTP_TRACKER_TIMEOUT, MAX_CONCURRENT_HANDSHAKES,
    PEER_CONNECT_TIMEOUT, PEER_HANDSHAKE_TIMEOUT, UDP_TRACKER_TIMEOUT, USER_AGENT,
};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Top-level configuration for [`crate::Discovery`]
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DiscoveryConfig {
    /// Listen port reported to trackers
    pub port: u16,

    /// Tracker announce settings
    pub tracker: TrackerConfig,

    /// Peer handshake settings
    pub peer: PeerConfig,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            tracker: TrackerConfig::default(),
            peer: PeerConfig::default(),
        }
    }
}

/// Tracker-specific configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    /// HTTP request timeout in milliseconds
    pub http_timeout_ms: u64,

    /// Wait for each UDP response in milliseconds
    pub udp_timeout_ms: u64,

    /// Deadline for one tracker's whole announce (retries included)
    pub announce_timeout_ms: u64,

    /// User agent for HTTP trackers
    pub user_agent: String,

    /// Re-send policy for unreachable trackers
    pub retry: RetryPolicy,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            http_timeout_ms: HTTP_TRACKER_TIMEOUT.as_millis() as u64,
            udp_timeout_ms: UDP_TRACKER_TIMEOUT.as_millis() as u64,
            announce_timeout_ms: ANNOUNCE_TIMEOUT.as_millis() as u64,
            user_agent: USER_AGENT.to_string(),
            retry: RetryPolicy::default(),
        }
    }
}

impl TrackerConfig {
    pub fn http_timeout(&self) -> Duration {
        Duration::from_millis(self.http_timeout_ms)
    }

    pub fn udp_timeout(&self) -> Duration {
        Duration::from_millis(self.udp_timeout_ms)
    }

    pub fn announce_timeout(&self) -> Duration {
        Duration::from_millis(self.announce_timeout_ms)
    }
}

/// Peer handshake configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PeerConfig {
    /// TCP connect timeout in milliseconds
    pub connect_timeout_ms: u64,

    /// Deadline for the handshake reply in milliseconds
    pub read_timeout_ms: u64,

    /// Handshakes in flight at once
    pub max_concurrent: usize,

    /// Reject peers whose handshake echoes a different info hash
    pub verify_info_hash: bool,
}

impl Default for PeerConfig {
    fn default() -> Self {
        Self {
            connect_timeout_ms: PEER_CONNECT_TIMEOUT.as_millis() as u64,
            read_timeout_ms: PEER_HANDSHAKE_TIMEOUT.as_millis() as u64,
            max_concurrent: MAX_CONCURRENT_HANDSHAKES,
            verify_info_hash: true,
        }
    }
}

impl PeerConfig {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    pub fn read_timeout(&self) -> Duration {
        Duration::from_millis(self.read_timeout_ms)
    }
}

/// Retry policy with exponential backoff and jitter
///
/// `max_attempts` counts the first try, so the default of 1 never re-sends.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryPolicy {
    /// Total attempts, including the first
    pub max_attempts: u32,
    /// Delay before the first re-send in milliseconds
    pub initial_delay_ms: u64,
    /// Upper bound for any delay in milliseconds
    pub max_delay_ms: u64,
    /// Jitter factor (0.0 to 1.0)
    pub jitter_factor: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 1,
            initial_delay_ms: 1000,
            max_delay_ms: 30000,
            jitter_factor: 0.0,
        }
    }
}

impl RetryPolicy {
    /// A policy making `max_attempts` tries with exponential backoff
    pub fn exponential(max_attempts: u32, initial_delay: Duration, max_delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            initial_delay_ms: initial_delay.as_millis() as u64,
            max_delay_ms: max_delay.as_millis() as u64,
            jitter_factor: 0.25,
        }
    }

    /// A policy that never re-sends
    pub fn none() -> Self {
        Self::default()
    }

    /// Attempts to make, never less than one
    pub fn attempts(&self) -> u32 {
        self.max_attempts.max(1)
    }

    /// Delay to wait after the failed attempt `attempt` (0-indexed)
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let base = self
            .initial_delay_ms
            .saturating_mul(2u64.saturating_pow(attempt.min(16)));
        let capped = base.min(self.max_delay_ms);

        if self.jitter_factor <= 0.0 {
            return Duration::from_millis(capped);
        }

        let jitter = (rand::random::<f64>() - 0.5) * 2.0 * self.jitter_factor.min(1.0);
        Duration::from_millis((capped as f64 * (1.0 + jitter)) as u64)
    }
}
