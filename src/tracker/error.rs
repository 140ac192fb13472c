use thiserror::Error;

/// A failed announce, attributed to the tracker URL it concerns.
#[derive(Debug, Error)]
pub enum TrackerError {
    /// The tracker answered and rejected the request.
    #[error("{url}: tracker rejected announce: {reason}")]
    Failure { url: String, reason: String },

    /// No usable answer: timeout, refused connection, DNS failure,
    /// non-2xx status or a protocol-level mismatch.
    #[error("{url}: tracker unreachable: {reason}")]
    Unreachable { url: String, reason: String },

    /// The tracker answered but the reply lacks what an announce needs.
    #[error("{url}: invalid tracker response: {reason}")]
    InvalidResponse { url: String, reason: String },

    #[error("invalid tracker url: {0}")]
    InvalidUrl(String),

    #[error("unsupported tracker protocol: {0}")]
    UnsupportedProtocol(String),

    #[error("{url}: announce cancelled")]
    Cancelled { url: String },

    #[error("all {} trackers failed", .0.len())]
    AllFailed(Vec<TrackerError>),
}

impl TrackerError {
    pub(crate) fn unreachable(url: &str, reason: impl ToString) -> Self {
        Self::Unreachable {
            url: url.to_string(),
            reason: reason.to_string(),
        }
    }

    pub(crate) fn invalid(url: &str, reason: impl ToString) -> Self {
        Self::InvalidResponse {
            url: url.to_string(),
            reason: reason.to_string(),
        }
    }

    /// Whether a [`RetryPolicy`](crate::config::RetryPolicy) may re-send.
    ///
    /// Only network-level failures qualify; an explicit rejection is final.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Unreachable { .. })
    }

    /// The tracker this error concerns, if it concerns exactly one.
    pub fn url(&self) -> Option<&str> {
        match self {
            Self::Failure { url, .. }
            | Self::Unreachable { url, .. }
            | Self::InvalidResponse { url, .. }
            | Self::Cancelled { url } => Some(url),
            Self::InvalidUrl(url) | Self::UnsupportedProtocol(url) => Some(url),
            Self::AllFailed(_) => None,
        }
    }
}
