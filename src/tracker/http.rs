use super::error::TrackerError;
use super::response::{parse_compact_peers, parse_compact_peers6, AnnounceRequest, AnnounceResponse};
use crate::bencode::{decode_prefix, Value};
use crate::config::{RetryPolicy, TrackerConfig};
use reqwest::Client;
use std::net::{IpAddr, SocketAddr};
use tracing::{debug, trace};
use url::Url;

/// An HTTP(S) tracker (BEP-3, compact form per BEP-23).
pub struct HttpTracker {
    client: Client,
    url: String,
    retry: RetryPolicy,
}

impl HttpTracker {
    pub fn new(url: &str, config: &TrackerConfig) -> Result<Self, TrackerError> {
        let parsed = Url::parse(url).map_err(|_| TrackerError::InvalidUrl(url.to_string()))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(TrackerError::UnsupportedProtocol(url.to_string()));
        }

        let client = Client::builder()
            .timeout(config.http_timeout())
            .user_agent(config.user_agent.as_str())
            .build()
            .map_err(|e| TrackerError::unreachable(url, e))?;

        Ok(Self {
            client,
            url: url.to_string(),
            retry: config.retry.clone(),
        })
    }

    /// Announces once, re-sending on network failures as the retry policy
    /// allows. A `failure reason` from the tracker is returned as
    /// [`TrackerError::Failure`] and never retried.
    pub async fn announce(&self, req: &AnnounceRequest) -> Result<AnnounceResponse, TrackerError> {
        let attempts = self.retry.attempts();
        let mut attempt = 0;

        loop {
            match self.announce_once(req).await {
                Err(e) if e.is_retryable() && attempt + 1 < attempts => {
                    let delay = self.retry.delay_for_attempt(attempt);
                    debug!(url = %self.url, attempt, ?delay, error = %e, "retrying http announce");
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                result => return result,
            }
        }
    }

    async fn announce_once(&self, req: &AnnounceRequest) -> Result<AnnounceResponse, TrackerError> {
        let request_url = self.announce_url(req);
        debug!(url = %self.url, left = req.left, "sending http announce");

        let response = self.client.get(&request_url).send().await.map_err(|e| {
            if e.is_timeout() {
                TrackerError::unreachable(&self.url, "request timed out")
            } else {
                TrackerError::unreachable(&self.url, e)
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(TrackerError::unreachable(
                &self.url,
                format!("http status {}", status),
            ));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| TrackerError::unreachable(&self.url, e))?;

        let parsed = parse_announce_body(&self.url, &body)?;
        debug!(url = %self.url, peers = parsed.peers.len(), interval = ?parsed.interval, "http announce complete");
        Ok(parsed)
    }

    /// The announce URL with the request's query appended.
    pub fn announce_url(&self, req: &AnnounceRequest) -> String {
        let separator = if self.url.contains('?') { '&' } else { '?' };
        let mut url = format!(
            "{}{}info_hash={}&peer_id={}&port={}&uploaded={}&downloaded={}&left={}&compact=1",
            self.url,
            separator,
            url_encode(req.info_hash.as_bytes()),
            url_encode(req.peer_id.as_bytes()),
            req.port,
            req.uploaded,
            req.downloaded,
            req.left,
        );

        let event = req.event.as_str();
        if !event.is_empty() {
            url.push_str("&event=");
            url.push_str(event);
        }
        url
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

/// Interprets a bencoded announce reply from the tracker at `url`.
///
/// Anything after the root dictionary (often a newline) is ignored.
pub(crate) fn parse_announce_body(url: &str, body: &[u8]) -> Result<AnnounceResponse, TrackerError> {
    let (value, consumed) = decode_prefix(body).map_err(|e| TrackerError::invalid(url, e))?;
    if consumed < body.len() {
        trace!(%url, extra = body.len() - consumed, "ignoring bytes after announce body");
    }
    if value.as_dict().is_none() {
        return Err(TrackerError::invalid(url, "expected a dictionary"));
    }

    if let Some(reason) = value.get(b"failure reason").and_then(Value::as_bytes) {
        return Err(TrackerError::Failure {
            url: url.to_string(),
            reason: String::from_utf8_lossy(reason).into_owned(),
        });
    }

    let mut response = AnnounceResponse {
        interval: get_u32(&value, b"interval"),
        min_interval: get_u32(&value, b"min interval"),
        complete: get_u32(&value, b"complete"),
        incomplete: get_u32(&value, b"incomplete"),
        warning_message: get_string(&value, b"warning message"),
        tracker_id: get_string(&value, b"tracker id"),
        ..AnnounceResponse::default()
    };

    response.peers = match value.get(b"peers") {
        Some(Value::Bytes(packed)) => parse_compact_peers(packed),
        Some(Value::List(entries)) => entries.iter().filter_map(dict_peer).collect(),
        Some(other) => {
            return Err(TrackerError::invalid(
                url,
                format!("peers is a {}", other.kind()),
            ))
        }
        None => return Err(TrackerError::invalid(url, "missing peers")),
    };

    if let Some(packed) = value.get(b"peers6").and_then(Value::as_bytes) {
        response.peers.extend(parse_compact_peers6(packed));
    }

    Ok(response)
}

/// A peer from the non-compact form: `d2:ip<..>4:porti<..>e`.
fn dict_peer(entry: &Value) -> Option<SocketAddr> {
    let ip: IpAddr = entry.get(b"ip")?.as_str()?.parse().ok()?;
    let port = u16::try_from(entry.get(b"port")?.as_integer()?).ok()?;
    Some(SocketAddr::new(ip, port))
}

fn get_u32(dict: &Value, key: &[u8]) -> Option<u32> {
    dict.get(key)
        .and_then(Value::as_integer)
        .and_then(|v| u32::try_from(v).ok())
}

fn get_string(dict: &Value, key: &[u8]) -> Option<String> {
    dict.get(key)
        .and_then(Value::as_bytes)
        .map(|b| String::from_utf8_lossy(b).into_owned())
}

/// Percent-encodes everything outside the RFC 3986 unreserved set.
pub(crate) fn url_encode(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|&b| {
            if b.is_ascii_alphanumeric() || b == b'-' || b == b'_' || b == b'.' || b == b'~' {
                (b as char).to_string()
            } else {
                format!("%{:02X}", b)
            }
        })
        .collect()
}
