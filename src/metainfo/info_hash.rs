use super::error::MetainfoError;
use sha1::{Digest, Sha1};
use std::fmt;

/// The 20-byte SHA-1 identity of a torrent.
///
/// Computed over the bytes of the `info` dictionary exactly as they appear
/// in the torrent file.
///
/// ```
/// use rdisc::metainfo::InfoHash;
///
/// let hash = InfoHash::from_hex("c12fe1c06bba254a9dc9f519b335aa7c1367a88a").unwrap();
/// assert_eq!(hash.as_bytes().len(), 20);
/// assert_eq!(hash.to_string(), "c12fe1c06bba254a9dc9f519b335aa7c1367a88a");
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct InfoHash(pub [u8; 20]);

impl InfoHash {
    /// Hashes a raw bencoded `info` dictionary.
    pub fn from_info_bytes(raw_info: &[u8]) -> Self {
        let mut hasher = Sha1::new();
        hasher.update(raw_info);
        Self(hasher.finalize().into())
    }

    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        <[u8; 20]>::try_from(bytes).ok().map(Self)
    }

    pub fn from_hex(s: &str) -> Result<Self, MetainfoError> {
        hex_decode(s)
            .as_deref()
            .and_then(Self::from_bytes)
            .ok_or_else(|| MetainfoError::InvalidInfoHash(s.to_string()))
    }

    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        self.0
            .iter()
            .fold(String::with_capacity(40), |mut s, b| {
                use std::fmt::Write;
                let _ = write!(s, "{:02x}", b);
                s
            })
    }
}

impl From<[u8; 20]> for InfoHash {
    fn from(bytes: [u8; 20]) -> Self {
        Self(bytes)
    }
}

impl fmt::Debug for InfoHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "InfoHash({})", self.to_hex())
    }
}

impl fmt::Display for InfoHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

fn hex_decode(s: &str) -> Option<Vec<u8>> {
    if s.len() % 2 != 0 || !s.is_ascii() {
        return None;
    }
    (0..s.len())
        .step_by(2)
        .map(|i| u8::from_str_radix(&s[i..i + 2], 16).ok())
        .collect()
}
