use std::fmt;

use rand::Rng as _;

use crate::constants::CLIENT_PREFIX;

/// A 20-byte peer identifier.
///
/// Generated ids follow the Azureus-style format `-RD0100-<12 random bytes>`,
/// where `RD` identifies this client and `0100` its version.
///
/// ```
/// use rdisc::peer::PeerId;
///
/// let peer_id = PeerId::generate();
/// assert_eq!(peer_id.as_bytes().len(), 20);
/// assert_eq!(peer_id.client_id(), Some("RD0100"));
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct PeerId(pub [u8; 20]);

impl PeerId {
    /// Generates a new random peer ID with this client's prefix.
    pub fn generate() -> Self {
        let mut id = [0u8; 20];
        id[..8].copy_from_slice(CLIENT_PREFIX);
        rand::rng().fill(&mut id[8..]);
        Self(id)
    }

    /// Returns `None` unless the slice is exactly 20 bytes.
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        <[u8; 20]>::try_from(bytes).ok().map(Self)
    }

    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }

    /// Extracts the client identifier from an Azureus-style id.
    ///
    /// Returns the 6 characters between the dashes (e.g. `"UT3500"`), or
    /// `None` for other formats.
    pub fn client_id(&self) -> Option<&str> {
        if self.0[0] == b'-' && self.0[7] == b'-' {
            std::str::from_utf8(&self.0[1..7]).ok()
        } else {
            None
        }
    }
}

impl From<[u8; 20]> for PeerId {
    fn from(bytes: [u8; 20]) -> Self {
        Self(bytes)
    }
}

impl fmt::Debug for PeerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.client_id() {
            Some(client) => write!(f, "PeerId({})", client),
            None => write!(f, "PeerId({:02x?})", &self.0[..8]),
        }
    }
}

impl fmt::Display for PeerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in &self.0 {
            if byte.is_ascii_alphanumeric() || *byte == b'-' {
                write!(f, "{}", *byte as char)?;
            } else {
                write!(f, "%{:02x}", byte)?;
            }
        }
        Ok(())
    }
}
