use crate::constants::{HANDSHAKE_LEN, HANDSHAKE_PROTOCOL};
use bytes::{BufMut, Bytes, BytesMut};

/// The fixed 68-byte opening message of the peer wire protocol.
///
/// ```text
/// <19><"BitTorrent protocol"><8 reserved><20 info hash><20 peer id>
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Handshake {
    pub info_hash: [u8; 20],
    pub peer_id: [u8; 20],
    pub reserved: [u8; 8],
}

impl Handshake {
    /// A handshake advertising no extensions (all reserved bits zero).
    pub fn new(info_hash: [u8; 20], peer_id: [u8; 20]) -> Self {
        Self {
            info_hash,
            peer_id,
            reserved: [0u8; 8],
        }
    }

    pub fn supports_extension_protocol(&self) -> bool {
        (self.reserved[5] & 0x10) != 0
    }

    pub fn supports_fast_extension(&self) -> bool {
        (self.reserved[7] & 0x04) != 0
    }

    pub fn supports_dht(&self) -> bool {
        (self.reserved[7] & 0x01) != 0
    }

    pub fn encode(&self) -> Bytes {
        let mut buf = BytesMut::with_capacity(HANDSHAKE_LEN);
        buf.put_u8(HANDSHAKE_PROTOCOL.len() as u8);
        buf.put_slice(HANDSHAKE_PROTOCOL);
        buf.put_slice(&self.reserved);
        buf.put_slice(&self.info_hash);
        buf.put_slice(&self.peer_id);
        buf.freeze()
    }

    /// Parses a complete 68-byte handshake.
    ///
    /// Returns `None` for any other length or a wrong protocol string.
    pub fn decode(data: &[u8]) -> Option<Self> {
        if data.len() != HANDSHAKE_LEN {
            return None;
        }

        if data[0] as usize != HANDSHAKE_PROTOCOL.len() || &data[1..20] != HANDSHAKE_PROTOCOL {
            return None;
        }

        let mut reserved = [0u8; 8];
        reserved.copy_from_slice(&data[20..28]);

        let mut info_hash = [0u8; 20];
        info_hash.copy_from_slice(&data[28..48]);

        let mut peer_id = [0u8; 20];
        peer_id.copy_from_slice(&data[48..68]);

        Some(Self {
            info_hash,
            peer_id,
            reserved,
        })
    }
}
