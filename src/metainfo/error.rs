use thiserror::Error;

use crate::bencode::BencodeError;

/// Errors that can occur when parsing a torrent file.
///
/// [`MetainfoError::Bencode`] means the document is not valid bencode at
/// all; every other variant means it decoded but is not a usable torrent.
#[derive(Debug, Error)]
pub enum MetainfoError {
    /// The torrent file contains invalid bencode.
    #[error("bencode error: {0}")]
    Bencode(#[from] BencodeError),

    /// A required field is missing from the torrent file.
    #[error("missing field: {0}")]
    MissingField(&'static str),

    /// A field has an invalid value or type.
    #[error("invalid field: {0}")]
    InvalidField(&'static str),

    /// Neither `announce-list` nor `announce` yielded a tracker URL.
    #[error("no tracker url in announce or announce-list")]
    NoTrackers,

    /// An info hash string was not 40 hex characters.
    #[error("invalid info hash: {0}")]
    InvalidInfoHash(String),
}
