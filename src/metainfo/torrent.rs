use super::error::MetainfoError;
use super::info_hash::InfoHash;
use crate::bencode::{decode_prefix, raw_dict_value, Value};
use bytes::Bytes;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, trace};

/// A parsed torrent file.
///
/// Immutable once built. The tracker client and the peer handshake borrow it
/// for the info hash, the tracker list and the number of bytes left.
///
/// # Examples
///
/// ```
/// use rdisc::metainfo::Metainfo;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let mut data = b"d8:announce26:http://tracker.example/ann4:infod6:lengthi1024e\
/// 12:piece lengthi512e6:pieces40:".to_vec();
/// data.extend_from_slice(&[7u8; 40]);
/// data.extend_from_slice(b"ee");
///
/// let metainfo = Metainfo::from_bytes(&data)?;
/// assert_eq!(metainfo.total_length(), 1024);
/// assert_eq!(metainfo.piece_hashes().len(), 2);
/// assert_eq!(metainfo.trackers(), ["http://tracker.example/ann"]);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct Metainfo {
    /// The info dictionary containing file and piece information.
    pub info: Info,
    /// SHA-1 of the raw `info` bytes.
    pub info_hash: InfoHash,
    /// Primary tracker URL.
    pub announce: Option<String>,
    /// Multi-tier tracker list ([BEP-12](http://bittorrent.org/beps/bep_0012.html)).
    pub announce_list: Vec<Vec<String>>,
    /// Unix timestamp when the torrent was created.
    pub creation_date: Option<i64>,
    pub comment: Option<String>,
    /// Name/version of the program that created the torrent.
    pub created_by: Option<String>,
    trackers: Vec<String>,
    raw_info: Bytes,
}

/// The info dictionary from a torrent file.
#[derive(Debug, Clone)]
pub struct Info {
    /// Suggested name for the file or directory.
    pub name: Option<String>,
    /// Number of bytes per piece. Every piece but the last has this size.
    pub piece_length: u64,
    /// SHA-1 hash of each piece.
    pub pieces: Vec<[u8; 20]>,
    /// Files in the torrent; a single entry for single-file torrents.
    pub files: Vec<File>,
    /// Total size of all files combined.
    pub total_length: u64,
    /// If true, clients should only use trackers in the metainfo.
    pub private: bool,
}

/// A file within a torrent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct File {
    /// Path relative to the torrent root.
    pub path: PathBuf,
    pub length: u64,
    /// Byte offset of the file within the concatenated torrent content.
    pub offset: u64,
}

impl Metainfo {
    /// Parses a torrent file from raw bytes.
    ///
    /// The info hash is the SHA-1 of the `info` value's original byte range,
    /// located by re-running the decoder at the offset right after the
    /// top-level `info` key. Re-encoding the parsed dictionary is never used,
    /// since a foreign encoder may have written keys out of canonical order.
    ///
    /// # Errors
    ///
    /// - [`MetainfoError::Bencode`] if the data does not start with a valid
    ///   bencode value (bytes after that value, such as a final newline,
    ///   are ignored)
    /// - [`MetainfoError::MissingField`] / [`MetainfoError::InvalidField`]
    ///   if `info`, `piece length`, `pieces`, or both `length` and `files`
    ///   are absent or of the wrong type, or `pieces` is not a multiple of
    ///   20 bytes
    /// - [`MetainfoError::NoTrackers`] if no tracker URL can be found
    pub fn from_bytes(data: &[u8]) -> Result<Self, MetainfoError> {
        let (value, consumed) = decode_prefix(data)?;
        if consumed < data.len() {
            trace!(extra = data.len() - consumed, "ignoring bytes after torrent dictionary");
        }
        let dict = value.as_dict().ok_or(MetainfoError::InvalidField("root"))?;

        let info_value = dict
            .get(b"info".as_slice())
            .ok_or(MetainfoError::MissingField("info"))?;

        if info_value.as_dict().is_none() {
            return Err(MetainfoError::InvalidField("info"));
        }

        let info_span =
            raw_dict_value(data, b"info")?.ok_or(MetainfoError::MissingField("info"))?;
        let raw_info = Bytes::copy_from_slice(&data[info_span]);
        let info_hash = InfoHash::from_info_bytes(&raw_info);

        let info = parse_info(info_value)?;

        let announce = dict
            .get(b"announce".as_slice())
            .and_then(|v| v.as_str())
            .map(String::from);

        let announce_list = parse_announce_list(dict);
        let trackers = flatten_trackers(&announce_list, announce.as_deref());
        if trackers.is_empty() {
            return Err(MetainfoError::NoTrackers);
        }

        let creation_date = dict
            .get(b"creation date".as_slice())
            .and_then(|v| v.as_integer());

        let comment = dict
            .get(b"comment".as_slice())
            .and_then(|v| v.as_str())
            .map(String::from);

        let created_by = dict
            .get(b"created by".as_slice())
            .and_then(|v| v.as_str())
            .map(String::from);

        debug!(
            %info_hash,
            pieces = info.pieces.len(),
            total_length = info.total_length,
            trackers = trackers.len(),
            "parsed torrent metainfo"
        );

        Ok(Self {
            info,
            info_hash,
            announce,
            announce_list,
            creation_date,
            comment,
            created_by,
            trackers,
            raw_info,
        })
    }

    /// Tracker URLs in preference order.
    ///
    /// The tiers of `announce-list` are flattened in order; `announce` is
    /// only used when `announce-list` yields nothing. Repeated URLs keep
    /// their first position.
    pub fn trackers(&self) -> &[String] {
        &self.trackers
    }

    /// The exact bencoded bytes of the `info` dictionary as they appeared in
    /// the source document.
    pub fn raw_info(&self) -> &Bytes {
        &self.raw_info
    }

    pub fn total_length(&self) -> u64 {
        self.info.total_length
    }

    pub fn piece_length(&self) -> u64 {
        self.info.piece_length
    }

    pub fn piece_hashes(&self) -> &[[u8; 20]] {
        &self.info.pieces
    }

    pub fn piece_count(&self) -> usize {
        self.info.pieces.len()
    }

    /// Size of the piece at `index`; the last piece may be shorter.
    pub fn piece_size(&self, index: usize) -> Option<u64> {
        if index >= self.piece_count() {
            return None;
        }
        let start = self.info.piece_length.checked_mul(index as u64)?;
        let remaining = self.info.total_length.checked_sub(start)?;
        Some(remaining.min(self.info.piece_length))
    }
}

fn parse_announce_list(dict: &BTreeMap<Bytes, Value>) -> Vec<Vec<String>> {
    dict.get(b"announce-list".as_slice())
        .and_then(|v| v.as_list())
        .map(|tiers| {
            tiers
                .iter()
                .filter_map(|tier| {
                    tier.as_list().map(|urls| {
                        urls.iter()
                            .filter_map(|u| u.as_str().map(String::from))
                            .collect::<Vec<_>>()
                    })
                })
                .filter(|tier| !tier.is_empty())
                .collect()
        })
        .unwrap_or_default()
}

fn flatten_trackers(announce_list: &[Vec<String>], announce: Option<&str>) -> Vec<String> {
    let mut trackers: Vec<String> = Vec::new();

    for url in announce_list.iter().flatten() {
        if !url.is_empty() && !trackers.contains(url) {
            trackers.push(url.clone());
        }
    }

    if trackers.is_empty() {
        if let Some(url) = announce.filter(|u| !u.is_empty()) {
            trackers.push(url.to_string());
        }
    }

    trackers
}

fn parse_info(value: &Value) -> Result<Info, MetainfoError> {
    let dict = value.as_dict().ok_or(MetainfoError::InvalidField("info"))?;

    let name = dict
        .get(b"name".as_slice())
        .and_then(|v| v.as_str())
        .map(String::from);

    let piece_length = dict
        .get(b"piece length".as_slice())
        .ok_or(MetainfoError::MissingField("piece length"))?
        .as_u64()
        .filter(|&len| len > 0)
        .ok_or(MetainfoError::InvalidField("piece length"))?;

    let pieces_bytes = dict
        .get(b"pieces".as_slice())
        .ok_or(MetainfoError::MissingField("pieces"))?
        .as_bytes()
        .ok_or(MetainfoError::InvalidField("pieces"))?;

    if pieces_bytes.len() % 20 != 0 {
        return Err(MetainfoError::InvalidField("pieces"));
    }

    let pieces: Vec<[u8; 20]> = pieces_bytes
        .chunks_exact(20)
        .map(|chunk| {
            let mut arr = [0u8; 20];
            arr.copy_from_slice(chunk);
            arr
        })
        .collect();

    let private = dict
        .get(b"private".as_slice())
        .and_then(|v| v.as_integer())
        .is_some_and(|v| v == 1);

    let root = PathBuf::from(name.as_deref().unwrap_or_default());

    let (files, total_length) = if let Some(length) = dict.get(b"length".as_slice()) {
        let length = length
            .as_u64()
            .ok_or(MetainfoError::InvalidField("length"))?;
        let file = File {
            path: root,
            length,
            offset: 0,
        };
        (vec![file], length)
    } else if let Some(files) = dict.get(b"files".as_slice()) {
        let files_list = files
            .as_list()
            .ok_or(MetainfoError::InvalidField("files"))?;
        parse_files(files_list, &root)?
    } else {
        return Err(MetainfoError::MissingField("length or files"));
    };

    Ok(Info {
        name,
        piece_length,
        pieces,
        files,
        total_length,
        private,
    })
}

fn parse_files(files_list: &[Value], root: &Path) -> Result<(Vec<File>, u64), MetainfoError> {
    let mut files = Vec::with_capacity(files_list.len());
    let mut offset = 0u64;

    for file_value in files_list {
        let file_dict = file_value
            .as_dict()
            .ok_or(MetainfoError::InvalidField("files"))?;

        let length = file_dict
            .get(b"length".as_slice())
            .ok_or(MetainfoError::MissingField("file length"))?
            .as_u64()
            .ok_or(MetainfoError::InvalidField("file length"))?;

        let mut path = root.to_path_buf();
        if let Some(components) = file_dict.get(b"path".as_slice()) {
            let components = components
                .as_list()
                .ok_or(MetainfoError::InvalidField("file path"))?;
            for component in components {
                let component = component
                    .as_bytes()
                    .ok_or(MetainfoError::InvalidField("file path"))?;
                let component = String::from_utf8_lossy(component);
                if component == ".." || component.contains('/') || component.contains('\\') {
                    return Err(MetainfoError::InvalidField("file path"));
                }
                path.push(&*component);
            }
        }

        files.push(File {
            path,
            length,
            offset,
        });

        offset = offset
            .checked_add(length)
            .ok_or(MetainfoError::InvalidField("file length"))?;
    }

    Ok((files, offset))
}
