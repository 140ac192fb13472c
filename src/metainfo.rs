//! Torrent metainfo handling ([BEP-3]).
//!
//! A torrent file (`.torrent`) is a bencoded dictionary holding:
//!
//! - **info** - the hashed core metadata
//!   - `name` - suggested file/directory name
//!   - `piece length` - size of each piece in bytes
//!   - `pieces` - concatenated 20-byte SHA-1 hashes, one per piece
//!   - `length` (single-file) OR `files` (multi-file, each with `length`
//!     and `path`)
//! - **announce** - primary tracker URL
//! - **announce-list** - tracker tiers ([BEP-12])
//! - **creation date**, **comment**, **created by** - informational
//!
//! [`Metainfo::from_bytes`] is a pure transform over the document bytes; it
//! performs no I/O. The [`InfoHash`] is computed over the `info` value's
//! original bytes, so two documents that differ only in the key order of
//! their `info` dictionaries have different info hashes.
//!
//! ```no_run
//! use rdisc::metainfo::Metainfo;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let data = std::fs::read("example.torrent")?;
//! let torrent = Metainfo::from_bytes(&data)?;
//!
//! println!("Info hash: {}", torrent.info_hash);
//! println!("Total size: {} bytes", torrent.total_length());
//! println!("Pieces: {} x {} bytes", torrent.piece_count(), torrent.piece_length());
//! for tracker in torrent.trackers() {
//!     println!("Tracker: {}", tracker);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! [BEP-3]: http://bittorrent.org/beps/bep_0003.html
//! [BEP-12]: http://bittorrent.org/beps/bep_0012.html

mod error;
mod info_hash;
mod torrent;

pub use error::MetainfoError;
pub use info_hash::InfoHash;
pub use torrent::{File, Info, Metainfo};
