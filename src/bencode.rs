//! Bencode encoding and decoding ([BEP-3]).
//!
//! Bencode is the serialization format of `.torrent` files and HTTP tracker
//! responses. It has four shapes:
//!
//! | Type | Format | Example |
//! |------|--------|---------|
//! | Integer | `i<number>e` | `i-3e` → -3 |
//! | Byte String | `<length>:<data>` | `4:spam` → "spam" |
//! | List | `l<items>e` | `l4:spam4:eggse` → ["spam", "eggs"] |
//! | Dictionary | `d<key><value>...e` | `d3:cow3:mooe` → {"cow": "moo"} |
//!
//! # Decoding
//!
//! [`decode`] requires the input to hold exactly one value. [`decode_prefix`]
//! decodes the leading value and reports how many bytes it used, which is
//! what the metainfo parser needs to find the exact bytes of the `info`
//! dictionary (see [`raw_dict_value`]).
//!
//! ```
//! use rdisc::bencode::{decode, decode_prefix, Value};
//!
//! assert_eq!(decode(b"i-3e").unwrap(), Value::Integer(-3));
//!
//! let (value, consumed) = decode_prefix(b"4:spam").unwrap();
//! assert_eq!(value.as_str(), Some("spam"));
//! assert_eq!(consumed, 6);
//! ```
//!
//! # Encoding
//!
//! [`encode`] always emits canonical output: dictionary keys sorted by raw
//! byte value, integers without leading zeros.
//!
//! ```
//! use rdisc::bencode::{decode, encode};
//!
//! let value = decode(b"d4:spam4:eggs3:cow3:mooe").unwrap();
//! assert_eq!(encode(&value), b"d3:cow3:moo4:spam4:eggse");
//! ```
//!
//! # Errors
//!
//! All failures are [`BencodeError`] values. Nesting is bounded (see
//! [`Decoder::with_max_depth`]), so deeply nested hostile input is rejected
//! rather than overflowing the stack.
//!
//! [BEP-3]: http://bittorrent.org/beps/bep_0003.html

mod decode;
mod encode;
mod error;
mod value;

pub use decode::{decode, decode_prefix, raw_dict_value, Decoder, DEFAULT_MAX_DEPTH};
pub use encode::{encode, encode_to};
pub use error::BencodeError;
pub use value::Value;

#[cfg(test)]
mod tests;
