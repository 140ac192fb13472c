use super::value::Value;
use std::io::Write;

/// Encodes a bencode value to a byte vector.
///
/// The output follows the canonical bencode format:
/// - Integers: `i<number>e`
/// - Byte strings: `<length>:<data>`
/// - Lists: `l<items>e`
/// - Dictionaries: `d<key><value>...e` (keys sorted by raw byte value)
///
/// Encoding is infallible and deterministic: the same value always produces
/// the same bytes.
///
/// # Examples
///
/// ```
/// use rdisc::bencode::{encode, Value};
/// use std::collections::BTreeMap;
/// use bytes::Bytes;
///
/// assert_eq!(encode(&Value::Integer(42)), b"i42e");
/// assert_eq!(encode(&Value::string("hello")), b"5:hello");
///
/// let list = Value::List(vec![Value::Integer(1), Value::string("two")]);
/// assert_eq!(encode(&list), b"li1e3:twoe");
///
/// // Insertion order does not matter, keys come out sorted.
/// let mut dict = BTreeMap::new();
/// dict.insert(Bytes::from_static(b"b"), Value::Integer(2));
/// dict.insert(Bytes::from_static(b"a"), Value::Integer(1));
/// assert_eq!(encode(&Value::Dict(dict)), b"d1:ai1e1:bi2ee");
/// ```
pub fn encode(value: &Value) -> Vec<u8> {
    let mut buf = Vec::new();
    encode_value(value, &mut buf);
    buf
}

/// Encodes a bencode value into any writer.
pub fn encode_to<W: Write>(value: &Value, writer: &mut W) -> std::io::Result<()> {
    writer.write_all(&encode(value))
}

fn encode_value(value: &Value, buf: &mut Vec<u8>) {
    match value {
        Value::Integer(i) => {
            buf.push(b'i');
            buf.extend_from_slice(i.to_string().as_bytes());
            buf.push(b'e');
        }
        Value::Bytes(b) => encode_bytes(b, buf),
        Value::List(l) => {
            buf.push(b'l');
            for item in l {
                encode_value(item, buf);
            }
            buf.push(b'e');
        }
        Value::Dict(d) => {
            // BTreeMap<Bytes, _> iterates in byte-wise key order.
            buf.push(b'd');
            for (key, val) in d {
                encode_bytes(key, buf);
                encode_value(val, buf);
            }
            buf.push(b'e');
        }
    }
}

fn encode_bytes(bytes: &[u8], buf: &mut Vec<u8>) {
    buf.extend_from_slice(bytes.len().to_string().as_bytes());
    buf.push(b':');
    buf.extend_from_slice(bytes);
}
