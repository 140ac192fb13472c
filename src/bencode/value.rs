use bytes::Bytes;
use std::collections::BTreeMap;

/// A decoded bencode value.
///
/// Exactly four shapes exist. Dictionaries are keyed by raw byte strings and
/// kept in a [`BTreeMap`], so iteration (and therefore encoding) is always in
/// ascending byte order no matter how the entries were inserted or in which
/// order a foreign encoder wrote them.
///
/// ```
/// use rdisc::bencode::{decode, Value};
///
/// let value = decode(b"d3:cow3:moo4:spam4:eggse").unwrap();
/// assert_eq!(value.get(b"cow").and_then(Value::as_str), Some("moo"));
/// assert_eq!(value.get(b"spam").and_then(Value::as_str), Some("eggs"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    /// A signed 64-bit integer.
    Integer(i64),
    /// A byte string (not necessarily UTF-8).
    Bytes(Bytes),
    /// An ordered list of values.
    List(Vec<Value>),
    /// A dictionary with byte string keys.
    Dict(BTreeMap<Bytes, Value>),
}

impl Value {
    /// Creates a byte string value from a UTF-8 string.
    pub fn string(s: &str) -> Self {
        Value::Bytes(Bytes::copy_from_slice(s.as_bytes()))
    }

    /// Builds a dictionary from `(key, value)` pairs in any order.
    ///
    /// ```
    /// use rdisc::bencode::{encode, Value};
    ///
    /// let dict = Value::dict([("spam", Value::string("eggs")), ("cow", Value::string("moo"))]);
    /// assert_eq!(encode(&dict), b"d3:cow3:moo4:spam4:eggse");
    /// ```
    pub fn dict<K, I>(entries: I) -> Self
    where
        K: AsRef<[u8]>,
        I: IntoIterator<Item = (K, Value)>,
    {
        Value::Dict(
            entries
                .into_iter()
                .map(|(k, v)| (Bytes::copy_from_slice(k.as_ref()), v))
                .collect(),
        )
    }

    /// Short name of the variant, used in error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Integer(_) => "integer",
            Value::Bytes(_) => "byte string",
            Value::List(_) => "list",
            Value::Dict(_) => "dictionary",
        }
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Value::Integer(i) => Some(*i),
            _ => None,
        }
    }

    /// Returns the integer if it is present and non-negative.
    pub fn as_u64(&self) -> Option<u64> {
        self.as_integer().and_then(|i| u64::try_from(i).ok())
    }

    pub fn as_bytes(&self) -> Option<&Bytes> {
        match self {
            Value::Bytes(b) => Some(b),
            _ => None,
        }
    }

    /// Returns the byte string as UTF-8, or `None` for other variants and
    /// invalid UTF-8.
    pub fn as_str(&self) -> Option<&str> {
        self.as_bytes().and_then(|b| std::str::from_utf8(b).ok())
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(l) => Some(l),
            _ => None,
        }
    }

    pub fn as_dict(&self) -> Option<&BTreeMap<Bytes, Value>> {
        match self {
            Value::Dict(d) => Some(d),
            _ => None,
        }
    }

    /// Looks up `key` if this value is a dictionary.
    pub fn get(&self, key: &[u8]) -> Option<&Value> {
        self.as_dict()?.get(key)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Integer(i)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::string(s)
    }
}

impl From<&[u8]> for Value {
    fn from(b: &[u8]) -> Self {
        Value::Bytes(Bytes::copy_from_slice(b))
    }
}

impl From<Bytes> for Value {
    fn from(b: Bytes) -> Self {
        Value::Bytes(b)
    }
}

impl From<Vec<Value>> for Value {
    fn from(l: Vec<Value>) -> Self {
        Value::List(l)
    }
}

impl From<BTreeMap<Bytes, Value>> for Value {
    fn from(d: BTreeMap<Bytes, Value>) -> Self {
        Value::Dict(d)
    }
}
