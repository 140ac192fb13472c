use super::error::BencodeError;
use super::value::Value;
use bytes::Bytes;
use std::collections::BTreeMap;
use std::ops::Range;

/// Default nesting limit for lists and dictionaries.
pub const DEFAULT_MAX_DEPTH: usize = 512;

/// Decodes a complete bencode document.
///
/// The whole input must be consumed by a single value; anything left over is
/// reported as [`BencodeError::TrailingData`].
///
/// # Examples
///
/// ```
/// use rdisc::bencode::{decode, Value};
///
/// let value = decode(b"l4:spam4:eggse").unwrap();
/// assert_eq!(value.as_list().map(|l| l.len()), Some(2));
///
/// assert!(decode(b"i42eextra").is_err());
/// ```
pub fn decode(data: &[u8]) -> Result<Value, BencodeError> {
    let (value, consumed) = decode_prefix(data)?;

    if consumed != data.len() {
        return Err(BencodeError::TrailingData);
    }

    Ok(value)
}

/// Decodes the first value in `data` and returns it together with the
/// number of bytes it occupied.
///
/// ```
/// use rdisc::bencode::{decode_prefix, Value};
///
/// let (value, consumed) = decode_prefix(b"4:spami1e").unwrap();
/// assert_eq!(value.as_str(), Some("spam"));
/// assert_eq!(consumed, 6);
/// ```
pub fn decode_prefix(data: &[u8]) -> Result<(Value, usize), BencodeError> {
    Decoder::new(data).decode_prefix()
}

/// Locates the value stored under `key` in a top-level dictionary and returns
/// the byte range it occupies in `data`.
///
/// Only the root dictionary's own keys are examined, so a nested dictionary
/// or a byte string that happens to contain `key` never matches. Returns
/// `Ok(None)` when the root is a dictionary without that key.
pub fn raw_dict_value(data: &[u8], key: &[u8]) -> Result<Option<Range<usize>>, BencodeError> {
    let mut decoder = Decoder::new(data);
    decoder.expect(b'd')?;

    loop {
        match decoder.peek()? {
            b'e' => return Ok(None),
            b'0'..=b'9' => {}
            c => return Err(BencodeError::NonStringKey(c as char)),
        }

        let entry_key = decoder.decode_bytes()?;
        let start = decoder.pos;
        let (_, consumed) = Decoder::new(&data[start..])
            .with_max_depth(decoder.max_depth.saturating_sub(1))
            .decode_prefix()?;
        decoder.pos = start + consumed;

        if entry_key.as_ref() == key {
            return Ok(Some(start..start + consumed));
        }
    }
}

/// A bencode decoder over a borrowed buffer.
///
/// Decoding recurses once per nested list or dictionary. The recursion is
/// bounded by a configurable depth so adversarial input fails with
/// [`BencodeError::NestingTooDeep`] instead of exhausting the stack.
///
/// ```
/// use rdisc::bencode::{BencodeError, Decoder};
///
/// let nested = b"lllleeee";
/// assert!(Decoder::new(nested).with_max_depth(4).decode_prefix().is_ok());
/// assert!(matches!(
///     Decoder::new(nested).with_max_depth(2).decode_prefix(),
///     Err(BencodeError::NestingTooDeep)
/// ));
/// ```
#[derive(Debug)]
pub struct Decoder<'a> {
    data: &'a [u8],
    pos: usize,
    max_depth: usize,
}

impl<'a> Decoder<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            data,
            pos: 0,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    /// Sets the maximum number of nested lists/dictionaries.
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Decodes one value from the start of the buffer, returning it with the
    /// number of bytes consumed.
    pub fn decode_prefix(mut self) -> Result<(Value, usize), BencodeError> {
        if self.data.is_empty() {
            return Err(BencodeError::UnexpectedEof);
        }
        let value = self.decode_value(0)?;
        Ok((value, self.pos))
    }

    fn peek(&self) -> Result<u8, BencodeError> {
        self.data
            .get(self.pos)
            .copied()
            .ok_or(BencodeError::UnexpectedEof)
    }

    fn expect(&mut self, marker: u8) -> Result<(), BencodeError> {
        let c = self.peek()?;
        if c != marker {
            return Err(BencodeError::UnexpectedChar(c as char));
        }
        self.pos += 1;
        Ok(())
    }

    fn decode_value(&mut self, depth: usize) -> Result<Value, BencodeError> {
        match self.peek()? {
            b'i' => self.decode_integer(),
            b'l' => self.decode_list(depth + 1),
            b'd' => self.decode_dict(depth + 1),
            b'0'..=b'9' => self.decode_bytes().map(Value::Bytes),
            c => Err(BencodeError::UnexpectedChar(c as char)),
        }
    }

    fn decode_integer(&mut self) -> Result<Value, BencodeError> {
        self.pos += 1;

        let start = self.pos;
        while self.pos < self.data.len() && self.data[self.pos] != b'e' {
            self.pos += 1;
        }

        if self.pos >= self.data.len() {
            return Err(BencodeError::UnexpectedEof);
        }

        let int_str = std::str::from_utf8(&self.data[start..self.pos])
            .map_err(|_| BencodeError::InvalidInteger("invalid utf8".into()))?;

        let digits = int_str.strip_prefix('-').unwrap_or(int_str);
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(BencodeError::InvalidInteger(int_str.into()));
        }

        if int_str.starts_with("-0") || (digits.starts_with('0') && digits.len() > 1) {
            return Err(BencodeError::InvalidInteger("leading zeros".into()));
        }

        let value: i64 = int_str
            .parse()
            .map_err(|_| BencodeError::InvalidInteger(int_str.into()))?;

        self.pos += 1;
        Ok(Value::Integer(value))
    }

    fn decode_bytes(&mut self) -> Result<Bytes, BencodeError> {
        let start = self.pos;
        while self.pos < self.data.len() && self.data[self.pos].is_ascii_digit() {
            self.pos += 1;
        }

        match self.data.get(self.pos) {
            None => return Err(BencodeError::UnexpectedEof),
            Some(b':') => {}
            Some(_) => return Err(BencodeError::InvalidStringLength),
        }

        let len_str = &self.data[start..self.pos];
        if len_str.len() > 1 && len_str[0] == b'0' {
            return Err(BencodeError::InvalidStringLength);
        }

        let len: usize = std::str::from_utf8(len_str)
            .ok()
            .and_then(|s| s.parse().ok())
            .ok_or(BencodeError::InvalidStringLength)?;

        self.pos += 1;

        let remaining = self.data.len() - self.pos;
        if len > remaining {
            return Err(BencodeError::UnexpectedEof);
        }

        let bytes = Bytes::copy_from_slice(&self.data[self.pos..self.pos + len]);
        self.pos += len;

        Ok(bytes)
    }

    fn decode_list(&mut self, depth: usize) -> Result<Value, BencodeError> {
        if depth > self.max_depth {
            return Err(BencodeError::NestingTooDeep);
        }

        self.pos += 1;
        let mut list = Vec::new();

        while self.peek()? != b'e' {
            list.push(self.decode_value(depth)?);
        }

        self.pos += 1;
        Ok(Value::List(list))
    }

    fn decode_dict(&mut self, depth: usize) -> Result<Value, BencodeError> {
        if depth > self.max_depth {
            return Err(BencodeError::NestingTooDeep);
        }

        self.pos += 1;
        let mut dict = BTreeMap::new();

        loop {
            match self.peek()? {
                b'e' => break,
                b'0'..=b'9' => {}
                c => return Err(BencodeError::NonStringKey(c as char)),
            }

            let key = self.decode_bytes()?;
            let value = self.decode_value(depth)?;

            if dict.contains_key(&key) {
                return Err(BencodeError::DuplicateKey(
                    String::from_utf8_lossy(&key).into_owned(),
                ));
            }
            dict.insert(key, value);
        }

        self.pos += 1;
        Ok(Value::Dict(dict))
    }
}
