use std::collections::BTreeMap;

use bytes::Bytes;

use super::*;

#[test]
fn test_decode_integer() {
    assert_eq!(decode(b"i42e").unwrap(), Value::Integer(42));
    assert_eq!(decode(b"i-3e").unwrap(), Value::Integer(-3));
    assert_eq!(decode(b"i0e").unwrap(), Value::Integer(0));
    assert_eq!(
        decode(b"i9223372036854775807e").unwrap(),
        Value::Integer(i64::MAX)
    );
}

#[test]
fn test_decode_integer_invalid() {
    assert!(matches!(decode(b"i e"), Err(BencodeError::InvalidInteger(_))));
    assert!(matches!(decode(b"ie"), Err(BencodeError::InvalidInteger(_))));
    assert!(matches!(decode(b"i-e"), Err(BencodeError::InvalidInteger(_))));
    assert!(matches!(decode(b"i-0e"), Err(BencodeError::InvalidInteger(_))));
    assert!(matches!(decode(b"i03e"), Err(BencodeError::InvalidInteger(_))));
    assert!(matches!(decode(b"i+3e"), Err(BencodeError::InvalidInteger(_))));
    assert!(matches!(decode(b"i42"), Err(BencodeError::UnexpectedEof)));
    assert!(decode(b"i99999999999999999999e").is_err());
}

#[test]
fn test_decode_bytes() {
    assert_eq!(
        decode_prefix(b"4:spam").unwrap(),
        (Value::Bytes(Bytes::from_static(b"spam")), 6)
    );
    assert_eq!(decode(b"0:").unwrap(), Value::Bytes(Bytes::new()));

    let binary = decode(b"3:\x00\xff\x80").unwrap();
    assert_eq!(binary.as_bytes().map(|b| b.as_ref()), Some(&b"\x00\xff\x80"[..]));
    assert_eq!(binary.as_str(), None);
}

#[test]
fn test_decode_bytes_invalid() {
    assert!(matches!(decode(b"5:ab"), Err(BencodeError::UnexpectedEof)));
    assert!(matches!(decode(b"4spam"), Err(BencodeError::InvalidStringLength)));
    assert!(matches!(decode(b"04:spam"), Err(BencodeError::InvalidStringLength)));
    assert!(matches!(decode(b"12"), Err(BencodeError::UnexpectedEof)));
}

#[test]
fn test_decode_empty_and_unknown_marker() {
    assert!(matches!(decode(b""), Err(BencodeError::UnexpectedEof)));
    assert!(matches!(decode_prefix(b""), Err(BencodeError::UnexpectedEof)));
    assert!(matches!(decode(b"x"), Err(BencodeError::UnexpectedChar('x'))));
    assert!(matches!(decode(b"e"), Err(BencodeError::UnexpectedChar('e'))));
}

#[test]
fn test_decode_list() {
    let result = decode(b"l4:spam4:eggse").unwrap();
    assert_eq!(
        result,
        Value::List(vec![Value::string("spam"), Value::string("eggs")])
    );

    assert_eq!(decode(b"le").unwrap(), Value::List(vec![]));
    assert!(matches!(decode(b"l4:spam"), Err(BencodeError::UnexpectedEof)));
}

#[test]
fn test_decode_dict() {
    let result = decode(b"d3:cow3:moo4:spam4:eggse").unwrap();
    let dict = result.as_dict().unwrap();
    assert_eq!(dict.len(), 2);
    assert_eq!(dict.get(b"cow".as_slice()), Some(&Value::string("moo")));
    assert_eq!(dict.get(b"spam".as_slice()), Some(&Value::string("eggs")));
}

#[test]
fn test_decode_dict_invalid() {
    assert!(matches!(decode(b"d3:keye"), Err(BencodeError::UnexpectedChar('e'))));
    assert!(matches!(decode(b"d3:key"), Err(BencodeError::UnexpectedEof)));
    assert!(matches!(decode(b"d3:cow3:moo"), Err(BencodeError::UnexpectedEof)));
    assert!(matches!(decode(b"di1ei2ee"), Err(BencodeError::NonStringKey('i'))));
    assert!(matches!(
        decode(b"d3:cowi1e3:cowi2ee"),
        Err(BencodeError::DuplicateKey(_))
    ));
}

#[test]
fn test_decode_unsorted_keys_accepted() {
    let value = decode(b"d4:spam4:eggs3:cow3:mooe").unwrap();
    assert_eq!(value.get(b"cow"), Some(&Value::string("moo")));
    assert_eq!(encode(&value), b"d3:cow3:moo4:spam4:eggse");
}

#[test]
fn test_decode_prefix_reports_consumed() {
    let (value, consumed) = decode_prefix(b"i42eextra").unwrap();
    assert_eq!(value, Value::Integer(42));
    assert_eq!(consumed, 4);

    let (_, consumed) = decode_prefix(b"d1:ai1eetrailing").unwrap();
    assert_eq!(consumed, 8);
}

#[test]
fn test_trailing_data_error() {
    assert!(matches!(decode(b"i42eextra"), Err(BencodeError::TrailingData)));
}

#[test]
fn test_nesting_limit() {
    let depth = DEFAULT_MAX_DEPTH + 1;
    let mut hostile = vec![b'l'; depth];
    hostile.extend(std::iter::repeat(b'e').take(depth));
    assert!(matches!(decode(&hostile), Err(BencodeError::NestingTooDeep)));

    let ok_depth = DEFAULT_MAX_DEPTH;
    let mut nested = vec![b'l'; ok_depth];
    nested.extend(std::iter::repeat(b'e').take(ok_depth));
    assert!(decode(&nested).is_ok());

    let unterminated = vec![b'l'; 100_000];
    assert!(decode(&unterminated).is_err());
}

#[test]
fn test_custom_depth() {
    let data = b"d1:ad1:bd1:ci1eeee";
    assert!(Decoder::new(data).with_max_depth(3).decode_prefix().is_ok());
    assert!(matches!(
        Decoder::new(data).with_max_depth(2).decode_prefix(),
        Err(BencodeError::NestingTooDeep)
    ));
}

#[test]
fn test_encode_integer() {
    assert_eq!(encode(&Value::Integer(42)), b"i42e");
    assert_eq!(encode(&Value::Integer(-42)), b"i-42e");
    assert_eq!(encode(&Value::Integer(0)), b"i0e");
}

#[test]
fn test_encode_bytes() {
    assert_eq!(encode(&Value::Bytes(Bytes::from_static(b"spam"))), b"4:spam");
    assert_eq!(encode(&Value::Bytes(Bytes::new())), b"0:");
}

#[test]
fn test_encode_list() {
    let list = Value::List(vec![Value::string("spam"), Value::Integer(42)]);
    assert_eq!(encode(&list), b"l4:spami42ee");
}

#[test]
fn test_encode_dict_sorts_keys() {
    let mut dict = BTreeMap::new();
    dict.insert(Bytes::from_static(b"zeta"), Value::Integer(1));
    dict.insert(Bytes::from_static(b"alpha"), Value::Integer(2));
    dict.insert(Bytes::from_static(b"Zeta"), Value::Integer(3));
    dict.insert(Bytes::from_static(b"\xff"), Value::Integer(4));

    assert_eq!(
        encode(&Value::Dict(dict)),
        b"d4:Zetai3e5:alphai2e4:zetai1e1:\xffi4ee"
    );
}

#[test]
fn test_encode_is_deterministic() {
    let a = Value::dict([("b", Value::Integer(2)), ("a", Value::Integer(1))]);
    let b = Value::dict([("a", Value::Integer(1)), ("b", Value::Integer(2))]);
    assert_eq!(encode(&a), encode(&b));
    assert_eq!(encode(&a), encode(&a.clone()));
}

#[test]
fn test_encode_to_writer() {
    let mut out = Vec::new();
    encode_to(&Value::string("spam"), &mut out).unwrap();
    assert_eq!(out, b"4:spam");
}

#[test]
fn test_roundtrip() {
    let value = Value::dict([
        ("announce", Value::string("http://tracker.example/ann")),
        (
            "info",
            Value::dict([
                ("length", Value::Integer(1024)),
                ("pieces", Value::from(&[0u8, 1, 2, 255][..])),
                ("empty", Value::List(vec![])),
            ]),
        ),
        (
            "nested",
            Value::List(vec![
                Value::Integer(-7),
                Value::List(vec![Value::string("x"), Value::dict::<&str, _>([])]),
            ]),
        ),
    ]);

    let encoded = encode(&value);
    assert_eq!(decode(&encoded).unwrap(), value);
}

#[test]
fn test_roundtrip_canonical_input() {
    let original = b"d8:announce15:http://test.com4:infod4:name4:test12:piece lengthi16384eee";
    let decoded = decode(original).unwrap();
    assert_eq!(encode(&decoded), original);
}

#[test]
fn test_raw_dict_value() {
    let data = b"d8:announce3:url4:infod6:lengthi1eee";
    let span = raw_dict_value(data, b"info").unwrap().unwrap();
    assert_eq!(&data[span], b"d6:lengthi1ee");

    assert_eq!(raw_dict_value(data, b"missing").unwrap(), None);
}

#[test]
fn test_raw_dict_value_ignores_nested_and_string_matches() {
    // "4:info" appears inside a string value and inside a nested dict before
    // the real top-level key.
    let data = b"d1:a6:4:info1:bd4:infoi1ee4:infoi7ee";
    let span = raw_dict_value(data, b"info").unwrap().unwrap();
    assert_eq!(&data[span], b"i7e");
}

#[test]
fn test_raw_dict_value_requires_dict() {
    assert!(raw_dict_value(b"l4:infoe", b"info").is_err());
    assert!(raw_dict_value(b"d4:info", b"info").is_err());
}

#[test]
fn test_value_accessors() {
    let value = Value::Integer(42);
    assert_eq!(value.as_integer(), Some(42));
    assert_eq!(value.as_u64(), Some(42));
    assert!(value.as_bytes().is_none());
    assert_eq!(value.kind(), "integer");

    assert_eq!(Value::Integer(-1).as_u64(), None);

    let value = Value::string("test");
    assert_eq!(value.as_str(), Some("test"));
    assert!(value.as_integer().is_none());

    let value = Value::List(vec![]);
    assert!(value.as_list().is_some());
    assert!(value.as_dict().is_none());
    assert!(value.get(b"key").is_none());
}
