use thiserror::Error;

/// Syntax errors raised while decoding bencode.
///
/// Every variant means the input is malformed; decoding never returns a
/// partially decoded value.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BencodeError {
    #[error("unexpected end of input")]
    UnexpectedEof,

    #[error("invalid integer: {0}")]
    InvalidInteger(String),

    #[error("invalid string length")]
    InvalidStringLength,

    #[error("unexpected character: {0:?}")]
    UnexpectedChar(char),

    #[error("dictionary key must be a byte string, found {0:?}")]
    NonStringKey(char),

    #[error("duplicate dictionary key: {0}")]
    DuplicateKey(String),

    #[error("trailing data after value")]
    TrailingData,

    #[error("nesting too deep")]
    NestingTooDeep,
}
