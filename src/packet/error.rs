use thiserror::Error;

use super::RecordType;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("truncated message: {needed} byte(s) needed at offset {offset}, {available} available")]
    Truncated {
        offset: usize,
        needed: usize,
        available: usize,
    },

    #[error("message too long: {0} bytes exceeds the 512-byte limit")]
    TooLong(usize),

    #[error("message buffer full: cannot write {needed} byte(s) at offset {offset}")]
    BufferFull { offset: usize, needed: usize },

    #[error("malformed compression pointer at offset {offset} to offset {target}")]
    MalformedPointer { offset: usize, target: usize },

    #[error("reserved label type {byte:#04x} at offset {offset}")]
    ReservedLabelType { offset: usize, byte: u8 },

    #[error("invalid domain name {name:?}: {reason}")]
    InvalidName { name: String, reason: &'static str },

    #[error("unsupported address length {len} for {rtype} record")]
    UnsupportedAddress { rtype: RecordType, len: usize },

    #[error("RDATA length mismatch: declared {declared}, decoded {decoded}")]
    RdataLength { declared: usize, decoded: usize },

    #[error("{0} records cannot carry a generic payload")]
    PayloadMismatch(RecordType),

    #[error("unknown section: {0}")]
    UnknownSection(String),
}
