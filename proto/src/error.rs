//! Protocol errors

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ProtoError {
    #[error("invalid IPv4 address '{0}'")]
    InvalidAddress(String),

    #[error("invalid netmask '{0}'")]
    InvalidNetmask(String),

    #[error("datagram is {actual} bytes, expected {expected}")]
    Length { expected: usize, actual: usize },

    #[error("unsupported protocol version {0}")]
    UnsupportedVersion(u8),

    #[error("timestamp too old ({age}s)")]
    StaleTimestamp { age: u32 },

    #[error("wrong authentication")]
    BadTag,
}
