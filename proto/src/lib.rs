//! pftabled wire protocol
//!
//! A pftabled command is a single 64-byte UDP datagram: a 44-byte header
//! (version, command, netmask, address, table, timestamp) followed by an
//! HMAC-SHA1 tag over that header. This crate builds such datagrams and
//! checks them the way the receiving daemon does.

pub mod auth;
pub mod command;
pub mod error;
pub mod message;
pub mod target;

pub use auth::AuthKey;
pub use command::Command;
pub use error::ProtoError;
pub use message::{
    build_message, unix_timestamp, verify_datagram, Message, MessageInputs, CLOCK_SKEW_SECS,
    HEADER_LEN, MESSAGE_LEN, TABLE_NAME_LEN, TAG_LEN, VERSION,
};
pub use target::Target;
