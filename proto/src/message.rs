//! Command datagram encoding and verification
//!
//! Layout (network byte order):
//!
//! ```text
//! offset  size  field
//! 0       1     version     = 2
//! 1       1     command     1=add, 2=del, 3=flush, 0=other
//! 2       1     padding     = 0
//! 3       1     netmask
//! 4       4     address
//! 8       32    table       NUL-padded
//! 40      4     timestamp   Unix seconds
//! 44      20    HMAC-SHA1 over bytes 0..44
//! ```

use std::net::Ipv4Addr;

use tracing::{debug, warn};

use crate::auth::AuthKey;
use crate::command::Command;
use crate::error::ProtoError;
use crate::target::{Target, HOST_NETMASK};

pub const VERSION: u8 = 2;
pub const TABLE_NAME_LEN: usize = 32;
pub const HEADER_LEN: usize = 44;
pub const TAG_LEN: usize = 20;
pub const MESSAGE_LEN: usize = HEADER_LEN + TAG_LEN;

/// Maximum age of a datagram, in seconds, accepted by the daemon.
pub const CLOCK_SKEW_SECS: u32 = 60;

const TABLE_OFFSET: usize = 8;
const TIMESTAMP_OFFSET: usize = TABLE_OFFSET + TABLE_NAME_LEN;

/// Raw command-line inputs for one datagram.
#[derive(Debug, Clone, Copy)]
pub struct MessageInputs<'a> {
    pub table: &'a str,
    pub command: &'a str,
    pub ip: Option<&'a str>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub version: u8,
    pub command: Command,
    pub target: Target,
    pub table: [u8; TABLE_NAME_LEN],
    pub timestamp: u32,
}

/// Current Unix time in seconds, masked to 32 bits.
pub fn unix_timestamp() -> u32 {
    (chrono::Utc::now().timestamp() & 0xFFFF_FFFF) as u32
}

/// Encode and sign one datagram.
pub fn build_message(
    inputs: &MessageInputs<'_>,
    key: &AuthKey,
    timestamp: u32,
) -> Result<[u8; MESSAGE_LEN], ProtoError> {
    let command = Command::from_name(inputs.command);
    let target = match inputs.ip {
        Some(ip) => Target::parse(ip)?,
        None => Target::default(),
    };

    let message = Message::new(command, inputs.table, target, timestamp);
    debug!(
        "Encoding {} {} for table {} at {}",
        command,
        target,
        message.table_name(),
        timestamp
    );
    Ok(message.seal(key))
}

/// Decode a received datagram and check it the way pftabled does:
/// version, freshness, then authentication.
pub fn verify_datagram(bytes: &[u8], key: &AuthKey, now: u32) -> Result<Message, ProtoError> {
    let (message, tag) = Message::decode(bytes)?;

    let age = now.wrapping_sub(message.timestamp);
    if age > CLOCK_SKEW_SECS {
        return Err(ProtoError::StaleTimestamp { age });
    }

    if !key.verify(&bytes[..HEADER_LEN], &tag) {
        return Err(ProtoError::BadTag);
    }

    Ok(message)
}

impl Message {
    pub fn new(command: Command, table: &str, target: Target, timestamp: u32) -> Self {
        Self {
            version: VERSION,
            command,
            target,
            table: table_field(table),
            timestamp,
        }
    }

    /// Table name up to the first NUL.
    pub fn table_name(&self) -> String {
        let end = self
            .table
            .iter()
            .position(|&b| b == 0)
            .unwrap_or(TABLE_NAME_LEN);
        String::from_utf8_lossy(&self.table[..end]).into_owned()
    }

    pub fn header(&self) -> [u8; HEADER_LEN] {
        let mut buf = [0u8; HEADER_LEN];
        buf[0] = self.version;
        buf[1] = self.command.code();
        buf[3] = self.target.netmask;
        buf[4..TABLE_OFFSET].copy_from_slice(&self.target.address.octets());
        buf[TABLE_OFFSET..TIMESTAMP_OFFSET].copy_from_slice(&self.table);
        buf[TIMESTAMP_OFFSET..].copy_from_slice(&self.timestamp.to_be_bytes());
        buf
    }

    /// Header followed by its HMAC-SHA1 tag.
    pub fn seal(&self, key: &AuthKey) -> [u8; MESSAGE_LEN] {
        let header = self.header();
        let mut out = [0u8; MESSAGE_LEN];
        out[..HEADER_LEN].copy_from_slice(&header);
        out[HEADER_LEN..].copy_from_slice(&key.sign(&header));
        out
    }

    /// Split a datagram into its message and tag. Version 1 datagrams carry
    /// no netmask and are read as host entries.
    pub fn decode(bytes: &[u8]) -> Result<(Self, [u8; TAG_LEN]), ProtoError> {
        if bytes.len() != MESSAGE_LEN {
            return Err(ProtoError::Length {
                expected: MESSAGE_LEN,
                actual: bytes.len(),
            });
        }

        let version = bytes[0];
        if version > VERSION {
            return Err(ProtoError::UnsupportedVersion(version));
        }

        let netmask = if version == 1 { HOST_NETMASK } else { bytes[3] };
        let address = Ipv4Addr::new(bytes[4], bytes[5], bytes[6], bytes[7]);

        let mut table = [0u8; TABLE_NAME_LEN];
        table.copy_from_slice(&bytes[TABLE_OFFSET..TIMESTAMP_OFFSET]);

        let mut ts = [0u8; 4];
        ts.copy_from_slice(&bytes[TIMESTAMP_OFFSET..HEADER_LEN]);

        let mut tag = [0u8; TAG_LEN];
        tag.copy_from_slice(&bytes[HEADER_LEN..]);

        let message = Self {
            version,
            command: Command::from_code(bytes[1]),
            target: Target::new(address, netmask),
            table,
            timestamp: u32::from_be_bytes(ts),
        };
        Ok((message, tag))
    }
}

fn table_field(name: &str) -> [u8; TABLE_NAME_LEN] {
    let bytes = name.as_bytes();
    if bytes.len() > TABLE_NAME_LEN {
        warn!(
            "Table name '{}' is {} bytes, truncating to {}",
            name,
            bytes.len(),
            TABLE_NAME_LEN
        );
    }
    let len = bytes.len().min(TABLE_NAME_LEN);
    let mut field = [0u8; TABLE_NAME_LEN];
    field[..len].copy_from_slice(&bytes[..len]);
    field
}

#[cfg(test)]
mod tests {
    use super::*;

    const TS: u32 = 0x5F5E_1000;

    fn inputs<'a>(cmd: &'a str, ip: Option<&'a str>) -> MessageInputs<'a> {
        MessageInputs {
            table: "spamd",
            command: cmd,
            ip,
        }
    }

    #[test]
    fn test_message_is_64_bytes() {
        for cmd in ["add", "del", "flush", "bogus"] {
            let msg = build_message(&inputs(cmd, None), &AuthKey::empty(), TS).unwrap();
            assert_eq!(msg.len(), MESSAGE_LEN);
            assert_eq!(msg.len(), 64);
        }
    }

    #[test]
    fn test_spamd_add_scenario() {
        let key = AuthKey::from("secret");
        let msg = build_message(&inputs("add", Some("192.0.2.1/32")), &key, TS).unwrap();

        assert_eq!(&msg[..8], &[0x02, 0x01, 0x00, 0x20, 0xC0, 0x00, 0x02, 0x01]);
        assert_eq!(&msg[8..13], b"spamd");
        assert!(msg[13..40].iter().all(|&b| b == 0));
        assert_eq!(&msg[40..44], &TS.to_be_bytes());
        assert_eq!(&msg[44..], &key.sign(&msg[..44]));
    }

    #[test]
    fn test_command_byte() {
        let key = AuthKey::empty();
        let code = |cmd| build_message(&inputs(cmd, None), &key, TS).unwrap()[1];
        assert_eq!(code("add"), 1);
        assert_eq!(code("del"), 2);
        assert_eq!(code("flush"), 3);
        assert_eq!(code("remove"), 0);
    }

    #[test]
    fn test_default_address_and_netmask() {
        let msg = build_message(&inputs("flush", None), &AuthKey::empty(), TS).unwrap();
        assert_eq!(msg[2], 0);
        assert_eq!(msg[3], 32);
        assert_eq!(&msg[4..8], &[0, 0, 0, 0]);
    }

    #[test]
    fn test_address_without_netmask() {
        let msg =
            build_message(&inputs("del", Some("10.0.0.5")), &AuthKey::empty(), TS).unwrap();
        assert_eq!(msg[3], 32);
        assert_eq!(&msg[4..8], &[10, 0, 0, 5]);
    }

    #[test]
    fn test_netmask_is_not_range_checked() {
        let msg =
            build_message(&inputs("add", Some("10.0.0.5/99")), &AuthKey::empty(), TS).unwrap();
        assert_eq!(msg[3], 99);
    }

    #[test]
    fn test_bad_address_is_fatal() {
        let err = build_message(&inputs("add", Some("10.0.0.500")), &AuthKey::empty(), TS)
            .unwrap_err();
        assert_eq!(err, ProtoError::InvalidAddress("10.0.0.500".into()));
    }

    #[test]
    fn test_empty_key_signs() {
        let msg = build_message(&inputs("add", Some("10.0.0.5")), &AuthKey::empty(), TS).unwrap();
        assert_eq!(&msg[44..], &AuthKey::empty().sign(&msg[..44]));
    }

    #[test]
    fn test_key_changes_only_tag() {
        let a = build_message(&inputs("add", Some("10.0.0.5")), &AuthKey::from("a"), TS).unwrap();
        let b = build_message(&inputs("add", Some("10.0.0.5")), &AuthKey::from("b"), TS).unwrap();
        assert_eq!(a[..HEADER_LEN], b[..HEADER_LEN]);
        assert_ne!(a[HEADER_LEN..], b[HEADER_LEN..]);
    }

    #[test]
    fn test_deterministic_per_second() {
        let key = AuthKey::from("k");
        let a = build_message(&inputs("add", Some("10.0.0.5/24")), &key, TS).unwrap();
        let b = build_message(&inputs("add", Some("10.0.0.5/24")), &key, TS).unwrap();
        assert_eq!(a, b);

        let c = build_message(&inputs("add", Some("10.0.0.5/24")), &key, TS + 1).unwrap();
        assert_eq!(a[..40], c[..40]);
        assert_ne!(a[40..44], c[40..44]);
        assert_ne!(a[HEADER_LEN..], c[HEADER_LEN..]);
    }

    #[test]
    fn test_table_name_padding_and_truncation() {
        let exact = "t".repeat(TABLE_NAME_LEN);
        let msg = Message::new(Command::Flush, &exact, Target::default(), TS);
        assert_eq!(msg.table_name(), exact);

        let long = format!("{exact}overflow");
        let msg = Message::new(Command::Flush, &long, Target::default(), TS);
        assert_eq!(msg.table_name(), exact);
        assert_eq!(msg.header()[TIMESTAMP_OFFSET..], TS.to_be_bytes());

        let msg = Message::new(Command::Flush, "", Target::default(), TS);
        assert_eq!(msg.table, [0u8; TABLE_NAME_LEN]);
        assert_eq!(msg.table_name(), "");
    }

    #[test]
    fn test_decode_round_trip() {
        let key = AuthKey::from("secret");
        let msg = build_message(&inputs("del", Some("198.51.100.7/28")), &key, TS).unwrap();

        let (decoded, tag) = Message::decode(&msg).unwrap();
        assert_eq!(decoded.version, VERSION);
        assert_eq!(decoded.command, Command::Delete);
        assert_eq!(decoded.target.to_string(), "198.51.100.7/28");
        assert_eq!(decoded.table_name(), "spamd");
        assert_eq!(decoded.timestamp, TS);
        assert_eq!(tag, key.sign(&msg[..HEADER_LEN]));
        assert_eq!(decoded.header(), msg[..HEADER_LEN]);
    }

    #[test]
    fn test_decode_rejects_wrong_length() {
        assert_eq!(
            Message::decode(&[0u8; 63]).unwrap_err(),
            ProtoError::Length {
                expected: 64,
                actual: 63
            }
        );
        assert!(Message::decode(&[0u8; 65]).is_err());
    }

    #[test]
    fn test_decode_versions() {
        let mut msg = build_message(&inputs("add", Some("10.0.0.0/8")), &AuthKey::empty(), TS)
            .unwrap();

        msg[0] = 1;
        let (decoded, _) = Message::decode(&msg).unwrap();
        assert_eq!(decoded.target.netmask, 32);

        msg[0] = 3;
        assert_eq!(
            Message::decode(&msg).unwrap_err(),
            ProtoError::UnsupportedVersion(3)
        );
    }

    #[test]
    fn test_verify_datagram() {
        let key = AuthKey::from("secret");
        let msg = build_message(&inputs("add", Some("192.0.2.1")), &key, TS).unwrap();

        let verified = verify_datagram(&msg, &key, TS + 5).unwrap();
        assert_eq!(verified.command, Command::Add);

        assert_eq!(
            verify_datagram(&msg, &AuthKey::from("wrong"), TS).unwrap_err(),
            ProtoError::BadTag
        );
        assert_eq!(
            verify_datagram(&msg, &key, TS + CLOCK_SKEW_SECS + 1).unwrap_err(),
            ProtoError::StaleTimestamp {
                age: CLOCK_SKEW_SECS + 1
            }
        );
    }

    #[test]
    fn test_verify_detects_tampering() {
        let key = AuthKey::from("secret");
        let msg = build_message(&inputs("add", Some("192.0.2.1")), &key, TS).unwrap();

        for i in [1, 3, 7, 8, 39] {
            let mut tampered = msg;
            tampered[i] ^= 0x01;
            assert_eq!(
                verify_datagram(&tampered, &key, TS).unwrap_err(),
                ProtoError::BadTag,
                "byte {i}"
            );
        }

        let mut tampered = msg;
        tampered[MESSAGE_LEN - 1] ^= 0x80;
        assert!(verify_datagram(&tampered, &key, TS).is_err());
    }

    #[test]
    fn test_unix_timestamp_is_current() {
        let now = (chrono::Utc::now().timestamp() & 0xFFFF_FFFF) as u32;
        assert!(unix_timestamp().wrapping_sub(now) <= 1);
    }
}
