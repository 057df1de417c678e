//! Dry-run rendering of an encoded datagram

use anyhow::{Context, Result};
use pftabled_proto::{Message, HEADER_LEN};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct DatagramReport {
    pub destination: String,
    pub length: usize,
    pub version: u8,
    pub command: String,
    pub command_code: u8,
    pub address: String,
    pub netmask: u8,
    pub table: String,
    pub timestamp: u32,
    pub header: String,
    pub tag: String,
}

impl DatagramReport {
    pub fn from_datagram(host: &str, port: u16, datagram: &[u8]) -> Result<Self> {
        let (message, tag) =
            Message::decode(datagram).context("Encoded datagram failed to decode")?;

        Ok(Self {
            destination: format!("{host}:{port}"),
            length: datagram.len(),
            version: message.version,
            command: message.command.to_string(),
            command_code: message.command.code(),
            address: message.target.address.to_string(),
            netmask: message.target.netmask,
            table: message.table_name(),
            timestamp: message.timestamp,
            header: to_hex(&datagram[..HEADER_LEN]),
            tag: to_hex(&tag),
        })
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).context("Failed to serialize report")
    }
}

fn to_hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}
