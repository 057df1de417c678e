//! Address/netmask pair carried by add and del commands

use std::fmt;
use std::net::Ipv4Addr;

use crate::error::ProtoError;

/// Netmask used when no `/n` suffix is given.
pub const HOST_NETMASK: u8 = 32;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Target {
    pub address: Ipv4Addr,
    pub netmask: u8,
}

impl Default for Target {
    fn default() -> Self {
        Self {
            address: Ipv4Addr::UNSPECIFIED,
            netmask: HOST_NETMASK,
        }
    }
}

impl Target {
    pub fn new(address: Ipv4Addr, netmask: u8) -> Self {
        Self { address, netmask }
    }

    /// Parse `a.b.c.d` or `a.b.c.d/n`.
    ///
    /// The netmask is not range-checked against 32: anything that fits in a
    /// byte is accepted and left for the daemon to judge.
    pub fn parse(input: &str) -> Result<Self, ProtoError> {
        let (addr, netmask) = match input.split_once('/') {
            Some((addr, mask)) => (addr, parse_netmask(mask)?),
            None => (input, HOST_NETMASK),
        };

        let address = addr
            .parse::<Ipv4Addr>()
            .map_err(|_| ProtoError::InvalidAddress(addr.to_string()))?;

        Ok(Self { address, netmask })
    }

    /// Address with host bits cleared, as the daemon applies it to a table.
    pub fn network(&self) -> Ipv4Addr {
        if self.netmask >= 32 {
            return self.address;
        }
        let mask = u32::MAX
            .checked_shl(32 - u32::from(self.netmask))
            .unwrap_or(0);
        Ipv4Addr::from(u32::from(self.address) & mask)
    }
}

fn parse_netmask(mask: &str) -> Result<u8, ProtoError> {
    if mask.is_empty() || !mask.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ProtoError::InvalidNetmask(mask.to_string()));
    }
    mask.parse::<u8>()
        .map_err(|_| ProtoError::InvalidNetmask(mask.to_string()))
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.address, self.netmask)
    }
}
