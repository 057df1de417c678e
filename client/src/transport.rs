//! Single-shot UDP delivery

use std::net::{SocketAddr, ToSocketAddrs, UdpSocket};

use anyhow::{Context, Result};
use tracing::{debug, info};

/// Resolve `host:port` to the first IPv4 address; pftabled only listens on
/// AF_INET sockets.
pub fn resolve(host: &str, port: u16) -> Result<SocketAddr> {
    let mut addrs = (host, port)
        .to_socket_addrs()
        .with_context(|| format!("Unable to resolve '{host}'"))?;

    addrs
        .find(SocketAddr::is_ipv4)
        .with_context(|| format!("No IPv4 address found for '{host}'"))
}

/// Send one datagram and return without waiting for any reply.
pub fn send(host: &str, port: u16, payload: &[u8]) -> Result<()> {
    let dest = resolve(host, port)?;
    debug!("Resolved {host} to {dest}");

    let socket = UdpSocket::bind(("0.0.0.0", 0)).context("Error binding socket")?;
    let sent = socket
        .send_to(payload, dest)
        .with_context(|| format!("Unable to send message to {dest}"))?;

    info!("Sent {sent}-byte datagram to {dest}");
    Ok(())
}
