//! Address resolution for dial endpoints
//!
//! Turns `host:port` strings into a single [`SocketAddr`] of the requested
//! family. IP literals skip the resolver entirely; anything else goes through
//! the platform resolver and is filtered by family.

use std::io;
use std::net::{IpAddr, SocketAddr, SocketAddrV6, ToSocketAddrs};

use crate::connect::Network;
use crate::connect::socket::Interface;
use crate::error::DialError;

/// Resolve `address` into an endpoint of the given family.
///
/// Accepted forms: `1.2.3.4:80`, `[::1]:80`, `[fe80::1%eth0]:80`,
/// `example.com:443` and `:80` (empty host, meaning the unspecified
/// address). The port must be numeric.
///
/// # Errors
///
/// [`DialError::Resolution`] wrapping the underlying cause.
pub fn resolve_endpoint(network: Network, address: &str) -> Result<SocketAddr, DialError> {
    resolve(network, address).map_err(|source| DialError::Resolution {
        network,
        address: address.to_owned(),
        source,
    })
}

fn resolve(network: Network, address: &str) -> io::Result<SocketAddr> {
    let (host, port) = split_host_port(address)?;
    let port = parse_port(port)?;
    let (host, zone) = split_zone(host);

    if host.is_empty() {
        if zone.is_some() {
            return Err(invalid("zone given without a host"));
        }
        return Ok(SocketAddr::new(network.unspecified(), port));
    }

    // Fast path for IP literals, no resolver round trip.
    if let Ok(ip) = host.parse::<IpAddr>() {
        let ip = match (network, ip) {
            (Network::Tcp4, IpAddr::V6(v6)) => match v6.to_ipv4_mapped() {
                Some(v4) => IpAddr::V4(v4),
                None => return Err(family_mismatch(network, host)),
            },
            (_, ip) if network.matches_ip(&ip) => ip,
            _ => return Err(family_mismatch(network, host)),
        };
        return with_zone(SocketAddr::new(ip, port), zone);
    }

    let resolved = (host, port)
        .to_socket_addrs()?
        .find(|addr| network.matches(addr))
        .ok_or_else(|| family_mismatch(network, host))?;
    tracing::trace!(host, %resolved, "resolved hostname");
    with_zone(resolved, zone)
}

/// Split `host:port`, honoring `[...]` around IPv6 hosts.
///
/// The host may be empty (`:80`); the port may not. A bare IPv6 address
/// without brackets is rejected since its last group is indistinguishable
/// from a port.
pub fn split_host_port(address: &str) -> io::Result<(&str, &str)> {
    if let Some(rest) = address.strip_prefix('[') {
        let (host, after) = rest
            .split_once(']')
            .ok_or_else(|| invalid("missing ']' in address"))?;
        let port = after
            .strip_prefix(':')
            .ok_or_else(|| invalid("missing port in address"))?;
        if host.contains(['[', ']']) || port.contains([':', '[', ']']) {
            return Err(invalid("unexpected bracket or colon in address"));
        }
        return Ok((host, port));
    }

    let (host, port) = address
        .rsplit_once(':')
        .ok_or_else(|| invalid("missing port in address"))?;
    if host.contains(':') {
        return Err(invalid("too many colons in address"));
    }
    if host.contains(['[', ']']) {
        return Err(invalid("unexpected bracket in address"));
    }
    Ok((host, port))
}

/// Split off an IPv6 `%zone` suffix.
pub(crate) fn split_zone(host: &str) -> (&str, Option<&str>) {
    match host.split_once('%') {
        Some((host, zone)) => (host, Some(zone)),
        None => (host, None),
    }
}

fn parse_port(port: &str) -> io::Result<u16> {
    if port.is_empty() {
        return Err(invalid("missing port in address"));
    }
    port.parse::<u16>()
        .map_err(|_| invalid(format!("invalid port {port:?}")))
}

fn with_zone(addr: SocketAddr, zone: Option<&str>) -> io::Result<SocketAddr> {
    let Some(zone) = zone else {
        return Ok(addr);
    };
    match addr {
        SocketAddr::V4(_) => Err(invalid("zone is only valid for IPv6 addresses")),
        SocketAddr::V6(v6) => {
            let scope_id = zone_to_scope_id(zone)?;
            Ok(SocketAddr::V6(SocketAddrV6::new(
                *v6.ip(),
                v6.port(),
                v6.flowinfo(),
                scope_id,
            )))
        }
    }
}

/// Zones are either a numeric scope id or an interface name.
fn zone_to_scope_id(zone: &str) -> io::Result<u32> {
    if zone.is_empty() {
        return Err(invalid("empty zone in address"));
    }
    if let Ok(id) = zone.parse::<u32>() {
        return Ok(id);
    }
    Interface::by_name(zone).map(|interface| interface.index().get())
}

fn family_mismatch(network: Network, host: &str) -> io::Error {
    io::Error::new(
        io::ErrorKind::NotFound,
        format!("no {network} address found for {host:?}"),
    )
}

fn invalid(msg: impl Into<String>) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidInput, msg.into())
}
