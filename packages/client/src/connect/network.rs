//! Network family tags accepted by the dialer

use std::fmt;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr};
use std::str::FromStr;

use socket2::Domain;

use crate::error::DialError;

/// Address family of a dial: `tcp4` or `tcp6`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Network {
    Tcp4,
    Tcp6,
}

impl Network {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Network::Tcp4 => "tcp4",
            Network::Tcp6 => "tcp6",
        }
    }

    /// Socket domain used to create descriptors for this family.
    #[must_use]
    pub fn domain(self) -> Domain {
        match self {
            Network::Tcp4 => Domain::IPV4,
            Network::Tcp6 => Domain::IPV6,
        }
    }

    /// Wildcard address of this family, used when an address has an empty host.
    #[must_use]
    pub fn unspecified(self) -> IpAddr {
        match self {
            Network::Tcp4 => IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            Network::Tcp6 => IpAddr::V6(Ipv6Addr::UNSPECIFIED),
        }
    }

    #[must_use]
    pub fn matches_ip(self, ip: &IpAddr) -> bool {
        matches!(
            (self, ip),
            (Network::Tcp4, IpAddr::V4(_)) | (Network::Tcp6, IpAddr::V6(_))
        )
    }

    #[must_use]
    pub fn matches(self, addr: &SocketAddr) -> bool {
        self.matches_ip(&addr.ip())
    }
}

impl FromStr for Network {
    type Err = DialError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "tcp4" => Ok(Network::Tcp4),
            "tcp6" => Ok(Network::Tcp6),
            other => Err(DialError::UnsupportedNetwork(other.to_owned())),
        }
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
