use std::fmt;
use std::io;
use std::net::SocketAddr;
use std::time::Duration;

use crate::connect::Network;

/// A Result alias where the Err case is [`DialError`].
pub type Result<T> = std::result::Result<T, DialError>;

/// Errors produced while establishing a device-bound connection.
///
/// Every variant carries enough context (address, interface, option name)
/// to diagnose the failure without re-deriving the dial state. By the time a
/// `DialError` reaches the caller, every descriptor opened for the attempt has
/// already been closed.
#[derive(Debug, thiserror::Error)]
pub enum DialError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("unsupported network {0:?}: only tcp4 and tcp6 are supported")]
    UnsupportedNetwork(String),

    #[error("cannot resolve {network}://{address}: {source}")]
    Resolution {
        network: Network,
        address: String,
        #[source]
        source: io::Error,
    },

    #[error("cannot create {network} socket: {source}")]
    SocketCreate {
        network: Network,
        #[source]
        source: io::Error,
    },

    #[error("interface {interface:?} not found")]
    InterfaceNotFound {
        interface: String,
        #[source]
        source: io::Error,
    },

    #[error("cannot bind socket to {target}: {source}")]
    Bind {
        target: BindTarget,
        #[source]
        source: io::Error,
    },

    #[error("cannot set socket option {option}: {source}")]
    SocketOption {
        option: &'static str,
        #[source]
        source: io::Error,
    },

    #[error("connect to {target} timed out after {timeout:?}")]
    ConnectTimeout { target: DialTarget, timeout: Duration },

    /// The connect attempt failed, either immediately or as reported by the
    /// socket-level error indicator once the socket became writable.
    #[error("connect to {target} failed: {source}")]
    ConnectFailed {
        target: DialTarget,
        #[source]
        source: io::Error,
    },

    #[error("cannot wrap connected socket to {address}: {source}")]
    ConnectionWrap {
        address: SocketAddr,
        #[source]
        source: io::Error,
    },

    /// The blocking dial task was cancelled because its runtime is shutting
    /// down. The socket it owned has been closed.
    #[error("dial task was cancelled")]
    Cancelled,

    #[error("TLS configuration is not set")]
    ConfigMissing,

    #[error("TLS handshake with {server_name} timed out after {timeout:?}")]
    HandshakeTimeout { server_name: String, timeout: Duration },

    #[error("TLS handshake with {server_name} failed: {source}")]
    Handshake {
        server_name: String,
        #[source]
        source: io::Error,
    },
}

/// Remote endpoint of a connect attempt together with the interface it was
/// forced through, if any.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DialTarget {
    pub address: SocketAddr,
    pub interface: Option<String>,
}

impl DialTarget {
    pub fn new(address: SocketAddr, interface: Option<&str>) -> Self {
        Self {
            address,
            interface: interface.map(str::to_owned),
        }
    }
}

impl fmt::Display for DialTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.interface {
            Some(interface) => write!(f, "{} via {}", self.address, interface),
            None => write!(f, "{}", self.address),
        }
    }
}

/// What a failed bind was trying to attach the socket to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BindTarget {
    /// Egress interface (`SO_BINDTODEVICE` / `IP_BOUND_IF`).
    Device(String),
    /// Local source address.
    Source(SocketAddr),
}

impl fmt::Display for BindTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BindTarget::Device(name) => write!(f, "interface {name}"),
            BindTarget::Source(addr) => write!(f, "source address {addr}"),
        }
    }
}
