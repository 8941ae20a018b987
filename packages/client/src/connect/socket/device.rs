//! Egress interface binding
//!
//! Forcing a socket out of a given interface takes a different socket option
//! on each platform family: Linux binds by interface *name*
//! (`SO_BINDTODEVICE`), Apple systems bind by interface *index*
//! (`IP_BOUND_IF` / `IPV6_BOUND_IF`). Both sit behind [`DeviceBinder`];
//! [`PlatformBinder`] names the implementation compiled for the target.

use std::ffi::CString;
use std::io;
use std::num::NonZeroU32;

use socket2::Socket;

use crate::connect::Network;
use crate::error::{BindTarget, DialError};

/// A network interface resolved from its name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Interface {
    name: String,
    index: NonZeroU32,
}

impl Interface {
    /// Look up an interface by name through `if_nametoindex(3)`.
    pub fn by_name(name: &str) -> io::Result<Self> {
        let c_name = CString::new(name).map_err(|_| {
            io::Error::new(
                io::ErrorKind::InvalidInput,
                "interface name contains a NUL byte",
            )
        })?;

        let index = unsafe { libc::if_nametoindex(c_name.as_ptr()) };
        match NonZeroU32::new(index) {
            Some(index) => Ok(Self {
                name: name.to_owned(),
                index,
            }),
            None => Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("no interface named {name:?}"),
            )),
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn index(&self) -> NonZeroU32 {
        self.index
    }
}

/// Applies device-scoped egress binding to a socket.
pub trait DeviceBinder {
    /// Socket option used, for diagnostics.
    const MECHANISM: &'static str;

    fn bind_device(socket: &Socket, network: Network, interface: &Interface) -> io::Result<()>;
}

/// Name-based binding via `SO_BINDTODEVICE`.
#[cfg(any(target_os = "linux", target_os = "android", target_os = "fuchsia"))]
#[derive(Debug, Clone, Copy)]
pub struct NameBinder;

#[cfg(any(target_os = "linux", target_os = "android", target_os = "fuchsia"))]
impl DeviceBinder for NameBinder {
    const MECHANISM: &'static str = "SO_BINDTODEVICE";

    fn bind_device(socket: &Socket, _network: Network, interface: &Interface) -> io::Result<()> {
        socket.bind_device(Some(interface.name().as_bytes()))
    }
}

/// Index-based binding via `IP_BOUND_IF` / `IPV6_BOUND_IF`.
#[cfg(target_vendor = "apple")]
#[derive(Debug, Clone, Copy)]
pub struct IndexBinder;

#[cfg(target_vendor = "apple")]
impl DeviceBinder for IndexBinder {
    const MECHANISM: &'static str = "IP_BOUND_IF";

    fn bind_device(socket: &Socket, network: Network, interface: &Interface) -> io::Result<()> {
        match network {
            Network::Tcp4 => socket.bind_device_by_index_v4(Some(interface.index())),
            Network::Tcp6 => socket.bind_device_by_index_v6(Some(interface.index())),
        }
    }
}

/// Targets without a device-binding socket option.
#[cfg(not(any(
    target_os = "linux",
    target_os = "android",
    target_os = "fuchsia",
    target_vendor = "apple"
)))]
#[derive(Debug, Clone, Copy)]
pub struct UnsupportedBinder;

#[cfg(not(any(
    target_os = "linux",
    target_os = "android",
    target_os = "fuchsia",
    target_vendor = "apple"
)))]
impl DeviceBinder for UnsupportedBinder {
    const MECHANISM: &'static str = "none";

    fn bind_device(_socket: &Socket, _network: Network, _interface: &Interface) -> io::Result<()> {
        Err(io::Error::new(
            io::ErrorKind::Unsupported,
            "binding a socket to an interface is not supported on this platform",
        ))
    }
}

#[cfg(any(target_os = "linux", target_os = "android", target_os = "fuchsia"))]
pub type PlatformBinder = NameBinder;

#[cfg(target_vendor = "apple")]
pub type PlatformBinder = IndexBinder;

#[cfg(not(any(
    target_os = "linux",
    target_os = "android",
    target_os = "fuchsia",
    target_vendor = "apple"
)))]
pub type PlatformBinder = UnsupportedBinder;

/// Resolve `name` and bind the socket's egress path to that interface.
///
/// # Errors
///
/// - [`DialError::InterfaceNotFound`] when no interface has that name
/// - [`DialError::Bind`] when the option cannot be applied (e.g. missing
///   `CAP_NET_RAW` on older Linux kernels)
pub fn bind_to_interface(
    socket: &Socket,
    network: Network,
    name: &str,
) -> Result<Interface, DialError> {
    let interface = Interface::by_name(name).map_err(|source| DialError::InterfaceNotFound {
        interface: name.to_owned(),
        source,
    })?;

    PlatformBinder::bind_device(socket, network, &interface).map_err(|source| DialError::Bind {
        target: BindTarget::Device(name.to_owned()),
        source,
    })?;

    tracing::debug!(
        interface = name,
        index = interface.index().get(),
        mechanism = PlatformBinder::MECHANISM,
        "socket bound to interface"
    );
    Ok(interface)
}
