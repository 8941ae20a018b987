//! Device-bound connection establishment
//!
//! [`socket`] holds the raw-descriptor primitives, [`tcp`] builds the dialer
//! on top of them.

pub mod network;
pub mod socket;
pub mod tcp;

pub use network::Network;
pub use socket::{DeviceBinder, Interface, PlatformBinder, bind_to_interface};
pub use tcp::{
    DialRequest, dial, dial_blocking, dial_bound_to_device, dial_bound_to_device_blocking,
    resolve_endpoint,
};
