//! tcpbinddev prelude
//!
//! The types most callers need to dial and handle the result.

pub use crate::config::SocketConfig;
pub use crate::connect::{
    DialRequest, Network, dial, dial_blocking, dial_bound_to_device, dial_bound_to_device_blocking,
};
pub use crate::error::{DialError, Result};

#[cfg(feature = "tls")]
pub use crate::tls::{TlsConnection, TlsDialConfig, dial_tls, dial_tls_bound_to_device};
