//! tcpbinddev public API
//!
//! Fluent entry point over the device-bound dialer in `tcpbinddev_client`.
//!
//! ```no_run
//! use std::time::Duration;
//!
//! use tcpbinddev::BindDev;
//!
//! # async fn run() -> tcpbinddev::Result<()> {
//! let stream = BindDev::tcp4("192.0.2.10:8090")
//!     .device("eth1")
//!     .timeout(Duration::from_secs(3))
//!     .connect()
//!     .await?;
//! # drop(stream);
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]
#![warn(clippy::all)]

pub mod builder;

pub use builder::BindDev;

// Re-export important types from client package
pub use tcpbinddev_client::error::Result;
pub use tcpbinddev_client::{
    DialError, DialRequest, Network, SocketConfig, TlsConfigError, TlsConnection, TlsDialConfig,
    dial, dial_blocking, dial_bound_to_device, dial_bound_to_device_blocking, dial_tls,
    dial_tls_bound_to_device,
};
