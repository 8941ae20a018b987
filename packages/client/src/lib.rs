//! # tcpbinddev client
//!
//! Device-bound, deadline-aware TCP dialing with an optional TLS layer.
//!
//! A dial creates its socket by hand so it can be pinned to a network
//! interface (`SO_BINDTODEVICE` on Linux, `IP_BOUND_IF` on Apple systems)
//! and optionally to a source address before connecting. The connect runs
//! non-blocking and is bounded by a caller-supplied deadline; the connected
//! descriptor is then handed to tokio (or returned as a blocking
//! [`std::net::TcpStream`]).
//!
//! ## Features
//!
//! - **Interface binding** selected at build time per platform
//! - **Connect deadlines** with remaining-budget tracking across retries
//! - **Structured errors** with timeout and retry classification
//! - **Rustls TLS** with its own handshake deadline (`tls` feature, on by default)
//!
//! ## Usage
//!
//! ```no_run
//! use std::time::Duration;
//!
//! use tcpbinddev_client::{DialRequest, Network, dial};
//!
//! # async fn run() -> tcpbinddev_client::error::Result<()> {
//! let request = DialRequest::new(Network::Tcp4, "192.0.2.10:8090")
//!     .with_interface(Some("eth1"))
//!     .with_source(Some("10.0.0.5:0"))
//!     .with_timeout(Duration::from_secs(3));
//! let stream = dial(request).await?;
//! # drop(stream);
//! # Ok(())
//! # }
//! ```

#![warn(clippy::all)]

pub mod config;
pub mod connect;
pub mod error;
pub mod prelude;
#[cfg(feature = "tls")]
pub mod tls;

pub use config::{Deadline, SocketConfig, SocketConfigProvider};
pub use connect::{
    DeviceBinder, DialRequest, Interface, Network, PlatformBinder, dial, dial_blocking,
    dial_bound_to_device, dial_bound_to_device_blocking,
};
pub use error::{BindTarget, DialError, DialTarget};
#[cfg(feature = "tls")]
pub use tls::{TlsConfigError, TlsConnection, TlsDialConfig, dial_tls, dial_tls_bound_to_device};
