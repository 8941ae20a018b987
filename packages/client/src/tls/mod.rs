//! TLS over device-bound connections
//!
//! [`dial_tls`] runs the regular dialer, then performs a rustls client
//! handshake on the resulting stream under its own deadline. Root stores and
//! verifier policy live in [`TlsDialConfig`].

pub mod config;
pub mod dial;
pub mod errors;

pub use config::TlsDialConfig;
pub use dial::{TlsConnection, derive_server_name, dial_tls, dial_tls_bound_to_device};
pub use errors::TlsConfigError;
