//! TCP dialing with interface binding and a connect deadline
//!
//! Resolution, socket option setup and the connect sequence itself, split
//! the way the dial proceeds.

pub mod dialer;
pub mod request;
pub mod resolve;
pub mod socket_config;

pub use dialer::{dial, dial_blocking, dial_bound_to_device, dial_bound_to_device_blocking};
pub use request::DialRequest;
pub use resolve::{resolve_endpoint, split_host_port};
pub use socket_config::{apply_socket_config, bind_source};
