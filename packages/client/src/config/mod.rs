//! Dialer configuration
//!
//! Socket option defaults and deadline tracking shared by the TCP dialer and
//! the TLS wrapper.

pub mod socket;
pub mod timeouts;

pub use socket::{SocketConfig, SocketConfigProvider};
pub use timeouts::{Deadline, budget_from};
