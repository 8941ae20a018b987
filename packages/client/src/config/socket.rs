//! Socket option configuration
//!
//! Options applied to every dialed socket before it is bound and connected.

/// Socket option provider trait
pub trait SocketConfigProvider {
    fn reuse_address(&self) -> bool;
    fn nodelay(&self) -> bool;
}

/// Runtime socket option configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SocketConfig {
    /// `SO_REUSEADDR`: lets a recently released local port be bound again
    /// without waiting for `TIME_WAIT` to drain.
    pub reuse_address: bool,
    /// `TCP_NODELAY`: send small writes immediately instead of coalescing
    /// them. Callers can switch it back off on the returned stream.
    pub nodelay: bool,
}

impl Default for SocketConfig {
    fn default() -> Self {
        Self {
            reuse_address: true,
            nodelay: true,
        }
    }
}

impl SocketConfig {
    /// Leave both options at the operating system defaults.
    #[must_use]
    pub fn system_defaults() -> Self {
        Self {
            reuse_address: false,
            nodelay: false,
        }
    }

    #[must_use]
    pub fn with_reuse_address(mut self, enabled: bool) -> Self {
        self.reuse_address = enabled;
        self
    }

    #[must_use]
    pub fn with_nodelay(mut self, enabled: bool) -> Self {
        self.nodelay = enabled;
        self
    }
}

impl SocketConfigProvider for SocketConfig {
    #[inline]
    fn reuse_address(&self) -> bool {
        self.reuse_address
    }

    #[inline]
    fn nodelay(&self) -> bool {
        self.nodelay
    }
}
