//! Dial request description

use std::time::Duration;

use crate::config::SocketConfig;
use crate::connect::Network;
use crate::error::DialError;

/// Everything needed for one dial attempt.
///
/// Empty source or interface strings are treated as absent, so values taken
/// straight from flags or config files need no pre-filtering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DialRequest {
    network: Network,
    address: String,
    source: Option<String>,
    interface: Option<String>,
    timeout: Duration,
    socket: SocketConfig,
}

impl DialRequest {
    /// A request with no source, no interface and no deadline.
    pub fn new(network: Network, address: impl Into<String>) -> Self {
        Self {
            network,
            address: address.into(),
            source: None,
            interface: None,
            timeout: Duration::ZERO,
            socket: SocketConfig::default(),
        }
    }

    /// Build a request from loosely typed parts.
    ///
    /// # Errors
    ///
    /// [`DialError::UnsupportedNetwork`] unless `network` is `tcp4` or `tcp6`.
    pub fn from_parts(
        network: &str,
        address: &str,
        source: Option<&str>,
        interface: Option<&str>,
        timeout: Duration,
    ) -> Result<Self, DialError> {
        let network = network.parse::<Network>()?;
        Ok(Self::new(network, address)
            .with_source(source)
            .with_interface(interface)
            .with_timeout(timeout))
    }

    #[must_use]
    pub fn with_source<S: AsRef<str>>(mut self, source: Option<S>) -> Self {
        self.source = non_empty(source);
        self
    }

    #[must_use]
    pub fn with_interface<S: AsRef<str>>(mut self, interface: Option<S>) -> Self {
        self.interface = non_empty(interface);
        self
    }

    /// Connect deadline; `Duration::ZERO` waits indefinitely.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    #[must_use]
    pub fn with_socket_config(mut self, socket: SocketConfig) -> Self {
        self.socket = socket;
        self
    }

    #[must_use]
    pub fn network(&self) -> Network {
        self.network
    }

    #[must_use]
    pub fn address(&self) -> &str {
        &self.address
    }

    #[must_use]
    pub fn source(&self) -> Option<&str> {
        self.source.as_deref()
    }

    #[must_use]
    pub fn interface(&self) -> Option<&str> {
        self.interface.as_deref()
    }

    #[must_use]
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    #[must_use]
    pub fn socket_config(&self) -> &SocketConfig {
        &self.socket
    }

    /// Check the request before any descriptor is created.
    ///
    /// # Errors
    ///
    /// [`DialError::InvalidArgument`] when the destination is empty.
    pub fn validate(&self) -> Result<(), DialError> {
        if self.address.trim().is_empty() {
            return Err(DialError::InvalidArgument(
                "destination address is empty".to_owned(),
            ));
        }
        Ok(())
    }
}

fn non_empty<S: AsRef<str>>(value: Option<S>) -> Option<String> {
    value
        .map(|s| s.as_ref().to_owned())
        .filter(|s| !s.is_empty())
}
