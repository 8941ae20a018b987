//! Core `BindDev` builder
//!
//! Holds a [`DialRequest`] and exposes chainable setters for each of its
//! parameters.

use std::time::Duration;

use tcpbinddev_client::{DialError, DialRequest, Network, SocketConfig};

/// Fluent builder for one device-bound dial.
#[derive(Debug, Clone)]
pub struct BindDev {
    pub(crate) request: DialRequest,
    /// Log each dial at info level.
    pub(crate) debug_enabled: bool,
}

impl BindDev {
    /// Start building a dial to `address` over `network`.
    pub fn new(network: Network, address: impl Into<String>) -> Self {
        Self {
            request: DialRequest::new(network, address),
            debug_enabled: false,
        }
    }

    /// IPv4 dial to `address`.
    pub fn tcp4(address: impl Into<String>) -> Self {
        Self::new(Network::Tcp4, address)
    }

    /// IPv6 dial to `address`.
    pub fn tcp6(address: impl Into<String>) -> Self {
        Self::new(Network::Tcp6, address)
    }

    /// Start from a network tag (`tcp4` or `tcp6`).
    ///
    /// # Errors
    ///
    /// [`DialError::UnsupportedNetwork`] for any other tag.
    pub fn parse(network: &str, address: impl Into<String>) -> Result<Self, DialError> {
        Ok(Self::new(network.parse()?, address))
    }

    /// Bind the local end to `address` (e.g. `10.0.0.5:0`).
    #[must_use]
    pub fn source(mut self, address: impl Into<String>) -> Self {
        self.request = self.request.with_source(Some(address.into()));
        self
    }

    /// Force traffic out of the named interface.
    #[must_use]
    pub fn device(mut self, interface: impl Into<String>) -> Self {
        self.request = self.request.with_interface(Some(interface.into()));
        self
    }

    /// Connect deadline, also used for the TLS handshake. Zero disables it.
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.request = self.request.with_timeout(timeout);
        self
    }

    #[must_use]
    pub fn nodelay(mut self, enabled: bool) -> Self {
        let socket = self.request.socket_config().with_nodelay(enabled);
        self.request = self.request.with_socket_config(socket);
        self
    }

    #[must_use]
    pub fn reuse_address(mut self, enabled: bool) -> Self {
        let socket = self.request.socket_config().with_reuse_address(enabled);
        self.request = self.request.with_socket_config(socket);
        self
    }

    #[must_use]
    pub fn socket_config(mut self, socket: SocketConfig) -> Self {
        self.request = self.request.with_socket_config(socket);
        self
    }

    /// Log dial start and outcome at info level.
    #[must_use]
    pub fn debug(mut self) -> Self {
        self.debug_enabled = true;
        self
    }

    #[must_use]
    pub fn request(&self) -> &DialRequest {
        &self.request
    }

    #[must_use]
    pub fn into_request(self) -> DialRequest {
        self.request
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_setters_fill_request() {
        let builder = BindDev::tcp6("[::1]:8090")
            .source("[::1]:0")
            .device("lo")
            .timeout(Duration::from_secs(3))
            .nodelay(false);

        let request = builder.request();
        assert_eq!(request.network(), Network::Tcp6);
        assert_eq!(request.address(), "[::1]:8090");
        assert_eq!(request.source(), Some("[::1]:0"));
        assert_eq!(request.interface(), Some("lo"));
        assert_eq!(request.timeout(), Duration::from_secs(3));
        assert!(!request.socket_config().nodelay);
        assert!(request.socket_config().reuse_address);
    }

    #[test]
    fn test_empty_device_is_ignored() {
        let request = BindDev::tcp4("127.0.0.1:80").device("").into_request();
        assert_eq!(request.interface(), None);
    }

    #[test]
    fn test_parse_rejects_unknown_network() {
        assert!(matches!(
            BindDev::parse("udp", "127.0.0.1:80"),
            Err(DialError::UnsupportedNetwork(_))
        ));
    }
}
