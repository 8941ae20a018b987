//! Dial execution for `BindDev`

use std::net::TcpStream as StdTcpStream;

use tcpbinddev_client::error::Result;
use tcpbinddev_client::{TlsConnection, TlsDialConfig, dial, dial_blocking, dial_tls};
use tokio::net::TcpStream;

use super::core::BindDev;

impl BindDev {
    /// Dial and return a tokio stream.
    ///
    /// # Errors
    ///
    /// Any [`DialError`](tcpbinddev_client::DialError) from the dial.
    pub async fn connect(self) -> Result<TcpStream> {
        self.log_start("tcp");
        let debug = self.debug_enabled;
        let result = dial(self.request).await;
        log_outcome(debug, &result);
        result
    }

    /// Dial on the calling thread and return a blocking std stream.
    ///
    /// # Errors
    ///
    /// Any [`DialError`](tcpbinddev_client::DialError) from the dial.
    pub fn connect_blocking(self) -> Result<StdTcpStream> {
        self.log_start("tcp");
        let result = dial_blocking(&self.request);
        log_outcome(self.debug_enabled, &result);
        result
    }

    /// Dial and complete a TLS handshake using `config`.
    ///
    /// # Errors
    ///
    /// Any [`DialError`](tcpbinddev_client::DialError) from the dial or the
    /// handshake.
    pub async fn connect_tls(self, config: &TlsDialConfig) -> Result<TlsConnection> {
        self.log_start("tls");
        let debug = self.debug_enabled;
        let result = dial_tls(self.request, Some(config)).await;
        log_outcome(debug, &result);
        result
    }

    fn log_start(&self, proto: &str) {
        if self.debug_enabled {
            tracing::info!(
                proto,
                network = %self.request.network(),
                address = self.request.address(),
                source = ?self.request.source(),
                device = ?self.request.interface(),
                timeout = ?self.request.timeout(),
                "dialing"
            );
        }
    }
}

fn log_outcome<T>(debug: bool, result: &Result<T>) {
    if !debug {
        return;
    }
    match result {
        Ok(_) => tracing::info!("dial succeeded"),
        Err(e) => tracing::info!(timeout = e.is_timeout(), "dial failed: {e}"),
    }
}
