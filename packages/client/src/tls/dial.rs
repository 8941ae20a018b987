//! TLS handshake over a device-bound connection
//!
//! The handshake deadline is armed once the TCP connection is up, so a dial
//! with a 3s timeout may spend up to 3s connecting and another 3s in the
//! handshake.

use std::time::Duration;

use rustls::pki_types::ServerName;
use tokio::net::TcpStream;
use tokio_rustls::TlsConnector;

use super::config::TlsDialConfig;
use crate::config::budget_from;
use crate::connect::tcp::resolve::split_zone;
use crate::connect::tcp::{DialRequest, dial, split_host_port};
use crate::error::{DialError, Result};

/// A TLS client session over a dialed TCP stream.
pub type TlsConnection = tokio_rustls::client::TlsStream<TcpStream>;

/// [`dial_bound_to_device`](crate::dial_bound_to_device) followed by a TLS
/// handshake bounded by the same `timeout`.
///
/// # Errors
///
/// [`DialError::ConfigMissing`] when `config` is `None`, any error from the
/// TCP dial unchanged, or a handshake failure or timeout.
pub async fn dial_tls_bound_to_device(
    network: &str,
    address: &str,
    source: Option<&str>,
    interface: Option<&str>,
    timeout: Duration,
    config: Option<&TlsDialConfig>,
) -> Result<TlsConnection> {
    let config = config.ok_or(DialError::ConfigMissing)?;
    let request = DialRequest::from_parts(network, address, source, interface, timeout)?;
    dial_tls(request, Some(config)).await
}

/// Dial as described by `request`, then run a TLS client handshake on the
/// connection.
///
/// If the handshake fails or its deadline passes, the TCP connection is
/// closed before the error is returned.
///
/// # Errors
///
/// See [`dial_tls_bound_to_device`].
pub async fn dial_tls(
    request: DialRequest,
    config: Option<&TlsDialConfig>,
) -> Result<TlsConnection> {
    let config = config.ok_or(DialError::ConfigMissing)?;

    let name = match config.server_name() {
        Some(name) => name.to_owned(),
        None => derive_server_name(request.address())?,
    };
    let server_name = ServerName::try_from(name.clone()).map_err(|err| {
        DialError::InvalidArgument(format!("invalid TLS server name {name:?}: {err}"))
    })?;

    let timeout = request.timeout();
    let stream = dial(request).await?;

    let connector = TlsConnector::from(config.client_config().clone());
    tracing::debug!(server_name = %name, "starting TLS handshake");

    // The handshake future owns the stream; dropping it closes the socket.
    let handshake = connector.connect(server_name, stream);
    let result = match budget_from(timeout) {
        None => handshake.await,
        Some(budget) => tokio::select! {
            result = handshake => result,
            () = tokio::time::sleep(budget) => {
                tracing::debug!(server_name = %name, ?budget, "TLS handshake deadline elapsed");
                return Err(DialError::HandshakeTimeout {
                    server_name: name,
                    timeout: budget,
                });
            }
        },
    };

    match result {
        Ok(tls) => {
            let (_, session) = tls.get_ref();
            tracing::debug!(
                server_name = %name,
                version = ?session.protocol_version(),
                cipher = ?session.negotiated_cipher_suite().map(|suite| suite.suite()),
                "TLS handshake complete"
            );
            Ok(tls)
        }
        Err(source) => {
            tracing::debug!(server_name = %name, error = %source, "TLS handshake failed");
            Err(DialError::Handshake {
                server_name: name,
                source,
            })
        }
    }
}

/// Server name to verify against when none is configured: the host part of
/// `address` without brackets or zone.
///
/// # Errors
///
/// [`DialError::InvalidArgument`] when the address has no usable host.
pub fn derive_server_name(address: &str) -> Result<String> {
    let (host, _) = split_host_port(address).map_err(|err| {
        DialError::InvalidArgument(format!("cannot derive TLS server name from {address:?}: {err}"))
    })?;
    let (host, _) = split_zone(host);
    if host.is_empty() {
        return Err(DialError::InvalidArgument(format!(
            "cannot derive TLS server name from {address:?}: empty host"
        )));
    }
    Ok(host.to_owned())
}
