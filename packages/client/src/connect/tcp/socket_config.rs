//! Pre-connect socket configuration
//!
//! Applies option flags and local bindings to a freshly created socket.
//! Failures carry the option or bind target that was being applied.

use std::net::SocketAddr;

use socket2::Socket;

use crate::config::SocketConfigProvider;
use crate::error::{BindTarget, DialError};

/// Apply `SO_REUSEADDR` and `TCP_NODELAY` as configured.
pub fn apply_socket_config(
    socket: &Socket,
    config: &impl SocketConfigProvider,
) -> Result<(), DialError> {
    if config.reuse_address() {
        socket
            .set_reuse_address(true)
            .map_err(|source| DialError::SocketOption {
                option: "SO_REUSEADDR",
                source,
            })?;
    }

    if config.nodelay() {
        socket
            .set_tcp_nodelay(true)
            .map_err(|source| DialError::SocketOption {
                option: "TCP_NODELAY",
                source,
            })?;
    }

    Ok(())
}

/// Bind the socket's local end to `source`.
pub fn bind_source(socket: &Socket, source: SocketAddr) -> Result<(), DialError> {
    socket
        .bind(&source.into())
        .map_err(|err| DialError::Bind {
            target: BindTarget::Source(source),
            source: err,
        })?;
    tracing::debug!(%source, "socket bound to source address");
    Ok(())
}
