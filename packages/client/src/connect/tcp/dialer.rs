//! Bind-aware TCP dialer
//!
//! The dial sequence, in order:
//!
//! 1. validate the request and resolve the destination
//! 2. create a non-blocking close-on-exec socket
//! 3. apply socket options, then the interface and source bindings
//! 4. issue a non-blocking connect and wait for it within the deadline
//! 5. hand the descriptor over to a [`std::net::TcpStream`] (and, on the async
//!    path, to tokio's reactor)
//!
//! The socket is an owned [`Socket`] until step 5 moves it into the stream,
//! so every early return closes it exactly once.

use std::io;
use std::net::SocketAddr;
use std::os::fd::AsRawFd;
use std::time::Duration;

use socket2::{Protocol, Socket, Type};
use tokio::net::TcpStream;

use super::request::DialRequest;
use super::resolve::resolve_endpoint;
use super::socket_config::{apply_socket_config, bind_source};
use crate::config::Deadline;
use crate::connect::socket::{WaitError, await_connect_completion, bind_to_interface, create_socket};
use crate::error::{DialError, DialTarget, Result};

/// Dial `address` over `network`, optionally bound to `source` and forced
/// out of `interface`, giving up after `timeout` (`Duration::ZERO` waits
/// indefinitely).
///
/// ```no_run
/// # async fn run() -> Result<(), Box<dyn std::error::Error>> {
/// use std::time::Duration;
///
/// let stream = tcpbinddev_client::dial_bound_to_device(
///     "tcp4",
///     "192.0.2.10:8090",
///     None,
///     Some("eth1"),
///     Duration::from_secs(3),
/// )
/// .await?;
/// println!("connected from {}", stream.local_addr()?);
/// # Ok(())
/// # }
/// ```
///
/// # Errors
///
/// Any [`DialError`] from the dial sequence. No descriptor is left open when
/// an error is returned.
pub async fn dial_bound_to_device(
    network: &str,
    address: &str,
    source: Option<&str>,
    interface: Option<&str>,
    timeout: Duration,
) -> Result<TcpStream> {
    let request = DialRequest::from_parts(network, address, source, interface, timeout)?;
    dial(request).await
}

/// Blocking form of [`dial_bound_to_device`], returning a blocking-mode
/// [`std::net::TcpStream`].
///
/// # Errors
///
/// Same as [`dial_bound_to_device`].
pub fn dial_bound_to_device_blocking(
    network: &str,
    address: &str,
    source: Option<&str>,
    interface: Option<&str>,
    timeout: Duration,
) -> Result<std::net::TcpStream> {
    let request = DialRequest::from_parts(network, address, source, interface, timeout)?;
    dial_blocking(&request)
}

/// Dial as described by `request` and register the stream with tokio.
///
/// The connect wait runs on the blocking pool so only that worker is parked
/// while the handshake with the peer's kernel is in flight.
///
/// # Errors
///
/// Any [`DialError`] from the dial sequence; [`DialError::ConnectionWrap`]
/// if the connected socket cannot be registered with the reactor.
pub async fn dial(request: DialRequest) -> Result<TcpStream> {
    let (socket, remote) = match tokio::task::spawn_blocking(move || connect_socket(&request)).await {
        Ok(result) => result?,
        Err(err) if err.is_panic() => std::panic::resume_unwind(err.into_panic()),
        Err(_) => return Err(DialError::Cancelled),
    };

    let std_stream: std::net::TcpStream = socket.into();
    TcpStream::from_std(std_stream).map_err(|source| DialError::ConnectionWrap {
        address: remote,
        source,
    })
}

/// Dial as described by `request` on the calling thread.
///
/// # Errors
///
/// Any [`DialError`] from the dial sequence.
pub fn dial_blocking(request: &DialRequest) -> Result<std::net::TcpStream> {
    let (socket, _) = connect_socket(request)?;
    socket
        .set_nonblocking(false)
        .map_err(|source| DialError::SocketOption {
            option: "O_NONBLOCK",
            source,
        })?;
    Ok(socket.into())
}

/// Run the dial sequence up to an established, still non-blocking socket.
fn connect_socket(request: &DialRequest) -> Result<(Socket, SocketAddr)> {
    request.validate()?;
    let network = request.network();
    let remote = resolve_endpoint(network, request.address())?;

    let socket = create_socket(network.domain(), Type::STREAM, Some(Protocol::TCP))
        .map_err(|source| DialError::SocketCreate { network, source })?;
    tracing::trace!(fd = socket.as_raw_fd(), %network, "socket created");

    apply_socket_config(&socket, request.socket_config())?;

    if let Some(name) = request.interface() {
        bind_to_interface(&socket, network, name)?;
    }

    if let Some(source) = request.source() {
        let local = resolve_endpoint(network, source)?;
        bind_source(&socket, local)?;
    }

    let target = DialTarget::new(remote, request.interface());
    let deadline = Deadline::start(request.timeout());
    tracing::debug!(%target, timeout = ?request.timeout(), "connecting");

    match socket.connect(&remote.into()) {
        Ok(()) => {
            tracing::trace!(%target, "connect completed immediately");
            return Ok((socket, remote));
        }
        Err(err) if connect_in_progress(&err) => {}
        Err(source) => return Err(DialError::ConnectFailed { target, source }),
    }

    match await_connect_completion(&socket, &deadline) {
        Ok(()) => {}
        Err(WaitError::Elapsed) => {
            tracing::debug!(%target, "connect deadline elapsed");
            return Err(DialError::ConnectTimeout {
                target,
                timeout: request.timeout(),
            });
        }
        Err(WaitError::Failed(source)) => {
            return Err(DialError::ConnectFailed { target, source });
        }
    }

    let local = socket.local_addr().ok().and_then(|addr| addr.as_socket());
    tracing::debug!(local = ?local, peer = %remote, "connected");
    Ok((socket, remote))
}

/// `EINPROGRESS`, or `EINTR` after which the kernel keeps connecting.
/// `EAGAIN` means the connect was never started and is a failure.
fn connect_in_progress(err: &io::Error) -> bool {
    matches!(err.raw_os_error(), Some(libc::EINPROGRESS) | Some(libc::EINTR))
}
