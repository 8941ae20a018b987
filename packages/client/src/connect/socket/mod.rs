//! Platform socket primitives
//!
//! Raw-descriptor operations the dialer is built on: creating a
//! non-blocking close-on-exec socket, binding it to an egress interface and
//! waiting for a non-blocking connect to finish.
//!
//! Descriptors are held as [`socket2::Socket`], so a socket that never makes
//! it into a connection is closed exactly once when it goes out of scope.

pub mod device;

use std::io;
use std::os::fd::AsRawFd;

use socket2::{Domain, Protocol, Socket, Type};

use crate::config::Deadline;

pub use device::{DeviceBinder, Interface, PlatformBinder, bind_to_interface};

/// Create a socket with `FD_CLOEXEC` and `O_NONBLOCK` set.
///
/// On Linux and Android both flags are passed to `socket(2)` so they are set
/// atomically. Kernels that reject the flags (`EINVAL`/`EPROTONOSUPPORT`)
/// fall back to [`create_socket_two_step`].
#[cfg(any(target_os = "linux", target_os = "android"))]
pub fn create_socket(domain: Domain, ty: Type, protocol: Option<Protocol>) -> io::Result<Socket> {
    // socket2 adds SOCK_CLOEXEC on these targets.
    match Socket::new(domain, ty.nonblocking(), protocol) {
        Ok(socket) => Ok(socket),
        Err(err)
            if matches!(
                err.raw_os_error(),
                Some(libc::EINVAL) | Some(libc::EPROTONOSUPPORT)
            ) =>
        {
            tracing::debug!("atomic socket flags rejected ({err}), setting them after creation");
            create_socket_two_step(domain, ty, protocol)
        }
        Err(err) => Err(err),
    }
}

/// Create a socket with `FD_CLOEXEC` and `O_NONBLOCK` set.
///
/// This platform has no atomic creation flags, so the descriptor is created
/// first and configured right after.
#[cfg(not(any(target_os = "linux", target_os = "android")))]
pub fn create_socket(domain: Domain, ty: Type, protocol: Option<Protocol>) -> io::Result<Socket> {
    create_socket_two_step(domain, ty, protocol)
}

/// Create a plain socket, then set close-on-exec and non-blocking mode.
///
/// A process that forks and execs between the two steps can inherit the
/// descriptor; the window is limited to that race.
pub fn create_socket_two_step(
    domain: Domain,
    ty: Type,
    protocol: Option<Protocol>,
) -> io::Result<Socket> {
    let socket = Socket::new_raw(domain, ty, protocol)?;
    socket.set_cloexec(true)?;
    #[cfg(target_vendor = "apple")]
    socket.set_nosigpipe(true)?;
    socket.set_nonblocking(true)?;
    Ok(socket)
}

/// Why a connect wait ended without a connection.
#[derive(Debug)]
pub enum WaitError {
    /// The deadline passed before the socket became writable.
    Elapsed,
    /// The wait itself failed, or the socket reported a connect error.
    Failed(io::Error),
}

/// Wait for a connect issued on a non-blocking socket to complete.
///
/// Blocks the calling thread until the socket is writable or `deadline`
/// expires, then reads `SO_ERROR`: anything nonzero is returned as
/// [`WaitError::Failed`]. A clean `SO_ERROR` only counts as connected when the
/// socket has a peer; a hung-up or peerless socket fails with `ENOTCONN`.
/// Interrupted or early wakeups wait again for the remaining time only.
pub fn await_connect_completion(socket: &Socket, deadline: &Deadline) -> Result<(), WaitError> {
    let mut pfd = libc::pollfd {
        fd: socket.as_raw_fd(),
        events: libc::POLLOUT,
        revents: 0,
    };

    loop {
        if deadline.is_expired() {
            return Err(WaitError::Elapsed);
        }

        pfd.revents = 0;
        let ret = unsafe { libc::poll(&mut pfd, 1, deadline.poll_timeout_ms()) };

        if ret < 0 {
            let err = io::Error::last_os_error();
            if err.kind() == io::ErrorKind::Interrupted {
                tracing::trace!(fd = pfd.fd, remaining = ?deadline.remaining(), "poll interrupted, re-arming");
                continue;
            }
            return Err(WaitError::Failed(err));
        }

        if ret > 0 {
            break;
        }
        // ret == 0: loop re-checks the deadline, so a wakeup that came in
        // early waits only for what is left.
    }

    if pfd.revents & libc::POLLNVAL != 0 {
        return Err(WaitError::Failed(io::Error::from_raw_os_error(libc::EBADF)));
    }

    match socket.take_error() {
        Ok(None) => {}
        Ok(Some(err)) | Err(err) => return Err(WaitError::Failed(err)),
    }

    // A socket with no connect in flight polls as POLLOUT|POLLHUP.
    if pfd.revents & libc::POLLHUP != 0 {
        return Err(WaitError::Failed(io::Error::from_raw_os_error(libc::ENOTCONN)));
    }
    socket.peer_addr().map(drop).map_err(WaitError::Failed)
}
