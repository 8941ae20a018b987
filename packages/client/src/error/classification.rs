use std::io;

use super::types::DialError;

impl DialError {
    /// Returns true if the error is related to a timeout.
    ///
    /// Covers both deadlines enforced by the dialer (connect and handshake)
    /// and a TCP-level `ETIMEDOUT` reported through the socket error.
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        match self {
            DialError::ConnectTimeout { .. } | DialError::HandshakeTimeout { .. } => true,
            DialError::ConnectFailed { source, .. } | DialError::Handshake { source, .. } => {
                source.kind() == io::ErrorKind::TimedOut
            }
            _ => false,
        }
    }

    /// Returns true if retrying the same dial later may succeed.
    #[must_use]
    pub fn is_temporary(&self) -> bool {
        match self {
            DialError::ConnectTimeout { .. } | DialError::HandshakeTimeout { .. } => true,
            DialError::ConnectFailed { source, .. } => is_transient(source),
            _ => false,
        }
    }

    /// Returns true if the error happened while connecting, after the socket
    /// was set up.
    #[must_use]
    pub fn is_connect(&self) -> bool {
        matches!(
            self,
            DialError::ConnectTimeout { .. } | DialError::ConnectFailed { .. }
        )
    }

    /// Returns true if the error comes from the TLS layer.
    #[must_use]
    pub fn is_tls(&self) -> bool {
        matches!(
            self,
            DialError::ConfigMissing
                | DialError::HandshakeTimeout { .. }
                | DialError::Handshake { .. }
        )
    }

    /// Platform error code behind this error, if one was reported.
    #[must_use]
    pub fn raw_os_error(&self) -> Option<i32> {
        self.io_source().and_then(io::Error::raw_os_error)
    }

    fn io_source(&self) -> Option<&io::Error> {
        match self {
            DialError::Resolution { source, .. }
            | DialError::SocketCreate { source, .. }
            | DialError::InterfaceNotFound { source, .. }
            | DialError::Bind { source, .. }
            | DialError::SocketOption { source, .. }
            | DialError::ConnectFailed { source, .. }
            | DialError::ConnectionWrap { source, .. }
            | DialError::Handshake { source, .. } => Some(source),
            _ => None,
        }
    }
}

fn is_transient(err: &io::Error) -> bool {
    matches!(
        err.kind(),
        io::ErrorKind::ConnectionRefused
            | io::ErrorKind::ConnectionReset
            | io::ErrorKind::ConnectionAborted
            | io::ErrorKind::TimedOut
            | io::ErrorKind::WouldBlock
            | io::ErrorKind::Interrupted
    ) || matches!(
        err.raw_os_error(),
        Some(libc::ENETDOWN)
            | Some(libc::ENETUNREACH)
            | Some(libc::EHOSTUNREACH)
            | Some(libc::EHOSTDOWN)
    )
}
