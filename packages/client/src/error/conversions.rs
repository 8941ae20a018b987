use std::io;

use super::types::DialError;

impl From<DialError> for io::Error {
    fn from(error: DialError) -> Self {
        let kind = match &error {
            DialError::InvalidArgument(_)
            | DialError::UnsupportedNetwork(_)
            | DialError::ConfigMissing => io::ErrorKind::InvalidInput,
            DialError::InterfaceNotFound { .. } => io::ErrorKind::NotFound,
            DialError::Cancelled => io::ErrorKind::Interrupted,
            DialError::ConnectTimeout { .. } | DialError::HandshakeTimeout { .. } => {
                io::ErrorKind::TimedOut
            }
            DialError::Resolution { source, .. }
            | DialError::SocketCreate { source, .. }
            | DialError::Bind { source, .. }
            | DialError::SocketOption { source, .. }
            | DialError::ConnectFailed { source, .. }
            | DialError::ConnectionWrap { source, .. }
            | DialError::Handshake { source, .. } => source.kind(),
        };
        io::Error::new(kind, error)
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[test]
    fn timeouts_map_to_timed_out() {
        let err: io::Error = DialError::HandshakeTimeout {
            server_name: "example.com".into(),
            timeout: Duration::from_secs(1),
        }
        .into();
        assert_eq!(err.kind(), io::ErrorKind::TimedOut);
        assert!(err.get_ref().is_some_and(|inner| inner.is::<DialError>()));
    }

    #[test]
    fn argument_errors_map_to_invalid_input() {
        let err: io::Error = DialError::UnsupportedNetwork("udp4".into()).into();
        assert_eq!(err.kind(), io::ErrorKind::InvalidInput);
    }
}
