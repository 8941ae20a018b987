//! TLS configuration errors

use std::io;
use std::path::PathBuf;

/// Errors raised while building a [`TlsDialConfig`](super::TlsDialConfig).
///
/// Handshake failures are reported through
/// [`DialError`](crate::error::DialError) instead; these only cover
/// setting up trust roots and protocol versions.
#[derive(Debug, thiserror::Error)]
pub enum TlsConfigError {
    #[error("cannot read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("no certificates found in {}", .0.display())]
    NoCertificates(PathBuf),
    #[error("no trusted root certificates could be loaded")]
    EmptyRootStore,
    #[error("rustls rejected the configuration: {0}")]
    Rustls(#[from] rustls::Error),
}
