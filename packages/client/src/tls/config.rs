//! Client-side TLS configuration
//!
//! Every constructor builds on the `ring` provider with the safe default
//! protocol versions (TLS 1.2 and 1.3).

use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::sync::Arc;

use rustls::client::danger::{HandshakeSignatureValid, ServerCertVerified, ServerCertVerifier};
use rustls::crypto::CryptoProvider;
use rustls::pki_types::{CertificateDer, ServerName, UnixTime};
use rustls::{ClientConfig, ConfigBuilder, DigitallySignedStruct, RootCertStore, SignatureScheme};

use super::errors::TlsConfigError;

/// TLS settings for [`dial_tls`](super::dial_tls).
///
/// The wrapped [`ClientConfig`] is shared and never modified by a dial. When
/// no server name is set, each dial derives one from its destination host.
#[derive(Debug, Clone)]
pub struct TlsDialConfig {
    client_config: Arc<ClientConfig>,
    server_name: Option<String>,
}

impl TlsDialConfig {
    pub fn new(client_config: Arc<ClientConfig>) -> Self {
        Self {
            client_config,
            server_name: None,
        }
    }

    /// Verify the peer against `name` instead of the destination host.
    #[must_use]
    pub fn with_server_name(mut self, name: impl Into<String>) -> Self {
        self.server_name = Some(name.into()).filter(|name: &String| !name.is_empty());
        self
    }

    #[must_use]
    pub fn client_config(&self) -> &Arc<ClientConfig> {
        &self.client_config
    }

    #[must_use]
    pub fn server_name(&self) -> Option<&str> {
        self.server_name.as_deref()
    }

    /// Trust exactly the given roots.
    pub fn with_root_certificates(roots: RootCertStore) -> Result<Self, TlsConfigError> {
        if roots.is_empty() {
            return Err(TlsConfigError::EmptyRootStore);
        }
        let config = builder()?.with_root_certificates(roots).with_no_client_auth();
        Ok(Self::new(Arc::new(config)))
    }

    /// Trust the operating system's certificate store.
    ///
    /// Falls back to the bundled Mozilla roots when the store cannot be read
    /// completely or turns out to be empty.
    pub fn with_native_roots() -> Result<Self, TlsConfigError> {
        let mut roots = RootCertStore::empty();
        let loaded = rustls_native_certs::load_native_certs();
        for cert in loaded.certs {
            if let Err(e) = roots.add(cert) {
                tracing::warn!("Failed to add system certificate: {}", e);
            }
        }

        if !loaded.errors.is_empty() || roots.is_empty() {
            for err in &loaded.errors {
                tracing::warn!("Certificate load error: {}", err);
            }
            roots.extend(webpki_roots::TLS_SERVER_ROOTS.iter().cloned());
        }

        tracing::debug!("Loaded {} root certificates", roots.len());
        Self::with_root_certificates(roots)
    }

    /// Trust the bundled Mozilla root set only.
    pub fn with_webpki_roots() -> Result<Self, TlsConfigError> {
        let mut roots = RootCertStore::empty();
        roots.extend(webpki_roots::TLS_SERVER_ROOTS.iter().cloned());
        Self::with_root_certificates(roots)
    }

    /// Trust the CA certificates in a PEM bundle.
    pub fn from_pem_file(path: impl AsRef<Path>) -> Result<Self, TlsConfigError> {
        let path = path.as_ref();
        let io_err = |source| TlsConfigError::Io {
            path: path.to_path_buf(),
            source,
        };

        let mut reader = BufReader::new(File::open(path).map_err(io_err)?);
        let certs = rustls_pemfile::certs(&mut reader)
            .collect::<Result<Vec<CertificateDer<'static>>, _>>()
            .map_err(io_err)?;
        if certs.is_empty() {
            return Err(TlsConfigError::NoCertificates(path.to_path_buf()));
        }

        let mut roots = RootCertStore::empty();
        let (added, ignored) = roots.add_parsable_certificates(certs);
        if ignored > 0 {
            tracing::warn!(path = %path.display(), ignored, "skipped unparsable CA certificates");
        }
        tracing::debug!(path = %path.display(), added, "loaded CA bundle");
        Self::with_root_certificates(roots)
    }

    /// Accept any server certificate.
    ///
    /// Handshake signatures are still checked, so the peer must hold the key
    /// for the certificate it presents, but the certificate itself is not
    /// validated against any root or name. For test setups only.
    pub fn danger_accept_invalid_certs() -> Result<Self, TlsConfigError> {
        let provider = Arc::new(rustls::crypto::ring::default_provider());
        let config = builder_for(provider.clone())?
            .dangerous()
            .with_custom_certificate_verifier(Arc::new(AcceptAnyServerCert { provider }))
            .with_no_client_auth();
        tracing::warn!("TLS certificate verification is disabled");
        Ok(Self::new(Arc::new(config)))
    }
}

fn builder() -> Result<ConfigBuilder<ClientConfig, rustls::WantsVerifier>, TlsConfigError> {
    builder_for(Arc::new(rustls::crypto::ring::default_provider()))
}

fn builder_for(
    provider: Arc<CryptoProvider>,
) -> Result<ConfigBuilder<ClientConfig, rustls::WantsVerifier>, TlsConfigError> {
    Ok(ClientConfig::builder_with_provider(provider).with_safe_default_protocol_versions()?)
}

#[derive(Debug)]
struct AcceptAnyServerCert {
    provider: Arc<CryptoProvider>,
}

impl ServerCertVerifier for AcceptAnyServerCert {
    fn verify_server_cert(
        &self,
        _end_entity: &CertificateDer<'_>,
        _intermediates: &[CertificateDer<'_>],
        server_name: &ServerName<'_>,
        _ocsp_response: &[u8],
        _now: UnixTime,
    ) -> Result<ServerCertVerified, rustls::Error> {
        tracing::trace!("accepting certificate for {:?} without verification", server_name);
        Ok(ServerCertVerified::assertion())
    }

    fn verify_tls12_signature(
        &self,
        message: &[u8],
        cert: &CertificateDer<'_>,
        dss: &DigitallySignedStruct,
    ) -> Result<HandshakeSignatureValid, rustls::Error> {
        rustls::crypto::verify_tls12_signature(
            message,
            cert,
            dss,
            &self.provider.signature_verification_algorithms,
        )
    }

    fn verify_tls13_signature(
        &self,
        message: &[u8],
        cert: &CertificateDer<'_>,
        dss: &DigitallySignedStruct,
    ) -> Result<HandshakeSignatureValid, rustls::Error> {
        rustls::crypto::verify_tls13_signature(
            message,
            cert,
            dss,
            &self.provider.signature_verification_algorithms,
        )
    }

    fn supported_verify_schemes(&self) -> Vec<SignatureScheme> {
        self.provider
            .signature_verification_algorithms
            .supported_schemes()
    }
}
