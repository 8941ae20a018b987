//! Shared fixtures for the integration tests

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::Arc;

use rustls::RootCertStore;
use rustls::pki_types::{CertificateDer, PrivateKeyDer, PrivatePkcs8KeyDer};
use tcpbinddev_client::TlsDialConfig;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio_rustls::TlsAcceptor;

#[cfg(target_os = "linux")]
pub const LOOPBACK: &str = "lo";
#[cfg(not(target_os = "linux"))]
pub const LOOPBACK: &str = "lo0";

/// A self-signed certificate and its key.
pub struct TestCert {
    pub cert: CertificateDer<'static>,
    pub key: PrivateKeyDer<'static>,
}

pub fn self_signed(names: &[&str]) -> TestCert {
    let key = rcgen::KeyPair::generate().expect("Failed to generate key pair");
    let params = rcgen::CertificateParams::new(
        names.iter().map(|name| (*name).to_owned()).collect::<Vec<_>>(),
    )
    .expect("Failed to build certificate params");
    let cert = params.self_signed(&key).expect("Failed to self-sign certificate");

    TestCert {
        cert: cert.der().clone(),
        key: PrivateKeyDer::Pkcs8(PrivatePkcs8KeyDer::from(key.serialize_der())),
    }
}

pub fn acceptor(cert: &TestCert) -> TlsAcceptor {
    let config = rustls::ServerConfig::builder_with_provider(Arc::new(
        rustls::crypto::ring::default_provider(),
    ))
    .with_safe_default_protocol_versions()
    .expect("Failed to select protocol versions")
    .with_no_client_auth()
    .with_single_cert(vec![cert.cert.clone()], cert.key.clone_key())
    .expect("Failed to build server config");
    TlsAcceptor::from(Arc::new(config))
}

/// Client configuration that trusts only `cert`.
pub fn trusting(cert: &TestCert) -> TlsDialConfig {
    let mut roots = RootCertStore::empty();
    roots.add(cert.cert.clone()).expect("Failed to add test root");
    TlsDialConfig::with_root_certificates(roots).expect("Failed to build client config")
}

/// Plain TCP echo server for a single connection.
pub async fn echo_server() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind echo listener");
    let addr = listener.local_addr().expect("Failed to read listener address");

    tokio::spawn(async move {
        if let Ok((mut stream, _)) = listener.accept().await {
            let mut buf = [0u8; 1024];
            while let Ok(n) = stream.read(&mut buf).await {
                if n == 0 || stream.write_all(&buf[..n]).await.is_err() {
                    break;
                }
            }
        }
    });

    addr
}

/// TLS echo server for a single connection.
pub async fn tls_echo_server(cert: &TestCert) -> SocketAddr {
    let acceptor = acceptor(cert);
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind TLS listener");
    let addr = listener.local_addr().expect("Failed to read listener address");

    tokio::spawn(async move {
        let Ok((stream, _)) = listener.accept().await else {
            return;
        };
        let Ok(mut tls) = acceptor.accept(stream).await else {
            return;
        };
        let mut buf = [0u8; 1024];
        while let Ok(n) = tls.read(&mut buf).await {
            if n == 0 || tls.write_all(&buf[..n]).await.is_err() || tls.flush().await.is_err() {
                break;
            }
        }
    });

    addr
}
