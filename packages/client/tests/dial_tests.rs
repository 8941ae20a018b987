mod common;

use std::io::{Read, Write};
use std::net::{Ipv4Addr, SocketAddr, TcpListener as StdListener};
use std::time::{Duration, Instant};

use tcpbinddev_client::{
    BindTarget, DialError, DialRequest, Network, SocketConfig, dial, dial_blocking,
    dial_bound_to_device, dial_bound_to_device_blocking,
};
use tokio::io::{AsyncReadExt, AsyncWriteExt};

use common::{LOOPBACK, echo_server};

#[tokio::test]
async fn test_round_trip_without_constraints() {
    let addr = echo_server().await;

    let mut stream = dial_bound_to_device("tcp4", &addr.to_string(), None, None, Duration::from_secs(3))
        .await
        .expect("Failed to dial echo server");
    assert_eq!(stream.peer_addr().expect("Failed to read peer address"), addr);

    stream.write_all(b"ping").await.expect("Failed to write");
    let mut buf = [0u8; 4];
    stream.read_exact(&mut buf).await.expect("Failed to read echo");
    assert_eq!(&buf, b"ping");
}

#[tokio::test]
async fn test_zero_deadline_waits_until_connected() {
    let addr = echo_server().await;

    let stream = dial_bound_to_device("tcp4", &addr.to_string(), Some(""), Some(""), Duration::ZERO)
        .await
        .expect("Zero deadline dial should succeed");
    assert!(stream.nodelay().expect("Failed to read TCP_NODELAY"));
}

#[test]
fn test_blocking_round_trip() {
    let listener = StdListener::bind((Ipv4Addr::LOCALHOST, 0)).expect("Failed to bind listener");
    let addr = listener.local_addr().expect("Failed to read listener address");
    let server = std::thread::spawn(move || {
        let (mut stream, _) = listener.accept().expect("Failed to accept");
        let mut buf = [0u8; 5];
        stream.read_exact(&mut buf).expect("Failed to read");
        stream.write_all(&buf).expect("Failed to echo");
    });

    let mut stream =
        dial_bound_to_device_blocking("tcp4", &addr.to_string(), None, None, Duration::from_secs(3))
            .expect("Failed to dial");
    stream.write_all(b"hello").expect("Failed to write");
    let mut buf = [0u8; 5];
    stream.read_exact(&mut buf).expect("Failed to read echo");
    assert_eq!(&buf, b"hello");
    server.join().expect("Server thread panicked");
}

#[tokio::test]
async fn test_unsupported_network_is_rejected() {
    for network in ["udp4", "tcp", "unix", ""] {
        match dial_bound_to_device(network, "127.0.0.1:80", None, None, Duration::ZERO).await {
            Err(DialError::UnsupportedNetwork(got)) => assert_eq!(got, network),
            other => panic!("expected UnsupportedNetwork for {network:?}, got {other:?}"),
        }
    }
}

#[tokio::test]
async fn test_empty_address_is_rejected() {
    let err = dial_bound_to_device("tcp4", "", None, None, Duration::ZERO)
        .await
        .expect_err("Empty address should fail");
    assert!(matches!(err, DialError::InvalidArgument(_)));
}

#[tokio::test]
async fn test_interface_binding_uses_loopback() {
    let addr = echo_server().await;

    match dial_bound_to_device("tcp4", &addr.to_string(), None, Some(LOOPBACK), Duration::from_secs(3)).await {
        Ok(stream) => {
            let local = stream.local_addr().expect("Failed to read local address");
            assert!(local.ip().is_loopback(), "local address {local} is not on {LOOPBACK}");

            #[cfg(target_os = "linux")]
            {
                let bound = socket2::SockRef::from(&stream)
                    .device()
                    .expect("Failed to read SO_BINDTODEVICE");
                assert_eq!(bound.as_deref(), Some(LOOPBACK.as_bytes()));
            }
        }
        // Binding to a device may need CAP_NET_RAW.
        Err(DialError::Bind {
            target: BindTarget::Device(_),
            source,
        }) if source.raw_os_error() == Some(libc::EPERM) => {
            eprintln!("skipping: not permitted to bind to {LOOPBACK}");
        }
        Err(err) => panic!("loopback-bound dial failed: {err}"),
    }
}

#[cfg(target_os = "linux")]
#[tokio::test]
async fn test_unbound_dial_leaves_device_unset() {
    let addr = echo_server().await;

    let stream = dial_bound_to_device("tcp4", &addr.to_string(), None, None, Duration::from_secs(3))
        .await
        .expect("Failed to dial echo server");
    let bound = socket2::SockRef::from(&stream)
        .device()
        .expect("Failed to read SO_BINDTODEVICE");
    assert_eq!(bound, None);
}

#[tokio::test]
async fn test_unknown_interface_is_reported() {
    let addr = echo_server().await;

    match dial_bound_to_device("tcp4", &addr.to_string(), None, Some("binddev-none0"), Duration::from_secs(1)).await {
        Err(DialError::InterfaceNotFound { interface, .. }) => assert_eq!(interface, "binddev-none0"),
        other => panic!("expected InterfaceNotFound, got {other:?}"),
    }
}

#[tokio::test]
async fn test_source_address_is_used() {
    let addr = echo_server().await;
    let source_port = {
        let probe = StdListener::bind((Ipv4Addr::LOCALHOST, 0)).expect("Failed to probe port");
        probe.local_addr().expect("Failed to read probe address").port()
    };
    let source = SocketAddr::from((Ipv4Addr::LOCALHOST, source_port));

    let stream = dial_bound_to_device(
        "tcp4",
        &addr.to_string(),
        Some(&source.to_string()),
        None,
        Duration::from_secs(3),
    )
    .await
    .expect("Failed to dial from source address");
    assert_eq!(stream.local_addr().expect("Failed to read local address"), source);
}

#[tokio::test]
async fn test_source_of_other_family_fails_resolution() {
    let addr = echo_server().await;

    match dial_bound_to_device("tcp4", &addr.to_string(), Some("[::1]:0"), None, Duration::from_secs(1)).await {
        Err(DialError::Resolution { network, address, .. }) => {
            assert_eq!(network, Network::Tcp4);
            assert_eq!(address, "[::1]:0");
        }
        other => panic!("expected Resolution error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_refused_connect_is_a_temporary_connect_error() {
    let closed = {
        let listener = StdListener::bind((Ipv4Addr::LOCALHOST, 0)).expect("Failed to bind listener");
        listener.local_addr().expect("Failed to read listener address")
    };

    let err = dial(DialRequest::new(Network::Tcp4, closed.to_string()).with_timeout(Duration::from_secs(3)))
        .await
        .expect_err("Closed port should refuse");
    match &err {
        DialError::ConnectFailed { target, source } => {
            assert_eq!(target.address, closed);
            assert_eq!(source.kind(), std::io::ErrorKind::ConnectionRefused);
        }
        other => panic!("expected ConnectFailed, got {other:?}"),
    }
    assert!(err.is_connect());
    assert!(err.is_temporary());
    assert!(!err.is_timeout());
    assert_eq!(err.raw_os_error(), Some(libc::ECONNREFUSED));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_unroutable_address_respects_deadline() {
    let started = Instant::now();
    let result = dial_bound_to_device("tcp4", "10.255.255.1:80", None, None, Duration::from_secs(1)).await;
    let elapsed = started.elapsed();

    match result {
        Err(err @ DialError::ConnectTimeout { .. }) => {
            assert!(err.is_timeout());
            assert!(elapsed >= Duration::from_millis(900), "returned early after {elapsed:?}");
            assert!(elapsed < Duration::from_millis(1500), "took {elapsed:?}");
        }
        // Hosts without a route fail straight away.
        Err(DialError::ConnectFailed { .. }) => assert!(elapsed < Duration::from_millis(1500)),
        other => panic!("expected timeout against unroutable address, got {other:?}"),
    }
}

#[test]
fn test_request_socket_config_is_applied() {
    let listener = StdListener::bind((Ipv4Addr::LOCALHOST, 0)).expect("Failed to bind listener");
    let request = DialRequest::new(Network::Tcp4, listener.local_addr().expect("address").to_string())
        .with_socket_config(SocketConfig::default().with_nodelay(false))
        .with_timeout(Duration::from_secs(3));

    let stream = dial_blocking(&request).expect("Failed to dial");
    assert!(!stream.nodelay().expect("Failed to read TCP_NODELAY"));
}

#[tokio::test]
async fn test_ipv6_loopback_when_available() {
    let Ok(listener) = tokio::net::TcpListener::bind("[::1]:0").await else {
        eprintln!("skipping: no IPv6 loopback");
        return;
    };
    let addr = listener.local_addr().expect("Failed to read listener address");

    let stream = dial_bound_to_device("tcp6", &addr.to_string(), None, None, Duration::from_secs(3))
        .await
        .expect("Failed to dial IPv6 loopback");
    assert!(stream.local_addr().expect("local address").is_ipv6());
}
