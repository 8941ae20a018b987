//! Descriptor accounting across failed dials.
//!
//! Kept in its own test binary with a single test so nothing else opens or
//! closes descriptors while the count is taken.

#![cfg(target_os = "linux")]

use std::net::{Ipv4Addr, TcpListener};
use std::time::Duration;

use tcpbinddev_client::{DialError, dial_bound_to_device_blocking};

fn open_descriptors() -> usize {
    std::fs::read_dir("/proc/self/fd")
        .expect("Failed to list /proc/self/fd")
        .count()
}

#[test]
fn test_failed_dials_release_their_descriptors() {
    let closed = {
        let listener = TcpListener::bind((Ipv4Addr::LOCALHOST, 0)).expect("Failed to bind listener");
        listener.local_addr().expect("Failed to read listener address").to_string()
    };
    let occupied = TcpListener::bind((Ipv4Addr::LOCALHOST, 0)).expect("Failed to bind listener");
    let occupied_addr = occupied.local_addr().expect("Failed to read listener address").to_string();

    let before = open_descriptors();

    for _ in 0..100 {
        // Refused after the socket was created and configured.
        let err = dial_bound_to_device_blocking("tcp4", &closed, None, None, Duration::from_secs(1))
            .expect_err("Closed port should refuse");
        assert!(matches!(err, DialError::ConnectFailed { .. }), "{err}");

        // Fails during interface lookup.
        let err = dial_bound_to_device_blocking("tcp4", &closed, None, Some("binddev-none0"), Duration::from_secs(1))
            .expect_err("Unknown interface should fail");
        assert!(matches!(err, DialError::InterfaceNotFound { .. }), "{err}");

        // Fails while binding the source address.
        let err = dial_bound_to_device_blocking("tcp4", &closed, Some(&occupied_addr), None, Duration::from_secs(1))
            .expect_err("Occupied source should fail");
        assert!(matches!(err, DialError::Bind { .. }), "{err}");
    }

    for _ in 0..5 {
        // Deadline expiry, or an immediate failure on hosts without a route.
        let err = dial_bound_to_device_blocking("tcp4", "10.255.255.1:80", None, None, Duration::from_millis(20))
            .expect_err("Unroutable address should not connect");
        assert!(err.is_connect(), "{err}");
    }

    assert_eq!(open_descriptors(), before, "descriptors leaked by failed dials");
}
