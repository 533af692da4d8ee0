// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Wire-level tests against a local UDP socket standing in for statsd.

use std::net::UdpSocket;
use std::sync::Arc;
use std::time::Duration;

use influxstats::{get_client, tags, Client, Measure, Namespace, TagFormat, UdpTransport};

fn collector() -> (UdpSocket, u16) {
    let socket = UdpSocket::bind("127.0.0.1:0").unwrap();
    socket
        .set_read_timeout(Some(Duration::from_secs(5)))
        .unwrap();
    let port = socket.local_addr().unwrap().port();
    (socket, port)
}

fn recv(socket: &UdpSocket) -> String {
    let mut buf = [0u8; 2048];
    let len = socket.recv(&mut buf).unwrap();
    String::from_utf8_lossy(&buf[..len]).into_owned()
}

fn wrapped_fn() {}

#[test]
fn test_get_client_sends_influx_lines() {
    let (socket, port) = collector();
    let client = get_client("test", "tests::test_metrics", None, "127.0.0.1", port).unwrap();

    client.incr("fool").unwrap();
    assert_eq!(
        recv(&socket),
        "test.tests.test_metrics.fool,module=tests.test_metrics,service=test:1|c"
    );
}

#[test]
fn test_wrapped_function_over_udp() {
    let (socket, port) = collector();
    let client = get_client("test", "tests::test_metrics", None, "127.0.0.1", port).unwrap();
    let wrapped = client.measure_function().wrap(wrapped_fn).unwrap();

    wrapped.call(());

    assert_eq!(
        recv(&socket),
        "test.tests.test_metrics.calls,def=wrapped_fn,module=udp_transport,service=test:1|c"
    );
    let timing = recv(&socket);
    assert!(
        timing.starts_with(
            "test.tests.test_metrics.duration,def=wrapped_fn,module=udp_transport,service=test:"
        ),
        "{timing}"
    );
    assert!(timing.ends_with("|ms"), "{timing}");
}

#[test]
fn test_datadog_format_and_negative_gauge() {
    let (socket, port) = collector();
    let transport = UdpTransport::connect("127.0.0.1", port, TagFormat::Datadog).unwrap();
    let client = Client::new(
        Namespace::new("svc", "", tags! { "env" => "prod" }),
        Arc::new(transport),
    );

    client.gauge("temperature", -3.0, &tags! { "room" => "a,b" }).unwrap();

    assert_eq!(
        recv(&socket),
        "svc.temperature:0|g|#env:prod,room:a_b,service:svc\nsvc.temperature:-3|g|#env:prod,room:a_b,service:svc"
    );
}

#[test]
fn test_transport_reports_peer() {
    let (_socket, port) = collector();
    let transport = UdpTransport::connect("127.0.0.1", port, TagFormat::Influx).unwrap();
    assert_eq!(transport.peer().port(), port);
    assert!(transport.peer().ip().is_loopback());
    assert_eq!(transport.format(), TagFormat::Influx);
}
