// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Statsd over UDP.
//!
//! Lines are encoded the way python-statsd sends them, with tags in either
//! influx (telegraf) or datadog style:
//!
//! ```text
//! influx:  app.calls,def=run,module=app.jobs:1|c
//! datadog: app.calls:1|c|#def:run,module:app.jobs
//! ```

use std::fmt;
use std::net::{SocketAddr, ToSocketAddrs, UdpSocket};
use std::time::Duration;

use cadence::{MetricSink, UdpMetricSink};
use serde::{Deserialize, Serialize};

use super::{Sample, Transport};
use crate::error::TransportError;
use crate::naming::Tags;

/// Default statsd host.
pub const DEFAULT_HOST: &str = "localhost";

/// Default statsd port.
pub const DEFAULT_PORT: u16 = 8125;

/// How tags are attached to a statsd line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TagFormat {
    /// `name,k=v:value|type`
    #[default]
    Influx,
    /// `name:value|type|#k:v`
    Datadog,
}

/// Statsd transport delivering one datagram per measurement through a
/// `cadence` [`MetricSink`].
///
/// Encoding stays here: cadence only knows datadog-style tags and whole
/// milliseconds.
pub struct UdpTransport {
    sink: Box<dyn MetricSink + Send + Sync>,
    peer: SocketAddr,
    format: TagFormat,
}

impl UdpTransport {
    /// Resolve `host:port`, bind an ephemeral local socket and build a
    /// [`UdpMetricSink`] sending to it.
    pub fn connect(host: &str, port: u16, format: TagFormat) -> Result<Self, TransportError> {
        let peer = (host, port)
            .to_socket_addrs()
            .map_err(|_| TransportError::Resolve {
                host: host.to_string(),
                port,
            })?
            .next()
            .ok_or_else(|| TransportError::Resolve {
                host: host.to_string(),
                port,
            })?;

        let local = if peer.is_ipv4() { "0.0.0.0:0" } else { "[::]:0" };
        let socket = UdpSocket::bind(local)?;
        socket.set_nonblocking(true)?;
        let sink = UdpMetricSink::from(peer, socket)?;

        tracing::debug!(%peer, ?format, "statsd transport connected");

        Ok(Self {
            sink: Box::new(sink),
            peer,
            format,
        })
    }

    /// The resolved collector address.
    pub fn peer(&self) -> SocketAddr {
        self.peer
    }

    pub fn format(&self) -> TagFormat {
        self.format
    }

    fn send(&self, name: &str, sample: Sample, tags: &Tags) -> Result<(), TransportError> {
        let payload = encode(name, sample, tags, self.format);
        tracing::trace!(payload = %payload, "statsd send");
        self.sink.emit(&payload)?;
        Ok(())
    }
}

impl fmt::Debug for UdpTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UdpTransport")
            .field("peer", &self.peer)
            .field("format", &self.format)
            .finish_non_exhaustive()
    }
}

impl Transport for UdpTransport {
    fn increment(&self, name: &str, value: i64, tags: &Tags) -> Result<(), TransportError> {
        self.send(name, Sample::Count(value), tags)
    }

    fn timing(&self, name: &str, duration: Duration, tags: &Tags) -> Result<(), TransportError> {
        self.send(name, Sample::Timing(duration), tags)
    }

    fn gauge(&self, name: &str, value: f64, tags: &Tags) -> Result<(), TransportError> {
        self.send(name, Sample::Gauge(value), tags)
    }
}

/// Encode one measurement as a statsd payload.
///
/// A negative gauge is a delta in statsd, so an absolute negative value is sent
/// as a reset to zero followed by the value, newline separated.
pub fn encode(name: &str, sample: Sample, tags: &Tags, format: TagFormat) -> String {
    let value = match sample {
        Sample::Count(value) => format!("{value}|c"),
        Sample::Timing(duration) => format!("{:.6}|ms", duration.as_secs_f64() * 1000.0),
        Sample::Gauge(value) if value < 0.0 => {
            return format!(
                "{}\n{}",
                line(name, "0|g", tags, format),
                line(name, &format!("{value}|g"), tags, format)
            );
        }
        Sample::Gauge(value) => format!("{value}|g"),
    };
    line(name, &value, tags, format)
}

fn line(name: &str, value: &str, tags: &Tags, format: TagFormat) -> String {
    let name = sanitize(name);
    if tags.is_empty() {
        return format!("{name}:{value}");
    }

    match format {
        TagFormat::Influx => {
            let tags = tags
                .iter()
                .map(|(k, v)| format!("{}={}", sanitize(k), sanitize(v)))
                .collect::<Vec<_>>()
                .join(",");
            format!("{name},{tags}:{value}")
        }
        TagFormat::Datadog => {
            let tags = tags
                .iter()
                .map(|(k, v)| format!("{}:{}", sanitize(k), sanitize(v)))
                .collect::<Vec<_>>()
                .join(",");
            format!("{name}:{value}|#{tags}")
        }
    }
}

/// Replace characters that would split or corrupt a line.
fn sanitize(raw: &str) -> String {
    raw.chars()
        .map(|c| match c {
            ',' | '=' | ':' | '|' | '#' | '@' => '_',
            c if c.is_whitespace() => '_',
            c => c,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tags;

    fn tags() -> Tags {
        tags! { "module" => "tests.test_metrics", "service" => "test", "def" => "wrapped_fn" }
    }

    #[test]
    fn test_encode_influx_counter() {
        insta::assert_snapshot!(
            encode("test.calls", Sample::Count(1), &tags(), TagFormat::Influx),
            @"test.calls,def=wrapped_fn,module=tests.test_metrics,service=test:1|c"
        );
    }

    #[test]
    fn test_encode_influx_timing() {
        insta::assert_snapshot!(
            encode("test.duration", Sample::Timing(Duration::from_micros(12_345)), &tags(), TagFormat::Influx),
            @"test.duration,def=wrapped_fn,module=tests.test_metrics,service=test:12.345000|ms"
        );
    }

    #[test]
    fn test_encode_datadog() {
        insta::assert_snapshot!(
            encode("test.calls", Sample::Count(3), &tags(), TagFormat::Datadog),
            @"test.calls:3|c|#def:wrapped_fn,module:tests.test_metrics,service:test"
        );
    }

    #[test]
    fn test_encode_without_tags() {
        assert_eq!(
            encode("fool", Sample::Count(1), &Tags::new(), TagFormat::Influx),
            "fool:1|c"
        );
        assert_eq!(
            encode("depth", Sample::Gauge(3.5), &Tags::new(), TagFormat::Datadog),
            "depth:3.5|g"
        );
    }

    #[test]
    fn test_encode_negative_gauge_resets_first() {
        assert_eq!(
            encode("temp", Sample::Gauge(-3.0), &Tags::new(), TagFormat::Influx),
            "temp:0|g\ntemp:-3|g"
        );
    }

    #[test]
    fn test_encode_sanitizes_tags() {
        let tags = tags! { "path" => "/a b,c=d", "k:ey" => "v|1" };
        assert_eq!(
            encode("x", Sample::Count(1), &tags, TagFormat::Influx),
            "x,k_ey=v_1,path=/a_b_c_d:1|c"
        );
    }

    #[test]
    fn test_connect_unresolvable_host() {
        let err = UdpTransport::connect("invalid host name with spaces", 8125, TagFormat::Influx)
            .unwrap_err();
        assert!(matches!(err, TransportError::Resolve { .. }));
    }
}
