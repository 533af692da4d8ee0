// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Transports deliver resolved metrics to a collector.
//!
//! influxstats does not aggregate, buffer, sample or retry; every measurement
//! is one synchronous call into a [`Transport`]. Implementations:
//!
//! - [`UdpTransport`] - statsd lines over UDP, with influx or datadog style tags
//! - [`RecordingTransport`] - keeps events in memory, for tests and assertions
//! - [`NoopTransport`] - discards everything

mod memory;
mod udp;

use std::time::Duration;

use crate::error::TransportError;
use crate::naming::Tags;

pub use memory::{Event, RecordingTransport, Sample};
pub use udp::{encode, TagFormat, UdpTransport, DEFAULT_HOST, DEFAULT_PORT};

/// Delivery capability consumed by clients.
///
/// Names arrive fully prefixed and tags fully merged; a transport only has to
/// encode and send.
pub trait Transport: Send + Sync {
    /// Add `value` to a counter.
    fn increment(&self, name: &str, value: i64, tags: &Tags) -> Result<(), TransportError>;

    /// Record a duration.
    fn timing(&self, name: &str, duration: Duration, tags: &Tags) -> Result<(), TransportError>;

    /// Set a gauge to an instantaneous value.
    fn gauge(&self, name: &str, value: f64, tags: &Tags) -> Result<(), TransportError>;
}

/// Transport that drops every measurement.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopTransport;

impl Transport for NoopTransport {
    fn increment(&self, _name: &str, _value: i64, _tags: &Tags) -> Result<(), TransportError> {
        Ok(())
    }

    fn timing(&self, _name: &str, _duration: Duration, _tags: &Tags) -> Result<(), TransportError> {
        Ok(())
    }

    fn gauge(&self, _name: &str, _value: f64, _tags: &Tags) -> Result<(), TransportError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_noop_transport_accepts_everything() {
        let transport = NoopTransport;
        let tags = Tags::new();
        assert!(transport.increment("a", 1, &tags).is_ok());
        assert!(transport.timing("a", Duration::from_millis(5), &tags).is_ok());
        assert!(transport.gauge("a", -1.5, &tags).is_ok());
    }

    #[test]
    fn test_transport_is_object_safe() {
        let transports: Vec<Box<dyn Transport>> =
            vec![Box::new(NoopTransport), Box::new(RecordingTransport::new())];
        for transport in &transports {
            transport.increment("x", 1, &Tags::new()).unwrap();
        }
    }
}
