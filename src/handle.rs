// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Ad-hoc measurements: the [`Measure`] trait and the per-call handle.

use std::time::{Duration, Instant};

use crate::client::Client;
use crate::error::Result;
use crate::identity::Identity;
use crate::naming::{MetricKind, Tags};
use crate::telemetry::report_emit_failure;

/// Ad-hoc measurement operations.
///
/// Implemented by [`Client`] (no call context) and [`MeasurementHandle`]
/// (tagged with the current call's identity). Each call goes straight to the
/// transport; failures are returned, never swallowed.
pub trait Measure {
    /// Add `value` to the counter named by `fragment`.
    fn increment(&self, fragment: &str, value: i64, extra_tags: &Tags) -> Result<()>;

    /// Record a duration.
    fn timing(&self, fragment: &str, duration: Duration, extra_tags: &Tags) -> Result<()>;

    /// Record an instantaneous value.
    fn gauge(&self, fragment: &str, value: f64, extra_tags: &Tags) -> Result<()>;

    /// Increment by one with no extra tags.
    fn incr(&self, fragment: &str) -> Result<()> {
        self.increment(fragment, 1, &Tags::new())
    }
}

/// Measurement handle bound to one invocation of a wrapped function.
///
/// Borrows everything it needs, so it cannot outlive the call it was made for.
#[derive(Debug, Clone, Copy)]
pub struct MeasurementHandle<'a> {
    client: &'a Client,
    identity: &'a Identity,
    extra_tags: &'a Tags,
}

impl<'a> MeasurementHandle<'a> {
    pub(crate) fn new(client: &'a Client, identity: &'a Identity, extra_tags: &'a Tags) -> Self {
        Self {
            client,
            identity,
            extra_tags,
        }
    }

    /// The identity of the call this handle belongs to.
    pub fn identity(&self) -> &Identity {
        self.identity
    }
}

impl Measure for MeasurementHandle<'_> {
    fn increment(&self, fragment: &str, value: i64, extra_tags: &Tags) -> Result<()> {
        let metric = self.client.namespace().build(
            Some(self.identity),
            MetricKind::Custom,
            Some(fragment),
            &[self.extra_tags, extra_tags],
        )?;
        self.client.transport().increment(&metric.name, value, &metric.tags)?;
        Ok(())
    }

    fn timing(&self, fragment: &str, duration: Duration, extra_tags: &Tags) -> Result<()> {
        let metric = self.client.namespace().build(
            Some(self.identity),
            MetricKind::Custom,
            Some(fragment),
            &[self.extra_tags, extra_tags],
        )?;
        self.client.transport().timing(&metric.name, duration, &metric.tags)?;
        Ok(())
    }

    fn gauge(&self, fragment: &str, value: f64, extra_tags: &Tags) -> Result<()> {
        let metric = self.client.namespace().build(
            Some(self.identity),
            MetricKind::Custom,
            Some(fragment),
            &[self.extra_tags, extra_tags],
        )?;
        self.client.transport().gauge(&metric.name, value, &metric.tags)?;
        Ok(())
    }
}

/// Times a block and emits the duration through any [`Measure`].
///
/// Emits on [`stop`](Timer::stop), or on drop if never stopped. A failure on
/// drop can only be logged; call `stop` to see it.
#[must_use = "a timer emits when dropped; bind it to a variable"]
pub struct Timer<'a> {
    sink: &'a dyn Measure,
    fragment: String,
    tags: Tags,
    start: Instant,
    done: bool,
}

impl<'a> Timer<'a> {
    /// Start timing.
    pub fn start(sink: &'a dyn Measure, fragment: impl Into<String>) -> Self {
        Self {
            sink,
            fragment: fragment.into(),
            tags: Tags::new(),
            start: Instant::now(),
            done: false,
        }
    }

    /// Add tags to the emitted timing.
    pub fn with_tags(mut self, tags: Tags) -> Self {
        self.tags.extend(tags);
        self
    }

    /// Time elapsed so far.
    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    /// Stop and emit, returning the elapsed time.
    pub fn stop(mut self) -> Result<Duration> {
        self.done = true;
        let elapsed = self.start.elapsed();
        self.sink.timing(&self.fragment, elapsed, &self.tags)?;
        Ok(elapsed)
    }
}

impl Drop for Timer<'_> {
    fn drop(&mut self) {
        if self.done {
            return;
        }
        if let Err(err) = self.sink.timing(&self.fragment, self.start.elapsed(), &self.tags) {
            report_emit_failure(&self.fragment, &err);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::error::{ConfigurationError, MetricsError};
    use crate::naming::Namespace;
    use crate::tags;
    use crate::transport::{RecordingTransport, Sample};

    fn setup() -> (Client, Arc<RecordingTransport>) {
        let transport = Arc::new(RecordingTransport::new());
        let client = Client::new(
            Namespace::new("test", "tests::test_metrics", Tags::new()),
            transport.clone(),
        );
        (client, transport)
    }

    #[test]
    fn test_handle_uses_call_tags() {
        let (client, transport) = setup();
        let identity = Identity::new("mypackage::utils", "make_request");
        let extra = tags! { "foo" => "one" };
        let handle = MeasurementHandle::new(&client, &identity, &extra);

        handle.incr("another_metric").unwrap();

        let events = transport.events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].name, "test.tests.test_metrics.another_metric");
        assert_eq!(events[0].sample, Sample::Count(1));
        assert_eq!(events[0].tag("def"), Some("make_request"));
        assert_eq!(events[0].tag("module"), Some("mypackage.utils"));
        assert_eq!(events[0].tag("foo"), Some("one"));
    }

    #[test]
    fn test_handle_per_call_tags_win() {
        let (client, transport) = setup();
        let identity = Identity::new("m", "f");
        let extra = tags! { "foo" => "one" };
        let handle = MeasurementHandle::new(&client, &identity, &extra);

        handle
            .gauge("depth", 7.0, &tags! { "foo" => "two", "def" => "custom" })
            .unwrap();
        handle.timing("step", Duration::from_millis(2), &Tags::new()).unwrap();

        let events = transport.events();
        assert_eq!(events[0].tag("foo"), Some("two"));
        assert_eq!(events[0].tag("def"), Some("custom"));
        assert_eq!(events[0].sample, Sample::Gauge(7.0));
        assert_eq!(events[1].tag("def"), Some("f"));
    }

    #[test]
    fn test_handle_rejects_missing_fragment() {
        let (client, transport) = setup();
        let identity = Identity::new("m", "f");
        let extra = Tags::new();
        let handle = MeasurementHandle::new(&client, &identity, &extra);

        let err = handle.incr("").unwrap_err();
        assert!(matches!(
            err,
            MetricsError::Configuration(ConfigurationError::MissingFragment(MetricKind::Custom))
        ));
        assert!(transport.is_empty());
    }

    #[test]
    fn test_timer_emits_once_on_stop() {
        let (client, transport) = setup();
        let timer = Timer::start(&client, "block").with_tags(tags! { "step" => "load" });
        let elapsed = timer.stop().unwrap();

        let timings = transport.timings();
        assert_eq!(timings.len(), 1);
        assert_eq!(timings[0].sample, Sample::Timing(elapsed));
        assert_eq!(timings[0].tag("step"), Some("load"));
    }

    #[test]
    fn test_timer_emits_on_drop() {
        let (client, transport) = setup();
        {
            let _timer = Timer::start(&client, "block");
        }
        assert_eq!(transport.timings().len(), 1);
        assert_eq!(transport.timings()[0].name, "test.tests.test_metrics.block");
    }
}
