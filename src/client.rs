// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! The client façade: one namespace plus one transport.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use crate::config::ClientConfig;
use crate::error::Result;
use crate::handle::Measure;
use crate::naming::{MetricKind, Namespace, Tags};
use crate::transport::{TagFormat, Transport, UdpTransport};
use crate::wrapper::MeasureFunction;

/// Create a client sending influx-tagged statsd lines to `host:port`.
///
/// `module_path` is usually `module_path!()` at the call site.
///
/// # Example
///
/// ```rust,no_run
/// use influxstats::{get_client, Measure};
///
/// # fn main() -> influxstats::Result<()> {
/// let client = get_client("myapp", module_path!(), None, "localhost", 8125)?;
/// client.incr("started")?;
/// # Ok(())
/// # }
/// ```
pub fn get_client(
    service: &str,
    module_path: &str,
    tags: Option<Tags>,
    host: &str,
    port: u16,
) -> Result<Client> {
    let transport = UdpTransport::connect(host, port, TagFormat::Influx)?;
    Ok(Client::new(
        Namespace::new(service, module_path, tags.unwrap_or_default()),
        Arc::new(transport),
    ))
}

/// Entry point for instrumentation.
///
/// Cheap to clone; clones share the namespace and the transport. Hosts that
/// want a process-wide client keep one in a `static` `Lazy`.
#[derive(Clone)]
pub struct Client {
    namespace: Arc<Namespace>,
    transport: Arc<dyn Transport>,
}

impl Client {
    /// Create a client over any transport.
    pub fn new(namespace: Namespace, transport: Arc<dyn Transport>) -> Self {
        Self {
            namespace: Arc::new(namespace),
            transport,
        }
    }

    /// Create a client from configuration, connecting a UDP transport.
    pub fn from_config(config: &ClientConfig) -> Result<Self> {
        config.validate()?;
        let transport = UdpTransport::connect(&config.host, config.port, config.tag_format)?;
        Ok(Self::new(config.namespace(), Arc::new(transport)))
    }

    pub fn namespace(&self) -> &Namespace {
        &self.namespace
    }

    pub fn transport(&self) -> &dyn Transport {
        self.transport.as_ref()
    }

    /// A new client with additional base tags, sharing this client's transport.
    pub fn with_extra_tags(&self, tags: &Tags) -> Self {
        Self {
            namespace: Arc::new(self.namespace.with_extra_tags(tags)),
            transport: Arc::clone(&self.transport),
        }
    }

    /// Start configuring a function wrapper.
    ///
    /// ```rust
    /// use std::sync::Arc;
    /// use influxstats::{Client, Namespace, RecordingTransport, Tags};
    ///
    /// fn add(a: u32, b: u32) -> u32 {
    ///     a + b
    /// }
    ///
    /// let transport = Arc::new(RecordingTransport::new());
    /// let client = Client::new(Namespace::new("app", "", Tags::new()), transport.clone());
    ///
    /// let add = client.measure_function().wrap(add).unwrap();
    /// assert_eq!(add.call((2, 3)), 5);
    /// assert_eq!(transport.counts()[0].name, "app.calls");
    /// ```
    pub fn measure_function(&self) -> MeasureFunction {
        MeasureFunction::new(self.clone())
    }
}

impl fmt::Debug for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("namespace", &self.namespace)
            .finish_non_exhaustive()
    }
}

impl Measure for Client {
    fn increment(&self, fragment: &str, value: i64, extra_tags: &Tags) -> Result<()> {
        let metric = self
            .namespace
            .build(None, MetricKind::Custom, Some(fragment), &[extra_tags])?;
        self.transport.increment(&metric.name, value, &metric.tags)?;
        Ok(())
    }

    fn timing(&self, fragment: &str, duration: Duration, extra_tags: &Tags) -> Result<()> {
        let metric = self
            .namespace
            .build(None, MetricKind::Custom, Some(fragment), &[extra_tags])?;
        self.transport.timing(&metric.name, duration, &metric.tags)?;
        Ok(())
    }

    fn gauge(&self, fragment: &str, value: f64, extra_tags: &Tags) -> Result<()> {
        let metric = self
            .namespace
            .build(None, MetricKind::Custom, Some(fragment), &[extra_tags])?;
        self.transport.gauge(&metric.name, value, &metric.tags)?;
        Ok(())
    }
}
