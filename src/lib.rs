// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! influxstats - statsd instrumentation with names and tags derived from code.
//!
//! Wrap a function once and every call emits a call counter and a duration
//! timer, named after the service and module and tagged with where the
//! function is defined (`module`, `def`, and `class` for methods). Functions
//! that want to record more take a `&dyn Measure` handle that already
//! carries those tags.
//!
//! # Architecture
//!
//! - [`identity`] - `(module, class, function)` identity of a callable
//! - [`naming`] - metric name template and tag merging
//! - [`handle`] - the [`Measure`] trait, per-call handles and timers
//! - [`wrapper`] - the function wrapper (`measure_function`)
//! - [`client`] - the client façade
//! - [`transport`] - statsd over UDP, plus in-memory and no-op sinks
//! - [`config`] - JSON/YAML configuration and environment overrides
//! - [`telemetry`] - `tracing` setup and the failed-emission channel
//! - [`error`] - error types and result aliases
//!
//! # Example
//!
//! ```rust,no_run
//! use influxstats::{get_client, tags, Measure};
//!
//! fn make_request(url: &str, statsd: &dyn Measure) -> usize {
//!     let _ = statsd.increment("bytes", url.len() as i64, &tags! { "scheme" => "https" });
//!     url.len()
//! }
//!
//! # fn main() -> influxstats::Result<()> {
//! let client = get_client("crawler", module_path!(), None, "localhost", 8125)?;
//! let make_request = client.measure_function().wrap_with_handle(make_request)?;
//!
//! // crawler.<module>.calls, crawler.<module>.duration, crawler.<module>.bytes
//! make_request.call(("https://example.com",));
//! # Ok(())
//! # }
//! ```

pub mod callable;
pub mod client;
pub mod config;
pub mod error;
pub mod handle;
pub mod identity;
pub mod naming;
pub mod telemetry;
pub mod transport;
pub mod wrapper;

pub use callable::{Callable, CallableWithHandle};
pub use client::{get_client, Client};
pub use config::{load_config, ClientConfig};
pub use error::{ConfigurationError, MetricsError, Result, TransportError};
pub use handle::{Measure, MeasurementHandle, Timer};
pub use identity::{CallSite, Identity};
pub use naming::{Metric, MetricKind, Namespace, Tags};
pub use transport::{
    Event, NoopTransport, RecordingTransport, Sample, TagFormat, Transport, UdpTransport,
};
pub use wrapper::{MeasureFunction, Measured, MeasuredWithHandle};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
