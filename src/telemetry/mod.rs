// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Logging for influxstats itself.
//!
//! The library only emits `tracing` events; installing a subscriber is up to
//! the host. [`init_telemetry`] is provided for hosts that have none.
//!
//! Automatic call counts and durations must never break the wrapped code, so
//! when one of them fails to emit it is reported here instead, as a `warn`
//! event on the [`INSTRUMENTATION_TARGET`] target:
//!
//! ```text
//! RUST_LOG=influxstats::instrumentation=off   # silence it
//! ```

mod init;

pub use init::{init_telemetry, TelemetryConfig, TelemetryGuard};

/// Target used for failed automatic emissions.
pub const INSTRUMENTATION_TARGET: &str = "influxstats::instrumentation";

/// Report a measurement that could not be emitted.
pub(crate) fn report_emit_failure(metric: &str, err: &dyn std::error::Error) {
    tracing::warn!(
        target: INSTRUMENTATION_TARGET,
        metric = %metric,
        error = %err,
        "dropped measurement"
    );
}
