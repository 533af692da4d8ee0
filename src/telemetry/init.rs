// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Log subscriber setup for hosts that do not install their own.

use std::io;

use tracing::Level;
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter, Layer,
};

use super::INSTRUMENTATION_TARGET;

/// Configuration for [`init_telemetry`].
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    /// Level used when neither `RUST_LOG` nor `filter_directive` is set.
    pub default_level: Level,

    /// Explicit filter directive; takes precedence over `RUST_LOG`.
    pub filter_directive: Option<String>,

    /// Report failed automatic call/duration emissions at `warn`.
    pub report_emit_failures: bool,

    /// Log span enter/close events.
    pub include_span_events: bool,

    /// Include the event target (module path).
    pub include_target: bool,

    /// Include source file and line number.
    pub include_file_line: bool,

    /// Use ANSI colors in output.
    pub ansi_colors: bool,

    /// Use the compact formatter.
    pub compact: bool,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            default_level: Level::INFO,
            filter_directive: None,
            report_emit_failures: true,
            include_span_events: false,
            include_target: true,
            include_file_line: false,
            ansi_colors: true,
            compact: true,
        }
    }
}

impl TelemetryConfig {
    /// Verbose output, including the `statsd send` trace lines.
    pub fn development() -> Self {
        Self {
            default_level: Level::DEBUG,
            filter_directive: Some("influxstats=trace".to_string()),
            include_span_events: true,
            compact: false,
            ..Self::default()
        }
    }

    /// Warnings only, no colors.
    pub fn production() -> Self {
        Self {
            default_level: Level::WARN,
            include_target: false,
            ansi_colors: false,
            ..Self::default()
        }
    }

    /// Quiet output for test binaries: warnings, no colors, file and line.
    pub fn testing() -> Self {
        Self {
            default_level: Level::WARN,
            include_file_line: true,
            ansi_colors: false,
            ..Self::default()
        }
    }

    /// Set the default log level.
    pub fn with_level(mut self, level: Level) -> Self {
        self.default_level = level;
        self
    }

    /// Set an explicit filter directive.
    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        self.filter_directive = Some(filter.into());
        self
    }

    /// Silence the failed-emission side channel.
    pub fn without_emit_failures(mut self) -> Self {
        self.report_emit_failures = false;
        self
    }

    /// The filter directive string this config resolves to, ignoring `RUST_LOG`.
    pub fn directive(&self) -> String {
        let mut directive = self
            .filter_directive
            .clone()
            .unwrap_or_else(|| self.default_level.to_string().to_lowercase());
        if !self.report_emit_failures {
            directive.push_str(&format!(",{INSTRUMENTATION_TARGET}=off"));
        }
        directive
    }

    fn env_filter(&self) -> EnvFilter {
        let fallback = || EnvFilter::new(self.default_level.to_string());
        match (&self.filter_directive, self.report_emit_failures) {
            (None, true) => EnvFilter::try_from_default_env().unwrap_or_else(|_| fallback()),
            _ => EnvFilter::try_new(self.directive()).unwrap_or_else(|_| fallback()),
        }
    }
}

/// Returned by [`init_telemetry`]; keep it alive for the duration of your program.
#[must_use]
#[derive(Debug)]
pub struct TelemetryGuard {
    _private: (),
}

/// Install a global `tracing` subscriber. Call once, at startup.
///
/// ```rust,ignore
/// use influxstats::telemetry::{init_telemetry, TelemetryConfig};
///
/// let _guard = init_telemetry(&TelemetryConfig::default())?;
/// ```
pub fn init_telemetry(config: &TelemetryConfig) -> io::Result<TelemetryGuard> {
    let span_events = if config.include_span_events {
        FmtSpan::NEW | FmtSpan::CLOSE
    } else {
        FmtSpan::NONE
    };

    let fmt_layer = fmt::layer()
        .with_ansi(config.ansi_colors)
        .with_target(config.include_target)
        .with_file(config.include_file_line)
        .with_line_number(config.include_file_line)
        .with_span_events(span_events);

    let fmt_layer = if config.compact {
        fmt_layer.compact().boxed()
    } else {
        fmt_layer.boxed()
    };

    tracing_subscriber::registry()
        .with(config.env_filter())
        .with(fmt_layer)
        .try_init()
        .map_err(|e| io::Error::new(io::ErrorKind::Other, e.to_string()))?;

    Ok(TelemetryGuard { _private: () })
}
