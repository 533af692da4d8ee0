// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Error types for influxstats.
//!
//! Errors are split by where they come from, using `thiserror` for the
//! definitions:
//!
//! - [`ConfigurationError`] - a metric name cannot be determined, or client
//!   configuration is invalid. Raised at setup time wherever possible.
//! - [`TransportError`] - the transport could not deliver (or could not be
//!   created). Only surfaced from explicit measurement calls.
//! - [`MetricsError`] - either of the above, returned by [`Measure`](crate::Measure).
//!
//! Failures of the automatic call counter and duration timer never show up here;
//! they are logged and dropped so the wrapped function always runs.

use thiserror::Error;

use crate::naming::MetricKind;

/// Errors raised while resolving metric names or loading client configuration.
#[derive(Error, Debug)]
pub enum ConfigurationError {
    #[error("No metric fragment given for {0} metric and no default applies")]
    MissingFragment(MetricKind),

    #[error("Invalid metric fragment {fragment:?}: {reason}")]
    InvalidFragment { fragment: String, reason: String },

    #[error("Config file not found: {0}")]
    NotFound(String),

    #[error("Invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },

    #[error("IO error reading config: {0}")]
    IoError(String),

    #[error("YAML parsing error: {0}")]
    YamlError(String),

    #[error("JSON parsing error: {0}")]
    JsonError(String),
}

impl ConfigurationError {
    /// Create an invalid-fragment error.
    pub fn invalid_fragment(fragment: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidFragment {
            fragment: fragment.into(),
            reason: reason.into(),
        }
    }

    /// Create an invalid-value error for a config field.
    pub fn invalid_value(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidValue {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl From<std::io::Error> for ConfigurationError {
    fn from(err: std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::NotFound => Self::NotFound(err.to_string()),
            _ => Self::IoError(err.to_string()),
        }
    }
}

impl From<serde_json::Error> for ConfigurationError {
    fn from(err: serde_json::Error) -> Self {
        Self::JsonError(err.to_string())
    }
}

impl From<serde_yaml::Error> for ConfigurationError {
    fn from(err: serde_yaml::Error) -> Self {
        Self::YamlError(err.to_string())
    }
}

/// Errors raised by a [`Transport`](crate::transport::Transport).
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("Could not resolve statsd host {host}:{port}")]
    Resolve { host: String, port: u16 },

    #[error("Transport IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Transport unavailable: {0}")]
    Unavailable(String),

    #[error("Statsd sink error: {0}")]
    Sink(String),
}

impl From<cadence::MetricError> for TransportError {
    fn from(err: cadence::MetricError) -> Self {
        Self::Sink(err.to_string())
    }
}

impl TransportError {
    /// Check if this error came from the network layer.
    pub fn is_network(&self) -> bool {
        matches!(self, Self::Resolve { .. } | Self::Io(_) | Self::Sink(_))
    }
}

/// Errors returned from explicit measurement calls and client construction.
#[derive(Error, Debug)]
pub enum MetricsError {
    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),
}

/// Result type alias for measurement operations.
pub type Result<T> = std::result::Result<T, MetricsError>;
