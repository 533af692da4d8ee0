// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Metric name and tag construction.
//!
//! Every metric name follows one template:
//!
//! ```text
//! {service}.{module_path}.{fragment}
//! ```
//!
//! Empty components are skipped and `::` in the module path becomes `.`.
//! Tags are merged in a fixed order, later layers winning on key collision:
//!
//! 1. the namespace's base tags (`service`, `module`, plus anything configured)
//! 2. identity tags (`module`, `def`, `class`)
//! 3. extra tag layers, in the order given
//!
//! Identity tags are defaults a caller may deliberately override through an
//! extra layer.

use std::collections::BTreeMap;
use std::fmt;

use crate::error::ConfigurationError;
use crate::identity::{dotted, Identity};

/// Tag key/value pairs. Ordered so encoded output is deterministic.
pub type Tags = BTreeMap<String, String>;

/// Default fragment for the automatic call counter.
pub const DEFAULT_COUNT_FRAGMENT: &str = "calls";

/// Default fragment for the automatic duration timer.
pub const DEFAULT_TIME_FRAGMENT: &str = "duration";

/// Characters that would corrupt a statsd line if they appeared in a name.
const RESERVED: &[char] = &[':', '|', '@', '#', ','];

/// What a metric measures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetricKind {
    /// Function call counter.
    Count,
    /// Function duration.
    Time,
    /// Ad-hoc measurement; always needs a caller-supplied fragment.
    Custom,
}

impl MetricKind {
    /// The fragment used when the caller supplies none.
    pub fn default_fragment(self) -> Option<&'static str> {
        match self {
            Self::Count => Some(DEFAULT_COUNT_FRAGMENT),
            Self::Time => Some(DEFAULT_TIME_FRAGMENT),
            Self::Custom => None,
        }
    }
}

impl fmt::Display for MetricKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Count => f.write_str("count"),
            Self::Time => f.write_str("time"),
            Self::Custom => f.write_str("custom"),
        }
    }
}

/// A fully resolved metric: final name plus tags, ready for the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Metric {
    pub name: String,
    pub tags: Tags,
}

/// Base naming context owned by one client. Immutable after construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Namespace {
    service: String,
    module_path: String,
    base_tags: Tags,
    prefix: String,
}

impl Namespace {
    /// Create a namespace.
    ///
    /// `service` and `module` (when non-empty) are added to the base tags,
    /// unless `tags` already sets them.
    pub fn new(service: impl Into<String>, module_path: impl Into<String>, tags: Tags) -> Self {
        let service = service.into();
        let module_path = module_path.into();

        let mut base_tags = Tags::new();
        if !service.is_empty() {
            base_tags.insert("service".to_string(), service.clone());
        }
        if !module_path.is_empty() {
            base_tags.insert("module".to_string(), dotted(&module_path));
        }
        base_tags.extend(tags);

        let prefix = [service.as_str(), module_path.as_str()]
            .iter()
            .filter(|part| !part.is_empty())
            .map(|part| dotted(part))
            .collect::<Vec<_>>()
            .join(".");

        Self {
            service,
            module_path,
            base_tags,
            prefix,
        }
    }

    pub fn service(&self) -> &str {
        &self.service
    }

    pub fn module_path(&self) -> &str {
        &self.module_path
    }

    pub fn base_tags(&self) -> &Tags {
        &self.base_tags
    }

    /// A copy of this namespace with more base tags. New tags win.
    pub fn with_extra_tags(&self, tags: &Tags) -> Self {
        let mut namespace = self.clone();
        namespace
            .base_tags
            .extend(tags.iter().map(|(k, v)| (k.clone(), v.clone())));
        namespace
    }

    /// Prefix a fragment with the namespace.
    pub fn metric_name(&self, fragment: &str) -> String {
        if self.prefix.is_empty() {
            fragment.to_string()
        } else {
            format!("{}.{}", self.prefix, fragment)
        }
    }

    /// Build the final name and tags for one measurement.
    ///
    /// Pure: no I/O and no shared state, so it is safe to call concurrently.
    pub fn build(
        &self,
        identity: Option<&Identity>,
        kind: MetricKind,
        fragment: Option<&str>,
        extra: &[&Tags],
    ) -> Result<Metric, ConfigurationError> {
        let fragment = match fragment.filter(|f| !f.is_empty()) {
            Some(fragment) => {
                validate_fragment(fragment)?;
                fragment
            }
            None => kind
                .default_fragment()
                .ok_or(ConfigurationError::MissingFragment(kind))?,
        };

        let mut tags = self.base_tags.clone();
        if let Some(identity) = identity {
            tags.extend(identity.tags());
        }
        for layer in extra {
            tags.extend(layer.iter().map(|(k, v)| (k.clone(), v.clone())));
        }

        Ok(Metric {
            name: self.metric_name(fragment),
            tags,
        })
    }
}

/// Check a metric fragment for characters statsd cannot carry.
pub fn validate_fragment(fragment: &str) -> Result<(), ConfigurationError> {
    if fragment.is_empty() {
        return Err(ConfigurationError::invalid_fragment(fragment, "empty"));
    }
    if let Some(c) = fragment
        .chars()
        .find(|c| RESERVED.contains(c) || c.is_whitespace())
    {
        return Err(ConfigurationError::invalid_fragment(
            fragment,
            format!("reserved character {c:?}"),
        ));
    }
    if fragment.starts_with('.') || fragment.ends_with('.') {
        return Err(ConfigurationError::invalid_fragment(
            fragment,
            "leading or trailing '.'",
        ));
    }
    Ok(())
}

/// Build a [`Tags`] map from `key => value` pairs.
///
/// ```
/// let tags = influxstats::tags! { "region" => "eu", "tier" => 2 };
/// assert_eq!(tags["tier"], "2");
/// ```
#[macro_export]
macro_rules! tags {
    () => {
        $crate::Tags::new()
    };
    ($($key:expr => $value:expr),+ $(,)?) => {{
        let mut tags = $crate::Tags::new();
        $(tags.insert(::std::string::ToString::to_string(&$key), ::std::string::ToString::to_string(&$value));)+
        tags
    }};
}
