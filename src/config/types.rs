// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Client configuration.
//!
//! Can be written as JSON or YAML:
//!
//! ```yaml
//! service: billing
//! modulePath: billing::invoices
//! host: statsd.internal
//! port: 8125
//! tagFormat: influx
//! tags:
//!   env: prod
//! ```

use serde::{Deserialize, Serialize};

use crate::error::ConfigurationError;
use crate::naming::{Namespace, Tags};
use crate::transport::{TagFormat, DEFAULT_HOST, DEFAULT_PORT};

/// Environment variable overriding the statsd host.
pub const ENV_HOST: &str = "STATSD_HOST";

/// Environment variable overriding the statsd port.
pub const ENV_PORT: &str = "STATSD_PORT";

/// Everything needed to build a [`Client`](crate::Client).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientConfig {
    /// Name of the service the metrics come from.
    pub service: String,

    /// Module the client is created for, as a Rust path.
    #[serde(default)]
    pub module_path: String,

    /// Statsd host.
    #[serde(default = "default_host")]
    pub host: String,

    /// Statsd port.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Base tags added to every metric.
    #[serde(default, skip_serializing_if = "Tags::is_empty")]
    pub tags: Tags,

    /// How tags are encoded on the wire.
    #[serde(default)]
    pub tag_format: TagFormat,
}

fn default_host() -> String {
    DEFAULT_HOST.to_string()
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

impl ClientConfig {
    /// Config for `service` with every other field defaulted.
    pub fn new(service: impl Into<String>) -> Self {
        Self {
            service: service.into(),
            module_path: String::new(),
            host: default_host(),
            port: default_port(),
            tags: Tags::new(),
            tag_format: TagFormat::default(),
        }
    }

    pub fn with_module_path(mut self, module_path: impl Into<String>) -> Self {
        self.module_path = module_path.into();
        self
    }

    pub fn with_tags(mut self, tags: Tags) -> Self {
        self.tags.extend(tags);
        self
    }

    /// Override host and port from `STATSD_HOST` / `STATSD_PORT`.
    pub fn apply_env(self) -> Result<Self, ConfigurationError> {
        self.apply_env_from(|key| std::env::var(key).ok())
    }

    /// Override host and port from an arbitrary variable lookup.
    pub fn apply_env_from(
        mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigurationError> {
        if let Some(host) = lookup(ENV_HOST).filter(|h| !h.trim().is_empty()) {
            self.host = host.trim().to_string();
        }
        if let Some(port) = lookup(ENV_PORT) {
            self.port = port.trim().parse().map_err(|_| {
                ConfigurationError::invalid_value(ENV_PORT, format!("not a port number: {port:?}"))
            })?;
        }
        Ok(self)
    }

    /// Check the config can produce a usable client.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if self.service.trim().is_empty() {
            return Err(ConfigurationError::invalid_value("service", "must not be empty"));
        }
        if self.host.trim().is_empty() {
            return Err(ConfigurationError::invalid_value("host", "must not be empty"));
        }
        if self.port == 0 {
            return Err(ConfigurationError::invalid_value("port", "must not be 0"));
        }
        Ok(())
    }

    /// The namespace this config describes.
    pub fn namespace(&self) -> Namespace {
        Namespace::new(&self.service, &self.module_path, self.tags.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tags;

    #[test]
    fn test_defaults_from_json() {
        let config: ClientConfig = serde_json::from_str(r#"{"service": "billing"}"#).unwrap();
        assert_eq!(config, ClientConfig::new("billing"));
        assert_eq!(config.host, "localhost");
        assert_eq!(config.port, 8125);
        assert_eq!(config.tag_format, TagFormat::Influx);
    }

    #[test]
    fn test_full_yaml() {
        let yaml = "service: billing\nmodulePath: billing::invoices\nhost: statsd.internal\nport: 9125\ntagFormat: datadog\ntags:\n  env: prod\n";
        let config: ClientConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.module_path, "billing::invoices");
        assert_eq!(config.host, "statsd.internal");
        assert_eq!(config.port, 9125);
        assert_eq!(config.tag_format, TagFormat::Datadog);
        assert_eq!(config.tags, tags! { "env" => "prod" });
    }

    #[test]
    fn test_apply_env_overrides() {
        let config = ClientConfig::new("svc")
            .apply_env_from(|key| match key {
                ENV_HOST => Some("collector".to_string()),
                ENV_PORT => Some(" 9000 ".to_string()),
                _ => None,
            })
            .unwrap();
        assert_eq!(config.host, "collector");
        assert_eq!(config.port, 9000);
    }

    #[test]
    fn test_apply_env_invalid_port() {
        let err = ClientConfig::new("svc")
            .apply_env_from(|key| (key == ENV_PORT).then(|| "eighty".to_string()))
            .unwrap_err();
        assert!(matches!(err, ConfigurationError::InvalidValue { ref field, .. } if field == ENV_PORT));
    }

    #[test]
    fn test_apply_env_ignores_missing() {
        let config = ClientConfig::new("svc").apply_env_from(|_| None).unwrap();
        assert_eq!(config, ClientConfig::new("svc"));
    }

    #[test]
    fn test_validate() {
        assert!(ClientConfig::new("svc").validate().is_ok());
        assert!(ClientConfig::new(" ").validate().is_err());

        let mut config = ClientConfig::new("svc");
        config.port = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_namespace() {
        let ns = ClientConfig::new("svc")
            .with_module_path("a::b")
            .with_tags(tags! { "env" => "prod" })
            .namespace();
        assert_eq!(ns.metric_name("calls"), "svc.a.b.calls");
        assert_eq!(ns.base_tags()["env"], "prod");
        assert_eq!(ns.base_tags()["module"], "a.b");
    }
}
