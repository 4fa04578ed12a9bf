//! Relay Configuration Settings
//!
//! Configuration types for the relay, loaded from environment variables.

use crate::application::ports::DEFAULT_EVENT_SOURCE;
use crate::application::use_cases::DispatchSettings;

/// Which adapters back the store and bus ports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Backend {
    /// In-process store and bus, for local runs.
    #[default]
    Memory,
    /// JSON-over-HTTP store and bus endpoints.
    Http,
}

impl Backend {
    /// Parse backend from string. Returns `None` for unrecognized names.
    #[must_use]
    pub fn from_str_case_insensitive(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "memory" => Some(Self::Memory),
            "http" => Some(Self::Http),
            _ => None,
        }
    }

    /// Get the backend name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Memory => "memory",
            Self::Http => "http",
        }
    }
}

/// Endpoints of the JSON-over-HTTP store and bus.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpEndpoints {
    /// Store endpoint receiving delta upserts.
    pub store: String,
    /// Event bus endpoint receiving publish calls.
    pub bus: String,
}

/// Adapters backing the store and bus ports, with what each one needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdapterSettings {
    /// In-process store and bus.
    Memory,
    /// JSON-over-HTTP store and bus.
    Http(HttpEndpoints),
}

impl AdapterSettings {
    /// Backend kind of these adapters.
    #[must_use]
    pub const fn backend(&self) -> Backend {
        match self {
            Self::Memory => Backend::Memory,
            Self::Http(_) => Backend::Http,
        }
    }
}

/// Server port settings.
#[derive(Debug, Clone)]
pub struct ServerSettings {
    /// Intake HTTP port receiving stream batches.
    pub intake_port: u16,
    /// Health check HTTP port.
    pub health_port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            intake_port: 8080,
            health_port: 8082,
        }
    }
}

/// Event publishing settings.
#[derive(Debug, Clone)]
pub struct PublishSettings {
    /// Source attached to every published entry.
    pub event_source: String,
    /// Target bus name (`None` = default bus).
    pub event_bus_name: Option<String>,
}

impl Default for PublishSettings {
    fn default() -> Self {
        Self {
            event_source: DEFAULT_EVENT_SOURCE.to_string(),
            event_bus_name: None,
        }
    }
}

impl From<&PublishSettings> for DispatchSettings {
    fn from(settings: &PublishSettings) -> Self {
        Self {
            event_source: settings.event_source.clone(),
            event_bus_name: settings.event_bus_name.clone(),
        }
    }
}

/// Complete relay configuration.
#[derive(Debug, Clone)]
pub struct RelayConfig {
    /// Table receiving delta upserts.
    pub table_name: String,
    /// Store and bus adapters.
    pub adapters: AdapterSettings,
    /// Publishing settings.
    pub publish: PublishSettings,
    /// Server port settings.
    pub server: ServerSettings,
}

impl RelayConfig {
    /// Create configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if required environment variables are missing.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Create configuration from an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Returns an error if required variables are missing or empty.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let table_name = required(&lookup, "TABLE_NAME")?;

        let backend = match lookup("STOCKWATCH_BACKEND") {
            None => Backend::default(),
            Some(value) => Backend::from_str_case_insensitive(&value).ok_or_else(|| {
                ConfigError::InvalidValue {
                    key: "STOCKWATCH_BACKEND".to_string(),
                    value,
                }
            })?,
        };

        let adapters = match backend {
            Backend::Memory => AdapterSettings::Memory,
            Backend::Http => AdapterSettings::Http(HttpEndpoints {
                store: required(&lookup, "STOCKWATCH_STORE_ENDPOINT")?,
                bus: required(&lookup, "STOCKWATCH_BUS_ENDPOINT")?,
            }),
        };

        let publish = PublishSettings {
            event_source: optional(&lookup, "STOCKWATCH_EVENT_SOURCE")
                .unwrap_or_else(|| PublishSettings::default().event_source),
            event_bus_name: optional(&lookup, "STOCKWATCH_EVENT_BUS_NAME"),
        };

        let server = ServerSettings {
            intake_port: parse_u16(
                &lookup,
                "STOCKWATCH_INTAKE_PORT",
                ServerSettings::default().intake_port,
            ),
            health_port: parse_u16(
                &lookup,
                "STOCKWATCH_HEALTH_PORT",
                ServerSettings::default().health_port,
            ),
        };

        Ok(Self {
            table_name,
            adapters,
            publish,
            server,
        })
    }

    /// Backend kind in use.
    #[must_use]
    pub const fn backend(&self) -> Backend {
        self.adapters.backend()
    }

    /// Dispatch settings derived from this configuration.
    #[must_use]
    pub fn dispatch_settings(&self) -> DispatchSettings {
        DispatchSettings::from(&self.publish)
    }
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Required environment variable is missing.
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),
    /// Environment variable has empty value.
    #[error("environment variable {0} cannot be empty")]
    EmptyValue(String),
    /// Environment variable has a value outside its accepted set.
    #[error("environment variable {key} has invalid value {value:?}")]
    InvalidValue { key: String, value: String },
}

fn required<F>(lookup: &F, key: &str) -> Result<String, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let value = lookup(key).ok_or_else(|| ConfigError::MissingEnvVar(key.to_string()))?;
    if value.trim().is_empty() {
        return Err(ConfigError::EmptyValue(key.to_string()));
    }
    Ok(value)
}

fn optional<F>(lookup: &F, key: &str) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key).filter(|v| !v.trim().is_empty())
}

fn parse_u16<F>(lookup: &F, key: &str, default: u16) -> u16
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn backend_parsing() {
        assert_eq!(Backend::from_str_case_insensitive("http"), Some(Backend::Http));
        assert_eq!(Backend::from_str_case_insensitive("HTTP"), Some(Backend::Http));
        assert_eq!(
            Backend::from_str_case_insensitive("memory"),
            Some(Backend::Memory)
        );
        assert_eq!(Backend::from_str_case_insensitive("htpp"), None);
        assert_eq!(Backend::from_str_case_insensitive(""), None);
    }

    #[test]
    fn unrecognized_backend_is_an_error() {
        let err = RelayConfig::from_lookup(env(&[
            ("TABLE_NAME", "stockwatch"),
            ("STOCKWATCH_BACKEND", "htpp"),
        ]))
        .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidValue { ref key, ref value }
                if key == "STOCKWATCH_BACKEND" && value == "htpp"
        ));
    }

    #[test]
    fn minimal_config_uses_defaults() {
        let config = RelayConfig::from_lookup(env(&[("TABLE_NAME", "stockwatch")])).unwrap();

        assert_eq!(config.table_name, "stockwatch");
        assert_eq!(config.adapters, AdapterSettings::Memory);
        assert_eq!(config.backend(), Backend::Memory);
        assert_eq!(config.publish.event_source, "stockwatch");
        assert!(config.publish.event_bus_name.is_none());
        assert_eq!(config.server.intake_port, 8080);
        assert_eq!(config.server.health_port, 8082);
    }

    #[test]
    fn missing_table_name_is_an_error() {
        let err = RelayConfig::from_lookup(env(&[])).unwrap_err();
        assert!(matches!(err, ConfigError::MissingEnvVar(ref key) if key == "TABLE_NAME"));
    }

    #[test]
    fn empty_table_name_is_an_error() {
        let err = RelayConfig::from_lookup(env(&[("TABLE_NAME", "  ")])).unwrap_err();
        assert!(matches!(err, ConfigError::EmptyValue(ref key) if key == "TABLE_NAME"));
    }

    #[test]
    fn http_backend_requires_endpoints() {
        let err = RelayConfig::from_lookup(env(&[
            ("TABLE_NAME", "stockwatch"),
            ("STOCKWATCH_BACKEND", "http"),
            ("STOCKWATCH_STORE_ENDPOINT", "http://localhost:8000"),
        ]))
        .unwrap_err();
        assert!(
            matches!(err, ConfigError::MissingEnvVar(ref key) if key == "STOCKWATCH_BUS_ENDPOINT")
        );
    }

    #[test]
    fn http_backend_reads_endpoints_and_overrides() {
        let config = RelayConfig::from_lookup(env(&[
            ("TABLE_NAME", "stockwatch"),
            ("STOCKWATCH_BACKEND", "http"),
            ("STOCKWATCH_STORE_ENDPOINT", "http://localhost:8000"),
            ("STOCKWATCH_BUS_ENDPOINT", "http://localhost:4010"),
            ("STOCKWATCH_EVENT_SOURCE", "stockwatch.test"),
            ("STOCKWATCH_EVENT_BUS_NAME", "prices"),
            ("STOCKWATCH_INTAKE_PORT", "9000"),
            ("STOCKWATCH_HEALTH_PORT", "not-a-port"),
        ]))
        .unwrap();

        assert_eq!(config.backend(), Backend::Http);
        assert_eq!(
            config.adapters,
            AdapterSettings::Http(HttpEndpoints {
                store: "http://localhost:8000".to_string(),
                bus: "http://localhost:4010".to_string(),
            })
        );
        assert_eq!(config.server.intake_port, 9000);
        assert_eq!(config.server.health_port, 8082);

        let dispatch = config.dispatch_settings();
        assert_eq!(dispatch.event_source, "stockwatch.test");
        assert_eq!(dispatch.event_bus_name.as_deref(), Some("prices"));
    }
}
