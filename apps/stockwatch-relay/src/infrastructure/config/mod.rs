//! Configuration Module
//!
//! Configuration loading for the relay service.

mod settings;

pub use settings::{
    AdapterSettings, Backend, ConfigError, HttpEndpoints, PublishSettings, RelayConfig,
    ServerSettings,
};
