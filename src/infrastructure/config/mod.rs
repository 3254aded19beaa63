//! Configuration management infrastructure
//!
//! - figment loading of YAML files and `EMBEDLIKE_*` overrides
//! - validation of loaded settings
//! - one-time provider resolution against environment sources

pub mod env;
pub mod loader;
pub mod provider;

pub use env::{EnvSource, MapEnv, ProcessEnv};
pub use loader::{ConfigError, ConfigLoader};
pub use provider::ProviderConfig;
