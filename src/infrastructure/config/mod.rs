//! Configuration loading
//!
//! Layers programmatic defaults, `.metaarmy/*.yaml` and `METAARMY_*`
//! environment variables with figment, then validates the result.

pub mod loader;

pub use loader::{ConfigError, ConfigLoader, CONFIG_DIR, ENV_PREFIX};
