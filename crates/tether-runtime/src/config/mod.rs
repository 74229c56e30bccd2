//! Configuration module for the Tether runtime.
//!
//! Layered loading of logging and transport settings, plus validation.

pub mod error;
pub mod loader;
pub mod schema;
pub mod validation;

pub use error::{ConfigError, ConfigResult};
pub use loader::{ConfigLoader, Profile, load_config, load_config_from_file};
pub use schema::{
    HttpSettings, LogFormat, LogLevel, LogOutput, LoggingConfig, SocketSettings, TetherConfig,
};
pub use validation::validate_config;
