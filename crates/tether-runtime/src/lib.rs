//! Tether Runtime - configuration, logging and transport wiring.
//!
//! This crate provides:
//! - Layered configuration loading (`ConfigLoader`, `TetherConfig`)
//! - Logging configuration (`LoggingBuilder`)
//! - Transport assembly from configuration (`TransportRuntime`)
//!
//! # Host Bindings
//!
//! The runtime picks the host bindings enabled by cargo features:
//!
//! - `ws-client`: WebSocket socket capability
//! - `http-client`: HTTP request capability
//!
//! Without a binding, the matching transport reports every attempt as a
//! failure. Custom capabilities can be supplied through [`RuntimeBuilder`].
//!
//! ```ignore
//! use tether_runtime::TransportRuntime;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let runtime = TransportRuntime::builder().build()?;
//!     let user = runtime.http().get("auth/userdata", Default::default()).await?;
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod logging;
pub mod runtime;

// Re-exports
pub use config::{
    ConfigError, ConfigLoader, ConfigResult, HttpSettings, LoggingConfig, SocketSettings,
    TetherConfig,
};
pub use error::{RuntimeError, RuntimeResult};
pub use logging::LoggingBuilder;
pub use runtime::{RuntimeBuilder, TransportRuntime};

// Re-export tracing for use by other crates
pub use tracing;
pub use tracing_subscriber;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use tracing::{Level, debug, error, info, instrument, span, trace, warn};
}
