//! Runtime error types.

use tether_core::TransportError;
use thiserror::Error;

use crate::config::ConfigError;

/// Errors that can occur while assembling the transports.
#[derive(Error, Debug)]
pub enum RuntimeError {
    /// The configuration could not be loaded or is invalid.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// A host binding could not be created.
    #[error("Failed to initialize transport: {0}")]
    Transport(#[from] TransportError),
}

/// Result type for runtime operations.
pub type RuntimeResult<T> = Result<T, RuntimeError>;
