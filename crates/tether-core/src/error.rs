//! Unified error types for the Tether transport layer.
//!
//! Two families live here:
//!
//! - [`TransportError`]: failures of the persistent message transport. These are
//!   only ever observed through the `onerror` callback, never as a returned result.
//! - [`AbortError`] / [`ServerError`]: the outcome taxonomy of the one-shot
//!   request transport, wrapped together in [`RequestError`].

use thiserror::Error;

// =============================================================================
// Transport Errors
// =============================================================================

/// Errors that can occur in message transport operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// Connection failed.
    #[error("connection failed: {url} - {reason}")]
    ConnectionFailed {
        /// The URL that failed to connect.
        url: String,
        /// Reason for failure.
        reason: String,
    },

    /// Connection closed.
    #[error("connection closed: {reason}")]
    ConnectionClosed {
        /// Reason for closure.
        reason: String,
    },

    /// Message send failed.
    #[error("failed to send message: {0}")]
    SendFailed(String),

    /// Shutting down the connection failed.
    #[error("failed to close connection: {0}")]
    CloseFailed(String),

    /// The operation is not valid in the current connection state.
    #[error("invalid transport state: {0}")]
    InvalidState(String),

    /// An outbound payload could not be constructed.
    #[error("invalid payload: {0}")]
    InvalidPayload(String),

    /// Transport not available.
    #[error("transport '{transport}' not available")]
    NotAvailable {
        /// The transport type that's not available.
        transport: &'static str,
    },

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(String),
}

impl From<std::io::Error> for TransportError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

// =============================================================================
// Request Errors
// =============================================================================

/// The request was cancelled or aborted before a response arrived.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct AbortError {
    /// Human-readable description.
    pub message: String,
}

impl AbortError {
    /// Creates an abort error with the given message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl Default for AbortError {
    fn default() -> Self {
        Self::new("Request aborted")
    }
}

/// A non-2xx response, or a network failure that was not an abort.
///
/// `status_code` is [`ServerError::NO_STATUS`] when no HTTP status was available.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("server error ({status_code}): {message}")]
pub struct ServerError {
    /// HTTP status code, or -1.
    pub status_code: i32,
    /// Diagnostic message.
    pub message: String,
}

impl ServerError {
    /// Status code used when the failure carries no HTTP status.
    pub const NO_STATUS: i32 = -1;

    /// Creates a server error.
    pub fn new(status_code: i32, message: impl Into<String>) -> Self {
        Self {
            status_code,
            message: message.into(),
        }
    }

    /// Creates a server error without an HTTP status.
    pub fn network(message: impl Into<String>) -> Self {
        Self::new(Self::NO_STATUS, message)
    }

    /// Returns true if an HTTP status was received.
    pub fn has_status(&self) -> bool {
        self.status_code != Self::NO_STATUS
    }
}

/// Rejection of a single request transport call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RequestError {
    /// See [`AbortError`].
    #[error(transparent)]
    Abort(#[from] AbortError),

    /// See [`ServerError`].
    #[error(transparent)]
    Server(#[from] ServerError),
}

impl RequestError {
    /// Returns true for [`RequestError::Abort`].
    pub fn is_abort(&self) -> bool {
        matches!(self, Self::Abort(_))
    }

    /// Returns the status code of a server error.
    pub fn status_code(&self) -> Option<i32> {
        match self {
            Self::Server(err) => Some(err.status_code),
            Self::Abort(_) => None,
        }
    }
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for transport operations.
pub type TransportResult<T> = Result<T, TransportError>;

/// Result type for request transport calls.
pub type RequestResult<T> = Result<T, RequestError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_error_display() {
        let err = ServerError::new(404, "room not found");
        assert_eq!(err.to_string(), "server error (404): room not found");
        assert!(err.has_status());

        let err = ServerError::network("request:fail timeout");
        assert_eq!(err.status_code, -1);
        assert!(!err.has_status());
    }

    #[test]
    fn test_request_error_accessors() {
        let err: RequestError = AbortError::default().into();
        assert!(err.is_abort());
        assert_eq!(err.status_code(), None);
        assert_eq!(err.to_string(), "Request aborted");

        let err: RequestError = ServerError::new(500, "boom").into();
        assert!(!err.is_abort());
        assert_eq!(err.status_code(), Some(500));
    }
}
