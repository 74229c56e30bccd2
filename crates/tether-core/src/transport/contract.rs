//! The message transport contract.

use std::fmt;

use tracing::warn;

use super::payload::OutboundPayload;
use crate::headers::Headers;

/// Close code sent when [`Transport::close`] is called without one.
pub const DEFAULT_CLOSE_CODE: u16 = 1000;

/// Close reason sent when [`Transport::close`] is called without one.
pub const DEFAULT_CLOSE_REASON: &str = "Normal closure";

/// Lifecycle of a transport's connection.
///
/// ```text
/// Closed ──connect──▶ Connecting ──open──▶ Open ──close──▶ Closing ──▶ Closed
///    ▲                    │                  │                           ▲
///    └──── failure ───────┴──── failure ─────┴───────────────────────────┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ConnectionState {
    /// No live connection. Initial and terminal state.
    #[default]
    Closed,
    /// A connection attempt is in progress.
    Connecting,
    /// The connection is open.
    Open,
    /// Shutdown has been requested.
    Closing,
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Closed => write!(f, "closed"),
            Self::Connecting => write!(f, "connecting"),
            Self::Open => write!(f, "open"),
            Self::Closing => write!(f, "closing"),
        }
    }
}

/// Options for one connection attempt.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConnectOptions {
    /// Handshake headers.
    pub headers: Headers,
}

impl ConnectOptions {
    /// Creates empty options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a handshake header.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }
}

/// A persistent bidirectional message transport.
///
/// None of these methods return a per-call result: every outcome is delivered
/// through the [`TransportEvents`](super::TransportEvents) the transport was
/// built with.
///
/// Event ordering, per connection:
/// - `onopen` fires at most once, before any `onmessage`.
/// - `onclose` is terminal; nothing fires after it.
/// - `onerror` may fire any number of times before `onclose`.
pub trait Transport: Send + Sync {
    /// Starts a connection attempt. Never fails synchronously.
    fn connect(&self, url: &str, options: ConnectOptions);

    /// Sends a payload. Silently dropped unless the transport is open.
    fn send(&self, payload: OutboundPayload);

    /// Sends a payload over an unreliable channel.
    ///
    /// Unsupported by default: nothing is delivered and a warning is logged.
    fn send_unreliable(&self, payload: OutboundPayload) {
        warn!(
            len = payload.byte_len(),
            "Transport does not support unreliable messages, dropping payload"
        );
    }

    /// Requests shutdown with `code` (default 1000) and `reason`.
    fn close(&self, code: Option<u16>, reason: Option<&str>);

    /// Current connection state.
    fn state(&self) -> ConnectionState;

    /// True iff the state is [`ConnectionState::Open`].
    fn is_open(&self) -> bool {
        self.state() == ConnectionState::Open
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;

    #[derive(Default)]
    struct NullTransport {
        sent: Mutex<Vec<OutboundPayload>>,
    }

    impl Transport for NullTransport {
        fn connect(&self, _url: &str, _options: ConnectOptions) {}

        fn send(&self, payload: OutboundPayload) {
            self.sent.lock().push(payload);
        }

        fn close(&self, _code: Option<u16>, _reason: Option<&str>) {}

        fn state(&self) -> ConnectionState {
            ConnectionState::Open
        }
    }

    #[test]
    fn test_default_send_unreliable_delivers_nothing() {
        let transport = NullTransport::default();
        transport.send_unreliable(OutboundPayload::Buffer(vec![1, 2, 3]));
        transport.send_unreliable(OutboundPayload::Text("ping".into()));
        assert!(transport.sent.lock().is_empty());
        assert!(transport.is_open());
    }

    #[test]
    fn test_connection_state_defaults_to_closed() {
        assert_eq!(ConnectionState::default(), ConnectionState::Closed);
        assert_eq!(ConnectionState::Closing.to_string(), "closing");
    }

    #[test]
    fn test_connect_options_builder() {
        let options = ConnectOptions::new().with_header("X-Client", "tether");
        assert_eq!(options.headers.get("X-Client").map(String::as_str), Some("tether"));
    }
}
