//! Host socket capability.
//!
//! A transport never reaches for an ambient platform object. Instead it is
//! handed a [`SocketCapability`] at construction, which opens connections and
//! returns a [`SocketHandle`] for each. Real bindings live in `tether-transport`;
//! tests substitute a fake.
//!
//! # Event delivery
//!
//! The [`SocketListener`] is passed to [`SocketCapability::open`] so that events
//! cannot be emitted before anyone is listening. Implementations may call the
//! listener from any thread, but must call it sequentially for one connection.

use std::fmt;
use std::sync::Arc;

use super::events::{CloseEvent, MessageEvent, OpenEvent};
use super::payload::WireFrame;
use crate::error::{TransportError, TransportResult};
use crate::headers::Headers;

/// Callback invoked once when a send or close request finishes.
///
/// Replaces the `success` / `fail` callback pair of callback-style host APIs.
pub type Completion = Box<dyn FnOnce(TransportResult<()>) + Send>;

/// Ready-state reported by a socket handle.
///
/// The numeric values follow the WebSocket `readyState` convention: `1` means open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ReadyState {
    /// Handshake in progress.
    Connecting = 0,
    /// Open and able to send.
    Open = 1,
    /// Closing handshake in progress.
    Closing = 2,
    /// Closed or never opened.
    Closed = 3,
}

impl ReadyState {
    /// Numeric ready-state value.
    pub fn as_u8(self) -> u8 {
        self as u8
    }

    /// Parses a numeric ready-state; unknown values map to `Closed`.
    pub fn from_u8(value: u8) -> Self {
        match value {
            0 => Self::Connecting,
            1 => Self::Open,
            2 => Self::Closing,
            _ => Self::Closed,
        }
    }
}

/// Parameters of one connection attempt.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ConnectRequest {
    /// Target URL.
    pub url: String,
    /// Handshake headers.
    pub headers: Headers,
}

/// Receives events for a single connection.
pub trait SocketListener: Send + Sync {
    /// The handshake completed.
    fn on_open(&self, event: OpenEvent);

    /// A frame arrived.
    fn on_message(&self, event: MessageEvent);

    /// The connection closed.
    fn on_close(&self, event: CloseEvent);

    /// The connection reported an error.
    fn on_error(&self, error: TransportError);
}

/// Handle to one connection opened by a [`SocketCapability`].
pub trait SocketHandle: Send + Sync {
    /// Queues a frame. `done` reports whether it was written.
    fn send(&self, frame: WireFrame, done: Completion);

    /// Starts the closing handshake. `done` reports when shutdown finished.
    fn close(&self, code: u16, reason: &str, done: Completion);

    /// Current ready-state.
    fn ready_state(&self) -> ReadyState;
}

/// Opens bidirectional socket connections.
pub trait SocketCapability: Send + Sync {
    /// Starts a connection attempt and returns immediately.
    ///
    /// An `Err` means the attempt could not even be started. Failures after
    /// that point are reported through `listener.on_error`.
    fn open(
        &self,
        request: ConnectRequest,
        listener: Arc<dyn SocketListener>,
    ) -> TransportResult<Box<dyn SocketHandle>>;
}

impl fmt::Debug for dyn SocketHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SocketHandle")
            .field("ready_state", &self.ready_state())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ready_state_round_trips_known_values() {
        for state in [
            ReadyState::Connecting,
            ReadyState::Open,
            ReadyState::Closing,
            ReadyState::Closed,
        ] {
            assert_eq!(ReadyState::from_u8(state.as_u8()), state);
        }
        assert_eq!(ReadyState::Open.as_u8(), 1);
        assert_eq!(ReadyState::from_u8(42), ReadyState::Closed);
    }
}
