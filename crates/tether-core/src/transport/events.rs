//! Connection events and the callback bundle that receives them.

use std::fmt;
use std::sync::Arc;

use crate::error::TransportError;

// =============================================================================
// Events
// =============================================================================

/// The connection is open.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct OpenEvent {
    /// URL the connection was opened to.
    pub url: String,
}

/// Body of an inbound message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InboundData {
    /// Text frame.
    Text(String),
    /// Binary frame.
    Binary(Vec<u8>),
}

impl InboundData {
    /// Raw bytes of the message.
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            Self::Text(text) => text.as_bytes(),
            Self::Binary(bytes) => bytes,
        }
    }
}

/// A message arrived from the peer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageEvent {
    /// Message body.
    pub data: InboundData,
}

impl MessageEvent {
    /// Creates a text message event.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            data: InboundData::Text(text.into()),
        }
    }

    /// Creates a binary message event.
    pub fn binary(bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            data: InboundData::Binary(bytes.into()),
        }
    }

    /// Always `"message"`.
    pub fn event_type(&self) -> &'static str {
        "message"
    }
}

/// The connection is closed. Terminal for that connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CloseEvent {
    /// Close code.
    pub code: u16,
    /// Close reason.
    pub reason: String,
    /// Whether the shutdown completed cleanly.
    pub was_clean: bool,
}

impl CloseEvent {
    /// Close code for a connection that dropped without a close frame.
    pub const ABNORMAL: u16 = 1006;

    /// Creates a clean close event.
    pub fn new(code: u16, reason: impl Into<String>) -> Self {
        Self {
            code,
            reason: reason.into(),
            was_clean: true,
        }
    }

    /// Creates a close event for a connection lost without a closing handshake.
    pub fn abnormal(reason: impl Into<String>) -> Self {
        Self {
            code: Self::ABNORMAL,
            reason: reason.into(),
            was_clean: false,
        }
    }
}

// =============================================================================
// Callback Bundle
// =============================================================================

/// A single event handler.
pub type EventCallback<E> = Arc<dyn Fn(E) + Send + Sync>;

/// Optional handlers supplied by the owner of a transport.
///
/// The transport invokes these but never replaces them.
///
/// ```rust
/// use tether_core::TransportEvents;
///
/// let events = TransportEvents::new()
///     .on_open(|_| println!("connected"))
///     .on_message(|msg| println!("{} bytes", msg.data.as_bytes().len()));
/// ```
#[derive(Clone, Default)]
pub struct TransportEvents {
    onopen: Option<EventCallback<OpenEvent>>,
    onmessage: Option<EventCallback<MessageEvent>>,
    onclose: Option<EventCallback<CloseEvent>>,
    onerror: Option<EventCallback<TransportError>>,
}

impl TransportEvents {
    /// Creates an empty bundle.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the open handler.
    pub fn on_open(mut self, f: impl Fn(OpenEvent) + Send + Sync + 'static) -> Self {
        self.onopen = Some(Arc::new(f));
        self
    }

    /// Sets the message handler.
    pub fn on_message(mut self, f: impl Fn(MessageEvent) + Send + Sync + 'static) -> Self {
        self.onmessage = Some(Arc::new(f));
        self
    }

    /// Sets the close handler.
    pub fn on_close(mut self, f: impl Fn(CloseEvent) + Send + Sync + 'static) -> Self {
        self.onclose = Some(Arc::new(f));
        self
    }

    /// Sets the error handler.
    pub fn on_error(mut self, f: impl Fn(TransportError) + Send + Sync + 'static) -> Self {
        self.onerror = Some(Arc::new(f));
        self
    }

    /// Invokes the open handler, if set.
    pub fn emit_open(&self, event: OpenEvent) {
        if let Some(cb) = &self.onopen {
            cb(event);
        }
    }

    /// Invokes the message handler, if set.
    pub fn emit_message(&self, event: MessageEvent) {
        if let Some(cb) = &self.onmessage {
            cb(event);
        }
    }

    /// Invokes the close handler, if set.
    pub fn emit_close(&self, event: CloseEvent) {
        if let Some(cb) = &self.onclose {
            cb(event);
        }
    }

    /// Invokes the error handler, if set.
    pub fn emit_error(&self, error: TransportError) {
        if let Some(cb) = &self.onerror {
            cb(error);
        }
    }
}

impl fmt::Debug for TransportEvents {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransportEvents")
            .field("onopen", &self.onopen.is_some())
            .field("onmessage", &self.onmessage.is_some())
            .field("onclose", &self.onclose.is_some())
            .field("onerror", &self.onerror.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_empty_bundle_ignores_events() {
        let events = TransportEvents::new();
        events.emit_open(OpenEvent::default());
        events.emit_message(MessageEvent::text("hi"));
        events.emit_close(CloseEvent::new(1000, "bye"));
        events.emit_error(TransportError::SendFailed("x".into()));
    }

    #[test]
    fn test_handlers_receive_payloads() {
        let bytes = Arc::new(AtomicUsize::new(0));
        let counter = bytes.clone();
        let events = TransportEvents::new().on_message(move |msg| {
            counter.fetch_add(msg.data.as_bytes().len(), Ordering::SeqCst);
        });

        events.emit_message(MessageEvent::binary(vec![1, 2, 3]));
        events.emit_message(MessageEvent::text("ab"));
        assert_eq!(bytes.load(Ordering::SeqCst), 5);
    }

    #[test]
    fn test_debug_shows_installed_handlers() {
        let events = TransportEvents::new().on_close(|_| {});
        let debug = format!("{events:?}");
        assert!(debug.contains("onclose: true"));
        assert!(debug.contains("onopen: false"));
    }
}
