//! Outbound payloads and their normalization into wire frames.

use std::sync::Arc;

use serde_json::Value;

use crate::error::{TransportError, TransportResult};

// =============================================================================
// Byte View
// =============================================================================

/// A window `[byte_offset, byte_offset + byte_length)` into a shared backing buffer.
///
/// The window is validated on construction, so extracting it never fails.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ByteView {
    buffer: Arc<[u8]>,
    byte_offset: usize,
    byte_length: usize,
}

impl ByteView {
    /// Creates a view over `buffer`.
    ///
    /// Fails if the window does not fit inside the backing buffer.
    pub fn new(
        buffer: impl Into<Arc<[u8]>>,
        byte_offset: usize,
        byte_length: usize,
    ) -> TransportResult<Self> {
        let buffer = buffer.into();
        let end = byte_offset.checked_add(byte_length).ok_or_else(|| {
            TransportError::InvalidPayload(format!(
                "byte view window overflows: offset {byte_offset}, length {byte_length}"
            ))
        })?;
        if end > buffer.len() {
            return Err(TransportError::InvalidPayload(format!(
                "byte view [{byte_offset}, {end}) exceeds backing buffer of {} bytes",
                buffer.len()
            )));
        }
        Ok(Self {
            buffer,
            byte_offset,
            byte_length,
        })
    }

    /// Creates a view spanning the whole buffer.
    pub fn full(buffer: impl Into<Arc<[u8]>>) -> Self {
        let buffer = buffer.into();
        let byte_length = buffer.len();
        Self {
            buffer,
            byte_offset: 0,
            byte_length,
        }
    }

    /// Offset of the window inside the backing buffer.
    pub fn byte_offset(&self) -> usize {
        self.byte_offset
    }

    /// Length of the window.
    pub fn byte_length(&self) -> usize {
        self.byte_length
    }

    /// The entire backing buffer, including bytes outside the window.
    pub fn backing_buffer(&self) -> &[u8] {
        &self.buffer
    }

    /// The bytes inside the window.
    pub fn as_bytes(&self) -> &[u8] {
        &self.buffer[self.byte_offset..self.byte_offset + self.byte_length]
    }

    /// Copies the window into a standalone buffer.
    pub fn to_vec(&self) -> Vec<u8> {
        self.as_bytes().to_vec()
    }
}

// =============================================================================
// Outbound Payload
// =============================================================================

/// A message handed to [`Transport::send`](super::Transport::send).
#[derive(Debug, Clone, PartialEq)]
pub enum OutboundPayload {
    /// A complete raw buffer, sent as-is.
    Buffer(Vec<u8>),
    /// A window into a larger buffer; only the window is sent.
    View(ByteView),
    /// Text, sent as a text frame.
    Text(String),
    /// Any other value, coerced to its text representation.
    Json(Value),
}

impl OutboundPayload {
    /// Converts the payload into the form the socket primitive accepts.
    pub fn normalize(self) -> WireFrame {
        match self {
            Self::Buffer(bytes) => WireFrame::Binary(bytes),
            Self::View(view) => WireFrame::Binary(view.to_vec()),
            Self::Text(text) => WireFrame::Text(text),
            Self::Json(Value::String(text)) => WireFrame::Text(text),
            Self::Json(value) => WireFrame::Text(value.to_string()),
        }
    }

    /// Number of bytes that [`normalize`](Self::normalize) would put on the wire.
    ///
    /// For [`OutboundPayload::Json`] this serializes the value.
    pub fn byte_len(&self) -> usize {
        match self {
            Self::Buffer(bytes) => bytes.len(),
            Self::View(view) => view.byte_length(),
            Self::Text(text) => text.len(),
            Self::Json(Value::String(text)) => text.len(),
            Self::Json(value) => value.to_string().len(),
        }
    }
}

impl From<Vec<u8>> for OutboundPayload {
    fn from(bytes: Vec<u8>) -> Self {
        Self::Buffer(bytes)
    }
}

impl From<&[u8]> for OutboundPayload {
    fn from(bytes: &[u8]) -> Self {
        Self::Buffer(bytes.to_vec())
    }
}

impl From<ByteView> for OutboundPayload {
    fn from(view: ByteView) -> Self {
        Self::View(view)
    }
}

impl From<String> for OutboundPayload {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<&str> for OutboundPayload {
    fn from(text: &str) -> Self {
        Self::Text(text.to_owned())
    }
}

impl From<Value> for OutboundPayload {
    fn from(value: Value) -> Self {
        Self::Json(value)
    }
}

// =============================================================================
// Wire Frame
// =============================================================================

/// A normalized frame ready for the socket primitive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WireFrame {
    /// Binary frame.
    Binary(Vec<u8>),
    /// Text frame.
    Text(String),
}

impl WireFrame {
    /// Length of the frame body in bytes.
    pub fn len(&self) -> usize {
        match self {
            Self::Binary(bytes) => bytes.len(),
            Self::Text(text) => text.len(),
        }
    }

    /// Returns true if the frame body is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Raw bytes of the frame body.
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            Self::Binary(bytes) => bytes,
            Self::Text(text) => text.as_bytes(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn backing() -> Vec<u8> {
        (0u8..20).collect()
    }

    #[test]
    fn test_view_sends_only_its_window() {
        let buffer = backing();
        let expected = buffer[4..12].to_vec();
        let view = ByteView::new(buffer, 4, 8).unwrap();

        let frame = OutboundPayload::View(view).normalize();
        assert_eq!(frame, WireFrame::Binary(expected));
        assert_eq!(frame.len(), 8);
    }

    #[test]
    fn test_view_rejects_out_of_range_window() {
        assert!(matches!(
            ByteView::new(backing(), 16, 8),
            Err(TransportError::InvalidPayload(_))
        ));
        assert!(ByteView::new(backing(), usize::MAX, 2).is_err());
        assert!(ByteView::new(backing(), 20, 0).is_ok());
    }

    #[test]
    fn test_full_view_matches_buffer() {
        let view = ByteView::full(backing());
        assert_eq!(view.byte_offset(), 0);
        assert_eq!(view.as_bytes(), view.backing_buffer());
    }

    #[test]
    fn test_buffer_and_text_pass_through() {
        let bytes = vec![0xde, 0xad, 0xbe, 0xef];
        assert_eq!(
            OutboundPayload::from(bytes.clone()).normalize(),
            WireFrame::Binary(bytes)
        );
        assert_eq!(
            OutboundPayload::from("hello").normalize(),
            WireFrame::Text("hello".into())
        );
    }

    #[test]
    fn test_other_values_are_coerced_to_text() {
        let frame = OutboundPayload::Json(json!({"op": 10, "room": "lobby"})).normalize();
        assert_eq!(frame, WireFrame::Text(r#"{"op":10,"room":"lobby"}"#.into()));

        assert_eq!(
            OutboundPayload::Json(json!(42)).normalize(),
            WireFrame::Text("42".into())
        );
        assert_eq!(
            OutboundPayload::Json(json!("plain")).normalize(),
            WireFrame::Text("plain".into())
        );
    }

    #[test]
    fn test_byte_len_matches_normalized_frame() {
        let payloads = [
            OutboundPayload::Buffer(vec![1, 2, 3]),
            OutboundPayload::View(ByteView::new(backing(), 2, 5).unwrap()),
            OutboundPayload::Text("héllo".into()),
            OutboundPayload::Json(json!([1, 2, 3])),
        ];
        for payload in payloads {
            let expected = payload.byte_len();
            assert_eq!(payload.normalize().len(), expected);
        }
    }
}
