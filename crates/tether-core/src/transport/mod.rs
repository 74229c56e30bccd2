//! Persistent message transport abstraction.
//!
//! This module provides the contract a bidirectional transport satisfies, the
//! event types it emits, the outbound payload model, and the host socket
//! capability it is built on.

pub mod capability;
pub mod contract;
pub mod events;
pub mod payload;

// Re-export commonly used types
pub use capability::{
    Completion, ConnectRequest, ReadyState, SocketCapability, SocketHandle, SocketListener,
};
pub use contract::{
    ConnectOptions, ConnectionState, DEFAULT_CLOSE_CODE, DEFAULT_CLOSE_REASON, Transport,
};
pub use events::{
    CloseEvent, EventCallback, InboundData, MessageEvent, OpenEvent, TransportEvents,
};
pub use payload::{ByteView, OutboundPayload, WireFrame};
