//! # Tether Core
//!
//! Contracts and data model of the Tether client network layer.
//!
//! An upper-layer real-time client needs two things from the network: a
//! persistent bidirectional channel for state sync, and one-shot request/response
//! calls for things like authentication and matchmaking. This crate defines both
//! as abstract contracts, together with the error taxonomy and the host
//! capabilities the concrete transports in `tether-transport` are built on.
//!
//! ## Layers
//!
//! ```text
//! ┌──────────────────────────┐
//! │  Upper-layer client      │  (rooms, auth, matchmaking)
//! ├──────────────────────────┤
//! │  tether-core             │  <- This crate (Transport, RequestTransport, errors)
//! ├──────────────────────────┤
//! │  tether-transport        │  (SocketTransport, HttpTransport, host bindings)
//! ├──────────────────────────┤
//! │  Host capability         │  (SocketCapability, RequestCapability)
//! └──────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`transport`]: message transport contract, events, outbound payloads, socket capability
//! - [`request`]: request transport contract, options, responses, request capability
//! - [`error`]: [`TransportError`], [`AbortError`], [`ServerError`]
//! - [`endpoint`]: path-to-URL resolution

pub mod endpoint;
pub mod error;
pub mod headers;
pub mod request;
pub mod transport;

// Re-export error types
pub use error::{
    AbortError, RequestError, RequestResult, ServerError, TransportError, TransportResult,
};

// Re-export contract types
pub use endpoint::{Endpoint, EndpointResolver};
pub use headers::Headers;
pub use request::{
    DataType, HostFailure, HostRequest, HostResponse, Method, RequestCapability, RequestOptions,
    RequestTransport, Responder, Response, ResponseBody, ResponseType,
};
pub use transport::{
    ByteView, CloseEvent, ConnectOptions, ConnectRequest, ConnectionState, InboundData,
    MessageEvent, OpenEvent, OutboundPayload, ReadyState, SocketCapability, SocketHandle,
    SocketListener, Transport, TransportEvents, WireFrame,
};

/// Prelude for common imports.
pub mod prelude {
    pub use super::error::*;
    pub use super::request::{Method, RequestOptions, RequestTransport, Response, ResponseBody};
    pub use super::transport::{
        ByteView, ConnectOptions, ConnectionState, OutboundPayload, Transport, TransportEvents,
    };
}
