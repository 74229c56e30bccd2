//! # Tether Transport
//!
//! Concrete transports for the Tether client network layer.
//!
//! The two transports in this crate implement the contracts of `tether-core`
//! over injected host capabilities, so they run unchanged against a real
//! network binding or a scripted fake in tests.
//!
//! ## Features
//!
//! - `ws-client`: WebSocket socket capability on `tokio-tungstenite`
//! - `http-client`: HTTP request capability on `reqwest`
//! - `full`: Both bindings
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────┐
//! │  Upper-layer client      │
//! ├──────────────────────────┤
//! │  tether-core             │  (Transport, RequestTransport)
//! ├──────────────────────────┤
//! │  tether-transport        │  <- This crate
//! │   SocketTransport        │     state machine, event ordering
//! │   HttpTransport          │     header merging, outcome classification
//! ├──────────────────────────┤
//! │  Host capability         │  (WsSocketCapability, ReqwestCapability, fakes)
//! └──────────────────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use tether_core::{
//!     ConnectOptions, Endpoint, RequestOptions, RequestTransport, Transport, TransportEvents,
//! };
//! use tether_transport::{HttpTransport, ReqwestCapability, SocketTransport, WsSocketCapability};
//!
//! let endpoint = Endpoint::default();
//!
//! let socket = SocketTransport::new(Arc::new(WsSocketCapability::new()), TransportEvents::new());
//! socket.connect(&endpoint.ws_endpoint("room"), ConnectOptions::new());
//!
//! let http = HttpTransport::new(Arc::new(ReqwestCapability::new()?), Arc::new(endpoint));
//! http.set_auth_token("secret");
//! let response = http.get("auth/userdata", RequestOptions::new()).await?;
//! ```

mod request;
mod socket;

pub use request::HttpTransport;
pub use socket::SocketTransport;

// Host bindings (feature-gated)
#[cfg(feature = "http-client")]
pub mod http;

#[cfg(feature = "ws-client")]
pub mod websocket;

#[cfg(feature = "http-client")]
pub use http::ReqwestCapability;

#[cfg(feature = "ws-client")]
pub use websocket::WsSocketCapability;
