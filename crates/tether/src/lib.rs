//! # Tether
//!
//! The network adapter layer of a real-time game client.
//!
//! ## Overview
//!
//! A real-time client needs a persistent bidirectional channel for state sync
//! and one-shot request/response calls for authentication and matchmaking.
//! Tether provides both behind small contracts:
//!
//! - [`Transport`](prelude::Transport): connect, send, close, with open/message/close/error events
//! - [`RequestTransport`](prelude::RequestTransport): get/post/put/del returning a response or a
//!   typed [`AbortError`](prelude::AbortError) / [`ServerError`](prelude::ServerError)
//!
//! The concrete transports run over injected host capabilities, so the same
//! code drives a `tokio-tungstenite`/`reqwest` binding or a scripted fake.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use tether::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let runtime = TransportRuntime::builder().build()?;
//!
//!     let socket = runtime.socket(
//!         TransportEvents::new().on_message(|msg| println!("{:?}", msg.data)),
//!     );
//!     socket.connect(&runtime.ws_endpoint("room/abc"), runtime.connect_options());
//!
//!     match runtime.http().post("matchmake/joinOrCreate/lobby", RequestOptions::new()).await {
//!         Ok(response) => println!("{}", response.status_code),
//!         Err(RequestError::Abort(_)) => println!("aborted"),
//!         Err(RequestError::Server(e)) => println!("failed: {e}"),
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - `toml-config`: TOML configuration files (default)
//! - `json-log`: JSON log output
//! - `ws-client`: WebSocket host binding
//! - `http-client`: HTTP host binding
//! - `full-transport`: Both host bindings

pub use tether_core as core;
pub use tether_runtime as runtime;
pub use tether_transport as transport;

/// Prelude module for convenient imports.
///
/// ```rust,ignore
/// use tether::prelude::*;
/// ```
pub mod prelude {
    // Runtime - main entry point
    pub use tether_runtime::{TetherConfig, TransportRuntime};

    // Contracts
    pub use tether_core::prelude::*;
    pub use tether_core::{Endpoint, EndpointResolver, MessageEvent, CloseEvent, InboundData};

    // Transports
    pub use tether_transport::{HttpTransport, SocketTransport};
}
