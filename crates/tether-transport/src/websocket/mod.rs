//! WebSocket host binding.
//!
//! [`WsSocketCapability`] implements [`SocketCapability`](tether_core::SocketCapability)
//! on top of `tokio-tungstenite`. Each connection runs as a spawned task that
//! relays frames between a command queue and the socket.

mod client;

pub use client::WsSocketCapability;
