//! Echo Client Example
//!
//! Connects to a room that echoes every frame back, sends a few payloads,
//! and optionally performs an authenticated HTTP call first.
//!
//! # Usage
//!
//! ```bash
//! cargo run --package echo-client -- --room echo --message hello
//! cargo run --package echo-client -- --config tether.toml --request auth/userdata --token secret
//! ```

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use clap::Parser;
use serde_json::json;
use tether::prelude::*;
use tokio::sync::mpsc;
use tokio::time::timeout;
use tracing::{error, info, warn};

/// How long to wait for each socket event.
const EVENT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    /// Configuration file (defaults to searching for tether.toml).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Room path appended to the WebSocket endpoint.
    #[arg(long, default_value = "echo")]
    room: String,

    /// Text payload to send.
    #[arg(long, default_value = "hello")]
    message: String,

    /// Path to GET before connecting.
    #[arg(long)]
    request: Option<String>,

    /// Bearer token for HTTP calls.
    #[arg(long)]
    token: Option<String>,
}

#[derive(Debug)]
enum SocketEvent {
    Open,
    Message(InboundData),
    Close(CloseEvent),
    Error(TransportError),
}

fn socket_events(tx: mpsc::UnboundedSender<SocketEvent>) -> TransportEvents {
    let (open_tx, message_tx, close_tx, error_tx) = (tx.clone(), tx.clone(), tx.clone(), tx);
    TransportEvents::new()
        .on_open(move |_| {
            let _ = open_tx.send(SocketEvent::Open);
        })
        .on_message(move |event| {
            let _ = message_tx.send(SocketEvent::Message(event.data));
        })
        .on_close(move |event| {
            let _ = close_tx.send(SocketEvent::Close(event));
        })
        .on_error(move |err| {
            let _ = error_tx.send(SocketEvent::Error(err));
        })
}

async fn next_event(rx: &mut mpsc::UnboundedReceiver<SocketEvent>) -> Result<SocketEvent> {
    timeout(EVENT_TIMEOUT, rx.recv())
        .await
        .context("timed out waiting for socket event")?
        .context("socket event channel closed")
}

async fn call_http(runtime: &TransportRuntime, path: &str, token: Option<&str>) {
    let http = runtime.http();
    if let Some(token) = token {
        http.set_auth_token(token);
    }

    match http.get(path, RequestOptions::new()).await {
        Ok(response) => {
            info!(status = response.status_code, data = ?response.data, "Request succeeded")
        }
        Err(RequestError::Abort(e)) => warn!("Request aborted: {e}"),
        Err(RequestError::Server(e)) => {
            error!(status = e.status_code, "Request failed: {}", e.message)
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut builder = TransportRuntime::builder();
    if let Some(path) = &args.config {
        builder = builder.config_file(path);
    }
    let runtime = builder.build()?;

    if let Some(path) = &args.request {
        call_http(&runtime, path, args.token.as_deref()).await;
    }

    let (tx, mut rx) = mpsc::unbounded_channel();
    let socket = runtime.socket(socket_events(tx));
    let url = runtime.ws_endpoint(&args.room);
    socket.connect(&url, runtime.connect_options());

    match next_event(&mut rx).await? {
        SocketEvent::Open => info!(url = %url, "Connected"),
        SocketEvent::Error(e) => bail!("connection failed: {e}"),
        other => bail!("unexpected event before open: {other:?}"),
    }

    let payloads: Vec<OutboundPayload> = vec![
        args.message.as_str().into(),
        json!({ "type": "ping", "n": 1 }).into(),
        ByteView::new(vec![0u8, 1, 2, 3, 4, 5, 6, 7], 2, 4)?.into(),
    ];
    let expected = payloads.len();
    for payload in payloads {
        socket.send(payload);
    }

    let mut received = 0;
    while received < expected {
        match next_event(&mut rx).await? {
            SocketEvent::Message(InboundData::Text(text)) => {
                info!(text = %text, "Echo");
                received += 1;
            }
            SocketEvent::Message(InboundData::Binary(bytes)) => {
                info!(bytes = ?bytes, "Echo");
                received += 1;
            }
            SocketEvent::Error(e) => warn!("Socket error: {e}"),
            SocketEvent::Close(event) => bail!("closed early: {} {}", event.code, event.reason),
            SocketEvent::Open => {}
        }
    }

    socket.close(None, None);
    loop {
        if let SocketEvent::Close(event) = next_event(&mut rx).await? {
            info!(code = event.code, reason = %event.reason, clean = event.was_clean, "Closed");
            break;
        }
    }

    Ok(())
}
