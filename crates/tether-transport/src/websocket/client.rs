//! WebSocket socket capability implementation.

use std::sync::Arc;
use std::sync::atomic::{AtomicU8, Ordering};
use std::time::Duration;

use futures::stream::{SplitSink, SplitStream};
use futures::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::handshake::client::Request;
use tokio_tungstenite::tungstenite::http::{HeaderName, HeaderValue};
use tokio_tungstenite::tungstenite::protocol::CloseFrame;
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;
use tokio_tungstenite::tungstenite::{Error, Message};
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use tracing::{info, trace, warn};

use tether_core::transport::{Completion, DEFAULT_CLOSE_CODE, DEFAULT_CLOSE_REASON};
use tether_core::{
    CloseEvent, ConnectRequest, MessageEvent, OpenEvent, ReadyState, SocketCapability,
    SocketHandle, SocketListener, TransportError, TransportResult, WireFrame,
};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;
type WsSink = SplitSink<WsStream, Message>;
type WsSource = SplitStream<WsStream>;

/// Outgoing command queue depth per connection.
const COMMAND_BUFFER: usize = 256;

/// How long to wait for the peer to answer a close frame.
const CLOSE_TIMEOUT: Duration = Duration::from_secs(5);

/// Socket capability backed by `tokio-tungstenite`.
///
/// [`open`](SocketCapability::open) must be called from within a tokio runtime;
/// each connection runs on its own spawned task.
#[derive(Debug, Clone, Default)]
pub struct WsSocketCapability;

impl WsSocketCapability {
    /// Creates a new WebSocket socket capability.
    pub fn new() -> Self {
        Self
    }
}

impl SocketCapability for WsSocketCapability {
    fn open(
        &self,
        request: ConnectRequest,
        listener: Arc<dyn SocketListener>,
    ) -> TransportResult<Box<dyn SocketHandle>> {
        let runtime = tokio::runtime::Handle::try_current().map_err(|_| {
            TransportError::NotAvailable {
                transport: "ws-client",
            }
        })?;
        let client_request = build_client_request(&request)?;

        let (command_tx, command_rx) = mpsc::channel(COMMAND_BUFFER);
        let ready = Arc::new(AtomicU8::new(ReadyState::Connecting.as_u8()));

        let connection = Connection {
            url: request.url,
            ready: ready.clone(),
            listener,
        };
        runtime.spawn(connection.run(client_request, command_rx));

        Ok(Box::new(WsSocketHandle { command_tx, ready }))
    }
}

/// Builds the handshake request, attaching the caller's headers.
fn build_client_request(request: &ConnectRequest) -> TransportResult<Request> {
    let invalid = |reason: String| TransportError::ConnectionFailed {
        url: request.url.clone(),
        reason,
    };

    let mut client_request = request
        .url
        .as_str()
        .into_client_request()
        .map_err(|e| invalid(format!("invalid WebSocket request: {e}")))?;

    for (name, value) in &request.headers {
        let name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|e| invalid(format!("invalid header name '{name}': {e}")))?;
        let value = HeaderValue::from_str(value)
            .map_err(|e| invalid(format!("invalid header value for '{name}': {e}")))?;
        client_request.headers_mut().insert(name, value);
    }

    Ok(client_request)
}

// =============================================================================
// Handle
// =============================================================================

enum Command {
    Send(WireFrame, Completion),
    Close {
        code: u16,
        reason: String,
        done: Completion,
    },
}

impl Command {
    fn fail(self, err: TransportError) {
        match self {
            Self::Send(_, done) | Self::Close { done, .. } => done(Err(err)),
        }
    }
}

struct WsSocketHandle {
    command_tx: mpsc::Sender<Command>,
    ready: Arc<AtomicU8>,
}

impl WsSocketHandle {
    fn submit(&self, command: Command) {
        match self.command_tx.try_send(command) {
            Ok(()) => {}
            Err(TrySendError::Full(command)) => {
                command.fail(TransportError::SendFailed("send queue is full".into()))
            }
            Err(TrySendError::Closed(command)) => command.fail(TransportError::ConnectionClosed {
                reason: "connection task has ended".into(),
            }),
        }
    }
}

impl SocketHandle for WsSocketHandle {
    fn send(&self, frame: WireFrame, done: Completion) {
        self.submit(Command::Send(frame, done));
    }

    fn close(&self, code: u16, reason: &str, done: Completion) {
        self.submit(Command::Close {
            code,
            reason: reason.to_string(),
            done,
        });
    }

    fn ready_state(&self) -> ReadyState {
        ReadyState::from_u8(self.ready.load(Ordering::Acquire))
    }
}

// =============================================================================
// Connection task
// =============================================================================

struct Connection {
    url: String,
    ready: Arc<AtomicU8>,
    listener: Arc<dyn SocketListener>,
}

impl Connection {
    fn set_ready(&self, state: ReadyState) {
        self.ready.store(state.as_u8(), Ordering::Release);
    }

    /// Drives one connection from handshake to close.
    async fn run(self, request: Request, mut commands: mpsc::Receiver<Command>) {
        info!(url = %self.url, "Connecting to WebSocket server");

        let stream = match connect_async(request).await {
            Ok((stream, _response)) => stream,
            Err(e) => {
                self.set_ready(ReadyState::Closed);
                warn!(url = %self.url, error = %e, "WebSocket connection failed");
                self.listener.on_error(TransportError::ConnectionFailed {
                    url: self.url.clone(),
                    reason: format!("WebSocket connection failed: {e}"),
                });
                commands.close();
                while let Some(command) = commands.recv().await {
                    command.fail(TransportError::ConnectionClosed {
                        reason: "connection was never opened".into(),
                    });
                }
                return;
            }
        };

        self.set_ready(ReadyState::Open);
        info!(url = %self.url, "WebSocket connected");
        self.listener.on_open(OpenEvent {
            url: self.url.clone(),
        });

        let (mut ws_tx, mut ws_rx) = stream.split();

        loop {
            tokio::select! {
                command = commands.recv() => match command {
                    Some(Command::Send(frame, done)) => {
                        let len = frame.len();
                        let result = ws_tx
                            .send(into_message(frame))
                            .await
                            .map_err(|e| TransportError::SendFailed(e.to_string()));
                        trace!(url = %self.url, len, ok = result.is_ok(), "Sent frame");
                        done(result);
                    }
                    Some(Command::Close { code, reason, done }) => {
                        self.set_ready(ReadyState::Closing);
                        let (result, event) =
                            close_gracefully(&mut ws_tx, &mut ws_rx, code, reason).await;
                        self.set_ready(ReadyState::Closed);
                        done(result);
                        self.listener.on_close(event);
                        return;
                    }
                    None => {
                        // Every handle was dropped; shut the connection down quietly.
                        trace!(url = %self.url, "Socket handle dropped, closing connection");
                        self.set_ready(ReadyState::Closing);
                        let _ = close_gracefully(
                            &mut ws_tx,
                            &mut ws_rx,
                            DEFAULT_CLOSE_CODE,
                            DEFAULT_CLOSE_REASON.to_string(),
                        )
                        .await;
                        self.set_ready(ReadyState::Closed);
                        return;
                    }
                },

                message = ws_rx.next() => {
                    if let Some(event) = self.handle_message(&mut ws_tx, message).await {
                        self.set_ready(ReadyState::Closed);
                        self.listener.on_close(event);
                        return;
                    }
                }
            }
        }
    }

    /// Relays one inbound frame. Returns a close event when the connection ended.
    async fn handle_message(
        &self,
        ws_tx: &mut WsSink,
        message: Option<Result<Message, Error>>,
    ) -> Option<CloseEvent> {
        match message {
            Some(Ok(Message::Text(text))) => {
                trace!(url = %self.url, len = text.len(), "Received text");
                self.listener
                    .on_message(MessageEvent::text(text.as_str().to_owned()));
                None
            }
            Some(Ok(Message::Binary(data))) => {
                trace!(url = %self.url, len = data.len(), "Received binary");
                self.listener.on_message(MessageEvent::binary(data.to_vec()));
                None
            }
            Some(Ok(Message::Ping(data))) => {
                trace!(url = %self.url, "Received ping, sending pong");
                let _ = ws_tx.send(Message::Pong(data)).await;
                None
            }
            Some(Ok(Message::Pong(_))) => {
                trace!(url = %self.url, "Received pong");
                None
            }
            Some(Ok(Message::Frame(_))) => None,
            Some(Ok(Message::Close(frame))) => {
                info!(url = %self.url, "Server closed connection");
                // Flush the close reply queued by tungstenite.
                let _ = ws_tx.close().await;
                Some(close_event(frame))
            }
            Some(Err(e)) => {
                warn!(url = %self.url, error = %e, "WebSocket error");
                self.listener.on_error(TransportError::Io(e.to_string()));
                Some(CloseEvent::abnormal(e.to_string()))
            }
            None => {
                info!(url = %self.url, "WebSocket stream ended");
                Some(CloseEvent::abnormal("stream ended"))
            }
        }
    }
}

/// Sends a close frame and waits for the peer's reply.
async fn close_gracefully(
    ws_tx: &mut WsSink,
    ws_rx: &mut WsSource,
    code: u16,
    reason: String,
) -> (TransportResult<()>, CloseEvent) {
    let frame = CloseFrame {
        code: CloseCode::from(code),
        reason: reason.clone().into(),
    };
    if let Err(e) = ws_tx.send(Message::Close(Some(frame))).await {
        let event = CloseEvent {
            code,
            reason,
            was_clean: false,
        };
        return (Err(TransportError::CloseFailed(e.to_string())), event);
    }

    let reply = tokio::time::timeout(CLOSE_TIMEOUT, async {
        while let Some(message) = ws_rx.next().await {
            match message {
                Ok(Message::Close(frame)) => return Some(frame),
                Ok(_) => continue,
                Err(_) => break,
            }
        }
        None
    })
    .await;

    match reply {
        Ok(Some(frame)) => (Ok(()), close_event(frame)),
        Ok(None) => (Ok(()), CloseEvent::new(code, reason)),
        Err(_) => {
            let event = CloseEvent {
                code,
                reason,
                was_clean: false,
            };
            (
                Err(TransportError::CloseFailed("timed out waiting for close reply".into())),
                event,
            )
        }
    }
}

fn close_event(frame: Option<CloseFrame>) -> CloseEvent {
    match frame {
        Some(frame) => CloseEvent::new(u16::from(frame.code), frame.reason.as_str()),
        // A close frame without a status code.
        None => CloseEvent::new(1005, ""),
    }
}

fn into_message(frame: WireFrame) -> Message {
    match frame {
        WireFrame::Binary(bytes) => Message::Binary(bytes.into()),
        WireFrame::Text(text) => Message::Text(text.into()),
    }
}
