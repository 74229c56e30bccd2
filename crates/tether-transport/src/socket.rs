//! Message transport over an injected socket capability.
//!
//! [`SocketTransport`] binds the [`Transport`] contract to a [`SocketCapability`].
//! It owns the connection state machine and enforces the event ordering the
//! contract promises, whatever order the host reports things in:
//!
//! - host events are tagged with the connection attempt they belong to, and
//!   events of a superseded attempt are dropped;
//! - host events are applied one at a time in arrival order, and events that
//!   arrive before `open` has returned the handle are held until it is stored;
//! - `onmessage` is only relayed once the connection is open;
//! - `onclose` is relayed at most once per connection, after which every
//!   host event for that connection is dropped.
//!
//! No callback is ever invoked while the internal lock is held, so handlers
//! may call back into the transport.

use std::collections::VecDeque;
use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use tracing::{error, info, trace, warn};

use tether_core::transport::{DEFAULT_CLOSE_CODE, DEFAULT_CLOSE_REASON};
use tether_core::{
    CloseEvent, ConnectOptions, ConnectRequest, ConnectionState, MessageEvent, OpenEvent,
    OutboundPayload, ReadyState, SocketCapability, SocketHandle, SocketListener, Transport,
    TransportError, TransportEvents,
};

/// An event reported by the host for one connection attempt.
enum HostEvent {
    Open(OpenEvent),
    Message(MessageEvent),
    Close(CloseEvent),
    Error(TransportError),
}

/// Per-transport mutable state.
struct Inner {
    state: ConnectionState,
    /// Incremented on every connection attempt.
    generation: u64,
    /// `onclose` was already relayed for the current generation.
    finished: bool,
    handle: Option<Arc<dyn SocketHandle>>,
    url: String,
    /// Host events not applied yet, tagged with their generation.
    queue: VecDeque<(u64, HostEvent)>,
    /// A thread is draining `queue`.
    dispatching: bool,
    /// `connect` has not stored the handle of the current attempt yet.
    awaiting_handle: bool,
}

impl Inner {
    fn is_current(&self, generation: u64) -> bool {
        self.generation == generation && !self.finished
    }

    /// Applies one host event, returning it if it must be relayed.
    fn apply(&mut self, generation: u64, event: HostEvent) -> Option<HostEvent> {
        let relay = match &event {
            HostEvent::Open(_) => self.apply_open(generation),
            HostEvent::Message(message) => self.apply_message(generation, message),
            HostEvent::Close(close) => self.apply_close(generation, close),
            HostEvent::Error(err) => self.apply_error(generation, err),
        };
        relay.then_some(event)
    }

    fn apply_open(&mut self, generation: u64) -> bool {
        if !self.is_current(generation) || self.state != ConnectionState::Connecting {
            trace!(generation, state = %self.state, "Ignoring stale open event");
            return false;
        }
        self.state = ConnectionState::Open;
        info!(url = %self.url, "Socket connected");
        true
    }

    fn apply_message(&mut self, generation: u64, message: &MessageEvent) -> bool {
        let receiving = matches!(
            self.state,
            ConnectionState::Open | ConnectionState::Closing
        );
        if !self.is_current(generation) || !receiving {
            trace!(generation, state = %self.state, "Dropping message outside open connection");
            return false;
        }
        trace!(len = message.data.as_bytes().len(), "Received message");
        true
    }

    fn apply_error(&mut self, generation: u64, err: &TransportError) -> bool {
        if !self.is_current(generation) {
            trace!(generation, error = %err, "Ignoring error for finished connection");
            return false;
        }
        if self.state == ConnectionState::Connecting {
            // Connect failure: the attempt is over, but the host may still
            // report a close for it.
            self.state = ConnectionState::Closed;
            self.handle = None;
        }
        error!(error = %err, "Socket error");
        true
    }

    fn apply_close(&mut self, generation: u64, close: &CloseEvent) -> bool {
        if !self.is_current(generation) {
            trace!(generation, code = close.code, "Ignoring duplicate close event");
            return false;
        }
        self.finished = true;
        self.state = ConnectionState::Closed;
        self.handle = None;
        info!(code = close.code, reason = %close.reason, clean = close.was_clean, "Socket closed");
        true
    }
}

struct Shared {
    events: TransportEvents,
    inner: Mutex<Inner>,
}

impl Shared {
    /// Queues a host event and drains the queue unless another call already is.
    fn post(&self, generation: u64, event: HostEvent) {
        {
            let mut inner = self.inner.lock();
            inner.queue.push_back((generation, event));
            if inner.dispatching {
                return;
            }
            inner.dispatching = true;
        }
        self.dispatch();
    }

    /// Drains the queue. The caller must have set `dispatching`.
    fn dispatch(&self) {
        loop {
            let relay = {
                let mut inner = self.inner.lock();
                let next = if inner.awaiting_handle {
                    None
                } else {
                    inner.queue.pop_front()
                };
                match next {
                    Some((generation, event)) => inner.apply(generation, event),
                    None => {
                        inner.dispatching = false;
                        return;
                    }
                }
            };
            if let Some(event) = relay {
                self.emit(event);
            }
        }
    }

    fn emit(&self, event: HostEvent) {
        match event {
            HostEvent::Open(event) => self.events.emit_open(event),
            HostEvent::Message(event) => self.events.emit_message(event),
            HostEvent::Close(event) => self.events.emit_close(event),
            HostEvent::Error(err) => self.events.emit_error(err),
        }
    }
}

/// Routes host events of one connection attempt back to the transport.
struct ConnectionListener {
    generation: u64,
    shared: Weak<Shared>,
}

impl ConnectionListener {
    fn post(&self, event: HostEvent) {
        if let Some(shared) = self.shared.upgrade() {
            shared.post(self.generation, event);
        }
    }
}

impl SocketListener for ConnectionListener {
    fn on_open(&self, event: OpenEvent) {
        self.post(HostEvent::Open(event));
    }

    fn on_message(&self, event: MessageEvent) {
        self.post(HostEvent::Message(event));
    }

    fn on_close(&self, event: CloseEvent) {
        self.post(HostEvent::Close(event));
    }

    fn on_error(&self, error: TransportError) {
        self.post(HostEvent::Error(error));
    }
}

/// A [`Transport`] over a host [`SocketCapability`].
///
/// # Example
///
/// ```rust,ignore
/// use std::sync::Arc;
/// use tether_core::{ConnectOptions, Transport, TransportEvents};
/// use tether_transport::{SocketTransport, WsSocketCapability};
///
/// let events = TransportEvents::new()
///     .on_open(|_| println!("open"))
///     .on_message(|msg| println!("{:?}", msg.data));
/// let transport = SocketTransport::new(Arc::new(WsSocketCapability::new()), events);
/// transport.connect("ws://localhost:2567/room", ConnectOptions::new());
/// ```
pub struct SocketTransport {
    capability: Arc<dyn SocketCapability>,
    shared: Arc<Shared>,
}

impl SocketTransport {
    /// Creates a closed transport that reports to `events`.
    pub fn new(capability: Arc<dyn SocketCapability>, events: TransportEvents) -> Self {
        Self {
            capability,
            shared: Arc::new(Shared {
                events,
                inner: Mutex::new(Inner {
                    state: ConnectionState::Closed,
                    generation: 0,
                    finished: true,
                    handle: None,
                    url: String::new(),
                    queue: VecDeque::new(),
                    dispatching: false,
                    awaiting_handle: false,
                }),
            }),
        }
    }

    /// URL of the most recent connection attempt.
    pub fn url(&self) -> String {
        self.shared.inner.lock().url.clone()
    }
}

impl Transport for SocketTransport {
    fn connect(&self, url: &str, options: ConnectOptions) {
        let generation = {
            let mut inner = self.shared.inner.lock();
            if inner.state != ConnectionState::Closed {
                let state = inner.state;
                drop(inner);
                warn!(url = %url, state = %state, "Connect called with a live connection");
                self.shared.events.emit_error(TransportError::InvalidState(format!(
                    "cannot connect while {state}"
                )));
                return;
            }
            inner.generation += 1;
            inner.finished = false;
            inner.state = ConnectionState::Connecting;
            inner.handle = None;
            inner.url = url.to_string();
            inner.awaiting_handle = true;
            inner.generation
        };

        info!(url = %url, "Connecting socket");

        let listener = Arc::new(ConnectionListener {
            generation,
            shared: Arc::downgrade(&self.shared),
        });
        let request = ConnectRequest {
            url: url.to_string(),
            headers: options.headers,
        };

        let opened = self.capability.open(request, listener);

        // Events the host reported during `open` were held. They are applied
        // only once the handle is in place.
        let drain = {
            let mut inner = self.shared.inner.lock();
            inner.awaiting_handle = false;
            match opened {
                Ok(handle) => inner.handle = Some(Arc::from(handle)),
                Err(err) => inner.queue.push_back((generation, HostEvent::Error(err))),
            }
            let drain = !inner.dispatching && !inner.queue.is_empty();
            if drain {
                inner.dispatching = true;
            }
            drain
        };
        if drain {
            self.shared.dispatch();
        }
    }

    fn send(&self, payload: OutboundPayload) {
        let (generation, handle) = {
            let inner = self.shared.inner.lock();
            match &inner.handle {
                Some(handle)
                    if inner.state == ConnectionState::Open
                        && handle.ready_state() == ReadyState::Open =>
                {
                    (inner.generation, handle.clone())
                }
                _ => {
                    trace!(
                        state = %inner.state,
                        len = payload.byte_len(),
                        "Socket not open, dropping payload"
                    );
                    return;
                }
            }
        };

        let frame = payload.normalize();
        trace!(len = frame.len(), "Sending frame");

        let shared = Arc::downgrade(&self.shared);
        handle.send(
            frame,
            Box::new(move |result| {
                if let Err(err) = result {
                    if let Some(shared) = shared.upgrade() {
                        shared.post(generation, HostEvent::Error(err));
                    }
                }
            }),
        );
    }

    fn close(&self, code: Option<u16>, reason: Option<&str>) {
        let code = code.unwrap_or(DEFAULT_CLOSE_CODE);
        let reason = reason.unwrap_or(DEFAULT_CLOSE_REASON).to_string();

        let (generation, handle) = {
            let mut inner = self.shared.inner.lock();
            let handle = match &inner.handle {
                Some(handle) if !inner.finished && inner.state != ConnectionState::Closing => {
                    handle.clone()
                }
                _ => {
                    trace!(state = %inner.state, "Close requested without a live connection");
                    return;
                }
            };
            inner.state = ConnectionState::Closing;
            (inner.generation, handle)
        };

        info!(code, reason = %reason, "Closing socket");

        let shared = Arc::downgrade(&self.shared);
        let event_reason = reason.clone();
        handle.close(
            code,
            &reason,
            Box::new(move |result| {
                // Close failures are logged, never reported through onerror.
                let was_clean = match result {
                    Ok(()) => true,
                    Err(err) => {
                        error!(error = %err, "Failed to close socket");
                        false
                    }
                };
                if let Some(shared) = shared.upgrade() {
                    let event = CloseEvent {
                        code,
                        reason: event_reason,
                        was_clean,
                    };
                    shared.post(generation, HostEvent::Close(event));
                }
            }),
        );
    }

    fn state(&self) -> ConnectionState {
        self.shared.inner.lock().state
    }

    fn is_open(&self) -> bool {
        let inner = self.shared.inner.lock();
        inner.state == ConnectionState::Open
            && inner
                .handle
                .as_ref()
                .is_some_and(|handle| handle.ready_state() == ReadyState::Open)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
    use tether_core::transport::{Completion, WireFrame};
    use tether_core::{ByteView, TransportResult};

    // =========================================================================
    // Fake socket capability
    // =========================================================================

    #[derive(Default)]
    struct FakeHost {
        listener: Mutex<Option<Arc<dyn SocketListener>>>,
        requests: Mutex<Vec<ConnectRequest>>,
        sent: Mutex<Vec<WireFrame>>,
        closes: Mutex<Vec<(u16, String)>>,
        pending_close: Mutex<Option<Completion>>,
        ready: AtomicU8,
        fail_open: AtomicBool,
        fail_sends: AtomicBool,
        /// Reports open and a first message before `open` returns.
        open_eagerly: AtomicBool,
    }

    impl FakeHost {
        fn listener(&self) -> Arc<dyn SocketListener> {
            self.listener.lock().clone().expect("no connection opened")
        }

        fn accept(&self) {
            self.ready.store(ReadyState::Open.as_u8(), Ordering::SeqCst);
            self.listener().on_open(OpenEvent {
                url: "ws://fake".into(),
            });
        }

        fn deliver(&self, text: &str) {
            self.listener().on_message(MessageEvent::text(text));
        }

        fn drop_connection(&self) {
            self.ready.store(ReadyState::Closed.as_u8(), Ordering::SeqCst);
            self.listener().on_close(CloseEvent::abnormal("peer went away"));
        }

        fn finish_close(&self, result: TransportResult<()>) {
            self.ready.store(ReadyState::Closed.as_u8(), Ordering::SeqCst);
            let done = self.pending_close.lock().take().expect("no pending close");
            done(result);
        }
    }

    struct FakeHandle(Arc<FakeHost>);

    impl SocketHandle for FakeHandle {
        fn send(&self, frame: WireFrame, done: Completion) {
            if self.0.fail_sends.load(Ordering::SeqCst) {
                done(Err(TransportError::SendFailed("buffer full".into())));
                return;
            }
            self.0.sent.lock().push(frame);
            done(Ok(()));
        }

        fn close(&self, code: u16, reason: &str, done: Completion) {
            self.0.closes.lock().push((code, reason.to_string()));
            self.0.ready.store(ReadyState::Closing.as_u8(), Ordering::SeqCst);
            *self.0.pending_close.lock() = Some(done);
        }

        fn ready_state(&self) -> ReadyState {
            ReadyState::from_u8(self.0.ready.load(Ordering::SeqCst))
        }
    }

    struct FakeCapability(Arc<FakeHost>);

    impl SocketCapability for FakeCapability {
        fn open(
            &self,
            request: ConnectRequest,
            listener: Arc<dyn SocketListener>,
        ) -> TransportResult<Box<dyn SocketHandle>> {
            if self.0.fail_open.load(Ordering::SeqCst) {
                return Err(TransportError::ConnectionFailed {
                    url: request.url,
                    reason: "refused".into(),
                });
            }
            self.0.requests.lock().push(request);
            self.0.ready.store(ReadyState::Connecting.as_u8(), Ordering::SeqCst);
            *self.0.listener.lock() = Some(listener.clone());
            if self.0.open_eagerly.load(Ordering::SeqCst) {
                self.0.ready.store(ReadyState::Open.as_u8(), Ordering::SeqCst);
                listener.on_open(OpenEvent {
                    url: "ws://fake".into(),
                });
                listener.on_message(MessageEvent::text("welcome"));
            }
            Ok(Box::new(FakeHandle(self.0.clone())))
        }
    }

    // =========================================================================
    // Event recorder
    // =========================================================================

    #[derive(Debug, Clone, PartialEq)]
    enum Seen {
        Open,
        Message(String),
        Close(u16, String, bool),
        Error(TransportError),
    }

    fn recorder() -> (TransportEvents, Arc<Mutex<Vec<Seen>>>) {
        let log = Arc::new(Mutex::new(Vec::new()));
        let (a, b, c, d) = (log.clone(), log.clone(), log.clone(), log.clone());
        let events = TransportEvents::new()
            .on_open(move |_| a.lock().push(Seen::Open))
            .on_message(move |msg| {
                let text = String::from_utf8_lossy(msg.data.as_bytes()).into_owned();
                b.lock().push(Seen::Message(text));
            })
            .on_close(move |ev| c.lock().push(Seen::Close(ev.code, ev.reason, ev.was_clean)))
            .on_error(move |err| d.lock().push(Seen::Error(err)));
        (events, log)
    }

    fn setup() -> (SocketTransport, Arc<FakeHost>, Arc<Mutex<Vec<Seen>>>) {
        let host = Arc::new(FakeHost::default());
        let (events, log) = recorder();
        let transport = SocketTransport::new(Arc::new(FakeCapability(host.clone())), events);
        (transport, host, log)
    }

    fn open(transport: &SocketTransport, host: &FakeHost) {
        transport.connect("ws://fake", ConnectOptions::new());
        host.accept();
    }

    // =========================================================================
    // Tests
    // =========================================================================

    #[test]
    fn test_connect_lifecycle() {
        let (transport, host, log) = setup();
        assert_eq!(transport.state(), ConnectionState::Closed);
        assert!(!transport.is_open());

        transport.connect(
            "ws://fake/room",
            ConnectOptions::new().with_header("X-Token", "t"),
        );
        assert_eq!(transport.state(), ConnectionState::Connecting);
        assert_eq!(transport.url(), "ws://fake/room");
        assert_eq!(
            host.requests.lock()[0].headers.get("X-Token").map(String::as_str),
            Some("t")
        );

        host.accept();
        assert_eq!(transport.state(), ConnectionState::Open);
        assert!(transport.is_open());
        assert_eq!(*log.lock(), vec![Seen::Open]);
    }

    #[test]
    fn test_open_failure_reports_error_and_closes() {
        let (transport, host, log) = setup();
        host.fail_open.store(true, Ordering::SeqCst);

        transport.connect("ws://fake", ConnectOptions::new());
        assert_eq!(transport.state(), ConnectionState::Closed);
        assert!(matches!(
            log.lock().as_slice(),
            [Seen::Error(TransportError::ConnectionFailed { .. })]
        ));
    }

    #[test]
    fn test_host_error_while_connecting_closes_but_allows_close_event() {
        let (transport, host, log) = setup();
        transport.connect("ws://fake", ConnectOptions::new());

        host.listener()
            .on_error(TransportError::Io("handshake failed".into()));
        assert_eq!(transport.state(), ConnectionState::Closed);

        host.drop_connection();
        host.drop_connection();
        assert_eq!(
            *log.lock(),
            vec![
                Seen::Error(TransportError::Io("handshake failed".into())),
                Seen::Close(1006, "peer went away".into(), false),
            ]
        );
    }

    #[test]
    fn test_connect_while_live_is_rejected() {
        let (transport, host, log) = setup();
        open(&transport, &host);

        transport.connect("ws://other", ConnectOptions::new());
        assert_eq!(transport.state(), ConnectionState::Open);
        assert_eq!(host.requests.lock().len(), 1);
        assert!(matches!(
            log.lock().last(),
            Some(Seen::Error(TransportError::InvalidState(_)))
        ));
    }

    #[test]
    fn test_no_message_before_open() {
        let (transport, host, log) = setup();
        transport.connect("ws://fake", ConnectOptions::new());

        host.deliver("too early");
        host.accept();
        host.deliver("hello");
        host.accept();

        assert_eq!(*log.lock(), vec![Seen::Open, Seen::Message("hello".into())]);
    }

    #[test]
    fn test_no_events_after_close() {
        let (transport, host, log) = setup();
        open(&transport, &host);

        host.drop_connection();
        host.deliver("late");
        host.listener().on_error(TransportError::Io("late".into()));
        host.drop_connection();

        assert_eq!(
            *log.lock(),
            vec![Seen::Open, Seen::Close(1006, "peer went away".into(), false)]
        );
        assert_eq!(transport.state(), ConnectionState::Closed);
    }

    #[test]
    fn test_send_normalizes_byte_view() {
        let (transport, host, _log) = setup();
        open(&transport, &host);

        let backing: Vec<u8> = (100u8..120).collect();
        let expected = backing[4..12].to_vec();
        transport.send(ByteView::new(backing, 4, 8).unwrap().into());
        transport.send("text".into());

        let sent = host.sent.lock();
        assert_eq!(sent[0], WireFrame::Binary(expected));
        assert_eq!(sent[0].len(), 8);
        assert_eq!(sent[1], WireFrame::Text("text".into()));
    }

    #[test]
    fn test_send_when_not_open_is_dropped() {
        let (transport, host, log) = setup();
        transport.send("before connect".into());

        transport.connect("ws://fake", ConnectOptions::new());
        transport.send("while connecting".into());

        host.accept();
        host.ready.store(ReadyState::Closing.as_u8(), Ordering::SeqCst);
        transport.send("host not open".into());

        assert!(host.sent.lock().is_empty());
        assert_eq!(*log.lock(), vec![Seen::Open]);
    }

    #[test]
    fn test_send_failure_reaches_onerror() {
        let (transport, host, log) = setup();
        open(&transport, &host);
        host.fail_sends.store(true, Ordering::SeqCst);

        transport.send(vec![1, 2, 3].into());
        assert_eq!(
            log.lock().last(),
            Some(&Seen::Error(TransportError::SendFailed("buffer full".into())))
        );
        assert_eq!(transport.state(), ConnectionState::Open);
    }

    #[test]
    fn test_send_unreliable_sends_nothing() {
        let (transport, host, log) = setup();
        open(&transport, &host);

        transport.send_unreliable(vec![9; 64].into());
        transport.send_unreliable("x".into());
        assert!(host.sent.lock().is_empty());
        assert_eq!(*log.lock(), vec![Seen::Open]);
    }

    #[test]
    fn test_close_defaults_and_explicit_values() {
        let (transport, host, log) = setup();
        open(&transport, &host);

        transport.close(None, None);
        assert_eq!(transport.state(), ConnectionState::Closing);
        host.finish_close(Ok(()));
        assert_eq!(transport.state(), ConnectionState::Closed);

        open(&transport, &host);
        transport.close(Some(4000), Some("bye"));
        host.finish_close(Ok(()));

        assert_eq!(
            *host.closes.lock(),
            vec![(1000, "Normal closure".to_string()), (4000, "bye".to_string())]
        );
        assert_eq!(
            *log.lock(),
            vec![
                Seen::Open,
                Seen::Close(1000, "Normal closure".into(), true),
                Seen::Open,
                Seen::Close(4000, "bye".into(), true),
            ]
        );
    }

    #[test]
    fn test_close_failure_closes_without_onerror() {
        let (transport, host, log) = setup();
        open(&transport, &host);

        transport.close(None, None);
        host.finish_close(Err(TransportError::CloseFailed("socket gone".into())));

        assert_eq!(transport.state(), ConnectionState::Closed);
        assert_eq!(
            *log.lock(),
            vec![Seen::Open, Seen::Close(1000, "Normal closure".into(), false)]
        );
    }

    #[test]
    fn test_close_is_idempotent() {
        let (transport, host, log) = setup();
        transport.close(None, None);

        open(&transport, &host);
        transport.close(None, None);
        transport.close(Some(4001), None);
        host.finish_close(Ok(()));
        transport.close(None, None);

        assert_eq!(host.closes.lock().len(), 1);
        assert_eq!(log.lock().len(), 2);
    }

    #[test]
    fn test_host_close_event_and_completion_report_once() {
        let (transport, host, log) = setup();
        open(&transport, &host);

        transport.close(Some(4000), Some("bye"));
        host.listener().on_close(CloseEvent::new(4000, "bye"));
        host.deliver("after close");
        host.finish_close(Ok(()));

        assert_eq!(
            *log.lock(),
            vec![Seen::Open, Seen::Close(4000, "bye".into(), true)]
        );
    }

    #[test]
    fn test_stale_connection_events_are_ignored() {
        let (transport, host, log) = setup();
        open(&transport, &host);
        let stale = host.listener();
        host.drop_connection();

        open(&transport, &host);
        stale.on_message(MessageEvent::text("ghost"));
        stale.on_close(CloseEvent::new(1000, "ghost"));
        host.deliver("fresh");

        assert_eq!(
            *log.lock(),
            vec![
                Seen::Open,
                Seen::Close(1006, "peer went away".into(), false),
                Seen::Open,
                Seen::Message("fresh".into()),
            ]
        );
        assert!(transport.is_open());
    }

    #[test]
    fn test_handlers_may_reenter_transport() {
        let host = Arc::new(FakeHost::default());
        let slot: Arc<Mutex<Option<Arc<SocketTransport>>>> = Arc::new(Mutex::new(None));
        let reentrant = slot.clone();
        let events = TransportEvents::new().on_open(move |_| {
            if let Some(transport) = reentrant.lock().clone() {
                transport.send("join".into());
            }
        });
        let transport = Arc::new(SocketTransport::new(
            Arc::new(FakeCapability(host.clone())),
            events,
        ));
        *slot.lock() = Some(transport.clone());

        open(&transport, &host);
        assert_eq!(*host.sent.lock(), vec![WireFrame::Text("join".into())]);
    }

    #[test]
    fn test_open_reported_inside_open_waits_for_handle() {
        let host = Arc::new(FakeHost::default());
        host.open_eagerly.store(true, Ordering::SeqCst);

        let slot: Arc<Mutex<Option<Arc<SocketTransport>>>> = Arc::new(Mutex::new(None));
        let seen_in_onopen = Arc::new(Mutex::new(None));
        let (reentrant, seen) = (slot.clone(), seen_in_onopen.clone());
        let (events, log) = recorder();
        let open_log = log.clone();
        let events = events.on_open(move |_| {
            open_log.lock().push(Seen::Open);
            if let Some(transport) = reentrant.lock().clone() {
                *seen.lock() = Some((transport.state(), transport.is_open()));
                transport.send("join".into());
            }
        });
        let transport = Arc::new(SocketTransport::new(
            Arc::new(FakeCapability(host.clone())),
            events,
        ));
        *slot.lock() = Some(transport.clone());

        transport.connect("ws://fake", ConnectOptions::new());

        assert_eq!(*seen_in_onopen.lock(), Some((ConnectionState::Open, true)));
        assert_eq!(*host.sent.lock(), vec![WireFrame::Text("join".into())]);
        assert_eq!(
            *log.lock(),
            vec![Seen::Open, Seen::Message("welcome".into())]
        );
        assert!(transport.is_open());
    }

    #[test]
    fn test_error_reported_inside_open_is_applied_after_it_returns() {
        struct FailingCapability;

        impl SocketCapability for FailingCapability {
            fn open(
                &self,
                _request: ConnectRequest,
                listener: Arc<dyn SocketListener>,
            ) -> TransportResult<Box<dyn SocketHandle>> {
                listener.on_error(TransportError::Io("dns".into()));
                listener.on_close(CloseEvent::abnormal("dns"));
                Ok(Box::new(FakeHandle(Arc::new(FakeHost::default()))))
            }
        }

        let (events, log) = recorder();
        let transport = SocketTransport::new(Arc::new(FailingCapability), events);
        transport.connect("ws://fake", ConnectOptions::new());

        assert_eq!(transport.state(), ConnectionState::Closed);
        assert!(!transport.is_open());
        assert_eq!(
            *log.lock(),
            vec![
                Seen::Error(TransportError::Io("dns".into())),
                Seen::Close(1006, "dns".into(), false),
            ]
        );
    }
}
