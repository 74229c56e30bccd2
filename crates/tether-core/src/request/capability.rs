//! Host request capability and the settle-once responder.
//!
//! Callback-style host request APIs hand back a `success` and a `fail`
//! callback. [`Responder`] is that pair: cloneable, usable from any thread,
//! and settled by whichever call comes first. Every later call is ignored, so a
//! misbehaving host that reports twice (or reports both outcomes) still
//! produces exactly one result.

use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::oneshot;
use tracing::trace;

use super::options::HostRequest;
use super::response::ResponseBody;
use crate::headers::Headers;

/// What the host returns when a request completed with an HTTP status.
#[derive(Debug, Clone, PartialEq)]
pub struct HostResponse {
    /// Response body.
    pub data: ResponseBody,
    /// HTTP status code.
    pub status_code: u16,
    /// Response headers.
    pub headers: Headers,
    /// `Set-Cookie` values, if the host provides them.
    pub cookies: Option<Vec<String>>,
    /// Host diagnostic attached to the completion, if any.
    pub err_msg: Option<String>,
}

impl HostResponse {
    /// Creates a response with no headers, cookies or diagnostic.
    pub fn new(status_code: u16, data: ResponseBody) -> Self {
        Self {
            data,
            status_code,
            headers: Headers::new(),
            cookies: None,
            err_msg: None,
        }
    }
}

/// What the host returns when no response was obtained at all.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct HostFailure {
    /// Host-style diagnostic, e.g. `"request:fail timeout"`.
    pub err_msg: Option<String>,
    /// Generic error message.
    pub message: Option<String>,
}

impl HostFailure {
    /// Creates a failure carrying an `errMsg` diagnostic.
    pub fn new(err_msg: impl Into<String>) -> Self {
        Self {
            err_msg: Some(err_msg.into()),
            message: None,
        }
    }

    /// Creates a failure carrying only a generic message.
    pub fn from_message(message: impl Into<String>) -> Self {
        Self {
            err_msg: None,
            message: Some(message.into()),
        }
    }
}

/// Final outcome reported by the host.
pub type HostOutcome = Result<HostResponse, HostFailure>;

/// Message used when the host dropped every responder without settling.
pub const DROPPED_MESSAGE: &str = "request dropped without a response";

/// Settle-once completion handle given to the host with each request.
#[derive(Debug, Clone)]
pub struct Responder {
    slot: Arc<Mutex<Option<oneshot::Sender<HostOutcome>>>>,
}

impl Responder {
    /// Creates a responder and the pending result it settles.
    pub fn channel() -> (Self, PendingResponse) {
        let (tx, rx) = oneshot::channel();
        let responder = Self {
            slot: Arc::new(Mutex::new(Some(tx))),
        };
        (responder, PendingResponse { rx })
    }

    /// Reports a completed request.
    pub fn success(&self, response: HostResponse) {
        self.settle(Ok(response));
    }

    /// Reports a request that produced no response.
    pub fn fail(&self, failure: HostFailure) {
        self.settle(Err(failure));
    }

    /// Returns true once any clone has settled.
    pub fn is_settled(&self) -> bool {
        self.slot.lock().is_none()
    }

    fn settle(&self, outcome: HostOutcome) {
        let Some(tx) = self.slot.lock().take() else {
            trace!(ok = outcome.is_ok(), "Responder already settled, ignoring");
            return;
        };
        // The caller may have stopped waiting.
        let _ = tx.send(outcome);
    }
}

/// The caller side of a [`Responder`].
#[derive(Debug)]
pub struct PendingResponse {
    rx: oneshot::Receiver<HostOutcome>,
}

impl PendingResponse {
    /// Waits for the host to settle.
    ///
    /// If every responder clone is dropped unsettled this resolves to a
    /// [`HostFailure`] whose message is [`DROPPED_MESSAGE`].
    pub async fn outcome(self) -> HostOutcome {
        self.rx
            .await
            .unwrap_or_else(|_| Err(HostFailure::from_message(DROPPED_MESSAGE)))
    }
}

/// Performs one-shot requests on behalf of a request transport.
pub trait RequestCapability: Send + Sync {
    /// Dispatches `request` and returns immediately.
    ///
    /// The host must eventually call `responder.success` or `responder.fail`;
    /// dropping it instead counts as a failure.
    fn request(&self, request: HostRequest, responder: Responder);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ok(status: u16) -> HostResponse {
        HostResponse::new(status, ResponseBody::Text(String::new()))
    }

    #[tokio::test]
    async fn test_first_settlement_wins() {
        let (responder, pending) = Responder::channel();
        let clone = responder.clone();

        responder.success(ok(200));
        clone.fail(HostFailure::new("request:fail abort"));
        responder.success(ok(500));

        assert!(clone.is_settled());
        let outcome = pending.outcome().await;
        assert_eq!(outcome.unwrap().status_code, 200);
    }

    #[tokio::test]
    async fn test_fail_then_success_keeps_failure() {
        let (responder, pending) = Responder::channel();
        responder.fail(HostFailure::new("request:fail timeout"));
        responder.success(ok(200));

        let failure = pending.outcome().await.unwrap_err();
        assert_eq!(failure.err_msg.as_deref(), Some("request:fail timeout"));
    }

    #[tokio::test]
    async fn test_dropped_responder_resolves_as_failure() {
        let (responder, pending) = Responder::channel();
        drop(responder);

        let failure = pending.outcome().await.unwrap_err();
        assert_eq!(failure.message.as_deref(), Some(DROPPED_MESSAGE));
        assert!(failure.err_msg.is_none());
    }

    #[test]
    fn test_settling_after_caller_gave_up_is_harmless() {
        let (responder, pending) = Responder::channel();
        drop(pending);
        responder.success(ok(204));
        assert!(responder.is_settled());
    }
}
