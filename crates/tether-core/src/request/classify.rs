//! Outcome classification for the request transport.
//!
//! Abort detection is a substring match on the host diagnostic. It is kept in
//! [`is_abort`] alone so a structured host error code can replace it later.

use super::capability::{HostFailure, HostResponse};
use super::response::Response;
use crate::error::{AbortError, RequestError, RequestResult, ServerError};

/// Fallback message for failures that carry no diagnostic.
pub const GENERIC_FAILURE: &str = "Request failed";

/// Returns true if the status code counts as success.
pub fn is_success(status_code: u16) -> bool {
    (200..300).contains(&status_code)
}

/// Returns true if the host failure represents a cancelled request.
pub fn is_abort(failure: &HostFailure) -> bool {
    failure
        .err_msg
        .as_deref()
        .is_some_and(|msg| msg.contains("abort"))
}

/// Classifies a completed exchange.
///
/// 2xx resolves; anything else rejects with a [`ServerError`] whose message is
/// the body's `error` field, else the host diagnostic, else `"HTTP {status}"`.
pub fn classify_response(response: HostResponse) -> RequestResult<Response> {
    let HostResponse {
        data,
        status_code,
        headers,
        cookies,
        err_msg,
    } = response;

    if is_success(status_code) {
        return Ok(Response {
            data,
            status_code,
            headers,
            cookies: cookies.unwrap_or_default(),
        });
    }

    let message = data
        .error_field()
        .or(err_msg)
        .unwrap_or_else(|| format!("HTTP {status_code}"));
    Err(ServerError::new(i32::from(status_code), message).into())
}

/// Classifies a failure that produced no response.
pub fn classify_failure(failure: HostFailure) -> RequestError {
    if is_abort(&failure) {
        return AbortError::default().into();
    }
    let message = failure
        .err_msg
        .or(failure.message)
        .unwrap_or_else(|| GENERIC_FAILURE.to_string());
    ServerError::network(message).into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::ResponseBody;
    use serde_json::json;

    fn response(status: u16) -> HostResponse {
        HostResponse::new(status, ResponseBody::Json(json!({"ok": true})))
    }

    #[test]
    fn test_status_boundaries() {
        for status in [199u16, 300, 301, 404, 500, 100] {
            let err = classify_response(response(status)).unwrap_err();
            assert_eq!(err.status_code(), Some(i32::from(status)), "status {status}");
        }
        for status in [200u16, 201, 204, 299] {
            let res = classify_response(response(status)).unwrap();
            assert_eq!(res.status_code, status);
        }
    }

    #[test]
    fn test_missing_cookies_become_empty() {
        let res = classify_response(response(200)).unwrap();
        assert!(res.cookies.is_empty());

        let mut host = response(200);
        host.cookies = Some(vec!["a=1".into(), "b=2".into()]);
        assert_eq!(classify_response(host).unwrap().cookies, vec!["a=1", "b=2"]);
    }

    #[test]
    fn test_error_message_priority() {
        let mut host = HostResponse::new(
            409,
            ResponseBody::Json(json!({"error": "room is locked"})),
        );
        host.err_msg = Some("request:ok".into());
        assert_eq!(
            classify_response(host).unwrap_err(),
            RequestError::Server(ServerError::new(409, "room is locked"))
        );

        let mut host = HostResponse::new(502, ResponseBody::Text("bad gateway".into()));
        host.err_msg = Some("request:ok".into());
        assert_eq!(
            classify_response(host).unwrap_err(),
            RequestError::Server(ServerError::new(502, "request:ok"))
        );

        let host = HostResponse::new(503, ResponseBody::Binary(vec![]));
        assert_eq!(
            classify_response(host).unwrap_err(),
            RequestError::Server(ServerError::new(503, "HTTP 503"))
        );
    }

    #[test]
    fn test_abort_classification() {
        let err = classify_failure(HostFailure::new("request:fail abort"));
        assert_eq!(err, RequestError::Abort(AbortError::new("Request aborted")));

        let err = classify_failure(HostFailure::new("request:fail timeout"));
        assert_eq!(
            err,
            RequestError::Server(ServerError::new(-1, "request:fail timeout"))
        );
    }

    #[test]
    fn test_failure_message_fallbacks() {
        let err = classify_failure(HostFailure::from_message("dns lookup failed"));
        assert_eq!(err, RequestError::Server(ServerError::network("dns lookup failed")));

        // Only the host diagnostic is inspected for aborts.
        let err = classify_failure(HostFailure::from_message("abort"));
        assert!(!err.is_abort());

        let err = classify_failure(HostFailure::default());
        assert_eq!(err, RequestError::Server(ServerError::network(GENERIC_FAILURE)));
    }
}
