//! Request transport over an injected request capability.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::RwLock;
use tracing::{debug, warn};

use tether_core::headers::{self, AUTHORIZATION};
use tether_core::request::{DEFAULT_TIMEOUT, classify_failure, classify_response};
use tether_core::{
    EndpointResolver, Headers, HostRequest, Method, RequestCapability, RequestOptions,
    RequestResult, RequestTransport, Responder, Response,
};

/// A [`RequestTransport`] over a host [`RequestCapability`].
///
/// Headers are merged per call in this order, later entries winning:
/// transport defaults, per-call headers, then `Authorization: Bearer <token>`
/// when an auth token is set.
///
/// # Example
///
/// ```rust,ignore
/// use std::sync::Arc;
/// use tether_core::{Endpoint, RequestOptions, RequestTransport};
/// use tether_transport::{HttpTransport, ReqwestCapability};
///
/// let capability = Arc::new(ReqwestCapability::new()?);
/// let http = HttpTransport::new(capability, Arc::new(Endpoint::default()));
/// http.set_auth_token("secret");
/// let res = http.get("auth/userdata", RequestOptions::new()).await?;
/// ```
pub struct HttpTransport {
    capability: Arc<dyn RequestCapability>,
    endpoint: Arc<dyn EndpointResolver>,
    headers: RwLock<Headers>,
    auth_token: RwLock<Option<String>>,
    default_timeout: Duration,
}

impl HttpTransport {
    /// Creates a request transport with no default headers and no token.
    pub fn new(
        capability: Arc<dyn RequestCapability>,
        endpoint: Arc<dyn EndpointResolver>,
    ) -> Self {
        Self {
            capability,
            endpoint,
            headers: RwLock::new(Headers::new()),
            auth_token: RwLock::new(None),
            default_timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Sets the transport-default headers.
    pub fn with_headers(self, headers: Headers) -> Self {
        *self.headers.write() = headers;
        self
    }

    /// Sets the timeout used when a call does not specify one.
    pub fn with_default_timeout(mut self, timeout: Duration) -> Self {
        self.default_timeout = timeout;
        self
    }

    /// Adds or replaces a transport-default header.
    pub fn set_header(&self, name: impl Into<String>, value: impl Into<String>) {
        self.headers.write().insert(name.into(), value.into());
    }

    /// Current transport-default headers.
    pub fn headers(&self) -> Headers {
        self.headers.read().clone()
    }

    /// Sets the bearer token. An empty token clears it.
    pub fn set_auth_token(&self, token: impl Into<String>) {
        let token = token.into();
        *self.auth_token.write() = (!token.is_empty()).then_some(token);
    }

    /// Clears the bearer token.
    pub fn clear_auth_token(&self) {
        *self.auth_token.write() = None;
    }

    /// The bearer token, if set.
    pub fn auth_token(&self) -> Option<String> {
        self.auth_token.read().clone()
    }

    /// Builds the request that a call with these arguments would dispatch.
    pub fn build_request(
        &self,
        method: Method,
        path: &str,
        mut options: RequestOptions,
    ) -> HostRequest {
        let per_call = options.headers.take().unwrap_or_default();
        let mut merged = {
            let defaults = self.headers.read();
            headers::merge([&*defaults, &per_call])
        };

        if let Some(token) = self.auth_token.read().as_deref() {
            headers::remove_ignore_case(&mut merged, AUTHORIZATION);
            merged.insert(AUTHORIZATION.to_string(), format!("Bearer {token}"));
        }

        let url = self.endpoint.http_endpoint(path);
        options.resolve(method, url, merged, self.default_timeout)
    }
}

#[async_trait]
impl RequestTransport for HttpTransport {
    async fn request(
        &self,
        method: Method,
        path: &str,
        options: RequestOptions,
    ) -> RequestResult<Response> {
        let request = self.build_request(method, path, options);
        let url = request.url.clone();
        debug!(method = %method, url = %url, "Dispatching request");

        let (responder, pending) = Responder::channel();
        self.capability.request(request, responder);

        match pending.outcome().await {
            Ok(response) => {
                let status = response.status_code;
                let result = classify_response(response);
                match &result {
                    Ok(_) => debug!(method = %method, url = %url, status, "Request completed"),
                    Err(err) => warn!(
                        method = %method,
                        url = %url,
                        status,
                        error = %err,
                        "Request rejected"
                    ),
                }
                result
            }
            Err(failure) => {
                let err = classify_failure(failure);
                warn!(method = %method, url = %url, error = %err, "Request failed");
                Err(err)
            }
        }
    }
}
