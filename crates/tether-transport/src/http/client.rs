//! HTTP request capability implementation.

use reqwest::header::{HeaderMap, SET_COOKIE};
use reqwest::{Client, ClientBuilder};
use serde_json::Value;
use tracing::{debug, trace};

use tether_core::{
    Headers, HostFailure, HostRequest, HostResponse, Method, RequestCapability,
    Responder, ResponseBody, ResponseType, TransportError, TransportResult,
};

/// Request capability backed by `reqwest`.
///
/// Requests run on spawned tokio tasks, so [`request`](RequestCapability::request)
/// must be called from within a tokio runtime.
#[derive(Debug, Clone)]
pub struct ReqwestCapability {
    client: Client,
    /// Used for requests with `ssl_verify` turned off.
    insecure_client: Client,
}

impl ReqwestCapability {
    /// Creates a new request capability.
    pub fn new() -> TransportResult<Self> {
        let client = ClientBuilder::new()
            .build()
            .map_err(|e| TransportError::Io(format!("failed to create HTTP client: {e}")))?;
        let insecure_client = ClientBuilder::new()
            .danger_accept_invalid_certs(true)
            .build()
            .map_err(|e| TransportError::Io(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            insecure_client,
        })
    }

    /// Creates a capability from existing clients.
    pub fn with_clients(client: Client, insecure_client: Client) -> Self {
        Self {
            client,
            insecure_client,
        }
    }
}

impl RequestCapability for ReqwestCapability {
    fn request(&self, request: HostRequest, responder: Responder) {
        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            responder.fail(HostFailure::new("request:fail no async runtime available"));
            return;
        };

        let client = if request.ssl_verify {
            self.client.clone()
        } else {
            self.insecure_client.clone()
        };

        runtime.spawn(async move {
            match execute(&client, request).await {
                Ok(response) => responder.success(response),
                Err(failure) => responder.fail(failure),
            }
        });
    }
}

async fn execute(client: &Client, request: HostRequest) -> Result<HostResponse, HostFailure> {
    let method = match request.method {
        Method::Get => reqwest::Method::GET,
        Method::Post => reqwest::Method::POST,
        Method::Put => reqwest::Method::PUT,
        Method::Delete => reqwest::Method::DELETE,
    };
    debug!(method = %request.method, url = %request.url, "Sending HTTP request");

    let mut builder = client
        .request(method, &request.url)
        .timeout(request.timeout);
    for (name, value) in &request.headers {
        builder = builder.header(name.as_str(), value.as_str());
    }

    builder = match (request.method, request.data) {
        (_, None) => builder,
        (Method::Get, Some(Value::Object(map))) => builder.query(&query_pairs(&map)),
        (_, Some(Value::String(text))) => builder.body(text),
        (_, Some(value)) => builder.json(&value),
    };

    let response = builder.send().await.map_err(failure)?;

    let status_code = response.status().as_u16();
    let (headers, cookies) = collect_headers(response.headers());

    let data = match request.response_type {
        ResponseType::ArrayBuffer => {
            ResponseBody::Binary(response.bytes().await.map_err(failure)?.to_vec())
        }
        ResponseType::Text => {
            let text = response.text().await.map_err(failure)?;
            ResponseBody::decode_text(text, request.data_type)
        }
    };
    trace!(status = status_code, "Received HTTP response");

    Ok(HostResponse {
        data,
        status_code,
        headers,
        cookies: (!cookies.is_empty()).then_some(cookies),
        err_msg: None,
    })
}

/// Flattens a JSON object into query string pairs.
fn query_pairs(map: &serde_json::Map<String, Value>) -> Vec<(String, String)> {
    map.iter()
        .map(|(key, value)| {
            let value = match value {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            (key.clone(), value)
        })
        .collect()
}

/// Splits response headers into a flat map and the list of `Set-Cookie` values.
fn collect_headers(map: &HeaderMap) -> (Headers, Vec<String>) {
    let mut headers = Headers::new();
    let mut cookies = Vec::new();
    for (name, value) in map {
        let Ok(value) = value.to_str() else {
            continue;
        };
        if name == SET_COOKIE {
            cookies.push(value.to_string());
        }
        headers
            .entry(name.as_str().to_string())
            .and_modify(|existing| {
                existing.push_str(", ");
                existing.push_str(value);
            })
            .or_insert_with(|| value.to_string());
    }
    (headers, cookies)
}

fn failure(err: reqwest::Error) -> HostFailure {
    if err.is_timeout() {
        HostFailure::new("request:fail timeout")
    } else {
        HostFailure::new(format!("request:fail {err}"))
    }
}
