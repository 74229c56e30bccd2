//! Request options and their defaults.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::headers::Headers;

/// Timeout applied when a call does not specify one.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(60_000);

/// HTTP method of a request transport call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

impl Method {
    /// Upper-case method name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How the host should interpret a textual response body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataType {
    /// Decode as JSON, falling back to text if decoding fails.
    #[default]
    Json,
    /// Keep the body as text.
    Text,
}

/// How the host should read the response body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseType {
    /// Read as text, then apply [`DataType`].
    #[default]
    Text,
    /// Read raw bytes.
    #[serde(rename = "arraybuffer")]
    ArrayBuffer,
}

/// Caller-supplied options for one call. Every field is optional.
///
/// ```rust
/// use std::time::Duration;
/// use tether_core::RequestOptions;
///
/// let options = RequestOptions::new()
///     .json(serde_json::json!({ "token": "abc" }))
///     .header("X-Trace", "1")
///     .timeout(Duration::from_secs(5));
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequestOptions {
    /// Request body.
    pub data: Option<Value>,
    /// Per-call headers, merged over the transport defaults.
    pub headers: Option<Headers>,
    /// Timeout; defaults to 60s.
    pub timeout: Option<Duration>,
    /// Defaults to [`DataType::Json`].
    pub data_type: Option<DataType>,
    /// Defaults to [`ResponseType::Text`].
    pub response_type: Option<ResponseType>,
    /// Defaults to `true`.
    pub ssl_verify: Option<bool>,
    /// Defaults to `true`.
    pub with_credentials: Option<bool>,
}

impl RequestOptions {
    /// Creates empty options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the request body.
    pub fn json(mut self, data: Value) -> Self {
        self.data = Some(data);
        self
    }

    /// Adds a per-call header.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers
            .get_or_insert_with(Headers::new)
            .insert(name.into(), value.into());
        self
    }

    /// Sets the timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Sets the data type.
    pub fn data_type(mut self, data_type: DataType) -> Self {
        self.data_type = Some(data_type);
        self
    }

    /// Sets the response type.
    pub fn response_type(mut self, response_type: ResponseType) -> Self {
        self.response_type = Some(response_type);
        self
    }

    /// Enables or disables TLS certificate verification.
    pub fn ssl_verify(mut self, verify: bool) -> Self {
        self.ssl_verify = Some(verify);
        self
    }

    /// Enables or disables sending credentials.
    pub fn with_credentials(mut self, enabled: bool) -> Self {
        self.with_credentials = Some(enabled);
        self
    }

    /// Fills every omitted field with its default.
    ///
    /// `headers` must already be the fully merged header set.
    pub fn resolve(
        self,
        method: Method,
        url: String,
        headers: Headers,
        default_timeout: Duration,
    ) -> HostRequest {
        HostRequest {
            url,
            method,
            headers,
            data: self.data,
            timeout: self.timeout.unwrap_or(default_timeout),
            data_type: self.data_type.unwrap_or_default(),
            response_type: self.response_type.unwrap_or_default(),
            ssl_verify: self.ssl_verify.unwrap_or(true),
            with_credentials: self.with_credentials.unwrap_or(true),
        }
    }
}

/// A fully resolved request, as dispatched to the host request primitive.
#[derive(Debug, Clone, PartialEq)]
pub struct HostRequest {
    /// Absolute URL.
    pub url: String,
    /// HTTP method.
    pub method: Method,
    /// Merged headers.
    pub headers: Headers,
    /// Request body, if any.
    pub data: Option<Value>,
    /// Request timeout.
    pub timeout: Duration,
    /// Body interpretation.
    pub data_type: DataType,
    /// Body reading mode.
    pub response_type: ResponseType,
    /// Verify TLS certificates.
    pub ssl_verify: bool,
    /// Send credentials (cookies) with the request.
    pub with_credentials: bool,
}
