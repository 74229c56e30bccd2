//! Endpoint resolution.
//!
//! The request transport only knows paths. Turning a path into an absolute URL
//! is delegated to an [`EndpointResolver`], normally the owning client's
//! configuration.

use serde::{Deserialize, Serialize};

/// Resolves request paths into absolute URLs.
pub trait EndpointResolver: Send + Sync {
    /// Absolute HTTP(S) URL for `path`.
    fn http_endpoint(&self, path: &str) -> String;
}

impl<F> EndpointResolver for F
where
    F: Fn(&str) -> String + Send + Sync,
{
    fn http_endpoint(&self, path: &str) -> String {
        self(path)
    }
}

/// A server address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Endpoint {
    /// Use `https`/`wss`.
    #[serde(default)]
    pub secure: bool,
    /// Host name or address.
    pub hostname: String,
    /// Port; omitted from URLs when `None`.
    #[serde(default)]
    pub port: Option<u16>,
    /// Base path prefix.
    #[serde(default)]
    pub pathname: String,
}

impl Default for Endpoint {
    fn default() -> Self {
        Self {
            secure: false,
            hostname: "localhost".to_string(),
            port: Some(2567),
            pathname: String::new(),
        }
    }
}

impl Endpoint {
    /// Creates an endpoint for `hostname` with no explicit port.
    pub fn new(hostname: impl Into<String>) -> Self {
        Self {
            hostname: hostname.into(),
            port: None,
            ..Default::default()
        }
    }

    /// Sets the port.
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    /// Enables TLS schemes.
    pub fn secure(mut self, secure: bool) -> Self {
        self.secure = secure;
        self
    }

    /// Sets the base path.
    pub fn with_pathname(mut self, pathname: impl Into<String>) -> Self {
        self.pathname = pathname.into();
        self
    }

    /// Absolute WebSocket URL for `path`.
    pub fn ws_endpoint(&self, path: &str) -> String {
        let scheme = if self.secure { "wss" } else { "ws" };
        self.build(scheme, path)
    }

    fn build(&self, scheme: &str, path: &str) -> String {
        let mut url = format!("{scheme}://{}", self.hostname);
        if let Some(port) = self.port {
            url.push_str(&format!(":{port}"));
        }
        for segment in [self.pathname.as_str(), path] {
            let segment = segment.trim_matches('/');
            if !segment.is_empty() {
                url.push('/');
                url.push_str(segment);
            }
        }
        url
    }
}

impl EndpointResolver for Endpoint {
    fn http_endpoint(&self, path: &str) -> String {
        let scheme = if self.secure { "https" } else { "http" };
        self.build(scheme, path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_endpoint() {
        let endpoint = Endpoint::default();
        assert_eq!(
            endpoint.http_endpoint("matchmake/joinOrCreate/lobby"),
            "http://localhost:2567/matchmake/joinOrCreate/lobby"
        );

        let endpoint = Endpoint::new("game.example.com")
            .secure(true)
            .with_pathname("/api/");
        assert_eq!(
            endpoint.http_endpoint("/auth/userdata"),
            "https://game.example.com/api/auth/userdata"
        );
        assert_eq!(endpoint.http_endpoint(""), "https://game.example.com/api");
    }

    #[test]
    fn test_ws_endpoint() {
        let endpoint = Endpoint::new("10.0.0.2").with_port(8080);
        assert_eq!(endpoint.ws_endpoint("room/abc"), "ws://10.0.0.2:8080/room/abc");
        assert_eq!(
            endpoint.secure(true).ws_endpoint("room/abc"),
            "wss://10.0.0.2:8080/room/abc"
        );
    }

    #[test]
    fn test_closure_resolver() {
        let resolver = |path: &str| format!("http://stub/{path}");
        assert_eq!(resolver.http_endpoint("x"), "http://stub/x");
    }
}
