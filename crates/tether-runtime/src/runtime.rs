//! Transport wiring from configuration.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use tether_runtime::TransportRuntime;
//!
//! let runtime = TransportRuntime::builder()
//!     .config_file("config/tether.toml")
//!     .build()?;
//!
//! let http = runtime.http();
//! let socket = runtime.socket(TransportEvents::new().on_open(|_| println!("open")));
//! socket.connect(&runtime.ws_endpoint("room/abc"), runtime.connect_options());
//! ```

use std::sync::Arc;

use tracing::{debug, info};

use crate::config::{ConfigLoader, TetherConfig, validate_config};
use crate::error::RuntimeResult;
use crate::logging;
use tether_core::{
    ConnectOptions, ConnectRequest, HostFailure, HostRequest, RequestCapability, Responder,
    SocketCapability, SocketHandle, SocketListener, TransportError, TransportEvents,
    TransportResult,
};
use tether_transport::{HttpTransport, SocketTransport};

/// Configured transports sharing one set of host capabilities.
///
/// The request transport is shared, so a token set through [`http`](Self::http)
/// applies to every later call. Socket transports are created per connection
/// owner with [`socket`](Self::socket).
pub struct TransportRuntime {
    config: TetherConfig,
    socket_capability: Arc<dyn SocketCapability>,
    http: Arc<HttpTransport>,
}

impl TransportRuntime {
    /// Creates a runtime builder for custom configuration.
    pub fn builder() -> RuntimeBuilder {
        RuntimeBuilder::new()
    }

    /// Creates a runtime from configuration, using the host bindings enabled
    /// by cargo features.
    ///
    /// Also installs the global log subscriber described by `config.logging`.
    pub fn from_config(config: &TetherConfig) -> RuntimeResult<Self> {
        logging::init_from_config(&config.logging);
        let (socket, request) = default_capabilities()?;
        Self::with_capabilities(config, socket, request)
    }

    /// Creates a runtime from configuration and explicit host capabilities.
    pub fn with_capabilities(
        config: &TetherConfig,
        socket_capability: Arc<dyn SocketCapability>,
        request_capability: Arc<dyn RequestCapability>,
    ) -> RuntimeResult<Self> {
        validate_config(config)?;

        let settings = &config.http;
        let http = HttpTransport::new(request_capability, Arc::new(settings.endpoint.clone()))
            .with_headers(settings.headers.clone())
            .with_default_timeout(settings.timeout());
        if let Some(token) = &settings.auth_token {
            http.set_auth_token(token.as_str());
        }

        info!(
            hostname = %settings.endpoint.hostname,
            secure = settings.endpoint.secure,
            timeout_ms = settings.timeout_ms,
            "Transport runtime initialized"
        );

        Ok(Self {
            config: config.clone(),
            socket_capability,
            http: Arc::new(http),
        })
    }

    /// Returns a reference to the configuration.
    pub fn config(&self) -> &TetherConfig {
        &self.config
    }

    /// The shared request transport.
    pub fn http(&self) -> Arc<HttpTransport> {
        self.http.clone()
    }

    /// Creates a closed socket transport reporting to `events`.
    pub fn socket(&self, events: TransportEvents) -> SocketTransport {
        SocketTransport::new(self.socket_capability.clone(), events)
    }

    /// Connect options carrying the configured handshake headers.
    pub fn connect_options(&self) -> ConnectOptions {
        ConnectOptions {
            headers: self.config.socket.headers.clone(),
        }
    }

    /// Absolute WebSocket URL for `path` on the configured endpoint.
    pub fn ws_endpoint(&self, path: &str) -> String {
        self.config.http.endpoint.ws_endpoint(path)
    }
}

/// The host bindings compiled into this build.
#[allow(clippy::type_complexity)]
fn default_capabilities()
-> RuntimeResult<(Arc<dyn SocketCapability>, Arc<dyn RequestCapability>)> {
    #[cfg(feature = "ws-client")]
    let socket: Arc<dyn SocketCapability> = {
        debug!("Registered WebSocket capability");
        Arc::new(tether_transport::WsSocketCapability::new())
    };
    #[cfg(not(feature = "ws-client"))]
    let socket: Arc<dyn SocketCapability> = {
        debug!("ws-client disabled, socket connections will fail");
        Arc::new(UnavailableSocket)
    };

    #[cfg(feature = "http-client")]
    let request: Arc<dyn RequestCapability> = {
        debug!("Registered HTTP capability");
        Arc::new(tether_transport::ReqwestCapability::new()?)
    };
    #[cfg(not(feature = "http-client"))]
    let request: Arc<dyn RequestCapability> = {
        debug!("http-client disabled, requests will fail");
        Arc::new(UnavailableRequest)
    };

    Ok((socket, request))
}

/// Socket capability for builds without a socket binding.
#[cfg_attr(feature = "ws-client", allow(dead_code))]
struct UnavailableSocket;

impl SocketCapability for UnavailableSocket {
    fn open(
        &self,
        _request: ConnectRequest,
        _listener: Arc<dyn SocketListener>,
    ) -> TransportResult<Box<dyn SocketHandle>> {
        Err(TransportError::NotAvailable {
            transport: "ws-client",
        })
    }
}

/// Request capability for builds without a request binding.
#[cfg_attr(feature = "http-client", allow(dead_code))]
struct UnavailableRequest;

impl RequestCapability for UnavailableRequest {
    fn request(&self, _request: HostRequest, responder: Responder) {
        responder.fail(HostFailure::new(
            "request:fail no request capability available",
        ));
    }
}

// =============================================================================
// RuntimeBuilder
// =============================================================================

/// Builder for creating a [`TransportRuntime`] from loaded configuration.
pub struct RuntimeBuilder {
    config_loader: ConfigLoader,
    socket_capability: Option<Arc<dyn SocketCapability>>,
    request_capability: Option<Arc<dyn RequestCapability>>,
}

impl RuntimeBuilder {
    /// Creates a new runtime builder.
    pub fn new() -> Self {
        Self {
            config_loader: ConfigLoader::new(),
            socket_capability: None,
            request_capability: None,
        }
    }

    /// Sets a specific configuration file to load.
    pub fn config_file<P: AsRef<std::path::Path>>(mut self, path: P) -> Self {
        self.config_loader = self.config_loader.file(path);
        self
    }

    /// Sets the configuration profile (e.g., "development", "production").
    pub fn profile(mut self, profile: impl AsRef<str>) -> Self {
        self.config_loader = self.config_loader.profile(profile);
        self
    }

    /// Adds a search path for configuration files.
    pub fn search_path<P: AsRef<std::path::Path>>(mut self, path: P) -> Self {
        self.config_loader = self.config_loader.search_path(path);
        self
    }

    /// Disables loading environment variables.
    pub fn without_env(mut self) -> Self {
        self.config_loader = self.config_loader.without_env();
        self
    }

    /// Merges configuration programmatically.
    pub fn merge(mut self, config: TetherConfig) -> Self {
        self.config_loader = self.config_loader.merge(config);
        self
    }

    /// Uses `capability` instead of the compiled-in socket binding.
    pub fn socket_capability(mut self, capability: Arc<dyn SocketCapability>) -> Self {
        self.socket_capability = Some(capability);
        self
    }

    /// Uses `capability` instead of the compiled-in request binding.
    pub fn request_capability(mut self, capability: Arc<dyn RequestCapability>) -> Self {
        self.request_capability = Some(capability);
        self
    }

    /// Loads the configuration and builds the runtime.
    pub fn build(self) -> RuntimeResult<TransportRuntime> {
        let config = self.config_loader.load()?;
        logging::init_from_config(&config.logging);

        let (socket, request) = match (self.socket_capability, self.request_capability) {
            (Some(socket), Some(request)) => (socket, request),
            (socket, request) => {
                let (default_socket, default_request) = default_capabilities()?;
                (
                    socket.unwrap_or(default_socket),
                    request.unwrap_or(default_request),
                )
            }
        };

        TransportRuntime::with_capabilities(&config, socket, request)
    }
}

impl Default for RuntimeBuilder {
    fn default() -> Self {
        Self::new()
    }
}
