//! Configuration validation utilities.

use super::error::{ConfigError, ConfigResult};
use super::schema::{HttpSettings, LogOutput, LoggingConfig, SocketSettings, TetherConfig};
use tether_core::Headers;

/// Validates the entire configuration.
pub fn validate_config(config: &TetherConfig) -> ConfigResult<()> {
    validate_logging_config(&config.logging)?;
    validate_http_settings(&config.http)?;
    validate_socket_settings(&config.socket)?;
    Ok(())
}

/// Validates logging settings.
fn validate_logging_config(logging: &LoggingConfig) -> ConfigResult<()> {
    if logging.output == LogOutput::File && logging.file_path.is_none() {
        return Err(ConfigError::missing_field("logging.file_path"));
    }

    if let Some(target) = logging.filters.keys().find(|target| target.trim().is_empty()) {
        return Err(ConfigError::validation(format!(
            "Log filter target cannot be empty: {target:?}"
        )));
    }

    Ok(())
}

/// Validates request transport settings.
fn validate_http_settings(http: &HttpSettings) -> ConfigResult<()> {
    let hostname = &http.endpoint.hostname;
    if hostname.is_empty() {
        return Err(ConfigError::missing_field("http.endpoint.hostname"));
    }

    if hostname.contains("://") || hostname.contains('/') || hostname.contains(' ') {
        return Err(ConfigError::validation(format!(
            "Hostname must not contain a scheme, path or spaces: {hostname}"
        )));
    }

    if http.endpoint.port == Some(0) {
        return Err(ConfigError::InvalidPort(0));
    }

    if http.timeout_ms == 0 {
        return Err(ConfigError::validation("Timeout must be greater than 0"));
    }

    validate_headers(&http.headers, "http.headers")
}

/// Validates message transport settings.
fn validate_socket_settings(socket: &SocketSettings) -> ConfigResult<()> {
    validate_headers(&socket.headers, "socket.headers")
}

fn validate_headers(headers: &Headers, section: &str) -> ConfigResult<()> {
    for name in headers.keys() {
        if name.is_empty() || name.chars().any(|c| c.is_whitespace() || c == ':') {
            return Err(ConfigError::validation(format!(
                "Invalid header name in {section}: {name:?}"
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_default_config() {
        assert!(validate_config(&TetherConfig::default()).is_ok());
    }

    #[test]
    fn test_validate_hostname() {
        let mut config = TetherConfig::default();
        config.http.endpoint.hostname = String::new();
        assert!(matches!(
            validate_config(&config),
            Err(ConfigError::MissingField { .. })
        ));

        config.http.endpoint.hostname = "https://game.example.com".into();
        assert!(matches!(
            validate_config(&config),
            Err(ConfigError::ValidationError { .. })
        ));
    }

    #[test]
    fn test_validate_port_and_timeout() {
        let mut config = TetherConfig::default();
        config.http.endpoint.port = Some(0);
        assert!(matches!(validate_config(&config), Err(ConfigError::InvalidPort(0))));

        let mut config = TetherConfig::default();
        config.http.timeout_ms = 0;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validate_file_output_needs_path() {
        let mut config = TetherConfig::default();
        config.logging.output = LogOutput::File;
        assert!(validate_config(&config).is_err());

        config.logging.file_path = Some("logs/tether.log".into());
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_validate_header_names() {
        let mut config = TetherConfig::default();
        config.socket.headers.insert("Bad Header".into(), "x".into());
        assert!(validate_config(&config).is_err());
    }
}
