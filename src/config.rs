use std::time::Duration;

use anyhow::{anyhow, Result};

pub const DEFAULT_PORT: u16 = 3000;

/// Runtime settings for the HTTP server and its outbound fetches.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub port: u16,
    /// Applies to the outbound document fetch only.
    pub fetch_timeout: Duration,
    pub max_redirects: usize,
    /// How long a PDF request waits for the engine before answering 503.
    pub engine_wait: Duration,
    pub user_agent: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            fetch_timeout: Duration::from_secs(30),
            max_redirects: 5,
            engine_wait: Duration::from_secs(5),
            user_agent: format!("{}/{}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION")),
        }
    }
}

impl ServerConfig {
    pub fn with_port(port: u16) -> Self {
        Self {
            port,
            ..Self::default()
        }
    }
}

/// Resolves the listening port from an optional raw value (CLI flag or `PORT`).
pub fn parse_port(raw: Option<&str>) -> Result<u16> {
    match raw.map(str::trim) {
        None | Some("") => Ok(DEFAULT_PORT),
        Some(value) => value
            .parse::<u16>()
            .map_err(|e| anyhow!("invalid port '{}': {}", value, e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn port_defaults_to_3000() {
        assert_eq!(parse_port(None).unwrap(), 3000);
        assert_eq!(parse_port(Some("  ")).unwrap(), 3000);
    }

    #[test]
    fn port_parses_explicit_value() {
        assert_eq!(parse_port(Some("8080")).unwrap(), 8080);
    }

    #[test]
    fn port_rejects_garbage() {
        let err = parse_port(Some("eighty")).unwrap_err();
        assert!(err.to_string().contains("invalid port 'eighty'"));
        assert!(parse_port(Some("70000")).is_err());
    }

    #[test]
    fn defaults_match_fetch_contract() {
        let config = ServerConfig::default();
        assert_eq!(config.fetch_timeout, Duration::from_secs(30));
        assert_eq!(config.max_redirects, 5);
        assert_eq!(config.engine_wait, Duration::from_secs(5));
    }
}
