//! Configuration sections.

use std::time::Duration;

use prate_server::{ServerConfig, DEFAULT_HTTP_ADDR, DEFAULT_SHUTDOWN_TIMEOUT_SECS};
use serde::{Deserialize, Serialize};

/// `[server]`: listener, timeouts and connection limits.
///
/// Timeouts of zero are disabled.
///
/// # Example
///
/// ```
/// use prate_config::ServerSection;
///
/// let section: ServerSection = toml::from_str(r#"
///     http_addr = "127.0.0.1:8080"
///     write_timeout_ms = 5000
/// "#).unwrap();
///
/// let config = section.to_server_config();
/// assert_eq!(config.http_addr(), "127.0.0.1:8080");
/// assert!(config.read_timeout().is_none());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct ServerSection {
    /// Bind address, e.g. `0.0.0.0:8080`.
    #[serde(default = "default_http_addr")]
    pub http_addr: String,

    /// How long shutdown waits for open connections, in seconds.
    #[serde(default = "default_shutdown_timeout")]
    pub shutdown_timeout_secs: u64,

    /// Request body read timeout in milliseconds.
    #[serde(default)]
    pub read_timeout_ms: u64,

    /// Request head read timeout in milliseconds.
    #[serde(default)]
    pub read_header_timeout_ms: u64,

    /// Handler timeout in milliseconds.
    #[serde(default)]
    pub write_timeout_ms: u64,

    /// HTTP/1.1 keep-alive.
    #[serde(default = "default_true")]
    pub keep_alive: bool,

    /// Read buffer limit in bytes. Zero keeps hyper's default.
    #[serde(default)]
    pub max_header_bytes: usize,

    /// Maximum number of open connections. Unset means unlimited.
    #[serde(default)]
    pub max_connections: Option<usize>,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            http_addr: default_http_addr(),
            shutdown_timeout_secs: default_shutdown_timeout(),
            read_timeout_ms: 0,
            read_header_timeout_ms: 0,
            write_timeout_ms: 0,
            keep_alive: true,
            max_header_bytes: 0,
            max_connections: None,
        }
    }
}

impl ServerSection {
    /// Converts to the server's runtime configuration.
    #[must_use]
    pub fn to_server_config(&self) -> ServerConfig {
        ServerConfig::builder()
            .http_addr(self.http_addr.clone())
            .shutdown_timeout(Duration::from_secs(self.shutdown_timeout_secs))
            .read_timeout(Some(Duration::from_millis(self.read_timeout_ms)))
            .read_header_timeout(Some(Duration::from_millis(self.read_header_timeout_ms)))
            .write_timeout(Some(Duration::from_millis(self.write_timeout_ms)))
            .keep_alive(self.keep_alive)
            .max_header_bytes(Some(self.max_header_bytes))
            .max_connections(self.max_connections)
            .build()
    }
}

fn default_http_addr() -> String {
    DEFAULT_HTTP_ADDR.to_string()
}

fn default_shutdown_timeout() -> u64 {
    DEFAULT_SHUTDOWN_TIMEOUT_SECS
}

fn default_true() -> bool {
    true
}

/// `[router]`: answers for requests no endpoint matches.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct RouterSection {
    /// Answer a known path with an unregistered method with 405.
    #[serde(default = "default_true")]
    pub handle_method_not_allowed: bool,

    /// Answer `OPTIONS` for known paths automatically.
    #[serde(default = "default_true")]
    pub handle_options: bool,
}

impl Default for RouterSection {
    fn default() -> Self {
        Self {
            handle_method_not_allowed: true,
            handle_options: true,
        }
    }
}
