//! Server configuration types.
//!
//! # Example
//!
//! ```rust
//! use prate_server::ServerConfig;
//! use std::time::Duration;
//!
//! let config = ServerConfig::builder()
//!     .http_addr("127.0.0.1:8080")
//!     .read_timeout(Some(Duration::from_secs(5)))
//!     .write_timeout(Some(Duration::from_secs(10)))
//!     .build();
//!
//! assert_eq!(config.http_addr(), "127.0.0.1:8080");
//! ```

use std::net::SocketAddr;
use std::time::Duration;

/// Default bind address: every interface, port picked by the OS.
pub const DEFAULT_HTTP_ADDR: &str = "0.0.0.0:0";

/// Default shutdown timeout in seconds.
pub const DEFAULT_SHUTDOWN_TIMEOUT_SECS: u64 = 30;

/// Smallest read buffer hyper accepts.
pub const MIN_MAX_HEADER_BYTES: usize = 8192;

/// Server configuration.
///
/// Timeouts left at `None` are disabled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    http_addr: String,
    shutdown_timeout: Duration,
    read_timeout: Option<Duration>,
    read_header_timeout: Option<Duration>,
    write_timeout: Option<Duration>,
    keep_alive: bool,
    max_header_bytes: Option<usize>,
    max_connections: Option<usize>,
}

impl ServerConfig {
    /// Creates a new server configuration builder.
    #[must_use]
    pub fn builder() -> ServerConfigBuilder {
        ServerConfigBuilder::default()
    }

    /// Returns the HTTP bind address.
    #[must_use]
    pub fn http_addr(&self) -> &str {
        &self.http_addr
    }

    /// Parses the bind address.
    ///
    /// # Errors
    ///
    /// Returns an error if the address cannot be parsed.
    pub fn socket_addr(&self) -> Result<SocketAddr, std::net::AddrParseError> {
        self.http_addr.parse()
    }

    /// How long shutdown waits for open connections.
    #[must_use]
    pub fn shutdown_timeout(&self) -> Duration {
        self.shutdown_timeout
    }

    /// Limit on reading the request body.
    #[must_use]
    pub fn read_timeout(&self) -> Option<Duration> {
        self.read_timeout
    }

    /// Limit on reading the request head.
    #[must_use]
    pub fn read_header_timeout(&self) -> Option<Duration> {
        self.read_header_timeout
    }

    /// Limit on running the handler chain.
    #[must_use]
    pub fn write_timeout(&self) -> Option<Duration> {
        self.write_timeout
    }

    /// Whether connections are kept open between requests.
    #[must_use]
    pub fn keep_alive(&self) -> bool {
        self.keep_alive
    }

    /// Read buffer limit, which bounds the size of the request head.
    #[must_use]
    pub fn max_header_bytes(&self) -> Option<usize> {
        self.max_header_bytes
    }

    /// Maximum number of open connections, if limited.
    #[must_use]
    pub fn max_connections(&self) -> Option<usize> {
        self.max_connections
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}

/// Builder for [`ServerConfig`].
#[derive(Debug, Clone)]
pub struct ServerConfigBuilder {
    http_addr: String,
    shutdown_timeout: Duration,
    read_timeout: Option<Duration>,
    read_header_timeout: Option<Duration>,
    write_timeout: Option<Duration>,
    keep_alive: bool,
    max_header_bytes: Option<usize>,
    max_connections: Option<usize>,
}

impl ServerConfigBuilder {
    /// Creates a new builder with default values.
    #[must_use]
    pub fn new() -> Self {
        Self {
            http_addr: DEFAULT_HTTP_ADDR.to_string(),
            shutdown_timeout: Duration::from_secs(DEFAULT_SHUTDOWN_TIMEOUT_SECS),
            read_timeout: None,
            read_header_timeout: None,
            write_timeout: None,
            keep_alive: true,
            max_header_bytes: None,
            max_connections: None,
        }
    }

    /// Sets the HTTP bind address.
    ///
    /// An empty address keeps the default.
    #[must_use]
    pub fn http_addr(mut self, addr: impl Into<String>) -> Self {
        let addr = addr.into();
        if !addr.is_empty() {
            self.http_addr = addr;
        }
        self
    }

    /// Sets the graceful shutdown timeout.
    #[must_use]
    pub fn shutdown_timeout(mut self, timeout: Duration) -> Self {
        self.shutdown_timeout = timeout;
        self
    }

    /// Sets the request body read timeout. Zero disables it.
    #[must_use]
    pub fn read_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.read_timeout = non_zero(timeout);
        self
    }

    /// Sets the request head read timeout. Zero disables it.
    #[must_use]
    pub fn read_header_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.read_header_timeout = non_zero(timeout);
        self
    }

    /// Sets the handler timeout. Zero disables it.
    #[must_use]
    pub fn write_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.write_timeout = non_zero(timeout);
        self
    }

    /// Enables or disables HTTP/1.1 keep-alive.
    #[must_use]
    pub fn keep_alive(mut self, enabled: bool) -> Self {
        self.keep_alive = enabled;
        self
    }

    /// Sets the read buffer limit. Zero keeps hyper's default; values below
    /// [`MIN_MAX_HEADER_BYTES`] are raised to it.
    #[must_use]
    pub fn max_header_bytes(mut self, max: Option<usize>) -> Self {
        self.max_header_bytes = max
            .filter(|&n| n > 0)
            .map(|n| n.max(MIN_MAX_HEADER_BYTES));
        self
    }

    /// Sets the maximum number of open connections.
    ///
    /// `Some(0)` means no limit.
    #[must_use]
    pub fn max_connections(mut self, max: Option<usize>) -> Self {
        self.max_connections = max.filter(|&n| n > 0);
        self
    }

    /// Builds the [`ServerConfig`].
    #[must_use]
    pub fn build(self) -> ServerConfig {
        ServerConfig {
            http_addr: self.http_addr,
            shutdown_timeout: self.shutdown_timeout,
            read_timeout: self.read_timeout,
            read_header_timeout: self.read_header_timeout,
            write_timeout: self.write_timeout,
            keep_alive: self.keep_alive,
            max_header_bytes: self.max_header_bytes,
            max_connections: self.max_connections,
        }
    }
}

impl Default for ServerConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

fn non_zero(timeout: Option<Duration>) -> Option<Duration> {
    timeout.filter(|d| !d.is_zero())
}
