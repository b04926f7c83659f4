//! The root configuration type.

use prate_server::App;
use prate_telemetry::LogConfig;
use serde::{Deserialize, Serialize};

use crate::{ConfigError, RouterSection, ServerSection};

/// Complete prate service configuration.
///
/// Use [`ConfigLoader`](crate::ConfigLoader) to load it from files and
/// environment variables.
///
/// # Example
///
/// ```
/// use prate_config::PrateConfig;
///
/// let config = PrateConfig::default();
/// assert_eq!(config.server.http_addr, "0.0.0.0:0");
/// assert!(config.router.handle_options);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(deny_unknown_fields)]
pub struct PrateConfig {
    /// Listener settings.
    #[serde(default)]
    pub server: ServerSection,

    /// Fallback behaviour for unmatched requests.
    #[serde(default)]
    pub router: RouterSection,

    /// Logging settings.
    #[serde(default)]
    pub logging: LogConfig,
}

impl PrateConfig {
    /// Creates a configuration builder.
    #[must_use]
    pub fn builder() -> PrateConfigBuilder {
        PrateConfigBuilder::new()
    }

    /// Checks the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] if the bind address is not a
    /// socket address or the log level is not a valid filter.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self
            .server
            .http_addr
            .parse::<std::net::SocketAddr>()
            .is_err()
        {
            return Err(ConfigError::invalid_value(
                "server.http_addr",
                format!("invalid socket address: {}", self.server.http_addr),
            ));
        }

        if self.server.shutdown_timeout_secs == 0 {
            return Err(ConfigError::invalid_value(
                "server.shutdown_timeout_secs",
                "must be greater than zero",
            ));
        }

        self.logging
            .validate()
            .map_err(|e| ConfigError::invalid_value("logging.level", e.to_string()))
    }

    /// Debug logging with pretty output.
    ///
    /// ```
    /// use prate_config::PrateConfig;
    ///
    /// assert_eq!(PrateConfig::development().logging.level, "debug");
    /// ```
    #[must_use]
    pub fn development() -> Self {
        Self {
            logging: LogConfig::development(),
            ..Self::default()
        }
    }

    /// Info logging as JSON.
    #[must_use]
    pub fn production() -> Self {
        Self {
            logging: LogConfig::production(),
            ..Self::default()
        }
    }

    /// An [`App`] with this configuration's server and router settings.
    ///
    /// ```
    /// use prate_config::{PrateConfig, RouterSection};
    ///
    /// let config = PrateConfig::builder()
    ///     .router(RouterSection { handle_options: false, ..Default::default() })
    ///     .build();
    /// let app = config.app();
    /// assert_eq!(app.queued(), 0);
    /// ```
    #[must_use]
    pub fn app(&self) -> App {
        let mut app = App::new(self.server.to_server_config());
        app.handle_method_not_allowed(self.router.handle_method_not_allowed);
        app.handle_options(self.router.handle_options);
        app
    }
}

/// Builder for [`PrateConfig`].
#[derive(Debug, Default)]
pub struct PrateConfigBuilder {
    server: Option<ServerSection>,
    router: Option<RouterSection>,
    logging: Option<LogConfig>,
}

impl PrateConfigBuilder {
    /// Creates a builder with every section unset.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the server section.
    #[must_use]
    pub fn server(mut self, server: ServerSection) -> Self {
        self.server = Some(server);
        self
    }

    /// Sets the router section.
    #[must_use]
    pub fn router(mut self, router: RouterSection) -> Self {
        self.router = Some(router);
        self
    }

    /// Sets the logging section.
    #[must_use]
    pub fn logging(mut self, logging: LogConfig) -> Self {
        self.logging = Some(logging);
        self
    }

    /// Builds the configuration. Unset sections get their defaults.
    #[must_use]
    pub fn build(self) -> PrateConfig {
        PrateConfig {
            server: self.server.unwrap_or_default(),
            router: self.router.unwrap_or_default(),
            logging: self.logging.unwrap_or_default(),
        }
    }
}
