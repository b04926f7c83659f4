//! Layered configuration loading.
//!
//! Layers apply in order, later ones overriding earlier ones:
//!
//! 1. defaults (or a preset)
//! 2. a TOML or JSON file, or an inline string
//! 3. `PREFIX__SECTION__KEY` environment variables

use std::env;
use std::fs;
use std::path::Path;

use crate::{ConfigError, PrateConfig};

/// Loads a [`PrateConfig`] from layered sources.
///
/// # Example
///
/// ```no_run
/// use prate_config::ConfigLoader;
///
/// # fn main() -> Result<(), prate_config::ConfigError> {
/// let config = ConfigLoader::new()
///     .with_optional_file("prate.toml")?
///     .with_dotenv()?
///     .with_env_prefix("PRATE")
///     .load()?;
///
/// let app = config.app();
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct ConfigLoader {
    config: PrateConfig,
    env_prefix: Option<String>,
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigLoader {
    /// Creates a loader starting from the defaults.
    #[must_use]
    pub fn new() -> Self {
        Self {
            config: PrateConfig::default(),
            env_prefix: None,
        }
    }

    /// Starts from [`PrateConfig::development`].
    ///
    /// ```
    /// use prate_config::ConfigLoader;
    ///
    /// let config = ConfigLoader::new().with_development().load().unwrap();
    /// assert!(!config.logging.json_format);
    /// ```
    #[must_use]
    pub fn with_development(mut self) -> Self {
        self.config = PrateConfig::development();
        self
    }

    /// Starts from [`PrateConfig::production`].
    #[must_use]
    pub fn with_production(mut self) -> Self {
        self.config = PrateConfig::production();
        self
    }

    /// Loads a file, picking the format from its extension (`.toml` or
    /// `.json`).
    ///
    /// The file replaces the current configuration; sections it omits get
    /// their defaults.
    ///
    /// # Errors
    ///
    /// Fails if the file is missing, unreadable, malformed, has an unknown
    /// extension, or contains unknown fields.
    pub fn with_file<P: AsRef<Path>>(mut self, path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(ConfigError::file_not_found(path));
        }

        let content = fs::read_to_string(path).map_err(|e| ConfigError::read_error(path, e))?;
        let format = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default();

        self.config = parse(&content, format)?;
        tracing::debug!(path = %path.display(), "loaded configuration file");
        Ok(self)
    }

    /// Like [`with_file`](Self::with_file), but a missing file is skipped.
    ///
    /// # Errors
    ///
    /// Fails if the file exists but cannot be loaded.
    pub fn with_optional_file<P: AsRef<Path>>(self, path: P) -> Result<Self, ConfigError> {
        if path.as_ref().exists() {
            self.with_file(path)
        } else {
            Ok(self)
        }
    }

    /// Loads configuration from a string in `format` (`toml` or `json`).
    ///
    /// ```
    /// use prate_config::ConfigLoader;
    ///
    /// let config = ConfigLoader::new()
    ///     .with_string("[router]\nhandle_options = false\n", "toml")
    ///     .unwrap()
    ///     .load()
    ///     .unwrap();
    ///
    /// assert!(!config.router.handle_options);
    /// ```
    ///
    /// # Errors
    ///
    /// Fails if parsing fails or the format is unknown.
    pub fn with_string(mut self, content: &str, format: &str) -> Result<Self, ConfigError> {
        self.config = parse(content, format)?;
        Ok(self)
    }

    /// Enables environment overrides of the form `PREFIX__SECTION__KEY`,
    /// e.g. `PRATE__SERVER__HTTP_ADDR=0.0.0.0:9000`.
    #[must_use]
    pub fn with_env_prefix(mut self, prefix: &str) -> Self {
        self.env_prefix = Some(prefix.to_uppercase());
        self
    }

    /// Loads `.env` from the current directory or its parents, if present.
    ///
    /// # Errors
    ///
    /// Fails if a `.env` file exists but cannot be parsed.
    pub fn with_dotenv(self) -> Result<Self, ConfigError> {
        match dotenvy::dotenv() {
            Ok(path) => tracing::debug!(path = %path.display(), "loaded .env"),
            Err(err) if err.not_found() => {}
            Err(err) => return Err(err.into()),
        }
        Ok(self)
    }

    /// Applies environment overrides and validates.
    ///
    /// # Errors
    ///
    /// Fails if an override cannot be parsed or validation fails.
    pub fn load(self) -> Result<PrateConfig, ConfigError> {
        let config = self.load_unvalidated()?;
        config.validate()?;
        Ok(config)
    }

    /// Applies environment overrides without validating.
    ///
    /// # Errors
    ///
    /// Fails if an override cannot be parsed.
    pub fn load_unvalidated(mut self) -> Result<PrateConfig, ConfigError> {
        if let Some(prefix) = self.env_prefix.take() {
            self.apply_env_vars(&prefix, env::vars())?;
        }
        Ok(self.config)
    }

    fn apply_env_vars<I>(&mut self, prefix: &str, vars: I) -> Result<(), ConfigError>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let marker = format!("{prefix}__");
        for (key, value) in vars {
            if let Some(path) = key.strip_prefix(&marker) {
                self.apply_env_var(&key, path, &value)?;
            }
        }
        Ok(())
    }

    fn apply_env_var(&mut self, key: &str, path: &str, value: &str) -> Result<(), ConfigError> {
        let server = &mut self.config.server;
        let router = &mut self.config.router;
        let logging = &mut self.config.logging;

        let parts: Vec<&str> = path.split("__").collect();
        match parts.as_slice() {
            ["SERVER", "HTTP_ADDR"] => server.http_addr = value.to_string(),
            ["SERVER", "SHUTDOWN_TIMEOUT_SECS"] => server.shutdown_timeout_secs = parse_int(key, value)?,
            ["SERVER", "READ_TIMEOUT_MS"] => server.read_timeout_ms = parse_int(key, value)?,
            ["SERVER", "READ_HEADER_TIMEOUT_MS"] => server.read_header_timeout_ms = parse_int(key, value)?,
            ["SERVER", "WRITE_TIMEOUT_MS"] => server.write_timeout_ms = parse_int(key, value)?,
            ["SERVER", "KEEP_ALIVE"] => server.keep_alive = parse_flag(key, value)?,
            ["SERVER", "MAX_HEADER_BYTES"] => server.max_header_bytes = parse_int(key, value)?,
            ["SERVER", "MAX_CONNECTIONS"] => {
                server.max_connections = if value.is_empty() || value.eq_ignore_ascii_case("none") {
                    None
                } else {
                    Some(parse_int(key, value)?)
                };
            }

            ["ROUTER", "HANDLE_METHOD_NOT_ALLOWED"] => {
                router.handle_method_not_allowed = parse_flag(key, value)?;
            }
            ["ROUTER", "HANDLE_OPTIONS"] => router.handle_options = parse_flag(key, value)?,

            ["LOGGING", "ENABLED"] => logging.enabled = parse_flag(key, value)?,
            ["LOGGING", "LEVEL"] => logging.level = value.to_string(),
            ["LOGGING", "JSON_FORMAT"] => logging.json_format = parse_flag(key, value)?,
            ["LOGGING", "SPAN_EVENTS"] => logging.span_events = parse_flag(key, value)?,
            ["LOGGING", "FILE_LINE_INFO"] => logging.file_line_info = parse_flag(key, value)?,
            ["LOGGING", "THREAD_IDS"] => logging.thread_ids = parse_flag(key, value)?,
            ["LOGGING", "INCLUDE_TARGET"] => logging.include_target = parse_flag(key, value)?,

            _ => tracing::warn!(var = key, "ignoring unknown configuration variable"),
        }
        Ok(())
    }
}

fn parse(content: &str, format: &str) -> Result<PrateConfig, ConfigError> {
    match format.to_lowercase().as_str() {
        "toml" => Ok(toml::from_str(content)?),
        "json" => Ok(serde_json::from_str(content)?),
        other => Err(ConfigError::UnsupportedFormat(other.to_string())),
    }
}

fn parse_int<T: std::str::FromStr>(key: &str, value: &str) -> Result<T, ConfigError> {
    value
        .parse()
        .map_err(|_| ConfigError::env_parse_error(key, "expected non-negative integer"))
}

fn parse_flag(key: &str, value: &str) -> Result<bool, ConfigError> {
    parse_bool(value).ok_or_else(|| ConfigError::env_parse_error(key, "expected boolean"))
}

/// Parse a boolean from a string.
fn parse_bool(s: &str) -> Option<bool> {
    match s.to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}
