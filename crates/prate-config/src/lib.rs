//! Typed configuration for prate services.
//!
//! [`PrateConfig`] has three sections, each with defaults and strict field
//! checking:
//!
//! - [`ServerSection`]: bind address, timeouts, connection limits
//! - [`RouterSection`]: 405 and automatic `OPTIONS` handling
//! - `logging`: a [`prate_telemetry::LogConfig`]
//!
//! [`ConfigLoader`] layers defaults, a TOML or JSON file, and environment
//! variables, then validates. The result converts into an [`App`](prate_server::App)
//! and a `LogConfig`.
//!
//! # Configuration File Format
//!
//! ```toml
//! [server]
//! http_addr = "0.0.0.0:8080"
//! shutdown_timeout_secs = 30
//! read_timeout_ms = 5000
//! write_timeout_ms = 10000
//! keep_alive = true
//! max_connections = 10000
//!
//! [router]
//! handle_method_not_allowed = true
//! handle_options = true
//!
//! [logging]
//! level = "info"
//! json_format = true
//! ```
//!
//! # Environment Variable Overrides
//!
//! Values can be overridden with `PREFIX__SECTION__KEY` variables:
//!
//! - `PRATE__SERVER__HTTP_ADDR=0.0.0.0:9000`
//! - `PRATE__ROUTER__HANDLE_OPTIONS=false`
//! - `PRATE__LOGGING__LEVEL=debug`

#![doc(html_root_url = "https://docs.rs/prate-config/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod config;
mod error;
mod loader;
mod schema;

pub use config::{PrateConfig, PrateConfigBuilder};
pub use error::ConfigError;
pub use loader::ConfigLoader;
pub use schema::{RouterSection, ServerSection};
