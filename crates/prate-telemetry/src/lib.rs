//! Logging setup for prate services.
//!
//! prate logs through [`tracing`]. This crate installs the subscriber and
//! fixes the conventions request events follow:
//!
//! - [`init_logging`] with a [`LogConfig`] (JSON for production, pretty
//!   output for development)
//! - standard field names in [`logging::fields`]
//! - [`log_request_start!`], [`log_request_complete!`] and
//!   [`log_request_error!`] for request lifecycle events
//!
//! # Example
//!
//! ```rust,ignore
//! use prate_telemetry::{init_logging, LogConfig};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     init_logging(&LogConfig::production())?;
//!     tracing::info!("starting");
//!     Ok(())
//! }
//! ```

#![doc(html_root_url = "https://docs.rs/prate-telemetry/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod error;
pub mod logging;

pub use error::TelemetryError;
pub use logging::{create_env_filter, init_logging, LogConfig};

/// Result type for telemetry operations.
pub type TelemetryResult<T> = Result<T, TelemetryError>;

#[doc(hidden)]
pub mod __private {
    pub use tracing;
}
