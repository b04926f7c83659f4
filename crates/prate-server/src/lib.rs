//! # Prate Server
//!
//! Application binding, request dispatch and HTTP serving.
//!
//! - [`App`] - collects middlewares and endpoints, then binds them
//! - [`EndpointConfig`] - declarative endpoint description
//! - [`Server`] - the immutable dispatch table, served over hyper
//! - [`ServerConfig`] - listener address and timeouts
//! - [`Shutdown`] - graceful shutdown trigger
//!
//! ## Example
//!
//! ```rust,no_run
//! use prate_core::{handler_fn, reply_empty};
//! use prate_server::{App, EndpointConfig, ServerConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut app = App::new(ServerConfig::builder().http_addr("0.0.0.0:8080").build());
//!     app.get(EndpointConfig::new(
//!         "/ping",
//!         handler_fn(|_rc, _rd| Box::pin(async { reply_empty() })),
//!     ));
//!     app.start().await?;
//!     Ok(())
//! }
//! ```

#![doc(html_root_url = "https://docs.rs/prate-server/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod app;
mod config;
mod dispatch;
mod endpoint;
mod error;
mod fallback;
mod server;
pub mod shutdown;

pub use app::App;
pub use config::{
    ServerConfig, ServerConfigBuilder, DEFAULT_HTTP_ADDR, DEFAULT_SHUTDOWN_TIMEOUT_SECS,
    MIN_MAX_HEADER_BYTES,
};
pub use endpoint::{Endpoint, EndpointConfig, PayloadPrototype};
pub use error::{AppError, ServerError};
pub use fallback::{PanicHandler, PanicInfo, RawHandler};
pub use server::{HttpResponse, Server};
pub use shutdown::{ConnectionTracker, Shutdown};
