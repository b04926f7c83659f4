//! # prate
//!
//! **Protobuf request dispatch over HTTP.**
//!
//! prate binds protobuf endpoints to HTTP routes and runs every request
//! through the same pipeline:
//!
//! - named middlewares, applied in order and excludable per endpoint
//! - deferred registration: endpoints see every middleware, whenever it was
//!   applied
//! - request payloads decoded into pooled messages
//! - pooled per-request context and data
//! - handler replies encoded as `application/vnd.google.protobuf`
//! - errors mapped to status codes and plain-text bodies
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use prate::prelude::*;
//!
//! #[derive(Clone, PartialEq, prost::Message)]
//! struct Greeting {
//!     #[prost(string, tag = "1")]
//!     name: String,
//! }
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ConfigLoader::new().with_env_prefix("PRATE").load()?;
//!     init_logging(&config.logging)?;
//!
//!     let mut app = config.app();
//!     app.apply([builtin::request_id(), builtin::access_log()])?;
//!     app.get(EndpointConfig::new(
//!         "/hello/:name",
//!         handler_fn(|_rc, rd| {
//!             let name = rd.param("name").unwrap_or_default().to_string();
//!             Box::pin(async move { reply(Greeting { name }) })
//!         }),
//!     ));
//!
//!     app.start().await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Request flow
//!
//! ```text
//! Request → Router → payload decode → middlewares (first applied runs first) → handler
//!                         │ 400                                                 ↓
//! Response ←──────────────┴────────────── reply encode / error mapping ←────────┘
//! ```

#![doc(html_root_url = "https://docs.rs/prate/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

// Request state, handlers, codec, errors
pub use prate_core as core;

// Application binding and serving
pub use prate_server as server;

// Middleware chain and built-in middlewares
pub use prate_middleware as middleware;

// Path routing
pub use prate_router as router;

// Logging setup
pub use prate_telemetry as telemetry;

// File and environment configuration
pub use prate_config as config;

/// Prelude module for convenient imports.
///
/// ```rust,ignore
/// use prate::prelude::*;
/// ```
pub mod prelude {
    pub use prate_core::{
        handler_fn, reply, reply_empty, BoxedHandler, ContentType, Error, Handler, HandlerResult,
        Pagination, Payload, RequestCtx, RequestData, ResponseWriter,
    };

    pub use prate_server::{App, AppError, EndpointConfig, ServerConfig, Shutdown};

    pub use prate_middleware::{builtin, Middleware, MiddlewareError};

    pub use prate_router::Params;

    pub use prate_telemetry::{init_logging, LogConfig};

    pub use prate_config::{ConfigLoader, PrateConfig};
}
