//! # Prate Middleware
//!
//! Named handler wrappers and the chain that composes them.
//!
//! Every [`Middleware`] carries a unique ID. A [`MiddlewareChain`] keeps
//! them in the order they were added and composes them around an endpoint
//! handler so that the first one added runs first. Endpoints may exclude
//! middlewares by ID.
//!
//! ```text
//! chain: [request_id, access_log, auth]      endpoint excludes: [auth]
//!
//! request ─▶ request_id ─▶ access_log ─▶ handler
//! ```
//!
//! ## Example
//!
//! ```
//! use prate_middleware::{builtin, MiddlewareChain};
//!
//! let mut chain = MiddlewareChain::new();
//! chain.apply([builtin::request_id(), builtin::access_log()]).unwrap();
//! assert_eq!(chain.ids().collect::<Vec<_>>(), ["request_id", "access_log"]);
//!
//! // IDs are unique
//! assert!(chain.push(builtin::access_log()).is_err());
//! ```

#![doc(html_root_url = "https://docs.rs/prate-middleware/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod builtin;
mod chain;
mod middleware;

pub use chain::{MiddlewareChain, MiddlewareError};
pub use middleware::Middleware;
