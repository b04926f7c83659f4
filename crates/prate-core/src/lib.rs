//! # Prate Core
//!
//! Core types for the prate request dispatch layer.
//!
//! - [`RequestCtx`] - request head, peer address and response writer
//! - [`RequestData`] - path parameters, decoded payload and middleware values
//! - [`ResponseWriter`] - write-state tracking over a [`ResponseSink`]
//! - [`Payload`] - type-erased protobuf message
//! - [`Pool`] - free-list pool for per-request objects
//! - [`Handler`] - the handler trait every endpoint and middleware speaks
//! - [`Error`] - errors carrying the status the client should see

#![doc(html_root_url = "https://docs.rs/prate-core/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod client_ip;
pub mod codec;
mod content_type;
mod context;
mod data;
mod error;
mod handler;
mod pagination;
mod pool;
mod writer;

pub use codec::{CodecError, Payload};
pub use content_type::{content_type_from_extension, mime, ContentType};
pub use context::RequestCtx;
pub use data::RequestData;
pub use error::{error_status, DispatchError, Error, WriterError};
pub use handler::{handler_fn, reply, reply_empty, BoxFuture, BoxedHandler, Handler, HandlerFn, HandlerResult};
pub use pagination::Pagination;
pub use pool::{Pool, Pooled, Reset, DEFAULT_MAX_IDLE};
pub use prate_router::Params;
pub use writer::{BufferedSink, Flush, Hijack, Push, PushOptions, ResponseSink, ResponseWriter};
