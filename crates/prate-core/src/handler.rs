//! Handler trait for request processing.
//!
//! A [`Handler`] receives the request context and the request data and either
//! returns a payload for the pipeline to encode, returns `None` for an empty
//! 200, writes the response itself through the
//! [`ResponseWriter`](crate::ResponseWriter), or fails.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::codec::Payload;
use crate::context::RequestCtx;
use crate::data::RequestData;

/// A boxed, `Send` future borrowing for `'a`.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// What a handler produces.
pub type HandlerResult = anyhow::Result<Option<Box<dyn Payload>>>;

/// A request handler.
///
/// Usually built from a closure with [`handler_fn`]. Middlewares wrap one
/// handler in another, so handlers are shared as [`BoxedHandler`].
pub trait Handler: Send + Sync + 'static {
    /// Handles one request.
    fn call<'a>(&'a self, rc: &'a RequestCtx, rd: &'a mut RequestData)
        -> BoxFuture<'a, HandlerResult>;
}

/// A shared, type-erased handler.
pub type BoxedHandler = Arc<dyn Handler>;

/// Adapter turning a closure into a [`Handler`].
#[derive(Clone)]
pub struct HandlerFn<F> {
    f: F,
}

impl<F> Handler for HandlerFn<F>
where
    F: for<'a> Fn(&'a RequestCtx, &'a mut RequestData) -> BoxFuture<'a, HandlerResult>
        + Send
        + Sync
        + 'static,
{
    fn call<'a>(
        &'a self,
        rc: &'a RequestCtx,
        rd: &'a mut RequestData,
    ) -> BoxFuture<'a, HandlerResult> {
        (self.f)(rc, rd)
    }
}

/// Builds a [`BoxedHandler`] from a closure returning a boxed future.
///
/// # Example
///
/// ```
/// use prate_core::{handler_fn, reply_empty};
///
/// let handler = handler_fn(|rc, _rd| {
///     let path = rc.path().to_string();
///     Box::pin(async move {
///         tracing::info!(%path, "ping");
///         reply_empty()
///     })
/// });
/// # let _ = handler;
/// ```
pub fn handler_fn<F>(f: F) -> BoxedHandler
where
    F: for<'a> Fn(&'a RequestCtx, &'a mut RequestData) -> BoxFuture<'a, HandlerResult>
        + Send
        + Sync
        + 'static,
{
    Arc::new(HandlerFn { f })
}

/// Successful result carrying a payload to encode.
pub fn reply<M: Payload>(message: M) -> HandlerResult {
    Ok(Some(Box::new(message)))
}

/// Successful result with no payload: 200 and an empty body.
pub fn reply_empty() -> HandlerResult {
    Ok(None)
}
