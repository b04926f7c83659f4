//! Named handler wrappers.
//!
//! A [`Middleware`] is a unique ID plus a function that takes the next
//! handler and returns a new handler around it. The wrapper can run code
//! before and after delegating, or answer the request itself without
//! delegating at all.
//!
//! # Example
//!
//! ```
//! use prate_middleware::Middleware;
//!
//! let timing = Middleware::from_fn("timing", |rc, rd, next| {
//!     Box::pin(async move {
//!         let start = std::time::Instant::now();
//!         let result = next.call(rc, rd).await;
//!         tracing::debug!(path = rc.path(), elapsed = ?start.elapsed(), "handled");
//!         result
//!     })
//! });
//! assert_eq!(timing.id(), "timing");
//! ```

use std::fmt;
use std::sync::Arc;

use prate_core::{handler_fn, BoxFuture, BoxedHandler, HandlerResult, RequestCtx, RequestData};

type WrapFn = dyn Fn(BoxedHandler) -> BoxedHandler + Send + Sync;

/// A uniquely named handler wrapper.
#[derive(Clone)]
pub struct Middleware {
    id: String,
    wrap: Arc<WrapFn>,
}

impl Middleware {
    /// Creates a middleware from a handler-to-handler function.
    pub fn new<F>(id: impl Into<String>, wrap: F) -> Self
    where
        F: Fn(BoxedHandler) -> BoxedHandler + Send + Sync + 'static,
    {
        Self {
            id: id.into(),
            wrap: Arc::new(wrap),
        }
    }

    /// Creates a middleware from a closure that receives the next handler
    /// alongside the request.
    pub fn from_fn<F>(id: impl Into<String>, f: F) -> Self
    where
        F: for<'a> Fn(&'a RequestCtx, &'a mut RequestData, BoxedHandler) -> BoxFuture<'a, HandlerResult>
            + Send
            + Sync
            + 'static,
    {
        let f = Arc::new(f);
        Self::new(id, move |next: BoxedHandler| {
            let f = f.clone();
            handler_fn(move |rc, rd| f(rc, rd, next.clone()))
        })
    }

    /// The middleware's unique ID.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Wraps `next`, returning the combined handler.
    #[must_use]
    pub fn wrap(&self, next: BoxedHandler) -> BoxedHandler {
        (self.wrap)(next)
    }
}

impl fmt::Debug for Middleware {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Middleware")
            .field("id", &self.id)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use prate_core::{reply_empty, ResponseWriter};

    fn bound_ctx() -> RequestCtx {
        let mut rc = RequestCtx::new();
        rc.bind(
            http::Request::new(()).into_parts().0,
            None,
            ResponseWriter::buffered(),
        );
        rc
    }

    #[tokio::test]
    async fn test_from_fn_runs_around_next() {
        let mw = Middleware::from_fn("mark", |rc, rd, next| {
            Box::pin(async move {
                rd.set_custom("before", true);
                let result = next.call(rc, rd).await;
                rc.response_writer()
                    .headers()
                    .append("x-mark", "after".parse().unwrap());
                result
            })
        });

        let inner = handler_fn(|_rc, rd| {
            let saw_before = rd.custom::<bool>("before").copied().unwrap_or(false);
            Box::pin(async move {
                assert!(saw_before);
                reply_empty()
            })
        });

        let handler = mw.wrap(inner);
        let rc = bound_ctx();
        let mut rd = RequestData::new();
        assert!(handler.call(&rc, &mut rd).await.unwrap().is_none());
        assert_eq!(rc.response_writer().headers()["x-mark"], "after");
    }

    #[tokio::test]
    async fn test_short_circuit() {
        let deny = Middleware::from_fn("deny", |_rc, _rd, _next| {
            Box::pin(async move {
                let result: HandlerResult = Err(prate_core::Error::forbidden("denied").into());
                result
            })
        });
        let inner = handler_fn(|_rc, rd| {
            rd.set_custom("inner", true);
            Box::pin(async move { reply_empty() })
        });

        let handler = deny.wrap(inner);
        let rc = bound_ctx();
        let mut rd = RequestData::new();
        assert!(handler.call(&rc, &mut rd).await.is_err());
        assert!(!rd.contains_custom("inner"));
    }

    #[test]
    fn test_debug_shows_id() {
        let mw = Middleware::new("auth", |next| next);
        assert!(format!("{mw:?}").contains("auth"));
    }
}
