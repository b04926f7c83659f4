//! Endpoint configuration and bound endpoints.
//!
//! An [`EndpointConfig`] describes a route before the application is bound:
//! the path pattern, the handler, the request payload type and the
//! middlewares it opts out of. At bind time it becomes an [`Endpoint`] whose
//! handler is wrapped in every middleware that was not excluded.

use std::any::TypeId;
use std::fmt;

use http::Method;
use prate_core::{BoxedHandler, Payload, Pool};
use prate_middleware::MiddlewareChain;

/// Builds zero values of a request payload type.
#[derive(Clone, Copy)]
pub struct PayloadPrototype {
    type_id: TypeId,
    type_name: &'static str,
    factory: fn() -> Box<dyn Payload>,
}

fn zero_value<T: Payload + Default>() -> Box<dyn Payload> {
    Box::new(T::default())
}

impl PayloadPrototype {
    /// Prototype for the message type `T`.
    #[must_use]
    pub fn of<T: Payload + Default>() -> Self {
        Self {
            type_id: TypeId::of::<T>(),
            type_name: std::any::type_name::<T>(),
            factory: zero_value::<T>,
        }
    }

    /// A fresh zero value.
    #[must_use]
    pub fn instantiate(&self) -> Box<dyn Payload> {
        (self.factory)()
    }

    /// Returns true if `payload` is an instance of this type.
    #[must_use]
    pub fn matches(&self, payload: &dyn Payload) -> bool {
        payload.as_any().type_id() == self.type_id
    }

    /// Rust type name of the message.
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }
}

impl fmt::Debug for PayloadPrototype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("PayloadPrototype").field(&self.type_name).finish()
    }
}

/// Declarative description of an endpoint.
///
/// # Example
///
/// ```
/// use prate_core::{handler_fn, reply_empty};
/// use prate_server::EndpointConfig;
///
/// #[derive(Clone, PartialEq, prost::Message)]
/// struct CreateUser {
///     #[prost(string, tag = "1")]
///     name: String,
/// }
///
/// let config = EndpointConfig::new("/users", handler_fn(|_rc, _rd| Box::pin(async { reply_empty() })))
///     .with_request_payload_type::<CreateUser>()
///     .with_exclude(["auth"]);
///
/// assert_eq!(config.path(), "/users");
/// assert_eq!(config.excluded(), ["auth".to_string()]);
/// ```
#[derive(Clone)]
pub struct EndpointConfig {
    path: String,
    handler: BoxedHandler,
    payload: Option<PayloadPrototype>,
    exclude: Vec<String>,
}

impl EndpointConfig {
    /// Creates a config for `path` served by `handler`.
    pub fn new(path: impl Into<String>, handler: BoxedHandler) -> Self {
        Self {
            path: path.into(),
            handler,
            payload: None,
            exclude: Vec::new(),
        }
    }

    /// Adds middleware IDs this endpoint opts out of.
    #[must_use]
    pub fn with_exclude<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.exclude.extend(ids.into_iter().map(Into::into));
        self
    }

    /// Replaces the handler.
    #[must_use]
    pub fn with_handler(mut self, handler: BoxedHandler) -> Self {
        self.handler = handler;
        self
    }

    /// Declares the request body as a `T` message.
    #[must_use]
    pub fn with_request_payload_type<T: Payload + Default>(mut self) -> Self {
        self.payload = Some(PayloadPrototype::of::<T>());
        self
    }

    /// Replaces the path pattern.
    #[must_use]
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = path.into();
        self
    }

    /// The path pattern.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// The declared request payload type, if any.
    #[must_use]
    pub fn payload(&self) -> Option<&PayloadPrototype> {
        self.payload.as_ref()
    }

    /// Excluded middleware IDs.
    #[must_use]
    pub fn excluded(&self) -> &[String] {
        &self.exclude
    }

    pub(crate) fn bind(self, method: Method, chain: &MiddlewareChain) -> Endpoint {
        let handler = chain.compose(self.handler, &self.exclude);
        let payload = self.payload.map(|prototype| PayloadPool {
            prototype,
            pool: Pool::new(prototype.factory),
        });
        Endpoint {
            method,
            path: self.path,
            handler,
            payload,
            exclude: self.exclude,
        }
    }
}

impl fmt::Debug for EndpointConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EndpointConfig")
            .field("path", &self.path)
            .field("payload", &self.payload)
            .field("exclude", &self.exclude)
            .finish_non_exhaustive()
    }
}

/// Recycled instances of one payload type.
pub(crate) struct PayloadPool {
    prototype: PayloadPrototype,
    pool: Pool<Box<dyn Payload>>,
}

impl PayloadPool {
    pub(crate) fn take(&self) -> Box<dyn Payload> {
        self.pool.take()
    }

    /// Returns `payload` unless the handler swapped in a different type.
    pub(crate) fn release(&self, payload: Box<dyn Payload>) {
        if self.prototype.matches(payload.as_ref()) {
            self.pool.release(payload);
        }
    }

    pub(crate) fn idle(&self) -> usize {
        self.pool.idle()
    }
}

/// A route ready for dispatch.
pub struct Endpoint {
    method: Method,
    path: String,
    handler: BoxedHandler,
    payload: Option<PayloadPool>,
    exclude: Vec<String>,
}

impl Endpoint {
    /// The HTTP method.
    #[must_use]
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// The path pattern.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// The handler with all middlewares applied.
    #[must_use]
    pub fn handler(&self) -> &BoxedHandler {
        &self.handler
    }

    /// The declared request payload type, if any.
    #[must_use]
    pub fn payload_prototype(&self) -> Option<&PayloadPrototype> {
        self.payload.as_ref().map(|p| &p.prototype)
    }

    /// Excluded middleware IDs.
    #[must_use]
    pub fn excluded(&self) -> &[String] {
        &self.exclude
    }

    /// Payload instances waiting for reuse.
    #[must_use]
    pub fn idle_payloads(&self) -> usize {
        self.payload.as_ref().map_or(0, PayloadPool::idle)
    }

    pub(crate) fn payload_pool(&self) -> Option<&PayloadPool> {
        self.payload.as_ref()
    }
}

impl fmt::Debug for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Endpoint")
            .field("method", &self.method)
            .field("path", &self.path)
            .field("payload", &self.payload_prototype())
            .field("exclude", &self.exclude)
            .finish_non_exhaustive()
    }
}
