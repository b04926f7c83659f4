//! Application registration.
//!
//! An [`App`] collects middlewares, endpoints and router settings. Endpoints
//! are queued rather than bound immediately, so every endpoint sees the final
//! middleware list no matter when it was registered. [`App::bind`] consumes
//! the app and produces the immutable [`Server`].
//!
//! # Example
//!
//! ```
//! use prate_core::{handler_fn, reply_empty};
//! use prate_middleware::builtin;
//! use prate_server::{App, EndpointConfig, ServerConfig};
//!
//! let mut app = App::new(ServerConfig::default());
//! app.get(EndpointConfig::new(
//!     "/ping",
//!     handler_fn(|_rc, _rd| Box::pin(async { reply_empty() })),
//! ));
//! // Applies to /ping as well, even though it was registered earlier.
//! app.apply([builtin::request_id()]).unwrap();
//!
//! let server = app.bind().unwrap();
//! assert_eq!(server.endpoints().len(), 1);
//! ```

use std::fmt;
use std::sync::Arc;

use bytes::Bytes;
use http::request::Parts;
use http::{Method, Response};
use http_body_util::Full;
use prate_core::BoxedHandler;
use prate_middleware::{Middleware, MiddlewareChain, MiddlewareError};
use prate_router::Router;

use crate::config::ServerConfig;
use crate::endpoint::EndpointConfig;
use crate::error::AppError;
use crate::fallback::{Fallbacks, OptionsHandler, PanicInfo};
use crate::server::Server;
use crate::shutdown::Shutdown;

/// Mutable application state, before binding.
pub struct App {
    config: ServerConfig,
    chain: MiddlewareChain,
    queue: Vec<(Method, EndpointConfig)>,
    fallbacks: Fallbacks,
}

impl App {
    /// Creates an application with no endpoints or middlewares.
    #[must_use]
    pub fn new(config: ServerConfig) -> Self {
        Self {
            config,
            chain: MiddlewareChain::new(),
            queue: Vec::new(),
            fallbacks: Fallbacks::default(),
        }
    }

    /// The server configuration.
    #[must_use]
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Appends middlewares. The first one added runs first.
    ///
    /// # Errors
    ///
    /// Fails on the first empty or duplicate ID. Middlewares before it in
    /// `middlewares` stay applied.
    pub fn apply<I>(&mut self, middlewares: I) -> Result<(), MiddlewareError>
    where
        I: IntoIterator<Item = Middleware>,
    {
        self.chain.apply(middlewares)
    }

    /// IDs of the applied middlewares, in execution order.
    pub fn middleware_ids(&self) -> impl Iterator<Item = &str> {
        self.chain.ids()
    }

    /// Queues an endpoint for `method`.
    pub fn handle(&mut self, method: Method, config: EndpointConfig) {
        tracing::debug!(%method, path = config.path(), "queued endpoint");
        self.queue.push((method, config));
    }

    /// Queues a `GET` endpoint.
    pub fn get(&mut self, config: EndpointConfig) {
        self.handle(Method::GET, config);
    }

    /// Queues a `POST` endpoint.
    pub fn post(&mut self, config: EndpointConfig) {
        self.handle(Method::POST, config);
    }

    /// Queues a `PUT` endpoint.
    pub fn put(&mut self, config: EndpointConfig) {
        self.handle(Method::PUT, config);
    }

    /// Queues a `PATCH` endpoint.
    pub fn patch(&mut self, config: EndpointConfig) {
        self.handle(Method::PATCH, config);
    }

    /// Queues a `DELETE` endpoint.
    pub fn delete(&mut self, config: EndpointConfig) {
        self.handle(Method::DELETE, config);
    }

    /// Queues an `OPTIONS` endpoint.
    pub fn options(&mut self, config: EndpointConfig) {
        self.handle(Method::OPTIONS, config);
    }

    /// Queues a `HEAD` endpoint.
    pub fn head(&mut self, config: EndpointConfig) {
        self.handle(Method::HEAD, config);
    }

    /// Number of queued endpoints.
    #[must_use]
    pub fn queued(&self) -> usize {
        self.queue.len()
    }

    /// Answers requests for a known path with an unregistered method with
    /// 405 and an `Allow` header. On by default; when off such requests get
    /// the not-found response.
    pub fn handle_method_not_allowed(&mut self, enabled: bool) {
        self.fallbacks.handle_method_not_allowed = enabled;
    }

    /// Replaces the default 405 response. Enables 405 handling.
    pub fn set_method_not_allowed_handler<F>(&mut self, handler: F)
    where
        F: Fn(&Parts) -> Response<Full<Bytes>> + Send + Sync + 'static,
    {
        self.fallbacks.handle_method_not_allowed = true;
        self.fallbacks.method_not_allowed = Some(Arc::new(handler));
    }

    /// Answers `OPTIONS` requests for known paths automatically. On by
    /// default.
    pub fn handle_options(&mut self, enabled: bool) {
        self.fallbacks.handle_options = enabled;
    }

    /// Answers automatic `OPTIONS` requests with `handler`. Enables
    /// automatic `OPTIONS`.
    pub fn set_options_handler<F>(&mut self, handler: F)
    where
        F: Fn(&Parts) -> Response<Full<Bytes>> + Send + Sync + 'static,
    {
        self.fallbacks.handle_options = true;
        self.fallbacks.options = Some(OptionsHandler::Raw(Arc::new(handler)));
    }

    /// Answers automatic `OPTIONS` requests with a pipeline handler.
    ///
    /// The handler's reply is encoded and its errors mapped exactly as for an
    /// endpoint. Middlewares do not run. Enables automatic `OPTIONS`.
    pub fn set_global_options_handler(&mut self, handler: BoxedHandler) {
        self.fallbacks.handle_options = true;
        self.fallbacks.options = Some(OptionsHandler::Pipeline(handler));
    }

    /// Replaces the default 404 response.
    pub fn set_not_found_handler<F>(&mut self, handler: F)
    where
        F: Fn(&Parts) -> Response<Full<Bytes>> + Send + Sync + 'static,
    {
        self.fallbacks.not_found = Some(Arc::new(handler));
    }

    /// Replaces the default response to a handler panic.
    pub fn set_panic_handler<F>(&mut self, handler: F)
    where
        F: Fn(&PanicInfo) -> Response<Full<Bytes>> + Send + Sync + 'static,
    {
        self.fallbacks.panic = Some(Arc::new(handler));
    }

    /// Composes every queued endpoint with the middleware chain and builds
    /// the router.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Route`] for the first endpoint the router rejects.
    pub fn bind(self) -> Result<Server, AppError> {
        let Self {
            config,
            chain,
            queue,
            fallbacks,
        } = self;

        let mut router = Router::new();
        let mut endpoints = Vec::with_capacity(queue.len());

        for (method, endpoint_config) in queue {
            let endpoint = endpoint_config.bind(method.clone(), &chain);
            router
                .insert(method.clone(), endpoint.path(), endpoints.len())
                .map_err(|source| AppError::Route {
                    method,
                    path: endpoint.path().to_string(),
                    source,
                })?;
            tracing::debug!(
                method = %endpoint.method(),
                path = endpoint.path(),
                excluded = ?endpoint.excluded(),
                "bound endpoint"
            );
            endpoints.push(endpoint);
        }

        Ok(Server::new(config, router, endpoints, fallbacks))
    }

    /// Binds and serves until SIGINT or SIGTERM.
    ///
    /// # Errors
    ///
    /// Returns an error if binding the endpoints or the listener fails.
    pub async fn start(self) -> Result<(), AppError> {
        self.start_with_shutdown(Shutdown::on_signals()).await
    }

    /// Binds and serves until `shutdown` fires.
    ///
    /// # Errors
    ///
    /// Returns an error if binding the endpoints or the listener fails.
    pub async fn start_with_shutdown(self, shutdown: Shutdown) -> Result<(), AppError> {
        let server = Arc::new(self.bind()?);
        server.run_with_shutdown(shutdown).await?;
        Ok(())
    }
}

impl fmt::Debug for App {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("App")
            .field("config", &self.config)
            .field("middlewares", &self.chain)
            .field("queued", &self.queue.len())
            .field("fallbacks", &self.fallbacks)
            .finish()
    }
}
