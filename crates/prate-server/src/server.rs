//! The bound server.
//!
//! A [`Server`] is produced by [`App::bind`](crate::App::bind) and never
//! changes afterwards. It can be driven two ways:
//!
//! - [`Server::handle`] answers one request in-process, which is what the
//!   accept loop and the test client call
//! - [`Server::serve`] runs a hyper HTTP/1.1 accept loop on a listener until
//!   the [`Shutdown`] fires
//!
//! # Request flow
//!
//! ```text
//! request ─▶ router ─┬─ endpoint ──────▶ pipeline
//!                    ├─ OPTIONS ───────▶ options handler / 200 + Allow
//!                    ├─ other method ──▶ 405 + Allow
//!                    └─ nothing ───────▶ 404
//! ```

use std::convert::Infallible;
use std::fmt;
use std::net::SocketAddr;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use bytes::Bytes;
use futures_util::FutureExt;
use http::header::{HeaderValue, ALLOW};
use http::{Method, Request, Response};
use http_body_util::Full;
use hyper::body::{Body, Incoming};
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::{TokioIo, TokioTimer};
use prate_core::Params;
use prate_router::{RouteMatch, Router};
use tokio::net::{TcpListener, TcpStream};
use tracing::Instrument;

use crate::config::ServerConfig;
use crate::dispatch::{Dispatch, Limits, RequestPools};
use crate::endpoint::Endpoint;
use crate::error::ServerError;
use crate::fallback::{Fallbacks, OptionsHandler, PanicInfo};
use crate::shutdown::{ConnectionTracker, Shutdown};

/// Response type produced by the server.
pub type HttpResponse = Response<Full<Bytes>>;

/// The frozen dispatch table.
pub struct Server {
    config: ServerConfig,
    router: Router<usize>,
    endpoints: Vec<Endpoint>,
    pools: RequestPools,
    fallbacks: Fallbacks,
}

impl Server {
    pub(crate) fn new(
        config: ServerConfig,
        router: Router<usize>,
        endpoints: Vec<Endpoint>,
        fallbacks: Fallbacks,
    ) -> Self {
        Self {
            config,
            router,
            endpoints,
            pools: RequestPools::default(),
            fallbacks,
        }
    }

    /// The server configuration.
    #[must_use]
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Bound endpoints, in registration order.
    #[must_use]
    pub fn endpoints(&self) -> &[Endpoint] {
        &self.endpoints
    }

    /// Request contexts waiting for reuse.
    #[must_use]
    pub fn idle_contexts(&self) -> usize {
        self.pools.contexts.idle()
    }

    /// Request data values waiting for reuse.
    #[must_use]
    pub fn idle_request_data(&self) -> usize {
        self.pools.data.idle()
    }

    fn limits(&self) -> Limits {
        Limits {
            read: self.config.read_timeout(),
            handler: self.config.write_timeout(),
        }
    }

    /// Answers one request.
    ///
    /// Panics raised by handlers are caught here and turned into the panic
    /// handler's response.
    pub async fn handle<B>(&self, req: Request<B>, remote_addr: Option<SocketAddr>) -> HttpResponse
    where
        B: Body<Data = Bytes> + Send,
        B::Error: fmt::Display,
    {
        let method = req.method().clone();
        let uri = req.uri().clone();
        let span = tracing::info_span!("request", %method, path = uri.path());

        let routed = AssertUnwindSafe(self.route(req, remote_addr))
            .catch_unwind()
            .instrument(span)
            .await;

        match routed {
            Ok(response) => response,
            Err(panic) => {
                let info = PanicInfo::new(method, uri, panic.as_ref());
                self.fallbacks.panicked(&info)
            }
        }
    }

    async fn route<B>(&self, req: Request<B>, remote_addr: Option<SocketAddr>) -> HttpResponse
    where
        B: Body<Data = Bytes> + Send,
        B::Error: fmt::Display,
    {
        let method = req.method().clone();
        let path = req.uri().path().to_string();

        if let Some(RouteMatch { value, params }) = self.router.match_route(&method, &path) {
            let endpoint = &self.endpoints[*value];
            tracing::debug!(endpoint = endpoint.path(), "matched");
            let dispatch = Dispatch {
                handler: endpoint.handler(),
                payload: endpoint.payload_pool(),
                pools: &self.pools,
                limits: self.limits(),
            };
            return dispatch.run(req, remote_addr, params).await;
        }

        if method == Method::OPTIONS && self.fallbacks.handle_options {
            let allowed = if path == "*" {
                self.router.all_methods()
            } else {
                self.router.allowed_methods(&path, &method)
            };
            if !allowed.is_empty() {
                let mut response = self.options(req, remote_addr).await;
                set_allow(&mut response, &allowed);
                return response;
            }
        } else if self.fallbacks.handle_method_not_allowed {
            let allowed = self.router.allowed_methods(&path, &method);
            if !allowed.is_empty() {
                tracing::debug!("method not allowed");
                let (head, _) = req.into_parts();
                let mut response = self.fallbacks.method_not_allowed(&head);
                set_allow(&mut response, &allowed);
                return response;
            }
        }

        tracing::debug!("no route");
        let (head, _) = req.into_parts();
        self.fallbacks.not_found(&head)
    }

    async fn options<B>(&self, req: Request<B>, remote_addr: Option<SocketAddr>) -> HttpResponse
    where
        B: Body<Data = Bytes> + Send,
        B::Error: fmt::Display,
    {
        match &self.fallbacks.options {
            Some(OptionsHandler::Raw(handler)) => {
                let (head, _) = req.into_parts();
                handler(&head)
            }
            Some(OptionsHandler::Pipeline(handler)) => {
                let dispatch = Dispatch {
                    handler,
                    payload: None,
                    pools: &self.pools,
                    limits: self.limits(),
                };
                dispatch.run(req, remote_addr, Params::new()).await
            }
            None => Response::new(Full::new(Bytes::new())),
        }
    }

    /// Binds the configured address and serves until `shutdown` fires.
    ///
    /// # Errors
    ///
    /// Returns an error if the address is invalid or cannot be bound.
    pub async fn run_with_shutdown(self: Arc<Self>, shutdown: Shutdown) -> Result<(), ServerError> {
        let addr = self
            .config
            .socket_addr()
            .map_err(|source| ServerError::InvalidAddress {
                addr: self.config.http_addr().to_string(),
                source,
            })?;
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|source| ServerError::Bind { addr, source })?;
        self.serve(listener, shutdown).await
    }

    /// Serves connections from `listener` until `shutdown` fires, then waits
    /// up to the shutdown timeout for open connections to finish.
    ///
    /// # Errors
    ///
    /// Returns an error if the listener's address cannot be read.
    pub async fn serve(self: Arc<Self>, listener: TcpListener, shutdown: Shutdown) -> Result<(), ServerError> {
        tracing::info!(addr = %listener.local_addr()?, "listening");
        let tracker = ConnectionTracker::new();

        loop {
            tokio::select! {
                accepted = listener.accept() => {
                    let (stream, remote_addr) = match accepted {
                        Ok(conn) => conn,
                        Err(err) => {
                            tracing::error!(error = %err, "accept failed");
                            continue;
                        }
                    };
                    if let Some(max) = self.config.max_connections() {
                        if tracker.active_connections() >= max {
                            tracing::warn!(%remote_addr, max, "connection limit reached");
                            continue;
                        }
                    }

                    let server = Arc::clone(&self);
                    let token = tracker.acquire();
                    let shutdown = shutdown.clone();
                    tokio::spawn(async move {
                        if let Err(err) = server.serve_connection(stream, remote_addr, shutdown).await {
                            tracing::debug!(%remote_addr, error = %err, "connection error");
                        }
                        drop(token);
                    });
                }
                () = shutdown.wait() => {
                    tracing::info!("shutdown signal received, stopping server");
                    break;
                }
            }
        }

        let timeout = self.config.shutdown_timeout();
        tracing::info!(
            timeout = ?timeout,
            connections = tracker.active_connections(),
            "waiting for connections to close"
        );
        if tokio::time::timeout(timeout, tracker.drained()).await.is_err() {
            tracing::warn!(
                connections = tracker.active_connections(),
                "shutdown timeout reached"
            );
        }

        tracing::info!("server stopped");
        Ok(())
    }

    async fn serve_connection(
        self: Arc<Self>,
        stream: TcpStream,
        remote_addr: SocketAddr,
        shutdown: Shutdown,
    ) -> Result<(), hyper::Error> {
        let server = Arc::clone(&self);
        let service = service_fn(move |req: Request<Incoming>| {
            let server = Arc::clone(&server);
            async move { Ok::<_, Infallible>(server.handle(req, Some(remote_addr)).await) }
        });

        let mut builder = http1::Builder::new();
        builder.timer(TokioTimer::new()).keep_alive(self.config.keep_alive());
        if let Some(timeout) = self.config.read_header_timeout() {
            builder.header_read_timeout(timeout);
        }
        if let Some(max) = self.config.max_header_bytes() {
            builder.max_buf_size(max);
        }

        let conn = builder
            .serve_connection(TokioIo::new(stream), service)
            .with_upgrades();
        tokio::pin!(conn);

        tokio::select! {
            result = conn.as_mut() => return result,
            () = shutdown.wait() => {
                tracing::debug!(%remote_addr, "closing connection for shutdown");
            }
        }

        conn.as_mut().graceful_shutdown();
        conn.await
    }
}

impl fmt::Debug for Server {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Server")
            .field("config", &self.config)
            .field("endpoints", &self.endpoints)
            .field("fallbacks", &self.fallbacks)
            .finish_non_exhaustive()
    }
}

fn set_allow(response: &mut HttpResponse, allowed: &[Method]) {
    let joined = allowed
        .iter()
        .map(Method::as_str)
        .collect::<Vec<_>>()
        .join(", ");
    if let Ok(value) = HeaderValue::from_str(&joined) {
        response.headers_mut().entry(ALLOW).or_insert(value);
    }
}
