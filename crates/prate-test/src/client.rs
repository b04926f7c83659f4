//! In-memory test client.

use std::net::SocketAddr;
use std::sync::Arc;

use bytes::Bytes;
use http::Method;
use prate_server::{App, AppError, Server};

use crate::error::TestError;
use crate::request::TestRequestBuilder;
use crate::response::TestResponse;

/// Peer address reported for test requests unless overridden.
pub const DEFAULT_REMOTE_ADDR: SocketAddr =
    SocketAddr::new(std::net::IpAddr::V4(std::net::Ipv4Addr::LOCALHOST), 40000);

/// Sends requests straight into a bound [`Server`], without a socket.
///
/// Requests go through routing, middlewares, payload decoding, the pools and
/// the fallbacks exactly as they would over the network.
///
/// # Example
///
/// ```
/// use prate_core::{handler_fn, reply};
/// use prate_server::{App, EndpointConfig, ServerConfig};
/// use prate_test::{fixtures::TestRes, TestClient};
///
/// # tokio_test::block_on(async {
/// let mut app = App::new(ServerConfig::default());
/// app.get(EndpointConfig::new(
///     "/:name",
///     handler_fn(|_rc, rd| {
///         let name = rd.param("name").unwrap_or_default().to_string();
///         Box::pin(async move { reply(TestRes::new("name", name)) })
///     }),
/// ));
///
/// let client = TestClient::new(app).unwrap();
/// client
///     .get("/sarkar")
///     .send()
///     .await
///     .assert_proto(&TestRes::new("name", "sarkar"));
/// # });
/// ```
#[must_use]
#[derive(Debug, Clone)]
pub struct TestClient {
    server: Arc<Server>,
    remote_addr: Option<SocketAddr>,
    default_headers: Vec<(String, String)>,
}

impl TestClient {
    /// Binds `app` and creates a client for it.
    ///
    /// # Errors
    ///
    /// Returns the error from [`App::bind`].
    pub fn new(app: App) -> Result<Self, AppError> {
        Ok(Self::from_server(Arc::new(app.bind()?)))
    }

    /// Creates a client for an already bound server.
    pub fn from_server(server: Arc<Server>) -> Self {
        Self {
            server,
            remote_addr: Some(DEFAULT_REMOTE_ADDR),
            default_headers: Vec::new(),
        }
    }

    /// Sets the peer address seen by handlers. `None` simulates a connection
    /// without one.
    pub fn with_remote_addr(mut self, remote_addr: Option<SocketAddr>) -> Self {
        self.remote_addr = remote_addr;
        self
    }

    /// Adds a header sent with every request.
    pub fn with_default_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.default_headers.push((name.into(), value.into()));
        self
    }

    /// The server requests are sent to.
    #[must_use]
    pub fn server(&self) -> &Arc<Server> {
        &self.server
    }

    /// Starts a `GET` request.
    pub fn get(&self, uri: impl AsRef<str>) -> TestClientRequest<'_> {
        self.request(Method::GET, uri)
    }

    /// Starts a `POST` request.
    pub fn post(&self, uri: impl AsRef<str>) -> TestClientRequest<'_> {
        self.request(Method::POST, uri)
    }

    /// Starts a `PUT` request.
    pub fn put(&self, uri: impl AsRef<str>) -> TestClientRequest<'_> {
        self.request(Method::PUT, uri)
    }

    /// Starts a `PATCH` request.
    pub fn patch(&self, uri: impl AsRef<str>) -> TestClientRequest<'_> {
        self.request(Method::PATCH, uri)
    }

    /// Starts a `DELETE` request.
    pub fn delete(&self, uri: impl AsRef<str>) -> TestClientRequest<'_> {
        self.request(Method::DELETE, uri)
    }

    /// Starts an `OPTIONS` request.
    pub fn options(&self, uri: impl AsRef<str>) -> TestClientRequest<'_> {
        self.request(Method::OPTIONS, uri)
    }

    /// Starts a request with any method.
    pub fn request(&self, method: Method, uri: impl AsRef<str>) -> TestClientRequest<'_> {
        let mut builder = TestRequestBuilder::new(method, uri);
        for (name, value) in &self.default_headers {
            builder = builder.header(name, value);
        }
        TestClientRequest {
            client: self,
            builder,
        }
    }
}

/// A request bound to a [`TestClient`].
#[must_use]
#[derive(Debug)]
pub struct TestClientRequest<'a> {
    client: &'a TestClient,
    builder: TestRequestBuilder,
}

impl TestClientRequest<'_> {
    /// Appends a header.
    pub fn header(mut self, name: impl AsRef<str>, value: impl AsRef<str>) -> Self {
        self.builder = self.builder.header(name, value);
        self
    }

    /// Sets the raw body.
    pub fn body(mut self, body: impl Into<Bytes>) -> Self {
        self.builder = self.builder.body(body);
        self
    }

    /// Sets a protobuf body.
    pub fn proto<M: prost::Message>(mut self, message: &M) -> Self {
        self.builder = self.builder.proto(message);
        self
    }

    /// Sends the request.
    ///
    /// # Panics
    ///
    /// Panics if the request could not be built or the body not read.
    pub async fn send(self) -> TestResponse {
        match self.try_send().await {
            Ok(response) => response,
            Err(err) => panic!("test request failed: {err}"),
        }
    }

    /// Sends the request.
    ///
    /// # Errors
    ///
    /// Fails if the request could not be built or the body not read.
    pub async fn try_send(self) -> Result<TestResponse, TestError> {
        let request = self.builder.build()?;
        let response = self.client.server.handle(request, self.client.remote_addr).await;
        TestResponse::from_http(response).await
    }
}
