//! Per-request context.
//!
//! A [`RequestCtx`] pairs the request head with the [`ResponseWriter`] for the
//! same exchange. Contexts are pooled; the server binds one to a live request,
//! hands it to the handler chain, then takes the writer back out and resets
//! the context before returning it to the pool.

use std::net::SocketAddr;

use http::request::Parts;
use http::{Extensions, HeaderMap, Method, Request, StatusCode, Uri, Version};

use crate::client_ip;
use crate::pool::Reset;
use crate::writer::ResponseWriter;

fn empty_head() -> Parts {
    Request::new(()).into_parts().0
}

/// Request identity passed to every handler and middleware.
#[derive(Debug)]
pub struct RequestCtx {
    head: Parts,
    remote_addr: Option<SocketAddr>,
    writer: Option<ResponseWriter>,
}

impl Default for RequestCtx {
    fn default() -> Self {
        Self {
            head: empty_head(),
            remote_addr: None,
            writer: None,
        }
    }
}

impl RequestCtx {
    /// Creates an unbound context.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds the context to a request.
    pub fn bind(&mut self, head: Parts, remote_addr: Option<SocketAddr>, writer: ResponseWriter) {
        self.head = head;
        self.remote_addr = remote_addr;
        self.writer = Some(writer);
    }

    /// Detaches the response writer so the response can be finished.
    pub fn take_writer(&mut self) -> Option<ResponseWriter> {
        self.writer.take()
    }

    /// The full request head.
    #[must_use]
    pub fn head(&self) -> &Parts {
        &self.head
    }

    /// Request method.
    #[must_use]
    pub fn method(&self) -> &Method {
        &self.head.method
    }

    /// Request URI.
    #[must_use]
    pub fn uri(&self) -> &Uri {
        &self.head.uri
    }

    /// Request path.
    #[must_use]
    pub fn path(&self) -> &str {
        self.head.uri.path()
    }

    /// HTTP version.
    #[must_use]
    pub fn version(&self) -> Version {
        self.head.version
    }

    /// Request headers.
    #[must_use]
    pub fn headers(&self) -> &HeaderMap {
        &self.head.headers
    }

    /// Request extensions.
    #[must_use]
    pub fn extensions(&self) -> &Extensions {
        &self.head.extensions
    }

    /// Transport peer address, when known.
    #[must_use]
    pub fn remote_addr(&self) -> Option<SocketAddr> {
        self.remote_addr
    }

    /// The response writer for this request.
    ///
    /// # Panics
    ///
    /// Panics if the context is not bound to a request.
    #[must_use]
    pub fn response_writer(&self) -> &ResponseWriter {
        match &self.writer {
            Some(writer) => writer,
            None => panic!("request context used outside of a request"),
        }
    }

    /// The response writer, or `None` when unbound.
    #[must_use]
    pub fn try_response_writer(&self) -> Option<&ResponseWriter> {
        self.writer.as_ref()
    }

    /// Status written so far; `None` until the response is written.
    #[must_use]
    pub fn status_code(&self) -> Option<StatusCode> {
        self.writer.as_ref().and_then(ResponseWriter::status)
    }

    /// Best-effort client IP. See [`client_ip::resolve`].
    #[must_use]
    pub fn ip(&self) -> String {
        client_ip::resolve(&self.head.headers, self.remote_addr)
    }
}

impl Reset for RequestCtx {
    fn reset(&mut self) {
        self.head = empty_head();
        self.remote_addr = None;
        self.writer = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bound(uri: &str) -> RequestCtx {
        let request = Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header("x-real-ip", "4.4.4.4")
            .body(())
            .unwrap();
        let mut rc = RequestCtx::new();
        rc.bind(
            request.into_parts().0,
            "10.0.0.1:443".parse().ok(),
            ResponseWriter::buffered(),
        );
        rc
    }

    #[test]
    fn test_bound_accessors() {
        let rc = bound("/users/7?verbose=true");
        assert_eq!(rc.method(), Method::POST);
        assert_eq!(rc.path(), "/users/7");
        assert_eq!(rc.uri().query(), Some("verbose=true"));
        assert_eq!(rc.headers()["x-real-ip"], "4.4.4.4");
        assert_eq!(rc.remote_addr(), "10.0.0.1:443".parse().ok());
        assert_eq!(rc.ip(), "4.4.4.4");
    }

    #[test]
    fn test_status_code_none_until_written() {
        let rc = bound("/");
        assert_eq!(rc.status_code(), None);
        rc.response_writer().write_header(StatusCode::CREATED);
        assert_eq!(rc.status_code(), Some(StatusCode::CREATED));
    }

    #[test]
    fn test_take_writer() {
        let mut rc = bound("/");
        rc.response_writer().write(b"done").unwrap();
        let writer = rc.take_writer().unwrap();
        assert!(writer.is_written());
        assert!(rc.try_response_writer().is_none());
    }

    #[test]
    #[should_panic(expected = "outside of a request")]
    fn test_unbound_writer_panics() {
        let _ = RequestCtx::new().response_writer();
    }

    #[test]
    fn test_reset_clears_request() {
        let mut rc = bound("/users/7");
        rc.reset();
        assert_eq!(rc.method(), Method::GET);
        assert_eq!(rc.path(), "/");
        assert!(rc.headers().is_empty());
        assert!(rc.remote_addr().is_none());
        assert!(rc.try_response_writer().is_none());
        assert_eq!(rc.ip(), "");
    }
}
