//! Response writer.
//!
//! Handlers that want full control of the response write through a
//! [`ResponseWriter`] instead of returning a payload. The writer remembers
//! whether anything was written so the pipeline knows not to write a second
//! response.
//!
//! The writer wraps a [`ResponseSink`]. Sinks may optionally support
//! flushing, connection hijacking and server push; the writer exposes probes
//! for each so callers can check before using them.

use std::fmt;
use std::io;

use bytes::{Bytes, BytesMut};
use http::{HeaderMap, Method, Response, StatusCode};
use http_body_util::Full;
use hyper::upgrade::OnUpgrade;
use parking_lot::{MappedMutexGuard, Mutex, MutexGuard};

use crate::error::WriterError;

/// Sinks that can flush buffered output to the client.
pub trait Flush {
    /// Sends buffered output.
    fn flush(&mut self);
}

/// Sinks that can hand the underlying connection to the caller.
pub trait Hijack {
    /// Takes over the connection once the response head has been sent.
    fn hijack(&mut self) -> Result<OnUpgrade, WriterError>;
}

/// Sinks that support server push.
pub trait Push {
    /// Initiates a push of `target`.
    fn push(&mut self, target: &str, opts: &PushOptions) -> Result<(), WriterError>;
}

/// Options for [`ResponseWriter::push`].
#[derive(Debug, Clone, Default)]
pub struct PushOptions {
    /// Method of the promised request; `GET` when unset.
    pub method: Option<Method>,
    /// Extra headers for the promised request.
    pub headers: HeaderMap,
}

/// Destination of a response.
pub trait ResponseSink: Send {
    /// Response headers, writable until the head is sent.
    fn headers_mut(&mut self) -> &mut HeaderMap;

    /// Sets the response status.
    fn write_head(&mut self, status: StatusCode);

    /// Appends body bytes.
    fn write(&mut self, buf: &[u8]) -> io::Result<usize>;

    /// Flush capability, if supported.
    fn as_flusher(&mut self) -> Option<&mut dyn Flush> {
        None
    }

    /// Hijack capability, if supported.
    fn as_hijacker(&mut self) -> Option<&mut dyn Hijack> {
        None
    }

    /// Push capability, if supported.
    fn as_pusher(&mut self) -> Option<&mut dyn Push> {
        None
    }

    /// Finishes the response.
    fn into_response(self: Box<Self>) -> Response<Full<Bytes>>;
}

/// A sink that collects the whole response in memory.
///
/// This is the sink used by the server: hyper sends the response once the
/// pipeline returns. It can hijack the connection when the request carried an
/// upgrade handle, and never supports flush or push.
#[derive(Debug, Default)]
pub struct BufferedSink {
    status: StatusCode,
    head_written: bool,
    headers: HeaderMap,
    body: BytesMut,
    on_upgrade: Option<OnUpgrade>,
}

impl BufferedSink {
    /// Creates an empty sink with status 200.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a sink that can hijack the connection through `on_upgrade`.
    #[must_use]
    pub fn with_upgrade(on_upgrade: OnUpgrade) -> Self {
        Self {
            on_upgrade: Some(on_upgrade),
            ..Self::default()
        }
    }
}

impl ResponseSink for BufferedSink {
    fn headers_mut(&mut self) -> &mut HeaderMap {
        &mut self.headers
    }

    fn write_head(&mut self, status: StatusCode) {
        if self.head_written {
            tracing::debug!(
                current = %self.status,
                ignored = %status,
                "superfluous write_header call"
            );
            return;
        }
        self.status = status;
        self.head_written = true;
    }

    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.head_written = true;
        self.body.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn as_hijacker(&mut self) -> Option<&mut dyn Hijack> {
        if self.on_upgrade.is_some() {
            Some(self as &mut dyn Hijack)
        } else {
            None
        }
    }

    fn into_response(self: Box<Self>) -> Response<Full<Bytes>> {
        let mut response = Response::new(Full::new(self.body.freeze()));
        *response.status_mut() = self.status;
        *response.headers_mut() = self.headers;
        response
    }
}

impl Hijack for BufferedSink {
    fn hijack(&mut self) -> Result<OnUpgrade, WriterError> {
        self.on_upgrade.take().ok_or(WriterError::NotHijacker)
    }
}

struct WriterState {
    sink: Box<dyn ResponseSink>,
    written: bool,
    status: Option<StatusCode>,
}

/// Tracks the write state of one response.
///
/// Every operation takes the writer's lock, so a writer may be shared by
/// concurrent tasks of the same request.
pub struct ResponseWriter {
    state: Mutex<WriterState>,
}

impl ResponseWriter {
    /// Wraps a sink.
    pub fn new(sink: impl ResponseSink + 'static) -> Self {
        Self::from_boxed(Box::new(sink))
    }

    /// Wraps an already boxed sink.
    #[must_use]
    pub fn from_boxed(sink: Box<dyn ResponseSink>) -> Self {
        Self {
            state: Mutex::new(WriterState {
                sink,
                written: false,
                status: None,
            }),
        }
    }

    /// A writer over a fresh [`BufferedSink`].
    #[must_use]
    pub fn buffered() -> Self {
        Self::new(BufferedSink::new())
    }

    /// Response headers.
    ///
    /// The returned guard holds the writer's lock; drop it before calling any
    /// other writer method.
    pub fn headers(&self) -> MappedMutexGuard<'_, HeaderMap> {
        MutexGuard::map(self.state.lock(), |state| state.sink.headers_mut())
    }

    /// Writes body bytes. The status defaults to 200 if none was set.
    pub fn write(&self, buf: &[u8]) -> Result<usize, WriterError> {
        let mut state = self.state.lock();
        state.written = true;
        if state.status.is_none() {
            state.status = Some(StatusCode::OK);
        }
        Ok(state.sink.write(buf)?)
    }

    /// Sets the response status.
    pub fn write_header(&self, status: StatusCode) {
        let mut state = self.state.lock();
        state.sink.write_head(status);
        state.status = Some(status);
        state.written = true;
    }

    /// True once [`write`](Self::write) or [`write_header`](Self::write_header)
    /// was called.
    pub fn is_written(&self) -> bool {
        self.state.lock().written
    }

    /// Last status written, if any.
    pub fn status(&self) -> Option<StatusCode> {
        self.state.lock().status
    }

    /// True if [`flush`](Self::flush) may be called.
    pub fn supports_flush(&self) -> bool {
        self.state.lock().sink.as_flusher().is_some()
    }

    /// True if [`hijack`](Self::hijack) can succeed.
    pub fn supports_hijack(&self) -> bool {
        self.state.lock().sink.as_hijacker().is_some()
    }

    /// True if [`push`](Self::push) can succeed.
    pub fn supports_push(&self) -> bool {
        self.state.lock().sink.as_pusher().is_some()
    }

    /// Flushes buffered output.
    ///
    /// # Panics
    ///
    /// Panics if the sink does not support flushing. Check
    /// [`supports_flush`](Self::supports_flush) first.
    pub fn flush(&self) {
        let mut state = self.state.lock();
        match state.sink.as_flusher() {
            Some(flusher) => flusher.flush(),
            None => panic!("response writer is not a flusher"),
        }
    }

    /// Takes over the connection.
    ///
    /// The returned future resolves after the response has been sent, usually
    /// a `101 Switching Protocols` written by the handler.
    pub fn hijack(&self) -> Result<OnUpgrade, WriterError> {
        let mut state = self.state.lock();
        state
            .sink
            .as_hijacker()
            .ok_or(WriterError::NotHijacker)?
            .hijack()
    }

    /// Initiates a server push.
    pub fn push(&self, target: &str, opts: &PushOptions) -> Result<(), WriterError> {
        let mut state = self.state.lock();
        state
            .sink
            .as_pusher()
            .ok_or(WriterError::NotPusher)?
            .push(target, opts)
    }

    /// Finishes the response.
    pub fn into_response(self) -> Response<Full<Bytes>> {
        self.state.into_inner().sink.into_response()
    }
}

impl fmt::Debug for ResponseWriter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.lock();
        f.debug_struct("ResponseWriter")
            .field("written", &state.written)
            .field("status", &state.status)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::header::{CONTENT_TYPE, LINK};
    use http_body_util::BodyExt;
    use std::sync::Arc;

    #[derive(Default)]
    struct StreamingSink {
        inner: BufferedSink,
        flushes: usize,
        pushed: Vec<String>,
    }

    impl ResponseSink for StreamingSink {
        fn headers_mut(&mut self) -> &mut HeaderMap {
            self.inner.headers_mut()
        }

        fn write_head(&mut self, status: StatusCode) {
            self.inner.write_head(status);
        }

        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.inner.write(buf)
        }

        fn as_flusher(&mut self) -> Option<&mut dyn Flush> {
            Some(self as &mut dyn Flush)
        }

        fn as_pusher(&mut self) -> Option<&mut dyn Push> {
            Some(self as &mut dyn Push)
        }

        fn into_response(self: Box<Self>) -> Response<Full<Bytes>> {
            let mut response = Box::new(self.inner).into_response();
            response
                .headers_mut()
                .insert("x-flushes", self.flushes.into());
            for target in &self.pushed {
                response
                    .headers_mut()
                    .append(LINK, target.parse().unwrap());
            }
            response
        }
    }

    impl Flush for StreamingSink {
        fn flush(&mut self) {
            self.flushes += 1;
        }
    }

    impl Push for StreamingSink {
        fn push(&mut self, target: &str, _opts: &PushOptions) -> Result<(), WriterError> {
            self.pushed.push(target.to_string());
            Ok(())
        }
    }

    async fn body_bytes(response: Response<Full<Bytes>>) -> Bytes {
        response.into_body().collect().await.unwrap().to_bytes()
    }

    #[test]
    fn test_new_writer_is_unwritten() {
        let writer = ResponseWriter::buffered();
        assert!(!writer.is_written());
        assert_eq!(writer.status(), None);
    }

    #[test]
    fn test_write_defaults_status_to_ok() {
        let writer = ResponseWriter::buffered();
        writer.write(b"hello").unwrap();
        assert!(writer.is_written());
        assert_eq!(writer.status(), Some(StatusCode::OK));
    }

    #[test]
    fn test_write_header_marks_written() {
        let writer = ResponseWriter::buffered();
        writer.write_header(StatusCode::CREATED);
        assert!(writer.is_written());
        assert_eq!(writer.status(), Some(StatusCode::CREATED));
    }

    #[test]
    fn test_write_keeps_explicit_status() {
        let writer = ResponseWriter::buffered();
        writer.write_header(StatusCode::ACCEPTED);
        writer.write(b"queued").unwrap();
        assert_eq!(writer.status(), Some(StatusCode::ACCEPTED));
    }

    #[tokio::test]
    async fn test_into_response_collects_everything() {
        let writer = ResponseWriter::buffered();
        writer
            .headers()
            .insert(CONTENT_TYPE, "text/plain".parse().unwrap());
        writer.write_header(StatusCode::IM_A_TEAPOT);
        writer.write(b"short ").unwrap();
        writer.write(b"and stout").unwrap();

        let response = writer.into_response();
        assert_eq!(response.status(), StatusCode::IM_A_TEAPOT);
        assert_eq!(response.headers()[CONTENT_TYPE], "text/plain");
        assert_eq!(body_bytes(response).await, "short and stout");
    }

    #[test]
    fn test_superfluous_write_header_keeps_first_status() {
        let writer = ResponseWriter::buffered();
        writer.write_header(StatusCode::NOT_FOUND);
        writer.write_header(StatusCode::OK);

        assert_eq!(writer.status(), Some(StatusCode::OK));
        assert_eq!(writer.into_response().status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_body_write_fixes_status_for_sink() {
        let writer = ResponseWriter::buffered();
        writer.write(b"x").unwrap();
        writer.write_header(StatusCode::BAD_REQUEST);
        assert_eq!(writer.into_response().status(), StatusCode::OK);
    }

    #[test]
    fn test_buffered_sink_capabilities() {
        let writer = ResponseWriter::buffered();
        assert!(!writer.supports_flush());
        assert!(!writer.supports_hijack());
        assert!(!writer.supports_push());
    }

    #[test]
    #[should_panic(expected = "not a flusher")]
    fn test_flush_without_support_panics() {
        ResponseWriter::buffered().flush();
    }

    #[test]
    fn test_hijack_without_upgrade_is_error() {
        let err = ResponseWriter::buffered().hijack().unwrap_err();
        assert!(matches!(err, WriterError::NotHijacker));
    }

    #[test]
    fn test_push_without_support_is_error() {
        let err = ResponseWriter::buffered()
            .push("/style.css", &PushOptions::default())
            .unwrap_err();
        assert!(matches!(err, WriterError::NotPusher));
    }

    #[test]
    fn test_hijack_with_upgrade_succeeds_once() {
        let mut request = http::Request::new(());
        let on_upgrade = hyper::upgrade::on(&mut request);
        let writer = ResponseWriter::new(BufferedSink::with_upgrade(on_upgrade));

        assert!(writer.supports_hijack());
        assert!(writer.hijack().is_ok());
        assert!(!writer.supports_hijack());
        assert!(matches!(writer.hijack(), Err(WriterError::NotHijacker)));
    }

    #[test]
    fn test_flush_and_push_pass_through() {
        let writer = ResponseWriter::new(StreamingSink::default());
        assert!(writer.supports_flush());
        assert!(writer.supports_push());
        assert!(!writer.supports_hijack());

        writer.write(b"part").unwrap();
        writer.flush();
        writer.flush();
        writer.push("/app.js", &PushOptions::default()).unwrap();

        let response = writer.into_response();
        assert_eq!(response.headers()["x-flushes"], "2");
        assert_eq!(response.headers()[LINK], "/app.js");
    }

    #[test]
    fn test_concurrent_writes_are_serialized() {
        let writer = Arc::new(ResponseWriter::buffered());
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let writer = writer.clone();
                std::thread::spawn(move || {
                    for _ in 0..50 {
                        writer.write(b"ab").unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let writer = Arc::try_unwrap(writer).unwrap();
        let response = writer.into_response();
        let body = tokio_test::block_on(body_bytes(response));
        assert_eq!(body.len(), 400);
        assert!(body.chunks(2).all(|chunk| chunk == b"ab"));
    }
}
