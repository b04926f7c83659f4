//! Test request building.

use bytes::Bytes;
use http::{header, HeaderMap, HeaderName, HeaderValue, Method, Request};
use http_body_util::Full;
use prate_core::{codec, ContentType};

use crate::error::TestError;

/// Builder for requests sent through a [`TestClient`](crate::TestClient).
///
/// Errors from invalid headers or bodies are kept until
/// [`build`](Self::build), so calls can be chained.
#[must_use]
#[derive(Debug)]
pub struct TestRequestBuilder {
    method: Method,
    uri: String,
    headers: HeaderMap,
    body: Bytes,
    error: Option<TestError>,
}

impl TestRequestBuilder {
    /// Creates a request builder.
    pub fn new(method: Method, uri: impl AsRef<str>) -> Self {
        Self {
            method,
            uri: uri.as_ref().to_string(),
            headers: HeaderMap::new(),
            body: Bytes::new(),
            error: None,
        }
    }

    /// Appends a header.
    pub fn header(mut self, name: impl AsRef<str>, value: impl AsRef<str>) -> Self {
        let name = HeaderName::try_from(name.as_ref());
        let value = HeaderValue::try_from(value.as_ref());
        match (name, value) {
            (Ok(name), Ok(value)) => {
                self.headers.append(name, value);
            }
            (Err(e), _) => self.fail(TestError::InvalidHeader(e.to_string())),
            (_, Err(e)) => self.fail(TestError::InvalidHeader(e.to_string())),
        }
        self
    }

    /// Sets the `Content-Type` header.
    pub fn content_type(self, content_type: impl AsRef<str>) -> Self {
        self.header(header::CONTENT_TYPE.as_str(), content_type)
    }

    /// Sets the raw body.
    pub fn body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    /// Sets a protobuf body and the matching `Content-Type`.
    pub fn proto<M: prost::Message>(mut self, message: &M) -> Self {
        match codec::encode(message) {
            Ok(bytes) => self.body = Bytes::from(bytes),
            Err(e) => self.fail(e.into()),
        }
        self.content_type(ContentType::PROTO.as_str())
    }

    fn fail(&mut self, err: TestError) {
        self.error.get_or_insert(err);
    }

    /// Builds the request.
    ///
    /// # Errors
    ///
    /// Returns the first error recorded while building, or
    /// [`TestError::RequestBuild`] if the URI is invalid.
    pub fn build(self) -> Result<Request<Full<Bytes>>, TestError> {
        if let Some(err) = self.error {
            return Err(err);
        }

        let mut request = Request::builder()
            .method(self.method)
            .uri(&self.uri)
            .body(Full::new(self.body))
            .map_err(|e| TestError::RequestBuild(format!("{}: {e}", self.uri)))?;
        *request.headers_mut() = self.headers;
        Ok(request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::TestReq;
    use http_body_util::BodyExt;

    #[test]
    fn test_method_and_uri() {
        let request = TestRequestBuilder::new(Method::PUT, "/items/1?x=2")
            .build()
            .unwrap();
        assert_eq!(request.method(), Method::PUT);
        assert_eq!(request.uri().path(), "/items/1");
        assert_eq!(request.uri().query(), Some("x=2"));
    }

    #[test]
    fn test_repeated_headers_are_kept() {
        let request = TestRequestBuilder::new(Method::GET, "/")
            .header("x-forwarded-for", "1.2.3.4")
            .header("x-forwarded-for", "5.6.7.8")
            .build()
            .unwrap();
        assert_eq!(request.headers().get_all("x-forwarded-for").iter().count(), 2);
    }

    #[test]
    fn test_invalid_header_reported_on_build() {
        let result = TestRequestBuilder::new(Method::GET, "/")
            .header("bad header", "x")
            .build();
        assert!(matches!(result, Err(TestError::InvalidHeader(_))));
    }

    #[test]
    fn test_invalid_uri() {
        let result = TestRequestBuilder::new(Method::GET, "http://[::1").build();
        assert!(matches!(result, Err(TestError::RequestBuild(_))));
    }

    #[tokio::test]
    async fn test_proto_body() {
        let message = TestReq::new("k", "v");
        let request = TestRequestBuilder::new(Method::POST, "/")
            .proto(&message)
            .build()
            .unwrap();

        assert_eq!(
            request.headers()[header::CONTENT_TYPE],
            "application/vnd.google.protobuf"
        );
        let body = request.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(codec::decode::<TestReq>(&body).unwrap(), message);
    }
}
