//! Test response wrapper.

use std::fmt;

use bytes::Bytes;
use http::{header, HeaderMap, HeaderValue, StatusCode};
use http_body_util::BodyExt;
use prate_core::codec;

use crate::error::TestError;

/// A fully read response with assertion helpers.
pub struct TestResponse {
    status: StatusCode,
    headers: HeaderMap,
    body: Bytes,
}

impl TestResponse {
    /// Reads `response` to the end.
    ///
    /// # Errors
    ///
    /// Returns [`TestError::BodyRead`] if the body fails.
    pub async fn from_http<B>(response: http::Response<B>) -> Result<Self, TestError>
    where
        B: hyper::body::Body<Data = Bytes>,
        B::Error: fmt::Display,
    {
        let (parts, body) = response.into_parts();
        let body = body
            .collect()
            .await
            .map_err(|e| TestError::BodyRead(e.to_string()))?
            .to_bytes();

        Ok(Self::new(parts.status, parts.headers, body))
    }

    /// Creates a response from its parts.
    pub fn new(status: StatusCode, headers: HeaderMap, body: Bytes) -> Self {
        Self {
            status,
            headers,
            body,
        }
    }

    /// The status code.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// The headers.
    #[must_use]
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// A header value by name.
    #[must_use]
    pub fn header(&self, name: impl AsRef<str>) -> Option<&HeaderValue> {
        self.headers.get(name.as_ref())
    }

    /// A header value as a string.
    #[must_use]
    pub fn header_str(&self, name: impl AsRef<str>) -> Option<&str> {
        self.header(name).and_then(|v| v.to_str().ok())
    }

    /// The `Content-Type` header.
    #[must_use]
    pub fn content_type(&self) -> Option<&str> {
        self.header_str(header::CONTENT_TYPE.as_str())
    }

    /// The raw body.
    #[must_use]
    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// The body as UTF-8 text.
    ///
    /// # Errors
    ///
    /// Returns [`TestError::BodyRead`] if the body is not UTF-8.
    pub fn text(&self) -> Result<String, TestError> {
        String::from_utf8(self.body.to_vec())
            .map_err(|e| TestError::BodyRead(format!("Invalid UTF-8: {e}")))
    }

    /// Decodes the body as a protobuf message.
    ///
    /// # Errors
    ///
    /// Returns [`TestError::Codec`] if decoding fails.
    pub fn proto<M: prost::Message + Default>(&self) -> Result<M, TestError> {
        Ok(codec::decode(&self.body)?)
    }

    /// Asserts the status code.
    ///
    /// # Panics
    ///
    /// Panics if the status code doesn't match.
    #[track_caller]
    pub fn assert_status(&self, expected: StatusCode) -> &Self {
        assert_eq!(
            self.status,
            expected,
            "Expected status {expected}, got {} with body {:?}",
            self.status,
            String::from_utf8_lossy(&self.body)
        );
        self
    }

    /// Asserts that a header is present with `expected` as its value.
    ///
    /// # Panics
    ///
    /// Panics if the header is missing or differs.
    #[track_caller]
    pub fn assert_header(&self, name: impl AsRef<str>, expected: impl AsRef<str>) -> &Self {
        let name = name.as_ref();
        let expected = expected.as_ref();
        let actual = self
            .header_str(name)
            .unwrap_or_else(|| panic!("Header '{name}' not found"));
        assert_eq!(actual, expected, "Header '{name}'");
        self
    }

    /// Asserts that a header is absent.
    ///
    /// # Panics
    ///
    /// Panics if the header is present.
    #[track_caller]
    pub fn assert_no_header(&self, name: impl AsRef<str>) -> &Self {
        let name = name.as_ref();
        assert!(
            self.header(name).is_none(),
            "Header '{name}' should be absent, got {:?}",
            self.header(name)
        );
        self
    }

    /// Asserts the body text.
    ///
    /// # Panics
    ///
    /// Panics if the body is not UTF-8 or differs.
    #[track_caller]
    pub fn assert_text(&self, expected: impl AsRef<str>) -> &Self {
        let body = self.text().unwrap_or_else(|e| panic!("{e}"));
        assert_eq!(body, expected.as_ref(), "Body mismatch");
        self
    }

    /// Asserts that the body decodes to `expected`.
    ///
    /// # Panics
    ///
    /// Panics if decoding fails or the message differs.
    #[track_caller]
    pub fn assert_proto<M>(&self, expected: &M) -> &Self
    where
        M: prost::Message + Default + PartialEq,
    {
        let actual: M = self.proto().unwrap_or_else(|e| panic!("{e}"));
        assert_eq!(&actual, expected, "Protobuf body mismatch");
        self
    }
}

impl fmt::Debug for TestResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TestResponse")
            .field("status", &self.status)
            .field("headers", &self.headers)
            .field("body_len", &self.body.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::TestRes;

    fn response(status: StatusCode, content_type: Option<&'static str>, body: Bytes) -> TestResponse {
        let mut headers = HeaderMap::new();
        if let Some(ct) = content_type {
            headers.insert(header::CONTENT_TYPE, HeaderValue::from_static(ct));
        }
        TestResponse::new(status, headers, body)
    }

    #[test]
    fn test_text_assertions() {
        let res = response(
            StatusCode::BAD_REQUEST,
            Some("text/plain; charset=utf-8"),
            Bytes::from_static(b"empty payload"),
        );
        res.assert_status(StatusCode::BAD_REQUEST)
            .assert_header("content-type", "text/plain; charset=utf-8")
            .assert_text("empty payload");
    }

    #[test]
    fn test_proto_decoding() {
        let message = TestRes::new("name", "sarkar");
        let body = Bytes::from(codec::encode(&message).unwrap());
        let res = response(StatusCode::OK, None, body);

        res.assert_proto(&message).assert_no_header("content-type");
        assert_eq!(res.proto::<TestRes>().unwrap().value, "sarkar");
    }

    #[test]
    fn test_invalid_proto() {
        let res = response(StatusCode::OK, None, Bytes::from_static(&[0x0a, 0xff]));
        assert!(matches!(res.proto::<TestRes>(), Err(TestError::Codec(_))));
    }

    #[test]
    #[should_panic(expected = "Expected status 200 OK")]
    fn test_assert_status_panics() {
        response(StatusCode::NOT_FOUND, None, Bytes::new()).assert_status(StatusCode::OK);
    }
}
