//! Protobuf messages for tests.
//!
//! Both carry a `key` (tag 1) and a `value` (tag 2).

/// A request payload.
#[derive(Clone, PartialEq, Eq, prost::Message)]
pub struct TestReq {
    /// Field 1.
    #[prost(string, tag = "1")]
    pub key: String,
    /// Field 2.
    #[prost(string, tag = "2")]
    pub value: String,
}

impl TestReq {
    /// Creates a request with both fields set.
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// A response payload.
#[derive(Clone, PartialEq, Eq, prost::Message)]
pub struct TestRes {
    /// Field 1.
    #[prost(string, tag = "1")]
    pub key: String,
    /// Field 2.
    #[prost(string, tag = "2")]
    pub value: String,
}

impl TestRes {
    /// Creates a response with both fields set.
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}
