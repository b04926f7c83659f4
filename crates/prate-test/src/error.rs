//! Test error types.

use prate_core::CodecError;
use thiserror::Error;

/// Errors raised by the test client.
#[derive(Debug, Error)]
pub enum TestError {
    /// The request could not be built.
    #[error("Request build error: {0}")]
    RequestBuild(String),

    /// A header name or value is invalid.
    #[error("Invalid header: {0}")]
    InvalidHeader(String),

    /// The response body could not be read.
    #[error("Body read error: {0}")]
    BodyRead(String),

    /// A protobuf body could not be encoded or decoded.
    #[error("Codec error: {0}")]
    Codec(#[from] CodecError),
}
