//! Error types for prate.
//!
//! Handlers return [`anyhow::Result`]. Errors that should reach the client
//! with a specific status are expressed as [`Error`]; anything else is
//! reported as a plain 500. [`error_status`] is the single place where an
//! error is turned into a status and body.
//!
//! | Error | Status | Body |
//! |---|---|---|
//! | [`Error`] | `code` | message lines joined by `\n` |
//! | [`DispatchError`] | 400 or 500 | fixed short message |
//! | anything else | 500 | `Internal Server Error` |

use std::fmt;

use http::StatusCode;
use thiserror::Error;

use crate::codec::CodecError;

/// An error carrying the HTTP status the client should see.
///
/// # Example
///
/// ```
/// use prate_core::Error;
/// use http::StatusCode;
///
/// let err = Error::new(StatusCode::NOT_FOUND);
/// assert_eq!(err.to_string(), "Not Found");
///
/// let err = Error::with_message(StatusCode::CONFLICT, ["version mismatch", "retry"]);
/// assert_eq!(err.to_string(), "version mismatch\nretry");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Error {
    code: StatusCode,
    message: Vec<String>,
}

impl Error {
    /// Creates an error whose message is the status's reason phrase.
    #[must_use]
    pub fn new(code: StatusCode) -> Self {
        Self::with_message(code, std::iter::empty::<String>())
    }

    /// Creates an error with explicit message lines.
    ///
    /// An empty list falls back to the reason phrase. Status codes without a
    /// known reason phrase get an empty message.
    pub fn with_message<I, S>(code: StatusCode, lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut message: Vec<String> = lines.into_iter().map(Into::into).collect();
        if message.is_empty() {
            if let Some(reason) = code.canonical_reason() {
                message.push(reason.to_string());
            }
        }
        Self { code, message }
    }

    /// 400 with a single message line.
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::with_message(StatusCode::BAD_REQUEST, [message])
    }

    /// 401 with a single message line.
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::with_message(StatusCode::UNAUTHORIZED, [message])
    }

    /// 403 with a single message line.
    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::with_message(StatusCode::FORBIDDEN, [message])
    }

    /// 404 with a single message line.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::with_message(StatusCode::NOT_FOUND, [message])
    }

    /// 409 with a single message line.
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::with_message(StatusCode::CONFLICT, [message])
    }

    /// 500 with a single message line.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::with_message(StatusCode::INTERNAL_SERVER_ERROR, [message])
    }

    /// Status sent to the client.
    #[must_use]
    pub const fn code(&self) -> StatusCode {
        self.code
    }

    /// Message lines in order.
    #[must_use]
    pub fn message(&self) -> &[String] {
        &self.message
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message.join("\n"))
    }
}

impl std::error::Error for Error {}

/// Failures detected by the pipeline itself, outside of the handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum DispatchError {
    /// The endpoint expects a payload but the body was empty.
    #[error("empty payload")]
    EmptyPayload,

    /// The body could not be decoded as the declared payload type.
    #[error("invalid payload")]
    InvalidPayload,

    /// Reading the body failed or timed out.
    #[error("connection error")]
    Connection,

    /// The handler's payload could not be encoded.
    #[error("Internal Server Error")]
    Encode,
}

impl DispatchError {
    /// Status sent to the client.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::EmptyPayload | Self::InvalidPayload | Self::Connection => StatusCode::BAD_REQUEST,
            Self::Encode => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<CodecError> for DispatchError {
    fn from(err: CodecError) -> Self {
        match err {
            CodecError::Encode(_) => Self::Encode,
            CodecError::Decode(_) => Self::InvalidPayload,
        }
    }
}

/// Errors returned by optional [`ResponseWriter`](crate::ResponseWriter)
/// capabilities.
#[derive(Debug, Error)]
pub enum WriterError {
    /// The underlying sink cannot hand over the connection.
    #[error("response writer is not a hijacker")]
    NotHijacker,

    /// The underlying sink cannot push resources.
    #[error("response writer is not a pusher")]
    NotPusher,

    /// The underlying sink failed to accept bytes.
    #[error("response write failed: {0}")]
    Io(#[from] std::io::Error),
}

/// Maps any handler error to the status and body written to the client.
///
/// # Example
///
/// ```
/// use prate_core::{error_status, Error};
/// use http::StatusCode;
///
/// let err = anyhow::Error::new(Error::not_found("no such user"));
/// assert_eq!(error_status(&err), (StatusCode::NOT_FOUND, "no such user".to_string()));
///
/// let err = anyhow::anyhow!("database is on fire");
/// assert_eq!(
///     error_status(&err),
///     (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error".to_string())
/// );
/// ```
#[must_use]
pub fn error_status(err: &anyhow::Error) -> (StatusCode, String) {
    if let Some(e) = err.downcast_ref::<Error>() {
        return (e.code(), e.to_string());
    }
    if let Some(e) = err.downcast_ref::<DispatchError>() {
        return (e.status_code(), e.to_string());
    }
    let code = StatusCode::INTERNAL_SERVER_ERROR;
    (code, code.canonical_reason().unwrap_or_default().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_uses_reason_phrase() {
        let err = Error::new(StatusCode::BAD_REQUEST);
        assert_eq!(err.code(), StatusCode::BAD_REQUEST);
        assert_eq!(err.message(), ["Bad Request".to_string()]);
    }

    #[test]
    fn test_unknown_status_has_empty_message() {
        let code = StatusCode::from_u16(599).unwrap();
        let err = Error::new(code);
        assert!(err.message().is_empty());
        assert_eq!(err.to_string(), "");
    }

    #[test]
    fn test_message_lines_joined() {
        let err = Error::with_message(StatusCode::UNPROCESSABLE_ENTITY, ["a", "b", "c"]);
        assert_eq!(err.to_string(), "a\nb\nc");
    }

    #[test]
    fn test_convenience_constructors() {
        assert_eq!(Error::bad_request("x").code(), StatusCode::BAD_REQUEST);
        assert_eq!(Error::unauthorized("x").code(), StatusCode::UNAUTHORIZED);
        assert_eq!(Error::forbidden("x").code(), StatusCode::FORBIDDEN);
        assert_eq!(Error::not_found("x").code(), StatusCode::NOT_FOUND);
        assert_eq!(Error::conflict("x").code(), StatusCode::CONFLICT);
        assert_eq!(Error::internal("x").code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_dispatch_error_messages() {
        assert_eq!(DispatchError::EmptyPayload.to_string(), "empty payload");
        assert_eq!(DispatchError::InvalidPayload.to_string(), "invalid payload");
        assert_eq!(DispatchError::Connection.to_string(), "connection error");
        assert_eq!(
            DispatchError::Encode.status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_error_status_domain_error() {
        let err = anyhow::Error::new(Error::with_message(StatusCode::IM_A_TEAPOT, ["short", "stout"]));
        assert_eq!(
            error_status(&err),
            (StatusCode::IM_A_TEAPOT, "short\nstout".to_string())
        );
    }

    #[test]
    fn test_error_status_through_context() {
        let err = anyhow::Error::new(Error::forbidden("nope")).context("loading profile");
        assert_eq!(error_status(&err).0, StatusCode::FORBIDDEN);
    }

    #[test]
    fn test_error_status_dispatch_error() {
        let err = anyhow::Error::new(DispatchError::InvalidPayload);
        assert_eq!(
            error_status(&err),
            (StatusCode::BAD_REQUEST, "invalid payload".to_string())
        );
    }

    #[test]
    fn test_error_status_unclassified() {
        let err = anyhow::anyhow!("secret detail");
        let (code, body) = error_status(&err);
        assert_eq!(code, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, "Internal Server Error");
    }

    #[test]
    fn test_writer_error_display() {
        assert_eq!(
            WriterError::NotHijacker.to_string(),
            "response writer is not a hijacker"
        );
        assert_eq!(WriterError::NotPusher.to_string(), "response writer is not a pusher");
    }
}
