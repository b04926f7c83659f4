//! Handlers for requests that match no endpoint, and for panics.
//!
//! | Situation | Default response |
//! |---|---|
//! | no route for the path | 404 `404 page not found` |
//! | path known, method not | 405 `Method Not Allowed` + `Allow` |
//! | `OPTIONS` on a known path | 200, empty, `Allow` |
//! | handler panicked | 500 `Internal Server Error` |

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use bytes::Bytes;
use http::request::Parts;
use http::{Method, Response, StatusCode, Uri};
use http_body_util::Full;
use prate_core::BoxedHandler;

use crate::dispatch::text_response;

/// A handler that builds the response directly from the request head.
pub type RawHandler = Arc<dyn Fn(&Parts) -> Response<Full<Bytes>> + Send + Sync>;

/// A handler for panics raised by endpoint handlers.
pub type PanicHandler = Arc<dyn Fn(&PanicInfo) -> Response<Full<Bytes>> + Send + Sync>;

/// What is known about a request whose handler panicked.
#[derive(Debug, Clone)]
pub struct PanicInfo {
    /// Request method.
    pub method: Method,
    /// Request URI.
    pub uri: Uri,
    /// Panic message, when it was a string.
    pub message: String,
}

impl PanicInfo {
    pub(crate) fn new(method: Method, uri: Uri, payload: &(dyn Any + Send)) -> Self {
        let message = if let Some(s) = payload.downcast_ref::<&str>() {
            (*s).to_string()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else {
            "unknown panic".to_string()
        };
        Self {
            method,
            uri,
            message,
        }
    }
}

/// How automatic `OPTIONS` requests are answered.
#[derive(Clone)]
pub(crate) enum OptionsHandler {
    Raw(RawHandler),
    /// Runs through the pipeline like an endpoint without middlewares.
    Pipeline(BoxedHandler),
}

/// Router behaviour for unmatched requests.
#[derive(Clone)]
pub(crate) struct Fallbacks {
    pub(crate) handle_method_not_allowed: bool,
    pub(crate) handle_options: bool,
    pub(crate) method_not_allowed: Option<RawHandler>,
    pub(crate) options: Option<OptionsHandler>,
    pub(crate) not_found: Option<RawHandler>,
    pub(crate) panic: Option<PanicHandler>,
}

impl Default for Fallbacks {
    fn default() -> Self {
        Self {
            handle_method_not_allowed: true,
            handle_options: true,
            method_not_allowed: None,
            options: None,
            not_found: None,
            panic: None,
        }
    }
}

impl Fallbacks {
    pub(crate) fn not_found(&self, head: &Parts) -> Response<Full<Bytes>> {
        match &self.not_found {
            Some(handler) => handler(head),
            None => text_response(StatusCode::NOT_FOUND, "404 page not found".to_string()),
        }
    }

    pub(crate) fn method_not_allowed(&self, head: &Parts) -> Response<Full<Bytes>> {
        match &self.method_not_allowed {
            Some(handler) => handler(head),
            None => text_response(
                StatusCode::METHOD_NOT_ALLOWED,
                reason(StatusCode::METHOD_NOT_ALLOWED),
            ),
        }
    }

    pub(crate) fn panicked(&self, info: &PanicInfo) -> Response<Full<Bytes>> {
        tracing::error!(
            method = %info.method,
            uri = %info.uri,
            panic = %info.message,
            "handler panicked"
        );
        match &self.panic {
            Some(handler) => handler(info),
            None => text_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                reason(StatusCode::INTERNAL_SERVER_ERROR),
            ),
        }
    }
}

impl fmt::Debug for Fallbacks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Fallbacks")
            .field("handle_method_not_allowed", &self.handle_method_not_allowed)
            .field("handle_options", &self.handle_options)
            .field("method_not_allowed", &self.method_not_allowed.is_some())
            .field("options", &self.options.is_some())
            .field("not_found", &self.not_found.is_some())
            .field("panic", &self.panic.is_some())
            .finish()
    }
}

fn reason(status: StatusCode) -> String {
    status.canonical_reason().unwrap_or_default().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;

    fn head() -> Parts {
        http::Request::new(()).into_parts().0
    }

    async fn body_of(response: Response<Full<Bytes>>) -> String {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_default_not_found() {
        let response = Fallbacks::default().not_found(&head());
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(body_of(response).await, "404 page not found");
    }

    #[tokio::test]
    async fn test_default_method_not_allowed() {
        let response = Fallbacks::default().method_not_allowed(&head());
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(body_of(response).await, "Method Not Allowed");
    }

    #[test]
    fn test_custom_not_found() {
        let fallbacks = Fallbacks {
            not_found: Some(Arc::new(|_head: &Parts| {
                let mut response = Response::new(Full::new(Bytes::from_static(b"nope")));
                *response.status_mut() = StatusCode::GONE;
                response
            })),
            ..Fallbacks::default()
        };
        assert_eq!(fallbacks.not_found(&head()).status(), StatusCode::GONE);
    }

    #[test]
    fn test_panic_message_extraction() {
        let info = PanicInfo::new(Method::GET, Uri::from_static("/x"), &"boom");
        assert_eq!(info.message, "boom");

        let owned: Box<dyn Any + Send> = Box::new(String::from("owned boom"));
        let info = PanicInfo::new(Method::GET, Uri::from_static("/x"), owned.as_ref());
        assert_eq!(info.message, "owned boom");

        let info = PanicInfo::new(Method::GET, Uri::from_static("/x"), &42_u8);
        assert_eq!(info.message, "unknown panic");
    }

    #[test]
    fn test_default_panic_response() {
        let info = PanicInfo::new(Method::GET, Uri::from_static("/x"), &"boom");
        let response = Fallbacks::default().panicked(&info);
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
