//! Server error types.

use prate_middleware::MiddlewareError;
use prate_router::RouteError;
use thiserror::Error;

/// Errors raised while configuring or binding an [`App`](crate::App).
#[derive(Debug, Error)]
pub enum AppError {
    /// A middleware was rejected by [`App::apply`](crate::App::apply).
    #[error(transparent)]
    Middleware(#[from] MiddlewareError),

    /// An endpoint could not be added to the router.
    #[error("cannot bind {method} {path}: {source}")]
    Route {
        /// Method of the endpoint.
        method: http::Method,
        /// Path pattern of the endpoint.
        path: String,
        /// Router error.
        #[source]
        source: RouteError,
    },

    /// Serving failed.
    #[error(transparent)]
    Server(#[from] ServerError),
}

/// Errors raised by the listener.
#[derive(Debug, Error)]
pub enum ServerError {
    /// The bind address could not be parsed.
    #[error("invalid address '{addr}': {source}")]
    InvalidAddress {
        /// The configured address.
        addr: String,
        /// Parse error.
        #[source]
        source: std::net::AddrParseError,
    },

    /// Binding the listener failed.
    #[error("failed to bind to {addr}: {source}")]
    Bind {
        /// The address.
        addr: std::net::SocketAddr,
        /// I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Any other I/O error.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_route_error_display() {
        let err = AppError::Route {
            method: http::Method::GET,
            path: "/a".to_string(),
            source: RouteError::Duplicate {
                method: http::Method::GET,
                path: "/a".to_string(),
            },
        };
        assert!(err.to_string().starts_with("cannot bind GET /a: "));
    }

    #[test]
    fn test_middleware_error_is_transparent() {
        let err = AppError::from(MiddlewareError::Invalid { id: "x".to_string() });
        assert_eq!(err.to_string(), "invalid middleware: \"x\"");
    }

    #[test]
    fn test_invalid_address_display() {
        let source = "nope".parse::<std::net::SocketAddr>().unwrap_err();
        let err = ServerError::InvalidAddress {
            addr: "nope".to_string(),
            source,
        };
        assert!(err.to_string().starts_with("invalid address 'nope'"));
    }
}
