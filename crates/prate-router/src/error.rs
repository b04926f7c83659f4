//! Route registration errors.

use http::Method;
use thiserror::Error;

/// Errors raised while inserting a route into the tree.
///
/// Matching never fails with an error; only registration does.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RouteError {
    /// The same method is already registered for the path.
    #[error("duplicate route: {method} {path}")]
    Duplicate {
        /// The conflicting method.
        method: Method,
        /// The path pattern as given.
        path: String,
    },

    /// A catch-all segment is followed by more segments.
    #[error("catch-all must be the last segment in '{path}'")]
    WildcardNotLast {
        /// The path pattern as given.
        path: String,
    },

    /// Two routes name the same parameter position differently.
    #[error("parameter ':{new}' conflicts with existing ':{existing}' in '{path}'")]
    ConflictingParam {
        /// Name already registered at this position.
        existing: String,
        /// Name in the rejected pattern.
        new: String,
        /// The path pattern as given.
        path: String,
    },

    /// A parameter or catch-all segment has no name.
    #[error("unnamed parameter in '{path}'")]
    UnnamedParam {
        /// The path pattern as given.
        path: String,
    },
}
