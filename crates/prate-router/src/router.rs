//! Route table keyed by method and path pattern.

use http::Method;

use crate::error::RouteError;
use crate::method_router::MethodRouter;
use crate::node::Node;
use crate::params::Params;
use crate::RouteMatch;

/// Radix tree router mapping `(method, path)` to a value of type `T`.
///
/// The value is whatever the caller wants to dispatch to; the server stores
/// an index into its endpoint table.
///
/// # Example
///
/// ```rust
/// use prate_router::Router;
/// use http::Method;
///
/// let mut router = Router::new();
/// router.insert(Method::GET, "/users/:id", "getUser").unwrap();
///
/// let found = router.match_route(&Method::GET, "/users/123").unwrap();
/// assert_eq!(*found.value, "getUser");
/// assert_eq!(found.params.get("id"), Some("123"));
/// ```
///
/// # Route Priority
///
/// 1. Static segments (`/users/me`)
/// 2. Parameter segments (`/users/:id`)
/// 3. Catch-all segments (`/files/*path`)
///
/// A failed deeper match falls back to the next candidate, so `/users/me/x`
/// can still reach `/users/:id/x`.
#[derive(Debug, Clone)]
pub struct Router<T> {
    root: Node<T>,
    route_count: usize,
}

impl<T> Default for Router<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Router<T> {
    /// Creates an empty router.
    #[must_use]
    pub fn new() -> Self {
        Self {
            root: Node::root(),
            route_count: 0,
        }
    }

    /// Registers `value` for `method` on `path`.
    ///
    /// # Errors
    ///
    /// Returns a [`RouteError`] when the pattern is malformed or the method is
    /// already registered for an equivalent pattern.
    pub fn insert(&mut self, method: Method, path: &str, value: T) -> Result<(), RouteError> {
        self.root.insert(method, path, value)?;
        self.route_count += 1;
        Ok(())
    }

    /// Looks up the value for `method` on `path`.
    #[must_use]
    pub fn match_route(&self, method: &Method, path: &str) -> Option<RouteMatch<'_, T>> {
        let (methods, params) = self.root.match_path(path)?;
        let value = methods.get(method)?;
        Some(RouteMatch::new(value, params))
    }

    /// Looks up the method table for `path` regardless of method.
    #[must_use]
    pub fn match_path(&self, path: &str) -> Option<(&MethodRouter<T>, Params)> {
        self.root.match_path(path)
    }

    /// Methods registered on `path` other than `requested`, plus `OPTIONS`.
    ///
    /// Empty when the path is unknown or `requested` is the only method.
    #[must_use]
    pub fn allowed_methods(&self, path: &str, requested: &Method) -> Vec<Method> {
        self.root
            .match_path(path)
            .map(|(methods, _)| methods.allowed(requested))
            .unwrap_or_default()
    }

    /// Every method registered on any path, plus `OPTIONS`, sorted.
    ///
    /// Used to answer `OPTIONS *`.
    #[must_use]
    pub fn all_methods(&self) -> Vec<Method> {
        let mut all: Vec<Method> = Vec::new();
        self.root.for_each_route(&mut |methods| {
            for m in methods.methods() {
                if *m != Method::OPTIONS && !all.contains(m) {
                    all.push(m.clone());
                }
            }
        });
        if !all.is_empty() {
            all.push(Method::OPTIONS);
        }
        all.sort_by(|a, b| a.as_str().cmp(b.as_str()));
        all
    }

    /// Number of `(method, path)` registrations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.route_count
    }

    /// Returns true if nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.route_count == 0
    }
}
