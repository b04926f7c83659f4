//! Radix tree router for prate.
//!
//! Routes map an HTTP method and a path pattern to a value of the caller's
//! choosing. Patterns are split on `/` and each segment is one of:
//!
//! - a literal (`users`)
//! - a named parameter (`:id` or `{id}`)
//! - a trailing catch-all (`*path`), which captures the rest of the path
//!
//! # Example
//!
//! ```rust
//! use prate_router::Router;
//! use http::Method;
//!
//! let mut router = Router::new();
//! router.insert(Method::GET, "/:name", 0_usize).unwrap();
//! router.insert(Method::GET, "/files/*path", 1).unwrap();
//!
//! let found = router.match_route(&Method::GET, "/sarkar").unwrap();
//! assert_eq!(*found.value, 0);
//! assert_eq!(found.params.get("name"), Some("sarkar"));
//!
//! let found = router.match_route(&Method::GET, "/files/a/b.txt").unwrap();
//! assert_eq!(found.params.get("path"), Some("a/b.txt"));
//! ```
//!
//! # Layout
//!
//! ```text
//!                    (root)
//!                      │
//!              ┌───────┴───────┐
//!            "users"        "files"
//!              │               │
//!        ┌─────┴─────┐      "*path"
//!      (leaf)      ":id"       │
//!    [GET,POST]      │       (leaf)
//!                  (leaf)    [GET]
//!               [GET,DELETE]
//! ```

#![doc(html_root_url = "https://docs.rs/prate-router/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod error;
mod method_router;
mod node;
mod params;
mod router;

pub use error::RouteError;
pub use method_router::MethodRouter;
pub use node::{Node, SegmentKind};
pub use params::Params;
pub use router::Router;

/// A matched route: the registered value and the extracted parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteMatch<'a, T> {
    /// Value registered for the route.
    pub value: &'a T,
    /// Parameters in match order.
    pub params: Params,
}

impl<'a, T> RouteMatch<'a, T> {
    /// Creates a new route match.
    #[must_use]
    pub fn new(value: &'a T, params: Params) -> Self {
        Self { value, params }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::Method;
    use proptest::prelude::*;

    #[test]
    fn test_basic_routing() {
        let mut router = Router::new();
        router.insert(Method::GET, "/users", "listUsers").unwrap();
        router.insert(Method::GET, "/users/:id", "getUser").unwrap();

        let m = router.match_route(&Method::GET, "/users").unwrap();
        assert_eq!(*m.value, "listUsers");
        assert!(m.params.is_empty());

        let m = router.match_route(&Method::GET, "/users/123").unwrap();
        assert_eq!(*m.value, "getUser");
        assert_eq!(m.params.get("id"), Some("123"));
    }

    #[test]
    fn test_no_match() {
        let mut router = Router::new();
        router.insert(Method::GET, "/users", "listUsers").unwrap();

        assert!(router.match_route(&Method::GET, "/posts").is_none());
    }

    proptest! {
        #[test]
        fn prop_param_captures_any_segment(segment in "[a-zA-Z0-9_.~-]{1,24}") {
            let mut router = Router::new();
            router.insert(Method::GET, "/items/:item", ()).unwrap();

            let path = format!("/items/{segment}");
            let m = router.match_route(&Method::GET, &path).unwrap();
            prop_assert_eq!(m.params.get("item"), Some(segment.as_str()));
        }

        #[test]
        fn prop_static_route_wins_only_on_exact_segment(segment in "[a-z]{1,12}") {
            let mut router = Router::new();
            router.insert(Method::GET, "/users/me", "me").unwrap();
            router.insert(Method::GET, "/users/:id", "user").unwrap();

            let path = format!("/users/{segment}");
            let m = router.match_route(&Method::GET, &path).unwrap();
            let expected = if segment == "me" { "me" } else { "user" };
            prop_assert_eq!(*m.value, expected);
        }
    }
}
