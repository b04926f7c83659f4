//! Ordered middleware list and handler composition.

use std::collections::{HashMap, HashSet};

use prate_core::BoxedHandler;
use thiserror::Error;

use crate::middleware::Middleware;

/// Errors raised while building a chain.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MiddlewareError {
    /// The ID is empty or already in use.
    #[error("invalid middleware: {id:?}")]
    Invalid {
        /// The rejected ID.
        id: String,
    },
}

/// An ordered set of uniquely named middlewares.
///
/// Middlewares run in the order they were added: the first one added is the
/// outermost wrapper and sees the request first.
///
/// ```text
/// apply(A, B)   →   A( B( handler ) )
///
/// request  ──▶ A ──▶ B ──▶ handler
/// response ◀── A ◀── B ◀──┘
/// ```
#[derive(Debug, Clone, Default)]
pub struct MiddlewareChain {
    list: Vec<Middleware>,
    index: HashMap<String, usize>,
}

impl MiddlewareChain {
    /// Creates an empty chain.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if `middleware` could be added.
    #[must_use]
    pub fn accepts(&self, middleware: &Middleware) -> bool {
        !middleware.id().is_empty() && !self.index.contains_key(middleware.id())
    }

    /// Appends one middleware.
    pub fn push(&mut self, middleware: Middleware) -> Result<(), MiddlewareError> {
        if !self.accepts(&middleware) {
            tracing::warn!(id = middleware.id(), "rejected middleware");
            return Err(MiddlewareError::Invalid {
                id: middleware.id().to_string(),
            });
        }
        self.index
            .insert(middleware.id().to_string(), self.list.len());
        tracing::debug!(id = middleware.id(), position = self.list.len(), "applied middleware");
        self.list.push(middleware);
        Ok(())
    }

    /// Appends middlewares in order.
    ///
    /// Stops at the first rejected middleware. Everything before it stays
    /// applied.
    pub fn apply<I>(&mut self, middlewares: I) -> Result<(), MiddlewareError>
    where
        I: IntoIterator<Item = Middleware>,
    {
        for middleware in middlewares {
            self.push(middleware)?;
        }
        Ok(())
    }

    /// Wraps `handler` in every middleware not listed in `excluded`.
    ///
    /// Unknown IDs in `excluded` are ignored.
    #[must_use]
    pub fn compose(&self, handler: BoxedHandler, excluded: &[String]) -> BoxedHandler {
        let excluded: HashSet<&str> = excluded.iter().map(String::as_str).collect();
        self.list
            .iter()
            .rev()
            .filter(|middleware| !excluded.contains(middleware.id()))
            .fold(handler, |next, middleware| middleware.wrap(next))
    }

    /// Looks up a middleware by ID.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&Middleware> {
        self.index.get(id).map(|&i| &self.list[i])
    }

    /// Returns true if a middleware with `id` was added.
    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    /// IDs in execution order.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.list.iter().map(Middleware::id)
    }

    /// Number of middlewares.
    #[must_use]
    pub fn len(&self) -> usize {
        self.list.len()
    }

    /// Returns true if no middleware was added.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.list.is_empty()
    }
}
