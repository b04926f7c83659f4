//! Per-path method table.
//!
//! A [`MethodRouter`] holds the value registered for each HTTP method at a
//! single path. Any method is accepted, not only the standard verbs.

use http::Method;

/// Maps HTTP methods to routed values for one path.
///
/// # Example
///
/// ```rust
/// use prate_router::MethodRouter;
/// use http::Method;
///
/// let mut methods = MethodRouter::new();
/// methods.insert(Method::GET, 0_usize).unwrap();
/// methods.insert(Method::POST, 1).unwrap();
///
/// assert_eq!(methods.get(&Method::GET), Some(&0));
/// assert_eq!(methods.get(&Method::DELETE), None);
/// ```
#[derive(Debug, Clone)]
pub struct MethodRouter<T> {
    entries: Vec<(Method, T)>,
}

impl<T> Default for MethodRouter<T> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
        }
    }
}

impl<T> MethodRouter<T> {
    /// Creates an empty method table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `value` for `method`.
    ///
    /// Returns the value back if the method is already taken; the existing
    /// registration is left untouched.
    pub fn insert(&mut self, method: Method, value: T) -> Result<(), T> {
        if self.entries.iter().any(|(m, _)| *m == method) {
            return Err(value);
        }
        self.entries.push((method, value));
        Ok(())
    }

    /// Returns the value registered for `method`.
    #[must_use]
    pub fn get(&self, method: &Method) -> Option<&T> {
        self.entries
            .iter()
            .find(|(m, _)| m == method)
            .map(|(_, v)| v)
    }

    /// Returns true if no method is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the number of registered methods.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Iterates over the registered methods in registration order.
    pub fn methods(&self) -> impl Iterator<Item = &Method> {
        self.entries.iter().map(|(m, _)| m)
    }

    /// Methods a client may use on this path instead of `requested`.
    ///
    /// `requested` and `OPTIONS` are skipped while collecting; `OPTIONS` is
    /// then appended whenever anything else is available. The result is sorted
    /// by method name, which is the order used for the `Allow` header.
    #[must_use]
    pub fn allowed(&self, requested: &Method) -> Vec<Method> {
        let mut allowed: Vec<Method> = self
            .methods()
            .filter(|m| *m != requested && **m != Method::OPTIONS)
            .cloned()
            .collect();
        if !allowed.is_empty() {
            allowed.push(Method::OPTIONS);
        }
        allowed.sort_by(|a, b| a.as_str().cmp(b.as_str()));
        allowed
    }
}
