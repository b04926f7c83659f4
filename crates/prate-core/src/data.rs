//! Per-request scratch data.

use std::any::Any;
use std::collections::HashMap;
use std::fmt;

use prate_router::Params;

use crate::codec::Payload;
use crate::pool::Reset;

/// Data a handler receives alongside the [`RequestCtx`](crate::RequestCtx).
///
/// Holds the matched path parameters, the decoded request payload (for
/// endpoints that declare one), and a free-form map middlewares use to pass
/// values down to handlers.
///
/// # Example
///
/// ```
/// use prate_core::RequestData;
///
/// #[derive(Debug, PartialEq)]
/// struct UserId(u64);
///
/// let mut rd = RequestData::new();
/// rd.set_custom("user", UserId(7));
///
/// assert_eq!(rd.custom::<UserId>("user"), Some(&UserId(7)));
/// assert_eq!(rd.custom::<String>("user"), None);
/// ```
#[derive(Default)]
pub struct RequestData {
    params: Params,
    body: Option<Box<dyn Payload>>,
    custom: HashMap<String, Box<dyn Any + Send + Sync>>,
}

impl RequestData {
    /// Creates empty request data.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Matched path parameters.
    #[must_use]
    pub fn params(&self) -> &Params {
        &self.params
    }

    /// Value of the path parameter `name`.
    #[must_use]
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name)
    }

    /// Replaces the path parameters.
    pub fn set_params(&mut self, params: Params) {
        self.params = params;
    }

    /// The decoded request payload as `T`.
    ///
    /// `None` if the endpoint declared no payload or declared a different type.
    #[must_use]
    pub fn body<T: Any>(&self) -> Option<&T> {
        self.body.as_deref().and_then(|body| body.downcast_ref::<T>())
    }

    /// Mutable variant of [`body`](Self::body).
    pub fn body_mut<T: Any>(&mut self) -> Option<&mut T> {
        self.body
            .as_deref_mut()
            .and_then(|body| body.downcast_mut::<T>())
    }

    /// The decoded request payload without downcasting.
    #[must_use]
    pub fn raw_body(&self) -> Option<&dyn Payload> {
        self.body.as_deref()
    }

    /// Attaches a decoded payload.
    pub fn set_body(&mut self, body: Box<dyn Payload>) {
        self.body = Some(body);
    }

    /// Detaches the payload.
    pub fn take_body(&mut self) -> Option<Box<dyn Payload>> {
        self.body.take()
    }

    /// Stores `value` under `key`, replacing any previous value.
    pub fn set_custom<V>(&mut self, key: impl Into<String>, value: V)
    where
        V: Any + Send + Sync,
    {
        self.custom.insert(key.into(), Box::new(value));
    }

    /// Returns the value under `key` if it is a `V`.
    #[must_use]
    pub fn custom<V: Any>(&self, key: &str) -> Option<&V> {
        self.custom.get(key).and_then(|v| v.downcast_ref::<V>())
    }

    /// Mutable variant of [`custom`](Self::custom).
    pub fn custom_mut<V: Any>(&mut self, key: &str) -> Option<&mut V> {
        self.custom.get_mut(key).and_then(|v| v.downcast_mut::<V>())
    }

    /// Removes and returns the value under `key` if it is a `V`.
    ///
    /// A value of another type is left in place.
    pub fn remove_custom<V: Any>(&mut self, key: &str) -> Option<V> {
        if !self.custom.get(key).is_some_and(|v| v.is::<V>()) {
            return None;
        }
        self.custom
            .remove(key)
            .and_then(|v| v.downcast::<V>().ok())
            .map(|v| *v)
    }

    /// Returns true if anything is stored under `key`.
    #[must_use]
    pub fn contains_custom(&self, key: &str) -> bool {
        self.custom.contains_key(key)
    }

    /// Number of custom entries.
    #[must_use]
    pub fn custom_len(&self) -> usize {
        self.custom.len()
    }
}

impl Reset for RequestData {
    fn reset(&mut self) {
        self.params.clear();
        self.body = None;
        self.custom.clear();
    }
}

impl fmt::Debug for RequestData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestData")
            .field("params", &self.params)
            .field("body", &self.body)
            .field("custom_keys", &self.custom.keys().collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone, PartialEq, prost::Message)]
    struct Note {
        #[prost(string, tag = "1")]
        text: String,
    }

    fn params() -> Params {
        [("name", "sarkar")].into_iter().collect()
    }

    #[test]
    fn test_params_accessors() {
        let mut rd = RequestData::new();
        rd.set_params(params());
        assert_eq!(rd.param("name"), Some("sarkar"));
        assert_eq!(rd.params().len(), 1);
        assert_eq!(rd.param("missing"), None);
    }

    #[test]
    fn test_body_downcast() {
        let mut rd = RequestData::new();
        assert!(rd.body::<Note>().is_none());

        rd.set_body(Box::new(Note {
            text: "hi".to_string(),
        }));
        assert_eq!(rd.body::<Note>().map(|n| n.text.as_str()), Some("hi"));
        assert!(rd.body::<String>().is_none());

        rd.body_mut::<Note>().unwrap().text.push('!');
        assert_eq!(rd.body::<Note>().unwrap().text, "hi!");
    }

    #[test]
    fn test_take_body() {
        let mut rd = RequestData::new();
        rd.set_body(Box::new(Note::default()));
        assert!(rd.take_body().is_some());
        assert!(rd.raw_body().is_none());
    }

    #[test]
    fn test_custom_values() {
        let mut rd = RequestData::new();
        rd.set_custom("count", 3_u32);
        *rd.custom_mut::<u32>("count").unwrap() += 1;
        assert_eq!(rd.custom::<u32>("count"), Some(&4));
        assert!(rd.contains_custom("count"));
        assert_eq!(rd.custom_len(), 1);
    }

    #[test]
    fn test_remove_custom_checks_type() {
        let mut rd = RequestData::new();
        rd.set_custom("token", "abc".to_string());

        assert_eq!(rd.remove_custom::<u32>("token"), None);
        assert!(rd.contains_custom("token"));

        assert_eq!(rd.remove_custom::<String>("token"), Some("abc".to_string()));
        assert!(!rd.contains_custom("token"));
    }

    #[test]
    fn test_reset_clears_everything() {
        let mut rd = RequestData::new();
        rd.set_params(params());
        rd.set_body(Box::new(Note::default()));
        rd.set_custom("k", 1_i32);

        rd.reset();

        assert!(rd.params().is_empty());
        assert!(rd.raw_body().is_none());
        assert_eq!(rd.custom_len(), 0);
    }
}
