//! Protobuf payload codec.
//!
//! Request and response bodies are protocol buffer messages generated by
//! `prost`. The pipeline only knows the declared message type at bind time, so
//! messages travel through it as `Box<dyn Payload>`, an object-safe view of
//! [`prost::Message`] that also supports downcasting back to the concrete type.
//!
//! # Example
//!
//! ```rust
//! use prate_core::{Payload, codec};
//!
//! #[derive(Clone, PartialEq, prost::Message)]
//! struct Greeting {
//!     #[prost(string, tag = "1")]
//!     text: String,
//! }
//!
//! let bytes = codec::encode(&Greeting { text: "hi".into() }).unwrap();
//!
//! let mut erased: Box<dyn Payload> = Box::new(Greeting::default());
//! erased.merge_payload(&bytes).unwrap();
//! assert_eq!(erased.downcast_ref::<Greeting>().unwrap().text, "hi");
//! ```

use std::any::Any;
use std::fmt;

use crate::pool::Reset;

/// Error type for codec operations.
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    /// Failed to encode a message to bytes.
    #[error("encode error: {0}")]
    Encode(#[from] prost::EncodeError),

    /// Failed to decode bytes to a message.
    #[error("decode error: {0}")]
    Decode(#[from] prost::DecodeError),
}

/// A type-erased protobuf message.
///
/// Implemented for every `prost` message; there is no need to implement it by
/// hand.
pub trait Payload: Any + Send + Sync + fmt::Debug {
    /// Serializes the message.
    fn encode_payload(&self) -> Result<Vec<u8>, CodecError>;

    /// Merges `buf` into the message. Decoding into a cleared message is
    /// equivalent to decoding a fresh one.
    fn merge_payload(&mut self, buf: &[u8]) -> Result<(), CodecError>;

    /// Resets every field to its zero value.
    fn clear_payload(&mut self);

    /// Borrow as [`Any`] for downcasting.
    fn as_any(&self) -> &dyn Any;

    /// Mutably borrow as [`Any`] for downcasting.
    fn as_any_mut(&mut self) -> &mut dyn Any;

    /// Convert into [`Any`] for owned downcasting.
    fn into_any(self: Box<Self>) -> Box<dyn Any>;
}

impl<T> Payload for T
where
    T: prost::Message + Default + 'static,
{
    fn encode_payload(&self) -> Result<Vec<u8>, CodecError> {
        let mut buf = Vec::with_capacity(self.encoded_len());
        self.encode(&mut buf)?;
        Ok(buf)
    }

    fn merge_payload(&mut self, buf: &[u8]) -> Result<(), CodecError> {
        self.merge(buf)?;
        Ok(())
    }

    fn clear_payload(&mut self) {
        self.clear();
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn into_any(self: Box<Self>) -> Box<dyn Any> {
        self
    }
}

impl dyn Payload {
    /// Returns the message as `T` if that is its concrete type.
    #[must_use]
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.as_any().downcast_ref::<T>()
    }

    /// Mutable variant of [`downcast_ref`](Self::downcast_ref).
    pub fn downcast_mut<T: Any>(&mut self) -> Option<&mut T> {
        self.as_any_mut().downcast_mut::<T>()
    }

    /// Returns true if the concrete type is `T`.
    #[must_use]
    pub fn is<T: Any>(&self) -> bool {
        self.as_any().is::<T>()
    }
}

impl Reset for Box<dyn Payload> {
    fn reset(&mut self) {
        self.clear_payload();
    }
}

/// Encodes a message.
pub fn encode<M: prost::Message>(message: &M) -> Result<Vec<u8>, CodecError> {
    let mut buf = Vec::with_capacity(message.encoded_len());
    message.encode(&mut buf)?;
    Ok(buf)
}

/// Decodes a message.
pub fn decode<M: prost::Message + Default>(buf: &[u8]) -> Result<M, CodecError> {
    Ok(M::decode(buf)?)
}
