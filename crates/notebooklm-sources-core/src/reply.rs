//! Decoded RPC replies.
//!
//! The service answers every remote call with positional, loosely typed
//! nested arrays. [`RawReply`] is the single place that shape is decoded;
//! business code only ever sees the tagged union, never `serde_json::Value`.
//!
//! # Identifier extraction
//!
//! Identifier-bearing replies wrap a single string in anywhere from one to
//! four levels of arrays depending on endpoint and service version:
//!
//! ```text
//! ["id"]   [["id"]]   [[["id"]]]   [[[["id"]]]]
//! ```
//!
//! [`extract_identifier`] follows the first element down until it reaches a
//! scalar, so no per-endpoint schema is needed.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// A scalar leaf of a reply.
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    Text(String),
    Number(serde_json::Number),
    Bool(bool),
}

/// A reply from the RPC boundary, decoded into an explicit variant.
///
/// Keyed JSON objects are not part of the positional protocol; they decode
/// as [`RawReply::Null`].
#[derive(Debug, Clone, PartialEq, Default)]
pub enum RawReply {
    #[default]
    Null,
    Scalar(Scalar),
    Sequence(Vec<RawReply>),
}

impl RawReply {
    /// Shorthand for a text scalar.
    pub fn text(s: impl Into<String>) -> Self {
        RawReply::Scalar(Scalar::Text(s.into()))
    }

    pub fn is_null(&self) -> bool {
        matches!(self, RawReply::Null)
    }

    /// Returns the elements if this reply is a sequence.
    pub fn as_sequence(&self) -> Option<&[RawReply]> {
        match self {
            RawReply::Sequence(items) => Some(items),
            _ => None,
        }
    }

    /// Returns the string if this reply is a text scalar.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            RawReply::Scalar(Scalar::Text(s)) => Some(s),
            _ => None,
        }
    }

    /// True for a sequence holding at least one element.
    pub fn is_non_empty_sequence(&self) -> bool {
        self.as_sequence().is_some_and(|items| !items.is_empty())
    }
}

impl From<Value> for RawReply {
    fn from(value: Value) -> Self {
        match value {
            Value::Null | Value::Object(_) => RawReply::Null,
            Value::Bool(b) => RawReply::Scalar(Scalar::Bool(b)),
            Value::Number(n) => RawReply::Scalar(Scalar::Number(n)),
            Value::String(s) => RawReply::Scalar(Scalar::Text(s)),
            Value::Array(items) => {
                RawReply::Sequence(items.into_iter().map(RawReply::from).collect())
            }
        }
    }
}

impl From<RawReply> for Value {
    fn from(reply: RawReply) -> Self {
        match reply {
            RawReply::Null => Value::Null,
            RawReply::Scalar(Scalar::Text(s)) => Value::String(s),
            RawReply::Scalar(Scalar::Number(n)) => Value::Number(n),
            RawReply::Scalar(Scalar::Bool(b)) => Value::Bool(b),
            RawReply::Sequence(items) => Value::Array(items.into_iter().map(Value::from).collect()),
        }
    }
}

impl<'de> Deserialize<'de> for RawReply {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Value::deserialize(deserializer).map(RawReply::from)
    }
}

/// Pull the first identifier out of an arbitrarily nested reply.
///
/// A text scalar is returned as-is; a non-empty sequence recurses into its
/// first element. Null, empty sequences, empty strings, numbers and booleans
/// yield `None`.
pub fn extract_identifier(reply: &RawReply) -> Option<&str> {
    match reply {
        RawReply::Scalar(Scalar::Text(s)) if !s.is_empty() => Some(s),
        RawReply::Sequence(items) => items.first().and_then(extract_identifier),
        _ => None,
    }
}
