// Copyright (c) 2025 typed-jsonrpc Authors
//
// Licensed under dual license:
// - MIT License (LICENSE-MIT or https://opensource.org/licenses/MIT)
// - Apache License, Version 2.0 (LICENSE-APACHE or https://www.apache.org/licenses/LICENSE-2.0)

//! Wire types for the JSON-RPC 2.0 protocol.
//!
//! This module defines the request, response, and identifier types exchanged
//! on the wire, according to the [specification](https://www.jsonrpc.org/specification).
//! Requests and responses are generic over their `params`/`result` shape so a
//! method catalog can decode each message with full static typing; the
//! `Generic*` aliases decode the same texts with an untyped payload for the
//! recovery paths.

use std::fmt;

use serde::de::{self, Deserializer, Visitor};
use serde::{Deserialize, Serialize, Serializer};

use crate::error::RpcError;

/// The only protocol version this crate speaks.
pub const SUPPORTED_VERSION: &str = "2.0";

/// JSON-RPC request identifier.
///
/// Exactly one of null, a string, or a signed 64-bit integer. A JSON number
/// with a zero fractional part (`2.0`) decodes to the integer variant; any
/// other number is rejected. Different variants never compare equal.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub enum Id {
    /// Null identifier; a request carrying it (or no id at all) is a notification.
    #[default]
    Null,

    /// String identifier
    String(String),

    /// Numeric identifier
    Number(i64),
}

impl Id {
    /// Returns true for the null identifier.
    pub fn is_null(&self) -> bool {
        matches!(self, Id::Null)
    }
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Id::Null => write!(f, "null"),
            Id::String(s) => write!(f, "{}", s),
            Id::Number(n) => write!(f, "{}", n),
        }
    }
}

impl From<i64> for Id {
    fn from(n: i64) -> Self {
        Id::Number(n)
    }
}

impl From<&str> for Id {
    fn from(s: &str) -> Self {
        Id::String(s.to_owned())
    }
}

impl From<String> for Id {
    fn from(s: String) -> Self {
        Id::String(s)
    }
}

impl Serialize for Id {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Id::Null => serializer.serialize_unit(),
            Id::String(s) => serializer.serialize_str(s),
            Id::Number(n) => serializer.serialize_i64(*n),
        }
    }
}

struct IdVisitor;

impl<'de> Visitor<'de> for IdVisitor {
    type Value = Id;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("null, a string, or an integer")
    }

    fn visit_unit<E: de::Error>(self) -> Result<Id, E> {
        Ok(Id::Null)
    }

    fn visit_none<E: de::Error>(self) -> Result<Id, E> {
        Ok(Id::Null)
    }

    fn visit_str<E: de::Error>(self, s: &str) -> Result<Id, E> {
        Ok(Id::String(s.to_owned()))
    }

    fn visit_string<E: de::Error>(self, s: String) -> Result<Id, E> {
        Ok(Id::String(s))
    }

    fn visit_i64<E: de::Error>(self, n: i64) -> Result<Id, E> {
        Ok(Id::Number(n))
    }

    fn visit_u64<E: de::Error>(self, n: u64) -> Result<Id, E> {
        i64::try_from(n)
            .map(Id::Number)
            .map_err(|_| E::custom("id is out of range for a 64-bit signed integer"))
    }

    // Accepted only when the value is exactly representable as an integer,
    // so `"id": 2.0` round-trips as the integer 2.
    fn visit_f64<E: de::Error>(self, n: f64) -> Result<Id, E> {
        if n.fract() == 0.0 && n >= i64::MIN as f64 && n <= i64::MAX as f64 {
            Ok(Id::Number(n as i64))
        } else {
            Err(E::custom("id number must have no fractional part"))
        }
    }
}

impl<'de> Deserialize<'de> for Id {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Id, D::Error> {
        deserializer.deserialize_any(IdVisitor)
    }
}

/// A JSON-RPC 2.0 request object with statically typed parameters.
///
/// Serialized with keys `jsonrpc`, `method`, `params`, `id` in that order;
/// `id` is always encoded, possibly as `null`. Decoding is strict: unknown
/// keys are rejected, while absent keys fall back to their defaults (which is
/// why `P` must implement [`Default`] to be decoded).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
#[serde(bound(deserialize = "P: Deserialize<'de> + Default"))]
pub struct Request<P> {
    /// Protocol version; `"2.0"` on every conforming request.
    #[serde(rename = "jsonrpc", default)]
    pub version: String,

    /// Name of the method to be invoked.
    #[serde(default)]
    pub method: String,

    /// Method parameters, shaped by the method's catalog entry.
    #[serde(default)]
    pub params: P,

    /// Request identifier; null marks a notification.
    #[serde(default)]
    pub id: Id,
}

impl<P> Request<P> {
    /// Creates a request for the supported protocol version.
    pub fn new(id: Id, method: impl Into<String>, params: P) -> Self {
        Self {
            version: SUPPORTED_VERSION.to_owned(),
            method: method.into(),
            params,
            id,
        }
    }

    /// Returns true if this request expects no response (absent or null id).
    pub fn is_notification(&self) -> bool {
        self.id.is_null()
    }
}

/// A request with untyped parameters, used to recover `method` and `id`
/// before the catalog selects the typed shape.
pub(crate) type GenericRequest = Request<serde_json::Value>;

/// A JSON-RPC 2.0 response object with a statically typed result.
///
/// Exactly one of `result` and `error` is present; the constructors make any
/// other state unrepresentable for locally built responses. Serialized with
/// keys `jsonrpc`, then `result` *or* `error`, then `id` (always encoded).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Response<R> {
    #[serde(rename = "jsonrpc", default)]
    version: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    result: Option<R>,

    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<RpcError>,

    #[serde(default)]
    id: Id,
}

impl<R> Response<R> {
    /// Creates a success response echoing the request id.
    pub fn result(id: Id, result: R) -> Self {
        Self {
            version: SUPPORTED_VERSION.to_owned(),
            result: Some(result),
            error: None,
            id,
        }
    }

    /// Creates an error response echoing the request id (null when the
    /// server could not determine it).
    pub fn error(id: Id, error: RpcError) -> Self {
        Self {
            version: SUPPORTED_VERSION.to_owned(),
            result: None,
            error: Some(error),
            id,
        }
    }

    /// The identifier this response answers.
    pub fn id(&self) -> &Id {
        &self.id
    }

    /// The response payload: `Ok` on success, `Err` on failure, `None` when a
    /// decoded text carried neither member.
    pub fn outcome(&self) -> Option<Result<&R, &RpcError>> {
        match (&self.result, &self.error) {
            (Some(result), _) => Some(Ok(result)),
            (None, Some(error)) => Some(Err(error)),
            (None, None) => None,
        }
    }

    /// Consumes the response into its id and payload.
    pub fn into_outcome(self) -> (Id, Option<Result<R, RpcError>>) {
        let outcome = match (self.result, self.error) {
            (Some(result), _) => Some(Ok(result)),
            (None, Some(error)) => Some(Err(error)),
            (None, None) => None,
        };
        (self.id, outcome)
    }
}

/// A response with an untyped result, used to recover `id` before the pending
/// table selects the typed shape.
pub(crate) type GenericResponse = Response<serde_json::Value>;
