// Copyright (c) 2025 typed-jsonrpc Authors
//
// Licensed under dual license:
// - MIT License (LICENSE-MIT or https://opensource.org/licenses/MIT)
// - Apache License, Version 2.0 (LICENSE-APACHE or https://www.apache.org/licenses/LICENSE-2.0)

//! Error types for the JSON-RPC 2.0 endpoint kit.
//!
//! Two disjoint surfaces live here. [`RpcError`] is the protocol error object
//! carried on the wire inside a response, with its code taxonomy in
//! [`ErrorCode`]. [`CallError`] is the call-site value returned to the
//! in-process caller of [`Client::call`](crate::Client::call); it is never
//! serialized.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Canonical JSON-RPC 2.0 error codes.
///
/// The zero code is the "no error" sentinel used on the server's call-site
/// return tuple; it is never serialized inside an error object. Codes -32000
/// through -32099 are reserved for implementation-defined server errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    /// No error (0); sentinel for a successful dispatch outcome.
    NoError = 0,

    /// Lower bound of the implementation-defined server error range (-32000).
    ServerErrorLower = -32000,

    /// Upper bound of the implementation-defined server error range (-32099).
    ServerErrorUpper = -32099,

    /// Invalid Request (-32600): the JSON sent is not a valid Request object.
    InvalidRequest = -32600,

    /// Method not found (-32601): the method does not exist in the catalog.
    MethodNotFound = -32601,

    /// Invalid params (-32602): invalid method parameter(s).
    InvalidParams = -32602,

    /// Internal error (-32603): internal JSON-RPC error.
    Internal = -32603,

    /// Parse error (-32700): invalid JSON was received.
    ParseError = -32700,
}

impl ErrorCode {
    /// Returns the default message derived from the code.
    pub fn message(&self) -> &'static str {
        match self {
            ErrorCode::NoError => "No error",
            ErrorCode::ServerErrorLower | ErrorCode::ServerErrorUpper => "Server error",
            ErrorCode::InvalidRequest => "Invalid request",
            ErrorCode::MethodNotFound => "Method not found",
            ErrorCode::InvalidParams => "Invalid params",
            ErrorCode::Internal => "Internal error",
            ErrorCode::ParseError => "Parse error",
        }
    }

    /// Classifies a raw integer code.
    ///
    /// Returns `None` for codes outside the canonical set; anything inside
    /// the reserved -32000..=-32099 range counts as a server error.
    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            0 => Some(ErrorCode::NoError),
            -32600 => Some(ErrorCode::InvalidRequest),
            -32601 => Some(ErrorCode::MethodNotFound),
            -32602 => Some(ErrorCode::InvalidParams),
            -32603 => Some(ErrorCode::Internal),
            -32700 => Some(ErrorCode::ParseError),
            -32099 => Some(ErrorCode::ServerErrorUpper),
            c if (-32099..=-32000).contains(&c) => Some(ErrorCode::ServerErrorLower),
            _ => None,
        }
    }

    /// Returns the integer error code.
    pub fn code(&self) -> i64 {
        *self as i64
    }
}

impl From<ErrorCode> for i64 {
    fn from(code: ErrorCode) -> i64 {
        code as i64
    }
}

/// JSON-RPC error object as carried on the wire.
///
/// `message` is derived from `code` at construction; decoding a response
/// preserves whatever integer and message the peer sent, including
/// non-canonical codes. `data` is always serialized, as `null` when empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RpcError {
    code: i64,
    message: String,
    #[serde(default)]
    data: serde_json::Value,
}

impl Default for RpcError {
    fn default() -> Self {
        Self::new(ErrorCode::NoError)
    }
}

impl RpcError {
    /// Creates an error with the message derived from `code` and no data.
    pub fn new(code: ErrorCode) -> Self {
        Self {
            code: code.code(),
            message: code.message().to_owned(),
            data: serde_json::Value::Null,
        }
    }

    /// Creates an error with the derived message and a detail payload.
    pub fn with_data(code: ErrorCode, data: impl Into<serde_json::Value>) -> Self {
        Self {
            code: code.code(),
            message: code.message().to_owned(),
            data: data.into(),
        }
    }

    /// Invalid-request error carrying a formatted parse diagnostic.
    pub(crate) fn invalid(error: &serde_json::Error, text: &str) -> Self {
        let diagnostic = crate::codec::format_diagnostic(error, text);
        if diagnostic.is_empty() {
            Self::new(ErrorCode::InvalidRequest)
        } else {
            Self::with_data(ErrorCode::InvalidRequest, diagnostic)
        }
    }

    /// Parse error carrying a formatted diagnostic for the whole input text.
    pub(crate) fn parse(error: &serde_json::Error, text: &str) -> Self {
        Self::with_data(ErrorCode::ParseError, crate::codec::format_diagnostic(error, text))
    }

    /// Invalid-request error for an unsupported protocol version.
    pub(crate) fn version(presumed_version: &str) -> Self {
        Self::with_data(
            ErrorCode::InvalidRequest,
            format!(
                "Invalid version: {presumed_version} only supported version is {}",
                crate::types::SUPPORTED_VERSION
            ),
        )
    }

    /// Method-not-found error naming the requested method.
    pub(crate) fn method(presumed_method: &str) -> Self {
        Self::with_data(
            ErrorCode::MethodNotFound,
            format!("Method: \"{presumed_method}\" not found"),
        )
    }

    /// Classifies the raw code against the canonical set.
    pub fn code(&self) -> Option<ErrorCode> {
        ErrorCode::from_code(self.code)
    }

    /// The integer code as carried on the wire.
    pub fn raw_code(&self) -> i64 {
        self.code
    }

    /// The short message.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// The detail payload (`null` when absent).
    pub fn data(&self) -> &serde_json::Value {
        &self.data
    }

    /// An error is truthy iff its code is non-zero.
    pub fn is_error(&self) -> bool {
        self.code != 0
    }
}

impl PartialEq<ErrorCode> for RpcError {
    fn eq(&self, other: &ErrorCode) -> bool {
        self.code == other.code()
    }
}

/// Failure surface of [`Client::call`](crate::Client::call).
///
/// Either a formatted parse diagnostic, or one of two routing flags. These
/// values are returned to the embedding caller and never serialized.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CallError {
    /// The response text (or its typed re-decode) failed to parse.
    #[error("invalid response: {0}")]
    Parse(String),

    /// No pending request matches the response id.
    #[error("response id does not match any pending request")]
    IdNotFound,

    /// The remembered method is not in the catalog.
    #[error("response method is not registered with this client")]
    MethodNotFound,
}
