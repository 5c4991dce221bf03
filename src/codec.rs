// Copyright (c) 2025 typed-jsonrpc Authors
//
// Licensed under dual license:
// - MIT License (LICENSE-MIT or https://opensource.org/licenses/MIT)
// - Apache License, Version 2.0 (LICENSE-APACHE or https://www.apache.org/licenses/LICENSE-2.0)

//! JSON codec used by the dispatcher and the client router.
//!
//! Thin wrappers over serde_json that give the endpoint kit the handful of
//! operations it needs: a cheap syntactic check, strict typed decoding,
//! dynamic-tree decoding for the id-recovery path, raw-element batch
//! splitting, canonical serialization, and a pointer-style diagnostic
//! formatter whose output goes into the `data` field of protocol errors.

use serde::de::{DeserializeOwned, IgnoredAny};
use serde::Serialize;
use serde_json::error::Category;
use serde_json::value::RawValue;

/// Cheap whole-text syntactic check; no tree is built.
pub(crate) fn validate(text: &str) -> Result<(), serde_json::Error> {
    serde_json::from_str::<IgnoredAny>(text).map(|_| ())
}

/// Decodes a text into a statically typed record. Strict structures reject
/// unknown keys, so this doubles as the request-shape validity check.
pub(crate) fn read_as<T: DeserializeOwned>(text: &str) -> Result<T, serde_json::Error> {
    serde_json::from_str(text)
}

/// Decodes a text into a dynamic tree, for id extraction on failure paths.
pub(crate) fn read_as_value(text: &str) -> Result<serde_json::Value, serde_json::Error> {
    serde_json::from_str(text)
}

/// Decodes a text into the raw JSON sub-texts of its array elements, for
/// batch iteration. Fails if the text is not a JSON array.
pub(crate) fn read_as_array(text: &str) -> Result<Vec<&RawValue>, serde_json::Error> {
    serde_json::from_str(text)
}

/// Canonical serialization. Responses built by this crate always serialize;
/// should a user result type still refuse, a canned internal-error response
/// is returned so the wire never sees a half-written text.
pub(crate) fn write<T: Serialize>(value: &T) -> String {
    serde_json::to_string(value).unwrap_or_else(|_| {
        r#"{"jsonrpc":"2.0","error":{"code":-32603,"message":"Internal error","data":null},"id":null}"#
            .to_owned()
    })
}

fn category_name(category: Category) -> &'static str {
    match category {
        Category::Syntax => "syntax_error",
        Category::Data => "data_error",
        Category::Eof => "unexpected_eof",
        Category::Io => "io_error",
    }
}

/// Renders `line:col: code`, the offending source line, and a caret pointing
/// at the failure column. The result is inserted verbatim into the `data`
/// field of parse-level protocol errors.
pub(crate) fn format_diagnostic(error: &serde_json::Error, text: &str) -> String {
    let line = error.line();
    let column = error.column();
    let source_line = text.lines().nth(line.saturating_sub(1)).unwrap_or("");
    format!(
        "{line}:{column}: {kind}\n   {source_line}\n   {caret:>width$}\n",
        kind = category_name(error.classify()),
        caret = '^',
        width = column.max(1),
    )
}
