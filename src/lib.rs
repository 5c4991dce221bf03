// Copyright (c) 2025 typed-jsonrpc Authors
//
// Licensed under dual license:
// - MIT License (LICENSE-MIT or https://opensource.org/licenses/MIT)
// - Apache License, Version 2.0 (LICENSE-APACHE or https://www.apache.org/licenses/LICENSE-2.0)

//! Statically typed JSON-RPC 2.0 endpoint kit.
//!
//! A matched pair of [`Server`] and [`Client`] endpoints hosting a
//! user-declared catalog of remote methods, each bound at registration time
//! to a name, a params type, and a result type. The core is pure text in,
//! text out: the server consumes a JSON text (single request or batch) and
//! returns zero or more response texts; the client produces request texts and
//! routes decoded responses to method-typed callbacks through a bounded
//! pending table. Transports, schedulers, and persistence are the embedding
//! application's business.
//!
//! # Design
//!
//! - Full JSON-RPC 2.0 compliance, batches and notifications included
//! - Strictly synchronous: handlers run inline on the caller's thread
//! - All failures are values; nothing is thrown across the dispatch boundary
//! - One malformed batch element never aborts the rest of the batch
//! - Notifications (absent or null id) run their handler but never produce a
//!   response element
//!
//! # Example
//!
//! ```
//! use typed_jsonrpc::{Client, Id, RpcError, Server};
//!
//! let mut server = Server::builder()
//!     .method::<Vec<i64>, i64>("sum")
//!     .build();
//! server.on("sum", |terms: Vec<i64>| Ok::<i64, RpcError>(terms.into_iter().sum()));
//!
//! let mut client = Client::builder()
//!     .method::<Vec<i64>, i64>("sum")
//!     .build();
//! client.on("sum", |outcome: Result<i64, RpcError>, id| {
//!     assert_eq!(outcome.unwrap(), 6);
//!     assert_eq!(id, Id::Number(1));
//! });
//!
//! let request = client.request(1, vec![1, 2, 3]);
//! assert_eq!(
//!     request,
//!     r#"{"jsonrpc":"2.0","method":"sum","params":[1,2,3],"id":1}"#
//! );
//!
//! let replies = server.call(&request);
//! assert_eq!(replies.len(), 1);
//! assert_eq!(replies[0].0, r#"{"jsonrpc":"2.0","result":6,"id":1}"#);
//!
//! client.call(&replies[0].0).unwrap();
//! ```

pub mod client;
mod codec;
pub mod error;
pub mod method;
mod registry;
pub mod server;
pub mod types;

// Internal modules that are not part of the public API
#[cfg(test)]
pub(crate) mod tests;

// Re-exports
pub use client::{BatchBuilder, Client, ClientBuilder};
pub use error::{CallError, ErrorCode, RpcError};
pub use method::{ClientCallback, ClientMethod, ServerHandler, ServerMethod};
pub use server::{Server, ServerBuilder};
pub use types::{Id, Request, Response, SUPPORTED_VERSION};

/// Version information for the typed-jsonrpc crate.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
