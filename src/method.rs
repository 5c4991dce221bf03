// Copyright (c) 2025 typed-jsonrpc Authors
//
// Licensed under dual license:
// - MIT License (LICENSE-MIT or https://opensource.org/licenses/MIT)
// - Apache License, Version 2.0 (LICENSE-APACHE or https://www.apache.org/licenses/LICENSE-2.0)

//! Method descriptors: the static binding of a method name to its parameter
//! and result types, plus the one mutable slot each endpoint owns: the
//! handler on the server, the response callback on the client.

use crate::error::{ErrorCode, RpcError};
use crate::types::Id;

/// Boxed server handler: decoded params in, value-typed success or structured
/// error out.
pub type ServerHandler<P, R> = Box<dyn Fn(P) -> Result<R, RpcError> + Send + Sync>;

/// Boxed client callback, invoked with the decoded outcome and the request id
/// it answers.
pub type ClientCallback<R> = Box<dyn Fn(Result<R, RpcError>, Id) + Send + Sync>;

/// Server-side descriptor for one catalog entry.
///
/// Until a handler is installed, every invocation reports an internal
/// "Not implemented" error.
pub struct ServerMethod<P, R> {
    name: &'static str,
    handler: ServerHandler<P, R>,
}

impl<P, R> ServerMethod<P, R> {
    pub(crate) fn new(name: &'static str) -> Self {
        Self {
            name,
            handler: Box::new(|_| Err(RpcError::with_data(ErrorCode::Internal, "Not implemented"))),
        }
    }

    /// The compile-time method name.
    pub fn name(&self) -> &'static str {
        self.name
    }

    pub(crate) fn bind<F>(&mut self, handler: F)
    where
        F: Fn(P) -> Result<R, RpcError> + Send + Sync + 'static,
    {
        self.handler = Box::new(handler);
    }

    pub(crate) fn invoke(&self, params: P) -> Result<R, RpcError> {
        (self.handler)(params)
    }
}

/// Client-side descriptor for one catalog entry.
///
/// Carries only the result type; the params type is remembered next to it in
/// the catalog slot for request routing. The default callback ignores the
/// outcome.
pub struct ClientMethod<R> {
    name: &'static str,
    callback: ClientCallback<R>,
}

impl<R> ClientMethod<R> {
    pub(crate) fn new(name: &'static str) -> Self {
        Self {
            name,
            callback: Box::new(|_, _| {}),
        }
    }

    /// The compile-time method name.
    pub fn name(&self) -> &'static str {
        self.name
    }

    pub(crate) fn bind<F>(&mut self, callback: F)
    where
        F: Fn(Result<R, RpcError>, Id) + Send + Sync + 'static,
    {
        self.callback = Box::new(callback);
    }

    pub(crate) fn notify(&self, outcome: Result<R, RpcError>, id: Id) {
        (self.callback)(outcome, id)
    }
}
