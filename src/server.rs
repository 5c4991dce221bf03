// Copyright (c) 2025 typed-jsonrpc Authors
//
// Licensed under dual license:
// - MIT License (LICENSE-MIT or https://opensource.org/licenses/MIT)
// - Apache License, Version 2.0 (LICENSE-APACHE or https://www.apache.org/licenses/LICENSE-2.0)

//! Server endpoint: parses incoming request texts, validates the protocol
//! invariants, routes each element to its typed handler, and serializes the
//! responses.
//!
//! Dispatch is strictly synchronous; handlers run inline on the caller's
//! thread and every failure is a value, never a panic across the dispatch
//! boundary. Notifications (absent or null id) run their handler but emit no
//! response, for every outcome including an unknown method.

use std::any::Any;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, trace, warn};

use crate::codec;
use crate::error::{ErrorCode, RpcError};
use crate::method::ServerMethod;
use crate::registry::{Named, Registry};
use crate::types::{GenericRequest, GenericResponse, Id, Request, Response, SUPPORTED_VERSION};

type ErasedMethod = Box<dyn Any + Send + Sync>;

/// Monomorphized per catalog entry at registration; recovers the entry's
/// static types from the erased descriptor and runs decode → handler → encode.
type DispatchFn = fn(&(dyn Any + Send + Sync), &str, Id) -> (String, RpcError);

struct ServerSlot {
    name: &'static str,
    method: ErasedMethod,
    dispatch: DispatchFn,
}

impl Named for ServerSlot {
    fn name(&self) -> &'static str {
        self.name
    }
}

fn dispatch_one<P, R>(method: &(dyn Any + Send + Sync), text: &str, id: Id) -> (String, RpcError)
where
    P: DeserializeOwned + Default + 'static,
    R: Serialize + 'static,
{
    let method = method
        .downcast_ref::<ServerMethod<P, R>>()
        .expect("slot dispatches the descriptor type it was registered with");

    match codec::read_as::<Request<P>>(text) {
        Ok(request) => match method.invoke(request.params) {
            Ok(result) => (
                codec::write(&Response::result(id, result)),
                RpcError::default(),
            ),
            Err(error) => (
                codec::write(&Response::<R>::error(id, error.clone())),
                error,
            ),
        },
        Err(parse) => {
            let error = RpcError::invalid(&parse, text);
            (codec::write(&Response::<R>::error(id, error.clone())), error)
        }
    }
}

/// Builder for a [`Server`]; the catalog is fixed once built.
pub struct ServerBuilder {
    registry: Registry<ServerSlot>,
}

impl Default for ServerBuilder {
    fn default() -> Self {
        Self {
            registry: Registry::new(),
        }
    }
}

impl ServerBuilder {
    /// Registers a method with the default handler, which reports an internal
    /// "Not implemented" error until [`Server::on`] installs a real one.
    ///
    /// # Panics
    ///
    /// Panics if `name` is empty or already registered.
    pub fn method<P, R>(mut self, name: &'static str) -> Self
    where
        P: DeserializeOwned + Default + 'static,
        R: Serialize + 'static,
    {
        self.registry.register(ServerSlot {
            name,
            method: Box::new(ServerMethod::<P, R>::new(name)),
            dispatch: dispatch_one::<P, R>,
        });
        self
    }

    /// Registers a method and its handler in one step.
    pub fn method_with<P, R, F>(self, name: &'static str, handler: F) -> Self
    where
        P: DeserializeOwned + Default + 'static,
        R: Serialize + 'static,
        F: Fn(P) -> Result<R, RpcError> + Send + Sync + 'static,
    {
        let mut builder = self.method::<P, R>(name);
        bind_handler(&mut builder.registry, name, handler);
        builder
    }

    pub fn build(self) -> Server {
        Server {
            registry: self.registry,
        }
    }
}

fn bind_handler<P, R, F>(registry: &mut Registry<ServerSlot>, name: &str, handler: F)
where
    P: DeserializeOwned + Default + 'static,
    R: Serialize + 'static,
    F: Fn(P) -> Result<R, RpcError> + Send + Sync + 'static,
{
    let Some(slot) = registry.get_mut(name) else {
        panic!("method `{name}` is not registered with this server");
    };
    let Some(method) = slot.method.downcast_mut::<ServerMethod<P, R>>() else {
        panic!("method `{name}` was registered with different parameter or result types");
    };
    method.bind(handler);
}

/// Server endpoint hosting a fixed catalog of typed methods.
///
/// Text in, texts out: [`Server::call`] consumes one JSON text (a single
/// request or a batch) and returns one `(response_text, error)` pair per
/// non-notification element, in input order. The `error` half reflects the
/// protocol-level outcome for that element; it is the zero
/// ([`RpcError::is_error`] is false) on success.
pub struct Server {
    registry: Registry<ServerSlot>,
}

impl Server {
    pub fn builder() -> ServerBuilder {
        ServerBuilder::default()
    }

    /// Replaces the handler slot for a registered method.
    ///
    /// # Panics
    ///
    /// Panics if no method named `name` exists in the catalog, or if it was
    /// registered with different parameter or result types.
    pub fn on<P, R, F>(&mut self, name: &str, handler: F)
    where
        P: DeserializeOwned + Default + 'static,
        R: Serialize + 'static,
        F: Fn(P) -> Result<R, RpcError> + Send + Sync + 'static,
    {
        bind_handler(&mut self.registry, name, handler);
    }

    /// Number of methods in the catalog.
    pub fn method_count(&self) -> usize {
        self.registry.len()
    }

    /// Dispatches one JSON text and returns the serialized responses.
    ///
    /// A syntactically invalid text yields a single parse-error element with
    /// a pointer-style diagnostic in `data`. An empty batch yields a single
    /// invalid-request element. Otherwise each element (or the single
    /// request) is processed independently; one malformed element never
    /// aborts the rest.
    pub fn call(&self, text: &str) -> Vec<(String, RpcError)> {
        if let Err(parse) = codec::validate(text) {
            warn!(error = %parse, "request text is not valid JSON");
            let error = RpcError::parse(&parse, text);
            let response = GenericResponse::error(Id::Null, error.clone());
            return vec![(codec::write(&response), error)];
        }

        match codec::read_as_array(text) {
            Ok(elements) if elements.is_empty() => {
                debug!("rejecting empty batch");
                let error = RpcError::new(ErrorCode::InvalidRequest);
                let response = GenericResponse::error(Id::Null, error.clone());
                vec![(codec::write(&response), error)]
            }
            Ok(elements) => {
                trace!(requests = elements.len(), "dispatching batch");
                elements
                    .iter()
                    .filter_map(|element| self.dispatch_text(element.get()))
                    .collect()
            }
            Err(_) => self.dispatch_text(text).into_iter().collect(),
        }
    }

    /// Runs the per-request procedure on one JSON text; `None` means the
    /// element was a notification and its outcome is suppressed.
    fn dispatch_text(&self, text: &str) -> Option<(String, RpcError)> {
        let request = match codec::read_as::<GenericRequest>(text) {
            Ok(request) => request,
            Err(parse) => {
                // Shape-level failure: recover the id from a free-form tree
                // so the reply can echo it, null otherwise.
                let id = codec::read_as_value(text)
                    .ok()
                    .and_then(|value| value.get("id").cloned())
                    .and_then(|id| serde_json::from_value::<Id>(id).ok())
                    .unwrap_or(Id::Null);
                let error = RpcError::invalid(&parse, text);
                let response = GenericResponse::error(id, error.clone());
                return Some((codec::write(&response), error));
            }
        };

        let suppress = request.is_notification();
        let outcome = self.dispatch_request(request, text);
        if suppress {
            trace!("suppressing notification response");
            return None;
        }
        Some(outcome)
    }

    fn dispatch_request(&self, request: GenericRequest, text: &str) -> (String, RpcError) {
        if request.version != SUPPORTED_VERSION {
            debug!(version = %request.version, "unsupported protocol version");
            let error = RpcError::version(&request.version);
            let response = GenericResponse::error(request.id, error.clone());
            return (codec::write(&response), error);
        }

        trace!(method = %request.method, id = %request.id, "dispatching request");
        let dispatched = self.registry.dispatch(&request.method, |slot| {
            (slot.dispatch)(slot.method.as_ref(), text, request.id.clone())
        });

        match dispatched {
            Some(outcome) => outcome,
            None => {
                debug!(method = %request.method, "method not found");
                let error = RpcError::method(&request.method);
                let response = GenericResponse::error(request.id, error.clone());
                (codec::write(&response), error)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sum_server() -> Server {
        Server::builder()
            .method_with("add", |terms: Vec<i64>| {
                Ok::<i64, RpcError>(terms.into_iter().sum())
            })
            .build()
    }

    #[test]
    fn test_single_request_round_trip() {
        let server = sum_server();
        let replies = server.call(r#"{"jsonrpc":"2.0","method":"add","params":[1,2,3],"id":1}"#);
        assert_eq!(replies.len(), 1);
        assert_eq!(replies[0].0, r#"{"jsonrpc":"2.0","result":6,"id":1}"#);
        assert!(!replies[0].1.is_error());
    }

    #[test]
    fn test_notifications_are_silent() {
        let server = sum_server();
        assert!(server
            .call(r#"{"jsonrpc":"2.0","method":"add","params":[1,2,3]}"#)
            .is_empty());
        assert!(server
            .call(r#"{"jsonrpc":"2.0","method":"add","params":[1,2,3],"id":null}"#)
            .is_empty());
        // Strict reading: an unknown method is also silent for notifications.
        assert!(server
            .call(r#"{"jsonrpc":"2.0","method":"nope","params":[],"id":null}"#)
            .is_empty());
        // So is a version mismatch.
        assert!(server
            .call(r#"{"jsonrpc":"1.0","method":"add","params":[],"id":null}"#)
            .is_empty());
    }

    #[test]
    fn test_default_handler_reports_not_implemented() {
        let server = Server::builder().method::<Vec<i64>, i64>("add").build();
        let replies = server.call(r#"{"jsonrpc":"2.0","method":"add","params":[1],"id":1}"#);
        assert_eq!(replies.len(), 1);
        assert_eq!(replies[0].1, ErrorCode::Internal);
        assert_eq!(replies[0].1.data(), &json!("Not implemented"));
    }

    #[test]
    fn test_handler_rebinding() {
        let mut server = sum_server();
        server.on("add", |_terms: Vec<i64>| Ok::<i64, RpcError>(0));
        let replies = server.call(r#"{"jsonrpc":"2.0","method":"add","params":[1,2,3],"id":1}"#);
        assert_eq!(replies[0].0, r#"{"jsonrpc":"2.0","result":0,"id":1}"#);
    }

    #[test]
    #[should_panic(expected = "not registered")]
    fn test_rebinding_unknown_method_panics() {
        let mut server = sum_server();
        server.on("missing", |_terms: Vec<i64>| Ok::<i64, RpcError>(0));
    }

    #[test]
    #[should_panic(expected = "different parameter or result types")]
    fn test_rebinding_with_wrong_types_panics() {
        let mut server = sum_server();
        server.on("add", |_flag: bool| Ok::<i64, RpcError>(0));
    }

    #[test]
    fn test_typed_decode_failure_reports_invalid_request() {
        let server = sum_server();
        let replies =
            server.call(r#"{"jsonrpc":"2.0","method":"add","params":{"a":1},"id":"u"}"#);
        assert_eq!(replies.len(), 1);
        assert_eq!(replies[0].1, ErrorCode::InvalidRequest);
        assert!(replies[0].0.contains(r#""id":"u""#));
    }

    #[test]
    fn test_id_recovery_on_malformed_request() {
        let server = sum_server();
        // Wrong member type: the generic decode fails but the id is present.
        let replies = server.call(r#"{"jsonrpc":"2.0","method":5,"id":3}"#);
        assert_eq!(replies.len(), 1);
        assert_eq!(replies[0].1, ErrorCode::InvalidRequest);
        assert!(replies[0].0.ends_with(r#""id":3}"#));
    }
}
