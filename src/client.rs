// Copyright (c) 2025 typed-jsonrpc Authors
//
// Licensed under dual license:
// - MIT License (LICENSE-MIT or https://opensource.org/licenses/MIT)
// - Apache License, Version 2.0 (LICENSE-APACHE or https://www.apache.org/licenses/LICENSE-2.0)

//! Client endpoint: builds outgoing request texts and routes incoming
//! response texts to method-typed callbacks.
//!
//! Outstanding requests are remembered in a bounded pending table of
//! `(id, method)` pairs. New entries go to the front; when the table is full
//! the oldest entry at the back is evicted; a matched response removes its
//! entry. The method name for an outgoing request is recovered from the
//! static type of the params value, first catalog match wins.

use std::any::{Any, TypeId};
use std::collections::VecDeque;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, trace};

use crate::codec;
use crate::error::{CallError, RpcError};
use crate::method::ClientMethod;
use crate::registry::{Named, Registry};
use crate::types::{GenericResponse, Id, Request, Response};

/// Default capacity of the pending table.
const DEFAULT_PENDING_CAPACITY: usize = 100;

type ErasedMethod = Box<dyn Any + Send + Sync>;

/// Monomorphized per catalog entry at registration; re-decodes the response
/// with the entry's static result type and invokes the callback.
type RouteFn = fn(&(dyn Any + Send + Sync), &str) -> Result<(), CallError>;

struct ClientSlot {
    name: &'static str,
    params: TypeId,
    method: ErasedMethod,
    route: RouteFn,
}

impl Named for ClientSlot {
    fn name(&self) -> &'static str {
        self.name
    }
}

fn route_one<R>(method: &(dyn Any + Send + Sync), text: &str) -> Result<(), CallError>
where
    R: DeserializeOwned + 'static,
{
    let method = method
        .downcast_ref::<ClientMethod<R>>()
        .expect("slot routes the descriptor type it was registered with");

    let response: Response<R> = codec::read_as(text)
        .map_err(|parse| CallError::Parse(codec::format_diagnostic(&parse, text)))?;
    let (id, outcome) = response.into_outcome();
    match outcome {
        Some(outcome) => {
            method.notify(outcome, id);
            Ok(())
        }
        None => Err(CallError::Parse(
            "missing key: response carries neither `result` nor `error`".to_owned(),
        )),
    }
}

/// Builder for a [`Client`]; the catalog is fixed once built.
pub struct ClientBuilder {
    registry: Registry<ClientSlot>,
    capacity: usize,
}

impl Default for ClientBuilder {
    fn default() -> Self {
        Self {
            registry: Registry::new(),
            capacity: DEFAULT_PENDING_CAPACITY,
        }
    }
}

impl ClientBuilder {
    /// Registers a method with a no-op callback until [`Client::on`] installs
    /// a real one.
    ///
    /// # Panics
    ///
    /// Panics if `name` is empty or already registered.
    pub fn method<P, R>(mut self, name: &'static str) -> Self
    where
        P: Serialize + 'static,
        R: DeserializeOwned + 'static,
    {
        self.registry.register(ClientSlot {
            name,
            params: TypeId::of::<P>(),
            method: Box::new(ClientMethod::<R>::new(name)),
            route: route_one::<R>,
        });
        self
    }

    /// Sets the pending-table capacity (default 100).
    pub fn capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    pub fn build(self) -> Client {
        Client {
            registry: self.registry,
            pending: VecDeque::new(),
            capacity: self.capacity,
        }
    }
}

/// Client endpoint over the same catalog shape as its peer server.
pub struct Client {
    registry: Registry<ClientSlot>,
    // <id, method_name>, newest first
    pending: VecDeque<(Id, &'static str)>,
    capacity: usize,
}

impl Client {
    pub fn builder() -> ClientBuilder {
        ClientBuilder::default()
    }

    /// Installs the response callback for a registered method.
    ///
    /// # Panics
    ///
    /// Panics if no method named `name` exists in the catalog, or if it was
    /// registered with a different result type.
    pub fn on<R, F>(&mut self, name: &str, callback: F)
    where
        R: DeserializeOwned + 'static,
        F: Fn(Result<R, RpcError>, Id) + Send + Sync + 'static,
    {
        let Some(slot) = self.registry.get_mut(name) else {
            panic!("method `{name}` is not registered with this client");
        };
        let Some(method) = slot.method.downcast_mut::<ClientMethod<R>>() else {
            panic!("method `{name}` was registered with a different result type");
        };
        method.bind(callback);
    }

    /// Serializes a single request for the method whose params type is `P`.
    ///
    /// The `(id, method)` pair is remembered in the pending table before
    /// serialization; the oldest entry is evicted on overflow.
    ///
    /// # Panics
    ///
    /// Panics if no catalog entry accepts params of type `P`.
    pub fn request<P>(&mut self, id: impl Into<Id>, params: P) -> String
    where
        P: Serialize + 'static,
    {
        let id = id.into();
        let name = self.method_for::<P>();
        self.remember(id.clone(), name);
        trace!(method = name, id = %id, "building request");
        codec::write(&Request::new(id, name, params))
    }

    /// Starts a batch request; push requests onto the returned builder and
    /// finish it into the serialized array text.
    pub fn batch(&mut self) -> BatchBuilder<'_> {
        BatchBuilder {
            client: self,
            parts: Vec::new(),
        }
    }

    /// Consumes a response text and invokes the matching method callback.
    ///
    /// The id is recovered from a generic decode, looked up in the pending
    /// table, and the text is re-decoded with the remembered method's result
    /// type. The callback receives `Ok(result)` or `Err(error)`; a response
    /// carrying neither member is a parse-level failure.
    pub fn call(&mut self, text: &str) -> Result<(), CallError> {
        let response: GenericResponse = codec::read_as(text)
            .map_err(|parse| CallError::Parse(codec::format_diagnostic(&parse, text)))?;

        let Some(position) = self
            .pending
            .iter()
            .position(|(id, _)| id == response.id())
        else {
            debug!(id = %response.id(), "response id is not pending");
            return Err(CallError::IdNotFound);
        };
        let Some((id, name)) = self.pending.remove(position) else {
            return Err(CallError::IdNotFound);
        };

        trace!(method = name, id = %id, "routing response");
        match self.registry.get(name) {
            Some(slot) => (slot.route)(slot.method.as_ref(), text),
            None => Err(CallError::MethodNotFound),
        }
    }

    /// Outstanding `(id, method)` pairs, newest first.
    pub fn pending(&self) -> impl ExactSizeIterator<Item = (&Id, &'static str)> {
        self.pending.iter().map(|(id, name)| (id, *name))
    }

    /// Pending-table capacity chosen at build time.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    fn method_for<P: 'static>(&self) -> &'static str {
        let params = TypeId::of::<P>();
        match self.registry.iter().find(|slot| slot.params == params) {
            Some(slot) => slot.name,
            None => panic!(
                "no client method accepts params of type `{}`",
                std::any::type_name::<P>()
            ),
        }
    }

    fn remember(&mut self, id: Id, name: &'static str) {
        self.pending.push_front((id, name));
        self.pending.truncate(self.capacity);
    }
}

/// Accumulates heterogeneously typed requests into one batch text.
pub struct BatchBuilder<'a> {
    client: &'a mut Client,
    parts: Vec<String>,
}

impl BatchBuilder<'_> {
    /// Appends one request, with the same pending-table bookkeeping as
    /// [`Client::request`].
    pub fn push<P>(mut self, id: impl Into<Id>, params: P) -> Self
    where
        P: Serialize + 'static,
    {
        let part = self.client.request(id, params);
        self.parts.push(part);
        self
    }

    /// Serializes the batch as a JSON array.
    ///
    /// # Panics
    ///
    /// Panics on an empty batch; a batch holds at least one request.
    pub fn finish(self) -> String {
        assert!(
            !self.parts.is_empty(),
            "a batch request must contain at least one request"
        );
        format!("[{}]", self.parts.join(","))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn summer_client() -> Client {
        Client::builder().method::<Vec<i64>, i64>("summer").build()
    }

    #[test]
    fn test_request_serialization_and_pending_entry() {
        let mut client = summer_client();
        let text = client.request(1, vec![1, 2, 3]);
        assert_eq!(
            text,
            r#"{"jsonrpc":"2.0","method":"summer","params":[1,2,3],"id":1}"#
        );

        let pending: Vec<_> = client.pending().collect();
        assert_eq!(pending, vec![(&Id::Number(1), "summer")]);
    }

    #[test]
    fn test_response_routing_invokes_callback_once() {
        let mut client = summer_client();
        let calls = Arc::new(AtomicUsize::new(0));
        let seen = calls.clone();
        client.on("summer", move |outcome: Result<i64, RpcError>, id| {
            assert_eq!(outcome.unwrap(), 6);
            assert_eq!(id, Id::Number(1));
            seen.fetch_add(1, Ordering::SeqCst);
        });

        client.request(1, vec![1, 2, 3]);
        client
            .call(r#"{"jsonrpc":"2.0","result":6,"id":1}"#)
            .unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(client.pending().len(), 0);
    }

    #[test]
    fn test_unknown_id_is_reported_and_pending_is_kept() {
        let mut client = summer_client();
        client.request(1, vec![1]);

        let result = client.call(r#"{"jsonrpc":"2.0","result":1,"id":2}"#);
        assert_eq!(result, Err(CallError::IdNotFound));
        assert_eq!(client.pending().len(), 1);
    }

    #[test]
    fn test_pending_table_eviction() {
        let mut client = Client::builder()
            .method::<Vec<i64>, i64>("summer")
            .capacity(3)
            .build();

        for id in 1..=5 {
            client.request(id, vec![id]);
        }

        let ids: Vec<_> = client.pending().map(|(id, _)| id.clone()).collect();
        assert_eq!(ids, vec![Id::Number(5), Id::Number(4), Id::Number(3)]);

        // The evicted ids can no longer be routed.
        assert_eq!(
            client.call(r#"{"jsonrpc":"2.0","result":1,"id":1}"#),
            Err(CallError::IdNotFound)
        );
    }

    #[test]
    fn test_response_without_result_or_error_is_a_parse_failure() {
        let mut client = summer_client();
        client.request(1, vec![1]);

        let result = client.call(r#"{"jsonrpc":"2.0","id":1}"#);
        assert!(matches!(result, Err(CallError::Parse(ref m)) if m.contains("missing key")));
    }

    #[test]
    fn test_batch_request_serialization() {
        let mut client = Client::builder()
            .method::<Vec<i64>, i64>("summer")
            .method::<String, String>("shout")
            .build();

        let text = client
            .batch()
            .push(1, vec![1, 2, 3])
            .push("s1", "hello".to_owned())
            .finish();
        assert_eq!(
            text,
            r#"[{"jsonrpc":"2.0","method":"summer","params":[1,2,3],"id":1},{"jsonrpc":"2.0","method":"shout","params":"hello","id":"s1"}]"#
        );
        assert_eq!(client.pending().len(), 2);
        // Newest entry sits at the front.
        assert_eq!(client.pending().next().unwrap().1, "shout");
    }

    #[test]
    #[should_panic(expected = "at least one request")]
    fn test_empty_batch_panics() {
        let mut client = summer_client();
        client.batch().finish();
    }

    #[test]
    #[should_panic(expected = "no client method accepts params of type")]
    fn test_unknown_params_type_panics() {
        let mut client = summer_client();
        client.request(1, true);
    }

    #[test]
    fn test_first_matching_params_type_wins() {
        let mut client = Client::builder()
            .method::<Vec<i64>, i64>("first")
            .method::<Vec<i64>, i64>("second")
            .build();

        let text = client.request(1, vec![1]);
        assert!(text.contains(r#""method":"first""#));
    }
}
