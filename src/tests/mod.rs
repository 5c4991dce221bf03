//! Test modules for the typed-jsonrpc endpoint kit.
//!
//! This module contains the cross-component suites:
//! - Integration tests driving full server/client round trips, including
//!   literal request/response scenarios from the JSON-RPC 2.0 specification
//! - Property-based tests using proptest for the dispatcher invariants
//!   (batch ordering, notification silence, pending-table bounds, error-code
//!   fidelity)
//!
//! Unit tests for each component live in `#[cfg(test)]` modules next to the
//! code they exercise.
