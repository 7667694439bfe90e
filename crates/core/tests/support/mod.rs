//! Shared test helpers for `searchlog-core` integration tests.
//!
//! These helpers provide an in-memory store with failure injection so the
//! engine tests can focus on behaviour instead of boilerplate.

pub mod stores;
