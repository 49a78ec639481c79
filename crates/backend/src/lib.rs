//! Sokoni Backend - the hosted data-store capability.
//!
//! Everything above this crate treats the backing service as an opaque
//! capability set: read and write documents, watch a document for changes,
//! verify credentials, store media blobs. The [`Backend`] trait is that
//! capability set; nothing else in the workspace names a concrete backend.
//!
//! # Implementations
//!
//! - [`RemoteBackend`] - HTTP client against the hosted document API
//! - [`MemoryBackend`] - in-process store, used by tests and dev setups
//! - [`LocalBackend`] - the memory store bootstrapped from and flushed to
//!   a JSON file on disk (the demo/"become a seller" path)
//!
//! Which one a binary gets is decided by [`BackendConfig`] - by
//! configuration, never by ad hoc calls scattered across handlers.
//!
//! # Consistency model
//!
//! Writes are last-writer-wins per document with no version checks;
//! concurrent sessions of the same account can interleave writes
//! non-deterministically. Watch delivery is latest-value-wins (conflated)
//! and monotonic per document by revision. Both are deliberate: this is
//! a storefront cart, not a ledger.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod document;
pub mod local;
pub mod memory;
pub mod remote;
mod store;

pub use config::{BackendConfig, BackendConfigError};
pub use document::{DocumentRef, Snapshot, WriteMode};
pub use local::LocalBackend;
pub use memory::MemoryBackend;
pub use remote::RemoteBackend;
pub use store::{AuthError, Backend, DocumentWatch, Identity, StoreError, collections};
