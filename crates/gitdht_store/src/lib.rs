//! # gitdht Store
//!
//! Wide-column store client boundary for gitdht.
//!
//! This crate defines the lowest-level abstraction of the workspace: a
//! client for a row/column-family data store. Implementations are **opaque
//! byte stores over the network** — they know nothing about git, composite
//! column namespaces, or write buffering; all of that lives in
//! `gitdht_core`.
//!
//! ## Design principles
//!
//! - Four primitives: single-column fetch, single-row range slice,
//!   multi-row slice, and one batched mutate call
//! - Every call carries an explicit [`Policy`] (consistency level plus
//!   failover behavior); clients never pick a default silently
//! - Store-native errors are wrapped into [`StoreError`]; absent data is
//!   never an error
//! - Must be `Send + Sync` for shared access from a worker pool
//!
//! ## Available stores
//!
//! - [`MemoryStore`] — in-memory, for tests and ephemeral use
//!
//! ## Example
//!
//! ```rust
//! use gitdht_store::{Batch, ColumnStore, Consistency, Failover, MemoryStore, Policy};
//! use bytes::Bytes;
//!
//! let store = MemoryStore::new();
//! let policy = Policy::new(Consistency::One, Failover::FailFast);
//!
//! let mut batch = Batch::new();
//! batch.insert("Ref", b"repo1", b"refs/heads/main".to_vec(), Bytes::from_static(b"ref"));
//! store.batch_mutate(&policy, batch).unwrap();
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod error;
mod memory;
mod policy;
mod store;

pub use error::{StoreError, StoreResult};
pub use memory::MemoryStore;
pub use policy::{Consistency, Failover, Policy, StoreHandle};
pub use store::{Batch, BatchOp, Column, ColumnStore, RowSlice, Select, SliceRange};
