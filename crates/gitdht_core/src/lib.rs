//! # gitdht Core
//!
//! Wide-column storage adapter engine for distributed git repositories.
//!
//! This crate maps git repository data — refs, pack chunks, the object
//! index, and repository metadata — onto a row/column-family store
//! reached through the [`gitdht_store`] client boundary. It owns the
//! three engine concerns the table adapters are built on:
//!
//! - **Consistency routing**: every read and write names a [`Context`]
//!   describing its tolerance for stale or missing data, and the
//!   [`Database`] maps each context to a fixed store handle with bound
//!   consistency and failover policy
//! - **Write buffering**: a [`WriteBuffer`] accumulates mutations and
//!   ships them as large asynchronous batches, flushing automatically
//!   when a byte threshold is crossed
//! - **Composite column namespacing**: a [`ColumnMatcher`] packs
//!   logically distinct entry kinds into one row under prefixed column
//!   names, with prefix-safe encode, match, and strip operations
//!
//! ## Layout
//!
//! One column family per entity: `RepositoryIndex` (name lookup),
//! `Repository` (per-repository metadata), `Ref`, `Chunk`, and
//! `ObjectIndex`. Each has a typed adapter in [`tables`], reached
//! through accessors on [`Database`].
//!
//! ## Example
//!
//! ```rust
//! use gitdht_core::{ChunkKey, Context, DatabaseBuilder, PackChunk};
//! use gitdht_store::MemoryStore;
//! use bytes::Bytes;
//! use std::sync::Arc;
//!
//! # #[tokio::main(flavor = "multi_thread")]
//! # async fn main() -> Result<(), gitdht_core::Error> {
//! let db = DatabaseBuilder::new()
//!     .set_uri("git+cassandra://db.example.com/Main/GitStore")?
//!     .store(Arc::new(MemoryStore::new()))
//!     .runtime_handle(tokio::runtime::Handle::current())
//!     .build()?;
//!
//! let key = ChunkKey::from_bytes(b"chunk-1".to_vec());
//! let mut chunk = PackChunk::new(key.clone());
//! chunk.data = Some(Bytes::from_static(b"pack bytes"));
//!
//! let mut buffer = db.new_write_buffer();
//! db.chunk().put(&chunk, &mut buffer);
//! buffer.flush().await?;
//!
//! let found = db.chunk().get(Context::ReadRepair, &[key]).await?;
//! assert_eq!(found[0].data.as_deref(), Some(b"pack bytes".as_slice()));
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod buffer;
mod builder;
mod colmatch;
mod config;
mod context;
mod database;
mod error;
mod keys;
pub mod tables;

pub use buffer::WriteBuffer;
pub use builder::DatabaseBuilder;
pub use colmatch::ColumnMatcher;
pub use config::Config;
pub use context::Context;
pub use database::Database;
pub use error::{DhtResult, Error};
pub use keys::{
    CachedPackInfo, CachedPackKey, ChunkInfo, ChunkKey, ObjectIndexKey, ObjectInfo, PackChunk,
    RefData, RefKey, RepositoryKey, RepositoryName,
};
