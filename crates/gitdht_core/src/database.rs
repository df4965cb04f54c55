//! Database handle: consistency routing and the network worker pool.

use crate::buffer::WriteBuffer;
use crate::config::Config;
use crate::context::Context;
use crate::error::{DhtResult, Error};
use crate::tables::{
    ChunkTable, ObjectIndexTable, RefTable, RepositoryIndexTable, RepositoryTable,
};
use bytes::Bytes;
use gitdht_store::{Batch, ColumnStore, Consistency, Failover, Policy, StoreHandle};
use parking_lot::Mutex;
use std::sync::Arc;
use tokio::runtime::{Handle, Runtime};
use tokio::sync::oneshot;

/// Connection to a wide-column store holding git repositories.
///
/// The database owns the one place consistency policies are bound to the
/// client connection: construction creates one [`StoreHandle`] per
/// [`Context`], and [`Database::store_handle`] is a pure, stable mapping
/// from context to handle for the lifetime of the instance. It also owns
/// the worker pool all network reads and buffered flushes run on.
///
/// `Database` is cheap to clone; clones share the connection and pool.
/// Use [`crate::DatabaseBuilder`] to construct one.
#[derive(Clone)]
pub struct Database {
    inner: Arc<Inner>,
}

struct Inner {
    store: Arc<dyn ColumnStore>,
    handle: Handle,
    /// Present when the builder created the pool; `shutdown` stops it.
    owned_runtime: Mutex<Option<Runtime>>,
    config: Config,
    fast_missing_ok: StoreHandle,
    local: StoreHandle,
    read_repair: StoreHandle,
}

impl Database {
    pub(crate) fn new(
        store: Arc<dyn ColumnStore>,
        handle: Handle,
        owned_runtime: Option<Runtime>,
        config: Config,
    ) -> Self {
        let fast_missing_ok = StoreHandle::new(
            Arc::clone(&store),
            Policy::new(Consistency::One, Failover::FailFast),
        );
        let read_repair = StoreHandle::new(
            Arc::clone(&store),
            Policy::new(Consistency::Quorum, Failover::TryAllAvailable),
        );
        // Without a locality-aware topology there is no meaningful local
        // quorum; the Local context shares the general quorum handle.
        let local = if config.locality_aware {
            StoreHandle::new(
                Arc::clone(&store),
                Policy::new(Consistency::LocalQuorum, Failover::TryAllAvailable),
            )
        } else {
            read_repair.clone()
        };

        tracing::debug!(
            locality_aware = config.locality_aware,
            write_buffer_size = config.write_buffer_size,
            "opened database connection"
        );

        Self {
            inner: Arc::new(Inner {
                store,
                handle,
                owned_runtime: Mutex::new(owned_runtime),
                config,
                fast_missing_ok,
                local,
                read_repair,
            }),
        }
    }

    /// The bound handle for `context`.
    ///
    /// Pure and stable: the same context always yields a handle with the
    /// same policy semantics for the lifetime of this database.
    #[must_use]
    pub fn store_handle(&self, context: Context) -> &StoreHandle {
        match context {
            Context::FastMissingOk => &self.inner.fast_missing_ok,
            Context::Local => &self.inner.local,
            Context::ReadRepair => &self.inner.read_repair,
        }
    }

    /// The repository name index adapter.
    #[must_use]
    pub fn repository_index(&self) -> RepositoryIndexTable {
        RepositoryIndexTable::new(self.clone())
    }

    /// The repository metadata adapter.
    #[must_use]
    pub fn repository(&self) -> RepositoryTable {
        RepositoryTable::new(self.clone())
    }

    /// The ref adapter.
    #[must_use]
    pub fn refs(&self) -> RefTable {
        RefTable::new(self.clone())
    }

    /// The chunk adapter.
    #[must_use]
    pub fn chunk(&self) -> ChunkTable {
        ChunkTable::new(self.clone())
    }

    /// The object index adapter.
    #[must_use]
    pub fn object_index(&self) -> ObjectIndexTable {
        ObjectIndexTable::new(self.clone())
    }

    /// Creates a write buffer for one logical write session.
    #[must_use]
    pub fn new_write_buffer(&self) -> WriteBuffer {
        WriteBuffer::new(self.clone(), self.inner.config.write_buffer_size)
    }

    /// Stops the worker pool if this database created it.
    ///
    /// Only affects a pool the builder created; a pool borrowed through a
    /// runtime handle stays untouched. In-flight operations are allowed to
    /// finish in the background. The store connection is released when the
    /// last clone of this database is dropped.
    pub fn shutdown(&self) {
        if let Some(runtime) = self.inner.owned_runtime.lock().take() {
            tracing::debug!("shutting down worker pool");
            runtime.shutdown_background();
        }
    }

    /// Runs a blocking store operation on the worker pool and delivers the
    /// result through a single-fire future. Success and failure are
    /// mutually exclusive.
    pub(crate) async fn run_read<T, F>(&self, op: F) -> DhtResult<T>
    where
        T: Send + 'static,
        F: FnOnce() -> DhtResult<T> + Send + 'static,
    {
        let (tx, rx) = oneshot::channel();
        self.inner.handle.spawn_blocking(move || {
            let _ = tx.send(op());
        });
        rx.await
            .map_err(|_| Error::task_failed("read task dropped before completing"))?
    }

    /// Submits a batch to the pool through the quorum handle, returning a
    /// receiver that fires once with the outcome.
    pub(crate) fn spawn_batch(&self, batch: Batch) -> oneshot::Receiver<DhtResult<()>> {
        let handle = self.inner.read_repair.clone();
        let (tx, rx) = oneshot::channel();
        self.inner.handle.spawn_blocking(move || {
            let result = handle.batch_mutate(batch).map_err(Error::from);
            let _ = tx.send(result);
        });
        rx
    }

    /// Applies a batch synchronously on the calling thread through the
    /// quorum handle. The immediate-visibility write path.
    pub(crate) fn mutate_now(&self, batch: Batch) -> DhtResult<()> {
        self.inner.read_repair.batch_mutate(batch)?;
        Ok(())
    }

    /// Writes one cell synchronously through the quorum handle.
    pub(crate) fn put_now(
        &self,
        family: &str,
        row: &[u8],
        column: Vec<u8>,
        value: Bytes,
    ) -> DhtResult<()> {
        let mut batch = Batch::new();
        batch.insert(family, row, column, value);
        self.mutate_now(batch)
    }
}

impl std::fmt::Debug for Database {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Database")
            .field("config", &self.inner.config)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gitdht_store::MemoryStore;

    fn database(config: Config) -> (Database, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        let db = Database::new(
            Arc::clone(&store) as Arc<dyn ColumnStore>,
            Handle::current(),
            None,
            config,
        );
        (db, store)
    }

    #[tokio::test]
    async fn context_mapping_is_pure_and_stable() {
        let (db, _) = database(Config::default());

        for _ in 0..3 {
            let fast = db.store_handle(Context::FastMissingOk).policy();
            assert_eq!(fast.consistency, Consistency::One);
            assert_eq!(fast.failover, Failover::FailFast);

            let repair = db.store_handle(Context::ReadRepair).policy();
            assert_eq!(repair.consistency, Consistency::Quorum);
            assert_eq!(repair.failover, Failover::TryAllAvailable);
        }
    }

    #[tokio::test]
    async fn local_context_falls_back_to_quorum_without_locality() {
        let (db, _) = database(Config::default());
        let local = db.store_handle(Context::Local).policy();
        assert_eq!(local.consistency, Consistency::Quorum);
        assert_eq!(local.failover, Failover::TryAllAvailable);
    }

    #[tokio::test]
    async fn local_context_uses_local_quorum_when_locality_aware() {
        let (db, _) = database(Config::new().locality_aware(true));
        let local = db.store_handle(Context::Local).policy();
        assert_eq!(local.consistency, Consistency::LocalQuorum);
        assert_eq!(local.failover, Failover::TryAllAvailable);
    }

    #[tokio::test]
    async fn put_now_is_immediately_visible() {
        let (db, store) = database(Config::default());
        db.put_now("Ref", b"r1", b"refs/heads/main".to_vec(), Bytes::from_static(b"v"))
            .unwrap();
        assert_eq!(
            store.value_of("Ref", b"r1", b"refs/heads/main").unwrap(),
            Bytes::from_static(b"v")
        );
    }

    #[tokio::test]
    async fn run_read_delivers_through_the_pool() {
        let (db, _) = database(Config::default());
        let value = db.run_read(|| Ok(41 + 1)).await.unwrap();
        assert_eq!(value, 42);
    }
}
