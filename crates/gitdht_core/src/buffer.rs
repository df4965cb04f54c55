//! Write buffering and batched flushing.

use crate::database::Database;
use crate::error::{DhtResult, Error};
use bytes::Bytes;
use gitdht_store::Batch;
use tokio::sync::oneshot;

/// Accumulates mutations and ships them as large batches.
///
/// A buffer amortizes many small logical mutations into larger network
/// operations. Mutations accumulate until the running byte estimate
/// reaches the configured threshold, at which point everything pending —
/// the triggering mutation included — ships as exactly one batch,
/// submitted asynchronously to the worker pool. The buffer resets to
/// empty before the batch completes, so new accumulation can begin
/// immediately; the outcome of every batch started by this buffer
/// surfaces at the next [`flush`](Self::flush).
///
/// A mutation too large to ever fit under the threshold bypasses
/// buffering: pending mutations ship first (preserving acceptance order),
/// then the oversized mutation goes out as its own immediate batch.
///
/// Within one buffer, mutations flush in the order they were accepted,
/// and a flush is all-or-nothing at the batch level — the buffer never
/// splits pending mutations across batches. Across buffers, or between
/// the buffered and direct write paths, nothing is ordered; the store's
/// last-writer-wins clock decides races.
///
/// A buffer belongs to one logical write session. The `&mut self` API
/// forbids concurrent use by construction.
pub struct WriteBuffer {
    db: Database,
    /// Flush threshold, bytes.
    limit: usize,
    /// Mutations accepted since the last flush or abort, in order.
    pending: Batch,
    /// Byte estimate of `pending`.
    queued_bytes: usize,
    /// Outcomes of batches already submitted.
    running: Vec<oneshot::Receiver<DhtResult<()>>>,
}

impl WriteBuffer {
    pub(crate) fn new(db: Database, limit: usize) -> Self {
        Self {
            db,
            limit,
            pending: Batch::new(),
            queued_bytes: 0,
            running: Vec::new(),
        }
    }

    /// Buffers one cell insertion.
    pub fn put(&mut self, family: &str, row: &[u8], column: Vec<u8>, value: Bytes) {
        self.put_columns(family, row, vec![(column, value)]);
    }

    /// Buffers the insertion of several cells of one row.
    ///
    /// The cells stay together: they land in the same batch, or — when
    /// their combined size can never fit under the threshold — in one
    /// immediate standalone batch.
    pub fn put_columns(&mut self, family: &str, row: &[u8], columns: Vec<(Vec<u8>, Bytes)>) {
        let mut size = family.len() + row.len();
        for (name, value) in &columns {
            size += name.len() + value.len();
        }

        if self.add(size) {
            for (name, value) in columns {
                self.pending.insert(family, row, name, value);
            }
            self.queued(size);
        } else {
            let mut batch = Batch::new();
            for (name, value) in columns {
                batch.insert(family, row, name, value);
            }
            self.start(batch, size);
        }
    }

    /// Buffers a single-cell deletion.
    pub fn delete(&mut self, family: &str, row: &[u8], column: Vec<u8>) {
        let size = family.len() + row.len() + column.len();
        if self.add(size) {
            self.pending.delete_column(family, row, column);
            self.queued(size);
        } else {
            let mut batch = Batch::new();
            batch.delete_column(family, row, column);
            self.start(batch, size);
        }
    }

    /// Buffers a whole-row deletion.
    pub fn delete_row(&mut self, family: &str, row: &[u8]) {
        let size = family.len() + row.len();
        if self.add(size) {
            self.pending.delete_row(family, row);
            self.queued(size);
        } else {
            let mut batch = Batch::new();
            batch.delete_row(family, row);
            self.start(batch, size);
        }
    }

    /// Decides the path for a mutation of estimated `size`.
    ///
    /// Returns true when the mutation can accumulate. Returns false when
    /// it alone can never fit under the threshold; pending mutations are
    /// submitted first so the standalone batch never delays buffered
    /// accumulation. Cross-batch completion order follows the pool.
    fn add(&mut self, size: usize) -> bool {
        if size > self.limit {
            self.flush_pending();
            return false;
        }
        true
    }

    /// Commits an accepted mutation's size. Crossing the threshold
    /// triggers the automatic flush, triggering mutation included.
    fn queued(&mut self, size: usize) {
        self.queued_bytes += size;
        if self.queued_bytes >= self.limit {
            self.flush_pending();
        }
    }

    /// Ships everything pending as one asynchronous batch and resets the
    /// accumulation state.
    fn flush_pending(&mut self) {
        if self.pending.is_empty() {
            self.queued_bytes = 0;
            return;
        }
        let batch = std::mem::take(&mut self.pending);
        let bytes = self.queued_bytes;
        self.queued_bytes = 0;
        self.start(batch, bytes);
    }

    fn start(&mut self, batch: Batch, bytes: usize) {
        tracing::trace!(mutations = batch.len(), bytes, "starting batch write");
        self.running.push(self.db.spawn_batch(batch));
    }

    /// Ships any pending mutations, then waits for every batch this
    /// buffer has started since the last flush or abort.
    ///
    /// The buffer is empty and reusable afterwards, whatever the outcome.
    ///
    /// # Errors
    ///
    /// Surfaces the first failure among the awaited batches, including
    /// failures of earlier automatic flushes.
    pub async fn flush(&mut self) -> DhtResult<()> {
        self.flush_pending();

        let mut result = Ok(());
        for rx in self.running.drain(..) {
            let outcome = match rx.await {
                Ok(outcome) => outcome,
                Err(_) => Err(Error::task_failed("batch write dropped before completing")),
            };
            if let (Err(err), Ok(())) = (outcome, &result) {
                result = Err(err);
            }
        }
        result
    }

    /// Discards all pending mutations without issuing any network
    /// operation. Legal in any state.
    ///
    /// Batches already submitted cannot be cancelled; abort merely stops
    /// observing them. A subsequent mutation behaves as if the buffer
    /// were newly created.
    pub fn abort(&mut self) {
        self.pending = Batch::new();
        self.queued_bytes = 0;
        self.running.clear();
    }

    /// Byte estimate of the mutations currently pending.
    #[must_use]
    pub fn pending_bytes(&self) -> usize {
        self.queued_bytes
    }

    /// Number of mutations currently pending.
    #[must_use]
    pub fn pending_mutations(&self) -> usize {
        self.pending.len()
    }
}

impl std::fmt::Debug for WriteBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WriteBuffer")
            .field("limit", &self.limit)
            .field("queued_bytes", &self.queued_bytes)
            .field("pending_mutations", &self.pending.len())
            .field("running", &self.running.len())
            .finish()
    }
}
