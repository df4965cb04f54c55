//! Wide-column store client trait definition.

use crate::error::StoreResult;
use crate::policy::Policy;
use bytes::Bytes;

/// A single cell read back from the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    /// The column name, possibly a composite `prefix:suffix` name.
    pub name: Vec<u8>,
    /// The opaque column value.
    pub value: Bytes,
    /// Store-assigned write clock for this cell, in microseconds.
    ///
    /// Concurrent writers to the same cell are resolved last-writer-wins
    /// by this clock; readers may use it as an ordering marker.
    pub timestamp: u64,
}

/// The columns of one row returned by a multi-row read.
#[derive(Debug, Clone)]
pub struct RowSlice {
    /// The row key.
    pub row: Vec<u8>,
    /// The matching columns, in column-name order. May be empty when the
    /// row exists but holds no columns in the requested selection.
    pub columns: Vec<Column>,
}

/// A half-open byte range `[start, end)` over column names.
///
/// An empty `end` means the range is unbounded above.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SliceRange {
    /// Inclusive lower bound.
    pub start: Vec<u8>,
    /// Exclusive upper bound; empty means unbounded.
    pub end: Vec<u8>,
}

impl SliceRange {
    /// A range covering every column of a row.
    #[must_use]
    pub fn all() -> Self {
        Self {
            start: Vec::new(),
            end: Vec::new(),
        }
    }

    /// Returns true when `name` falls inside this range.
    #[must_use]
    pub fn contains(&self, name: &[u8]) -> bool {
        name >= self.start.as_slice() && (self.end.is_empty() || name < self.end.as_slice())
    }
}

/// Column selection for slice reads.
#[derive(Debug, Clone)]
pub enum Select {
    /// Exactly these column names.
    Names(Vec<Vec<u8>>),
    /// Every column whose name falls in the range.
    Range(SliceRange),
}

/// One entry of a [`Batch`].
#[derive(Debug, Clone)]
pub enum BatchOp {
    /// Insert (or overwrite) a single cell.
    Insert {
        /// Target column family.
        family: String,
        /// Row key.
        row: Vec<u8>,
        /// Column name.
        column: Vec<u8>,
        /// Cell value.
        value: Bytes,
    },
    /// Delete a single cell.
    DeleteColumn {
        /// Target column family.
        family: String,
        /// Row key.
        row: Vec<u8>,
        /// Column name.
        column: Vec<u8>,
    },
    /// Delete an entire row.
    DeleteRow {
        /// Target column family.
        family: String,
        /// Row key.
        row: Vec<u8>,
    },
}

/// An ordered list of mutations executed as one request.
///
/// The store applies entries in order within the batch, but the batch as a
/// whole is **not** a transaction: a failure may leave a prefix applied.
#[derive(Debug, Clone, Default)]
pub struct Batch {
    /// The mutations, in submission order.
    pub ops: Vec<BatchOp>,
}

impl Batch {
    /// Creates an empty batch.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an insertion.
    pub fn insert(&mut self, family: &str, row: &[u8], column: Vec<u8>, value: Bytes) {
        self.ops.push(BatchOp::Insert {
            family: family.to_string(),
            row: row.to_vec(),
            column,
            value,
        });
    }

    /// Appends a single-column deletion.
    pub fn delete_column(&mut self, family: &str, row: &[u8], column: Vec<u8>) {
        self.ops.push(BatchOp::DeleteColumn {
            family: family.to_string(),
            row: row.to_vec(),
            column,
        });
    }

    /// Appends a whole-row deletion.
    pub fn delete_row(&mut self, family: &str, row: &[u8]) {
        self.ops.push(BatchOp::DeleteRow {
            family: family.to_string(),
            row: row.to_vec(),
        });
    }

    /// Number of mutations in the batch.
    #[must_use]
    pub fn len(&self) -> usize {
        self.ops.len()
    }

    /// Returns true when the batch holds no mutations.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }
}

/// A client for a wide-column (row/column-family) data store.
///
/// Implementations are **network clients**: each method is one synchronous
/// request against the store, executed with the consistency and failover
/// behavior carried by the supplied [`Policy`]. Callers that need
/// asynchrony submit these calls to a worker pool; the trait itself stays
/// synchronous so implementations remain trivial to write.
///
/// # Invariants
///
/// - Absent rows and columns are normal results, never errors.
/// - `batch_mutate` issues exactly one request for the whole batch.
/// - Implementations must be `Send + Sync`; one client instance is shared
///   by every handle bound to it.
pub trait ColumnStore: Send + Sync {
    /// Fetches a single column of a single row.
    ///
    /// Returns `None` when the row or the column does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure or timeout.
    fn get_column(
        &self,
        policy: &Policy,
        family: &str,
        row: &[u8],
        name: &[u8],
    ) -> StoreResult<Option<Column>>;

    /// Fetches all columns of one row whose names fall in `range`.
    ///
    /// Returns an empty vector when the row does not exist or no column
    /// matches.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure or timeout.
    fn slice_range(
        &self,
        policy: &Policy,
        family: &str,
        row: &[u8],
        range: &SliceRange,
    ) -> StoreResult<Vec<Column>>;

    /// Fetches a column selection across many rows in one request.
    ///
    /// Rows absent from the store are omitted from the result; callers
    /// must treat a missing row as not-found, distinct from a failure.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure or timeout.
    fn multiget_slice(
        &self,
        policy: &Policy,
        family: &str,
        rows: &[Vec<u8>],
        select: &Select,
    ) -> StoreResult<Vec<RowSlice>>;

    /// Applies every mutation of `batch` as one request.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure or timeout. A failed batch
    /// may have been partially applied; the store offers no atomicity
    /// across rows.
    fn batch_mutate(&self, policy: &Policy, batch: Batch) -> StoreResult<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slice_range_all_contains_everything() {
        let range = SliceRange::all();
        assert!(range.contains(b""));
        assert!(range.contains(b"anything"));
        assert!(range.contains(&[0xFF, 0xFF]));
    }

    #[test]
    fn slice_range_bounds_are_half_open() {
        let range = SliceRange {
            start: b"info:".to_vec(),
            end: b"info;".to_vec(),
        };
        assert!(range.contains(b"info:"));
        assert!(range.contains(b"info:abc"));
        assert!(!range.contains(b"info;"));
        assert!(!range.contains(b"infa"));
    }

    #[test]
    fn batch_preserves_order() {
        let mut batch = Batch::new();
        batch.insert("Chunk", b"r1", b"chunk".to_vec(), Bytes::from_static(b"v"));
        batch.delete_column("Chunk", b"r1", b"meta".to_vec());
        batch.delete_row("Chunk", b"r2");

        assert_eq!(batch.len(), 3);
        assert!(matches!(batch.ops[0], BatchOp::Insert { .. }));
        assert!(matches!(batch.ops[1], BatchOp::DeleteColumn { .. }));
        assert!(matches!(batch.ops[2], BatchOp::DeleteRow { .. }));
    }
}
