//! In-memory column store for testing.

use crate::error::{StoreError, StoreResult};
use crate::policy::Policy;
use crate::store::{Batch, BatchOp, Column, ColumnStore, RowSlice, Select, SliceRange};
use bytes::Bytes;
use parking_lot::{Mutex, RwLock};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::ops::Bound;
use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Debug, Clone)]
struct Cell {
    value: Bytes,
    timestamp: u64,
}

/// Rows of one column family. Columns are kept ordered by name so range
/// reads behave like the real store's comparator.
type Family = HashMap<Vec<u8>, BTreeMap<Vec<u8>, Cell>>;

/// An in-memory wide-column store.
///
/// This store keeps all data in memory and is the test double for every
/// adapter in this workspace. Beyond the [`ColumnStore`] contract it
/// records each `batch_mutate` call it receives, so tests can observe
/// exactly which batches a write buffer shipped, and it supports injecting
/// a one-shot failure for error-path tests.
///
/// # Thread safety
///
/// The store is thread-safe and designed to be shared behind an `Arc`.
///
/// # Example
///
/// ```rust
/// use gitdht_store::{Batch, ColumnStore, Consistency, Failover, MemoryStore, Policy};
/// use bytes::Bytes;
///
/// let store = MemoryStore::new();
/// let policy = Policy::new(Consistency::Quorum, Failover::TryAllAvailable);
///
/// let mut batch = Batch::new();
/// batch.insert("Chunk", b"r1", b"chunk".to_vec(), Bytes::from_static(b"data"));
/// store.batch_mutate(&policy, batch).unwrap();
///
/// let col = store.get_column(&policy, "Chunk", b"r1", b"chunk").unwrap();
/// assert_eq!(col.unwrap().value.as_ref(), b"data");
/// ```
#[derive(Debug, Default)]
pub struct MemoryStore {
    families: RwLock<HashMap<String, Family>>,
    /// When set, only these column families may be addressed.
    schema: Option<HashSet<String>>,
    /// Monotonic write clock, microsecond-flavored.
    clock: AtomicU64,
    /// Every batch received, in arrival order.
    batches: Mutex<Vec<Batch>>,
    /// A failure to return from the next operation.
    fault: Mutex<Option<StoreError>>,
}

impl MemoryStore {
    /// Creates an empty, schemaless store. Column families spring into
    /// existence on first write.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store restricted to the given column families.
    ///
    /// Any operation naming another family fails with
    /// [`StoreError::UnknownColumnFamily`].
    #[must_use]
    pub fn with_families<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let schema: HashSet<String> = names.into_iter().map(Into::into).collect();
        let families = schema
            .iter()
            .map(|name| (name.clone(), Family::new()))
            .collect();
        Self {
            families: RwLock::new(families),
            schema: Some(schema),
            ..Self::default()
        }
    }

    /// Returns every batch received so far, in arrival order.
    #[must_use]
    pub fn flushed_batches(&self) -> Vec<Batch> {
        self.batches.lock().clone()
    }

    /// Number of batches received so far.
    #[must_use]
    pub fn batch_count(&self) -> usize {
        self.batches.lock().len()
    }

    /// Forgets all recorded batches. Stored data is unaffected.
    pub fn clear_batches(&self) {
        self.batches.lock().clear();
    }

    /// Makes the next operation fail with `error`.
    pub fn fail_next(&self, error: StoreError) {
        *self.fault.lock() = Some(error);
    }

    /// Direct accessor for a stored value, for assertions in tests.
    #[must_use]
    pub fn value_of(&self, family: &str, row: &[u8], name: &[u8]) -> Option<Bytes> {
        let families = self.families.read();
        let cell = families.get(family)?.get(row)?.get(name)?;
        Some(cell.value.clone())
    }

    fn check_family(&self, family: &str) -> StoreResult<()> {
        match &self.schema {
            Some(schema) if !schema.contains(family) => {
                Err(StoreError::UnknownColumnFamily(family.to_string()))
            }
            _ => Ok(()),
        }
    }

    fn take_fault(&self) -> StoreResult<()> {
        match self.fault.lock().take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn next_timestamp(&self) -> u64 {
        self.clock.fetch_add(1, Ordering::SeqCst) + 1
    }
}

fn columns_in_range(row: &BTreeMap<Vec<u8>, Cell>, range: &SliceRange) -> Vec<Column> {
    let upper = if range.end.is_empty() {
        Bound::Unbounded
    } else {
        Bound::Excluded(range.end.clone())
    };
    row.range((Bound::Included(range.start.clone()), upper))
        .map(|(name, cell)| Column {
            name: name.clone(),
            value: cell.value.clone(),
            timestamp: cell.timestamp,
        })
        .collect()
}

fn columns_by_name(row: &BTreeMap<Vec<u8>, Cell>, names: &[Vec<u8>]) -> Vec<Column> {
    // Real stores return name-filtered slices in comparator order, not in
    // the order the names were requested.
    let wanted: HashSet<&[u8]> = names.iter().map(Vec::as_slice).collect();
    row.iter()
        .filter(|(name, _)| wanted.contains(name.as_slice()))
        .map(|(name, cell)| Column {
            name: name.clone(),
            value: cell.value.clone(),
            timestamp: cell.timestamp,
        })
        .collect()
}

impl ColumnStore for MemoryStore {
    fn get_column(
        &self,
        _policy: &Policy,
        family: &str,
        row: &[u8],
        name: &[u8],
    ) -> StoreResult<Option<Column>> {
        self.take_fault()?;
        self.check_family(family)?;

        let families = self.families.read();
        let cell = families
            .get(family)
            .and_then(|rows| rows.get(row))
            .and_then(|cols| cols.get(name));
        Ok(cell.map(|cell| Column {
            name: name.to_vec(),
            value: cell.value.clone(),
            timestamp: cell.timestamp,
        }))
    }

    fn slice_range(
        &self,
        _policy: &Policy,
        family: &str,
        row: &[u8],
        range: &SliceRange,
    ) -> StoreResult<Vec<Column>> {
        self.take_fault()?;
        self.check_family(family)?;

        let families = self.families.read();
        let columns = families
            .get(family)
            .and_then(|rows| rows.get(row))
            .map(|cols| columns_in_range(cols, range))
            .unwrap_or_default();
        Ok(columns)
    }

    fn multiget_slice(
        &self,
        _policy: &Policy,
        family: &str,
        rows: &[Vec<u8>],
        select: &Select,
    ) -> StoreResult<Vec<RowSlice>> {
        self.take_fault()?;
        self.check_family(family)?;

        let families = self.families.read();
        let mut result = Vec::new();
        let Some(stored) = families.get(family) else {
            return Ok(result);
        };

        for row in rows {
            let Some(cols) = stored.get(row) else {
                // Absent rows are omitted: not-found, not an error.
                continue;
            };
            let columns = match select {
                Select::Names(names) => columns_by_name(cols, names),
                Select::Range(range) => columns_in_range(cols, range),
            };
            result.push(RowSlice {
                row: row.clone(),
                columns,
            });
        }
        Ok(result)
    }

    fn batch_mutate(&self, _policy: &Policy, batch: Batch) -> StoreResult<()> {
        self.take_fault()?;
        for op in &batch.ops {
            let family = match op {
                BatchOp::Insert { family, .. }
                | BatchOp::DeleteColumn { family, .. }
                | BatchOp::DeleteRow { family, .. } => family,
            };
            self.check_family(family)?;
        }

        let mut families = self.families.write();
        for op in &batch.ops {
            match op {
                BatchOp::Insert {
                    family,
                    row,
                    column,
                    value,
                } => {
                    let timestamp = self.next_timestamp();
                    families
                        .entry(family.clone())
                        .or_default()
                        .entry(row.clone())
                        .or_default()
                        .insert(
                            column.clone(),
                            Cell {
                                value: value.clone(),
                                timestamp,
                            },
                        );
                }
                BatchOp::DeleteColumn {
                    family,
                    row,
                    column,
                } => {
                    if let Some(cols) = families.get_mut(family).and_then(|rows| rows.get_mut(row))
                    {
                        cols.remove(column);
                    }
                }
                BatchOp::DeleteRow { family, row } => {
                    if let Some(rows) = families.get_mut(family) {
                        rows.remove(row);
                    }
                }
            }
        }
        drop(families);

        self.batches.lock().push(batch);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::{Consistency, Failover};

    fn policy() -> Policy {
        Policy::new(Consistency::Quorum, Failover::TryAllAvailable)
    }

    fn insert(store: &MemoryStore, family: &str, row: &[u8], col: &[u8], val: &[u8]) {
        let mut batch = Batch::new();
        batch.insert(family, row, col.to_vec(), Bytes::copy_from_slice(val));
        store.batch_mutate(&policy(), batch).unwrap();
    }

    #[test]
    fn missing_row_and_column_are_none() {
        let store = MemoryStore::new();
        assert!(store
            .get_column(&policy(), "Chunk", b"r1", b"chunk")
            .unwrap()
            .is_none());

        insert(&store, "Chunk", b"r1", b"chunk", b"v");
        assert!(store
            .get_column(&policy(), "Chunk", b"r1", b"meta")
            .unwrap()
            .is_none());
    }

    #[test]
    fn insert_then_get_round_trips() {
        let store = MemoryStore::new();
        insert(&store, "Chunk", b"r1", b"chunk", b"data");

        let col = store
            .get_column(&policy(), "Chunk", b"r1", b"chunk")
            .unwrap()
            .unwrap();
        assert_eq!(col.value.as_ref(), b"data");
        assert!(col.timestamp > 0);
    }

    #[test]
    fn timestamps_are_monotonic_per_write() {
        let store = MemoryStore::new();
        insert(&store, "ObjectIndex", b"o1", b"info:c1", b"a");
        insert(&store, "ObjectIndex", b"o1", b"info:c2", b"b");

        let c1 = store
            .get_column(&policy(), "ObjectIndex", b"o1", b"info:c1")
            .unwrap()
            .unwrap();
        let c2 = store
            .get_column(&policy(), "ObjectIndex", b"o1", b"info:c2")
            .unwrap()
            .unwrap();
        assert!(c2.timestamp > c1.timestamp);
    }

    #[test]
    fn slice_range_is_ordered_and_half_open() {
        let store = MemoryStore::new();
        insert(&store, "Repository", b"r1", b"cachedPack:b", b"2");
        insert(&store, "Repository", b"r1", b"cachedPack:a", b"1");
        insert(&store, "Repository", b"r1", b"chunkInfo:x", b"3");

        let range = SliceRange {
            start: b"cachedPack:".to_vec(),
            end: b"cachedPack\xFF".to_vec(),
        };
        let cols = store
            .slice_range(&policy(), "Repository", b"r1", &range)
            .unwrap();
        let names: Vec<&[u8]> = cols.iter().map(|c| c.name.as_slice()).collect();
        assert_eq!(names, vec![&b"cachedPack:a"[..], &b"cachedPack:b"[..]]);
    }

    #[test]
    fn unbounded_range_returns_all_columns() {
        let store = MemoryStore::new();
        insert(&store, "Ref", b"r1", b"refs/heads/main", b"a");
        insert(&store, "Ref", b"r1", b"refs/tags/v1", b"b");

        let cols = store
            .slice_range(&policy(), "Ref", b"r1", &SliceRange::all())
            .unwrap();
        assert_eq!(cols.len(), 2);
    }

    #[test]
    fn multiget_omits_absent_rows() {
        let store = MemoryStore::new();
        insert(&store, "Chunk", b"r1", b"chunk", b"v");

        let rows = vec![b"r1".to_vec(), b"r2".to_vec()];
        let select = Select::Names(vec![b"chunk".to_vec()]);
        let slices = store
            .multiget_slice(&policy(), "Chunk", &rows, &select)
            .unwrap();
        assert_eq!(slices.len(), 1);
        assert_eq!(slices[0].row, b"r1".to_vec());
    }

    #[test]
    fn multiget_name_filter_drops_other_columns() {
        let store = MemoryStore::new();
        insert(&store, "Chunk", b"r1", b"chunk", b"v");
        insert(&store, "Chunk", b"r1", b"extra", b"x");

        let rows = vec![b"r1".to_vec()];
        let select = Select::Names(vec![b"chunk".to_vec(), b"meta".to_vec()]);
        let slices = store
            .multiget_slice(&policy(), "Chunk", &rows, &select)
            .unwrap();
        assert_eq!(slices[0].columns.len(), 1);
        assert_eq!(slices[0].columns[0].name, b"chunk".to_vec());
    }

    #[test]
    fn delete_column_and_row() {
        let store = MemoryStore::new();
        insert(&store, "Chunk", b"r1", b"chunk", b"v");
        insert(&store, "Chunk", b"r1", b"meta", b"m");

        let mut batch = Batch::new();
        batch.delete_column("Chunk", b"r1", b"meta".to_vec());
        store.batch_mutate(&policy(), batch).unwrap();
        assert!(store.value_of("Chunk", b"r1", b"meta").is_none());
        assert!(store.value_of("Chunk", b"r1", b"chunk").is_some());

        let mut batch = Batch::new();
        batch.delete_row("Chunk", b"r1");
        store.batch_mutate(&policy(), batch).unwrap();
        assert!(store.value_of("Chunk", b"r1", b"chunk").is_none());
    }

    #[test]
    fn batches_are_recorded_in_order() {
        let store = MemoryStore::new();
        insert(&store, "A", b"r", b"c1", b"1");
        insert(&store, "A", b"r", b"c2", b"2");

        let batches = store.flushed_batches();
        assert_eq!(batches.len(), 2);
        assert_eq!(batches[0].len(), 1);
        store.clear_batches();
        assert_eq!(store.batch_count(), 0);
    }

    #[test]
    fn strict_schema_rejects_unknown_family() {
        let store = MemoryStore::with_families(["Chunk"]);
        let result = store.get_column(&policy(), "Nope", b"r", b"c");
        assert!(matches!(result, Err(StoreError::UnknownColumnFamily(_))));

        let mut batch = Batch::new();
        batch.insert("Nope", b"r", b"c".to_vec(), Bytes::new());
        assert!(store.batch_mutate(&policy(), batch).is_err());
    }

    #[test]
    fn injected_fault_fails_exactly_once() {
        let store = MemoryStore::new();
        store.fail_next(StoreError::connection("socket reset"));

        let err = store.get_column(&policy(), "Chunk", b"r", b"c").unwrap_err();
        assert!(matches!(err, StoreError::Connection(_)));

        // Next call succeeds again.
        assert!(store.get_column(&policy(), "Chunk", b"r", b"c").is_ok());
    }
}
