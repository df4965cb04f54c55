//! Consistency policies and bound store handles.

use crate::error::StoreResult;
use crate::store::{Batch, Column, ColumnStore, RowSlice, Select, SliceRange};
use std::fmt;
use std::sync::Arc;

/// Replica acknowledgment level for a read or write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Consistency {
    /// A single replica acknowledges. Fastest; may observe stale data.
    One,
    /// A quorum within the nearest replica set acknowledges.
    LocalQuorum,
    /// A majority of all replicas acknowledges; reads are reconciled and
    /// repaired across replicas by the store.
    Quorum,
}

/// What the client does when a host fails mid-operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Failover {
    /// Surface the failure immediately.
    FailFast,
    /// Retry the operation against every remaining available host.
    TryAllAvailable,
}

/// The durability/visibility policy applied to one operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Policy {
    /// Replica acknowledgment level.
    pub consistency: Consistency,
    /// Host failover behavior.
    pub failover: Failover,
}

impl Policy {
    /// Creates a policy.
    #[must_use]
    pub const fn new(consistency: Consistency, failover: Failover) -> Self {
        Self {
            consistency,
            failover,
        }
    }
}

/// A store connection bound to one [`Policy`].
///
/// Handles are cheap to clone; they share the underlying client. The
/// consistency router creates one handle per operation context at
/// construction time and hands out references for the remainder of each
/// operation — a handle never changes policy after creation.
#[derive(Clone)]
pub struct StoreHandle {
    store: Arc<dyn ColumnStore>,
    policy: Policy,
}

impl StoreHandle {
    /// Binds `store` to `policy`.
    #[must_use]
    pub fn new(store: Arc<dyn ColumnStore>, policy: Policy) -> Self {
        Self { store, policy }
    }

    /// The policy this handle applies to every call.
    #[must_use]
    pub fn policy(&self) -> Policy {
        self.policy
    }

    /// Fetches a single column. See [`ColumnStore::get_column`].
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure or timeout.
    pub fn get_column(
        &self,
        family: &str,
        row: &[u8],
        name: &[u8],
    ) -> StoreResult<Option<Column>> {
        self.store.get_column(&self.policy, family, row, name)
    }

    /// Fetches a column range of one row. See [`ColumnStore::slice_range`].
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure or timeout.
    pub fn slice_range(
        &self,
        family: &str,
        row: &[u8],
        range: &SliceRange,
    ) -> StoreResult<Vec<Column>> {
        self.store.slice_range(&self.policy, family, row, range)
    }

    /// Fetches a selection across many rows. See
    /// [`ColumnStore::multiget_slice`].
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure or timeout.
    pub fn multiget_slice(
        &self,
        family: &str,
        rows: &[Vec<u8>],
        select: &Select,
    ) -> StoreResult<Vec<RowSlice>> {
        self.store.multiget_slice(&self.policy, family, rows, select)
    }

    /// Applies a batch as one request. See [`ColumnStore::batch_mutate`].
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure or timeout.
    pub fn batch_mutate(&self, batch: Batch) -> StoreResult<()> {
        self.store.batch_mutate(&self.policy, batch)
    }
}

impl fmt::Debug for StoreHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoreHandle")
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryStore;

    #[test]
    fn handle_applies_its_policy() {
        let store = Arc::new(MemoryStore::new());
        let policy = Policy::new(Consistency::Quorum, Failover::TryAllAvailable);
        let handle = StoreHandle::new(store, policy);

        assert_eq!(handle.policy(), policy);
        let copy = handle.clone();
        assert_eq!(copy.policy(), policy);
    }
}
