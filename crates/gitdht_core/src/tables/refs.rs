//! Ref storage.
//!
//! # Consistency caveat
//!
//! The "compare"-named operations of this adapter do **not** compare.
//! The underlying store offers no conditional update; real ref locking
//! needs an external coordination service that was never wired into the
//! original system. Until one exists, [`RefTable::compare_and_put`] and
//! [`RefTable::compare_and_remove`] ignore the expected old value,
//! perform an unconditional last-writer-wins write or delete, and always
//! report success. Two racing updates to the same ref both succeed and
//! the store's write clock picks the survivor. Callers must not treat a
//! `true` result as proof the expected value matched.

use crate::context::Context;
use crate::database::Database;
use crate::error::DhtResult;
use crate::keys::{RefData, RefKey, RepositoryKey};
use gitdht_store::{Batch, SliceRange};
use std::collections::HashMap;

const CF: &str = "Ref";

/// Adapter for the `Ref` column family.
///
/// One row per repository; one column per ref, named by the UTF-8 ref
/// name, holding the externally serialized ref state.
pub struct RefTable {
    db: Database,
}

impl RefTable {
    pub(crate) fn new(db: Database) -> Self {
        Self { db }
    }

    /// Fetches every ref of `repository`.
    ///
    /// A repository with no refs yields an empty map.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure or timeout.
    pub async fn get_all(
        &self,
        context: Context,
        repository: RepositoryKey,
    ) -> DhtResult<HashMap<RefKey, RefData>> {
        let handle = self.db.store_handle(context).clone();
        let row = repository.as_bytes();

        self.db
            .run_read(move || {
                let columns = handle.slice_range(CF, &row, &SliceRange::all())?;
                let mut refs = HashMap::with_capacity(columns.len());
                for cell in columns {
                    let name = String::from_utf8_lossy(&cell.name).into_owned();
                    refs.insert(
                        RefKey::new(repository, name),
                        RefData::from_bytes(cell.value),
                    );
                }
                Ok(refs)
            })
            .await
    }

    /// Unconditionally writes `new_data` for the ref.
    ///
    /// `old_data` is ignored — see the module-level consistency caveat.
    /// Immediate synchronous write through the quorum handle.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure or timeout.
    pub fn compare_and_put(
        &self,
        key: &RefKey,
        _old_data: Option<&RefData>,
        new_data: &RefData,
    ) -> DhtResult<bool> {
        self.db.put_now(
            CF,
            &key.repository.as_bytes(),
            key.name.as_bytes().to_vec(),
            new_data.as_bytes().clone(),
        )?;
        Ok(true)
    }

    /// Unconditionally deletes the ref.
    ///
    /// `old_data` is ignored — see the module-level consistency caveat.
    /// Immediate synchronous delete through the quorum handle.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure or timeout.
    pub fn compare_and_remove(&self, key: &RefKey, _old_data: Option<&RefData>) -> DhtResult<bool> {
        let mut batch = Batch::new();
        batch.delete_column(CF, &key.repository.as_bytes(), key.name.as_bytes().to_vec());
        self.db.mutate_now(batch)?;
        Ok(true)
    }
}
