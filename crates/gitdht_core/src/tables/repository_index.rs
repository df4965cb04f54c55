//! Repository name lookup.

use crate::colmatch::ColumnMatcher;
use crate::context::Context;
use crate::database::Database;
use crate::error::DhtResult;
use crate::keys::{RepositoryKey, RepositoryName};
use bytes::Bytes;
use gitdht_store::Batch;

const CF_INDEX: &str = "RepositoryIndex";
const CF_REPOSITORY: &str = "Repository";

/// Marker value for presence-only columns.
const TRUE: &[u8] = b"1";

/// Adapter for the `RepositoryIndex` column family.
///
/// Maps human-readable repository names to [`RepositoryKey`]s: one row
/// per name, carrying the bare `id` column. Each registration also
/// writes a reverse `name:<name>` marker into the repository's own row
/// so the owning names of a repository can be enumerated.
pub struct RepositoryIndexTable {
    db: Database,
    col_id: ColumnMatcher,
    col_name: ColumnMatcher,
}

impl RepositoryIndexTable {
    pub(crate) fn new(db: Database) -> Self {
        Self {
            db,
            col_id: ColumnMatcher::new("id"),
            col_name: ColumnMatcher::new("name:"),
        }
    }

    /// Looks up the key registered under `name`.
    ///
    /// Tries the cheap local read first and falls back to a quorum read
    /// with repair before concluding the name is absent, so a recent
    /// registration on another replica is still found.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure, timeout, or a stored id
    /// that does not decode as a repository key.
    pub async fn get(&self, name: &RepositoryName) -> DhtResult<Option<RepositoryKey>> {
        if let Some(key) = self.get_at(Context::Local, name).await? {
            return Ok(Some(key));
        }
        self.get_at(Context::ReadRepair, name).await
    }

    async fn get_at(
        &self,
        context: Context,
        name: &RepositoryName,
    ) -> DhtResult<Option<RepositoryKey>> {
        let handle = self.db.store_handle(context).clone();
        let row = name.as_bytes().to_vec();
        let column = self.col_id.name().to_vec();

        self.db
            .run_read(move || {
                let cell = handle.get_column(CF_INDEX, &row, &column)?;
                match cell {
                    Some(cell) => Ok(Some(RepositoryKey::from_bytes(&cell.value)?)),
                    None => Ok(None),
                }
            })
            .await
    }

    /// Registers `name` as pointing at `key`.
    ///
    /// Two immediate quorum writes: the forward `id` entry in the index
    /// row, then the reverse `name:` marker in the repository row. The
    /// registration is **not** atomic and does not detect a concurrent
    /// claim of the same name; callers wanting uniqueness must arrange
    /// external coordination. Last writer wins.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure or timeout.
    pub fn put_unique(&self, name: &RepositoryName, key: RepositoryKey) -> DhtResult<()> {
        self.db.put_now(
            CF_INDEX,
            name.as_bytes(),
            self.col_id.name().to_vec(),
            Bytes::from(key.as_bytes()),
        )?;
        self.db.put_now(
            CF_REPOSITORY,
            &key.as_bytes(),
            self.col_name.append(name.as_bytes()),
            Bytes::from_static(TRUE),
        )?;
        Ok(())
    }

    /// Removes the registration of `name` pointing at `key`.
    ///
    /// Deletes the reverse marker first so a reader never sees a marker
    /// whose forward entry is already gone.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure or timeout.
    pub fn remove(&self, name: &RepositoryName, key: RepositoryKey) -> DhtResult<()> {
        let mut batch = Batch::new();
        batch.delete_column(
            CF_REPOSITORY,
            &key.as_bytes(),
            self.col_name.append(name.as_bytes()),
        );
        batch.delete_column(CF_INDEX, name.as_bytes(), self.col_id.name().to_vec());
        self.db.mutate_now(batch)
    }
}
