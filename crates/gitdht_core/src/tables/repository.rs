//! Per-repository metadata.

use crate::buffer::WriteBuffer;
use crate::colmatch::ColumnMatcher;
use crate::context::Context;
use crate::database::Database;
use crate::error::DhtResult;
use crate::keys::{CachedPackInfo, CachedPackKey, ChunkInfo, ChunkKey, RepositoryKey};
use gitdht_store::SliceRange;
use std::time::{SystemTime, UNIX_EPOCH};

const CF: &str = "Repository";

/// Key-generation epoch: 2011-02-12, seconds since the Unix epoch.
const KEY_EPOCH_SECONDS: u64 = 1_297_547_467;

/// Adapter for the `Repository` column family.
///
/// One row per repository. Chunk bookkeeping entries live under the
/// `chunkInfo:` namespace, cached pack descriptions under `cachedPack:`;
/// the reverse name registrations written by
/// [`crate::tables::RepositoryIndexTable`] live under `name:`.
pub struct RepositoryTable {
    db: Database,
    col_chunk_info: ColumnMatcher,
    col_cached_pack: ColumnMatcher,
}

impl RepositoryTable {
    pub(crate) fn new(db: Database) -> Self {
        Self {
            db,
            col_chunk_info: ColumnMatcher::new("chunkInfo:"),
            col_cached_pack: ColumnMatcher::new("cachedPack:"),
        }
    }

    /// Derives a fresh repository key from the wall clock.
    ///
    /// Seconds since the key epoch, so ids stay small and roughly
    /// time-ordered. Two callers in the same second collide.
    // TODO: replace with an allocator backed by the coordination service
    // once one is wired in; see the RefTable consistency caveat.
    #[must_use]
    pub fn next_key(&self) -> RepositoryKey {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs();
        RepositoryKey::from_id(now.saturating_sub(KEY_EPOCH_SECONDS) as u32)
    }

    /// Fetches every cached pack description of `repository`.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure or timeout.
    pub async fn get_cached_packs(
        &self,
        repository: RepositoryKey,
    ) -> DhtResult<Vec<CachedPackInfo>> {
        let handle = self.db.store_handle(Context::Local).clone();
        let row = repository.as_bytes();
        let (start, end) = self.col_cached_pack.range_bounds();
        let col_cached_pack = self.col_cached_pack.clone();

        self.db
            .run_read(move || {
                let columns = handle.slice_range(CF, &row, &SliceRange { start, end })?;
                let mut packs = Vec::with_capacity(columns.len());
                for cell in columns {
                    if !col_cached_pack.matches(&cell.name) {
                        continue;
                    }
                    packs.push(CachedPackInfo {
                        key: CachedPackKey::from_bytes(
                            col_cached_pack.suffix(&cell.name).to_vec(),
                        ),
                        data: cell.value,
                    });
                }
                Ok(packs)
            })
            .await
    }

    /// Buffers the write of one chunk bookkeeping entry.
    pub fn put_chunk_info(
        &self,
        repository: RepositoryKey,
        info: &ChunkInfo,
        buffer: &mut WriteBuffer,
    ) {
        buffer.put(
            CF,
            &repository.as_bytes(),
            self.col_chunk_info.append(info.chunk.as_bytes()),
            info.data.clone(),
        );
    }

    /// Buffers the removal of the bookkeeping entry for `chunk`.
    pub fn remove_chunk_info(
        &self,
        repository: RepositoryKey,
        chunk: &ChunkKey,
        buffer: &mut WriteBuffer,
    ) {
        buffer.delete(
            CF,
            &repository.as_bytes(),
            self.col_chunk_info.append(chunk.as_bytes()),
        );
    }

    /// Buffers the write of one cached pack description.
    pub fn put_cached_pack(
        &self,
        repository: RepositoryKey,
        info: &CachedPackInfo,
        buffer: &mut WriteBuffer,
    ) {
        buffer.put(
            CF,
            &repository.as_bytes(),
            self.col_cached_pack.append(info.key.as_bytes()),
            info.data.clone(),
        );
    }

    /// Buffers the removal of the cached pack description for `key`.
    pub fn remove_cached_pack(
        &self,
        repository: RepositoryKey,
        key: &CachedPackKey,
        buffer: &mut WriteBuffer,
    ) {
        buffer.delete(
            CF,
            &repository.as_bytes(),
            self.col_cached_pack.append(key.as_bytes()),
        );
    }
}
