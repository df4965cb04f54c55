//! Chunk storage.

use crate::buffer::WriteBuffer;
use crate::colmatch::ColumnMatcher;
use crate::context::Context;
use crate::database::Database;
use crate::error::DhtResult;
use crate::keys::{ChunkKey, PackChunk};
use gitdht_store::{RowSlice, Select};

const CF: &str = "Chunk";

/// Adapter for the `Chunk` column family.
///
/// One row per chunk; the bare columns `chunk`, `index`, and `meta` hold
/// the raw chunk data, its serialized index, and serialized metadata.
pub struct ChunkTable {
    db: Database,
    col_chunk: ColumnMatcher,
    col_index: ColumnMatcher,
    col_meta: ColumnMatcher,
}

impl ChunkTable {
    pub(crate) fn new(db: Database) -> Self {
        Self {
            db,
            col_chunk: ColumnMatcher::new("chunk"),
            col_index: ColumnMatcher::new("index"),
            col_meta: ColumnMatcher::new("meta"),
        }
    }

    /// Fetches the stored members of every chunk in `keys`.
    ///
    /// One multi-row request. Chunks absent from the store are simply
    /// missing from the result; members a writer never stored stay
    /// `None`.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure or timeout.
    pub async fn get(&self, context: Context, keys: &[ChunkKey]) -> DhtResult<Vec<PackChunk>> {
        let handle = self.db.store_handle(context).clone();
        let rows: Vec<Vec<u8>> = keys.iter().map(|k| k.as_bytes().to_vec()).collect();
        let select = Select::Names(vec![
            self.col_chunk.name().to_vec(),
            self.col_index.name().to_vec(),
            self.col_meta.name().to_vec(),
        ]);

        let col_chunk = self.col_chunk.clone();
        let col_index = self.col_index.clone();
        let col_meta = self.col_meta.clone();
        self.db
            .run_read(move || {
                let slices = handle.multiget_slice(CF, &rows, &select)?;
                Ok(parse_chunks(slices, &col_chunk, &col_index, &col_meta))
            })
            .await
    }

    /// Buffers the write of `chunk`, storing only its populated members.
    pub fn put(&self, chunk: &PackChunk, buffer: &mut WriteBuffer) {
        let mut columns = Vec::with_capacity(3);
        if let Some(data) = &chunk.data {
            columns.push((self.col_chunk.name().to_vec(), data.clone()));
        }
        if let Some(index) = &chunk.index {
            columns.push((self.col_index.name().to_vec(), index.clone()));
        }
        if let Some(meta) = &chunk.meta {
            columns.push((self.col_meta.name().to_vec(), meta.clone()));
        }
        buffer.put_columns(CF, chunk.key.as_bytes(), columns);
    }

    /// Buffers the removal of a whole chunk row.
    pub fn remove(&self, key: &ChunkKey, buffer: &mut WriteBuffer) {
        buffer.delete_row(CF, key.as_bytes());
    }
}

fn parse_chunks(
    slices: Vec<RowSlice>,
    col_chunk: &ColumnMatcher,
    col_index: &ColumnMatcher,
    col_meta: &ColumnMatcher,
) -> Vec<PackChunk> {
    let mut chunks = Vec::with_capacity(slices.len());
    for slice in slices {
        let mut chunk = PackChunk::new(ChunkKey::from_bytes(slice.row));
        for cell in slice.columns {
            if col_chunk.same_name(&cell.name) {
                chunk.data = Some(cell.value);
            } else if col_index.same_name(&cell.name) {
                chunk.index = Some(cell.value);
            } else if col_meta.same_name(&cell.name) {
                chunk.meta = Some(cell.value);
            }
        }
        chunks.push(chunk);
    }
    chunks
}
