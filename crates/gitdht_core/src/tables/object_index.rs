//! Global object index.

use crate::buffer::WriteBuffer;
use crate::colmatch::ColumnMatcher;
use crate::context::Context;
use crate::database::Database;
use crate::error::DhtResult;
use crate::keys::{ChunkKey, ObjectIndexKey, ObjectInfo};
use gitdht_store::{RowSlice, Select, SliceRange};
use std::collections::HashMap;

const CF: &str = "ObjectIndex";

/// Adapter for the `ObjectIndex` column family.
///
/// One row per object; each `info:<chunk-key>` column records one
/// candidate chunk location for the object. An object can legitimately
/// have several locations, each tagged with the store's write clock.
pub struct ObjectIndexTable {
    db: Database,
    col_info: ColumnMatcher,
}

impl ObjectIndexTable {
    pub(crate) fn new(db: Database) -> Self {
        Self {
            db,
            col_info: ColumnMatcher::new("info:"),
        }
    }

    /// Looks up the chunk locations of every object in `objects`.
    ///
    /// One multi-row range request under the `info:` namespace. Objects
    /// with no stored location are absent from the returned map — a
    /// normal not-found, distinct from a failed future.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure or timeout.
    pub async fn get(
        &self,
        context: Context,
        objects: &[ObjectIndexKey],
    ) -> DhtResult<HashMap<ObjectIndexKey, Vec<ObjectInfo>>> {
        let handle = self.db.store_handle(context).clone();
        let rows: Vec<Vec<u8>> = objects.iter().map(|k| k.as_bytes().to_vec()).collect();
        let (start, end) = self.col_info.range_bounds();
        let select = Select::Range(SliceRange { start, end });

        let col_info = self.col_info.clone();
        self.db
            .run_read(move || {
                let slices = handle.multiget_slice(CF, &rows, &select)?;
                Ok(find_chunks(slices, &col_info))
            })
            .await
    }

    /// Buffers the registration of one candidate location for `object`.
    pub fn add(&self, object: &ObjectIndexKey, info: &ObjectInfo, buffer: &mut WriteBuffer) {
        buffer.put(
            CF,
            object.as_bytes(),
            self.col_info.append(info.chunk.as_bytes()),
            info.data.clone(),
        );
    }

    /// Buffers the removal of the location pointing at `chunk`.
    pub fn remove(&self, object: &ObjectIndexKey, chunk: &ChunkKey, buffer: &mut WriteBuffer) {
        buffer.delete(CF, object.as_bytes(), self.col_info.append(chunk.as_bytes()));
    }
}

fn find_chunks(
    slices: Vec<RowSlice>,
    col_info: &ColumnMatcher,
) -> HashMap<ObjectIndexKey, Vec<ObjectInfo>> {
    let mut map = HashMap::new();
    for slice in slices {
        if slice.columns.is_empty() {
            continue;
        }
        let key = ObjectIndexKey::from_bytes(slice.row);
        let list: &mut Vec<ObjectInfo> = map.entry(key).or_default();
        for cell in slice.columns {
            if !col_info.matches(&cell.name) {
                continue;
            }
            let chunk = ChunkKey::from_bytes(col_info.suffix(&cell.name).to_vec());
            list.push(ObjectInfo {
                chunk,
                data: cell.value,
                time: cell.timestamp,
            });
        }
    }
    map
}
