//! Per-entity table adapters.
//!
//! Each adapter binds one column family and its column namespaces to
//! typed get/put/remove operations. Reads run asynchronously on the
//! worker pool; buffered writes go through a [`crate::WriteBuffer`]; the
//! few writes needing immediate visibility go synchronously through the
//! quorum handle. Columns matching no known namespace are silently
//! skipped, so unknown future fields never break readers.

mod chunk;
mod object_index;
mod refs;
mod repository;
mod repository_index;

pub use chunk::ChunkTable;
pub use object_index::ObjectIndexTable;
pub use refs::RefTable;
pub use repository::RepositoryTable;
pub use repository_index::RepositoryIndexTable;
