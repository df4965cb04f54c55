//! Typed keys and entity records.
//!
//! Key encodings are an external codec concern: with the exception of
//! [`RepositoryKey`], keys are carried as opaque byte strings produced and
//! consumed elsewhere. The one invariant this crate relies on is that no
//! key encoding ever contains an unescaped `:` byte — composite column
//! names use `:` as the namespace separator.

use crate::error::{DhtResult, Error};
use bytes::Bytes;
use std::fmt;

/// The human-readable name a repository is published under.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RepositoryName(String);

impl RepositoryName {
    /// Wraps a repository name.
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// The name as a string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The UTF-8 encoding used as a row key.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }
}

impl fmt::Display for RepositoryName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The internal identifier of one repository.
///
/// Encoded as eight lowercase hex digits wherever it appears in a row key
/// or column value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RepositoryKey(u32);

impl RepositoryKey {
    /// Wraps a raw repository id.
    #[must_use]
    pub const fn from_id(id: u32) -> Self {
        Self(id)
    }

    /// The raw repository id.
    #[must_use]
    pub const fn id(self) -> u32 {
        self.0
    }

    /// The hex encoding used as a row key and column value.
    #[must_use]
    pub fn as_bytes(self) -> Vec<u8> {
        format!("{:08x}", self.0).into_bytes()
    }

    /// Decodes a key previously produced by [`Self::as_bytes`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidKey`] when `bytes` is not eight hex digits.
    pub fn from_bytes(bytes: &[u8]) -> DhtResult<Self> {
        let text = std::str::from_utf8(bytes)
            .map_err(|_| Error::invalid_key("repository key is not UTF-8"))?;
        if text.len() != 8 {
            return Err(Error::invalid_key(format!(
                "repository key has length {}, expected 8",
                text.len()
            )));
        }
        let id = u32::from_str_radix(text, 16)
            .map_err(|_| Error::invalid_key(format!("repository key {text:?} is not hex")))?;
        Ok(Self(id))
    }
}

impl fmt::Display for RepositoryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:08x}", self.0)
    }
}

macro_rules! opaque_key {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(Vec<u8>);

        impl $name {
            /// Wraps an externally encoded key.
            #[must_use]
            pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Self {
                Self(bytes.into())
            }

            /// The encoded key bytes.
            #[must_use]
            pub fn as_bytes(&self) -> &[u8] {
                &self.0
            }
        }
    };
}

opaque_key! {
    /// Identifies one pack chunk.
    ChunkKey
}

opaque_key! {
    /// Identifies one object in the global object index.
    ObjectIndexKey
}

opaque_key! {
    /// Identifies one cached pack of a repository.
    CachedPackKey
}

/// Identifies one ref within one repository.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RefKey {
    /// The repository owning the ref.
    pub repository: RepositoryKey,
    /// The ref name, e.g. `refs/heads/main`.
    pub name: String,
}

impl RefKey {
    /// Creates a ref key.
    pub fn new(repository: RepositoryKey, name: impl Into<String>) -> Self {
        Self {
            repository,
            name: name.into(),
        }
    }
}

/// Externally serialized state of one ref.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefData(Bytes);

impl RefData {
    /// Wraps serialized ref state.
    #[must_use]
    pub fn from_bytes(bytes: impl Into<Bytes>) -> Self {
        Self(bytes.into())
    }

    /// The serialized bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &Bytes {
        &self.0
    }
}

/// The fields of one stored chunk. Members a writer did not supply stay
/// `None`, both on write and when read back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackChunk {
    /// The chunk's key.
    pub key: ChunkKey,
    /// Raw compressed chunk data.
    pub data: Option<Bytes>,
    /// Serialized chunk index.
    pub index: Option<Bytes>,
    /// Serialized chunk metadata.
    pub meta: Option<Bytes>,
}

impl PackChunk {
    /// Creates an empty chunk record for `key`.
    #[must_use]
    pub fn new(key: ChunkKey) -> Self {
        Self {
            key,
            data: None,
            index: None,
            meta: None,
        }
    }
}

/// Per-repository bookkeeping entry for one chunk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkInfo {
    /// The chunk described.
    pub chunk: ChunkKey,
    /// Externally serialized chunk statistics.
    pub data: Bytes,
}

/// Per-repository entry describing one cached pack.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedPackInfo {
    /// The cached pack described.
    pub key: CachedPackKey,
    /// Externally serialized pack description.
    pub data: Bytes,
}

/// One candidate location of an object, pointing at the chunk storing it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectInfo {
    /// The chunk the object lives in.
    pub chunk: ChunkKey,
    /// Externally serialized object metadata.
    pub data: Bytes,
    /// Store write clock of this entry, in microseconds. Lets readers
    /// order competing locations by recency.
    pub time: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repository_key_round_trips_through_hex() {
        let key = RepositoryKey::from_id(0x0badf00d);
        let bytes = key.as_bytes();
        assert_eq!(bytes, b"0badf00d".to_vec());
        assert_eq!(RepositoryKey::from_bytes(&bytes).unwrap(), key);
    }

    #[test]
    fn repository_key_rejects_bad_encodings() {
        assert!(RepositoryKey::from_bytes(b"xyz").is_err());
        assert!(RepositoryKey::from_bytes(b"not-hex!").is_err());
        assert!(RepositoryKey::from_bytes(&[0xFF; 8]).is_err());
    }

    #[test]
    fn ref_key_equality_covers_repo_and_name() {
        let a = RefKey::new(RepositoryKey::from_id(1), "refs/heads/main");
        let b = RefKey::new(RepositoryKey::from_id(1), "refs/heads/main");
        let c = RefKey::new(RepositoryKey::from_id(2), "refs/heads/main");
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn pack_chunk_members_default_to_none() {
        let chunk = PackChunk::new(ChunkKey::from_bytes(b"c1".to_vec()));
        assert!(chunk.data.is_none());
        assert!(chunk.index.is_none());
        assert!(chunk.meta.is_none());
    }
}
