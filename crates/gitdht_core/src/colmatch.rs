//! Composite column name encoding and matching.
//!
//! A single row can host many logically grouped sub-fields by giving each
//! group a namespace prefix: the column name is `prefix ++ suffix`, where
//! the prefix carries its own trailing `:` separator (`"chunkInfo:"`,
//! `"info:"`). Suffixes are hex/ASCII key encodings that never contain an
//! unescaped `:` — an invariant upheld by the key codecs, not checked
//! here.
//!
//! Two distinct namespaces of one column family must never use prefixes
//! where one is a byte-prefix of the other; range reads would cross-match.
//! Readers additionally filter every returned column through
//! [`ColumnMatcher::matches`], so a store that returns a superset of the
//! requested range cannot contaminate results.

/// Encodes, matches, and decodes composite column names for one namespace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnMatcher {
    prefix: Vec<u8>,
}

/// Exclusive upper-bound byte for range scans. Greater than every byte a
/// valid suffix encoding uses.
const RANGE_BOUND: u8 = 0xFF;

impl ColumnMatcher {
    /// Creates a matcher for `prefix`.
    ///
    /// The prefix includes its trailing separator, e.g. `"cachedPack:"`.
    /// A prefix without a separator acts as a bare column name matched
    /// with [`Self::same_name`].
    #[must_use]
    pub fn new(prefix: &str) -> Self {
        Self {
            prefix: prefix.as_bytes().to_vec(),
        }
    }

    /// The encoded prefix; also the full column name for bare columns.
    #[must_use]
    pub fn name(&self) -> &[u8] {
        &self.prefix
    }

    /// Encodes the column name for `suffix` under this namespace.
    #[must_use]
    pub fn append(&self, suffix: &[u8]) -> Vec<u8> {
        let mut name = Vec::with_capacity(self.prefix.len() + suffix.len());
        name.extend_from_slice(&self.prefix);
        name.extend_from_slice(suffix);
        name
    }

    /// True iff `column` is exactly this matcher's name.
    #[must_use]
    pub fn same_name(&self, column: &[u8]) -> bool {
        column == self.prefix.as_slice()
    }

    /// True iff `column` belongs to this namespace.
    #[must_use]
    pub fn matches(&self, column: &[u8]) -> bool {
        column.len() >= self.prefix.len() && column[..self.prefix.len()] == self.prefix[..]
    }

    /// Decodes the suffix of a column in this namespace.
    ///
    /// Calling this for a column where [`Self::matches`] is false is a
    /// programming error, not a runtime condition to recover from.
    #[must_use]
    pub fn suffix<'a>(&self, column: &'a [u8]) -> &'a [u8] {
        debug_assert!(self.matches(column));
        &column[self.prefix.len()..]
    }

    /// Bounds for a range read covering exactly this namespace's columns.
    ///
    /// The low bound is inclusive, the high bound exclusive. The high
    /// bound appends a byte greater than any valid suffix byte, so the
    /// pair is non-overlapping even for a namespace with no columns.
    #[must_use]
    pub fn range_bounds(&self) -> (Vec<u8>, Vec<u8>) {
        let low = self.prefix.clone();
        let mut high = Vec::with_capacity(self.prefix.len() + 1);
        high.extend_from_slice(&self.prefix);
        high.push(RANGE_BOUND);
        (low, high)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn append_then_suffix_round_trips() {
        let info = ColumnMatcher::new("info:");
        let name = info.append(b"3fb2");
        assert_eq!(name, b"info:3fb2".to_vec());
        assert!(info.matches(&name));
        assert_eq!(info.suffix(&name), b"3fb2");
    }

    #[test]
    fn matches_rejects_other_namespaces() {
        let chunk_info = ColumnMatcher::new("chunkInfo:");
        let cached_pack = ColumnMatcher::new("cachedPack:");

        let name = chunk_info.append(b"abcd");
        assert!(!cached_pack.matches(&name));
        assert!(!cached_pack.same_name(&name));
    }

    #[test]
    fn bare_column_matching() {
        let chunk = ColumnMatcher::new("chunk");
        assert!(chunk.same_name(b"chunk"));
        assert!(!chunk.same_name(b"chunkInfo:aa"));
        // `matches` on a bare name is a prefix test; bare columns are
        // matched with `same_name`.
        assert!(chunk.matches(b"chunk"));
    }

    #[test]
    fn range_bounds_bracket_the_namespace() {
        let info = ColumnMatcher::new("info:");
        let (low, high) = info.range_bounds();
        assert_eq!(low, b"info:".to_vec());
        assert_eq!(high, b"info:\xFF".to_vec());

        let name = info.append(b"00ff");
        assert!(name.as_slice() >= low.as_slice());
        assert!(name.as_slice() < high.as_slice());
    }

    #[test]
    fn range_bounds_of_empty_namespace_do_not_overlap_neighbors() {
        let a = ColumnMatcher::new("a:");
        let b = ColumnMatcher::new("b:");
        let (_, a_high) = a.range_bounds();
        let (b_low, _) = b.range_bounds();
        assert!(a_high.as_slice() < b_low.as_slice());
    }

    #[test]
    fn nested_prefixes_are_separated_by_match_filtering() {
        // "name:" is a byte-prefix of "name:x:". Range bounds alone cannot
        // separate them; the matches() filter applied by readers can, in
        // the direction that matters.
        let outer = ColumnMatcher::new("name:");
        let inner = ColumnMatcher::new("name:x:");

        let inner_col = inner.append(b"k");
        let outer_col = outer.append(b"k");

        assert!(!inner.matches(&outer_col));
        let (low, high) = inner.range_bounds();
        assert!(outer_col.as_slice() < low.as_slice() || outer_col.as_slice() >= high.as_slice());
        assert!(inner_col.as_slice() >= low.as_slice() && inner_col.as_slice() < high.as_slice());
    }

    proptest! {
        #[test]
        fn suffix_round_trip(prefix in "[a-zA-Z]{1,12}:", suffix in proptest::collection::vec(0u8..0xFF, 0..64)) {
            let m = ColumnMatcher::new(&prefix);
            let name = m.append(&suffix);
            prop_assert!(m.matches(&name));
            prop_assert_eq!(m.suffix(&name), suffix.as_slice());
        }

        #[test]
        fn encoded_names_fall_inside_range_bounds(prefix in "[a-z]{1,8}:", suffix in proptest::collection::vec(0u8..0xFF, 0..32)) {
            let m = ColumnMatcher::new(&prefix);
            let name = m.append(&suffix);
            let (low, high) = m.range_bounds();
            prop_assert!(name.as_slice() >= low.as_slice());
            prop_assert!(name.as_slice() < high.as_slice());
        }

        #[test]
        fn disjoint_prefixes_never_cross_match(suffix in proptest::collection::vec(0u8..0xFF, 0..32)) {
            let p = ColumnMatcher::new("chunkInfo:");
            let q = ColumnMatcher::new("cachedPack:");
            let name = p.append(&suffix);
            prop_assert!(!q.matches(&name));
            let (low, high) = q.range_bounds();
            prop_assert!(name.as_slice() < low.as_slice() || name.as_slice() >= high.as_slice());
        }
    }
}
