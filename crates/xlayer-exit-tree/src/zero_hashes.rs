//! Roots of empty subtrees for every level

use std::sync::{Arc, OnceLock};

use crate::{Hash, MAX_HEIGHT, hasher::Keccak256Hasher};

static SHARED_ZERO_HASHES: OnceLock<Arc<ZeroHashes>> = OnceLock::new();

/// Immutable table of empty-subtree roots.
///
/// Entry `0` is the empty leaf (32 zero bytes) and entry `i` is
/// `keccak(zero[i - 1] ‖ zero[i - 1])`. The value at a level does not depend
/// on the height of the tree using it, so one table built for the largest
/// height serves every smaller tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ZeroHashes {
    hashes: Vec<Hash>,
}

impl ZeroHashes {
    /// Build the table for trees of up to `height` levels (`height + 1` entries)
    pub fn generate(height: u8) -> Self {
        let mut hashes = Vec::with_capacity(usize::from(height) + 1);
        let mut current = [0u8; 32];
        hashes.push(current);
        for _ in 0..height {
            current = Keccak256Hasher::hash_pair(&current, &current);
            hashes.push(current);
        }
        Self { hashes }
    }

    /// Process-wide table for [`MAX_HEIGHT`], built on first use
    pub fn shared() -> Arc<Self> {
        SHARED_ZERO_HASHES.get_or_init(|| Arc::new(Self::generate(MAX_HEIGHT))).clone()
    }

    /// Largest tree height this table can serve
    pub fn height(&self) -> u8 {
        // `generate` never produces more than u8::MAX + 1 entries.
        (self.hashes.len() - 1) as u8
    }

    /// Empty-subtree root at `level`, or `None` past the end of the table
    pub fn get(&self, level: usize) -> Option<&Hash> {
        self.hashes.get(level)
    }

    /// All entries, from the empty leaf upwards
    pub fn as_slice(&self) -> &[Hash] {
        &self.hashes
    }
}

impl std::ops::Index<usize> for ZeroHashes {
    type Output = Hash;

    fn index(&self, level: usize) -> &Hash {
        &self.hashes[level]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_length_and_recurrence() {
        let zeros = ZeroHashes::generate(32);
        assert_eq!(zeros.as_slice().len(), 33);
        assert_eq!(zeros.height(), 32);
        assert_eq!(zeros[0], [0u8; 32]);
        for i in 1..=32 {
            assert_eq!(zeros[i], Keccak256Hasher::hash_pair(&zeros[i - 1], &zeros[i - 1]));
        }
    }

    #[test]
    fn test_empty_root_at_depth_32() {
        let zeros = ZeroHashes::generate(32);
        assert_eq!(
            hex::encode(zeros[32]),
            "27ae5ba08d7291c96c8cbddcc148bf48a6d68c7974b94356f53754ef6171d757"
        );
    }

    #[test]
    fn test_smaller_table_is_a_prefix() {
        let small = ZeroHashes::generate(4);
        let large = ZeroHashes::generate(32);
        assert_eq!(small.as_slice(), &large.as_slice()[..5]);
    }

    #[test]
    fn test_shared_table_is_reused() {
        let a = ZeroHashes::shared();
        let b = ZeroHashes::shared();
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(a.height(), MAX_HEIGHT);
        assert_eq!(a.get(usize::from(MAX_HEIGHT) + 1), None);
    }
}
