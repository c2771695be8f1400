//! Frontier-only accumulator with eager root updates
//!
//! Keeps one left sibling per level instead of the whole tree, so memory is
//! O(height) and each insertion costs `height` hashes. It cannot produce
//! proofs; its root always equals the [`ExitTree`](crate::ExitTree) root for
//! the same leaf sequence.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::{
    Hash, MAX_HEIGHT,
    error::{Result, TreeError},
    hasher::Keccak256Hasher,
    zero_hashes::ZeroHashes,
};

/// Append-only accumulator that tracks only the rightmost frontier
#[derive(Clone, Debug)]
pub struct FrontierTree {
    height: u8,
    zero_hashes: Arc<ZeroHashes>,
    count: u64,
    /// Last completed left subtree root per level
    siblings: Vec<Hash>,
    current_root: Hash,
}

impl FrontierTree {
    /// Create a tree of `height` already holding `initial_leaves`
    pub fn new(height: u8, initial_leaves: &[Hash]) -> Result<Self> {
        if height > MAX_HEIGHT {
            return Err(TreeError::InvalidHeight { height, max: MAX_HEIGHT });
        }
        let zero_hashes = ZeroHashes::shared();
        let mut tree = Self {
            height,
            siblings: zero_hashes.as_slice()[..usize::from(height)].to_vec(),
            current_root: zero_hashes[usize::from(height)],
            zero_hashes,
            count: 0,
        };
        for (index, leaf) in initial_leaves.iter().enumerate() {
            tree.add_leaf(index as u64, *leaf)?;
        }
        debug!(
            "Frontier tree initialised: {} leaves, root 0x{}",
            tree.count,
            hex::encode(tree.current_root)
        );
        Ok(tree)
    }

    /// Append the leaf at `index` and return the new root.
    ///
    /// `index` must equal the number of leaves already added.
    pub fn add_leaf(&mut self, index: u64, leaf: Hash) -> Result<Hash> {
        if index != self.count {
            warn!("Mismatched leaf count: {}, expected: {}", index, self.count);
            return Err(TreeError::LeafIndexMismatch { expected: self.count, actual: index });
        }
        if u128::from(self.count) >= 1u128 << self.height {
            return Err(TreeError::TreeFull { capacity: 1u128 << self.height });
        }

        let mut current = leaf;
        let mut frontier_updated = false;
        for level in 0..usize::from(self.height) {
            if (index >> level) & 1 == 1 {
                current = Keccak256Hasher::hash_pair(&self.siblings[level], &current);
            } else {
                // the lowest left child becomes the frontier for its level
                if !frontier_updated {
                    self.siblings[level] = current;
                    frontier_updated = true;
                }
                current = Keccak256Hasher::hash_pair(&current, &self.zero_hashes[level]);
            }
        }

        self.current_root = current;
        self.count += 1;
        Ok(current)
    }

    /// Current root
    pub fn root(&self) -> Hash {
        self.current_root
    }

    /// Number of leaves added
    pub fn count(&self) -> u64 {
        self.count
    }

    /// Tree height
    pub fn height(&self) -> u8 {
        self.height
    }

    /// Frontier, one entry per level
    pub fn siblings(&self) -> &[Hash] {
        &self.siblings
    }

    /// Root, leaf count and frontier in one call
    pub fn snapshot(&self) -> (Hash, u64, Vec<Hash>) {
        (self.current_root, self.count, self.siblings.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ExitTree;

    fn leaf(n: u8) -> Hash {
        [n; 32]
    }

    #[test]
    fn test_rejects_height_above_max() {
        assert_eq!(
            FrontierTree::new(MAX_HEIGHT + 1, &[]).unwrap_err(),
            TreeError::InvalidHeight { height: 65, max: 64 }
        );
        assert!(FrontierTree::new(MAX_HEIGHT, &[]).is_ok());
    }

    #[test]
    fn test_empty_frontier() {
        let tree = FrontierTree::new(32, &[]).unwrap();
        assert_eq!(tree.count(), 0);
        assert_eq!(tree.root(), ZeroHashes::generate(32)[32]);
        assert_eq!(tree.siblings().len(), 32);
    }

    #[test]
    fn test_matches_exit_tree_after_every_insert() {
        let mut frontier = FrontierTree::new(7, &[]).unwrap();
        let mut tree = ExitTree::new(7).unwrap();
        for n in 0..50u8 {
            let root = frontier.add_leaf(u64::from(n), leaf(n)).unwrap();
            tree.add(leaf(n)).unwrap();
            assert_eq!(root, tree.root(), "after {} leaves", n + 1);
        }
    }

    #[test]
    fn test_initial_leaves() {
        let leaves: Vec<Hash> = (0..13u8).map(leaf).collect();
        let mut from_initial = FrontierTree::new(10, &leaves).unwrap();
        let mut tree = ExitTree::from_leaves(10, leaves.clone()).unwrap();
        assert_eq!(from_initial.count(), 13);
        assert_eq!(from_initial.root(), tree.root());

        // keeps accepting leaves after initialisation
        from_initial.add_leaf(13, leaf(13)).unwrap();
        tree.add(leaf(13)).unwrap();
        assert_eq!(from_initial.root(), tree.root());
    }

    #[test]
    fn test_rejects_out_of_order_leaf() {
        let mut tree = FrontierTree::new(4, &[leaf(1)]).unwrap();
        let before = tree.snapshot();
        assert_eq!(
            tree.add_leaf(3, leaf(2)),
            Err(TreeError::LeafIndexMismatch { expected: 1, actual: 3 })
        );
        assert_eq!(tree.snapshot(), before);
    }

    #[test]
    fn test_full_frontier() {
        let mut tree = FrontierTree::new(1, &[leaf(1), leaf(2)]).unwrap();
        assert_eq!(tree.root(), Keccak256Hasher::hash_pair(&leaf(1), &leaf(2)));
        assert_eq!(tree.add_leaf(2, leaf(3)), Err(TreeError::TreeFull { capacity: 2 }));
    }
}
