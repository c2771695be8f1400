//! Append-only exit tree

use std::sync::Arc;

use alloy_primitives::B256;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};

use crate::{
    DEFAULT_HEIGHT, Hash, MAX_HEIGHT,
    error::{Result, TreeError},
    hasher::Keccak256Hasher,
    proof::MerkleProof,
    shared::ExitTreeSnapshot,
    zero_hashes::ZeroHashes,
};

/// One record of the ordered leaf log a tree is rebuilt from
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeafLogEntry {
    /// Position of the leaf in the counterpart accumulator
    pub index: u64,
    /// Leaf value
    pub leaf: B256,
}

/// Fixed-height, append-only binary Merkle tree tracking bridge exits.
///
/// Leaves are appended in the order the synchronizer observes them on L1.
/// Upper levels are refreshed lazily: `add` only marks the tree dirty, and
/// the next root or proof query folds the new leaves in. Absent nodes are
/// filled in from [`ZeroHashes`], so the tree behaves as if every one of its
/// `2^height` slots were populated.
#[derive(Clone, Debug)]
pub struct ExitTree {
    height: u8,
    zero_hashes: Arc<ZeroHashes>,
    /// `levels[0]` holds the leaves, `levels[height]` the root once computed
    levels: Vec<Vec<Hash>>,
    /// Leaves before this index are already reflected in the upper levels
    synced_leaves: usize,
    dirty: bool,
}

impl ExitTree {
    /// Create an empty tree using the process-wide zero hash table
    pub fn new(height: u8) -> Result<Self> {
        Self::with_zero_hashes(height, ZeroHashes::shared())
    }

    /// Create an empty tree backed by an explicitly provided zero hash table
    pub fn with_zero_hashes(height: u8, zero_hashes: Arc<ZeroHashes>) -> Result<Self> {
        let max = MAX_HEIGHT.min(zero_hashes.height());
        if height > max {
            return Err(TreeError::InvalidHeight { height, max });
        }
        Ok(Self::empty(height, zero_hashes))
    }

    /// Rebuild a tree from its leaves, in insertion order
    pub fn from_leaves(height: u8, leaves: impl IntoIterator<Item = Hash>) -> Result<Self> {
        let mut tree = Self::new(height)?;
        for leaf in leaves {
            tree.add(leaf)?;
        }
        Ok(tree)
    }

    /// Rebuild a tree from an ordered leaf log.
    ///
    /// Every entry must carry the next expected index; a gap or a repeated
    /// entry aborts the replay with [`TreeError::LeafIndexMismatch`].
    pub fn replay(height: u8, entries: impl IntoIterator<Item = LeafLogEntry>) -> Result<Self> {
        let mut tree = Self::new(height)?;
        for entry in entries {
            tree.add_at(entry.index, entry.leaf.0)?;
        }
        debug!("Replayed {} leaves into exit tree of height {}", tree.len(), height);
        Ok(tree)
    }

    fn empty(height: u8, zero_hashes: Arc<ZeroHashes>) -> Self {
        Self {
            height,
            zero_hashes,
            levels: vec![Vec::new(); usize::from(height) + 1],
            synced_leaves: 0,
            dirty: false,
        }
    }

    /// Tree height
    pub fn height(&self) -> u8 {
        self.height
    }

    /// Number of leaf slots, `2^height`
    pub fn capacity(&self) -> u128 {
        1u128 << self.height
    }

    /// Number of leaves added so far
    pub fn len(&self) -> usize {
        self.levels[0].len()
    }

    /// Whether no leaf has been added yet
    pub fn is_empty(&self) -> bool {
        self.levels[0].is_empty()
    }

    /// Leaves in insertion order
    pub fn leaves(&self) -> &[Hash] {
        &self.levels[0]
    }

    /// Whether leaves were added since the last root or proof query
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Append a leaf and return its index
    pub fn add(&mut self, leaf: Hash) -> Result<u64> {
        if self.len() as u128 >= self.capacity() {
            return Err(TreeError::TreeFull { capacity: self.capacity() });
        }
        let index = self.len() as u64;
        self.levels[0].push(leaf);
        self.dirty = true;
        trace!("Added exit tree leaf {} at index {}", hex::encode(leaf), index);
        Ok(index)
    }

    /// Append a leaf whose position is dictated by the source event stream.
    ///
    /// `index` must equal the current leaf count. On mismatch the tree is
    /// left untouched.
    pub fn add_at(&mut self, index: u64, leaf: Hash) -> Result<u64> {
        let expected = self.len() as u64;
        if index != expected {
            warn!("Rejected exit tree leaf: got index {}, expected {}", index, expected);
            return Err(TreeError::LeafIndexMismatch { expected, actual: index });
        }
        self.add(leaf)
    }

    /// Leaf stored at `index`.
    ///
    /// Slots that were never written read as the empty leaf, the same way the
    /// counterpart contract treats them.
    pub fn leaf(&self, index: u64) -> Result<Hash> {
        self.check_index(index)?;
        Ok(self.node(0, index))
    }

    /// Current root, refreshing the upper levels first if needed
    pub fn root(&mut self) -> Hash {
        self.recompute();
        self.clean_root()
    }

    /// Sibling path for the leaf slot at `index`.
    ///
    /// Slots past the current leaf count still get a valid path built from
    /// zero hashes.
    pub fn proof_by_index(&mut self, index: u64) -> Result<MerkleProof> {
        self.check_index(index)?;
        self.recompute();
        Ok(self.clean_proof(index))
    }

    /// Sibling path for the first leaf equal to `leaf`
    pub fn proof_by_value(&mut self, leaf: &Hash) -> Result<MerkleProof> {
        let index = self.position(leaf).ok_or(TreeError::NotFound { leaf: *leaf })?;
        self.proof_by_index(index)
    }

    /// Immutable copy of the freshly recomputed tree, for readers that must
    /// not contend with the writer
    pub fn snapshot(&mut self) -> ExitTreeSnapshot {
        self.recompute();
        ExitTreeSnapshot::new(self.clone())
    }

    pub(crate) fn position(&self, leaf: &Hash) -> Option<u64> {
        self.levels[0].iter().position(|l| l == leaf).map(|i| i as u64)
    }

    /// Root of an up to date tree
    pub(crate) fn clean_root(&self) -> Hash {
        debug_assert!(!self.dirty);
        if self.is_empty() {
            return self.zero_hashes[usize::from(self.height)];
        }
        self.levels[usize::from(self.height)][0]
    }

    /// Proof from an up to date tree, `index` already range checked
    pub(crate) fn clean_proof(&self, index: u64) -> MerkleProof {
        debug_assert!(!self.dirty);
        let siblings = (0..usize::from(self.height))
            .map(|level| self.node(level, (index >> level) ^ 1))
            .collect();
        MerkleProof { index, siblings }
    }

    pub(crate) fn check_index(&self, index: u64) -> Result<()> {
        if self.height < 64 && index >> self.height != 0 {
            return Err(TreeError::IndexOutOfRange { index, height: self.height });
        }
        Ok(())
    }

    /// Node at `level`/`position`, or the zero hash when not materialised
    fn node(&self, level: usize, position: u64) -> Hash {
        usize::try_from(position)
            .ok()
            .and_then(|i| self.levels[level].get(i))
            .copied()
            .unwrap_or(self.zero_hashes[level])
    }

    /// Fold leaves added since the last pass into the upper levels.
    ///
    /// Only parents at or right of the first new leaf's ancestor are
    /// rewritten; everything to the left is unchanged by an append.
    fn recompute(&mut self) {
        if !self.dirty {
            return;
        }

        let first_new = self.synced_leaves;
        let mut start = first_new;
        for level in 0..usize::from(self.height) {
            let (lower, upper) = self.levels.split_at_mut(level + 1);
            let children = &lower[level];
            let parents = &mut upper[0];
            let zero = self.zero_hashes[level];

            let first_parent = start / 2;
            for j in first_parent..children.len().div_ceil(2) {
                let left = &children[2 * j];
                let right = children.get(2 * j + 1).unwrap_or(&zero);
                extend_or_update(parents, j, Keccak256Hasher::hash_pair(left, right));
            }
            debug_assert_eq!(parents.len(), children.len().div_ceil(2));
            start = first_parent;
        }

        self.synced_leaves = self.len();
        self.dirty = false;
        debug!(
            "Recomputed exit tree: {} leaves, first new leaf {}",
            self.synced_leaves, first_new
        );
    }
}

impl Default for ExitTree {
    fn default() -> Self {
        Self::empty(DEFAULT_HEIGHT, ZeroHashes::shared())
    }
}

/// Overwrite the node at `position`, or append it when it is the next one
fn extend_or_update(nodes: &mut Vec<Hash>, position: usize, node: Hash) {
    debug_assert!(position <= nodes.len(), "parent level would have a gap");
    if position < nodes.len() {
        nodes[position] = node;
    } else {
        nodes.push(node);
    }
}
