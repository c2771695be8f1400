//! Exit tree inclusion proofs and their verification

use serde::{Deserialize, Serialize};

use crate::{Hash, MAX_HEIGHT, hasher::Keccak256Hasher};

/// Exit tree inclusion proof
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MerkleProof {
    /// Position of the proven leaf
    pub index: u64,
    /// Sibling hashes from level 0 up to the level below the root
    pub siblings: Vec<Hash>,
}

impl MerkleProof {
    /// Verify this proof for `leaf` against a root hash
    pub fn verify(&self, leaf: &Hash, root: &Hash) -> bool {
        verify_merkle_proof(leaf, &self.siblings, self.index, root)
    }

    /// Compute the root implied by `leaf` and this proof
    pub fn compute_root(&self, leaf: &Hash) -> Hash {
        compute_root(leaf, &self.siblings, self.index)
    }

    /// Tree height the proof was produced for
    pub fn height(&self) -> usize {
        self.siblings.len()
    }
}

/// Check that `leaf` sits at `index` under `root`.
///
/// Bit `i` of `index` decides whether the running value is the right (1) or
/// left (0) child at level `i`. An index with bits set above the proof length
/// is rejected, so a proof cannot be replayed under an aliased index. Proofs
/// taller than [`MAX_HEIGHT`] are rejected outright.
pub fn verify_merkle_proof(leaf: &Hash, siblings: &[Hash], index: u64, root: &Hash) -> bool {
    let height = siblings.len();
    if height > usize::from(MAX_HEIGHT) {
        return false;
    }
    if height < 64 && index >> height != 0 {
        return false;
    }
    compute_root(leaf, siblings, index) == *root
}

fn compute_root(leaf: &Hash, siblings: &[Hash], index: u64) -> Hash {
    let mut current = *leaf;
    for (level, sibling) in siblings.iter().enumerate() {
        // levels past bit 63 read as left children
        let bit = u32::try_from(level).ok().and_then(|l| index.checked_shr(l)).unwrap_or(0) & 1;
        current = if bit == 1 {
            Keccak256Hasher::hash_pair(sibling, &current)
        } else {
            Keccak256Hasher::hash_pair(&current, sibling)
        };
    }
    current
}
