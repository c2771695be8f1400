//! Synchronised access to an exit tree
//!
//! A tree has a single writer (the synchronizer) but may be queried by RPC
//! handlers at the same time. Readers either go through [`SharedExitTree`],
//! which serialises every call behind one mutex, or take an
//! [`ExitTreeSnapshot`] and query it without touching the lock again.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::{
    Hash,
    error::{Result, TreeError},
    proof::MerkleProof,
    tree::ExitTree,
};

/// Cloneable handle to an exit tree guarded by a mutex
#[derive(Clone, Debug, Default)]
pub struct SharedExitTree {
    inner: Arc<Mutex<ExitTree>>,
}

impl SharedExitTree {
    /// Wrap a tree
    pub fn new(tree: ExitTree) -> Self {
        Self { inner: Arc::new(Mutex::new(tree)) }
    }

    fn lock(&self) -> MutexGuard<'_, ExitTree> {
        // A pass interrupted by a panic stays dirty and is redone on next query.
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// See [`ExitTree::add`]
    pub fn add(&self, leaf: Hash) -> Result<u64> {
        self.lock().add(leaf)
    }

    /// See [`ExitTree::add_at`]
    pub fn add_at(&self, index: u64, leaf: Hash) -> Result<u64> {
        self.lock().add_at(index, leaf)
    }

    /// See [`ExitTree::root`]
    pub fn root(&self) -> Hash {
        self.lock().root()
    }

    /// See [`ExitTree::proof_by_index`]
    pub fn proof_by_index(&self, index: u64) -> Result<MerkleProof> {
        self.lock().proof_by_index(index)
    }

    /// See [`ExitTree::proof_by_value`]
    pub fn proof_by_value(&self, leaf: &Hash) -> Result<MerkleProof> {
        self.lock().proof_by_value(leaf)
    }

    /// Number of leaves added so far
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Whether no leaf has been added yet
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Recompute under the lock and hand out an immutable copy
    pub fn snapshot(&self) -> ExitTreeSnapshot {
        self.lock().snapshot()
    }
}

impl From<ExitTree> for SharedExitTree {
    fn from(tree: ExitTree) -> Self {
        Self::new(tree)
    }
}

/// Read-only view of an exit tree taken right after a recompute.
///
/// Queries take `&self` and never recompute, so a snapshot can be shared
/// freely between threads.
#[derive(Clone, Debug)]
pub struct ExitTreeSnapshot {
    tree: Arc<ExitTree>,
    root: Hash,
}

impl ExitTreeSnapshot {
    pub(crate) fn new(tree: ExitTree) -> Self {
        debug_assert!(!tree.is_dirty());
        let root = tree.clean_root();
        Self { tree: Arc::new(tree), root }
    }

    /// Root at the time the snapshot was taken
    pub fn root(&self) -> Hash {
        self.root
    }

    /// Tree height
    pub fn height(&self) -> u8 {
        self.tree.height()
    }

    /// Number of leaves covered by this snapshot
    pub fn len(&self) -> usize {
        self.tree.len()
    }

    /// Whether the snapshot covers no leaves
    pub fn is_empty(&self) -> bool {
        self.tree.is_empty()
    }

    /// Leaf at `index`; see [`ExitTree::leaf`]
    pub fn leaf(&self, index: u64) -> Result<Hash> {
        self.tree.leaf(index)
    }

    /// See [`ExitTree::proof_by_index`]
    pub fn proof_by_index(&self, index: u64) -> Result<MerkleProof> {
        self.tree.check_index(index)?;
        Ok(self.tree.clean_proof(index))
    }

    /// See [`ExitTree::proof_by_value`]
    pub fn proof_by_value(&self, leaf: &Hash) -> Result<MerkleProof> {
        let index = self.tree.position(leaf).ok_or(TreeError::NotFound { leaf: *leaf })?;
        self.proof_by_index(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recovers_from_poisoned_lock() {
        let shared = SharedExitTree::new(ExitTree::new(8).unwrap());
        shared.add([1u8; 32]).unwrap();

        let poisoner = shared.clone();
        let result = std::thread::spawn(move || {
            let mut tree = poisoner.inner.lock().unwrap();
            tree.add([2u8; 32]).unwrap();
            panic!("writer died holding the lock");
        })
        .join();
        assert!(result.is_err());
        assert!(shared.inner.is_poisoned());

        // the write made before the panic is kept and the root is recomputed
        assert_eq!(shared.len(), 2);
        shared.add([3u8; 32]).unwrap();
        let expected = ExitTree::from_leaves(8, [[1u8; 32], [2u8; 32], [3u8; 32]])
            .unwrap()
            .root();
        assert_eq!(shared.root(), expected);
        let proof = shared.proof_by_index(1).unwrap();
        assert!(proof.verify(&[2u8; 32], &expected));
    }

    #[test]
    fn test_snapshot_is_unaffected_by_later_writes() {
        let shared = SharedExitTree::new(ExitTree::new(8).unwrap());
        shared.add([1u8; 32]).unwrap();
        let snapshot = shared.snapshot();

        shared.add([2u8; 32]).unwrap();
        assert_eq!(snapshot.len(), 1);
        assert_ne!(snapshot.root(), shared.root());

        let proof = snapshot.proof_by_value(&[1u8; 32]).unwrap();
        assert!(proof.verify(&[1u8; 32], &snapshot.root()));
        assert!(snapshot.proof_by_value(&[2u8; 32]).is_err());
    }

    #[test]
    fn test_handles_share_one_tree() {
        let a = SharedExitTree::default();
        let b = a.clone();
        a.add([3u8; 32]).unwrap();
        assert_eq!(b.len(), 1);
        assert_eq!(a.root(), b.root());
    }
}
