//! Bridge exit tree for X Layer
//!
//! A fixed-height, append-only Keccak Merkle tree recording every bridge
//! deposit or message as a leaf. The hash ordering and zero padding match the
//! L1 bridge contract exactly, so the rollup and the contract always agree on
//! the root for the same ordered event stream.
//!
//! - [`ExitTree`]: lazily recomputed tree producing roots and proofs
//! - [`FrontierTree`]: frontier-only variant with eager root updates
//! - [`verify_merkle_proof`]: stateless proof check
//! - [`BridgeLeaf`]: packing of a bridge transfer into a leaf
//! - [`SharedExitTree`] / [`ExitTreeSnapshot`]: access from several threads

mod config;
mod error;
mod frontier;
mod hasher;
mod leaf;
mod proof;
mod shared;
mod tree;
mod utils;
mod zero_hashes;

pub use config::ExitTreeConfig;
pub use error::{Result, TreeError};
pub use frontier::FrontierTree;
pub use hasher::Keccak256Hasher;
pub use leaf::{BRIDGE_LEAF_PREIMAGE_LEN, BridgeLeaf, encode_bridge_leaf};
pub use proof::{MerkleProof, verify_merkle_proof};
pub use shared::{ExitTreeSnapshot, SharedExitTree};
pub use tree::{ExitTree, LeafLogEntry};
pub use utils::{bytes32_from_str, format_hash_hex, parse_hash_hex};
pub use zero_hashes::ZeroHashes;

/// 32-byte hash type
pub type Hash = [u8; 32];

/// Height of the deployed bridge exit trees
pub const DEFAULT_HEIGHT: u8 = 32;

/// Largest supported tree height; leaf indices are `u64`
pub const MAX_HEIGHT: u8 = 64;
