//! Exit tree errors

use crate::{Hash, utils::format_hash_hex};

/// Result alias used across the crate
pub type Result<T, E = TreeError> = std::result::Result<T, E>;

/// Errors returned by exit tree operations
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TreeError {
    /// No leaf with the requested value has been added yet.
    ///
    /// Usually means the synchronizer has not caught up; retry later.
    #[error("leaf {} not found in tree", format_hash_hex(.leaf))]
    NotFound {
        /// Leaf that was looked up
        leaf: Hash,
    },

    /// Index does not fit in a tree of this height
    #[error("index {index} out of range for tree of height {height}")]
    IndexOutOfRange {
        /// Requested index
        index: u64,
        /// Tree height
        height: u8,
    },

    /// Height is not supported or the zero hash table is too short for it
    #[error("unsupported tree height {height}, maximum is {max}")]
    InvalidHeight {
        /// Requested height
        height: u8,
        /// Largest supported height
        max: u8,
    },

    /// Every leaf slot is already taken
    #[error("tree is full, capacity is {capacity} leaves")]
    TreeFull {
        /// Number of leaves the tree can hold
        capacity: u128,
    },

    /// An ordered insertion skipped or repeated a position
    #[error("mismatched leaf index: got {actual}, expected {expected}")]
    LeafIndexMismatch {
        /// Index the tree expects next
        expected: u64,
        /// Index supplied by the caller
        actual: u64,
    },

    /// Text does not fit in a 32-byte slot with a trailing zero
    #[error("text is {len} bytes long, at most 31 bytes fit")]
    TextTooLong {
        /// Length of the rejected text
        len: usize,
    },

    /// A configuration value is set but cannot be parsed
    #[error("invalid value {value:?} for {key}")]
    InvalidConfig {
        /// Configuration key
        key: String,
        /// Rejected raw value
        value: String,
    },

    /// Value is not a valid 32-byte hex string
    #[error("invalid 32-byte hex value: {0}")]
    InvalidHex(String),
}
