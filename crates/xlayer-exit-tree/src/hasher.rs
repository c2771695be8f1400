//! Keccak256 compression function shared by tree construction and proof verification

use tiny_keccak::{Hasher, Keccak};

use crate::Hash;

/// Keccak256 hasher
#[derive(Debug, Clone, Copy, Default)]
pub struct Keccak256Hasher;

impl Keccak256Hasher {
    /// Hash two children into their parent.
    ///
    /// The preimage is the raw 64-byte concatenation `left ‖ right`, with no
    /// prefix or domain separator, matching the on-chain accumulator.
    pub fn hash_pair(left: &Hash, right: &Hash) -> Hash {
        let mut hasher = Keccak::v256();
        hasher.update(left);
        hasher.update(right);
        let mut output = [0u8; 32];
        hasher.finalize(&mut output);
        output
    }

    /// Hash arbitrary bytes
    pub fn hash(data: &[u8]) -> Hash {
        let mut hasher = Keccak::v256();
        hasher.update(data);
        let mut output = [0u8; 32];
        hasher.finalize(&mut output);
        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_pair_is_plain_concatenation() {
        let left = [1u8; 32];
        let right = [2u8; 32];

        let mut preimage = [0u8; 64];
        preimage[..32].copy_from_slice(&left);
        preimage[32..].copy_from_slice(&right);

        assert_eq!(Keccak256Hasher::hash_pair(&left, &right), Keccak256Hasher::hash(&preimage));
    }

    #[test]
    fn test_hash_pair_is_order_sensitive() {
        let left = [1u8; 32];
        let right = [2u8; 32];
        assert_ne!(
            Keccak256Hasher::hash_pair(&left, &right),
            Keccak256Hasher::hash_pair(&right, &left)
        );
    }

    #[test]
    fn test_hash_empty_input() {
        // keccak256("")
        let expected =
            hex::decode("c5d2460186f7233c927e7db2dcc703c0e500b653ca82273b7bfad8045d85a470")
                .unwrap();
        assert_eq!(Keccak256Hasher::hash(&[]).to_vec(), expected);
    }
}
