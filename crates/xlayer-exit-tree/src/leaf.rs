//! Bridge transfer leaf encoding
//!
//! The preimage layout must match the L1 bridge contract byte for byte:
//!
//! | field                 | bytes | encoding       |
//! |-----------------------|-------|----------------|
//! | `origin_network`      | 4     | little-endian  |
//! | `token_address`       | 20    | raw            |
//! | `amount`              | 32    | big-endian     |
//! | `destination_network` | 4     | little-endian  |
//! | `destination_address` | 20    | raw            |

use alloy_primitives::{Address, U256};
use serde::{Deserialize, Serialize};

use crate::{Hash, hasher::Keccak256Hasher};

/// Length of the packed leaf preimage
pub const BRIDGE_LEAF_PREIMAGE_LEN: usize = 4 + 20 + 32 + 4 + 20;

/// A bridged asset transfer as recorded in the exit tree
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BridgeLeaf {
    /// Network the asset originates from
    pub origin_network: u32,
    /// Token contract on the origin network
    pub token_address: Address,
    /// Transferred amount
    pub amount: U256,
    /// Network receiving the asset
    pub destination_network: u32,
    /// Recipient on the destination network
    pub destination_address: Address,
}

impl BridgeLeaf {
    /// Packed preimage of the leaf hash
    pub fn encode(&self) -> [u8; BRIDGE_LEAF_PREIMAGE_LEN] {
        let mut out = [0u8; BRIDGE_LEAF_PREIMAGE_LEN];
        out[0..4].copy_from_slice(&self.origin_network.to_le_bytes());
        out[4..24].copy_from_slice(self.token_address.as_slice());
        out[24..56].copy_from_slice(&self.amount.to_be_bytes::<32>());
        out[56..60].copy_from_slice(&self.destination_network.to_le_bytes());
        out[60..80].copy_from_slice(self.destination_address.as_slice());
        out
    }

    /// Leaf value inserted into the exit tree
    pub fn hash(&self) -> Hash {
        Keccak256Hasher::hash(&self.encode())
    }
}

/// Hash a bridge transfer into its 32-byte leaf
pub fn encode_bridge_leaf(
    origin_network: u32,
    token_address: Address,
    amount: U256,
    destination_network: u32,
    destination_address: Address,
) -> Hash {
    BridgeLeaf { origin_network, token_address, amount, destination_network, destination_address }
        .hash()
}
