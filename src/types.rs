//! Core types for SPV verification

use serde::{Deserialize, Serialize};

/// Hash type: 256-bit hash
pub type Hash = [u8; 32];

/// Byte string type
pub type ByteString = Vec<u8>;

/// Network selector for the hard-coded genesis headers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Network {
    Mainnet,
    Testnet,
}

/// Block Header: the fixed 80-byte header.
///
/// `prev_block_hash` and `merkle_root` are held in display (big-endian)
/// order; the wire form carries them byte-reversed. `bits` and `nonce`
/// keep their raw wire bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockHeader {
    pub version: i32,
    pub prev_block_hash: Hash,
    pub merkle_root: Hash,
    pub timestamp: u32,
    pub bits: [u8; 4],
    pub nonce: [u8; 4],
}

/// Merkle block: a header plus a partial merkle tree over its transactions.
///
/// `hashes` are held in display order, `flags` as the raw flag bytes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MerkleBlock {
    pub header: BlockHeader,
    pub total: u32,
    pub hashes: Vec<Hash>,
    pub flags: ByteString,
}

/// The full ordered transaction hash list of a block (display order),
/// checked against a header's committed merkle root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MerkleInclusionCheck {
    pub tx_hashes: Vec<Hash>,
}

impl MerkleInclusionCheck {
    pub fn new(tx_hashes: Vec<Hash>) -> Self {
        Self { tx_hashes }
    }
}
