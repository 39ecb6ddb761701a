//! # SPV-Proof
//!
//! Simplified payment verification primitives: block headers and their
//! proof of work, BIP37 bloom filters, and partial merkle tree proofs.
//!
//! Everything here is a pure computation over bytes already in hand. Peer
//! networking, header-chain storage and wallet bookkeeping live elsewhere
//! and call into this crate.
//!
//! ## Flow
//!
//! 1. Build a [`BloomFilter`](bloom::BloomFilter) over the items of interest
//!    and send its filter-load payload to a peer.
//! 2. Parse each returned [`MerkleBlock`], check its header's linkage and
//!    proof of work.
//! 3. Reconstruct the partial merkle tree and compare the root with the
//!    header's commitment.
//!
//! ## Usage
//!
//! ```rust
//! use spv_proof::SpvProof;
//! use spv_proof::types::*;
//!
//! let spv = SpvProof::new();
//! let genesis = BlockHeader::genesis(Network::Mainnet);
//! assert!(spv.check_proof_of_work(&genesis));
//! assert_eq!(
//!     hex::encode(spv.identity_hash(&genesis)),
//!     "000000000019d6689c085ae165831e934ff763ae46a2a6c172b3f1b60a8ce26f"
//! );
//! ```

pub mod types;
pub mod constants;
pub mod error;
pub mod config;
pub mod hashing;
pub mod wire;
pub mod pow;
pub mod block;
pub mod bloom;
pub mod merkle_tree;
pub mod merkle_block;

// Re-export commonly used types
pub use types::*;
pub use constants::*;
pub use error::{Result, SpvError};
pub use bloom::BloomFilter;
pub use config::FilterConfig;
pub use merkle_tree::MerkleTree;

/// Entry point for the checks a light client runs on peer data
///
/// # Examples
///
/// ```
/// use spv_proof::{FilterConfig, SpvProof};
///
/// let spv = SpvProof::new();
/// let mut filter = spv.new_filter(&FilterConfig::new(10, 5, 99).unwrap()).unwrap();
/// filter.insert(b"Hello World");
/// filter.insert(b"Goodbye!");
/// assert_eq!(
///     hex::encode(spv.filter_load(&filter)),
///     "0a4000600a080000010940050000006300000001"
/// );
/// ```
#[derive(Debug, Default, Clone, Copy)]
pub struct SpvProof;

impl SpvProof {
    pub fn new() -> Self {
        Self
    }

    /// Parse an 80-byte block header
    ///
    /// # Examples
    ///
    /// ```
    /// use spv_proof::SpvProof;
    /// use spv_proof::constants::MAINNET_GENESIS_HEADER;
    ///
    /// let spv = SpvProof::new();
    /// let header = spv.parse_header(&MAINNET_GENESIS_HEADER).unwrap();
    /// assert_eq!(header.timestamp, 1_231_006_505);
    /// assert!(spv.parse_header(&MAINNET_GENESIS_HEADER[..79]).is_err());
    /// ```
    pub fn parse_header(&self, bytes: &[u8]) -> Result<BlockHeader> {
        BlockHeader::from_bytes(bytes)
    }

    /// Hash256(header) < target(bits)
    pub fn check_proof_of_work(&self, header: &BlockHeader) -> bool {
        header.check_proof_of_work()
    }

    /// Block ID in display order
    pub fn identity_hash(&self, header: &BlockHeader) -> Hash {
        header.identity_hash()
    }

    /// True when `header` builds on `prev` and carries valid proof of work.
    pub fn check_header(&self, header: &BlockHeader, prev: &BlockHeader) -> bool {
        header.check_linkage(prev) && header.check_proof_of_work()
    }

    /// Bits required for the next retarget window
    pub fn get_next_work_required(&self, first: &BlockHeader, last: &BlockHeader) -> [u8; 4] {
        pow::get_next_work_required(first, last)
    }

    pub fn parse_merkle_block(&self, bytes: &[u8]) -> Result<MerkleBlock> {
        MerkleBlock::from_bytes(bytes)
    }

    /// Validate a merkle block: proof of work on its header and the partial
    /// merkle tree against the header's merkle root.
    pub fn validate_merkle_block(&self, merkle_block: &MerkleBlock) -> Result<bool> {
        if !merkle_block.header.check_proof_of_work() {
            return Ok(false);
        }
        merkle_block.is_valid()
    }

    /// Check a block's full transaction list against its header.
    pub fn validate_merkle_root(&self, header: &BlockHeader, check: &MerkleInclusionCheck) -> bool {
        block::validate_merkle_root(header, check)
    }

    pub fn new_filter(&self, config: &FilterConfig) -> Result<BloomFilter> {
        BloomFilter::from_config(config)
    }

    /// Filter-load payload with the filter's configured update flag
    pub fn filter_load(&self, filter: &BloomFilter) -> Vec<u8> {
        filter.filter_load()
    }
}
