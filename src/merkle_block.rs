//! Merkle block: wire parsing and inclusion-proof validation
//!
//! header(80) | total(4 LE) | varint n | n × hash(32) | varint m | m flag bytes

use crate::constants::{BLOCK_HEADER_SIZE, MAX_MERKLE_BLOCK_TRANSACTIONS};
use crate::error::{Result, SpvError};
use crate::hashing::reversed;
use crate::merkle_tree::MerkleTree;
use crate::types::*;
use crate::wire::{WireReader, WireWriter};
use bitvec::prelude::*;
use tracing::{debug, warn};

impl MerkleBlock {
    pub fn parse(reader: &mut WireReader<'_>) -> Result<Self> {
        let header = BlockHeader::parse(reader)?;
        let total = reader.read_u32_le()?;

        let hash_count = reader.read_count(32)?;
        let hashes = (0..hash_count)
            .map(|_| reader.read_hash())
            .collect::<Result<Vec<_>>>()?;

        let flag_len = reader.read_count(1)?;
        let flags = reader.read_bytes(flag_len)?.to_vec();

        debug!(
            block = %hex::encode(header.identity_hash()),
            total,
            hashes = hashes.len(),
            flag_bytes = flags.len(),
            "parsed merkle block"
        );
        Ok(Self {
            header,
            total,
            hashes,
            flags,
        })
    }

    /// Parse a merkle block; trailing bytes are ignored.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        Self::parse(&mut WireReader::new(bytes))
    }

    pub fn from_hex(s: &str) -> Result<Self> {
        Self::from_bytes(&hex::decode(s)?)
    }

    pub fn serialize(&self) -> Vec<u8> {
        let mut writer = WireWriter::with_capacity(
            BLOCK_HEADER_SIZE + 4 + 9 + self.hashes.len() * 32 + 9 + self.flags.len(),
        );
        writer
            .write_bytes(&self.header.serialize())
            .write_u32_le(self.total)
            .write_varint(self.hashes.len() as u64);
        for hash in &self.hashes {
            writer.write_hash(hash);
        }
        writer
            .write_varint(self.flags.len() as u64)
            .write_bytes(&self.flags);
        writer.into_bytes()
    }

    pub fn header(&self) -> &BlockHeader {
        &self.header
    }

    /// Flag bytes expanded to bits, least-significant bit of each byte first.
    pub fn flag_bits(&self) -> BitVec<u8, Lsb0> {
        BitVec::from_slice(&self.flags)
    }

    /// Reject proofs whose `total` cannot match the supplied hashes and
    /// flags before any tree is allocated.
    fn check_bounds(&self) -> Result<()> {
        let reason = if self.total > MAX_MERKLE_BLOCK_TRANSACTIONS {
            format!(
                "total {} exceeds {} transactions",
                self.total, MAX_MERKLE_BLOCK_TRANSACTIONS
            )
        } else if self.hashes.len() > self.total as usize {
            format!("{} hashes for {} transactions", self.hashes.len(), self.total)
        } else if self.flags.len() * 8 < self.hashes.len() {
            format!(
                "{} flag bits for {} hashes",
                self.flags.len() * 8,
                self.hashes.len()
            )
        } else {
            return Ok(());
        };
        warn!(total = self.total, hashes = self.hashes.len(), "{}", reason);
        Err(SpvError::InconsistentProof(reason))
    }

    /// Rebuild the partial merkle tree from the supplied hashes and flags.
    pub fn reconstruct(&self) -> Result<MerkleTree> {
        self.check_bounds()?;
        let mut tree = MerkleTree::new(self.total as usize)?;
        let flag_bits = self.flag_bits();
        tree.populate(
            flag_bits.iter().by_vals(),
            self.hashes.iter().map(reversed),
        )?;
        Ok(tree)
    }

    /// True when the reconstructed root equals the header's merkle root.
    ///
    /// A well-formed proof for a different root is `Ok(false)`; a proof
    /// whose hashes or flags do not fit the tree is `InconsistentProof`.
    pub fn is_valid(&self) -> Result<bool> {
        let tree = self.reconstruct()?;
        let computed = tree.root().map(|root| reversed(&root));
        let valid = computed == Some(self.header.merkle_root);
        if !valid {
            debug!(
                computed = ?computed.map(hex::encode),
                committed = %hex::encode(self.header.merkle_root),
                "merkle block root mismatch"
            );
        }
        Ok(valid)
    }

    /// Display-order hashes of the leaves flagged as matches, in leaf order.
    pub fn proved_hashes(&self) -> Result<Vec<Hash>> {
        let tree = self.reconstruct()?;
        let leaf_depth = tree.max_depth();
        Ok(tree
            .matched_leaves()
            .iter()
            .filter_map(|&index| tree.node(leaf_depth, index))
            .map(|hash| reversed(&hash))
            .collect())
    }
}
