//! Hash primitives: double SHA-256, seeded murmur3 and merkle helpers

use crate::types::Hash;
use bitcoin_hashes::{sha256d, Hash as BitcoinHash, HashEngine};
use std::io::Cursor;

/// Hash256: SHA256(SHA256(data)), raw digest order.
pub fn hash256(data: &[u8]) -> Hash {
    sha256d::Hash::hash(data).into_inner()
}

/// MurmurHash3 x86 32-bit with the given seed.
pub fn murmur3_32(data: &[u8], seed: u32) -> u32 {
    murmur3::murmur3_32(&mut Cursor::new(data), seed)
        .expect("reading from an in-memory slice cannot fail")
}

/// MerkleParent: ℍ × ℍ → ℍ = Hash256(left ‖ right), internal byte order.
pub fn merkle_parent(left: &Hash, right: &Hash) -> Hash {
    let mut engine = sha256d::Hash::engine();
    engine.input(left);
    engine.input(right);
    sha256d::Hash::from_engine(engine).into_inner()
}

/// Compute the next level up. An odd level duplicates its last hash.
pub fn merkle_parent_level(hashes: &[Hash]) -> Vec<Hash> {
    hashes
        .chunks(2)
        .map(|pair| {
            let left = &pair[0];
            let right = pair.get(1).unwrap_or(left);
            merkle_parent(left, right)
        })
        .collect()
}

/// Merkle root of a full leaf list (internal byte order).
///
/// Returns `None` for an empty list.
pub fn merkle_root(hashes: &[Hash]) -> Option<Hash> {
    let mut level = hashes.to_vec();
    while level.len() > 1 {
        level = merkle_parent_level(&level);
    }
    level.first().copied()
}

/// Reverse a hash between display and internal byte order.
pub fn reversed(hash: &Hash) -> Hash {
    let mut out = *hash;
    out.reverse();
    out
}
