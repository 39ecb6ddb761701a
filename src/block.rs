//! Block header functions: wire format, identity hash, proof of work and
//! version-bit signaling

use crate::constants::*;
use crate::error::{Result, SpvError};
use crate::hashing::{hash256, merkle_root, reversed};
use crate::pow;
use crate::types::*;
use crate::wire::{WireReader, WireWriter};
use num_bigint::BigUint;
use tracing::debug;

impl BlockHeader {
    /// Read an 80-byte header from a wire stream.
    pub fn parse(reader: &mut WireReader<'_>) -> Result<Self> {
        let raw = reader.read_array::<BLOCK_HEADER_SIZE>().map_err(|e| {
            SpvError::MalformedWireData(format!("block header: {}", e))
        })?;
        Ok(decode_header(&raw))
    }

    /// Parse a header from exactly 80 bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() != BLOCK_HEADER_SIZE {
            return Err(SpvError::MalformedWireData(format!(
                "block header must be {} bytes, got {}",
                BLOCK_HEADER_SIZE,
                bytes.len()
            )));
        }
        Self::parse(&mut WireReader::new(bytes))
    }

    pub fn from_hex(s: &str) -> Result<Self> {
        Self::from_bytes(&hex::decode(s)?)
    }

    /// Genesis header of the given network.
    pub fn genesis(network: Network) -> Self {
        match network {
            Network::Mainnet => decode_header(&MAINNET_GENESIS_HEADER),
            Network::Testnet => decode_header(&TESTNET_GENESIS_HEADER),
        }
    }

    pub fn serialize(&self) -> [u8; BLOCK_HEADER_SIZE] {
        serialize_header(self)
    }

    /// Block ID: Hash256(header), reversed into display order.
    pub fn identity_hash(&self) -> Hash {
        reversed(&hash256(&self.serialize()))
    }

    /// True when this header's `prev_block_hash` names `prev`.
    pub fn check_linkage(&self, prev: &BlockHeader) -> bool {
        self.prev_block_hash == prev.identity_hash()
    }

    pub fn target(&self) -> BigUint {
        pow::bits_to_target(&self.bits)
    }

    pub fn difficulty(&self) -> BigUint {
        pow::difficulty(&self.bits)
    }

    /// Hash256 of the serialized header read as a little-endian integer.
    pub fn proof(&self) -> BigUint {
        pow::proof_value(&self.serialize())
    }

    pub fn check_proof_of_work(&self) -> bool {
        pow::check_proof_of_work(self)
    }

    /// BIP9: top three version bits are 001.
    pub fn is_bip9(&self) -> bool {
        (self.version as u32) >> 29 == BIP9_TOP_BITS
    }

    /// BIP91: bit 4 set.
    pub fn is_bip91(&self) -> bool {
        ((self.version as u32) >> BIP91_BIT) & 1 == 1
    }

    /// BIP141: bit 1 set.
    pub fn is_bip141(&self) -> bool {
        ((self.version as u32) >> BIP141_BIT) & 1 == 1
    }
}

/// Serialize header to its 80-byte wire form
///
/// version(4 LE) | prev_block_hash(32, reversed) | merkle_root(32, reversed)
/// | timestamp(4 LE) | bits(4) | nonce(4)
pub fn serialize_header(header: &BlockHeader) -> [u8; BLOCK_HEADER_SIZE] {
    let mut writer = WireWriter::with_capacity(BLOCK_HEADER_SIZE);
    writer
        .write_i32_le(header.version)
        .write_hash(&header.prev_block_hash)
        .write_hash(&header.merkle_root)
        .write_u32_le(header.timestamp)
        .write_bytes(&header.bits)
        .write_bytes(&header.nonce);

    let mut out = [0u8; BLOCK_HEADER_SIZE];
    out.copy_from_slice(&writer.into_bytes());
    out
}

fn decode_header(raw: &[u8; BLOCK_HEADER_SIZE]) -> BlockHeader {
    BlockHeader {
        version: i32::from_le_bytes(field(&raw[0..4])),
        prev_block_hash: reversed(&field(&raw[4..36])),
        merkle_root: reversed(&field(&raw[36..68])),
        timestamp: u32::from_le_bytes(field(&raw[68..72])),
        bits: field(&raw[72..76]),
        nonce: field(&raw[76..80]),
    }
}

fn field<const N: usize>(slice: &[u8]) -> [u8; N] {
    let mut out = [0u8; N];
    out.copy_from_slice(slice);
    out
}

/// ValidateMerkleRoot: ℋ × ℍ* → {true, false}
///
/// Recompute the merkle root from the block's full transaction hash list
/// and compare it against the header's committed root. Hashes are supplied
/// in display order and reversed for hashing.
pub fn validate_merkle_root(header: &BlockHeader, check: &MerkleInclusionCheck) -> bool {
    let leaves: Vec<Hash> = check.tx_hashes.iter().map(reversed).collect();
    match merkle_root(&leaves) {
        Some(root) => {
            let matches = reversed(&root) == header.merkle_root;
            if !matches {
                debug!(
                    leaves = leaves.len(),
                    computed = %hex::encode(reversed(&root)),
                    committed = %hex::encode(header.merkle_root),
                    "merkle root mismatch"
                );
            }
            matches
        }
        None => false,
    }
}
