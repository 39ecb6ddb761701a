//! BIP37 bloom filter
//!
//! A fixed-size bit array and `function_count` seeded murmur3 hashes. The
//! filter over-approximates membership: bits are only ever set, so an
//! inserted item is never reported absent, while unrelated items may be
//! reported present.

use crate::config::FilterConfig;
use crate::constants::BIP37_CONSTANT;
use crate::error::Result;
use crate::hashing::murmur3_32;
use crate::wire::WireWriter;
use bitvec::prelude::*;
use tracing::trace;

/// Bloom filter sent to a peer with a filter-load request
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BloomFilter {
    /// Bit field, bit `i` stored in byte `i / 8` at position `i % 8`
    bits: BitVec<u8, Lsb0>,
    function_count: u32,
    tweak: u32,
    update_flag: u8,
    inserted: usize,
}

impl BloomFilter {
    /// Create an empty filter of `size` bytes.
    pub fn new(size: usize, function_count: u32, tweak: u32) -> Result<Self> {
        Self::from_config(&FilterConfig::new(size, function_count, tweak)?)
    }

    pub fn from_config(config: &FilterConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            bits: bitvec![u8, Lsb0; 0; config.size * 8],
            function_count: config.function_count,
            tweak: config.tweak,
            update_flag: config.update_flag,
            inserted: 0,
        })
    }

    /// Filter size in bytes
    pub fn size(&self) -> usize {
        self.bits.len() / 8
    }

    pub fn function_count(&self) -> u32 {
        self.function_count
    }

    pub fn tweak(&self) -> u32 {
        self.tweak
    }

    /// Number of `insert` calls so far
    pub fn inserted_count(&self) -> usize {
        self.inserted
    }

    pub fn is_empty(&self) -> bool {
        self.bits.not_any()
    }

    /// Bit positions for `item`: for each function i,
    /// murmur3(item, i × 0xfba4c795 + tweak) mod (size × 8).
    fn positions<'a>(&'a self, item: &'a [u8]) -> impl Iterator<Item = usize> + 'a {
        let bit_count = self.bits.len() as u64;
        (0..self.function_count).map(move |i| {
            let seed = i.wrapping_mul(BIP37_CONSTANT).wrapping_add(self.tweak);
            (murmur3_32(item, seed) as u64 % bit_count) as usize
        })
    }

    pub fn insert(&mut self, item: &[u8]) {
        let positions: Vec<usize> = self.positions(item).collect();
        trace!(item_len = item.len(), ?positions, "bloom insert");
        for pos in positions {
            self.bits.set(pos, true);
        }
        self.inserted += 1;
    }

    /// Probabilistic membership: `false` means definitely not inserted.
    pub fn contains(&self, item: &[u8]) -> bool {
        self.positions(item).all(|pos| self.bits[pos])
    }

    /// Bit field packed least-significant bit first.
    pub fn to_bytes(&self) -> Vec<u8> {
        self.bits.as_raw_slice().to_vec()
    }

    /// Filter-load payload:
    /// varint(size) | bit field | function_count(4 LE) | tweak(4 LE) | flag(1)
    pub fn filter_load_payload(&self, flag: u8) -> Vec<u8> {
        let field = self.to_bytes();
        let mut writer = WireWriter::with_capacity(field.len() + 18);
        writer
            .write_varint(field.len() as u64)
            .write_bytes(&field)
            .write_u32_le(self.function_count)
            .write_u32_le(self.tweak)
            .write_u8(flag);
        writer.into_bytes()
    }

    /// Filter-load payload using the configured update flag.
    pub fn filter_load(&self) -> Vec<u8> {
        self.filter_load_payload(self.update_flag)
    }
}
