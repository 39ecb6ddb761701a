//! Wire encoding primitives: variable-length integers and little-endian
//! cursor reading/writing.
//!
//! All multi-byte integers on the wire are little-endian. Hash fields are
//! carried byte-reversed relative to their display form; `read_hash` and
//! `write_hash` perform that reversal so callers only ever see display order.

use crate::error::{Result, SpvError};
use crate::types::Hash;

/// Bitcoin-style prefix-tagged variable-length integer.
///
/// Values below 0xfd take one byte; 0xfd, 0xfe and 0xff prefix a 2, 4 or
/// 8 byte little-endian payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VarInt(pub u64);

impl VarInt {
    /// Wire length of this value: 1, 3, 5 or 9 bytes.
    pub fn length(&self) -> usize {
        match self.0 {
            0..=0xfc => 1,
            0xfd..=0xffff => 3,
            0x1_0000..=0xffff_ffff => 5,
            _ => 9,
        }
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let v = self.0;
        let mut buf = Vec::with_capacity(self.length());
        match self.length() {
            1 => buf.push(v as u8),
            3 => {
                buf.push(0xfd);
                buf.extend_from_slice(&(v as u16).to_le_bytes());
            }
            5 => {
                buf.push(0xfe);
                buf.extend_from_slice(&(v as u32).to_le_bytes());
            }
            _ => {
                buf.push(0xff);
                buf.extend_from_slice(&v.to_le_bytes());
            }
        }
        buf
    }

    /// Decode a varint from the front of `data`, returning the value and
    /// the number of bytes consumed.
    pub fn from_bytes(data: &[u8]) -> Result<(Self, usize)> {
        let mut reader = WireReader::new(data);
        let value = reader.read_varint()?;
        Ok((VarInt(value), reader.position()))
    }

    pub fn value(&self) -> u64 {
        self.0
    }
}

impl From<u64> for VarInt {
    fn from(v: u64) -> Self {
        VarInt(v)
    }
}

impl From<usize> for VarInt {
    fn from(v: usize) -> Self {
        VarInt(v as u64)
    }
}

/// Cursor over a byte slice for reading wire-format data.
pub struct WireReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> WireReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        WireReader { data, pos: 0 }
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    /// Read `n` bytes and advance the position.
    pub fn read_bytes(&mut self, n: usize) -> Result<&'a [u8]> {
        if n > self.remaining() {
            return Err(SpvError::MalformedWireData(format!(
                "need {} bytes at offset {}, only {} available",
                n,
                self.pos,
                self.remaining()
            )));
        }
        let slice = &self.data[self.pos..self.pos + n];
        self.pos += n;
        Ok(slice)
    }

    pub fn read_array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.read_bytes(N)?);
        Ok(out)
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        Ok(self.read_bytes(1)?[0])
    }

    pub fn read_u16_le(&mut self) -> Result<u16> {
        Ok(u16::from_le_bytes(self.read_array()?))
    }

    pub fn read_u32_le(&mut self) -> Result<u32> {
        Ok(u32::from_le_bytes(self.read_array()?))
    }

    pub fn read_i32_le(&mut self) -> Result<i32> {
        Ok(i32::from_le_bytes(self.read_array()?))
    }

    pub fn read_u64_le(&mut self) -> Result<u64> {
        Ok(u64::from_le_bytes(self.read_array()?))
    }

    /// Read a varint. Non-canonical encodings (a wider prefix than the
    /// value needs) are rejected.
    pub fn read_varint(&mut self) -> Result<u64> {
        let prefix = self.read_u8()?;
        let (value, min) = match prefix {
            0xfd => (self.read_u16_le()? as u64, 0xfd),
            0xfe => (self.read_u32_le()? as u64, 0x1_0000),
            0xff => (self.read_u64_le()?, 0x1_0000_0000),
            b => return Ok(b as u64),
        };
        if value < min {
            return Err(SpvError::MalformedWireData(format!(
                "non-canonical varint 0x{:x} with prefix 0x{:02x}",
                value, prefix
            )));
        }
        Ok(value)
    }

    /// Read a varint used as an element count, rejecting counts that could
    /// not possibly fit in the remaining input.
    pub fn read_count(&mut self, element_size: usize) -> Result<usize> {
        let count = self.read_varint()?;
        let needed = count.checked_mul(element_size as u64);
        match needed {
            Some(n) if n <= self.remaining() as u64 => Ok(count as usize),
            _ => Err(SpvError::MalformedWireData(format!(
                "length field {} exceeds remaining {} bytes",
                count,
                self.remaining()
            ))),
        }
    }

    /// Read a 32-byte hash from wire order into display order.
    pub fn read_hash(&mut self) -> Result<Hash> {
        let mut hash: Hash = self.read_array()?;
        hash.reverse();
        Ok(hash)
    }
}

/// Growable buffer for writing wire-format data.
#[derive(Debug, Default)]
pub struct WireWriter {
    buf: Vec<u8>,
}

impl WireWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        WireWriter {
            buf: Vec::with_capacity(capacity),
        }
    }

    pub fn write_bytes(&mut self, bytes: &[u8]) -> &mut Self {
        self.buf.extend_from_slice(bytes);
        self
    }

    pub fn write_u8(&mut self, v: u8) -> &mut Self {
        self.buf.push(v);
        self
    }

    pub fn write_u32_le(&mut self, v: u32) -> &mut Self {
        self.write_bytes(&v.to_le_bytes())
    }

    pub fn write_i32_le(&mut self, v: i32) -> &mut Self {
        self.write_bytes(&v.to_le_bytes())
    }

    pub fn write_varint(&mut self, v: u64) -> &mut Self {
        self.write_bytes(&VarInt(v).to_bytes())
    }

    /// Write a display-order hash in wire order.
    pub fn write_hash(&mut self, hash: &Hash) -> &mut Self {
        self.buf.extend(hash.iter().rev());
        self
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }
}
