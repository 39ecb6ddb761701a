//! Proof of Work: compact target arithmetic, difficulty and retargeting

use crate::block::serialize_header;
use crate::constants::*;
use crate::hashing::hash256;
use crate::types::*;
use num_bigint::BigUint;
use num_traits::Zero;
use tracing::debug;

/// ExpandTarget: bits → ℕ
///
/// The compact representation stores a little-endian 24-bit coefficient in
/// the first three bytes and a base-256 exponent in the last byte:
///
/// target = coefficient × 256^(exponent − 3)
///
/// For `ffff001d` the exponent is 0x1d (29) and the coefficient 0x00ffff.
pub fn bits_to_target(bits: &[u8; 4]) -> BigUint {
    let exponent = bits[3] as usize;
    let coefficient = BigUint::from(u32::from_le_bytes([bits[0], bits[1], bits[2], 0]));

    if exponent >= 3 {
        coefficient << (8 * (exponent - 3))
    } else {
        coefficient >> (8 * (3 - exponent))
    }
}

/// CompressTarget: ℕ → bits
///
/// Inverse of `bits_to_target` up to the precision of a 3-byte coefficient.
/// A leading byte above 0x7f would read as a sign bit, so the coefficient is
/// shifted one byte right and the exponent bumped.
///
/// Targets too wide for a one-byte exponent saturate to the largest compact
/// value, `ffff7fff`.
pub fn target_to_bits(target: &BigUint) -> [u8; 4] {
    if target.is_zero() {
        return [0; 4];
    }
    let raw = target.to_bytes_be();

    let (exponent, mut coefficient) = if raw[0] > 0x7f {
        (raw.len() + 1, vec![0u8])
    } else {
        (raw.len(), Vec::with_capacity(3))
    };
    if exponent > u8::MAX as usize {
        return MAX_COMPACT_BITS;
    }
    let take = 3 - coefficient.len();
    coefficient.extend(raw.iter().take(take));
    coefficient.resize(3, 0);

    [coefficient[2], coefficient[1], coefficient[0], exponent as u8]
}

/// Target of the lowest difficulty (bits `ffff001d`)
pub fn lowest_target() -> BigUint {
    bits_to_target(&LOWEST_DIFFICULTY_BITS)
}

/// Difficulty: lowest_target / target
///
/// A zero target (coefficient 0) cannot be met by any header; its
/// difficulty is reported as zero rather than dividing by zero.
pub fn difficulty(bits: &[u8; 4]) -> BigUint {
    let target = bits_to_target(bits);
    if target.is_zero() {
        return BigUint::zero();
    }
    lowest_target() / target
}

/// Proof value of a serialized header: Hash256 read as a little-endian
/// integer. No byte reversal is applied before interpretation.
pub fn proof_value(header_bytes: &[u8]) -> BigUint {
    BigUint::from_bytes_le(&hash256(header_bytes))
}

/// CheckProofOfWork: ℋ → {true, false}
///
/// Hash256(header) < ExpandTarget(header.bits)
pub fn check_proof_of_work(header: &BlockHeader) -> bool {
    proof_value(&serialize_header(header)) < bits_to_target(&header.bits)
}

/// CalculateNewBits: bits × ℤ → bits
///
/// 1. Clamp the time differential to [TWO_WEEKS / 4, TWO_WEEKS × 4]
/// 2. newTarget = ExpandTarget(previous) × differential / TWO_WEEKS
/// 3. Cap newTarget at the lowest-difficulty target
/// 4. Return CompressTarget(newTarget)
pub fn calculate_new_bits(previous_bits: &[u8; 4], time_differential: i64) -> [u8; 4] {
    let two_weeks = TWO_WEEKS as i64;
    let clamped = time_differential.clamp(two_weeks / 4, two_weeks * 4);
    if clamped != time_differential {
        debug!(time_differential, clamped, "retarget time differential clamped");
    }

    let mut new_target = bits_to_target(previous_bits) * BigUint::from(clamped as u64)
        / BigUint::from(TWO_WEEKS);
    let max_target = lowest_target();
    if new_target > max_target {
        new_target = max_target;
    }
    target_to_bits(&new_target)
}

/// GetNextWorkRequired: ℋ × ℋ → bits
///
/// Retarget from the first and last headers of a 2016-block window, using
/// the last header's bits and the timestamp span between the two.
pub fn get_next_work_required(first: &BlockHeader, last: &BlockHeader) -> [u8; 4] {
    let time_differential = last.timestamp as i64 - first.timestamp as i64;
    calculate_new_bits(&last.bits, time_differential)
}
