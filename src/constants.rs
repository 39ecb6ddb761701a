//! Bitcoin protocol constants used by SPV verification

/// Serialized block header size in bytes
pub const BLOCK_HEADER_SIZE: usize = 80;

/// Compact bits of the lowest-difficulty target (difficulty 1), raw wire bytes
pub const LOWEST_DIFFICULTY_BITS: [u8; 4] = [0xff, 0xff, 0x00, 0x1d];

/// Largest encodable compact bits: coefficient 0x7fffff, exponent 0xff
pub const MAX_COMPACT_BITS: [u8; 4] = [0xff, 0xff, 0x7f, 0xff];

/// Two weeks in seconds: the expected duration of a retarget window
pub const TWO_WEEKS: u32 = 60 * 60 * 24 * 14;

/// BIP37 seed multiplier for the i-th bloom hash function
pub const BIP37_CONSTANT: u32 = 0xfba4_c795;

/// Maximum block weight in weight units
pub const MAX_BLOCK_WEIGHT: u32 = 4_000_000;

/// Weight of the smallest possible transaction (60 bytes, no witness)
pub const MIN_TRANSACTION_WEIGHT: u32 = 4 * 60;

/// Upper bound on the transaction count a merkle block can claim
pub const MAX_MERKLE_BLOCK_TRANSACTIONS: u32 = MAX_BLOCK_WEIGHT / MIN_TRANSACTION_WEIGHT;

/// BIP37 maximum filter size in bytes
pub const MAX_BLOOM_FILTER_SIZE: usize = 36_000;

/// BIP37 maximum number of hash functions
pub const MAX_HASH_FUNCS: u32 = 50;

/// Filter-load update flags
pub const BLOOM_UPDATE_NONE: u8 = 0;
pub const BLOOM_UPDATE_ALL: u8 = 1;
pub const BLOOM_UPDATE_P2PUBKEY_ONLY: u8 = 2;

/// BIP9 signaling: top three version bits must equal 0b001
pub const BIP9_TOP_BITS: u32 = 0b001;

/// BIP91 signaling bit
pub const BIP91_BIT: u32 = 4;

/// BIP141 (segwit) signaling bit
pub const BIP141_BIT: u32 = 1;

/// Mainnet genesis block header, wire serialization
pub const MAINNET_GENESIS_HEADER: [u8; BLOCK_HEADER_SIZE] = [
    0x01, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
    0x00, 0x00, 0x00, 0x00, 0x3b, 0xa3, 0xed, 0xfd,
    0x7a, 0x7b, 0x12, 0xb2, 0x7a, 0xc7, 0x2c, 0x3e,
    0x67, 0x76, 0x8f, 0x61, 0x7f, 0xc8, 0x1b, 0xc3,
    0x88, 0x8a, 0x51, 0x32, 0x3a, 0x9f, 0xb8, 0xaa,
    0x4b, 0x1e, 0x5e, 0x4a, 0x29, 0xab, 0x5f, 0x49,
    0xff, 0xff, 0x00, 0x1d, 0x1d, 0xac, 0x2b, 0x7c,
];

/// Testnet genesis block header, wire serialization
pub const TESTNET_GENESIS_HEADER: [u8; BLOCK_HEADER_SIZE] = [
    0x01, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
    0x00, 0x00, 0x00, 0x00, 0x3b, 0xa3, 0xed, 0xfd,
    0x7a, 0x7b, 0x12, 0xb2, 0x7a, 0xc7, 0x2c, 0x3e,
    0x67, 0x76, 0x8f, 0x61, 0x7f, 0xc8, 0x1b, 0xc3,
    0x88, 0x8a, 0x51, 0x32, 0x3a, 0x9f, 0xb8, 0xaa,
    0x4b, 0x1e, 0x5e, 0x4a, 0xda, 0xe5, 0x49, 0x4d,
    0xff, 0xff, 0x00, 0x1d, 0x1a, 0xa4, 0xae, 0x18,
];
