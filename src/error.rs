//! Error types for SPV verification

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SpvError {
    #[error("Malformed wire data: {0}")]
    MalformedWireData(String),

    #[error("Inconsistent merkle proof: {0}")]
    InconsistentProof(String),

    #[error("Invalid bloom filter parameters: {0}")]
    InvalidFilterParameters(String),

    #[error("Invalid hex: {0}")]
    Hex(#[from] hex::FromHexError),
}

pub type Result<T> = std::result::Result<T, SpvError>;
