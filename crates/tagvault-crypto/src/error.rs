//! Error types for cryptographic operations

use thiserror::Error;

/// Errors that can occur during cryptographic operations
///
/// Payloads carry lengths only. Key bytes, plaintext and cipher state never
/// appear in an error.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CryptoError {
    /// Buffer handed to block-mode encryption is not a whole number of blocks
    #[error("Invalid block length: {len} is not a multiple of {block_size}")]
    InvalidBlockLength {
        /// Length of the rejected buffer
        len: usize,
        /// Cipher block size in bytes
        block_size: usize,
    },

    /// Invalid key size
    #[error("Invalid key size: expected {expected}, got {actual}")]
    InvalidKeySize {
        /// Expected key size in bytes
        expected: usize,
        /// Actual key size in bytes
        actual: usize,
    },

    /// Invalid key format
    #[error("Invalid key format: {0}")]
    InvalidKeyFormat(String),

    /// Secure message could not be parsed
    #[error("Malformed secure message: {0}")]
    MalformedMessage(String),

    /// Recomputed MAC does not match the transmitted one
    #[error("MAC verification failed")]
    MacMismatch,
}

impl From<hex::FromHexError> for CryptoError {
    fn from(err: hex::FromHexError) -> Self {
        Self::MalformedMessage(format!("invalid hex: {err}"))
    }
}
