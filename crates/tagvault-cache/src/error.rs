//! Error types for cache operations

use tagvault_crypto::CryptoError;
use thiserror::Error;

/// Errors raised at the persistent store boundary
#[derive(Debug, Error)]
pub enum StoreError {
    /// Access outside the store's fixed capacity
    #[error("Store access out of bounds: offset {offset} + {len} bytes exceeds capacity {capacity}")]
    OutOfBounds {
        /// Start of the rejected access
        offset: usize,
        /// Length of the rejected access
        len: usize,
        /// Store capacity in bytes
        capacity: usize,
    },

    /// Underlying I/O failure
    #[error("Store I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors that can occur during cache operations
///
/// Payloads identify slots by index and carry counts and lengths only.
#[derive(Debug, Error)]
pub enum CacheError {
    /// No slot is free and no slot can be evicted
    #[error("Cache capacity exceeded")]
    CapacityExceeded,

    /// Persisted image does not start with the expected magic number
    #[error("Invalid store magic: expected {expected:#06x}, found {found:#06x}")]
    InvalidMagic {
        /// Magic number this build writes
        expected: u16,
        /// Magic number read from the store
        found: u16,
    },

    /// Persisted slot count is larger than the cache can hold
    #[error("Persisted slot count {count} exceeds capacity {max}")]
    SlotCountOutOfRange {
        /// Count read from the store
        count: u8,
        /// Cache capacity
        max: usize,
    },

    /// Invalid cache configuration
    #[error("Invalid cache configuration: {0}")]
    InvalidConfiguration(String),

    /// Record or slot could not be (de)serialized
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Persistent store failure
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Cryptographic misuse
    #[error(transparent)]
    Crypto(#[from] CryptoError),
}

impl From<binrw::Error> for CacheError {
    fn from(err: binrw::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

impl CacheError {
    /// Whether the error means the persisted image cannot be trusted
    pub const fn is_corruption(&self) -> bool {
        matches!(
            self,
            Self::InvalidMagic { .. } | Self::SlotCountOutOfRange { .. }
        )
    }
}

/// Result type for cache operations
pub type CacheResult<T> = Result<T, CacheError>;

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_carry_no_payload_bytes() {
        let err = CacheError::InvalidMagic {
            expected: 0xABCD,
            found: 0xFFFF,
        };
        assert_eq!(
            err.to_string(),
            "Invalid store magic: expected 0xabcd, found 0xffff"
        );
        assert!(err.is_corruption());

        let err = CacheError::SlotCountOutOfRange { count: 9, max: 5 };
        assert_eq!(err.to_string(), "Persisted slot count 9 exceeds capacity 5");
        assert!(err.is_corruption());
    }

    #[test]
    fn test_store_error_conversion() {
        let err: CacheError = StoreError::OutOfBounds {
            offset: 1000,
            len: 48,
            capacity: 1024,
        }
        .into();
        assert!(matches!(err, CacheError::Store(StoreError::OutOfBounds { .. })));
        assert!(!err.is_corruption());
    }

    #[test]
    fn test_crypto_error_conversion() {
        let err: CacheError = CryptoError::InvalidBlockLength {
            len: 3,
            block_size: 8,
        }
        .into();
        assert!(matches!(err, CacheError::Crypto(_)));
    }
}
