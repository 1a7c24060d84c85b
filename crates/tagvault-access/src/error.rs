//! Error types for the access controller.
//!
//! All errors use thiserror for consistent error handling across the workspace.

use tagvault_cache::CacheError;
use tagvault_crypto::CryptoError;
use thiserror::Error;

/// Configuration-related errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A key option did not decode to a 16-byte key
    #[error("Invalid {name}: {source}")]
    InvalidKey {
        /// Option name
        name: &'static str,
        /// Decoding failure, without the key text
        #[source]
        source: CryptoError,
    },

    /// The store cannot hold a full cache image
    #[error("Store capacity {capacity} bytes is below the {required} bytes a full cache needs")]
    StoreTooSmall {
        /// Configured capacity
        capacity: usize,
        /// Size of a full persisted cache
        required: usize,
    },
}

/// Transport-level errors.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The message could not be handed to the transport
    #[error("Failed to send on topic {topic}: {reason}")]
    SendFailed {
        /// Destination topic
        topic: String,
        /// Failure description
        reason: String,
    },
}

/// Access controller runtime errors.
#[derive(Debug, Error)]
pub enum AccessError {
    /// Cache operation failed
    #[error("Cache error: {0}")]
    Cache(#[from] CacheError),

    /// Message sealing failed
    #[error("Crypto error: {0}")]
    Crypto(#[from] CryptoError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Persistence was requested without a store attached
    #[error("No persistent store attached")]
    NoStore,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_messages() {
        let err = ConfigError::StoreTooSmall {
            capacity: 64,
            required: 244,
        };
        assert_eq!(
            err.to_string(),
            "Store capacity 64 bytes is below the 244 bytes a full cache needs"
        );

        let err = ConfigError::InvalidKey {
            name: "master key",
            source: CryptoError::InvalidKeySize {
                expected: 16,
                actual: 4,
            },
        };
        assert!(err.to_string().starts_with("Invalid master key: "));
    }

    #[test]
    fn test_access_error_conversion() {
        let err: AccessError = CacheError::CapacityExceeded.into();
        assert!(err.to_string().contains("Cache capacity exceeded"));

        let err: AccessError = ConfigError::StoreTooSmall {
            capacity: 0,
            required: 4,
        }
        .into();
        assert!(matches!(err, AccessError::Config(_)));
    }
}
