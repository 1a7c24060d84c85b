//! 128-bit cipher keys and per-record key derivation
//!
//! Two independent keys exist at runtime: the cache master key and the
//! transport key. Each is owned by exactly one [`crate::CryptoEngine`] and
//! zeroed when dropped or replaced.

use std::fmt;

use zeroize::Zeroize;

use crate::digest::digest;
use crate::error::CryptoError;

/// Key size in bytes
pub const KEY_SIZE: usize = 16;

/// IV size in bytes
pub const IV_SIZE: usize = 8;

/// A 128-bit secret key. Zeroized on drop.
#[derive(Clone, PartialEq, Eq)]
pub struct Key {
    bytes: [u8; KEY_SIZE],
}

impl Key {
    /// All-zero key
    pub const fn zero() -> Self {
        Self {
            bytes: [0u8; KEY_SIZE],
        }
    }

    /// Wrap raw key bytes
    pub const fn from_bytes(bytes: [u8; KEY_SIZE]) -> Self {
        Self { bytes }
    }

    /// Build a key from a slice of any length
    ///
    /// Copies up to 16 bytes; shorter input is zero-padded and longer input
    /// is truncated.
    pub fn from_slice(material: &[u8]) -> Self {
        let mut key = Self::zero();
        let len = material.len().min(KEY_SIZE);
        key.bytes[..len].copy_from_slice(&material[..len]);
        key
    }

    /// Parse a key from 32 hex characters
    pub fn from_hex(hex: &str) -> Result<Self, CryptoError> {
        let mut bytes = hex::decode(hex.trim())
            .map_err(|e| CryptoError::InvalidKeyFormat(format!("invalid hex: {e}")))?;

        if bytes.len() != KEY_SIZE {
            let actual = bytes.len();
            bytes.zeroize();
            return Err(CryptoError::InvalidKeySize {
                expected: KEY_SIZE,
                actual,
            });
        }

        let key = Self::from_slice(&bytes);
        bytes.zeroize();
        Ok(key)
    }

    /// Borrow the raw key bytes
    pub const fn as_bytes(&self) -> &[u8; KEY_SIZE] {
        &self.bytes
    }
}

impl Default for Key {
    fn default() -> Self {
        Self::zero()
    }
}

impl Drop for Key {
    fn drop(&mut self) {
        self.bytes.zeroize();
    }
}

impl fmt::Debug for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Key").field("bytes", &"[REDACTED]").finish()
    }
}

/// Derive the key protecting one cache slot from that slot's IV
///
/// `k = digest(iv) || digest(iv)`. The derived key is never stored; it is
/// recomputed from the IV whenever the slot is read or written.
pub fn derive_slot_key(iv: &[u8; IV_SIZE]) -> Key {
    let mut half = digest(iv);
    let mut key = Key::zero();
    key.bytes[..8].copy_from_slice(&half);
    key.bytes[8..].copy_from_slice(&half);
    half.zeroize();
    key
}

/// Draw a fresh random IV
pub fn generate_iv() -> [u8; IV_SIZE] {
    rand::random()
}
