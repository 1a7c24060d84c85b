//! Keyed engine bundling the block cipher and the digest
//!
//! A [`CryptoEngine`] exclusively owns one active [`Key`]. Replacing the key
//! zeroes the previous one, and dropping the engine zeroes the current one.

use zeroize::{Zeroize, Zeroizing};

use crate::digest::{DIGEST_SIZE, digest};
use crate::error::CryptoError;
use crate::keys::{KEY_SIZE, Key};
use crate::tea;

/// MAC size in bytes
pub const MAC_SIZE: usize = DIGEST_SIZE;

/// Block cipher, digest and MAC under a single owned key
#[derive(Debug, Default)]
pub struct CryptoEngine {
    key: Key,
}

impl CryptoEngine {
    /// Engine holding `key`
    pub fn new(key: Key) -> Self {
        Self { key }
    }

    /// Replace the active key
    ///
    /// Copies up to 16 bytes of `material`; shorter input is zero-padded and
    /// longer input truncated. The old key is zeroed first.
    pub fn set_key(&mut self, material: &[u8]) {
        self.key = Key::from_slice(material);
    }

    /// Replace the active key with an owned one
    pub fn replace_key(&mut self, key: Key) {
        self.key = key;
    }

    /// Encrypt `data` in place, block by block
    pub fn encrypt(&self, data: &mut [u8]) -> Result<(), CryptoError> {
        tea::encrypt_ecb(data, self.key.as_bytes())
    }

    /// Decrypt `data` in place, block by block
    pub fn decrypt(&self, data: &mut [u8]) -> Result<(), CryptoError> {
        tea::decrypt_ecb(data, self.key.as_bytes())
    }

    /// Unkeyed digest of `data`
    pub fn hash(&self, data: &[u8]) -> [u8; DIGEST_SIZE] {
        digest(data)
    }

    /// `digest(key || data)`
    pub fn generate_mac(&self, data: &[u8]) -> [u8; MAC_SIZE] {
        // The scratch buffer holds key material and is wiped on drop
        let mut scratch = Zeroizing::new(Vec::with_capacity(KEY_SIZE + data.len()));
        scratch.extend_from_slice(self.key.as_bytes());
        scratch.extend_from_slice(data);
        digest(&scratch)
    }

    /// Recompute the MAC over `data` and compare it to `mac` in constant time
    pub fn verify_mac(&self, data: &[u8], mac: &[u8; MAC_SIZE]) -> bool {
        let mut expected = self.generate_mac(data);
        let ok = constant_time_eq(&expected, mac);
        expected.zeroize();
        ok
    }
}

/// Equality with no data-dependent early exit
pub fn constant_time_eq(a: &[u8; MAC_SIZE], b: &[u8; MAC_SIZE]) -> bool {
    let diff = a.iter().zip(b.iter()).fold(0u8, |acc, (x, y)| acc | (x ^ y));
    diff == 0
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;

    fn master_key() -> Key {
        Key::from_slice(&[0x42])
    }

    #[test]
    fn test_mac_is_digest_of_key_then_data() {
        let engine = CryptoEngine::new(master_key());
        assert_eq!(hex::encode(engine.generate_mac(b"hello")), "6cf19bb84df0e920");

        let mut joined = master_key().as_bytes().to_vec();
        joined.extend_from_slice(b"hello");
        assert_eq!(engine.generate_mac(b"hello"), engine.hash(&joined));
    }

    #[test]
    fn test_mac_depends_on_key() {
        let a = CryptoEngine::new(Key::from_slice(&[1]));
        let b = CryptoEngine::new(Key::from_slice(&[2]));
        assert_ne!(a.generate_mac(b"payload"), b.generate_mac(b"payload"));
    }

    #[test]
    fn test_verify_mac() {
        let engine = CryptoEngine::new(master_key());
        let mac = engine.generate_mac(b"ciphertext");
        assert!(engine.verify_mac(b"ciphertext", &mac));

        let mut bad = mac;
        bad[7] ^= 0x80;
        assert!(!engine.verify_mac(b"ciphertext", &bad));
        assert!(!engine.verify_mac(b"ciphertexT", &mac));
    }

    #[test]
    fn test_set_key_changes_cipher_output() {
        let mut engine = CryptoEngine::default();
        let mut a = [7u8; 16];
        engine.encrypt(&mut a).expect("aligned");

        engine.set_key(&[0x42; 20]);
        let mut b = [7u8; 16];
        engine.encrypt(&mut b).expect("aligned");
        assert_ne!(a, b);

        engine.decrypt(&mut b).expect("aligned");
        assert_eq!(b, [7u8; 16]);
    }

    #[test]
    fn test_encrypt_rejects_unpadded_input() {
        let engine = CryptoEngine::new(master_key());
        let mut data = [0u8; 7];
        assert!(matches!(
            engine.encrypt(&mut data),
            Err(CryptoError::InvalidBlockLength { len: 7, .. })
        ));
    }

    #[test]
    fn test_constant_time_eq() {
        assert!(constant_time_eq(&[1; 8], &[1; 8]));
        assert!(!constant_time_eq(&[1; 8], &[1, 1, 1, 1, 1, 1, 1, 0]));
    }
}
