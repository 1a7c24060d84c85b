//! TEA block cipher used for tag records and transport messages
//!
//! This is the classic Tiny Encryption Algorithm:
//! - 64-bit block, 128-bit key, 32 cycles
//! - Block and key words are packed little-endian
//! - Multi-block buffers are processed block by block with no chaining
//!
//! ECB mode leaks equality of plaintext blocks. Callers randomize by using a
//! fresh key per record or message (derived from a fresh IV) rather than by
//! chaining.

use crate::error::CryptoError;

/// Cipher block size in bytes
pub const BLOCK_SIZE: usize = 8;

/// Key schedule constant, `floor(2^32 / phi)`
const DELTA: u32 = 0x9E37_79B9;

/// Number of cycles
const ROUNDS: u32 = 32;

fn load_block(block: &[u8; BLOCK_SIZE]) -> (u32, u32) {
    (
        u32::from_le_bytes([block[0], block[1], block[2], block[3]]),
        u32::from_le_bytes([block[4], block[5], block[6], block[7]]),
    )
}

fn store_block(v0: u32, v1: u32) -> [u8; BLOCK_SIZE] {
    let mut out = [0u8; BLOCK_SIZE];
    out[..4].copy_from_slice(&v0.to_le_bytes());
    out[4..].copy_from_slice(&v1.to_le_bytes());
    out
}

fn key_words(key: &[u8; 16]) -> [u32; 4] {
    [
        u32::from_le_bytes([key[0], key[1], key[2], key[3]]),
        u32::from_le_bytes([key[4], key[5], key[6], key[7]]),
        u32::from_le_bytes([key[8], key[9], key[10], key[11]]),
        u32::from_le_bytes([key[12], key[13], key[14], key[15]]),
    ]
}

/// Feistel half-round function
#[inline]
fn feistel(v: u32, sum: u32, ka: u32, kb: u32) -> u32 {
    (v << 4).wrapping_add(ka) ^ v.wrapping_add(sum) ^ (v >> 5).wrapping_add(kb)
}

/// Encrypt a single 8-byte block
///
/// # Examples
///
/// ```
/// use tagvault_crypto::tea::{decrypt_block, encrypt_block};
///
/// let key = [0x42u8; 16];
/// let block = *b"tagvault";
/// let ciphertext = encrypt_block(block, &key);
/// assert_eq!(decrypt_block(ciphertext, &key), block);
/// ```
pub fn encrypt_block(block: [u8; BLOCK_SIZE], key: &[u8; 16]) -> [u8; BLOCK_SIZE] {
    let (mut v0, mut v1) = load_block(&block);
    let [k0, k1, k2, k3] = key_words(key);

    let mut sum = 0u32;
    for _ in 0..ROUNDS {
        sum = sum.wrapping_add(DELTA);
        v0 = v0.wrapping_add(feistel(v1, sum, k0, k1));
        v1 = v1.wrapping_add(feistel(v0, sum, k2, k3));
    }

    store_block(v0, v1)
}

/// Decrypt a single 8-byte block
pub fn decrypt_block(block: [u8; BLOCK_SIZE], key: &[u8; 16]) -> [u8; BLOCK_SIZE] {
    let (mut v0, mut v1) = load_block(&block);
    let [k0, k1, k2, k3] = key_words(key);

    let mut sum = DELTA.wrapping_mul(ROUNDS);
    for _ in 0..ROUNDS {
        v1 = v1.wrapping_sub(feistel(v0, sum, k2, k3));
        v0 = v0.wrapping_sub(feistel(v1, sum, k0, k1));
        sum = sum.wrapping_sub(DELTA);
    }

    store_block(v0, v1)
}

fn check_block_length(len: usize) -> Result<(), CryptoError> {
    if len % BLOCK_SIZE == 0 {
        Ok(())
    } else {
        Err(CryptoError::InvalidBlockLength {
            len,
            block_size: BLOCK_SIZE,
        })
    }
}

/// Encrypt a buffer in place, one independent block at a time
///
/// The buffer length must be a multiple of [`BLOCK_SIZE`]; pad upstream with
/// [`crate::padding::pad_to_block`].
pub fn encrypt_ecb(data: &mut [u8], key: &[u8; 16]) -> Result<(), CryptoError> {
    check_block_length(data.len())?;
    for chunk in data.chunks_exact_mut(BLOCK_SIZE) {
        let mut block = [0u8; BLOCK_SIZE];
        block.copy_from_slice(chunk);
        chunk.copy_from_slice(&encrypt_block(block, key));
    }
    Ok(())
}

/// Decrypt a buffer in place, one independent block at a time
pub fn decrypt_ecb(data: &mut [u8], key: &[u8; 16]) -> Result<(), CryptoError> {
    check_block_length(data.len())?;
    for chunk in data.chunks_exact_mut(BLOCK_SIZE) {
        let mut block = [0u8; BLOCK_SIZE];
        block.copy_from_slice(chunk);
        chunk.copy_from_slice(&decrypt_block(block, key));
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_tea_zero_vector() {
        // Reference TEA output for an all-zero key and block: 41ea3a0a 94baa940
        let ciphertext = encrypt_block([0u8; 8], &[0u8; 16]);
        assert_eq!(ciphertext, [0x0a, 0x3a, 0xea, 0x41, 0x40, 0xa9, 0xba, 0x94]);
        assert_eq!(decrypt_block(ciphertext, &[0u8; 16]), [0u8; 8]);
    }

    #[test]
    fn test_tea_sequential_key_vector() {
        let key: [u8; 16] = core::array::from_fn(|i| i as u8);
        let block = [0x01, 0x23, 0x45, 0x67, 0x89, 0xab, 0xcd, 0xef];

        let ciphertext = encrypt_block(block, &key);
        assert_eq!(hex::encode(ciphertext), "f1390510832697c1");
    }

    #[test]
    fn test_ecb_blocks_are_independent() {
        let key = [0x42u8; 16];
        let mut data = [0x55u8; 24];
        encrypt_ecb(&mut data, &key).expect("aligned buffer");

        // Identical plaintext blocks produce identical ciphertext blocks
        assert_eq!(data[..8], data[8..16]);
        assert_eq!(data[8..16], data[16..24]);

        decrypt_ecb(&mut data, &key).expect("aligned buffer");
        assert_eq!(data, [0x55u8; 24]);
    }

    #[test]
    fn test_ecb_rejects_partial_block() {
        let mut data = [0u8; 13];
        assert_eq!(
            encrypt_ecb(&mut data, &[0u8; 16]),
            Err(CryptoError::InvalidBlockLength {
                len: 13,
                block_size: 8
            })
        );
        // Nothing was touched
        assert_eq!(data, [0u8; 13]);
        assert!(decrypt_ecb(&mut data, &[0u8; 16]).is_err());
    }

    #[test]
    fn test_ecb_empty_buffer() {
        let mut data: [u8; 0] = [];
        assert!(encrypt_ecb(&mut data, &[1u8; 16]).is_ok());
    }

    proptest! {
        #[test]
        fn prop_block_round_trip(block in any::<[u8; 8]>(), key in any::<[u8; 16]>()) {
            prop_assert_eq!(decrypt_block(encrypt_block(block, &key), &key), block);
        }

        #[test]
        fn prop_ecb_round_trip(
            blocks in proptest::collection::vec(any::<[u8; 8]>(), 0..8),
            key in any::<[u8; 16]>(),
        ) {
            let original: Vec<u8> = blocks.concat();
            let mut data = original.clone();
            encrypt_ecb(&mut data, &key).unwrap();
            decrypt_ecb(&mut data, &key).unwrap();
            prop_assert_eq!(data, original);
        }
    }
}
