//! Zero padding to the cipher block size
//!
//! Block-mode encryption refuses partial blocks, so every producer of
//! plaintext pads through here first. Padding is plain zero fill; the
//! original length is not recorded and receivers strip trailing zeros
//! themselves if they need to.

use crate::tea::BLOCK_SIZE;

/// Smallest multiple of [`BLOCK_SIZE`] that can hold `len` bytes
///
/// ```
/// use tagvault_crypto::padding::padded_len;
///
/// assert_eq!(padded_len(0), 0);
/// assert_eq!(padded_len(7), 8);
/// assert_eq!(padded_len(8), 8);
/// assert_eq!(padded_len(14), 16);
/// ```
pub const fn padded_len(len: usize) -> usize {
    len.div_ceil(BLOCK_SIZE) * BLOCK_SIZE
}

/// Copy `data` into a zero-filled buffer of [`padded_len`] bytes
pub fn pad_to_block(data: &[u8]) -> Vec<u8> {
    let mut padded = vec![0u8; padded_len(data.len())];
    padded[..data.len()].copy_from_slice(data);
    padded
}
