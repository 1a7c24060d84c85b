//! Plaintext tag record and its fixed byte layout
//!
//! The record is serialized packed and little-endian, 14 bytes:
//!
//! ```text
//! [7 bytes: uid][4 bytes: last_used][2 bytes: use_count][1 byte: valid]
//! ```
//!
//! Inside a slot it is zero padded to [`RECORD_BUFFER_SIZE`] bytes before
//! encryption.

use binrw::io::Cursor;
use binrw::{BinRead, BinWrite};
use tagvault_crypto::padded_len;
use zeroize::Zeroize;

use crate::error::CacheResult;

/// Tag UID length in bytes
pub const UID_SIZE: usize = 7;

/// Serialized size of a [`TagRecord`]
pub const RECORD_SIZE: usize = UID_SIZE + 4 + 2 + 1;

/// Size of the encrypted record buffer inside a slot
pub const RECORD_BUFFER_SIZE: usize = 32;

const _: () = assert!(padded_len(RECORD_SIZE) <= RECORD_BUFFER_SIZE);

/// A tag identifier
pub type TagUid = [u8; UID_SIZE];

/// Normalize a UID of any length to the cache's 7-byte form
///
/// Shorter UIDs (4-byte MIFARE Classic, for example) are zero padded and
/// longer input is truncated.
pub fn normalize_uid(raw: &[u8]) -> TagUid {
    let mut uid = [0u8; UID_SIZE];
    let len = raw.len().min(UID_SIZE);
    uid[..len].copy_from_slice(&raw[..len]);
    uid
}

/// Logical content of one cache slot
#[derive(Clone, Copy, PartialEq, Eq, BinRead, BinWrite)]
#[brw(little)]
pub struct TagRecord {
    /// Tag identifier
    pub uid: TagUid,
    /// Millisecond timestamp of the last successful use
    pub last_used: u32,
    /// Number of successful uses, enrollment included
    pub use_count: u16,
    /// Cleared records never grant access
    #[br(map = |raw: u8| raw != 0)]
    #[bw(map = |valid: &bool| u8::from(*valid))]
    pub valid: bool,
}

impl TagRecord {
    /// A freshly enrolled record
    pub const fn enrolled(uid: TagUid, now: u32) -> Self {
        Self {
            uid,
            last_used: now,
            use_count: 1,
            valid: true,
        }
    }

    /// Record a successful use
    pub fn touch(&mut self, now: u32) {
        self.last_used = now;
        self.use_count = self.use_count.saturating_add(1);
    }

    /// Serialize into a zero-padded slot buffer
    pub fn to_buffer(&self) -> CacheResult<[u8; RECORD_BUFFER_SIZE]> {
        let mut buffer = [0u8; RECORD_BUFFER_SIZE];
        self.write(&mut Cursor::new(&mut buffer[..]))?;
        Ok(buffer)
    }

    /// Parse the record at the start of a slot buffer
    ///
    /// Bytes past [`RECORD_SIZE`] are ignored.
    pub fn from_buffer(buffer: &[u8; RECORD_BUFFER_SIZE]) -> CacheResult<Self> {
        Ok(Self::read(&mut Cursor::new(&buffer[..]))?)
    }
}

impl Zeroize for TagRecord {
    fn zeroize(&mut self) {
        self.uid.zeroize();
        self.last_used.zeroize();
        self.use_count.zeroize();
        self.valid = false;
    }
}

// UIDs stay out of logs
impl std::fmt::Debug for TagRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TagRecord")
            .field("uid", &"[REDACTED]")
            .field("last_used", &self.last_used)
            .field("use_count", &self.use_count)
            .field("valid", &self.valid)
            .finish()
    }
}
