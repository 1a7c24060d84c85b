//! Encrypted, authenticated cache slot
//!
//! Persisted layout, 48 bytes with no padding:
//!
//! ```text
//! [8 bytes: IV][32 bytes: TEA-ECB ciphertext][8 bytes: MAC]
//! key = digest(IV) || digest(IV)
//! MAC = digest(key || ciphertext)
//! ```
//!
//! The MAC covers the ciphertext only. A slot whose MAC does not verify is
//! untrusted no matter what it decrypts to.

use binrw::io::Cursor;
use binrw::{BinRead, BinWrite};
use tagvault_crypto::{CryptoEngine, IV_SIZE, MAC_SIZE, derive_slot_key, generate_iv};
use zeroize::{Zeroize, Zeroizing};

use crate::error::CacheResult;
use crate::record::{RECORD_BUFFER_SIZE, TagRecord};

/// Serialized size of an [`EncryptedSlot`]
pub const SLOT_SIZE: usize = IV_SIZE + RECORD_BUFFER_SIZE + MAC_SIZE;

/// One persisted cache entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, BinRead, BinWrite)]
#[brw(little)]
pub struct EncryptedSlot {
    /// Random IV, regenerated whenever a new record is written
    pub iv: [u8; IV_SIZE],
    /// Encrypted, zero-padded [`TagRecord`]
    pub ciphertext: [u8; RECORD_BUFFER_SIZE],
    /// MAC over `ciphertext` under the IV-derived key
    pub mac: [u8; MAC_SIZE],
}

impl Default for EncryptedSlot {
    fn default() -> Self {
        Self::empty()
    }
}

impl EncryptedSlot {
    /// An all-zero, unoccupied slot
    pub const fn empty() -> Self {
        Self {
            iv: [0u8; IV_SIZE],
            ciphertext: [0u8; RECORD_BUFFER_SIZE],
            mac: [0u8; MAC_SIZE],
        }
    }

    /// Encrypt `record` into a new slot under a fresh random IV
    pub fn seal(record: &TagRecord) -> CacheResult<Self> {
        Self::seal_with_iv(generate_iv(), record)
    }

    /// Encrypt `record` into a new slot under `iv`
    pub fn seal_with_iv(iv: [u8; IV_SIZE], record: &TagRecord) -> CacheResult<Self> {
        let mut slot = Self {
            iv,
            ..Self::empty()
        };
        slot.reseal(record)?;
        Ok(slot)
    }

    /// Re-encrypt `record` under the slot's existing IV and refresh the MAC
    pub fn reseal(&mut self, record: &TagRecord) -> CacheResult<()> {
        let engine = self.engine();
        let mut buffer = Zeroizing::new(record.to_buffer()?);
        engine.encrypt(&mut buffer[..])?;
        self.ciphertext = *buffer;
        self.mac = engine.generate_mac(&self.ciphertext);
        Ok(())
    }

    /// Recompute the MAC over the stored ciphertext and compare
    pub fn verify_integrity(&self) -> bool {
        self.engine().verify_mac(&self.ciphertext, &self.mac)
    }

    /// Decrypt without checking the MAC
    ///
    /// Decryption always produces bytes; only [`Self::verify_integrity`]
    /// says whether they can be trusted. Prefer [`Self::open`].
    pub fn decrypt(&self) -> CacheResult<TagRecord> {
        let mut buffer = Zeroizing::new(self.ciphertext);
        self.engine().decrypt(&mut buffer[..])?;
        TagRecord::from_buffer(&buffer)
    }

    /// Decrypt only if the MAC verifies
    pub fn open(&self) -> CacheResult<Option<TagRecord>> {
        if !self.verify_integrity() {
            return Ok(None);
        }
        self.decrypt().map(Some)
    }

    /// Serialize to the persisted 48-byte layout
    pub fn to_bytes(&self) -> CacheResult<[u8; SLOT_SIZE]> {
        let mut bytes = [0u8; SLOT_SIZE];
        self.write(&mut Cursor::new(&mut bytes[..]))?;
        Ok(bytes)
    }

    /// Parse the persisted 48-byte layout
    pub fn from_bytes(bytes: &[u8]) -> CacheResult<Self> {
        Ok(Self::read(&mut Cursor::new(bytes))?)
    }

    /// Engine keyed for this slot; the key is wiped when it drops
    fn engine(&self) -> CryptoEngine {
        CryptoEngine::new(derive_slot_key(&self.iv))
    }
}

impl Zeroize for EncryptedSlot {
    fn zeroize(&mut self) {
        self.iv.zeroize();
        self.ciphertext.zeroize();
        self.mac.zeroize();
    }
}
