//! Fixed-capacity authenticated tag cache
//!
//! Each occupied slot carries its own IV; the slot key is derived from it,
//! so identical records never share ciphertext. Slots are scanned linearly
//! in index order and a slot whose MAC fails is skipped, never trusted.
//!
//! Persisted image:
//!
//! ```text
//! offset 0: magic (u16 LE, 0xABCD)
//! offset 2: occupied slot count (u8)
//! offset 3: reserved, written as 0
//! offset 4: slot 0 .. slot count-1, 48 bytes each
//! ```

use binrw::io::Cursor;
use binrw::{BinRead, BinWrite};
use tagvault_crypto::Key;
use tracing::{debug, info, warn};
use zeroize::Zeroize;

use crate::clock::{Clock, MonotonicClock};
use crate::config::{CacheConfig, EnrollPolicy};
use crate::error::{CacheError, CacheResult};
use crate::record::{TagRecord, TagUid};
use crate::slot::{EncryptedSlot, SLOT_SIZE};
use crate::stats::CacheStats;
use crate::store::PersistentStore;

/// Number of slots in the cache
pub const MAX_SLOTS: usize = 5;

/// Magic number at the start of a persisted image
pub const STORE_MAGIC: u16 = 0xABCD;

/// Size of the persisted header
pub const HEADER_SIZE: usize = 4;

/// Largest persisted image (header plus every slot)
pub const MAX_IMAGE_SIZE: usize = HEADER_SIZE + MAX_SLOTS * SLOT_SIZE;

#[derive(Debug, BinRead, BinWrite)]
#[brw(little)]
struct StoreHeader {
    magic: u16,
    count: u8,
    reserved: u8,
}

/// Result of [`SecureTagCache::enroll`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnrollOutcome {
    /// A valid record for the UID already exists; nothing was written
    AlreadyEnrolled {
        /// Slot holding the existing record
        slot: usize,
    },
    /// The record went into a free slot
    Inserted {
        /// Slot written
        slot: usize,
    },
    /// The least used record was overwritten
    Evicted {
        /// Slot written
        slot: usize,
        /// Use count of the record that was replaced
        use_count: u16,
    },
}

impl EnrollOutcome {
    /// Slot the UID now lives in
    pub const fn slot(&self) -> usize {
        match self {
            Self::AlreadyEnrolled { slot }
            | Self::Inserted { slot }
            | Self::Evicted { slot, .. } => *slot,
        }
    }

    /// Whether the cache contents changed
    pub const fn changed(&self) -> bool {
        !matches!(self, Self::AlreadyEnrolled { .. })
    }
}

/// Result of [`SecureTagCache::verify`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessDecision {
    /// A valid, authentic record matched the UID
    Granted,
    /// No slot accepted the UID
    Denied,
}

impl AccessDecision {
    /// Whether access was granted
    pub const fn is_granted(self) -> bool {
        matches!(self, Self::Granted)
    }
}

/// What one enrollment pass found
#[derive(Debug, Default)]
struct Survey {
    duplicate: Option<usize>,
    candidate: Option<(usize, u16)>,
}

/// Authenticated store of up to [`MAX_SLOTS`] tag records
///
/// The cache is single-owner: callers serialize `enroll`, `verify`,
/// `persist` and `restore` themselves.
pub struct SecureTagCache {
    /// Held and wiped on drop; slot keys derive from the IV alone
    master: Key,
    slots: [EncryptedSlot; MAX_SLOTS],
    count: usize,
    config: CacheConfig,
    clock: Box<dyn Clock>,
    stats: CacheStats,
}

impl SecureTagCache {
    /// Create an empty cache timestamping with a [`MonotonicClock`]
    pub fn new(master: Key, config: CacheConfig) -> Self {
        Self::with_clock(master, config, MonotonicClock::new())
    }

    /// Create an empty cache with a custom clock
    pub fn with_clock<C>(master: Key, config: CacheConfig, clock: C) -> Self
    where
        C: Clock + 'static,
    {
        Self {
            master,
            slots: [EncryptedSlot::empty(); MAX_SLOTS],
            count: 0,
            config,
            clock: Box::new(clock),
            stats: CacheStats::new(),
        }
    }

    /// Replace the master key; the old key is wiped
    ///
    /// Slot keys are derived from each slot's IV only, so this does not
    /// re-key existing slots and is not a key rotation.
    pub fn set_master_key(&mut self, key: Key) {
        self.master = key;
    }

    /// Enroll `uid`, evicting the least used record when full
    pub fn enroll(&mut self, uid: &TagUid) -> CacheResult<EnrollOutcome> {
        let duplicate_of = (self.config.enroll_policy == EnrollPolicy::Idempotent).then_some(uid);
        let survey = self.survey(duplicate_of, self.count >= MAX_SLOTS)?;
        if let Some(slot) = survey.duplicate {
            self.stats.duplicate_enrollments += 1;
            debug!(slot, "Tag already enrolled");
            return Ok(EnrollOutcome::AlreadyEnrolled { slot });
        }

        let mut record = TagRecord::enrolled(*uid, self.clock.now_millis());
        let sealed = EncryptedSlot::seal(&record);
        record.zeroize();
        let sealed = sealed?;

        let outcome = if self.count < MAX_SLOTS {
            let slot = self.count;
            self.slots[slot] = sealed;
            self.count += 1;
            info!(slot, "Enrolled tag");
            EnrollOutcome::Inserted { slot }
        } else {
            let (slot, use_count) = survey.candidate.ok_or(CacheError::CapacityExceeded)?;
            self.slots[slot] = sealed;
            self.stats.evictions += 1;
            info!(slot, evicted_use_count = use_count, "Enrolled tag by eviction");
            EnrollOutcome::Evicted { slot, use_count }
        };

        self.stats.enrollments += 1;
        Ok(outcome)
    }

    /// Check `uid` against the cache, updating usage on a grant
    ///
    /// Only a slot whose MAC verifies and whose record is valid can grant.
    /// The granting slot is re-encrypted under its existing IV.
    pub fn verify(&mut self, uid: &TagUid) -> CacheResult<AccessDecision> {
        for index in 0..self.count {
            let Some(mut record) = self.scan(index)? else {
                continue;
            };
            if !record.valid || record.uid != *uid {
                record.zeroize();
                continue;
            }

            record.touch(self.clock.now_millis());
            self.slots[index].reseal(&record)?;
            record.zeroize();

            self.stats.grants += 1;
            debug!(slot = index, "Access granted");
            return Ok(AccessDecision::Granted);
        }

        self.stats.denials += 1;
        debug!(scanned = self.count, "Access denied");
        Ok(AccessDecision::Denied)
    }

    /// Write the header and occupied slots to `store` in one write
    pub fn persist<S>(&self, store: &mut S) -> CacheResult<()>
    where
        S: PersistentStore + ?Sized,
    {
        let image = self.to_image()?;
        store.write(0, &image)?;
        info!(slots = self.count, bytes = image.len(), "Persisted tag cache");
        Ok(())
    }

    /// Load the cache from `store`
    ///
    /// Any failure leaves the cache empty and is returned once.
    pub fn restore<S>(&mut self, store: &S) -> CacheResult<()>
    where
        S: PersistentStore + ?Sized,
    {
        self.clear();
        let result = self.load(store);
        if let Err(err) = &result {
            self.clear();
            warn!(error = %err, "Restore failed, cache reset to empty");
        }
        result
    }

    /// Drop every record
    pub fn clear(&mut self) {
        for slot in &mut self.slots {
            slot.zeroize();
        }
        self.count = 0;
    }

    /// Number of occupied slots
    pub const fn len(&self) -> usize {
        self.count
    }

    /// Whether no slot is occupied
    pub const fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Maximum number of records
    pub const fn capacity(&self) -> usize {
        MAX_SLOTS
    }

    /// Occupied slots in index order
    pub fn slots(&self) -> &[EncryptedSlot] {
        &self.slots[..self.count]
    }

    /// Decrypt the record in slot `index` if its MAC verifies
    ///
    /// The record contains the UID; keep it out of logs and zeroize it
    /// when done.
    pub fn record(&self, index: usize) -> Option<TagRecord> {
        self.slots()
            .get(index)
            .and_then(|slot| slot.open().ok().flatten())
    }

    /// Statistics snapshot
    pub const fn stats(&self) -> CacheStats {
        self.stats
    }

    /// Active configuration
    pub const fn config(&self) -> &CacheConfig {
        &self.config
    }

    /// MAC-checked decrypt of one slot, counting integrity failures
    fn scan(&mut self, index: usize) -> CacheResult<Option<TagRecord>> {
        let record = self.slots[index].open()?;
        if record.is_none() {
            self.stats.integrity_failures += 1;
            debug!(slot = index, "Slot failed integrity check, skipping");
        }
        Ok(record)
    }

    /// One MAC-checked pass over the occupied slots
    ///
    /// Stops at the first valid record for `duplicate_of`. With `evict`,
    /// also tracks the slot with the lowest use count, lowest index on
    /// ties; unauthentic slots count as zero uses.
    fn survey(&mut self, duplicate_of: Option<&TagUid>, evict: bool) -> CacheResult<Survey> {
        let mut survey = Survey::default();
        if duplicate_of.is_none() && !evict {
            return Ok(survey);
        }

        for index in 0..self.count {
            let (matched, use_count) = match self.scan(index)? {
                Some(mut record) => {
                    let matched =
                        duplicate_of.is_some_and(|uid| record.valid && record.uid == *uid);
                    let use_count = record.use_count;
                    record.zeroize();
                    (matched, use_count)
                }
                None => (false, 0),
            };

            if matched {
                survey.duplicate = Some(index);
                return Ok(survey);
            }
            if evict && survey.candidate.is_none_or(|(_, lowest)| use_count < lowest) {
                survey.candidate = Some((index, use_count));
            }
        }
        Ok(survey)
    }

    fn to_image(&self) -> CacheResult<Vec<u8>> {
        let header = StoreHeader {
            magic: STORE_MAGIC,
            count: self.count as u8,
            reserved: 0,
        };

        let mut cursor = Cursor::new(Vec::with_capacity(HEADER_SIZE + self.count * SLOT_SIZE));
        header.write(&mut cursor)?;
        for slot in self.slots() {
            slot.write(&mut cursor)?;
        }
        Ok(cursor.into_inner())
    }

    fn load<S>(&mut self, store: &S) -> CacheResult<()>
    where
        S: PersistentStore + ?Sized,
    {
        let header_bytes = store.read(0, HEADER_SIZE)?;
        let header = StoreHeader::read(&mut Cursor::new(&header_bytes[..]))?;

        if header.magic != STORE_MAGIC {
            return Err(CacheError::InvalidMagic {
                expected: STORE_MAGIC,
                found: header.magic,
            });
        }

        let count = usize::from(header.count);
        if count > MAX_SLOTS {
            return Err(CacheError::SlotCountOutOfRange {
                count: header.count,
                max: MAX_SLOTS,
            });
        }

        let body = store.read(HEADER_SIZE, count * SLOT_SIZE)?;
        for (slot, chunk) in self.slots.iter_mut().zip(body.chunks_exact(SLOT_SIZE)) {
            *slot = EncryptedSlot::from_bytes(chunk)?;
        }
        self.count = count;

        info!(slots = count, "Restored tag cache");
        Ok(())
    }
}

impl std::fmt::Debug for SecureTagCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecureTagCache")
            .field("master", &self.master)
            .field("count", &self.count)
            .field("config", &self.config)
            .field("stats", &self.stats)
            .finish_non_exhaustive()
    }
}
