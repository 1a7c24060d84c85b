//! Authenticated, encrypted cache of NFC tag records
//!
//! [`SecureTagCache`] keeps up to [`MAX_SLOTS`] [`TagRecord`]s. Every
//! record lives in an [`EncryptedSlot`] with its own random IV; the slot
//! key is derived from that IV and a MAC over the ciphertext gates every
//! use of the record.
//!
//! ```
//! use tagvault_cache::{CacheConfig, SecureTagCache};
//! use tagvault_crypto::Key;
//!
//! let mut cache = SecureTagCache::new(Key::from_slice(&[0x42]), CacheConfig::default());
//! let uid = [0x04, 0x1A, 0x2B, 0x3C, 0x4D, 0x5E, 0x6F];
//!
//! cache.enroll(&uid)?;
//! assert!(cache.verify(&uid)?.is_granted());
//! assert!(!cache.verify(&[0x11; 7])?.is_granted());
//! # Ok::<(), tagvault_cache::CacheError>(())
//! ```
//!
//! The cache is saved to and restored from any [`PersistentStore`]:
//!
//! ```
//! use tagvault_cache::{CacheConfig, MemoryStore, SecureTagCache};
//! use tagvault_crypto::Key;
//!
//! let mut store = MemoryStore::new(1024);
//! let mut cache = SecureTagCache::new(Key::zero(), CacheConfig::default());
//! cache.enroll(&[7; 7])?;
//! cache.persist(&mut store)?;
//!
//! let mut restored = SecureTagCache::new(Key::zero(), CacheConfig::default());
//! restored.restore(&store)?;
//! assert_eq!(restored.len(), 1);
//! # Ok::<(), tagvault_cache::CacheError>(())
//! ```

#![warn(missing_docs)]

pub mod cache;
pub mod clock;
pub mod config;
pub mod error;
pub mod record;
pub mod slot;
pub mod stats;
pub mod store;

pub use cache::{
    AccessDecision, EnrollOutcome, HEADER_SIZE, MAX_IMAGE_SIZE, MAX_SLOTS, STORE_MAGIC,
    SecureTagCache,
};
pub use clock::{Clock, MonotonicClock};
pub use config::{CacheConfig, EnrollPolicy};
pub use error::{CacheError, CacheResult, StoreError};
pub use record::{RECORD_BUFFER_SIZE, RECORD_SIZE, TagRecord, TagUid, UID_SIZE, normalize_uid};
pub use slot::{EncryptedSlot, SLOT_SIZE};
pub use stats::CacheStats;
pub use store::{ERASED_BYTE, FileStore, MemoryStore, PersistentStore};
