//! NFC tag access controller.
//!
//! Ties a tag [`Reader`] and a message [`Transport`] to the secure tag
//! cache. Every read is verified locally; the UID is then sealed under
//! the transport key and published so the remote party can log the
//! access or authenticate the tag itself.
//!
//! # Components
//!
//! - `config`: CLI and environment configuration
//! - `controller`: read, verify or enroll, notify
//! - `reader`: reader contract and the simulated [`MockReader`]
//! - `transport`: transport contract, [`LogTransport`] and [`MemoryTransport`]
//!
//! # Example
//!
//! ```
//! use std::time::Duration;
//! use tagvault_access::{AccessController, MemoryTransport, MockReader};
//! use tagvault_cache::{CacheConfig, SecureTagCache};
//! use tagvault_crypto::Key;
//!
//! let cache = SecureTagCache::new(Key::from_slice(&[0x42]), CacheConfig::default());
//! let mut controller = AccessController::new(
//!     cache,
//!     Key::from_hex("0123456789abcdef0123456789abcdef")?,
//!     MockReader::with_interval(Duration::ZERO),
//!     MemoryTransport::new(),
//! );
//!
//! let outcome = controller.update()?.expect("mock reader always has a tag");
//! assert!(!outcome.decision.is_granted());
//! assert_eq!(outcome.topic, "nfc/verify");
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

#![warn(missing_docs)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod config;
pub mod controller;
pub mod error;
pub mod reader;
pub mod transport;

pub use config::{AccessConfig, DEFAULT_MASTER_KEY, DEFAULT_TRANSPORT_KEY};
pub use controller::{AccessController, AccessOutcome};
pub use error::{AccessError, ConfigError, TransportError};
pub use reader::{MAX_UID_LEN, MOCK_TAGS, MockReader, Reader, TagRead};
pub use transport::{
    LogTransport, MemoryTransport, SentMessage, TOPIC_ACCESS, TOPIC_VERIFY, Transport,
};
