//! Lightweight cryptographic primitives for NFC tag access control
//!
//! This crate provides the small-block primitives the tag cache and the
//! transport channel are built on. They are reproduced bit-for-bit so that
//! state written by deployed readers stays readable.
//!
//! # Components
//!
//! - **Block cipher**: TEA, 64-bit block, 128-bit key, ECB over buffers
//! - **Digest**: 64-bit SipHash-style mixer used as MAC and key derivation
//! - **Engine**: one owned key bundling cipher, digest and MAC
//! - **Messages**: `IV || ciphertext || MAC` payloads for the transport
//!
//! None of this is a general-purpose cryptographic library. The MAC is 64
//! bits and the cipher mode is ECB; randomization comes from per-record and
//! per-message keys.
//!
//! # Examples
//!
//! ## Engine
//!
//! ```
//! use tagvault_crypto::{CryptoEngine, Key};
//!
//! let engine = CryptoEngine::new(Key::from_slice(&[0x42]));
//!
//! let mut data = *b"sixteen byte msg";
//! engine.encrypt(&mut data).expect("buffer is block aligned");
//! let mac = engine.generate_mac(&data);
//! assert!(engine.verify_mac(&data, &mac));
//!
//! engine.decrypt(&mut data).expect("buffer is block aligned");
//! assert_eq!(&data, b"sixteen byte msg");
//! ```
//!
//! ## Per-record keys
//!
//! ```
//! use tagvault_crypto::{derive_slot_key, generate_iv};
//!
//! let iv = generate_iv();
//! let key = derive_slot_key(&iv);
//! assert_eq!(key.as_bytes()[..8], key.as_bytes()[8..]);
//! ```

#![warn(missing_docs)]

pub mod digest;
pub mod engine;
pub mod error;
pub mod keys;
pub mod message;
pub mod padding;
pub mod tea;

pub use error::CryptoError;

// Re-export commonly used types
pub use digest::{DIGEST_SIZE, KeyedDigest, digest};
pub use engine::{CryptoEngine, MAC_SIZE, constant_time_eq};
pub use keys::{IV_SIZE, KEY_SIZE, Key, derive_slot_key, generate_iv};
pub use message::SecureMessage;
pub use padding::{pad_to_block, padded_len};
pub use tea::{BLOCK_SIZE, decrypt_block, encrypt_block};
