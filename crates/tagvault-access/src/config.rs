//! Controller configuration management.
//!
//! # Configuration Sources
//!
//! Configuration can be provided via:
//! - CLI arguments (`--store`, `--master-key`, etc.)
//! - Environment variables (`TAGVAULT_STORE`, `TAGVAULT_MASTER_KEY`, etc.)
//! - Default values, which match the reference reader deployment
//!
//! # Example
//!
//! ```no_run
//! use tagvault_access::AccessConfig;
//!
//! let config = AccessConfig::from_args();
//! config.validate().expect("Invalid configuration");
//!
//! println!("Store: {}", config.store.display());
//! println!("Admin mode: {}", config.admin);
//! ```

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use tagvault_cache::{CacheConfig, EnrollPolicy, MAX_IMAGE_SIZE};
use tagvault_crypto::Key;

use crate::error::ConfigError;

/// Default cache master key, `42 00 .. 00`
pub const DEFAULT_MASTER_KEY: &str = "42000000000000000000000000000000";

/// Default transport key
pub const DEFAULT_TRANSPORT_KEY: &str = "0123456789abcdef0123456789abcdef";

/// Controller configuration loaded from CLI args and environment variables.
#[derive(Clone, Parser)]
#[command(
    name = "tagvault",
    about = "Authenticated NFC tag access control with an encrypted local cache",
    version
)]
pub struct AccessConfig {
    /// Path of the file emulating the persistent store
    #[arg(long, env = "TAGVAULT_STORE", default_value = "./tagvault.eeprom")]
    pub store: PathBuf,

    /// Persistent store capacity in bytes
    #[arg(long, env = "TAGVAULT_STORE_CAPACITY", default_value_t = 1024)]
    pub store_capacity: usize,

    /// Cache master key (32 hex characters)
    #[arg(long, env = "TAGVAULT_MASTER_KEY", default_value = DEFAULT_MASTER_KEY, hide_default_value = true)]
    pub master_key: String,

    /// Transport key (32 hex characters)
    #[arg(long, env = "TAGVAULT_TRANSPORT_KEY", default_value = DEFAULT_TRANSPORT_KEY, hide_default_value = true)]
    pub transport_key: String,

    /// Duplicate enrollment policy: `idempotent` or `always-insert`
    #[arg(long, env = "TAGVAULT_ENROLL_POLICY", default_value = "idempotent")]
    pub enroll_policy: EnrollPolicy,

    /// Enroll presented tags instead of verifying them
    #[arg(long, env = "TAGVAULT_ADMIN")]
    pub admin: bool,

    /// Persist the cache after every enrollment
    #[arg(long, env = "TAGVAULT_PERSIST_ON_CHANGE")]
    pub persist_on_change: bool,

    /// Number of read attempts before exiting
    #[arg(long, env = "TAGVAULT_READS", default_value_t = 10)]
    pub reads: u32,

    /// Minimum interval between physical reads in milliseconds
    #[arg(long, env = "TAGVAULT_READ_INTERVAL_MS", default_value_t = 100)]
    pub read_interval_ms: u64,
}

impl AccessConfig {
    /// Parse configuration from command-line arguments.
    #[must_use]
    pub fn from_args() -> Self {
        Self::parse()
    }

    /// Decode the cache master key.
    pub fn master_key(&self) -> Result<Key, ConfigError> {
        Key::from_hex(&self.master_key).map_err(|source| ConfigError::InvalidKey {
            name: "master key",
            source,
        })
    }

    /// Decode the transport key.
    pub fn transport_key(&self) -> Result<Key, ConfigError> {
        Key::from_hex(&self.transport_key).map_err(|source| ConfigError::InvalidKey {
            name: "transport key",
            source,
        })
    }

    /// Cache settings derived from this configuration.
    #[must_use]
    pub const fn cache_config(&self) -> CacheConfig {
        CacheConfig {
            enroll_policy: self.enroll_policy,
            persist_on_change: self.persist_on_change,
        }
    }

    /// Minimum interval between reads.
    #[must_use]
    pub const fn read_interval(&self) -> Duration {
        Duration::from_millis(self.read_interval_ms)
    }

    /// Validate configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - Either key is not 32 hex characters
    /// - The store cannot hold a full cache image
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.master_key()?;
        self.transport_key()?;

        if self.store_capacity < MAX_IMAGE_SIZE {
            return Err(ConfigError::StoreTooSmall {
                capacity: self.store_capacity,
                required: MAX_IMAGE_SIZE,
            });
        }

        Ok(())
    }
}

// Keys stay out of logs
impl std::fmt::Debug for AccessConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccessConfig")
            .field("store", &self.store)
            .field("store_capacity", &self.store_capacity)
            .field("master_key", &"[REDACTED]")
            .field("transport_key", &"[REDACTED]")
            .field("enroll_policy", &self.enroll_policy)
            .field("admin", &self.admin)
            .field("persist_on_change", &self.persist_on_change)
            .field("reads", &self.reads)
            .field("read_interval_ms", &self.read_interval_ms)
            .finish()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> AccessConfig {
        AccessConfig::try_parse_from(std::iter::once("tagvault").chain(args.iter().copied()))
            .expect("arguments should parse")
    }

    #[test]
    fn test_defaults() {
        let config = parse(&[]);
        assert_eq!(config.store, PathBuf::from("./tagvault.eeprom"));
        assert_eq!(config.store_capacity, 1024);
        assert_eq!(config.enroll_policy, EnrollPolicy::Idempotent);
        assert!(!config.admin);
        assert_eq!(config.reads, 10);
        assert_eq!(config.read_interval(), Duration::from_millis(100));
        assert!(config.validate().is_ok());

        let mut expected = [0u8; 16];
        expected[0] = 0x42;
        assert_eq!(config.master_key().unwrap().as_bytes(), &expected);
    }

    #[test]
    fn test_cli_overrides() {
        let config = parse(&[
            "--admin",
            "--persist-on-change",
            "--enroll-policy",
            "always-insert",
            "--reads",
            "3",
            "--read-interval-ms",
            "0",
        ]);
        assert!(config.admin);
        assert_eq!(
            config.cache_config(),
            CacheConfig::new()
                .with_enroll_policy(EnrollPolicy::AlwaysInsert)
                .with_persist_on_change(true)
        );
        assert_eq!(config.reads, 3);
        assert_eq!(config.read_interval(), Duration::ZERO);
    }

    #[test]
    fn test_unknown_policy_rejected() {
        assert!(
            AccessConfig::try_parse_from(["tagvault", "--enroll-policy", "lru"]).is_err()
        );
    }

    #[test]
    fn test_validate_short_key() {
        let config = parse(&["--transport-key", "0123"]);
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidKey {
                name: "transport key",
                ..
            })
        ));
    }

    #[test]
    fn test_validate_store_capacity() {
        let config = parse(&["--store-capacity", "128"]);
        assert!(matches!(
            config.validate(),
            Err(ConfigError::StoreTooSmall {
                capacity: 128,
                required: MAX_IMAGE_SIZE
            })
        ));
    }

    #[test]
    fn test_debug_redacts_keys() {
        let rendered = format!("{:?}", parse(&[]));
        assert!(!rendered.contains(DEFAULT_TRANSPORT_KEY));
        assert!(!rendered.contains(DEFAULT_MASTER_KEY));
        assert!(rendered.contains("REDACTED"));
    }
}
