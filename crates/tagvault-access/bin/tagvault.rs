//! Tagvault binary entry point.
//!
//! This is a thin wrapper around the tagvault-access library that:
//! 1. Initializes logging
//! 2. Parses and validates configuration
//! 3. Restores the cache from the file-backed store
//! 4. Runs the configured number of reads against the simulated reader
//! 5. Persists the cache and reports statistics

use std::thread;

use anyhow::{Context, Result};
use tagvault_access::{AccessConfig, AccessController, LogTransport, MockReader};
use tagvault_cache::{FileStore, SecureTagCache};

fn main() -> Result<()> {
    // Initialize tracing subscriber for logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    tracing::info!("Tagvault starting...");

    let config = AccessConfig::from_args();
    config.validate()?;
    tracing::info!(
        "Configuration loaded: store={}, policy={}, admin={}, reads={}",
        config.store.display(),
        config.enroll_policy,
        config.admin,
        config.reads
    );

    let store = FileStore::open(&config.store, config.store_capacity)
        .with_context(|| format!("opening store {}", config.store.display()))?;
    let cache = SecureTagCache::new(config.master_key()?, config.cache_config());

    let mut controller = AccessController::new(
        cache,
        config.transport_key()?,
        MockReader::with_interval(config.read_interval()),
        LogTransport,
    )
    .with_store(Box::new(store));

    if let Err(err) = controller.restore() {
        tracing::warn!("Starting with an empty cache: {err}");
    }
    controller.set_admin_mode(config.admin);

    for _ in 0..config.reads {
        if controller.is_admin() {
            controller.register_new_tag()?;
        } else {
            controller.update()?;
        }
        thread::sleep(config.read_interval());
    }

    controller.persist().context("persisting cache")?;

    let stats = controller.cache().stats();
    tracing::info!(
        "Final stats: {} (grant rate {:.2})",
        serde_json::to_string(&stats)?,
        stats.grant_rate()
    );

    Ok(())
}
