//! Read, verify or enroll, notify.
//!
//! The controller owns the cache, the transport key and an optional
//! persistent store. Every read that reaches `update` produces exactly one
//! outbound message: `nfc/access` when the local cache grants, otherwise
//! `nfc/verify` so the remote party can decide.

use tagvault_cache::{AccessDecision, EnrollOutcome, PersistentStore, SecureTagCache};
use tagvault_crypto::{CryptoEngine, Key, SecureMessage};
use tracing::{debug, info, warn};

use crate::error::AccessError;
use crate::reader::{Reader, TagRead};
use crate::transport::{TOPIC_ACCESS, TOPIC_VERIFY, Transport};

/// What one `update` did with a read
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccessOutcome {
    /// Local cache decision
    pub decision: AccessDecision,
    /// Topic the sealed read was published on
    pub topic: &'static str,
    /// Length of the UID as read
    pub uid_len: usize,
}

/// Orchestrates reader, cache and transport
pub struct AccessController<R, T> {
    reader: R,
    transport: T,
    cache: SecureTagCache,
    transport_engine: CryptoEngine,
    store: Option<Box<dyn PersistentStore>>,
    admin: bool,
}

impl<R, T> AccessController<R, T>
where
    R: Reader,
    T: Transport,
{
    /// Create a controller in normal (non-admin) mode
    pub fn new(cache: SecureTagCache, transport_key: Key, reader: R, transport: T) -> Self {
        Self {
            reader,
            transport,
            cache,
            transport_engine: CryptoEngine::new(transport_key),
            store: None,
            admin: false,
        }
    }

    /// Attach the store used by `restore`, `persist` and persist-on-change
    #[must_use]
    pub fn with_store(mut self, store: Box<dyn PersistentStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Enable or disable enrollment
    pub fn set_admin_mode(&mut self, enabled: bool) {
        self.admin = enabled;
        info!(enabled, "Admin mode changed");
    }

    /// Whether enrollment is enabled
    pub const fn is_admin(&self) -> bool {
        self.admin
    }

    /// Poll the reader once and verify any tag presented
    ///
    /// Returns `None` when no tag was read. Transport failures are logged
    /// and do not fail the call.
    pub fn update(&mut self) -> Result<Option<AccessOutcome>, AccessError> {
        let Some(read) = self.reader.try_read() else {
            return Ok(None);
        };

        let decision = self.cache.verify(&read.cache_uid())?;
        let topic = if decision.is_granted() {
            TOPIC_ACCESS
        } else {
            TOPIC_VERIFY
        };
        info!(
            uid_len = read.len(),
            granted = decision.is_granted(),
            "Tag read"
        );

        self.publish(topic, &read)?;

        Ok(Some(AccessOutcome {
            decision,
            topic,
            uid_len: read.len(),
        }))
    }

    /// In admin mode, poll the reader once and enroll the tag presented
    ///
    /// Returns `None` outside admin mode or when no tag was read. Once the
    /// enrollment is in the cache the outcome is returned; a failed
    /// persist-on-change write is logged and retried by the next `persist`.
    pub fn register_new_tag(&mut self) -> Result<Option<EnrollOutcome>, AccessError> {
        if !self.admin {
            debug!("Enrollment requested outside admin mode");
            return Ok(None);
        }
        let Some(read) = self.reader.try_read() else {
            return Ok(None);
        };

        let outcome = self.cache.enroll(&read.cache_uid())?;
        info!(
            uid_len = read.len(),
            slot = outcome.slot(),
            changed = outcome.changed(),
            "Tag registered"
        );

        if outcome.changed()
            && self.cache.config().persist_on_change
            && let Err(err) = self.persist()
        {
            warn!(slot = outcome.slot(), error = %err, "Persist after enrollment failed");
        }
        Ok(Some(outcome))
    }

    /// Load the cache from the attached store
    ///
    /// On failure the cache is empty and the error is returned once.
    pub fn restore(&mut self) -> Result<(), AccessError> {
        let store = self.store.as_deref().ok_or(AccessError::NoStore)?;
        self.cache.restore(store)?;
        Ok(())
    }

    /// Save the cache to the attached store
    pub fn persist(&mut self) -> Result<(), AccessError> {
        let store = self.store.as_deref_mut().ok_or(AccessError::NoStore)?;
        self.cache.persist(store)?;
        Ok(())
    }

    /// The cache
    pub const fn cache(&self) -> &SecureTagCache {
        &self.cache
    }

    /// The transport
    pub const fn transport(&self) -> &T {
        &self.transport
    }

    /// The transport, mutable
    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    /// Seal the UID bytes as read and hand them to the transport
    fn publish(&mut self, topic: &str, read: &TagRead) -> Result<(), AccessError> {
        let message = SecureMessage::seal(&self.transport_engine, read.as_bytes())?;
        let payload = message.to_hex();

        if let Err(err) = self.transport.send(topic, payload.as_bytes()) {
            warn!(topic, error = %err, "Transport send failed, message dropped");
        }
        Ok(())
    }
}

impl<R, T> std::fmt::Debug for AccessController<R, T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccessController")
            .field("cache", &self.cache)
            .field("transport_engine", &self.transport_engine)
            .field("has_store", &self.store.is_some())
            .field("admin", &self.admin)
            .finish_non_exhaustive()
    }
}
