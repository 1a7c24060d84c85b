//! Cache configuration structures

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CacheError;

/// What `enroll` does with a UID that is already cached
///
/// Deployed readers disagree here: some revisions check for an existing
/// entry, others always write a new one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EnrollPolicy {
    /// Return success without touching the cache if the UID is present
    #[default]
    Idempotent,
    /// Always insert (or evict and insert), even for a known UID
    AlwaysInsert,
}

impl fmt::Display for EnrollPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idempotent => write!(f, "idempotent"),
            Self::AlwaysInsert => write!(f, "always-insert"),
        }
    }
}

impl FromStr for EnrollPolicy {
    type Err = CacheError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "idempotent" => Ok(Self::Idempotent),
            "always-insert" | "always_insert" => Ok(Self::AlwaysInsert),
            other => Err(CacheError::InvalidConfiguration(format!(
                "unknown enroll policy '{other}' (expected 'idempotent' or 'always-insert')"
            ))),
        }
    }
}

/// Secure tag cache configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Duplicate enrollment handling
    pub enroll_policy: EnrollPolicy,
    /// Persist after every successful enrollment
    pub persist_on_change: bool,
}

impl CacheConfig {
    /// Create a new cache configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the enrollment policy
    pub fn with_enroll_policy(mut self, policy: EnrollPolicy) -> Self {
        self.enroll_policy = policy;
        self
    }

    /// Enable or disable persistence after each enrollment
    pub fn with_persist_on_change(mut self, enabled: bool) -> Self {
        self.persist_on_change = enabled;
        self
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = CacheConfig::new();
        assert_eq!(config.enroll_policy, EnrollPolicy::Idempotent);
        assert!(!config.persist_on_change);
    }

    #[test]
    fn test_builder() {
        let config = CacheConfig::new()
            .with_enroll_policy(EnrollPolicy::AlwaysInsert)
            .with_persist_on_change(true);
        assert_eq!(config.enroll_policy, EnrollPolicy::AlwaysInsert);
        assert!(config.persist_on_change);
    }

    #[test]
    fn test_policy_parse_and_display() {
        for policy in [EnrollPolicy::Idempotent, EnrollPolicy::AlwaysInsert] {
            assert_eq!(policy.to_string().parse::<EnrollPolicy>().unwrap(), policy);
        }
        assert_eq!(
            "ALWAYS_INSERT".parse::<EnrollPolicy>().unwrap(),
            EnrollPolicy::AlwaysInsert
        );
        assert!(matches!(
            "lru".parse::<EnrollPolicy>(),
            Err(CacheError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn test_serde_representation() {
        let config = CacheConfig::new().with_enroll_policy(EnrollPolicy::AlwaysInsert);
        let json = serde_json::to_string(&config).unwrap();
        assert_eq!(
            json,
            r#"{"enroll_policy":"always-insert","persist_on_change":false}"#
        );
        let parsed: CacheConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, config);
    }
}
