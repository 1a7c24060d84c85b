//! Cache statistics
//!
//! Counters only. Nothing here identifies a tag.

#![allow(clippy::cast_precision_loss)] // Ratios intentionally accept precision loss

use serde::Serialize;

/// Cache statistics snapshot
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    /// New records written by `enroll`
    pub enrollments: u64,
    /// `enroll` calls that found the UID already present
    pub duplicate_enrollments: u64,
    /// Records overwritten to make room
    pub evictions: u64,
    /// Verifications that granted access
    pub grants: u64,
    /// Verifications that denied access
    pub denials: u64,
    /// Slots skipped because their MAC did not verify, once per operation
    pub integrity_failures: u64,
}

impl CacheStats {
    /// Create empty statistics
    pub fn new() -> Self {
        Self::default()
    }

    /// Total verifications
    pub fn verifications(&self) -> u64 {
        self.grants + self.denials
    }

    /// Fraction of verifications that granted access (0.0 when none ran)
    pub fn grant_rate(&self) -> f64 {
        let total = self.verifications();
        if total == 0 {
            0.0
        } else {
            self.grants as f64 / total as f64
        }
    }
}
