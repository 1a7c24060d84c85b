//! Millisecond timestamps for `last_used`

use std::time::Instant;

/// Source of 32-bit millisecond timestamps
///
/// Values wrap after roughly 49.7 days, like a microcontroller uptime
/// counter; they are only ever stored, never compared.
pub trait Clock {
    /// Current timestamp in milliseconds
    fn now_millis(&self) -> u32;
}

/// Milliseconds elapsed since the clock was created
#[derive(Debug, Clone, Copy)]
pub struct MonotonicClock {
    start: Instant,
}

impl MonotonicClock {
    /// Start counting from now
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MonotonicClock {
    fn now_millis(&self) -> u32 {
        // Truncation is the wrap-around
        self.start.elapsed().as_millis() as u32
    }
}

impl<F> Clock for F
where
    F: Fn() -> u32,
{
    fn now_millis(&self) -> u32 {
        self()
    }
}
