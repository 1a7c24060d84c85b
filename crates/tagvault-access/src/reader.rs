//! Tag reader contract and the simulated reader

use std::time::{Duration, Instant};

use tagvault_cache::{TagUid, normalize_uid};

/// Longest UID an ISO 14443-A tag reports (triple size)
pub const MAX_UID_LEN: usize = 10;

/// UIDs served by [`MockReader`], in rotation
pub const MOCK_TAGS: [TagUid; 2] = [
    [0x04, 0x1A, 0x2B, 0x3C, 0x4D, 0x5E, 0x6F],
    [0x11, 0x22, 0x33, 0x44, 0x55, 0x66, 0x77],
];

/// A UID as reported by the reader
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct TagRead {
    bytes: [u8; MAX_UID_LEN],
    len: usize,
}

impl TagRead {
    /// Wrap reader output; `None` when empty or longer than [`MAX_UID_LEN`]
    pub fn new(uid: &[u8]) -> Option<Self> {
        if uid.is_empty() || uid.len() > MAX_UID_LEN {
            return None;
        }
        let mut bytes = [0u8; MAX_UID_LEN];
        bytes[..uid.len()].copy_from_slice(uid);
        Some(Self {
            bytes,
            len: uid.len(),
        })
    }

    /// Bytes actually read
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes[..self.len]
    }

    /// Number of bytes read
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Always false; empty reads are rejected by [`TagRead::new`]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// UID in the cache's 7-byte form
    pub fn cache_uid(&self) -> TagUid {
        normalize_uid(self.as_bytes())
    }
}

impl std::fmt::Debug for TagRead {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TagRead")
            .field("uid", &"[REDACTED]")
            .field("len", &self.len)
            .finish()
    }
}

/// Source of tag reads
///
/// Non-blocking: returns `None` when no tag is in the field or the reader
/// is still inside its rate limit.
pub trait Reader {
    /// Poll the reader once
    fn try_read(&mut self) -> Option<TagRead>;
}

impl<R: Reader + ?Sized> Reader for Box<R> {
    fn try_read(&mut self) -> Option<TagRead> {
        (**self).try_read()
    }
}

/// Simulated reader alternating between [`MOCK_TAGS`]
///
/// The rotation advances before each read, so the first read returns the
/// second tag.
#[derive(Debug, Clone)]
pub struct MockReader {
    index: usize,
    last_read: Option<Instant>,
    min_interval: Duration,
}

impl MockReader {
    /// Reader enforcing the default 100 ms interval
    pub fn new() -> Self {
        Self::with_interval(Duration::from_millis(100))
    }

    /// Reader enforcing `min_interval` between successful reads
    pub const fn with_interval(min_interval: Duration) -> Self {
        Self {
            index: 0,
            last_read: None,
            min_interval,
        }
    }
}

impl Default for MockReader {
    fn default() -> Self {
        Self::new()
    }
}

impl Reader for MockReader {
    fn try_read(&mut self) -> Option<TagRead> {
        if let Some(last) = self.last_read
            && last.elapsed() < self.min_interval
        {
            return None;
        }

        self.index = (self.index + 1) % MOCK_TAGS.len();
        self.last_read = Some(Instant::now());
        TagRead::new(&MOCK_TAGS[self.index])
    }
}
