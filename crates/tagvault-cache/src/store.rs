//! Persistent byte store the cache is saved into
//!
//! The cache sees storage as a fixed-capacity linear array addressed by
//! offset, the way an EEPROM is. Calls are synchronous and durable on
//! return, with no retries. A failure is reported once.

use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use crate::error::StoreError;

/// Value of a never-written byte, as in erased EEPROM
pub const ERASED_BYTE: u8 = 0xFF;

/// Offset-addressed persistent storage
pub trait PersistentStore {
    /// Total addressable bytes
    fn capacity(&self) -> usize;

    /// Read `len` bytes starting at `offset`
    fn read(&self, offset: usize, len: usize) -> Result<Vec<u8>, StoreError>;

    /// Write `bytes` starting at `offset`
    fn write(&mut self, offset: usize, bytes: &[u8]) -> Result<(), StoreError>;
}

fn check_bounds(offset: usize, len: usize, capacity: usize) -> Result<(), StoreError> {
    match offset.checked_add(len) {
        Some(end) if end <= capacity => Ok(()),
        _ => Err(StoreError::OutOfBounds {
            offset,
            len,
            capacity,
        }),
    }
}

/// In-memory store, mainly for tests and simulation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoryStore {
    bytes: Vec<u8>,
}

impl MemoryStore {
    /// Store of `capacity` erased bytes
    pub fn new(capacity: usize) -> Self {
        Self {
            bytes: vec![ERASED_BYTE; capacity],
        }
    }

    /// Raw contents
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Raw contents, mutable (for fault injection)
    pub fn as_bytes_mut(&mut self) -> &mut [u8] {
        &mut self.bytes
    }
}

impl PersistentStore for MemoryStore {
    fn capacity(&self) -> usize {
        self.bytes.len()
    }

    fn read(&self, offset: usize, len: usize) -> Result<Vec<u8>, StoreError> {
        check_bounds(offset, len, self.bytes.len())?;
        Ok(self.bytes[offset..offset + len].to_vec())
    }

    fn write(&mut self, offset: usize, bytes: &[u8]) -> Result<(), StoreError> {
        check_bounds(offset, bytes.len(), self.bytes.len())?;
        self.bytes[offset..offset + bytes.len()].copy_from_slice(bytes);
        Ok(())
    }
}

/// Fixed-capacity store backed by a file
///
/// A missing file is created and filled with erased bytes. An existing
/// shorter file is extended the same way.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    file: File,
    capacity: usize,
}

impl FileStore {
    /// Open or create the backing file
    pub fn open<P: AsRef<Path>>(path: P, capacity: usize) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        let mut file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&path)?;

        let existing = usize::try_from(file.metadata()?.len()).unwrap_or(usize::MAX);
        if existing < capacity {
            file.seek(SeekFrom::Start(existing as u64))?;
            file.write_all(&vec![ERASED_BYTE; capacity - existing])?;
            file.sync_data()?;
        }

        Ok(Self {
            path,
            file,
            capacity,
        })
    }

    /// Path of the backing file
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl PersistentStore for FileStore {
    fn capacity(&self) -> usize {
        self.capacity
    }

    fn read(&self, offset: usize, len: usize) -> Result<Vec<u8>, StoreError> {
        check_bounds(offset, len, self.capacity)?;
        let mut file = &self.file;
        file.seek(SeekFrom::Start(offset as u64))?;
        let mut buf = vec![0u8; len];
        file.read_exact(&mut buf)?;
        Ok(buf)
    }

    fn write(&mut self, offset: usize, bytes: &[u8]) -> Result<(), StoreError> {
        check_bounds(offset, bytes.len(), self.capacity)?;
        self.file.seek(SeekFrom::Start(offset as u64))?;
        self.file.write_all(bytes)?;
        self.file.sync_data()?;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_memory_store_starts_erased() {
        let store = MemoryStore::new(16);
        assert_eq!(store.capacity(), 16);
        assert_eq!(store.read(0, 16).unwrap(), vec![ERASED_BYTE; 16]);
    }

    #[test]
    fn test_memory_store_read_write() {
        let mut store = MemoryStore::new(16);
        store.write(4, &[1, 2, 3]).unwrap();
        assert_eq!(store.read(3, 5).unwrap(), vec![0xFF, 1, 2, 3, 0xFF]);
    }

    #[test]
    fn test_memory_store_bounds() {
        let mut store = MemoryStore::new(16);
        assert!(matches!(
            store.write(15, &[0, 0]),
            Err(StoreError::OutOfBounds {
                offset: 15,
                len: 2,
                capacity: 16
            })
        ));
        assert!(store.read(16, 1).is_err());
        assert!(store.read(usize::MAX, 2).is_err());
        assert!(store.read(16, 0).is_ok());
    }

    #[test]
    fn test_file_store_creates_erased_file() {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let path = dir.path().join("eeprom.bin");

        let store = FileStore::open(&path, 64).unwrap();
        assert_eq!(store.path(), path.as_path());
        assert_eq!(std::fs::read(&path).unwrap(), vec![ERASED_BYTE; 64]);
        assert_eq!(store.read(60, 4).unwrap(), vec![ERASED_BYTE; 4]);
    }

    #[test]
    fn test_file_store_persists_across_reopen() {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let path = dir.path().join("eeprom.bin");

        {
            let mut store = FileStore::open(&path, 64).unwrap();
            store.write(10, b"tagvault").unwrap();
        }

        let store = FileStore::open(&path, 64).unwrap();
        assert_eq!(store.read(10, 8).unwrap(), b"tagvault".to_vec());
    }

    #[test]
    fn test_file_store_extends_short_file() {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let path = dir.path().join("eeprom.bin");
        std::fs::write(&path, [0xAB, 0xCD]).unwrap();

        let store = FileStore::open(&path, 8).unwrap();
        assert_eq!(
            store.read(0, 8).unwrap(),
            vec![0xAB, 0xCD, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF]
        );
        assert!(store.read(4, 8).is_err());
    }
}
