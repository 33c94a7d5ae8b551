//! Backend wrapper that injects storage failures in unit tests.

use std::sync::atomic::{AtomicBool, Ordering};

use crate::storage::memory::MemoryBackend;
use crate::storage::{KvBackend, KvIter, StorageError, WriteBatch};

/// A [`MemoryBackend`] whose writes and scans can be switched to fail.
///
/// A failed write leaves the wrapped backend untouched.
#[derive(Debug, Default)]
pub(crate) struct FailingBackend {
    inner: MemoryBackend,
    fail_writes: AtomicBool,
    fail_full_scans: AtomicBool,
    fail_prefix_scans: AtomicBool,
}

impl FailingBackend {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn inner(&self) -> &MemoryBackend {
        &self.inner
    }

    pub(crate) fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    pub(crate) fn fail_full_scans(&self, fail: bool) {
        self.fail_full_scans.store(fail, Ordering::SeqCst);
    }

    pub(crate) fn fail_prefix_scans(&self, fail: bool) {
        self.fail_prefix_scans.store(fail, Ordering::SeqCst);
    }

    fn check_write(&self) -> Result<(), StorageError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StorageError::WriteError("injected write failure".into()));
        }
        Ok(())
    }
}

impl KvBackend for FailingBackend {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, StorageError> {
        self.inner.get(key)
    }

    fn put(&self, key: &[u8], value: &[u8]) -> Result<(), StorageError> {
        self.check_write()?;
        self.inner.put(key, value)
    }

    fn delete(&self, key: &[u8]) -> Result<(), StorageError> {
        self.check_write()?;
        self.inner.delete(key)
    }

    fn write_batch(&self, batch: WriteBatch) -> Result<(), StorageError> {
        self.check_write()?;
        self.inner.write_batch(batch)
    }

    fn iter(&self) -> Result<KvIter<'_>, StorageError> {
        if self.fail_full_scans.load(Ordering::SeqCst) {
            return Err(StorageError::ReadError("injected scan failure".into()));
        }
        self.inner.iter()
    }

    fn scan_prefix(&self, prefix: &[u8]) -> Result<KvIter<'_>, StorageError> {
        if self.fail_prefix_scans.load(Ordering::SeqCst) {
            return Err(StorageError::ReadError("injected scan failure".into()));
        }
        self.inner.scan_prefix(prefix)
    }
}
