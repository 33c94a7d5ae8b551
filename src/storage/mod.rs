//! Key-value backend trait and implementations.
//!
//! This module provides an abstraction over an ordered, byte-keyed store,
//! allowing kvsearch to run against different engines (an on-disk fjall
//! keyspace, an in-memory map for tests, etc.). Every mutation the search
//! engine performs goes through [`KvBackend::write_batch`], so a backend must
//! apply a batch atomically.

#[cfg(test)]
pub(crate) mod failing;
pub mod fjall;
pub mod memory;

/// Errors that can occur during storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Failed to open store: {0}")]
    OpenError(String),

    #[error("Failed to read: {0}")]
    ReadError(String),

    #[error("Failed to write: {0}")]
    WriteError(String),
}

/// A single mutation inside a [`WriteBatch`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteOp {
    Put { key: Vec<u8>, value: Vec<u8> },
    Delete { key: Vec<u8> },
}

impl WriteOp {
    #[must_use]
    pub fn key(&self) -> &[u8] {
        match self {
            Self::Put { key, .. } | Self::Delete { key } => key,
        }
    }
}

/// An ordered list of mutations committed as one unit.
#[derive(Debug, Clone, Default)]
pub struct WriteBatch {
    ops: Vec<WriteOp>,
}

impl WriteBatch {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn put(&mut self, key: impl Into<Vec<u8>>, value: impl Into<Vec<u8>>) {
        self.ops.push(WriteOp::Put {
            key: key.into(),
            value: value.into(),
        });
    }

    pub fn delete(&mut self, key: impl Into<Vec<u8>>) {
        self.ops.push(WriteOp::Delete { key: key.into() });
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.ops.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    #[must_use]
    pub fn ops(&self) -> &[WriteOp] {
        &self.ops
    }

    #[must_use]
    pub fn into_ops(self) -> Vec<WriteOp> {
        self.ops
    }
}

/// A key-value pair yielded by [`KvBackend::iter`].
pub type KvPair = (Vec<u8>, Vec<u8>);

/// Iterator over every entry of a backend, in ascending key order.
pub type KvIter<'a> = Box<dyn Iterator<Item = Result<KvPair, StorageError>> + 'a>;

/// Trait for ordered key-value backends (fjall, in-memory, etc.).
pub trait KvBackend: Send + Sync {
    /// Read the value stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the underlying store cannot be read.
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, StorageError>;

    /// Store `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the write fails.
    fn put(&self, key: &[u8], value: &[u8]) -> Result<(), StorageError>;

    /// Remove `key`. Removing an absent key is not an error.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the write fails.
    fn delete(&self, key: &[u8]) -> Result<(), StorageError>;

    /// Apply every operation of `batch` atomically, in order.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the batch cannot be committed. In that case
    /// none of its operations are visible.
    fn write_batch(&self, batch: WriteBatch) -> Result<(), StorageError>;

    /// Iterate over all entries in ascending key order.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the iterator cannot be created. Individual
    /// items may also carry read errors.
    fn iter(&self) -> Result<KvIter<'_>, StorageError>;

    /// Iterate over entries whose key starts with `prefix`, in ascending key
    /// order. Entries outside the prefix are never read.
    ///
    /// # Errors
    ///
    /// Same as [`KvBackend::iter`].
    fn scan_prefix(&self, prefix: &[u8]) -> Result<KvIter<'_>, StorageError>;
}
