//! Fjall-backed storage for on-disk indexes.

use std::path::{Path, PathBuf};

use fjall::{Config, Keyspace, PartitionCreateOptions, PartitionHandle, PersistMode};

use crate::storage::{KvBackend, KvIter, StorageError, WriteBatch, WriteOp};

/// Name of the single partition holding counter, document and term keys.
const PARTITION: &str = "fts";

/// Storage backend persisting to a fjall keyspace on the local filesystem.
pub struct FjallBackend {
    keyspace: Keyspace,
    partition: PartitionHandle,
    path: PathBuf,
    sync_writes: bool,
}

impl FjallBackend {
    /// Open or create a keyspace at `path`.
    ///
    /// With `sync_writes`, every committed write is fsynced before returning;
    /// otherwise durability follows fjall's journal flushing.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::OpenError` if the directory or keyspace cannot
    /// be created.
    pub fn open(path: &Path, sync_writes: bool) -> Result<Self, StorageError> {
        std::fs::create_dir_all(path)
            .map_err(|e| StorageError::OpenError(format!("create dir {}: {e}", path.display())))?;

        let keyspace = Config::new(path)
            .open()
            .map_err(|e| StorageError::OpenError(format!("{}: {e}", path.display())))?;

        let partition = keyspace
            .open_partition(PARTITION, PartitionCreateOptions::default())
            .map_err(|e| StorageError::OpenError(format!("partition {PARTITION}: {e}")))?;

        Ok(Self {
            keyspace,
            partition,
            path: path.to_path_buf(),
            sync_writes,
        })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Start a batch that fsyncs as part of its commit when `sync_writes`
    /// is set, so a failed sync is reported before the writes are visible.
    fn batch(&self) -> fjall::Batch {
        self.keyspace
            .batch()
            .durability(self.sync_writes.then_some(PersistMode::SyncAll))
    }

    fn commit(batch: fjall::Batch) -> Result<(), StorageError> {
        batch
            .commit()
            .map_err(|e| StorageError::WriteError(e.to_string()))
    }
}

impl KvBackend for FjallBackend {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, StorageError> {
        self.partition
            .get(key)
            .map(|value| value.map(|v| v.to_vec()))
            .map_err(|e| StorageError::ReadError(e.to_string()))
    }

    fn put(&self, key: &[u8], value: &[u8]) -> Result<(), StorageError> {
        let mut batch = self.batch();
        batch.insert(&self.partition, key, value);
        Self::commit(batch)
    }

    fn delete(&self, key: &[u8]) -> Result<(), StorageError> {
        let mut batch = self.batch();
        batch.remove(&self.partition, key);
        Self::commit(batch)
    }

    fn write_batch(&self, batch: WriteBatch) -> Result<(), StorageError> {
        let mut fjall_batch = self.batch();
        for op in batch.into_ops() {
            match op {
                WriteOp::Put { key, value } => {
                    fjall_batch.insert(&self.partition, key, value);
                }
                WriteOp::Delete { key } => {
                    fjall_batch.remove(&self.partition, key);
                }
            }
        }
        Self::commit(fjall_batch)
    }

    fn iter(&self) -> Result<KvIter<'_>, StorageError> {
        let iter = self.partition.iter().map(|item| {
            item.map(|(key, value)| (key.to_vec(), value.to_vec()))
                .map_err(|e| StorageError::ReadError(e.to_string()))
        });
        Ok(Box::new(iter))
    }

    fn scan_prefix(&self, prefix: &[u8]) -> Result<KvIter<'_>, StorageError> {
        let iter = self.partition.prefix(prefix).map(|item| {
            item.map(|(key, value)| (key.to_vec(), value.to_vec()))
                .map_err(|e| StorageError::ReadError(e.to_string()))
        });
        Ok(Box::new(iter))
    }
}
