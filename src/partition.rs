//! File partitioning
//!
//! A file is split into `partition_count` contiguous slices of
//! `ceil(len / partition_count)` bytes. The last partition may be short
//! and trailing partitions may be empty.

use std::fs;
use std::path::Path;

use crate::error::{Result, SonarError};

/// Default number of partitions when none is given
pub const DEFAULT_PARTITION_COUNT: usize = 4;

/// A file held in memory and viewed as partitions
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartitionedFile {
    data: Vec<u8>,
    partition_count: usize,
    partition_size: usize,
}

impl PartitionedFile {
    /// Read a file and split it
    ///
    /// # Errors
    /// * `InvalidArgument` - `partition_count` is zero
    /// * `FileReadError` - the file cannot be read
    pub fn open(path: &Path, partition_count: usize) -> Result<Self> {
        check_count(partition_count)?;
        let data = fs::read(path).map_err(|e| SonarError::FileReadError {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::from_bytes(data, partition_count)
    }

    pub fn from_bytes(data: Vec<u8>, partition_count: usize) -> Result<Self> {
        check_count(partition_count)?;
        let partition_size = data.len().div_ceil(partition_count);
        Ok(PartitionedFile {
            data,
            partition_count,
            partition_size,
        })
    }

    /// Bytes of one partition, `None` past the last index
    pub fn partition(&self, index: usize) -> Option<&[u8]> {
        if index >= self.partition_count {
            return None;
        }
        let start = (index * self.partition_size).min(self.data.len());
        let end = (start + self.partition_size).min(self.data.len());
        Some(&self.data[start..end])
    }

    pub fn partitions(&self) -> impl Iterator<Item = (usize, &[u8])> + '_ {
        (0..self.partition_count).filter_map(move |i| self.partition(i).map(|p| (i, p)))
    }

    pub fn partition_count(&self) -> usize {
        self.partition_count
    }

    pub fn partition_size(&self) -> usize {
        self.partition_size
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

fn check_count(partition_count: usize) -> Result<()> {
    if partition_count == 0 {
        return Err(SonarError::InvalidArgument {
            reason: "partition count must be at least 1".to_string(),
        });
    }
    Ok(())
}
