//! Transfer tuning for the object storage client

use super::error::{StorageError, StorageResult};
use serde::{Deserialize, Serialize};

/// Transfer settings shared by every upload and download
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransferConfig {
    /// Size of each multipart part; files no larger than this go up in one request
    pub part_size: usize,

    /// Bytes read from the local file per chunk
    pub read_buffer_size: usize,

    /// Number of chunks the pass-through pipe buffers before the reader waits
    pub pipe_depth: usize,

    /// Per-operation timeout in seconds
    pub timeout_seconds: u64,
}

impl TransferConfig {
    /// Validate the configuration
    pub fn validate(&self) -> StorageResult<()> {
        if self.part_size < super::MIN_PART_SIZE {
            return Err(StorageError::InvalidConfig(format!(
                "Part size {} is below minimum {}",
                self.part_size,
                super::MIN_PART_SIZE
            )));
        }

        if self.part_size > super::MAX_PART_SIZE {
            return Err(StorageError::InvalidConfig(format!(
                "Part size {} exceeds maximum {}",
                self.part_size,
                super::MAX_PART_SIZE
            )));
        }

        if self.read_buffer_size == 0 {
            return Err(StorageError::InvalidConfig(
                "Read buffer size must be at least 1 byte".to_string(),
            ));
        }

        if self.pipe_depth == 0 {
            return Err(StorageError::InvalidConfig(
                "Pass-through pipe depth must be at least 1".to_string(),
            ));
        }

        if self.timeout_seconds == 0 {
            return Err(StorageError::InvalidConfig(
                "Timeout must be at least 1 second".to_string(),
            ));
        }

        Ok(())
    }
}

impl Default for TransferConfig {
    fn default() -> Self {
        Self {
            part_size: super::DEFAULT_PART_SIZE,
            read_buffer_size: super::DEFAULT_READ_BUFFER_SIZE,
            pipe_depth: super::DEFAULT_PIPE_DEPTH,
            timeout_seconds: 300,
        }
    }
}
