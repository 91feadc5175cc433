//! Configuration for the block pipeline.
//!
//! - [`PipelineConfig`] - Chunk size, worker parallelism and gzip level
//!
//! # Example
//!
//! ```
//! use blockgz::PipelineConfig;
//!
//! // Explicit sizing
//! let config = PipelineConfig::new(64 * 1024, 4)?;
//!
//! // Defaults derived from the host, with a custom level
//! let config = PipelineConfig::default().with_level(9);
//! # Ok::<(), blockgz::BlockError>(())
//! ```

use std::num::NonZeroUsize;

use crate::error::BlockError;

/// Memory page size the default chunk size is derived from.
pub const PAGE_SIZE: usize = 4096;

/// Lower bound on the derived default chunk size.
///
/// Each frame carries 18 bytes of gzip container overhead, so tiny chunks
/// only grow the output.
pub const MIN_DEFAULT_CHUNK_SIZE: usize = 64;

/// Largest accepted chunk size. The frame trailer stores the raw length as
/// a 32-bit integer.
pub const MAX_CHUNK_SIZE_LIMIT: usize = u32::MAX as usize;

/// Default gzip compression level.
pub const DEFAULT_LEVEL: u32 = 6;

/// Configuration for parallel block compression.
///
/// `workers` (W) is both the number of concurrent workers and the maximum
/// batch size. `max_chunk_size` (M) bounds every chunk except possibly the
/// last one of the input. Memory in flight is O(W × M).
///
/// Neither value is recorded in the compressed output: a file written with
/// one configuration decompresses under any other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PipelineConfig {
    max_chunk_size: usize,
    workers: usize,
    level: u32,
}

impl PipelineConfig {
    /// Creates a new configuration with the default compression level.
    ///
    /// Returns error if either value is zero or the chunk size does not fit
    /// in the frame trailer.
    pub fn new(max_chunk_size: usize, workers: usize) -> Result<Self, BlockError> {
        let config = Self {
            max_chunk_size,
            workers,
            level: DEFAULT_LEVEL,
        };
        config.validate()?;
        Ok(config)
    }

    /// Sets the maximum chunk size.
    pub fn with_max_chunk_size(mut self, size: usize) -> Self {
        self.max_chunk_size = size;
        self
    }

    /// Sets the number of workers per batch.
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    /// Sets the gzip compression level (0-9).
    pub fn with_level(mut self, level: u32) -> Self {
        self.level = level;
        self
    }

    /// Returns the maximum chunk size.
    pub fn max_chunk_size(&self) -> usize {
        self.max_chunk_size
    }

    /// Returns the number of workers per batch.
    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Returns the gzip compression level.
    pub fn level(&self) -> u32 {
        self.level
    }

    /// Validates the current configuration.
    pub fn validate(&self) -> Result<(), BlockError> {
        if self.max_chunk_size == 0 {
            return Err(BlockError::InvalidConfig {
                message: "max_chunk_size must be non-zero",
            });
        }

        if self.max_chunk_size > MAX_CHUNK_SIZE_LIMIT {
            return Err(BlockError::InvalidConfig {
                message: "max_chunk_size must fit in 32 bits",
            });
        }

        if self.workers == 0 {
            return Err(BlockError::InvalidConfig {
                message: "workers must be non-zero",
            });
        }

        if self.level > 9 {
            return Err(BlockError::InvalidConfig {
                message: "level must be between 0 and 9",
            });
        }

        Ok(())
    }
}

impl Default for PipelineConfig {
    /// W = hardware concurrency, M chosen so W chunks span about one page.
    fn default() -> Self {
        let workers = std::thread::available_parallelism()
            .map(NonZeroUsize::get)
            .unwrap_or(1);

        Self {
            max_chunk_size: default_chunk_size(workers),
            workers,
            level: DEFAULT_LEVEL,
        }
    }
}

/// Chunk size such that `workers` chunks together approximate one page.
pub fn default_chunk_size(workers: usize) -> usize {
    (PAGE_SIZE / workers.max(1)).max(MIN_DEFAULT_CHUNK_SIZE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pipeline_config_default() {
        let config = PipelineConfig::default();
        assert!(config.workers() >= 1);
        assert!(config.max_chunk_size() >= MIN_DEFAULT_CHUNK_SIZE);
        assert!(config.max_chunk_size() <= PAGE_SIZE);
        assert_eq!(config.level(), DEFAULT_LEVEL);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_default_chunk_size() {
        assert_eq!(default_chunk_size(1), 4096);
        assert_eq!(default_chunk_size(4), 1024);
        assert_eq!(default_chunk_size(128), MIN_DEFAULT_CHUNK_SIZE);
        assert_eq!(default_chunk_size(0), 4096);
    }

    #[test]
    fn test_pipeline_config_builder() {
        let config = PipelineConfig::default()
            .with_max_chunk_size(8192)
            .with_workers(3)
            .with_level(1);
        assert_eq!(config.max_chunk_size(), 8192);
        assert_eq!(config.workers(), 3);
        assert_eq!(config.level(), 1);
    }

    #[test]
    fn test_pipeline_config_valid() {
        let config = PipelineConfig::new(4, 2).unwrap();
        assert_eq!(config.max_chunk_size(), 4);
        assert_eq!(config.workers(), 2);
    }

    #[test]
    fn test_pipeline_config_invalid_zero() {
        assert!(PipelineConfig::new(0, 2).is_err());
        assert!(PipelineConfig::new(4096, 0).is_err());
    }

    #[test]
    fn test_pipeline_config_invalid_level() {
        let config = PipelineConfig::default().with_level(10);
        assert!(matches!(
            config.validate(),
            Err(BlockError::InvalidConfig { .. })
        ));
    }

    #[test]
    #[cfg(target_pointer_width = "64")]
    fn test_pipeline_config_chunk_too_large() {
        assert!(PipelineConfig::new(MAX_CHUNK_SIZE_LIMIT + 1, 1).is_err());
    }
}
