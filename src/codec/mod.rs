//! Per-chunk compression codecs.
//!
//! The pipeline treats the codec as a black box behind [`ChunkCodec`]:
//! one call per chunk, no state shared between calls.
//!
//! - [`ChunkCodec`] - Single-chunk compress/decompress contract
//! - [`GzipCodec`] - gzip container via `flate2`

mod gzip;

pub use gzip::GzipCodec;

use crate::error::BlockError;

/// Compresses and decompresses a single chunk.
///
/// Implementations must be safe to call concurrently from independent
/// workers on disjoint inputs.
pub trait ChunkCodec: Send + Sync {
    /// Compresses one chunk of raw bytes.
    ///
    /// The returned payload must be a complete gzip member: the frame layer
    /// rewrites bytes 4..8 of it and reads the raw length from its last
    /// four bytes.
    fn compress(&self, raw: &[u8]) -> Result<Vec<u8>, BlockError>;

    /// Decompresses one chunk into a buffer of exactly `expected_raw_len`
    /// bytes.
    ///
    /// Producing fewer bytes than expected is [`BlockError::TruncatedData`].
    fn decompress(&self, compressed: &[u8], expected_raw_len: usize)
    -> Result<Vec<u8>, BlockError>;
}
