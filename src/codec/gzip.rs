//! gzip chunk codec backed by `flate2`.

use std::io::{self, Read, Write};

use flate2::bufread::GzDecoder;
use flate2::{Compression, GzBuilder};

use super::ChunkCodec;
use crate::error::BlockError;

/// gzip container overhead per member (10-byte header, 8-byte trailer).
const GZIP_OVERHEAD: usize = 18;

/// Deflate cannot expand input by more than this factor.
const MAX_DEFLATE_RATIO: usize = 1032;

/// A stateless gzip codec.
///
/// Output is deterministic: the header is written with mtime 0 and no
/// optional fields.
#[derive(Debug, Clone, Copy)]
pub struct GzipCodec {
    level: Compression,
}

impl GzipCodec {
    /// Creates a codec at the given compression level (0-9).
    pub fn new(level: u32) -> Self {
        Self {
            level: Compression::new(level),
        }
    }

    /// Returns the compression level.
    pub fn level(&self) -> u32 {
        self.level.level()
    }
}

impl Default for GzipCodec {
    fn default() -> Self {
        Self {
            level: Compression::default(),
        }
    }
}

impl ChunkCodec for GzipCodec {
    fn compress(&self, raw: &[u8]) -> Result<Vec<u8>, BlockError> {
        let out = Vec::with_capacity(raw.len() / 2 + GZIP_OVERHEAD);
        let mut encoder = GzBuilder::new().mtime(0).write(out, self.level);
        encoder.write_all(raw).map_err(BlockError::Codec)?;
        encoder.finish().map_err(BlockError::Codec)
    }

    fn decompress(
        &self,
        compressed: &[u8],
        expected_raw_len: usize,
    ) -> Result<Vec<u8>, BlockError> {
        // Exact for any real member; a forged trailer cannot force a huge
        // allocation.
        let capacity = expected_raw_len.min(compressed.len().saturating_mul(MAX_DEFLATE_RATIO));
        let mut out = Vec::with_capacity(capacity);

        // One byte past the expected length drives the decoder to the end of
        // the member so its CRC32/ISIZE check runs, and exposes overruns.
        let mut decoder = GzDecoder::new(compressed);
        (&mut decoder)
            .take(expected_raw_len as u64 + 1)
            .read_to_end(&mut out)
            .map_err(BlockError::Codec)?;

        // The member must fill the frame exactly, or a stretched length field
        // would swallow the next frame unnoticed.
        if !decoder.into_inner().is_empty() {
            return Err(BlockError::Codec(io::Error::new(
                io::ErrorKind::InvalidData,
                "trailing bytes after gzip member",
            )));
        }

        if out.len() < expected_raw_len {
            return Err(BlockError::TruncatedData {
                expected: expected_raw_len,
                actual: out.len(),
            });
        }

        if out.len() > expected_raw_len {
            return Err(BlockError::Codec(io::Error::new(
                io::ErrorKind::InvalidData,
                "chunk decompressed past its recorded length",
            )));
        }

        Ok(out)
    }
}
