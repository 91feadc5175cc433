//! blockgz
//!
//! Parallel block-oriented gzip compression for Rust.
//!
//! `blockgz` cuts a byte stream into fixed-size chunks, compresses batches
//! of them concurrently, and writes each one as a self-delimiting frame:
//!
//! - chunks are compressed independently, one scoped thread per chunk
//! - output order always equals input order, whatever the scheduling
//! - every frame records its own length, so decompression locates chunk
//!   boundaries arithmetically instead of scanning for them
//! - every frame is still a gzip member, so the output is a valid
//!   multi-member `.gz` file
//!
//! The crate intentionally:
//! - does NOT support random access into compressed output
//! - does NOT add checksums beyond gzip's own CRC32
//! - does NOT adapt chunk sizes to content
//!
//! # In memory
//!
//! ```
//! use blockgz::{Pipeline, PipelineConfig, BlockError};
//!
//! fn main() -> Result<(), BlockError> {
//!     let pipeline = Pipeline::new(PipelineConfig::new(4096, 4)?)?;
//!
//!     let data = b"hello hello hello hello".repeat(1000);
//!     let compressed = pipeline.compress_bytes(&data)?;
//!     assert_eq!(pipeline.decompress_bytes(&compressed)?, data);
//!     Ok(())
//! }
//! ```
//!
//! # Files
//!
//! ```no_run
//! use blockgz::{driver, PipelineConfig, BlockError};
//!
//! fn main() -> Result<(), BlockError> {
//!     // Writes data.bin.gz
//!     let packed = driver::compress_file("data.bin", "data.bin", PipelineConfig::default())?;
//!     driver::decompress_file(&packed, "data.out", PipelineConfig::default())?;
//!     Ok(())
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod chunk;
mod codec;
mod config;
mod error;
mod frame;
mod pipeline;
mod reader;

mod util; // internal I/O helpers

pub mod driver;

//
// Public surface
//

pub use chunk::Chunk;
pub use codec::{ChunkCodec, GzipCodec};
pub use config::{
    DEFAULT_LEVEL, MAX_CHUNK_SIZE_LIMIT, PAGE_SIZE, PipelineConfig, default_chunk_size,
};
pub use driver::Mode;
pub use error::BlockError;
pub use frame::{
    FRAME_HEADER_LEN, Frame, FrameHeader, MIN_FRAME_LEN, decode_header, encode, parse_header,
};
pub use pipeline::{Pipeline, PipelineSummary, Stage};
pub use reader::{ChunkReader, FrameReader, split_bytes};
