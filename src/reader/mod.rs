//! Batch sources for the pipeline.
//!
//! - [`ChunkReader`] - Fixed-size chunks from a raw [`std::io::Read`]
//! - [`FrameReader`] - Frames from a compressed [`std::io::Read`] + [`std::io::Seek`]
//! - [`split_bytes`] - Zero-copy chunking of an in-memory buffer

mod chunks;
mod frames;

pub use chunks::{ChunkReader, split_bytes};
pub use frames::FrameReader;
