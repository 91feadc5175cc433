//! Parallel block pipeline.
//!
//! Reads a batch of up to W chunks (or frames), runs one scoped worker
//! thread per batch element, joins all of them, then writes the results in
//! ascending chunk index. The next batch is not read until the current one
//! has been written, so at most W chunks are in memory at once and output
//! order never depends on scheduling.
//!
//! ```text
//! Idle -> ReadingBatch -> Dispatched -> Joining -> WritingBatch -+-> ReadingBatch
//!                                                                +-> Done
//! ```
//!
//! Any worker failure fails the batch, and any batch failure ends the run.
//! Frames written by earlier batches stay in the output.
//!
//! # Example
//!
//! ```
//! use blockgz::{Pipeline, PipelineConfig};
//!
//! let pipeline = Pipeline::new(PipelineConfig::new(4, 2)?)?;
//! let compressed = pipeline.compress_bytes(&[0x41; 10])?;
//! assert_eq!(pipeline.decompress_bytes(&compressed)?, vec![0x41; 10]);
//! # Ok::<(), blockgz::BlockError>(())
//! ```

mod state;

use std::io::{Cursor, Read, Seek, Write};
use std::thread;

pub use state::{PipelineSummary, Stage};

use state::RunState;

use crate::chunk::Chunk;
use crate::codec::{ChunkCodec, GzipCodec};
use crate::config::PipelineConfig;
use crate::error::BlockError;
use crate::frame::{self, Frame};
use crate::reader::{ChunkReader, FrameReader};

/// Runs batched parallel compression and decompression.
///
/// The pipeline itself holds no per-run state and can be reused; each call
/// starts from a fresh cursor and chunk index.
#[derive(Debug, Clone)]
pub struct Pipeline<C = GzipCodec> {
    config: PipelineConfig,
    codec: C,
}

impl Pipeline<GzipCodec> {
    /// Creates a gzip pipeline at the configured compression level.
    pub fn new(config: PipelineConfig) -> Result<Self, BlockError> {
        Self::with_codec(config, GzipCodec::new(config.level()))
    }
}

impl Default for Pipeline<GzipCodec> {
    fn default() -> Self {
        let config = PipelineConfig::default();
        Self {
            config,
            codec: GzipCodec::new(config.level()),
        }
    }
}

impl<C: ChunkCodec> Pipeline<C> {
    /// Creates a pipeline around a custom chunk codec.
    pub fn with_codec(config: PipelineConfig, codec: C) -> Result<Self, BlockError> {
        config.validate()?;
        Ok(Self { config, codec })
    }

    /// Returns the pipeline configuration.
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Returns the chunk codec.
    pub fn codec(&self) -> &C {
        &self.codec
    }

    /// Compresses `input` into a sequence of frames written to `output`.
    ///
    /// Empty input produces empty output.
    pub fn compress<R: Read, W: Write>(
        &self,
        input: R,
        mut output: W,
    ) -> Result<PipelineSummary, BlockError> {
        let mut chunks = ChunkReader::new(input, self.config.max_chunk_size());
        let mut run = RunState::new("compress");

        loop {
            run.enter(Stage::ReadingBatch);
            let batch = chunks.next_batch(self.config.workers())?;
            if batch.is_empty() {
                break;
            }
            run.input_cursor = chunks.offset();

            let frames = self.run_batch(&mut run, &batch, |codec, chunk: &Chunk| {
                let compressed = codec.compress(&chunk.data)?;
                frame::encode(chunk.index, compressed)
            })?;

            run.enter(Stage::WritingBatch);
            for frame in &frames {
                output.write_all(frame.as_bytes())?;
                run.bytes_out += frame.compressed_len() as u64;
            }
            run.finish_batch(batch.len());
        }

        output.flush()?;
        run.enter(Stage::Done);
        Ok(run.summary())
    }

    /// Decompresses the frames of `input`, writing the original bytes to
    /// `output`.
    ///
    /// Reading starts at the current position of `input`.
    pub fn decompress<R: Read + Seek, W: Write>(
        &self,
        input: R,
        mut output: W,
    ) -> Result<PipelineSummary, BlockError> {
        let mut frames = FrameReader::new(input)?;
        let start = frames.position();
        let mut run = RunState::new("decompress");

        loop {
            run.enter(Stage::ReadingBatch);
            let batch = frames.next_batch(self.config.workers())?;
            if batch.is_empty() {
                break;
            }
            run.input_cursor = frames.position() - start;

            let chunks = self.run_batch(&mut run, &batch, |codec, frame: &Frame| {
                codec.decompress(frame.as_bytes(), frame.raw_len())
            })?;

            run.enter(Stage::WritingBatch);
            for raw in &chunks {
                output.write_all(raw)?;
                run.bytes_out += raw.len() as u64;
            }
            run.finish_batch(batch.len());
        }

        output.flush()?;
        run.enter(Stage::Done);
        Ok(run.summary())
    }

    /// Compresses an in-memory buffer.
    pub fn compress_bytes(&self, data: &[u8]) -> Result<Vec<u8>, BlockError> {
        let mut out = Vec::new();
        self.compress(data, &mut out)?;
        Ok(out)
    }

    /// Decompresses an in-memory buffer of frames.
    pub fn decompress_bytes(&self, data: &[u8]) -> Result<Vec<u8>, BlockError> {
        let mut out = Vec::new();
        self.decompress(Cursor::new(data), &mut out)?;
        Ok(out)
    }

    /// Runs `work` on every batch element concurrently, one thread each.
    ///
    /// Every worker is joined before any result is looked at. Results come
    /// back in batch order; the first failure in that order is returned.
    fn run_batch<T, U, F>(
        &self,
        run: &mut RunState,
        batch: &[T],
        work: F,
    ) -> Result<Vec<U>, BlockError>
    where
        T: Indexed + Sync,
        U: Send,
        F: Fn(&C, &T) -> Result<U, BlockError> + Sync,
    {
        run.enter(Stage::Dispatched);
        let codec = &self.codec;
        let work = &work;

        let results: Vec<Result<U, BlockError>> = thread::scope(|scope| {
            let handles: Vec<_> = batch
                .iter()
                .map(|item| scope.spawn(move || work(codec, item)))
                .collect();

            run.enter(Stage::Joining);
            handles
                .into_iter()
                .zip(batch)
                .map(|(handle, item)| {
                    handle.join().unwrap_or_else(|_| {
                        Err(BlockError::WorkerPanicked {
                            index: item.index(),
                        })
                    })
                })
                .collect()
        });

        for (result, item) in results.iter().zip(batch) {
            if let Err(e) = result {
                log::debug!("chunk {} failed: {}", item.index(), e);
            }
        }

        results.into_iter().collect()
    }
}

/// Items that carry their position in the chunk sequence.
trait Indexed {
    fn index(&self) -> u64;
}

impl Indexed for Chunk {
    fn index(&self) -> u64 {
        self.index
    }
}

impl Indexed for Frame {
    fn index(&self) -> u64 {
        Frame::index(self)
    }
}
