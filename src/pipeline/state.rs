//! Per-run pipeline bookkeeping.

use std::fmt;

/// Stage of a pipeline run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Nothing read yet.
    Idle,
    /// Filling a batch from the input cursor.
    ReadingBatch,
    /// One worker started per batch element.
    Dispatched,
    /// Waiting for every worker of the batch to finish.
    Joining,
    /// Writing batch results in chunk order.
    WritingBatch,
    /// Input exhausted and output flushed.
    Done,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Idle => "idle",
            Stage::ReadingBatch => "reading",
            Stage::Dispatched => "dispatched",
            Stage::Joining => "joining",
            Stage::WritingBatch => "writing",
            Stage::Done => "done",
        };
        f.write_str(name)
    }
}

/// Totals for one completed run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PipelineSummary {
    /// Chunks (or frames) processed.
    pub chunks: u64,
    /// Batches processed.
    pub batches: u64,
    /// Bytes consumed from the input.
    pub bytes_in: u64,
    /// Bytes written to the output.
    pub bytes_out: u64,
}

impl PipelineSummary {
    /// Output size as a fraction of input size (0 for empty input).
    pub fn ratio(&self) -> f64 {
        if self.bytes_in == 0 {
            0.0
        } else {
            self.bytes_out as f64 / self.bytes_in as f64
        }
    }
}

impl fmt::Display for PipelineSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} chunks in {} batches, {} -> {} bytes",
            self.chunks, self.batches, self.bytes_in, self.bytes_out
        )
    }
}

/// Cursor, counters and stage of a single run. Never outlives the call.
#[derive(Debug)]
pub(crate) struct RunState {
    direction: &'static str,
    stage: Stage,
    pub(crate) input_cursor: u64,
    pub(crate) next_chunk_index: u64,
    pub(crate) batches: u64,
    pub(crate) bytes_out: u64,
}

impl RunState {
    pub(crate) fn new(direction: &'static str) -> Self {
        Self {
            direction,
            stage: Stage::Idle,
            input_cursor: 0,
            next_chunk_index: 0,
            batches: 0,
            bytes_out: 0,
        }
    }

    pub(crate) fn enter(&mut self, stage: Stage) {
        log::trace!(
            "{} batch {}: {} -> {}",
            self.direction,
            self.batches,
            self.stage,
            stage
        );
        self.stage = stage;
    }

    pub(crate) fn finish_batch(&mut self, len: usize) {
        log::trace!(
            "{} batch {}: chunks {}..{} written, cursor at {}",
            self.direction,
            self.batches,
            self.next_chunk_index,
            self.next_chunk_index + len as u64,
            self.input_cursor
        );
        self.next_chunk_index += len as u64;
        self.batches += 1;
    }

    pub(crate) fn summary(&self) -> PipelineSummary {
        let summary = PipelineSummary {
            chunks: self.next_chunk_index,
            batches: self.batches,
            bytes_in: self.input_cursor,
            bytes_out: self.bytes_out,
        };
        log::debug!("{} finished: {}", self.direction, summary);
        summary
    }

    #[cfg(test)]
    pub(crate) fn stage(&self) -> Stage {
        self.stage
    }
}
