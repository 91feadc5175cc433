//! Frame slicing of a compressed stream.

use std::io::{Read, Seek, SeekFrom};

use bytes::Bytes;

use crate::error::BlockError;
use crate::frame::{Frame, decode_header};

/// An iterator over the frames of a compressed stream.
///
/// The cursor advances by exactly each frame's `compressed_len`; frames
/// are located arithmetically, never by scanning. Iteration ends cleanly
/// when the cursor lands on end-of-file and stops after the first error.
#[derive(Debug)]
pub struct FrameReader<R> {
    reader: R,
    cursor: u64,
    stream_len: u64,
    next_index: u64,
    finished: bool,
}

impl<R: Read + Seek> FrameReader<R> {
    /// Creates a frame reader starting at the reader's current position.
    pub fn new(mut reader: R) -> Result<Self, BlockError> {
        let cursor = reader.stream_position()?;
        let stream_len = reader.seek(SeekFrom::End(0))?;
        Ok(Self {
            reader,
            cursor,
            stream_len,
            next_index: 0,
            finished: false,
        })
    }

    /// Reads up to `max` frames.
    ///
    /// Returns an empty batch at end of stream.
    pub fn next_batch(&mut self, max: usize) -> Result<Vec<Frame>, BlockError> {
        let mut batch = Vec::with_capacity(max);
        while batch.len() < max {
            match self.next() {
                Some(frame) => batch.push(frame?),
                None => break,
            }
        }
        Ok(batch)
    }

    /// Returns the byte offset of the next frame.
    pub fn position(&self) -> u64 {
        self.cursor
    }

    /// Returns the total stream length.
    pub fn stream_len(&self) -> u64 {
        self.stream_len
    }

    fn read_frame(&mut self) -> Result<Frame, BlockError> {
        let header = decode_header(&mut self.reader, self.cursor, self.stream_len)?;

        let mut payload = vec![0u8; header.compressed_len as usize];
        self.reader.seek(SeekFrom::Start(self.cursor))?;
        self.reader.read_exact(&mut payload)?;

        let frame = Frame {
            index: self.next_index,
            payload: Bytes::from(payload),
        };
        self.cursor += header.compressed_len as u64;
        self.next_index += 1;
        Ok(frame)
    }
}

impl<R: Read + Seek> Iterator for FrameReader<R> {
    type Item = Result<Frame, BlockError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished || self.cursor >= self.stream_len {
            return None;
        }

        let result = self.read_frame();
        if result.is_err() {
            self.finished = true;
        }
        Some(result)
    }
}
