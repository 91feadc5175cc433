//! Fixed-size segmentation of a raw byte stream.

use std::io::{self, Read};

use bytes::Bytes;

use crate::chunk::Chunk;
use crate::error::BlockError;
use crate::util::read_full;

/// An iterator that cuts a reader into fixed-size chunks.
///
/// Every chunk is exactly `max_chunk_size` bytes except the last, which
/// holds whatever remains. Empty input yields no chunks. Short reads from
/// the underlying source are retried, so chunk boundaries depend only on
/// the byte stream.
///
/// # Example
///
/// ```
/// use blockgz::ChunkReader;
/// use std::io::Cursor;
///
/// let data = [0x41u8; 10];
/// let sizes: Vec<usize> = ChunkReader::new(Cursor::new(&data[..]), 4)
///     .map(|c| c.map(|c| c.raw_len()))
///     .collect::<Result<_, _>>()?;
/// assert_eq!(sizes, vec![4, 4, 2]);
/// # Ok::<(), blockgz::BlockError>(())
/// ```
#[derive(Debug)]
pub struct ChunkReader<R> {
    reader: R,
    max_chunk_size: usize,
    offset: u64,
    next_index: u64,
    finished: bool,
}

impl<R: Read> ChunkReader<R> {
    /// Creates a new chunk reader.
    ///
    /// # Panics
    ///
    /// Panics if `max_chunk_size` is zero.
    pub fn new(reader: R, max_chunk_size: usize) -> Self {
        assert!(max_chunk_size > 0, "max_chunk_size must be non-zero");
        Self {
            reader,
            max_chunk_size,
            offset: 0,
            next_index: 0,
            finished: false,
        }
    }

    /// Reads up to `max` chunks.
    ///
    /// Returns an empty batch once the input is exhausted.
    pub fn next_batch(&mut self, max: usize) -> Result<Vec<Chunk>, BlockError> {
        let mut batch = Vec::with_capacity(max);
        while batch.len() < max {
            match self.next() {
                Some(chunk) => batch.push(chunk?),
                None => break,
            }
        }
        Ok(batch)
    }

    /// Returns the number of input bytes consumed so far.
    pub fn offset(&self) -> u64 {
        self.offset
    }

    /// Returns the index the next chunk will carry.
    pub fn next_index(&self) -> u64 {
        self.next_index
    }

    /// Fills one chunk buffer, marking the reader finished on a short fill.
    ///
    /// A short buffer is shrunk so a small tail does not pin a full
    /// `max_chunk_size` allocation while it waits in a batch.
    fn fill_buffer(&mut self) -> io::Result<Vec<u8>> {
        let mut buf = vec![0u8; self.max_chunk_size];
        let n = read_full(&mut self.reader, &mut buf)?;
        if n < self.max_chunk_size {
            self.finished = true;
            buf.truncate(n);
            buf.shrink_to_fit();
        }
        Ok(buf)
    }
}

impl<R: Read> Iterator for ChunkReader<R> {
    type Item = Result<Chunk, BlockError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        let buf = match self.fill_buffer() {
            Ok(buf) => buf,
            Err(e) => {
                self.finished = true;
                return Some(Err(e.into()));
            }
        };

        let n = buf.len();
        if n == 0 {
            return None;
        }

        let chunk = Chunk::new(self.next_index, self.offset, buf);
        self.next_index += 1;
        self.offset += n as u64;
        Some(Ok(chunk))
    }
}

/// Splits an in-memory buffer into fixed-size chunks without copying.
///
/// # Panics
///
/// Panics if `max_chunk_size` is zero.
///
/// # Example
///
/// ```
/// use blockgz::split_bytes;
///
/// let chunks = split_bytes(&b"hello world"[..], 4);
/// assert_eq!(chunks.len(), 3);
/// assert_eq!(chunks[2].offset, 8);
/// ```
pub fn split_bytes(data: impl Into<Bytes>, max_chunk_size: usize) -> Vec<Chunk> {
    assert!(max_chunk_size > 0, "max_chunk_size must be non-zero");
    let data = data.into();

    let mut chunks = Vec::with_capacity(data.len().div_ceil(max_chunk_size));
    let mut start = 0usize;
    while start < data.len() {
        let end = (start + max_chunk_size).min(data.len());
        chunks.push(Chunk::new(
            chunks.len() as u64,
            start as u64,
            data.slice(start..end),
        ));
        start = end;
    }
    chunks
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_empty_input() {
        let mut reader = ChunkReader::new(Cursor::new(Vec::<u8>::new()), 4);
        assert!(reader.next().is_none());
        assert!(reader.next().is_none());
        assert!(split_bytes(Bytes::new(), 4).is_empty());
    }

    #[test]
    fn test_sizes_and_offsets() {
        let data: Vec<u8> = (0..10).collect();
        let chunks: Vec<_> = ChunkReader::new(Cursor::new(&data), 4)
            .collect::<Result<Vec<_>, _>>()
            .unwrap();

        assert_eq!(chunks.len(), 3);
        assert_eq!(
            chunks.iter().map(|c| c.raw_len()).collect::<Vec<_>>(),
            vec![4, 4, 2]
        );
        assert_eq!(
            chunks.iter().map(|c| c.offset).collect::<Vec<_>>(),
            vec![0, 4, 8]
        );
        assert_eq!(
            chunks.iter().map(|c| c.index).collect::<Vec<_>>(),
            vec![0, 1, 2]
        );
        assert_eq!(&chunks[2].data[..], &[8, 9]);
    }

    #[test]
    fn test_exact_multiple_has_no_empty_tail() {
        let data = vec![7u8; 8];
        let chunks: Vec<_> = ChunkReader::new(Cursor::new(&data), 4)
            .collect::<Result<Vec<_>, _>>()
            .unwrap();
        assert_eq!(chunks.len(), 2);
        assert!(chunks.iter().all(|c| !c.is_empty()));
    }

    #[test]
    fn test_next_batch() {
        let data = vec![1u8; 10];
        let mut reader = ChunkReader::new(Cursor::new(&data), 4);

        let batch = reader.next_batch(2).unwrap();
        assert_eq!(batch.len(), 2);
        assert_eq!(reader.offset(), 8);
        assert_eq!(reader.next_index(), 2);

        let batch = reader.next_batch(2).unwrap();
        assert_eq!(batch.len(), 1);
        assert_eq!(batch[0].index, 2);

        assert!(reader.next_batch(2).unwrap().is_empty());
    }

    #[test]
    fn test_short_tail_releases_spare_capacity() {
        let data = vec![3u8; 4096 + 10];
        let mut reader = ChunkReader::new(Cursor::new(&data), 4096);

        let full = reader.fill_buffer().unwrap();
        assert_eq!(full.len(), 4096);
        assert!(!reader.finished);

        let tail = reader.fill_buffer().unwrap();
        assert_eq!(tail.len(), 10);
        assert!(
            tail.capacity() < 4096,
            "tail kept {} bytes of capacity",
            tail.capacity()
        );
        assert!(reader.finished);
    }

    #[test]
    fn test_split_bytes_matches_reader() {
        let data: Vec<u8> = (0..1000).map(|i| (i % 251) as u8).collect();
        let from_reader: Vec<_> = ChunkReader::new(Cursor::new(&data), 64)
            .collect::<Result<Vec<_>, _>>()
            .unwrap();
        let from_bytes = split_bytes(data, 64);
        assert_eq!(from_reader, from_bytes);
    }

    #[test]
    fn test_io_error_stops_iteration() {
        struct Broken;
        impl Read for Broken {
            fn read(&mut self, _: &mut [u8]) -> std::io::Result<usize> {
                Err(std::io::Error::other("disk on fire"))
            }
        }

        let mut reader = ChunkReader::new(Broken, 4);
        assert!(matches!(reader.next(), Some(Err(BlockError::Io(_)))));
        assert!(reader.next().is_none());
    }
}
