//! The Chunk type - a fixed-size slice of the original stream.

use bytes::Bytes;
use std::fmt;

/// A contiguous slice of uncompressed input.
///
/// `index` decides output order; `offset` is informational.
///
/// # Example
///
/// ```
/// use blockgz::Chunk;
/// use bytes::Bytes;
///
/// let chunk = Chunk {
///     index: 0,
///     offset: 0,
///     data: Bytes::from_static(b"hello world"),
/// };
///
/// assert_eq!(chunk.raw_len(), 11);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    /// 0-based position in the chunk sequence.
    pub index: u64,

    /// Byte offset of the chunk in the original stream.
    pub offset: u64,

    /// The raw chunk bytes.
    pub data: Bytes,
}

impl Chunk {
    /// Creates a new chunk.
    pub fn new(index: u64, offset: u64, data: impl Into<Bytes>) -> Self {
        Self {
            index,
            offset,
            data: data.into(),
        }
    }

    /// Returns the number of original bytes this chunk represents.
    pub fn raw_len(&self) -> usize {
        self.data.len()
    }

    /// Returns true if the chunk has no data.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Returns the end offset (exclusive).
    pub fn end(&self) -> u64 {
        self.offset + self.data.len() as u64
    }

    /// Returns the chunk as a range of the original stream.
    pub fn range(&self) -> std::ops::Range<u64> {
        self.offset..self.end()
    }

    /// Consumes the chunk and returns the underlying data.
    pub fn into_data(self) -> Bytes {
        self.data
    }
}

impl fmt::Display for Chunk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Chunk#{}({} bytes @ {})",
            self.index,
            self.raw_len(),
            self.offset
        )
    }
}
