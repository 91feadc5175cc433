//! On-disk framing of compressed chunks.
//!
//! A frame is one complete gzip member whose header carries its own length:
//!
//! ```text
//! offset 0..4              : gzip ID1, ID2, CM, FLG
//! offset 4..8              : u32 LE compressed_len (replaces gzip MTIME)
//! ...                      : deflate data
//! offset len-8..len-4      : gzip CRC32
//! offset len-4..len        : gzip ISIZE, u32 LE raw_len
//! ```
//!
//! A reader positioned at a frame start learns `compressed_len` from a fixed
//! 8-byte read, so the next frame begins at `position + compressed_len`.
//! Boundaries are computed, never searched for: deflate output can contain
//! the gzip magic bytes, so scanning for them is ambiguous.
//!
//! Since only MTIME is rewritten, every frame is still a valid gzip member
//! and the concatenation is a valid multi-member gzip file.

use std::io::{Read, Seek, SeekFrom};

use bytes::Bytes;

use crate::error::BlockError;

/// Length of the fixed frame header.
pub const FRAME_HEADER_LEN: usize = 8;

/// Offset of the `compressed_len` field inside the header.
pub const LENGTH_FIELD_OFFSET: usize = 4;

/// Length of the raw-size trailer at the end of a frame.
pub const TRAILER_LEN: usize = 4;

/// Smallest well-formed frame: 10-byte gzip header plus 8-byte trailer.
pub const MIN_FRAME_LEN: usize = 18;

/// gzip ID1, ID2 and CM (deflate).
pub const GZIP_MAGIC: [u8; 3] = [0x1f, 0x8b, 0x08];

/// Sizes recovered from a frame's header and trailer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameHeader {
    /// Total frame length, header and trailer included.
    pub compressed_len: u32,
    /// Uncompressed length of the chunk.
    pub raw_len: u32,
}

/// One compressed chunk as written to disk.
///
/// Only built by [`encode`], [`Frame::from_payload`] or a frame reader, so
/// the payload always starts with a valid header whose length field equals
/// the payload size.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// Position of the chunk in the sequence.
    pub(crate) index: u64,

    /// The full frame bytes (gzip member with the length field stamped in).
    pub(crate) payload: Bytes,
}

impl Frame {
    /// Wraps bytes that already carry a frame header.
    ///
    /// Checks that the stamped length matches the buffer.
    pub fn from_payload(index: u64, payload: impl Into<Bytes>) -> Result<Self, BlockError> {
        let payload = payload.into();
        let header = parse_header(&payload, 0)?;
        if header.compressed_len as usize != payload.len() {
            return Err(BlockError::FrameFormat {
                position: 0,
                message: "frame length field does not match payload size",
            });
        }
        Ok(Self { index, payload })
    }

    /// Returns the position of the chunk in the sequence.
    pub fn index(&self) -> u64 {
        self.index
    }

    /// Returns the frame length, which equals its stamped length field.
    pub fn compressed_len(&self) -> usize {
        self.payload.len()
    }

    /// Returns the raw length recorded in the trailer.
    pub fn raw_len(&self) -> usize {
        read_u32_le(&self.payload[self.payload.len() - TRAILER_LEN..]) as usize
    }

    /// Returns the frame bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.payload
    }
}

/// Turns a compressed gzip member into a frame by stamping its length.
///
/// No other transformation is applied.
pub fn encode(index: u64, mut compressed: Vec<u8>) -> Result<Frame, BlockError> {
    if compressed.len() < MIN_FRAME_LEN {
        return Err(BlockError::FrameFormat {
            position: 0,
            message: "compressed chunk is shorter than a gzip member",
        });
    }

    let len = u32::try_from(compressed.len()).map_err(|_| BlockError::FrameFormat {
        position: 0,
        message: "compressed chunk exceeds 4 GiB",
    })?;

    compressed[LENGTH_FIELD_OFFSET..FRAME_HEADER_LEN].copy_from_slice(&len.to_le_bytes());

    Ok(Frame {
        index,
        payload: Bytes::from(compressed),
    })
}

/// Reads the header of the frame starting at `position`.
///
/// Performs two reads: the 8-byte header at `position`, then the 4-byte
/// raw-size trailer at `position + compressed_len - 4`. `stream_len` is the
/// total stream length; a frame claiming bytes past it is rejected.
///
/// Leaves the stream position unspecified.
pub fn decode_header<R: Read + Seek>(
    stream: &mut R,
    position: u64,
    stream_len: u64,
) -> Result<FrameHeader, BlockError> {
    let remaining = stream_len.saturating_sub(position);
    if remaining < FRAME_HEADER_LEN as u64 {
        return Err(BlockError::FrameFormat {
            position,
            message: "frame header extends past end of file",
        });
    }

    let mut header = [0u8; FRAME_HEADER_LEN];
    stream.seek(SeekFrom::Start(position))?;
    stream.read_exact(&mut header)?;

    let compressed_len = check_header(&header, position)?;
    if compressed_len as u64 > remaining {
        return Err(BlockError::FrameFormat {
            position,
            message: "frame length exceeds remaining file size",
        });
    }

    let mut trailer = [0u8; TRAILER_LEN];
    stream.seek(SeekFrom::Start(
        position + compressed_len as u64 - TRAILER_LEN as u64,
    ))?;
    stream.read_exact(&mut trailer)?;

    Ok(FrameHeader {
        compressed_len,
        raw_len: read_u32_le(&trailer),
    })
}

/// Parses the header of an in-memory frame starting at `buf[0]`.
///
/// `position` is only used for error reporting.
pub fn parse_header(buf: &[u8], position: u64) -> Result<FrameHeader, BlockError> {
    if buf.len() < FRAME_HEADER_LEN {
        return Err(BlockError::FrameFormat {
            position,
            message: "frame header extends past end of file",
        });
    }

    let compressed_len = check_header(&buf[..FRAME_HEADER_LEN], position)?;
    let end = compressed_len as usize;
    if end > buf.len() {
        return Err(BlockError::FrameFormat {
            position,
            message: "frame length exceeds remaining file size",
        });
    }

    Ok(FrameHeader {
        compressed_len,
        raw_len: read_u32_le(&buf[end - TRAILER_LEN..end]),
    })
}

/// Validates magic and length field, returning `compressed_len`.
fn check_header(header: &[u8], position: u64) -> Result<u32, BlockError> {
    if header[..GZIP_MAGIC.len()] != GZIP_MAGIC {
        return Err(BlockError::FrameFormat {
            position,
            message: "missing gzip magic",
        });
    }

    let compressed_len = read_u32_le(&header[LENGTH_FIELD_OFFSET..FRAME_HEADER_LEN]);
    if (compressed_len as usize) < MIN_FRAME_LEN {
        return Err(BlockError::FrameFormat {
            position,
            message: "frame length is shorter than a gzip member",
        });
    }

    Ok(compressed_len)
}

fn read_u32_le(bytes: &[u8]) -> u32 {
    let mut buf = [0u8; 4];
    buf.copy_from_slice(&bytes[..4]);
    u32::from_le_bytes(buf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::{ChunkCodec, GzipCodec};
    use std::io::Cursor;

    fn frame_for(index: u64, raw: &[u8]) -> Frame {
        encode(index, GzipCodec::default().compress(raw).unwrap()).unwrap()
    }

    #[test]
    fn test_encode_stamps_length() {
        let frame = frame_for(0, &[0x41; 10]);
        let len = frame.compressed_len() as u32;
        assert_eq!(&frame.payload[4..8], &len.to_le_bytes());
        assert_eq!(&frame.payload[..3], &GZIP_MAGIC);
        assert_eq!(frame.raw_len(), 10);
    }

    #[test]
    fn test_encode_rejects_short_payload() {
        let err = encode(0, vec![0x1f, 0x8b, 0x08, 0, 0, 0, 0, 0]).unwrap_err();
        assert!(matches!(err, BlockError::FrameFormat { .. }));
    }

    #[test]
    fn test_decode_header() {
        let frame = frame_for(0, b"some chunk bytes");
        let len = frame.compressed_len() as u64;
        let mut stream = Cursor::new(frame.payload.to_vec());

        let header = decode_header(&mut stream, 0, len).unwrap();
        assert_eq!(header.compressed_len as usize, frame.compressed_len());
        assert_eq!(header.raw_len, 16);
    }

    #[test]
    fn test_decode_header_second_frame() {
        let first = frame_for(0, &[1u8; 40]);
        let second = frame_for(1, &[2u8; 7]);
        let mut file = first.payload.to_vec();
        file.extend_from_slice(&second.payload);
        let total = file.len() as u64;
        let mut stream = Cursor::new(file);

        let h1 = decode_header(&mut stream, 0, total).unwrap();
        assert_eq!(h1.raw_len, 40);

        let h2 = decode_header(&mut stream, h1.compressed_len as u64, total).unwrap();
        assert_eq!(h2.raw_len, 7);
        assert_eq!(h1.compressed_len as u64 + h2.compressed_len as u64, total);
    }

    #[test]
    fn test_decode_header_truncated_header() {
        let mut stream = Cursor::new(vec![0x1f, 0x8b, 0x08, 0x00, 0x20]);
        let err = decode_header(&mut stream, 0, 5).unwrap_err();
        assert!(matches!(err, BlockError::FrameFormat { position: 0, .. }));
    }

    #[test]
    fn test_decode_header_truncated_payload() {
        let frame = frame_for(0, &[0x41; 10]);
        let mut bytes = frame.payload.to_vec();
        bytes.pop();
        let len = bytes.len() as u64;

        let err = decode_header(&mut Cursor::new(bytes), 0, len).unwrap_err();
        assert!(matches!(err, BlockError::FrameFormat { .. }));
    }

    #[test]
    fn test_decode_header_bad_magic() {
        let frame = frame_for(0, &[0x41; 10]);
        let mut bytes = frame.payload.to_vec();
        bytes[1] = 0x00;
        let len = bytes.len() as u64;

        let err = decode_header(&mut Cursor::new(bytes), 0, len).unwrap_err();
        assert!(matches!(
            err,
            BlockError::FrameFormat {
                message: "missing gzip magic",
                ..
            }
        ));
    }

    #[test]
    fn test_decode_header_length_too_small() {
        let mut bytes = vec![0u8; 32];
        bytes[..3].copy_from_slice(&GZIP_MAGIC);
        bytes[4..8].copy_from_slice(&4u32.to_le_bytes());

        let err = decode_header(&mut Cursor::new(bytes), 0, 32).unwrap_err();
        assert!(matches!(err, BlockError::FrameFormat { .. }));
    }

    #[test]
    fn test_parse_header_matches_decode_header() {
        let frame = frame_for(0, b"abcdefgh");
        let parsed = parse_header(&frame.payload, 0).unwrap();
        let len = frame.compressed_len() as u64;
        let decoded = decode_header(&mut Cursor::new(frame.payload.to_vec()), 0, len).unwrap();
        assert_eq!(parsed, decoded);
    }

    #[test]
    fn test_from_payload() {
        let frame = frame_for(5, b"payload");
        let rebuilt = Frame::from_payload(5, frame.payload.clone()).unwrap();
        assert_eq!(rebuilt, frame);

        let mut padded = frame.payload.to_vec();
        padded.push(0);
        assert!(Frame::from_payload(5, padded).is_err());
    }

    #[test]
    fn test_from_payload_rejects_short_buffers() {
        // Too short for a header, then a header claiming more than is there
        assert!(Frame::from_payload(0, vec![0x1f, 0x8b]).is_err());

        let mut header_only = vec![0u8; FRAME_HEADER_LEN];
        header_only[..3].copy_from_slice(&GZIP_MAGIC);
        header_only[4..8].copy_from_slice(&(MIN_FRAME_LEN as u32).to_le_bytes());
        assert!(matches!(
            Frame::from_payload(0, header_only),
            Err(BlockError::FrameFormat { .. })
        ));
    }

    #[test]
    fn test_accessors() {
        let frame = frame_for(7, b"abc");
        assert_eq!(frame.index(), 7);
        assert_eq!(frame.as_bytes().len(), frame.compressed_len());
        assert_eq!(frame.raw_len(), 3);
    }

    #[test]
    fn test_frame_is_valid_gzip() {
        use flate2::read::GzDecoder;

        let frame = frame_for(0, b"still gzip after stamping");
        let mut out = String::new();
        GzDecoder::new(frame.as_bytes())
            .read_to_string(&mut out)
            .unwrap();
        assert_eq!(out, "still gzip after stamping");
    }
}
