//! Error types for blockgz.

use std::fmt;
use std::path::PathBuf;

/// Errors that can occur while compressing or decompressing.
///
/// Every variant is fatal to the run: there is no chunk-level retry.
#[derive(Debug)]
pub enum BlockError {
    /// An I/O error occurred on the input or output handle.
    Io(std::io::Error),

    /// The input path does not exist.
    InputNotFound {
        /// The path that was looked up.
        path: PathBuf,
    },

    /// A frame header is unreadable or describes bytes past end-of-file.
    FrameFormat {
        /// Byte offset of the offending frame in the compressed stream.
        position: u64,
        /// What was wrong with it.
        message: &'static str,
    },

    /// The gzip codec rejected or failed on a chunk.
    Codec(std::io::Error),

    /// Decompression produced fewer bytes than the frame advertised.
    TruncatedData {
        /// Raw length recorded in the frame trailer.
        expected: usize,
        /// Bytes actually produced.
        actual: usize,
    },

    /// Invalid configuration parameter.
    InvalidConfig {
        /// Description of what was invalid.
        message: &'static str,
    },

    /// Unknown driver mode.
    InvalidMode {
        /// The mode string that was given.
        mode: String,
    },

    /// A worker thread panicked while processing a chunk.
    WorkerPanicked {
        /// Index of the chunk the worker was bound to.
        index: u64,
    },
}

impl fmt::Display for BlockError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BlockError::Io(e) => write!(f, "io error: {}", e),
            BlockError::InputNotFound { path } => {
                write!(f, "input file does not exist: {}", path.display())
            }
            BlockError::FrameFormat { position, message } => {
                write!(f, "malformed frame at byte {}: {}", position, message)
            }
            BlockError::Codec(e) => write!(f, "codec error: {}", e),
            BlockError::TruncatedData { expected, actual } => {
                write!(
                    f,
                    "truncated data: expected {} bytes, got {}",
                    expected, actual
                )
            }
            BlockError::InvalidConfig { message } => {
                write!(f, "invalid config: {}", message)
            }
            BlockError::InvalidMode { mode } => {
                write!(
                    f,
                    "invalid mode '{}' (expected 'compress' or 'decompress')",
                    mode
                )
            }
            BlockError::WorkerPanicked { index } => {
                write!(f, "worker for chunk {} panicked", index)
            }
        }
    }
}

impl std::error::Error for BlockError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            BlockError::Io(e) | BlockError::Codec(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for BlockError {
    fn from(e: std::io::Error) -> Self {
        BlockError::Io(e)
    }
}
