//! File-level driver around the pipeline.
//!
//! Owns the file handles: checks the input exists, replaces any existing
//! output, and runs the pipeline in the requested [`Mode`].
//!
//! # Example
//!
//! ```no_run
//! use blockgz::{Mode, PipelineConfig, driver};
//!
//! let written = driver::run(Mode::Compress, "data.bin", "data.bin", PipelineConfig::default())?;
//! assert_eq!(written.to_str(), Some("data.bin.gz"));
//! # Ok::<(), blockgz::BlockError>(())
//! ```

use std::ffi::OsString;
use std::fmt;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::config::PipelineConfig;
use crate::error::BlockError;
use crate::pipeline::{Pipeline, PipelineSummary};

/// Suffix appended to the output name when compressing.
pub const COMPRESSED_SUFFIX: &str = ".gz";

/// Direction of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Raw input to framed output.
    Compress,
    /// Framed input to raw output.
    Decompress,
}

impl FromStr for Mode {
    type Err = BlockError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "compress" => Ok(Mode::Compress),
            "decompress" => Ok(Mode::Decompress),
            other => Err(BlockError::InvalidMode {
                mode: other.to_string(),
            }),
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Compress => f.write_str("compress"),
            Mode::Decompress => f.write_str("decompress"),
        }
    }
}

/// Runs `mode` from `input` to `output`, returning the path written.
pub fn run(
    mode: Mode,
    input: impl AsRef<Path>,
    output: impl AsRef<Path>,
    config: PipelineConfig,
) -> Result<PathBuf, BlockError> {
    match mode {
        Mode::Compress => compress_file(input, output, config),
        Mode::Decompress => decompress_file(input, output, config),
    }
}

/// Compresses `input` into `output` with [`COMPRESSED_SUFFIX`] appended.
pub fn compress_file(
    input: impl AsRef<Path>,
    output: impl AsRef<Path>,
    config: PipelineConfig,
) -> Result<PathBuf, BlockError> {
    let output = compressed_path(output.as_ref());
    let pipeline = Pipeline::new(config)?;

    let (reader, writer) = open_pair(input.as_ref(), &output)?;
    log::info!(
        "compressing {} -> {}",
        input.as_ref().display(),
        output.display()
    );
    let summary = pipeline.compress(BufReader::new(reader), BufWriter::new(writer))?;
    report(Mode::Compress, &summary);
    Ok(output)
}

/// Decompresses `input` into exactly `output`.
pub fn decompress_file(
    input: impl AsRef<Path>,
    output: impl AsRef<Path>,
    config: PipelineConfig,
) -> Result<PathBuf, BlockError> {
    let output = output.as_ref().to_path_buf();
    let pipeline = Pipeline::new(config)?;

    let (reader, writer) = open_pair(input.as_ref(), &output)?;
    log::info!(
        "decompressing {} -> {}",
        input.as_ref().display(),
        output.display()
    );
    let summary = pipeline.decompress(reader, BufWriter::new(writer))?;
    report(Mode::Decompress, &summary);
    Ok(output)
}

/// Returns `path` with [`COMPRESSED_SUFFIX`] appended to its file name.
pub fn compressed_path(path: &Path) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(COMPRESSED_SUFFIX);
    PathBuf::from(name)
}

/// Opens the input and replaces the output.
///
/// Nothing is created or deleted when the input is missing.
fn open_pair(input: &Path, output: &Path) -> Result<(File, File), BlockError> {
    if !input.is_file() {
        return Err(BlockError::InputNotFound {
            path: input.to_path_buf(),
        });
    }
    let reader = File::open(input)?;

    if output.exists() {
        log::debug!("removing existing {}", output.display());
        fs::remove_file(output)?;
    }
    let writer = File::create(output)?;

    Ok((reader, writer))
}

fn report(mode: Mode, summary: &PipelineSummary) {
    log::info!(
        "{} done: {} (ratio {:.3})",
        mode,
        summary,
        summary.ratio()
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_from_str() {
        assert_eq!("compress".parse::<Mode>().unwrap(), Mode::Compress);
        assert_eq!("decompress".parse::<Mode>().unwrap(), Mode::Decompress);
        assert!(matches!(
            "squash".parse::<Mode>(),
            Err(BlockError::InvalidMode { .. })
        ));
    }

    #[test]
    fn test_mode_display_round_trips() {
        for mode in [Mode::Compress, Mode::Decompress] {
            assert_eq!(mode.to_string().parse::<Mode>().unwrap(), mode);
        }
    }

    #[test]
    fn test_compressed_path_appends() {
        assert_eq!(
            compressed_path(Path::new("dir/archive.tar")),
            PathBuf::from("dir/archive.tar.gz")
        );
        assert_eq!(compressed_path(Path::new("out")), PathBuf::from("out.gz"));
    }
}
