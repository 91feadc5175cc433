//! Command-line driver.
//!
//! ```text
//! blockgz compress   <INPUT> <OUTPUT>   # writes OUTPUT.gz
//! blockgz decompress <INPUT> <OUTPUT>   # writes OUTPUT
//! ```
//!
//! Log verbosity follows `RUST_LOG` (default `info`).

use std::path::PathBuf;
use std::process::ExitCode;

use blockgz::{Mode, PipelineConfig, driver};
use clap::Parser;

#[derive(Debug, Parser)]
#[command(name = "blockgz", version, about = "Parallel block gzip compressor")]
struct Args {
    /// Either `compress` or `decompress`.
    #[arg(value_name = "MODE")]
    mode: Mode,

    /// File to read.
    #[arg(value_name = "INPUT")]
    input: PathBuf,

    /// File to write (`.gz` is appended when compressing).
    #[arg(value_name = "OUTPUT")]
    output: PathBuf,

    /// Worker threads per batch [default: available parallelism].
    #[arg(short = 'j', long, value_name = "THREADS")]
    workers: Option<usize>,

    /// Maximum raw bytes per chunk [default: page size / workers].
    #[arg(long, value_name = "BYTES")]
    chunk_size: Option<usize>,

    /// gzip compression level.
    #[arg(short = 'l', long, default_value_t = blockgz::DEFAULT_LEVEL,
          value_parser = clap::value_parser!(u32).range(0..=9))]
    level: u32,
}

impl Args {
    fn config(&self) -> PipelineConfig {
        let mut config = PipelineConfig::default().with_level(self.level);
        if let Some(workers) = self.workers {
            config = config
                .with_workers(workers)
                .with_max_chunk_size(blockgz::default_chunk_size(workers));
        }
        if let Some(size) = self.chunk_size {
            config = config.with_max_chunk_size(size);
        }
        config
    }
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let config = args.config();
    log::debug!("{:?}", config);

    match driver::run(args.mode, &args.input, &args.output, config) {
        Ok(path) => {
            log::info!("wrote {}", path.display());
            ExitCode::SUCCESS
        }
        Err(e) => {
            log::error!("{} failed: {}", args.mode, e);
            ExitCode::FAILURE
        }
    }
}
