//! Splits the whole similarity matrix into row shards small enough to store
//! and ship individually. The service reassembles them at startup.

use std::fs;
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;

use cinema_api::{
    data::{matrix, MatrixAssembler, MatrixSource},
    init_tracing,
};

#[derive(Debug, Parser)]
#[command(name = "split-matrix", about = "Split a similarity matrix into row shards")]
struct Args {
    /// Directory holding the matrix file; shards are written next to it
    #[arg(long, default_value = "artifacts")]
    data_dir: PathBuf,

    /// Number of shards to produce
    #[arg(long, default_value_t = 10)]
    shards: usize,

    /// Shard file name prefix
    #[arg(long, default_value = "sim_")]
    prefix: String,

    /// Whole-matrix file name inside the data directory
    #[arg(long, default_value = "similarity.bin")]
    input: String,
}

fn main() -> anyhow::Result<()> {
    init_tracing();
    let args = Args::parse();

    let similarity = MatrixAssembler::new(whole_source(&args))
        .assemble()
        .context("failed to load the whole similarity matrix")?;
    tracing::info!(dimension = similarity.dimension(), "Loaded similarity matrix");

    let target = MatrixSource {
        shard_count: args.shards,
        ..whole_source(&args)
    };
    let written = matrix::write_shards(&similarity, &target).context("failed to write shards")?;

    for path in &written {
        let size = fs::metadata(path).map(|m| m.len()).unwrap_or(0);
        tracing::info!(
            path = %path.display(),
            megabytes = %format!("{:.2}", size as f64 / 1024.0 / 1024.0),
            "Shard size"
        );
    }
    tracing::info!(shards = written.len(), "Split complete");

    Ok(())
}

// Zero shards means the assembler reads only the whole-matrix file
fn whole_source(args: &Args) -> MatrixSource {
    MatrixSource {
        dir: args.data_dir.clone(),
        shard_prefix: args.prefix.clone(),
        shard_count: 0,
        fallback_file: args.input.clone(),
    }
}
