use std::error::Error;
use std::path::PathBuf;

use clap::Args;
use qdyn_chain::truncation_from_signed;
use qdyn_exp::{run_chaotic, save_chaotic, ChaoticOptions, ChaoticOutcome, DEFAULT_DEPTH};
use tracing::info;

use super::{executor_for, RunArgs};

#[derive(Args, Debug)]
pub struct ChaoticArgs {
    #[command(flatten)]
    pub run: RunArgs,
    /// Depth of the chaotic chain.
    #[arg(long, default_value_t = DEFAULT_DEPTH)]
    pub depth: usize,
    /// Generate the chain, save it and exit.
    #[arg(long)]
    pub save: Option<PathBuf>,
    /// Load a chain from file and generate samples from it.
    #[arg(long)]
    pub load: Option<PathBuf>,
    /// Keep only this many leading layers of a loaded chain (0 keeps all).
    #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
    pub layers: i64,
}

pub fn run(args: &ChaoticArgs) -> Result<(), Box<dyn Error>> {
    let config = args.run.resolve()?;
    let options = ChaoticOptions {
        depth: args.depth,
        save: args.save.clone(),
        load: args.load.clone(),
        layers: truncation_from_signed(args.layers)?,
    };
    if let (Some(path), None) = (&options.save, &options.load) {
        save_chaotic(options.depth, path, &config)?;
        info!(path = %path.display(), "chain saved, skipping sampling");
        return Ok(());
    }
    let executor = executor_for(&config)?;
    if let ChaoticOutcome::Dataset(path) = run_chaotic(&options, &config, &executor)? {
        println!("{}", path.display());
    }
    Ok(())
}
