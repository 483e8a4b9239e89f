pub mod cats;
pub mod chaotic;
pub mod dicke;

use std::path::PathBuf;

use clap::Args;
use qdyn_basis::Basis;
use qdyn_core::QdynError;
use qdyn_exp::{CommandExecutor, RunConfig};

/// Options shared by every driver. Flags override values from `--config`.
#[derive(Args, Debug, Clone, Default)]
pub struct RunArgs {
    /// YAML run configuration.
    #[arg(long)]
    pub config: Option<PathBuf>,
    /// Number of generated samples (default: 8192).
    #[arg(short = 'n', long)]
    pub niter: Option<usize>,
    /// Measurement basis: fixed (alias z) or random.
    #[arg(long)]
    pub basis: Option<Basis>,
    /// Master seed; drawn from OS entropy and logged when omitted.
    #[arg(long)]
    pub seed: Option<u64>,
    /// Worker threads for the sample loop.
    #[arg(long)]
    pub concurrency: Option<usize>,
    /// Execution engine command, spawned once per sample.
    #[arg(long)]
    pub engine: Option<String>,
    /// Argument passed to the engine command (repeatable).
    #[arg(long = "engine-arg", value_name = "ARG", allow_hyphen_values = true)]
    pub engine_args: Vec<String>,
    /// Directory receiving dataset files.
    #[arg(long = "out-dir")]
    pub out_dir: Option<PathBuf>,
}

impl RunArgs {
    /// Merges the optional config file with command-line overrides.
    pub fn resolve(&self) -> Result<RunConfig, QdynError> {
        let mut config = match &self.config {
            Some(path) => RunConfig::load(path)?,
            None => RunConfig::default(),
        };
        if let Some(niter) = self.niter {
            config.niter = niter;
        }
        if let Some(basis) = self.basis {
            config.basis = basis;
        }
        if self.seed.is_some() {
            config.seed = self.seed;
        }
        if let Some(concurrency) = self.concurrency {
            config.concurrency = concurrency;
        }
        if let Some(engine) = &self.engine {
            config.engine.command = engine.clone();
        }
        if !self.engine_args.is_empty() {
            config.engine.args = self.engine_args.clone();
        }
        if let Some(out_dir) = &self.out_dir {
            config.output_dir = out_dir.clone();
        }
        config.validate()?;
        Ok(config)
    }
}

/// Engine adapter for a resolved configuration.
pub fn executor_for(config: &RunConfig) -> Result<CommandExecutor, QdynError> {
    CommandExecutor::new(config.engine.clone())
}
