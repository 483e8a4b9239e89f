use std::path::{Path, PathBuf};

use qdyn_basis::AngleSampler;
use qdyn_chain::{
    load_chain, rebuild_executable, save_chain, ChainBuilder, GateKind, GrowOptions,
    Pattern, Program, SiteGateSampler,
};
use qdyn_core::{ErrorInfo, QdynError, RngHandle, ANGLE_SUBSTREAM, GATE_SUBSTREAM};
use tracing::info;

use crate::config::RunConfig;
use crate::dataset::{generate_dataset, write_dataset, SampleLoop};
use crate::engine::Executor;

/// Sites of the chaotic chain.
pub const CHAOTIC_SITES: usize = 16;
/// Default number of growth increments.
pub const DEFAULT_DEPTH: usize = 19;
/// Single-site gate alphabet.
pub const CHAOTIC_GATES: [GateKind; 3] = [GateKind::Sx, GateKind::Sy, GateKind::T];

const CHAOTIC_PATTERNS: [&[[usize; 2]]; 8] = [
    &[[0, 1], [6, 7], [8, 9], [14, 15]],
    &[[2, 3], [4, 5], [10, 11], [12, 13]],
    &[[5, 9], [7, 11]],
    &[[4, 8], [6, 10]],
    &[[1, 2], [9, 10]],
    &[[5, 6], [13, 14]],
    &[[1, 5], [3, 7], [8, 12], [10, 14]],
    &[[0, 4], [2, 6], [9, 13], [11, 15]],
];

/// The eight interaction patterns of the 4x4 chaotic lattice.
pub fn chaotic_patterns() -> Result<Vec<Pattern>, QdynError> {
    CHAOTIC_PATTERNS
        .iter()
        .map(|pairs| Pattern::from_arrays(pairs))
        .collect()
}

/// Grows the chaotic chain: a reset layer, one untracked increment, then
/// `depth - 1` increments that force every site to change its gate.
pub fn build_chaotic_chain(depth: usize, seed: u64) -> Result<ChainBuilder, QdynError> {
    if depth == 0 {
        return Err(QdynError::Configuration(
            ErrorInfo::new("depth", "chain depth must be at least 1")
                .with_context("depth", "0"),
        ));
    }
    let sampler = SiteGateSampler::new(RngHandle::substream(seed, GATE_SUBSTREAM));
    let mut builder = ChainBuilder::new(CHAOTIC_SITES, chaotic_patterns()?, sampler)?;
    builder.append_uniform(GateKind::Reset)?;
    builder.grow(
        &CHAOTIC_GATES,
        1,
        GrowOptions {
            barrier: false,
            track_exclusion: false,
        },
    )?;
    builder.grow(&CHAOTIC_GATES, depth - 1, GrowOptions::default())?;
    Ok(builder)
}

/// Chaotic driver options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChaoticOptions {
    /// Growth increments; also names the output file.
    pub depth: usize,
    /// Persist the grown chain here and stop.
    pub save: Option<PathBuf>,
    /// Replay a stored chain instead of growing one.
    pub load: Option<PathBuf>,
    /// Keep only this many leading layers of a loaded chain.
    pub layers: Option<usize>,
}

impl Default for ChaoticOptions {
    fn default() -> Self {
        Self {
            depth: DEFAULT_DEPTH,
            save: None,
            load: None,
            layers: None,
        }
    }
}

/// What a chaotic run produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChaoticOutcome {
    /// The chain was saved; no dataset was generated.
    Saved(PathBuf),
    /// Dataset file written.
    Dataset(PathBuf),
}

/// Output file name for the chaotic driver.
pub fn chaotic_file_name(config: &RunConfig, depth: usize) -> String {
    format!("chaotic.{}.depth={depth}.dat", config.basis)
}

fn chaotic_program(options: &ChaoticOptions, seed: u64) -> Result<Program, QdynError> {
    match &options.load {
        Some(path) => rebuild_executable(&load_chain(path, options.layers)?),
        None => Ok(build_chaotic_chain(options.depth, seed)?.descriptor(false)),
    }
}

/// Grows the chaotic chain and persists it without generating samples.
pub fn save_chaotic(depth: usize, path: &Path, config: &RunConfig) -> Result<(), QdynError> {
    let builder = build_chaotic_chain(depth, config.master_seed())?;
    save_chain(builder.chain(), path)
}

/// Runs the chaotic driver. With `save` set (and no `load`) the chain is
/// persisted and no dataset is generated.
pub fn run_chaotic(
    options: &ChaoticOptions,
    config: &RunConfig,
    executor: &dyn Executor,
) -> Result<ChaoticOutcome, QdynError> {
    config.validate()?;
    if options.load.is_none() {
        if let Some(path) = &options.save {
            save_chaotic(options.depth, path, config)?;
            return Ok(ChaoticOutcome::Saved(path.clone()));
        }
    }
    let seed = config.master_seed();
    let program = chaotic_program(options, seed)?;
    let mut angles = AngleSampler::new(RngHandle::substream(seed, ANGLE_SUBSTREAM));
    let settings = SampleLoop {
        niter: config.niter,
        basis: config.basis,
        concurrency: config.concurrency,
    };
    let data = generate_dataset(&program, settings, &mut angles, executor)?;
    let path = config.dataset_path(&chaotic_file_name(config, options.depth));
    write_dataset(&path, &data)?;
    info!(
        layers = program.len(),
        samples = config.niter,
        seed,
        "chaotic dataset complete"
    );
    Ok(ChaoticOutcome::Dataset(path))
}
