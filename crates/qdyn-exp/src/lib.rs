//! Dataset drivers and the boundary to the external execution engine.
//!
//! Each driver builds a [`qdyn_chain::Program`], runs it once per sample
//! through an [`Executor`] (optionally behind a random basis rotation) and
//! writes the concatenated outcome strings to a flat file.

mod cats;
mod chaotic;
mod config;
mod dataset;
mod dicke;
mod engine;

pub use cats::{cat_file_name, cat_program, run_cats, DEFAULT_CAT_THETAS};
pub use chaotic::{
    build_chaotic_chain, chaotic_file_name, chaotic_patterns, run_chaotic, save_chaotic,
    ChaoticOptions, ChaoticOutcome, CHAOTIC_GATES, CHAOTIC_SITES, DEFAULT_DEPTH,
};
pub use config::RunConfig;
pub use dataset::{generate_dataset, sample_program, sample_suffix, write_dataset, SampleLoop};
pub use dicke::{dicke_amplitudes, dicke_file_name, dicke_program, run_dicke, MAX_DICKE_SITES};
pub use engine::{validate_outcome, CommandExecutor, EngineConfig, Executor, PreparedProgram};
