use std::fs;
use std::path::Path;

use qdyn_basis::{AngleSampler, Basis, BasisAngles};
use qdyn_chain::Program;
use qdyn_core::{ErrorInfo, QdynError};
use rayon::prelude::*;
use tracing::{debug, info};

use crate::engine::{validate_outcome, Executor, PreparedProgram};

/// Settings of one dataset run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SampleLoop {
    /// Number of samples.
    pub niter: usize,
    /// Measurement basis.
    pub basis: Basis,
    /// Worker threads.
    pub concurrency: usize,
}

/// Layers appended to the shared program for one sample: the optional basis
/// rotation on every site, a barrier and a measurement of every site.
pub fn sample_suffix(total_sites: usize, angles: Option<&BasisAngles>) -> Program {
    let mut suffix = Program::new(total_sites);
    if let Some(angles) = angles {
        suffix.push_rotation(angles.theta, angles.phi, angles.lambda);
    }
    suffix.push_barrier();
    suffix.push_measurement();
    suffix
}

/// Program executed for one sample: `base` followed by [`sample_suffix`].
pub fn sample_program(base: &Program, angles: Option<&BasisAngles>) -> Program {
    let mut program = base.clone();
    program.append(&sample_suffix(base.total_sites(), angles));
    program
}

/// Runs `niter` single-shot executions of `base` and concatenates the outcomes
/// in iteration order.
///
/// Random basis angles are drawn up front so the result does not depend on the
/// scheduling of workers. `base` is encoded once and shared by every sample.
pub fn generate_dataset(
    base: &Program,
    settings: SampleLoop,
    angles: &mut AngleSampler,
    executor: &dyn Executor,
) -> Result<String, QdynError> {
    let batch = match settings.basis {
        Basis::Random => Some(angles.sample_batch(settings.niter)),
        Basis::Fixed => None,
    };
    let sites = base.total_sites();
    let prepared = PreparedProgram::new(base.clone())?;
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(settings.concurrency.max(1))
        .build()
        .map_err(|err| QdynError::Execution(ErrorInfo::new("thread-pool", err.to_string())))?;

    let outcomes: Result<Vec<String>, QdynError> = pool.install(|| {
        (0..settings.niter)
            .into_par_iter()
            .map(|index| {
                let rotation = batch.as_ref().map(|batch| &batch[index]);
                let suffix = sample_suffix(sites, rotation);
                let outcome = executor.execute_prepared(&prepared, &suffix).map_err(|err| match err {
                    QdynError::Execution(info) => {
                        QdynError::Execution(info.with_context("sample", index.to_string()))
                    }
                    other => other,
                })?;
                validate_outcome(&outcome, sites)?;
                debug!(sample = index, "sample executed");
                Ok(outcome)
            })
            .collect()
    });

    let mut data = String::with_capacity(settings.niter * sites);
    for outcome in outcomes? {
        data.push_str(&outcome);
    }
    Ok(data)
}

/// Writes a dataset as a flat byte stream with no separators.
pub fn write_dataset(path: &Path, data: &str) -> Result<(), QdynError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|err| QdynError::io("dataset-mkdir", parent, &err))?;
    }
    fs::write(path, data).map_err(|err| QdynError::io("dataset-write", path, &err))?;
    info!(path = %path.display(), bytes = data.len(), "dataset written");
    Ok(())
}
