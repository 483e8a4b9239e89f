use std::f64::consts::PI;
use std::path::PathBuf;

use qdyn_basis::AngleSampler;
use qdyn_chain::{Operation, Program};
use qdyn_core::{ErrorInfo, QdynError, RngHandle, ANGLE_SUBSTREAM};
use tracing::info;

use crate::config::RunConfig;
use crate::dataset::{generate_dataset, write_dataset, SampleLoop};
use crate::engine::Executor;

/// Polar angles used when none are given.
pub const DEFAULT_CAT_THETAS: [f64; 5] = [0.0, PI / 8.0, PI / 4.0, 3.0 * PI / 8.0, PI / 2.0];

/// Generalized cat state preparation: `U(theta, 0, 0)` on site 0 followed by a
/// CX chain `(i, i + 1)`.
pub fn cat_program(qbits: usize, theta: f64) -> Result<Program, QdynError> {
    if qbits < 2 {
        return Err(QdynError::Configuration(
            ErrorInfo::new("site-count", "a cat state needs at least two sites")
                .with_context("qbits", qbits.to_string()),
        ));
    }
    let mut program = Program::new(qbits);
    program.push_layer(vec![Operation::Rotation {
        theta,
        phi: 0.0,
        lambda: 0.0,
        site: 0,
    }]);
    program.push_layer(
        (0..qbits - 1)
            .map(|control| Operation::Cx {
                control,
                target: control + 1,
            })
            .collect(),
    );
    Ok(program)
}

/// Output file name for one cat angle.
pub fn cat_file_name(config: &RunConfig, theta: f64) -> String {
    format!("cats.{}.theta={theta:.3}.dat", config.basis)
}

/// Writes one dataset per theta; an empty list means [`DEFAULT_CAT_THETAS`].
pub fn run_cats(
    qbits: usize,
    thetas: &[f64],
    config: &RunConfig,
    executor: &dyn Executor,
) -> Result<Vec<PathBuf>, QdynError> {
    config.validate()?;
    let thetas = if thetas.is_empty() {
        &DEFAULT_CAT_THETAS[..]
    } else {
        thetas
    };
    let programs = thetas
        .iter()
        .map(|&theta| cat_program(qbits, theta))
        .collect::<Result<Vec<_>, _>>()?;
    let seed = config.master_seed();
    let mut angles = AngleSampler::new(RngHandle::substream(seed, ANGLE_SUBSTREAM));
    let settings = SampleLoop {
        niter: config.niter,
        basis: config.basis,
        concurrency: config.concurrency,
    };

    let mut written = Vec::with_capacity(thetas.len());
    for (&theta, program) in thetas.iter().zip(&programs) {
        let data = generate_dataset(program, settings, &mut angles, executor)?;
        let path = config.dataset_path(&cat_file_name(config, theta));
        write_dataset(&path, &data)?;
        info!(theta, samples = config.niter, "cat dataset complete");
        written.push(path);
    }
    Ok(written)
}
