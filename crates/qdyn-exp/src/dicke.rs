use std::path::PathBuf;

use qdyn_basis::AngleSampler;
use qdyn_chain::{Operation, Program};
use qdyn_core::{ErrorInfo, QdynError, RngHandle, ANGLE_SUBSTREAM};
use tracing::info;

use crate::config::RunConfig;
use crate::dataset::{generate_dataset, write_dataset, SampleLoop};
use crate::engine::Executor;

/// Largest register whose full amplitude vector is built in memory.
pub const MAX_DICKE_SITES: usize = 24;

/// Normalized Dicke amplitudes: equal weight on every basis state with exactly
/// `excitations` set bits.
pub fn dicke_amplitudes(qbits: usize, excitations: usize) -> Result<Vec<f64>, QdynError> {
    if qbits == 0 || qbits > MAX_DICKE_SITES {
        return Err(QdynError::Configuration(
            ErrorInfo::new("site-count", "Dicke register size out of range")
                .with_context("qbits", qbits.to_string())
                .with_context("max", MAX_DICKE_SITES.to_string()),
        ));
    }
    if excitations > qbits {
        return Err(QdynError::Configuration(
            ErrorInfo::new("excitations", "excitation count exceeds the site count")
                .with_context("D", excitations.to_string())
                .with_context("qbits", qbits.to_string()),
        ));
    }
    let mut amplitudes: Vec<f64> = (0..1usize << qbits)
        .map(|index| {
            if index.count_ones() as usize == excitations {
                1.0
            } else {
                0.0
            }
        })
        .collect();
    let norm = amplitudes.iter().sum::<f64>().sqrt();
    for amplitude in &mut amplitudes {
        *amplitude /= norm;
    }
    Ok(amplitudes)
}

/// Program initializing the Dicke state.
pub fn dicke_program(qbits: usize, excitations: usize) -> Result<Program, QdynError> {
    let amplitudes = dicke_amplitudes(qbits, excitations)?;
    let mut program = Program::new(qbits);
    program.push_layer(vec![Operation::Initialize { amplitudes }]);
    Ok(program)
}

/// Output file name for the Dicke driver.
pub fn dicke_file_name(config: &RunConfig, excitations: usize) -> String {
    format!("Dicke.{}.D={excitations}.dat", config.basis)
}

/// Runs the Dicke driver.
pub fn run_dicke(
    qbits: usize,
    excitations: usize,
    config: &RunConfig,
    executor: &dyn Executor,
) -> Result<PathBuf, QdynError> {
    config.validate()?;
    let program = dicke_program(qbits, excitations)?;
    let seed = config.master_seed();
    let mut angles = AngleSampler::new(RngHandle::substream(seed, ANGLE_SUBSTREAM));
    let settings = SampleLoop {
        niter: config.niter,
        basis: config.basis,
        concurrency: config.concurrency,
    };
    let data = generate_dataset(&program, settings, &mut angles, executor)?;
    let path = config.dataset_path(&dicke_file_name(config, excitations));
    write_dataset(&path, &data)?;
    info!(qbits, excitations, samples = config.niter, "Dicke dataset complete");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_excitation_weights() {
        let amplitudes = dicke_amplitudes(3, 1).unwrap();
        let expected = 1.0 / 3f64.sqrt();
        for (index, amplitude) in amplitudes.iter().enumerate() {
            if matches!(index, 1 | 2 | 4) {
                assert!((amplitude - expected).abs() < 1e-12);
            } else {
                assert_eq!(*amplitude, 0.0);
            }
        }
        let norm: f64 = amplitudes.iter().map(|a| a * a).sum();
        assert!((norm - 1.0).abs() < 1e-12);
    }

    #[test]
    fn ground_state_for_zero_excitations() {
        let amplitudes = dicke_amplitudes(2, 0).unwrap();
        assert_eq!(amplitudes, vec![1.0, 0.0, 0.0, 0.0]);
    }

    #[test]
    fn invalid_sizes_fail() {
        assert!(dicke_amplitudes(0, 0).is_err());
        assert!(dicke_amplitudes(2, 3).is_err());
        assert!(dicke_amplitudes(MAX_DICKE_SITES + 1, 1).is_err());
    }
}
