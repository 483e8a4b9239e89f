#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};

use qdyn_chain::{Operation, Program};
use qdyn_core::QdynError;
use qdyn_exp::Executor;

/// Deterministic stand-in engine: the outcome encodes the basis rotation bits so
/// reordered samples would show up in the dataset.
#[derive(Default)]
pub struct ParityEngine {
    pub calls: AtomicUsize,
}

impl Executor for ParityEngine {
    fn execute(&self, program: &Program) -> Result<String, QdynError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let seed = program
            .operations()
            .find_map(|op| match op {
                Operation::Rotation { theta, phi, lambda, .. } => {
                    Some(theta.to_bits() ^ phi.to_bits().rotate_left(21) ^ lambda.to_bits())
                }
                _ => None,
            })
            .unwrap_or(program.len() as u64);
        Ok((0..program.total_sites())
            .map(|site| if (seed >> (site % 64)) & 1 == 1 { '1' } else { '0' })
            .collect())
    }
}

/// Engine answering with a fixed string regardless of the program.
pub struct FixedEngine(pub &'static str);

impl Executor for FixedEngine {
    fn execute(&self, _program: &Program) -> Result<String, QdynError> {
        Ok(self.0.to_string())
    }
}
