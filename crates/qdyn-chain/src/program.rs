use serde::{Deserialize, Serialize};

use crate::gates::GateKind;

/// One operation of an executable program.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Operation {
    /// Reset a site to its reference state.
    Reset {
        /// Target site.
        site: usize,
    },
    /// Fixed single-site gate.
    Gate {
        /// Gate applied.
        kind: GateKind,
        /// Target site.
        site: usize,
    },
    /// Controlled-Z between two sites.
    Cz {
        /// Control site.
        control: usize,
        /// Target site.
        target: usize,
    },
    /// Controlled-X between two sites.
    Cx {
        /// Control site.
        control: usize,
        /// Target site.
        target: usize,
    },
    /// Generic single-site rotation `U(theta, phi, lambda)`.
    Rotation {
        /// Polar angle.
        theta: f64,
        /// First azimuthal angle.
        phi: f64,
        /// Second azimuthal angle.
        lambda: f64,
        /// Target site.
        site: usize,
    },
    /// Prepare all sites in the given state vector (basis index bit `i` is site `i`).
    Initialize {
        /// Real amplitudes, one per computational basis state.
        amplitudes: Vec<f64>,
    },
    /// Ordering hint for the engine; no effect on the state.
    Barrier,
    /// Single-shot measurement of a site in the computational basis.
    Measure {
        /// Measured site.
        site: usize,
    },
}

/// Execution-ready structure handed to an external engine.
///
/// Operations are grouped per layer in application order. Barriers and the final
/// measurement step occupy layers of their own.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Program {
    total_sites: usize,
    layers: Vec<Vec<Operation>>,
}

impl Program {
    /// Creates an empty program over `total_sites` sites.
    pub fn new(total_sites: usize) -> Self {
        Self {
            total_sites,
            layers: Vec::new(),
        }
    }

    /// Number of sites addressed by the program.
    pub fn total_sites(&self) -> usize {
        self.total_sites
    }

    /// Per-layer operations in application order.
    pub fn layers(&self) -> &[Vec<Operation>] {
        &self.layers
    }

    /// Flattened operations in application order.
    pub fn operations(&self) -> impl Iterator<Item = &Operation> + '_ {
        self.layers.iter().flatten()
    }

    /// Number of layers, barriers and measurement steps included.
    pub fn len(&self) -> usize {
        self.layers.len()
    }

    /// Returns `true` when no layer has been pushed.
    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    /// Appends one layer of operations.
    pub fn push_layer(&mut self, ops: Vec<Operation>) {
        self.layers.push(ops);
    }

    /// Appends every layer of `other` in order.
    pub fn append(&mut self, other: &Program) {
        self.layers.extend(other.layers.iter().cloned());
    }

    /// Appends a barrier step.
    pub fn push_barrier(&mut self) {
        self.layers.push(vec![Operation::Barrier]);
    }

    /// Appends the same rotation on every site.
    pub fn push_rotation(&mut self, theta: f64, phi: f64, lambda: f64) {
        let ops = (0..self.total_sites)
            .map(|site| Operation::Rotation {
                theta,
                phi,
                lambda,
                site,
            })
            .collect();
        self.layers.push(ops);
    }

    /// Appends a measurement of every site as the final step.
    pub fn push_measurement(&mut self) {
        let ops = (0..self.total_sites)
            .map(|site| Operation::Measure { site })
            .collect();
        self.layers.push(ops);
    }

    /// Returns a copy of the program with a measurement of every site appended.
    pub fn with_measurement(&self) -> Program {
        let mut program = self.clone();
        program.push_measurement();
        program
    }

    /// Number of measured sites.
    pub fn measured_sites(&self) -> usize {
        self.operations()
            .filter(|op| matches!(op, Operation::Measure { .. }))
            .count()
    }
}
