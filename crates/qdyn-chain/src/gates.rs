use std::fmt;
use std::str::FromStr;

use qdyn_core::{ErrorInfo, QdynError};
use serde::{Deserialize, Serialize};

use crate::program::Operation;

/// Closed set of single-site gates a layer slot can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GateKind {
    /// Reset of the site to its reference state.
    Reset,
    /// Hadamard.
    H,
    /// Pauli X.
    X,
    /// Pauli Y.
    Y,
    /// Pauli Z.
    Z,
    /// Phase gate, square root of Z.
    S,
    /// Fourth root of Z.
    T,
    /// Square root of X.
    Sx,
    /// Square root of Y.
    Sy,
}

/// Label table used for parsing and printing. Every [`GateKind`] appears exactly once.
pub const GATE_TABLE: [(GateKind, &str); 9] = [
    (GateKind::Reset, "reset"),
    (GateKind::H, "h"),
    (GateKind::X, "x"),
    (GateKind::Y, "y"),
    (GateKind::Z, "z"),
    (GateKind::S, "s"),
    (GateKind::T, "t"),
    (GateKind::Sx, "sx"),
    (GateKind::Sy, "sy"),
];

impl GateKind {
    /// Returns the canonical label of the gate.
    pub fn label(self) -> &'static str {
        match self {
            GateKind::Reset => "reset",
            GateKind::H => "h",
            GateKind::X => "x",
            GateKind::Y => "y",
            GateKind::Z => "z",
            GateKind::S => "s",
            GateKind::T => "t",
            GateKind::Sx => "sx",
            GateKind::Sy => "sy",
        }
    }

    /// Looks up a gate by its canonical label.
    pub fn from_label(label: &str) -> Option<Self> {
        GATE_TABLE
            .iter()
            .find(|(_, candidate)| *candidate == label)
            .map(|(kind, _)| *kind)
    }

    /// Effect of placing this gate on `site` in an executable program.
    pub fn operation(self, site: usize) -> Operation {
        match self {
            GateKind::Reset => Operation::Reset { site },
            GateKind::H
            | GateKind::X
            | GateKind::Y
            | GateKind::Z
            | GateKind::S
            | GateKind::T
            | GateKind::Sx
            | GateKind::Sy => Operation::Gate { kind: self, site },
        }
    }
}

impl fmt::Display for GateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for GateKind {
    type Err = QdynError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        GateKind::from_label(s.trim()).ok_or_else(|| {
            QdynError::Configuration(
                ErrorInfo::new("unknown-gate", format!("unknown gate label '{s}'"))
                    .with_hint("expected one of reset, h, x, y, z, s, t, sx, sy"),
            )
        })
    }
}

/// Parses a list of gate labels, failing on the first unknown one.
pub fn parse_gate_set<S: AsRef<str>>(labels: &[S]) -> Result<Vec<GateKind>, QdynError> {
    labels.iter().map(|label| label.as_ref().parse()).collect()
}
