use std::fmt;
use std::str::FromStr;

use qdyn_core::{ErrorInfo, QdynError};
use serde::{Deserialize, Serialize};

/// Measurement basis used by every driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Basis {
    /// Computational basis, no rotation before measurement.
    #[default]
    #[serde(alias = "z")]
    Fixed,
    /// Per-sample rotation drawn from the octant sampler.
    Random,
}

impl Basis {
    /// Keyword used in output file names.
    pub fn keyword(self) -> &'static str {
        match self {
            Basis::Fixed => "z",
            Basis::Random => "random",
        }
    }
}

impl fmt::Display for Basis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

impl FromStr for Basis {
    type Err = QdynError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fixed" | "z" => Ok(Basis::Fixed),
            "random" => Ok(Basis::Random),
            other => Err(QdynError::Configuration(
                ErrorInfo::new("unknown-basis", format!("unknown basis '{other}'"))
                    .with_hint("use 'fixed' (alias 'z') or 'random'"),
            )),
        }
    }
}
