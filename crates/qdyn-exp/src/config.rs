use std::fs;
use std::path::{Path, PathBuf};

use qdyn_basis::Basis;
use qdyn_core::{entropy_seed, ErrorInfo, QdynError};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::engine::EngineConfig;

/// YAML-configurable parameters shared by every driver.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunConfig {
    /// Number of samples written per dataset.
    #[serde(default = "default_niter")]
    pub niter: usize,
    /// Measurement basis.
    #[serde(default)]
    pub basis: Basis,
    /// Master seed; drawn from OS entropy when absent.
    #[serde(default)]
    pub seed: Option<u64>,
    /// Worker threads for the sample loop.
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
    /// External execution engine.
    #[serde(default)]
    pub engine: EngineConfig,
    /// Directory receiving dataset files.
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
}

fn default_niter() -> usize {
    8192
}

fn default_concurrency() -> usize {
    1
}

fn default_output_dir() -> PathBuf {
    PathBuf::from(".")
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            niter: default_niter(),
            basis: Basis::default(),
            seed: None,
            concurrency: default_concurrency(),
            engine: EngineConfig::default(),
            output_dir: default_output_dir(),
        }
    }
}

impl RunConfig {
    /// Reads a YAML run configuration.
    pub fn load(path: &Path) -> Result<Self, QdynError> {
        let contents =
            fs::read_to_string(path).map_err(|err| QdynError::io("config-read", path, &err))?;
        Self::from_yaml(&contents)
    }

    /// Parses a YAML run configuration and validates it.
    pub fn from_yaml(contents: &str) -> Result<Self, QdynError> {
        let config: RunConfig = serde_yaml::from_str(contents)
            .map_err(|err| QdynError::configuration("config-parse", err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Rejects settings no driver can run with.
    pub fn validate(&self) -> Result<(), QdynError> {
        if self.concurrency == 0 {
            return Err(QdynError::Configuration(
                ErrorInfo::new("concurrency", "concurrency must be at least 1")
                    .with_context("concurrency", "0"),
            ));
        }
        Ok(())
    }

    /// The configured seed, or a fresh entropy seed which is logged for replay.
    pub fn master_seed(&self) -> u64 {
        match self.seed {
            Some(seed) => seed,
            None => {
                let seed = entropy_seed();
                info!(seed, "no seed configured, drew master seed from entropy");
                seed
            }
        }
    }

    /// Location of a dataset file inside the output directory.
    pub fn dataset_path(&self, file_name: &str) -> PathBuf {
        self.output_dir.join(file_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_yaml_uses_defaults() {
        let config = RunConfig::from_yaml("{}").unwrap();
        assert_eq!(config, RunConfig::default());
        assert_eq!(config.niter, 8192);
    }

    #[test]
    fn yaml_fields_override_defaults() {
        let yaml = "niter: 10\nbasis: random\nseed: 7\nconcurrency: 4\nengine:\n  command: sim\n  args: [\"--shots\", \"1\"]\noutput_dir: out\n";
        let config = RunConfig::from_yaml(yaml).unwrap();
        assert_eq!(config.niter, 10);
        assert_eq!(config.basis, Basis::Random);
        assert_eq!(config.seed, Some(7));
        assert_eq!(config.engine.args, vec!["--shots", "1"]);
        assert_eq!(config.dataset_path("a.dat"), PathBuf::from("out/a.dat"));
    }

    #[test]
    fn zero_concurrency_is_rejected() {
        let err = RunConfig::from_yaml("concurrency: 0").unwrap_err();
        assert!(matches!(err, QdynError::Configuration(_)));
        assert!(RunConfig::from_yaml("basis: sideways").is_err());
    }
}
