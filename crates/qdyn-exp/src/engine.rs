use std::io::{self, Write};
use std::process::{Command, Stdio};

use qdyn_chain::Program;
use qdyn_core::{ErrorInfo, QdynError};
use serde::{Deserialize, Serialize};

/// Boundary to the external execution engine.
///
/// One call runs the program once and returns exactly one outcome bit-string.
pub trait Executor: Send + Sync {
    /// Executes `program` for a single shot.
    fn execute(&self, program: &Program) -> Result<String, QdynError>;

    /// Executes `base` followed by the layers of `suffix`.
    ///
    /// The default assembles the combined program. Engines that serialize the
    /// program reuse the encoding held by `base` instead.
    fn execute_prepared(
        &self,
        base: &PreparedProgram,
        suffix: &Program,
    ) -> Result<String, QdynError> {
        let mut program = base.program().clone();
        program.append(suffix);
        self.execute(&program)
    }
}

/// Program shared by every sample of a dataset, with its layers encoded to
/// JSON once.
#[derive(Debug, Clone)]
pub struct PreparedProgram {
    program: Program,
    encoded_layers: Vec<u8>,
}

impl PreparedProgram {
    /// Encodes the layers of `program`.
    pub fn new(program: Program) -> Result<Self, QdynError> {
        let mut encoded_layers = Vec::new();
        for (index, layer) in program.layers().iter().enumerate() {
            if index > 0 {
                encoded_layers.push(b',');
            }
            serde_json::to_writer(&mut encoded_layers, layer)
                .map_err(|err| QdynError::invariant("program-json", err.to_string()))?;
        }
        Ok(Self {
            program,
            encoded_layers,
        })
    }

    /// The base program.
    pub fn program(&self) -> &Program {
        &self.program
    }

    /// Writes the JSON of `base + suffix`, byte-identical to serializing the
    /// combined program.
    pub fn write_json<W: Write + ?Sized>(&self, suffix: &Program, out: &mut W) -> Result<(), QdynError> {
        let write_err = |err: io::Error| QdynError::invariant("program-write", err.to_string());
        write!(out, "{{\"total_sites\":{},\"layers\":[", self.program.total_sites())
            .map_err(write_err)?;
        out.write_all(&self.encoded_layers).map_err(write_err)?;
        let mut first = self.encoded_layers.is_empty();
        for layer in suffix.layers() {
            if !first {
                out.write_all(b",").map_err(write_err)?;
            }
            first = false;
            serde_json::to_writer(&mut *out, layer)
                .map_err(|err| QdynError::invariant("program-json", err.to_string()))?;
        }
        out.write_all(b"]}").map_err(write_err)
    }
}

/// External engine invocation read from the command line or a run config.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Program to spawn once per sample.
    #[serde(default)]
    pub command: String,
    /// Extra arguments passed verbatim.
    #[serde(default)]
    pub args: Vec<String>,
}

/// Spawns the configured command per sample, writing the program as JSON to its
/// stdin and reading one bit-string from its stdout.
#[derive(Debug, Clone)]
pub struct CommandExecutor {
    config: EngineConfig,
}

impl CommandExecutor {
    /// Validates the engine configuration.
    pub fn new(config: EngineConfig) -> Result<Self, QdynError> {
        if config.command.trim().is_empty() {
            return Err(QdynError::Configuration(
                ErrorInfo::new("engine-command", "no execution engine command configured")
                    .with_hint("pass --engine or set engine.command in the run config"),
            ));
        }
        Ok(Self { config })
    }

    fn execution_error(&self, code: &str, message: impl Into<String>) -> QdynError {
        QdynError::Execution(
            ErrorInfo::new(code, message).with_context("command", self.config.command.clone()),
        )
    }
}

impl CommandExecutor {
    fn run<F>(&self, sites: usize, feed: F) -> Result<String, QdynError>
    where
        F: FnOnce(&mut dyn Write) -> Result<(), QdynError>,
    {
        let mut child = Command::new(&self.config.command)
            .args(&self.config.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|err| self.execution_error("engine-spawn", err.to_string()))?;
        if let Some(stdin) = child.stdin.take() {
            let mut stdin = io::BufWriter::new(stdin);
            feed(&mut stdin).map_err(|err| match err {
                QdynError::Invariant(info) => self.execution_error("engine-stdin", info.message),
                other => other,
            })?;
            stdin
                .flush()
                .map_err(|err| self.execution_error("engine-stdin", err.to_string()))?;
        }
        let output = child
            .wait_with_output()
            .map_err(|err| self.execution_error("engine-wait", err.to_string()))?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(QdynError::Execution(
                ErrorInfo::new("engine-status", format!("engine exited with {}", output.status))
                    .with_context("command", self.config.command.clone())
                    .with_context("stderr", stderr.trim().to_string()),
            ));
        }
        let stdout = String::from_utf8(output.stdout)
            .map_err(|err| self.execution_error("engine-utf8", err.to_string()))?;
        let outcome = stdout.trim().to_string();
        validate_outcome(&outcome, sites)?;
        Ok(outcome)
    }
}

impl Executor for CommandExecutor {
    fn execute(&self, program: &Program) -> Result<String, QdynError> {
        let payload = serde_json::to_vec(program)
            .map_err(|err| QdynError::invariant("program-json", err.to_string()))?;
        self.run(program.total_sites(), |stdin| {
            stdin
                .write_all(&payload)
                .map_err(|err| QdynError::invariant("program-write", err.to_string()))
        })
    }

    fn execute_prepared(
        &self,
        base: &PreparedProgram,
        suffix: &Program,
    ) -> Result<String, QdynError> {
        self.run(base.program().total_sites(), |stdin| {
            base.write_json(suffix, stdin)
        })
    }
}

/// Checks that an outcome is exactly `sites` characters of `0`/`1`.
pub fn validate_outcome(outcome: &str, sites: usize) -> Result<(), QdynError> {
    if outcome.len() != sites {
        return Err(QdynError::Execution(
            ErrorInfo::new("outcome-length", "outcome length differs from the site count")
                .with_context("expected", sites.to_string())
                .with_context("actual", outcome.len().to_string()),
        ));
    }
    if let Some(bad) = outcome.chars().find(|c| *c != '0' && *c != '1') {
        return Err(QdynError::Execution(
            ErrorInfo::new("outcome-alphabet", "outcome must contain only 0 and 1")
                .with_context("character", bad.to_string()),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use qdyn_chain::Operation;

    #[test]
    fn outcome_validation() {
        assert!(validate_outcome("0101", 4).is_ok());
        let err = validate_outcome("010", 4).unwrap_err();
        assert_eq!(err.info().code, "outcome-length");
        let err = validate_outcome("01a1", 4).unwrap_err();
        assert_eq!(err.info().code, "outcome-alphabet");
    }

    #[test]
    fn prepared_encoding_matches_full_serialization() {
        let mut base = Program::new(3);
        base.push_layer(vec![Operation::Initialize {
            amplitudes: vec![0.0, 0.5, 0.5, 0.0, 0.5, 0.0, 0.0, 0.5],
        }]);
        base.push_layer(vec![Operation::Cz { control: 0, target: 2 }]);
        let mut suffix = Program::new(3);
        suffix.push_rotation(0.25, 1.0, 0.5);
        suffix.push_barrier();
        suffix.push_measurement();

        let prepared = PreparedProgram::new(base.clone()).unwrap();
        let mut streamed = Vec::new();
        prepared.write_json(&suffix, &mut streamed).unwrap();
        let mut combined = base;
        combined.append(&suffix);
        assert_eq!(streamed, serde_json::to_vec(&combined).unwrap());
    }

    #[test]
    fn prepared_encoding_handles_empty_parts() {
        let empty = PreparedProgram::new(Program::new(2)).unwrap();
        let mut streamed = Vec::new();
        empty.write_json(&Program::new(2), &mut streamed).unwrap();
        assert_eq!(streamed, serde_json::to_vec(&Program::new(2)).unwrap());

        let suffix = Program::new(2).with_measurement();
        let mut streamed = Vec::new();
        empty.write_json(&suffix, &mut streamed).unwrap();
        assert_eq!(streamed, serde_json::to_vec(&suffix).unwrap());
    }

    #[test]
    fn empty_command_is_rejected() {
        let err = CommandExecutor::new(EngineConfig::default()).unwrap_err();
        assert!(matches!(err, QdynError::Configuration(_)));
    }
}
