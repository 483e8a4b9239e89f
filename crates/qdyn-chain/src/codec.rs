use std::fs;
use std::path::Path;

use qdyn_core::{ErrorInfo, QdynError, SchemaVersion};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::chain::{untouched_sites, Chain, Layer, Pattern, Slot};
use crate::hash::canonical_hash;
use crate::program::{Operation, Program};

/// Schema written into every chain descriptor.
pub const CHAIN_SCHEMA: SchemaVersion = SchemaVersion::new(1, 0, 0);

/// On-disk encodings of a chain descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChainFormat {
    /// Compact `bincode` encoding.
    Binary,
    /// Pretty printed JSON.
    Json,
}

impl ChainFormat {
    /// JSON for a `.json` extension, binary for anything else.
    pub fn for_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => ChainFormat::Json,
            _ => ChainFormat::Binary,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct StoredChain {
    schema_version: SchemaVersion,
    total_sites: usize,
    patterns: Vec<Pattern>,
    pattern_cursor: usize,
    layers: Vec<Layer>,
    single_sites: Vec<Vec<usize>>,
    #[serde(default)]
    barriers: Vec<usize>,
}

impl StoredChain {
    fn from_chain(chain: &Chain) -> Self {
        Self {
            schema_version: CHAIN_SCHEMA,
            total_sites: chain.total_sites,
            patterns: chain.patterns.clone(),
            pattern_cursor: chain.pattern_cursor,
            layers: chain.layers.clone(),
            single_sites: chain.single_sites.clone(),
            barriers: chain.barriers.clone(),
        }
    }

    fn into_chain(self, truncate: Option<usize>) -> Result<Chain, QdynError> {
        if !CHAIN_SCHEMA.reads(&self.schema_version) {
            return Err(QdynError::CorruptData(
                ErrorInfo::new("schema-mismatch", "unsupported chain schema version")
                    .with_context("stored", self.schema_version.to_string())
                    .with_context("supported", CHAIN_SCHEMA.to_string()),
            ));
        }
        if self.total_sites == 0 {
            return Err(QdynError::Configuration(
                ErrorInfo::new("site-count", "stored chain has zero sites")
                    .with_context("layers", self.layers.len().to_string()),
            ));
        }
        let mut chain = Chain {
            total_sites: self.total_sites,
            patterns: self.patterns,
            pattern_cursor: self.pattern_cursor,
            layers: self.layers,
            single_sites: self.single_sites,
            barriers: self.barriers,
        };
        validate(&chain)?;
        if let Some(count) = truncate {
            chain.truncate_layers(count);
        }
        Ok(chain)
    }
}

fn corrupt(code: &str, message: &str) -> ErrorInfo {
    ErrorInfo::new(code, message)
}

/// Structural consistency checks for a freshly decoded chain.
fn validate(chain: &Chain) -> Result<(), QdynError> {
    if chain.patterns.is_empty() || chain.pattern_cursor >= chain.patterns.len() {
        return Err(QdynError::CorruptData(
            corrupt("cursor-range", "pattern cursor outside the stored pattern list")
                .with_context("cursor", chain.pattern_cursor.to_string())
                .with_context("patterns", chain.patterns.len().to_string()),
        ));
    }
    for (index, pattern) in chain.patterns.iter().enumerate() {
        pattern
            .check_disjoint()
            .map_err(|info| QdynError::CorruptData(info.with_context("pattern", index.to_string())))?;
        if pattern.max_site().is_some_and(|site| site >= chain.total_sites) {
            return Err(QdynError::CorruptData(
                corrupt("pattern-site-range", "pattern references a missing site")
                    .with_context("pattern", index.to_string()),
            ));
        }
    }
    if chain.single_sites != untouched_sites(chain.total_sites, &chain.patterns) {
        return Err(QdynError::CorruptData(corrupt(
            "single-sites",
            "stored single-site lists disagree with the patterns",
        )));
    }
    for (index, layer) in chain.layers.iter().enumerate() {
        validate_layer(chain, index, layer)?;
    }
    validate_pattern_order(chain)?;
    let ordered = chain.barriers.windows(2).all(|pair| pair[0] <= pair[1]);
    let in_range = chain.barriers.iter().all(|&b| b <= chain.layers.len());
    if !ordered || !in_range {
        return Err(QdynError::CorruptData(corrupt(
            "barriers",
            "barrier positions must be ordered and within the layer history",
        )));
    }
    Ok(())
}

fn validate_layer(chain: &Chain, index: usize, layer: &Layer) -> Result<(), QdynError> {
    let layer_error = |code: &str, message: &str| {
        QdynError::CorruptData(corrupt(code, message).with_context("layer", index.to_string()))
    };
    if layer.width() != chain.total_sites {
        return Err(layer_error("layer-width", "layer width differs from the site count"));
    }
    let Some(marker) = layer.marker() else {
        let gates = layer
            .slots()
            .iter()
            .filter(|slot| matches!(slot, Slot::Gate(_)))
            .count();
        if gates != 0 && gates != layer.width() {
            return Err(layer_error(
                "partial-layer",
                "single-site layer leaves sites without a gate",
            ));
        }
        return Ok(());
    };
    let pattern = chain
        .patterns
        .get(marker)
        .ok_or_else(|| layer_error("marker-range", "marker references a missing pattern"))?;
    let expected = pattern.sites();
    for (site, slot) in layer.slots().iter().enumerate() {
        match slot {
            Slot::Marker(tag) if *tag != marker => {
                return Err(layer_error("mixed-markers", "layer carries markers of two patterns"));
            }
            Slot::Marker(_) if !expected.contains(&site) => {
                return Err(layer_error("marker-site", "marker on a site outside its pattern"));
            }
            Slot::Empty if expected.contains(&site) => {
                return Err(layer_error("marker-missing", "pattern site left unmarked"));
            }
            Slot::Gate(_) => {
                return Err(layer_error("marker-layer-gate", "interaction layer carries a gate"));
            }
            _ => {}
        }
    }
    Ok(())
}

/// Interaction layer `i` must come from pattern `i mod P`, and the cursor must
/// point at the pattern of the next increment.
fn validate_pattern_order(chain: &Chain) -> Result<(), QdynError> {
    let period = chain.patterns.len();
    let mut increments = 0usize;
    for (index, layer) in chain.layers.iter().enumerate() {
        if !layer.is_interaction() {
            continue;
        }
        let expected = increments % period;
        let consistent = match layer.marker() {
            Some(marker) => marker == expected,
            None => chain.patterns[expected].pairs().is_empty(),
        };
        if !consistent {
            return Err(QdynError::CorruptData(
                corrupt("pattern-order", "interaction layer out of cyclic pattern order")
                    .with_context("layer", index.to_string())
                    .with_context("expected", expected.to_string()),
            ));
        }
        increments += 1;
    }
    if chain.pattern_cursor != increments % period {
        return Err(QdynError::CorruptData(
            corrupt("cursor-mismatch", "pattern cursor disagrees with the recorded increments")
                .with_context("cursor", chain.pattern_cursor.to_string())
                .with_context("increments", increments.to_string()),
        ));
    }
    Ok(())
}

/// Serializes a chain in the requested encoding.
pub fn write_chain(chain: &Chain, format: ChainFormat) -> Result<Vec<u8>, QdynError> {
    match format {
        ChainFormat::Binary => chain_to_bytes(chain),
        ChainFormat::Json => chain_to_json(chain).map(String::into_bytes),
    }
}

/// Deserializes a chain, keeping at most `truncate` leading layers.
pub fn read_chain(
    bytes: &[u8],
    format: ChainFormat,
    truncate: Option<usize>,
) -> Result<Chain, QdynError> {
    match format {
        ChainFormat::Binary => chain_from_bytes(bytes, truncate),
        ChainFormat::Json => {
            let json = std::str::from_utf8(bytes)
                .map_err(|err| QdynError::corrupt("utf8-decode", err.to_string()))?;
            chain_from_json(json, truncate)
        }
    }
}

/// Serializes the chain to a compact binary representation using `bincode`.
pub fn chain_to_bytes(chain: &Chain) -> Result<Vec<u8>, QdynError> {
    bincode::serialize(&StoredChain::from_chain(chain))
        .map_err(|err| QdynError::Invariant(ErrorInfo::new("serialize-bytes", err.to_string())))
}

/// Restores a chain from its binary representation.
pub fn chain_from_bytes(bytes: &[u8], truncate: Option<usize>) -> Result<Chain, QdynError> {
    let stored: StoredChain = bincode::deserialize(bytes)
        .map_err(|err| QdynError::corrupt("deserialize-bytes", err.to_string()))?;
    stored.into_chain(truncate)
}

/// Serializes the chain to a JSON string.
pub fn chain_to_json(chain: &Chain) -> Result<String, QdynError> {
    serde_json::to_string_pretty(&StoredChain::from_chain(chain))
        .map_err(|err| QdynError::Invariant(ErrorInfo::new("serialize-json", err.to_string())))
}

/// Restores a chain from a JSON string.
pub fn chain_from_json(json: &str, truncate: Option<usize>) -> Result<Chain, QdynError> {
    let stored: StoredChain = serde_json::from_str(json)
        .map_err(|err| QdynError::corrupt("deserialize-json", err.to_string()))?;
    stored.into_chain(truncate)
}

/// Maps a signed layer count from the command line to a truncation request.
/// Zero keeps every layer.
pub fn truncation_from_signed(layers: i64) -> Result<Option<usize>, QdynError> {
    match layers {
        0 => Ok(None),
        n if n < 0 => Err(QdynError::Configuration(
            ErrorInfo::new("negative-truncation", "layer count must not be negative")
                .with_context("layers", n.to_string()),
        )),
        n => usize::try_from(n).map(Some).map_err(|err| {
            QdynError::configuration("truncation-range", err.to_string())
        }),
    }
}

/// Writes the chain to `path`, choosing the encoding from the extension.
pub fn save_chain(chain: &Chain, path: &Path) -> Result<(), QdynError> {
    let format = ChainFormat::for_path(path);
    let bytes = write_chain(chain, format)?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|err| QdynError::io("chain-mkdir", parent, &err))?;
    }
    fs::write(path, bytes).map_err(|err| QdynError::io("chain-write", path, &err))?;
    info!(
        path = %path.display(),
        layers = chain.len(),
        hash = %canonical_hash(chain),
        "chain saved"
    );
    Ok(())
}

/// Loads a chain from `path`, keeping at most `truncate` leading layers.
pub fn load_chain(path: &Path, truncate: Option<usize>) -> Result<Chain, QdynError> {
    let bytes = fs::read(path).map_err(|err| QdynError::io("chain-read", path, &err))?;
    let chain = read_chain(&bytes, ChainFormat::for_path(path), truncate)?;
    info!(
        path = %path.display(),
        layers = chain.len(),
        hash = %canonical_hash(&chain),
        "chain loaded"
    );
    Ok(chain)
}

/// Replays the stored layers into an executable program without any randomness.
///
/// An interaction layer emits its pattern's pairs; gate slots emit their gate in
/// site order. Recorded barriers are re-inserted after the layer they followed.
pub fn rebuild_executable(chain: &Chain) -> Result<Program, QdynError> {
    let mut program = Program::new(chain.total_sites);
    let mut barriers = chain.barriers.iter().copied().peekable();
    while barriers.next_if_eq(&0).is_some() {
        program.push_barrier();
    }
    for (index, layer) in chain.layers.iter().enumerate() {
        let mut ops = Vec::new();
        if let Some(marker) = layer.marker() {
            let pattern = chain.patterns.get(marker).ok_or_else(|| {
                QdynError::CorruptData(
                    corrupt("marker-range", "marker references a missing pattern")
                        .with_context("layer", index.to_string()),
                )
            })?;
            ops.extend(
                pattern
                    .pairs()
                    .iter()
                    .map(|&(control, target)| Operation::Cz { control, target }),
            );
        }
        for (site, slot) in layer.slots().iter().enumerate() {
            if let Slot::Gate(kind) = slot {
                ops.push(kind.operation(site));
            }
        }
        program.push_layer(ops);
        while barriers.next_if_eq(&(index + 1)).is_some() {
            program.push_barrier();
        }
    }
    Ok(program)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signed_truncation_rules() {
        assert_eq!(truncation_from_signed(0).unwrap(), None);
        assert_eq!(truncation_from_signed(3).unwrap(), Some(3));
        let err = truncation_from_signed(-1).unwrap_err();
        assert!(matches!(err, QdynError::Configuration(_)));
    }

    #[test]
    fn format_follows_extension() {
        assert_eq!(ChainFormat::for_path(Path::new("a/b.json")), ChainFormat::Json);
        assert_eq!(ChainFormat::for_path(Path::new("a/b.JSON")), ChainFormat::Json);
        assert_eq!(ChainFormat::for_path(Path::new("chain.bin")), ChainFormat::Binary);
        assert_eq!(ChainFormat::for_path(Path::new("chain")), ChainFormat::Binary);
    }
}
