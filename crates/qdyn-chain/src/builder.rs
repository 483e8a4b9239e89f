use qdyn_core::{ErrorInfo, QdynError};
use tracing::debug;

use crate::chain::{Chain, Layer, Pattern};
use crate::codec::rebuild_executable;
use crate::cycle::PatternCycle;
use crate::gates::GateKind;
use crate::program::{Operation, Program};
use crate::sampler::SiteGateSampler;

/// Knobs for [`ChainBuilder::grow`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GrowOptions {
    /// Record a barrier hint after every increment.
    pub barrier: bool,
    /// Forbid each site from repeating its gate of the preceding single-site layer.
    pub track_exclusion: bool,
}

impl Default for GrowOptions {
    fn default() -> Self {
        Self {
            barrier: false,
            track_exclusion: true,
        }
    }
}

/// Grows a [`Chain`] by alternating random single-site layers with
/// pattern-driven interaction layers.
///
/// The builder keeps the executable program in step with the chain while it
/// grows. Only the chain is ever persisted; the program is recomputed from
/// stored layers by [`rebuild_executable`] after a load.
#[derive(Debug, Clone)]
pub struct ChainBuilder {
    chain: Chain,
    cycle: PatternCycle,
    sampler: SiteGateSampler,
    program: Program,
}

impl ChainBuilder {
    /// Starts an empty chain.
    pub fn new(
        total_sites: usize,
        patterns: Vec<Pattern>,
        sampler: SiteGateSampler,
    ) -> Result<Self, QdynError> {
        let chain = Chain::new(total_sites, patterns)?;
        let cycle = PatternCycle::new(chain.pattern_cursor, chain.patterns.len())?;
        Ok(Self {
            program: Program::new(total_sites),
            chain,
            cycle,
            sampler,
        })
    }

    /// Resumes growth of a stored chain.
    ///
    /// The chain must end on an increment boundary: an interaction layer, a
    /// reset layer, or no layer at all.
    pub fn from_chain(mut chain: Chain, sampler: SiteGateSampler) -> Result<Self, QdynError> {
        if let Some(last) = chain.layers.last() {
            let reset = (0..chain.total_sites).all(|site| last.gate(site) == Some(GateKind::Reset));
            if !last.is_interaction() && !reset {
                return Err(QdynError::Configuration(
                    ErrorInfo::new(
                        "resume-mid-increment",
                        "chain ends on a single-site layer without its interaction layer",
                    )
                    .with_context("layers", chain.layers.len().to_string())
                    .with_hint("truncate to an even layer count after the reset layer"),
                ));
            }
        }
        chain.pattern_cursor = chain.completed_increments() % chain.patterns.len();
        let cycle = PatternCycle::new(chain.pattern_cursor, chain.patterns.len())?;
        let program = rebuild_executable(&chain)?;
        Ok(Self {
            chain,
            cycle,
            sampler,
            program,
        })
    }

    /// Read access to the chain being built.
    pub fn chain(&self) -> &Chain {
        &self.chain
    }

    /// Releases the chain, dropping the live program.
    pub fn into_chain(self) -> Chain {
        self.chain
    }

    /// Appends a layer carrying `gate` on every site.
    pub fn append_uniform(&mut self, gate: GateKind) -> Result<(), QdynError> {
        let labels = vec![gate; self.chain.total_sites];
        self.push_single_site_layer(&labels)
    }

    /// Runs `increments` growth steps, each a single-site layer drawn from
    /// `gate_set` followed by the next pattern's interaction layer.
    pub fn grow(
        &mut self,
        gate_set: &[GateKind],
        increments: usize,
        options: GrowOptions,
    ) -> Result<(), QdynError> {
        let sites = self.chain.total_sites;
        for _ in 0..increments {
            let excluded = if options.track_exclusion {
                self.lookback_labels()
            } else {
                None
            };
            let labels = self.sampler.sample(gate_set, sites, excluded.as_deref())?;
            self.push_single_site_layer(&labels)?;

            let pattern_index = self.cycle.next_index();
            self.chain.pattern_cursor = self.cycle.cursor();
            self.push_interaction_layer(pattern_index)?;

            if options.barrier {
                self.chain.barriers.push(self.chain.layers.len());
                self.program.push_barrier();
            }
            debug!(
                pattern = pattern_index,
                layers = self.chain.layers.len(),
                "chain increment"
            );
        }
        Ok(())
    }

    /// Execution-ready projection of the chain. The builder is left untouched.
    pub fn descriptor(&self, include_measurement: bool) -> Program {
        if include_measurement {
            self.program.with_measurement()
        } else {
            self.program.clone()
        }
    }

    /// Per-site gates of the layer at `len - 3` once the new single-site layer is
    /// appended: the previous single-site layer, skipping the interaction layer.
    fn lookback_labels(&self) -> Option<Vec<Option<GateKind>>> {
        let tracked = self.chain.layers.len().checked_sub(2)?;
        let layer = &self.chain.layers[tracked];
        Some((0..self.chain.total_sites).map(|site| layer.gate(site)).collect())
    }

    fn push_single_site_layer(&mut self, labels: &[GateKind]) -> Result<(), QdynError> {
        let mut layer = Layer::empty(self.chain.total_sites);
        let mut ops = Vec::with_capacity(labels.len());
        for (site, gate) in labels.iter().copied().enumerate() {
            layer.write_gate(site, gate)?;
            ops.push(gate.operation(site));
        }
        self.chain.layers.push(layer);
        self.program.push_layer(ops);
        Ok(())
    }

    fn push_interaction_layer(&mut self, pattern_index: usize) -> Result<(), QdynError> {
        let pattern = self.chain.patterns.get(pattern_index).ok_or_else(|| {
            QdynError::Invariant(
                ErrorInfo::new("cursor-range", "pattern cursor outside the pattern list")
                    .with_context("cursor", pattern_index.to_string()),
            )
        })?;
        let mut layer = Layer::empty(self.chain.total_sites);
        let mut ops = Vec::with_capacity(pattern.pairs().len());
        for &(control, target) in pattern.pairs() {
            layer.write_marker(control, pattern_index)?;
            layer.write_marker(target, pattern_index)?;
            ops.push(Operation::Cz { control, target });
        }
        self.chain.layers.push(layer);
        self.program.push_layer(ops);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::Slot;

    fn two_pair_builder(seed: u64) -> ChainBuilder {
        let pattern = Pattern::from_arrays(&[[0, 1], [2, 3]]).unwrap();
        ChainBuilder::new(4, vec![pattern], SiteGateSampler::from_seed(seed)).unwrap()
    }

    #[test]
    fn reset_then_two_increments_gives_five_layers() {
        let gates = [GateKind::X, GateKind::Y];
        let mut builder = two_pair_builder(17);
        builder.append_uniform(GateKind::Reset).unwrap();
        builder.grow(&gates, 2, GrowOptions::default()).unwrap();

        let layers = builder.chain().layers();
        assert_eq!(layers.len(), 5);
        assert!(layers[0].slots().iter().all(|s| *s == Slot::Gate(GateKind::Reset)));
        assert!(layers[2].slots().iter().all(|s| *s == Slot::Marker(0)));
        assert!(layers[4].slots().iter().all(|s| *s == Slot::Marker(0)));
        for site in 0..4 {
            let first = layers[1].gate(site).unwrap();
            let second = layers[3].gate(site).unwrap();
            assert_ne!(first, second, "site {site} repeated its gate");
        }
    }

    #[test]
    fn descriptor_is_read_only() {
        let mut builder = two_pair_builder(2);
        builder.grow(&[GateKind::T, GateKind::H], 3, GrowOptions::default()).unwrap();
        let before = builder.chain().clone();
        let measured = builder.descriptor(true);
        let bare = builder.descriptor(false);
        assert_eq!(builder.chain(), &before);
        assert_eq!(measured.len(), bare.len() + 1);
        assert_eq!(measured.measured_sites(), 4);
        assert_eq!(bare.measured_sites(), 0);
    }

    #[test]
    fn barrier_is_recorded_after_each_increment() {
        let mut builder = two_pair_builder(2);
        let options = GrowOptions {
            barrier: true,
            track_exclusion: false,
        };
        builder.grow(&[GateKind::T], 2, options).unwrap();
        assert_eq!(builder.chain().barriers(), &[2, 4]);
        let program = builder.descriptor(false);
        assert_eq!(program.layers()[2], vec![Operation::Barrier]);
        assert_eq!(program.len(), 6);
    }

    #[test]
    fn resume_after_single_site_layer_is_rejected() {
        let mut builder = two_pair_builder(4);
        builder.append_uniform(GateKind::Reset).unwrap();
        builder.grow(&[GateKind::X, GateKind::Y], 1, GrowOptions::default()).unwrap();
        let mut chain = builder.into_chain();
        chain.truncate_layers(2);
        let err = ChainBuilder::from_chain(chain.clone(), SiteGateSampler::from_seed(1))
            .unwrap_err();
        assert!(matches!(err, QdynError::Configuration(_)));
        assert_eq!(err.info().code, "resume-mid-increment");

        chain.truncate_layers(1);
        assert!(ChainBuilder::from_chain(chain, SiteGateSampler::from_seed(1)).is_ok());
    }

    #[test]
    fn single_gate_with_tracking_fails_once_lookback_exists() {
        let mut builder = two_pair_builder(2);
        builder.grow(&[GateKind::T], 1, GrowOptions::default()).unwrap();
        let err = builder
            .grow(&[GateKind::T], 1, GrowOptions::default())
            .unwrap_err();
        assert!(matches!(err, QdynError::Configuration(_)));
    }
}
