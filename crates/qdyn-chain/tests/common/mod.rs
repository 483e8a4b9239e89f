#![allow(dead_code)]

use qdyn_chain::{ChainBuilder, GateKind, GrowOptions, Pattern, SiteGateSampler};

pub const CHAOTIC_GATES: [GateKind; 3] = [GateKind::Sx, GateKind::Sy, GateKind::T];

pub fn ladder_patterns() -> Vec<Pattern> {
    vec![
        Pattern::from_arrays(&[[0, 1], [2, 3], [4, 5]]).unwrap(),
        Pattern::from_arrays(&[[1, 2], [3, 4]]).unwrap(),
        Pattern::from_arrays(&[[5, 0]]).unwrap(),
    ]
}

/// Reset layer, one untracked increment, then `depth - 1` tracked increments.
pub fn grown_chain(seed: u64, depth: usize, barrier: bool) -> ChainBuilder {
    let mut builder =
        ChainBuilder::new(6, ladder_patterns(), SiteGateSampler::from_seed(seed)).unwrap();
    builder.append_uniform(GateKind::Reset).unwrap();
    builder
        .grow(
            &CHAOTIC_GATES,
            1,
            GrowOptions {
                barrier,
                track_exclusion: false,
            },
        )
        .unwrap();
    builder
        .grow(
            &CHAOTIC_GATES,
            depth.saturating_sub(1),
            GrowOptions {
                barrier,
                track_exclusion: true,
            },
        )
        .unwrap();
    builder
}
