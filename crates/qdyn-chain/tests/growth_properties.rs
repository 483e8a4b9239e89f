mod common;

use std::collections::BTreeSet;

use proptest::prelude::*;
use qdyn_chain::{ChainBuilder, GateKind, GrowOptions, Pattern, SiteGateSampler, Slot};

use common::{grown_chain, ladder_patterns, CHAOTIC_GATES};

/// Interaction layers sit at even positions after the reset layer.
fn interaction_layers(builder: &ChainBuilder) -> Vec<usize> {
    (2..builder.chain().len()).step_by(2).collect()
}

#[test]
fn same_seed_builds_identical_chains() {
    let a = grown_chain(2024, 9, false);
    let b = grown_chain(2024, 9, false);
    assert_eq!(a.chain(), b.chain());
    let c = grown_chain(2025, 9, false);
    assert_ne!(a.chain().layers(), c.chain().layers());
}

#[test]
fn cursor_resumes_where_growth_stopped() {
    let builder = grown_chain(1, 4, false);
    assert_eq!(builder.chain().pattern_cursor(), 4 % 3);

    let chain = builder.chain().clone();
    let mut resumed = ChainBuilder::from_chain(chain, SiteGateSampler::from_seed(8)).unwrap();
    resumed
        .grow(&CHAOTIC_GATES, 1, GrowOptions::default())
        .unwrap();
    let last = resumed.chain().layers().last().unwrap();
    assert_eq!(last.marker(), Some(1));
}

#[test]
fn resumed_builder_extends_the_replayed_program() {
    let builder = grown_chain(31, 3, false);
    let mut resumed =
        ChainBuilder::from_chain(builder.chain().clone(), SiteGateSampler::from_seed(4)).unwrap();
    assert_eq!(resumed.descriptor(false), builder.descriptor(false));
    resumed
        .grow(&CHAOTIC_GATES, 2, GrowOptions::default())
        .unwrap();
    let extended = resumed.descriptor(false);
    assert_eq!(
        &extended.layers()[..builder.descriptor(false).len()],
        builder.descriptor(false).layers()
    );
}

#[test]
fn empty_gate_set_is_rejected() {
    let mut builder =
        ChainBuilder::new(6, ladder_patterns(), SiteGateSampler::from_seed(0)).unwrap();
    let err = builder.grow(&[], 1, GrowOptions::default()).unwrap_err();
    assert!(matches!(err, qdyn_core::QdynError::Configuration(_)));
    assert!(builder.chain().is_empty());
}

#[test]
fn zero_increments_leave_chain_untouched() {
    let mut builder =
        ChainBuilder::new(6, ladder_patterns(), SiteGateSampler::from_seed(0)).unwrap();
    builder
        .grow(&CHAOTIC_GATES, 0, GrowOptions::default())
        .unwrap();
    assert!(builder.chain().is_empty());
    assert!(builder.descriptor(false).is_empty());
    assert_eq!(builder.descriptor(true).measured_sites(), 6);
}

#[test]
fn invalid_construction_is_configuration_error() {
    let sampler = SiteGateSampler::from_seed(0);
    assert!(ChainBuilder::new(0, ladder_patterns(), sampler.clone()).is_err());
    assert!(ChainBuilder::new(4, Vec::new(), sampler.clone()).is_err());
    assert!(ChainBuilder::new(
        4,
        vec![Pattern::from_arrays(&[[0, 4]]).unwrap()],
        sampler
    )
    .is_err());
}

proptest! {
    #[test]
    fn increment_i_uses_pattern_i_mod_p(seed in any::<u64>(), increments in 0usize..20) {
        let mut builder = ChainBuilder::new(6, ladder_patterns(), SiteGateSampler::from_seed(seed)).unwrap();
        builder.grow(&CHAOTIC_GATES, increments, GrowOptions::default()).unwrap();
        let period = builder.chain().patterns().len();
        for i in 0..increments {
            let layer = &builder.chain().layers()[2 * i + 1];
            prop_assert_eq!(layer.marker(), Some(i % period));
        }
        prop_assert_eq!(builder.chain().pattern_cursor(), increments % period);
    }

    #[test]
    fn tracked_sites_never_repeat_previous_gate(seed in any::<u64>(), depth in 2usize..15) {
        let builder = grown_chain(seed, depth, false);
        let layers = builder.chain().layers();
        // layer 1 is the untracked increment; tracked single-site layers follow every two layers
        for index in (3..layers.len()).step_by(2) {
            for site in 0..builder.chain().total_sites() {
                prop_assert_ne!(layers[index].gate(site), layers[index - 2].gate(site));
            }
        }
    }

    #[test]
    fn interaction_layers_mark_exactly_their_pattern(seed in any::<u64>(), depth in 1usize..10) {
        let builder = grown_chain(seed, depth, false);
        let chain = builder.chain();
        for index in interaction_layers(&builder) {
            let layer = &chain.layers()[index];
            let marker = layer.marker().unwrap();
            let expected = chain.patterns()[marker].sites();
            let marked: BTreeSet<usize> = layer
                .slots()
                .iter()
                .enumerate()
                .filter(|(_, slot)| !slot.is_empty())
                .map(|(site, _)| site)
                .collect();
            prop_assert_eq!(&marked, &expected);
            prop_assert!(layer.slots().iter().all(|slot| matches!(slot, Slot::Empty) || *slot == Slot::Marker(marker)));
        }
    }

    #[test]
    fn single_site_layers_fill_every_site(seed in any::<u64>(), depth in 1usize..10) {
        let builder = grown_chain(seed, depth, false);
        for layer in builder.chain().layers().iter().skip(1).step_by(2) {
            prop_assert!(layer
                .slots()
                .iter()
                .all(|slot| matches!(slot, Slot::Gate(g) if CHAOTIC_GATES.contains(g))));
        }
    }
}

#[test]
fn reset_layer_is_uniform() {
    let builder = grown_chain(0, 1, false);
    assert!(builder.chain().layers()[0]
        .slots()
        .iter()
        .all(|slot| *slot == Slot::Gate(GateKind::Reset)));
}
