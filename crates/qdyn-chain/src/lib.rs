#![deny(missing_docs)]

//! Layered chain generator for structured many-body dynamics.
//!
//! A [`ChainBuilder`] grows a [`Chain`] by alternating randomized single-site
//! layers with interaction layers taken cyclically from a fixed pattern list.
//! The chain is plain data: the codec persists it and replays it into the same
//! [`Program`] the builder produced, without touching any random generator.

mod builder;
mod chain;
mod codec;
mod cycle;
mod gates;
mod hash;
mod program;
mod sampler;

pub use builder::{ChainBuilder, GrowOptions};
pub use chain::{Chain, Layer, Pattern, Slot};
pub use codec::{
    chain_from_bytes, chain_from_json, chain_to_bytes, chain_to_json, load_chain, read_chain,
    rebuild_executable, save_chain, truncation_from_signed, write_chain, ChainFormat,
    CHAIN_SCHEMA,
};
pub use cycle::PatternCycle;
pub use gates::{parse_gate_set, GateKind, GATE_TABLE};
pub use hash::canonical_hash;
pub use program::{Operation, Program};
pub use sampler::SiteGateSampler;
