#![deny(missing_docs)]
//! Core error taxonomy, seeding policy and schema types shared by every qdyn crate.

pub mod errors;
pub mod provenance;
pub mod rng;

pub use errors::{ErrorInfo, QdynError};
pub use provenance::SchemaVersion;
pub use rng::{derive_substream_seed, entropy_seed, RngHandle, ANGLE_SUBSTREAM, GATE_SUBSTREAM};
