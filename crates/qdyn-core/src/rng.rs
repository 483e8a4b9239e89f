//! Seeded generator handle and substream derivation.

use std::hash::Hasher;

use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use siphasher::sip::SipHasher13;

/// Substream used by the per-site gate sampler of a chain.
pub const GATE_SUBSTREAM: u64 = 0;
/// Substream used by the measurement basis angle sampler.
pub const ANGLE_SUBSTREAM: u64 = 1;

/// Explicitly owned `StdRng` used by every sampler.
///
/// Nothing in qdyn reads a global or thread-local generator. A run has one
/// master seed, given by the caller or drawn once by [`entropy_seed`], and each
/// sampler gets its own substream of it (see [`derive_substream_seed`]).
#[derive(Debug, Clone)]
pub struct RngHandle {
    rng: StdRng,
}

impl RngHandle {
    /// Seeds the handle directly.
    pub fn from_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Handle for substream `substream` of `master_seed`.
    pub fn substream(master_seed: u64, substream: u64) -> Self {
        Self::from_seed(derive_substream_seed(master_seed, substream))
    }
}

impl RngCore for RngHandle {
    fn next_u32(&mut self) -> u32 {
        self.rng.next_u32()
    }

    fn next_u64(&mut self) -> u64 {
        self.rng.next_u64()
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        self.rng.fill_bytes(dest)
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
        self.rng.try_fill_bytes(dest)
    }
}

/// SipHash-1-3 with zero keys over `(master_seed, substream)`; stable across
/// platforms.
pub fn derive_substream_seed(master_seed: u64, substream: u64) -> u64 {
    let mut hasher = SipHasher13::new_with_keys(0, 0);
    hasher.write_u64(master_seed);
    hasher.write_u64(substream);
    hasher.finish()
}

/// Draws a fresh master seed from OS entropy.
pub fn entropy_seed() -> u64 {
    StdRng::from_entropy().next_u64()
}
