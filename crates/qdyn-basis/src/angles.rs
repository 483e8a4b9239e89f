use std::f64::consts::{FRAC_PI_2, PI};

use qdyn_core::RngHandle;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Rotation angles of a `U(theta, phi, lambda)` basis change.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BasisAngles {
    /// Polar angle in `[0, pi]`.
    pub theta: f64,
    /// Azimuthal angle in `[0, 2pi)`.
    pub phi: f64,
    /// Second azimuthal angle in `[0, 2pi)`.
    pub lambda: f64,
}

/// Maps three uniform draws in `[0, 1)` to full-range angles.
///
/// `theta = arccos(2u - 1)` makes the polar direction uniform on the sphere.
pub fn octant_transform(u: f64, v: f64, w: f64) -> BasisAngles {
    BasisAngles {
        theta: (2.0 * u - 1.0).acos(),
        phi: 2.0 * PI * v,
        lambda: 2.0 * PI * w,
    }
}

/// Acceptance predicate: every angle lies in `[0, pi/2]`.
pub fn in_octant(angles: &BasisAngles) -> bool {
    [angles.theta, angles.phi, angles.lambda]
        .iter()
        .all(|angle| (0.0..=FRAC_PI_2).contains(angle))
}

/// Rejection sampler confining basis angles to one octant.
///
/// The acceptance probability is `1/2 * 1/4 * 1/4 = 1/32`, so a sample costs
/// about 32 trials on average. The loop retries until acceptance and has no cap.
#[derive(Debug, Clone)]
pub struct AngleSampler {
    rng: RngHandle,
}

impl AngleSampler {
    /// Wraps an explicitly owned generator.
    pub fn new(rng: RngHandle) -> Self {
        Self { rng }
    }

    /// Convenience constructor seeding the generator directly.
    pub fn from_seed(seed: u64) -> Self {
        Self::new(RngHandle::from_seed(seed))
    }

    /// Draws one accepted sample.
    pub fn sample_one(&mut self) -> BasisAngles {
        self.sample_counted().0
    }

    /// Draws one accepted sample and reports how many trials it took.
    pub fn sample_counted(&mut self) -> (BasisAngles, u64) {
        let mut trials = 0u64;
        loop {
            trials += 1;
            let u: f64 = self.rng.gen();
            let v: f64 = self.rng.gen();
            let w: f64 = self.rng.gen();
            let angles = octant_transform(u, v, w);
            if in_octant(&angles) {
                return (angles, trials);
            }
        }
    }

    /// Draws `n` independent samples up front.
    pub fn sample_batch(&mut self, n: usize) -> Vec<BasisAngles> {
        (0..n).map(|_| self.sample_one()).collect()
    }
}
