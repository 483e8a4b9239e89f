//! Random measurement bases confined to one octant of `(theta, phi, lambda)`.

mod angles;
mod basis;

pub use angles::{in_octant, octant_transform, AngleSampler, BasisAngles};
pub use basis::Basis;
