use qdyn_core::{ErrorInfo, QdynError, RngHandle};
use rand::Rng;

use crate::gates::GateKind;

/// Draws one gate per site for a single-site layer.
#[derive(Debug, Clone)]
pub struct SiteGateSampler {
    rng: RngHandle,
}

impl SiteGateSampler {
    /// Wraps an explicitly owned generator.
    pub fn new(rng: RngHandle) -> Self {
        Self { rng }
    }

    /// Convenience constructor seeding the generator directly.
    pub fn from_seed(seed: u64) -> Self {
        Self::new(RngHandle::from_seed(seed))
    }

    /// Chooses a gate for each of `sites` sites uniformly from `gate_set`.
    ///
    /// When `excluded` is given, the gate recorded for a site there is removed from
    /// that site's candidates. A single remaining candidate is returned without
    /// consuming randomness; none remaining is a configuration error.
    pub fn sample(
        &mut self,
        gate_set: &[GateKind],
        sites: usize,
        excluded: Option<&[Option<GateKind>]>,
    ) -> Result<Vec<GateKind>, QdynError> {
        if let Some(excluded) = excluded {
            if excluded.len() != sites {
                return Err(QdynError::Invariant(
                    ErrorInfo::new("exclusion-width", "exclusion list does not cover every site")
                        .with_context("sites", sites.to_string())
                        .with_context("excluded", excluded.len().to_string()),
                ));
            }
        }

        let mut labels = Vec::with_capacity(sites);
        for site in 0..sites {
            let banned = excluded.and_then(|excluded| excluded[site]);
            let candidates: Vec<GateKind> = gate_set
                .iter()
                .copied()
                .filter(|gate| Some(*gate) != banned)
                .collect();
            let chosen = match candidates.len() {
                0 => {
                    let mut info =
                        ErrorInfo::new("no-candidates", "no gate left to choose for site")
                            .with_context("site", site.to_string())
                            .with_context("gate_set", gate_set.len().to_string());
                    if let Some(gate) = banned {
                        info = info.with_context("excluded", gate.label());
                    }
                    return Err(QdynError::Configuration(info));
                }
                1 => candidates[0],
                n => candidates[self.rng.gen_range(0..n)],
            };
            labels.push(chosen);
        }
        Ok(labels)
    }
}
