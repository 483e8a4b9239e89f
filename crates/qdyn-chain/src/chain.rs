use std::collections::BTreeSet;

use qdyn_core::{ErrorInfo, QdynError};
use serde::{Deserialize, Serialize};

use crate::gates::GateKind;

/// Content of one site within a layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Slot {
    /// Nothing recorded for the site.
    Empty,
    /// Single-site gate label.
    Gate(GateKind),
    /// Interaction marker tagged with the owning pattern index.
    Marker(usize),
}

impl Slot {
    /// Returns `true` for [`Slot::Empty`].
    pub fn is_empty(&self) -> bool {
        matches!(self, Slot::Empty)
    }
}

/// Ordered set of `(control, target)` site pairs applied together.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Pattern {
    pairs: Vec<(usize, usize)>,
}

impl Pattern {
    /// Builds a pattern, rejecting pairs that reuse a site.
    pub fn new(pairs: Vec<(usize, usize)>) -> Result<Self, QdynError> {
        let pattern = Self { pairs };
        pattern.check_disjoint().map_err(QdynError::Configuration)?;
        Ok(pattern)
    }

    /// Builds a pattern from `[control, target]` arrays.
    pub fn from_arrays(pairs: &[[usize; 2]]) -> Result<Self, QdynError> {
        Self::new(pairs.iter().map(|pair| (pair[0], pair[1])).collect())
    }

    /// Pairs in application order.
    pub fn pairs(&self) -> &[(usize, usize)] {
        &self.pairs
    }

    /// Returns `true` if any pair touches `site`.
    pub fn touches(&self, site: usize) -> bool {
        self.pairs
            .iter()
            .any(|&(control, target)| control == site || target == site)
    }

    /// Largest site index referenced, if any.
    pub fn max_site(&self) -> Option<usize> {
        self.pairs
            .iter()
            .map(|&(control, target)| control.max(target))
            .max()
    }

    /// Set of sites touched by the pattern.
    pub fn sites(&self) -> BTreeSet<usize> {
        self.pairs
            .iter()
            .flat_map(|&(control, target)| [control, target])
            .collect()
    }

    pub(crate) fn check_disjoint(&self) -> Result<(), ErrorInfo> {
        let mut seen = BTreeSet::new();
        for &(control, target) in &self.pairs {
            if control == target || !seen.insert(control) || !seen.insert(target) {
                return Err(ErrorInfo::new(
                    "pattern-overlap",
                    "a site appears more than once within one pattern",
                )
                .with_context("control", control.to_string())
                .with_context("target", target.to_string()));
            }
        }
        Ok(())
    }
}

/// One generation step's content across all sites.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Layer {
    slots: Vec<Slot>,
}

impl Layer {
    /// Creates a layer of `width` empty slots.
    pub fn empty(width: usize) -> Self {
        Self {
            slots: vec![Slot::Empty; width],
        }
    }

    /// Number of slots (one per site).
    pub fn width(&self) -> usize {
        self.slots.len()
    }

    /// All slots in site order.
    pub fn slots(&self) -> &[Slot] {
        &self.slots
    }

    /// Gate recorded at `site`, if that slot holds one.
    pub fn gate(&self, site: usize) -> Option<GateKind> {
        match self.slots.get(site) {
            Some(Slot::Gate(kind)) => Some(*kind),
            _ => None,
        }
    }

    /// First interaction marker found scanning sites in order.
    pub fn marker(&self) -> Option<usize> {
        self.slots.iter().find_map(|slot| match slot {
            Slot::Marker(pattern) => Some(*pattern),
            _ => None,
        })
    }

    /// Returns `true` when no slot holds a gate: the layer belongs to an
    /// interaction step, even if its pattern has no pairs.
    pub fn is_interaction(&self) -> bool {
        !self.slots.iter().any(|slot| matches!(slot, Slot::Gate(_)))
    }

    /// Writes a gate label into an empty slot.
    pub fn write_gate(&mut self, site: usize, kind: GateKind) -> Result<(), QdynError> {
        self.write(site, Slot::Gate(kind))
    }

    /// Writes an interaction marker into an empty slot.
    pub fn write_marker(&mut self, site: usize, pattern: usize) -> Result<(), QdynError> {
        self.write(site, Slot::Marker(pattern))
    }

    fn write(&mut self, site: usize, value: Slot) -> Result<(), QdynError> {
        let width = self.slots.len();
        let slot = self.slots.get_mut(site).ok_or_else(|| {
            QdynError::Invariant(
                ErrorInfo::new("slot-out-of-range", "layer slot does not exist")
                    .with_context("site", site.to_string())
                    .with_context("width", width.to_string()),
            )
        })?;
        if !slot.is_empty() {
            return Err(QdynError::Invariant(
                ErrorInfo::new("slot-double-write", "layer slot written twice")
                    .with_context("site", site.to_string())
                    .with_context("existing", format!("{slot:?}")),
            ));
        }
        *slot = value;
        Ok(())
    }
}

/// Plain chain state: sites, fixed patterns, cursor and layer history.
///
/// The chain never holds anything engine specific; it is the only structure that
/// is persisted by the codec.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chain {
    pub(crate) total_sites: usize,
    pub(crate) patterns: Vec<Pattern>,
    pub(crate) pattern_cursor: usize,
    pub(crate) layers: Vec<Layer>,
    pub(crate) single_sites: Vec<Vec<usize>>,
    pub(crate) barriers: Vec<usize>,
}

impl Chain {
    /// Creates an empty chain over `total_sites` sites with a fixed pattern list.
    pub fn new(total_sites: usize, patterns: Vec<Pattern>) -> Result<Self, QdynError> {
        if total_sites == 0 {
            return Err(QdynError::configuration(
                "site-count",
                "a chain needs at least one site",
            ));
        }
        if patterns.is_empty() {
            return Err(QdynError::configuration(
                "empty-patterns",
                "a chain needs at least one interaction pattern",
            ));
        }
        for (index, pattern) in patterns.iter().enumerate() {
            if let Some(site) = pattern.max_site().filter(|site| *site >= total_sites) {
                return Err(QdynError::Configuration(
                    ErrorInfo::new("pattern-site-range", "pattern references a missing site")
                        .with_context("pattern", index.to_string())
                        .with_context("site", site.to_string())
                        .with_context("total_sites", total_sites.to_string()),
                ));
            }
        }
        let single_sites = untouched_sites(total_sites, &patterns);
        Ok(Self {
            total_sites,
            patterns,
            pattern_cursor: 0,
            layers: Vec::new(),
            single_sites,
            barriers: Vec::new(),
        })
    }

    /// Number of sites.
    pub fn total_sites(&self) -> usize {
        self.total_sites
    }

    /// Fixed interaction patterns.
    pub fn patterns(&self) -> &[Pattern] {
        &self.patterns
    }

    /// Index of the pattern the next interaction layer will use.
    pub fn pattern_cursor(&self) -> usize {
        self.pattern_cursor
    }

    /// Layer history in growth order.
    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    /// For each pattern, the sites it leaves untouched.
    pub fn single_sites(&self) -> &[Vec<usize>] {
        &self.single_sites
    }

    /// Layer counts at which a barrier hint was recorded.
    pub fn barriers(&self) -> &[usize] {
        &self.barriers
    }

    /// Number of recorded layers.
    pub fn len(&self) -> usize {
        self.layers.len()
    }

    /// Returns `true` when no layer has been recorded.
    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    /// Number of growth increments recorded, counted by interaction layers.
    pub fn completed_increments(&self) -> usize {
        self.layers.iter().filter(|layer| layer.is_interaction()).count()
    }

    /// Keeps only the first `count` layers. Larger counts leave the chain unchanged.
    /// The cursor is rewound to follow the last kept interaction layer.
    pub(crate) fn truncate_layers(&mut self, count: usize) {
        if count < self.layers.len() {
            self.layers.truncate(count);
            self.barriers.retain(|&position| position <= count);
            self.pattern_cursor = self.completed_increments() % self.patterns.len();
        }
    }
}

/// Sites not touched by each pattern, in pattern order.
pub(crate) fn untouched_sites(total_sites: usize, patterns: &[Pattern]) -> Vec<Vec<usize>> {
    patterns
        .iter()
        .map(|pattern| {
            (0..total_sites)
                .filter(|site| !pattern.touches(*site))
                .collect()
        })
        .collect()
}
