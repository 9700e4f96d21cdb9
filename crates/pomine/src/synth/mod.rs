//! Synthesis strategies, replay validation, and model serialization.

pub mod fold;
pub mod incremental;
pub mod replay;
pub mod serialize;

use std::collections::BTreeSet;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use crate::domain::errors::{SynthesisError, ValidationError};
use crate::domain::fragment::Fragment;
use crate::domain::net::PetriNet;
use crate::domain::order::PartialOrder;

/// Knobs that change what the synthesizers produce. Cached mining state is
/// only valid for the exact configuration that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SynthesisConfig {
    pub skip_connectivity_check: bool,
    pub one_bound_regions: bool,
    pub no_arc_weights: bool,
}

impl Default for SynthesisConfig {
    fn default() -> Self {
        Self {
            skip_connectivity_check: true,
            one_bound_regions: true,
            no_arc_weights: false,
        }
    }
}

impl SynthesisConfig {
    /// Registry key for per-configuration cache separation.
    pub fn fingerprint(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.hash(&mut hasher);
        hasher.finish()
    }
}

/// Single-shot synthesis over a fragment subset.
pub trait FullSynthesizer: Send + Sync {
    fn synthesize(
        &self,
        fragments: &[&Fragment],
        config: &SynthesisConfig,
    ) -> Result<PetriNet, SynthesisError>;
}

/// Stateful mining over one fragment collection with internal caching. One
/// handle serves exactly one cache-relevant configuration.
pub trait IncrementalMiner: Send + Sync {
    fn mine(
        &self,
        indices: &BTreeSet<usize>,
        config: &SynthesisConfig,
    ) -> Result<PetriNet, SynthesisError>;

    /// Drop cached partial results. Does not touch anything outside the
    /// cache; the next mine simply recomputes from scratch.
    fn clear_cache(&self);

    fn cached_pieces(&self) -> usize;
}

/// Per-event verdict from replaying a partial order against a model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FireVerdict {
    pub event: usize,
    pub valid: bool,
}

/// Replays a partial order against a model.
pub trait FiringValidator: Send + Sync {
    fn validate(
        &self,
        net: &PetriNet,
        order: &PartialOrder,
    ) -> Result<Vec<FireVerdict>, ValidationError>;
}

/// Renders a model for export.
pub trait ModelSerializer {
    fn serialize(&self, net: &PetriNet) -> String;
}
