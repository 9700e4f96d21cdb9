//! Incremental mining with per-fragment cached folds.

use std::collections::BTreeSet;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use dashmap::DashMap;
use tracing::debug;

use crate::domain::errors::SynthesisError;
use crate::domain::fragment::{Fragment, FragmentCollection};
use crate::domain::net::PetriNet;
use crate::synth::fold::{FoldPiece, assemble, fold_fragment};
use crate::synth::{IncrementalMiner, SynthesisConfig};

/// Incremental fold miner bound to one fragment collection. Each fragment's
/// folded piece is cached by content key, so overlapping selections only pay
/// for assembly. One instance must only ever see one configuration; the
/// coordinator keeps a registry of instances keyed by configuration
/// fingerprint.
#[derive(Debug)]
pub struct IncrementalFoldMiner {
    fragments: Arc<FragmentCollection>,
    pieces: DashMap<u64, Arc<FoldPiece>>,
}

impl IncrementalFoldMiner {
    pub fn new(fragments: Arc<FragmentCollection>) -> Self {
        Self {
            fragments,
            pieces: DashMap::new(),
        }
    }

    fn content_key(fragment: &Fragment) -> u64 {
        let mut hasher = DefaultHasher::new();
        fragment.order.canonical_key().hash(&mut hasher);
        hasher.finish()
    }
}

impl IncrementalMiner for IncrementalFoldMiner {
    fn mine(
        &self,
        indices: &BTreeSet<usize>,
        config: &SynthesisConfig,
    ) -> Result<PetriNet, SynthesisError> {
        let mut pieces: Vec<Arc<FoldPiece>> = Vec::with_capacity(indices.len());
        for &index in indices {
            let Some(fragment) = self.fragments.get(index) else {
                continue;
            };
            if fragment.order.is_empty() {
                return Err(SynthesisError::EmptyFragment { index });
            }
            let key = Self::content_key(fragment);
            let piece = {
                let entry = self
                    .pieces
                    .entry(key)
                    .or_insert_with(|| Arc::new(fold_fragment(fragment, config)));
                Arc::clone(entry.value())
            };
            pieces.push(piece);
        }
        debug!(
            requested = indices.len(),
            cached = self.pieces.len(),
            "assembling incremental result"
        );
        assemble(pieces.iter().map(|piece| piece.as_ref()), config)
    }

    fn clear_cache(&self) {
        self.pieces.clear();
    }

    fn cached_pieces(&self) -> usize {
        self.pieces.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::domain::order::PartialOrder;
    use crate::synth::FullSynthesizer;
    use crate::synth::fold::FoldSynthesizer;

    fn collection() -> Arc<FragmentCollection> {
        Arc::new(FragmentCollection::rank(vec![
            (PartialOrder::from_chain(["a", "b"]), 10),
            (PartialOrder::from_chain(["a", "c"]), 5),
            (PartialOrder::from_chain(["c", "d"]), 3),
        ]))
    }

    #[test]
    fn caches_pieces_across_overlapping_requests() {
        let fragments = collection();
        let miner = IncrementalFoldMiner::new(Arc::clone(&fragments));
        let config = SynthesisConfig::default();

        let first: BTreeSet<usize> = [0, 1].into_iter().collect();
        miner.mine(&first, &config).unwrap();
        assert_eq!(miner.cached_pieces(), 2);

        let wider: BTreeSet<usize> = [0, 1, 2].into_iter().collect();
        miner.mine(&wider, &config).unwrap();
        assert_eq!(miner.cached_pieces(), 3);

        let narrower: BTreeSet<usize> = [1].into_iter().collect();
        miner.mine(&narrower, &config).unwrap();
        assert_eq!(miner.cached_pieces(), 3);
    }

    #[test]
    fn matches_full_synthesis() {
        let fragments = collection();
        let miner = IncrementalFoldMiner::new(Arc::clone(&fragments));
        let config = SynthesisConfig::default();
        let indices: BTreeSet<usize> = [0, 2].into_iter().collect();

        // warm the cache in a different order first
        miner.mine(&[2].into_iter().collect(), &config).unwrap();
        let incremental = miner.mine(&indices, &config).unwrap();
        let full = FoldSynthesizer
            .synthesize(&fragments.subset(&indices), &config)
            .unwrap();
        assert_eq!(incremental, full);
    }

    #[test]
    fn clear_cache_only_drops_pieces() {
        let fragments = collection();
        let miner = IncrementalFoldMiner::new(Arc::clone(&fragments));
        let config = SynthesisConfig::default();
        let indices: BTreeSet<usize> = [0, 1].into_iter().collect();

        let before = miner.mine(&indices, &config).unwrap();
        miner.clear_cache();
        assert_eq!(miner.cached_pieces(), 0);
        let after = miner.mine(&indices, &config).unwrap();
        assert_eq!(before, after);
    }

    #[test]
    fn content_identical_fragments_share_one_piece() {
        let fragments = Arc::new(FragmentCollection::rank(vec![
            (PartialOrder::from_chain(["a", "b"]), 4),
            (PartialOrder::from_chain(["a", "b"]), 2),
        ]));
        let miner = IncrementalFoldMiner::new(fragments);
        let indices: BTreeSet<usize> = [0, 1].into_iter().collect();
        miner.mine(&indices, &SynthesisConfig::default()).unwrap();
        assert_eq!(miner.cached_pieces(), 1);
    }
}
