//! Mining coordination: memoized revalidation and superseding background work.

use std::collections::{BTreeSet, HashMap};
use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;
use std::thread;

use tracing::{debug, warn};

use crate::domain::errors::SynthesisError;
use crate::domain::fragment::FragmentCollection;
use crate::domain::net::PetriNet;
use crate::synth::fold::FoldSynthesizer;
use crate::synth::incremental::IncrementalFoldMiner;
use crate::synth::{FullSynthesizer, IncrementalMiner, SynthesisConfig};

/// Which mining path serves a resolve request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MiningStrategy {
    /// Synthesize the whole subset from scratch every time.
    Full,
    /// Reuse per-fragment partial results across requests.
    #[default]
    Incremental,
}

impl MiningStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            MiningStrategy::Full => "full",
            MiningStrategy::Incremental => "incremental",
        }
    }
}

impl FromStr for MiningStrategy {
    type Err = StrategyParseError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "full" => Ok(MiningStrategy::Full),
            "incremental" => Ok(MiningStrategy::Incremental),
            other => Err(StrategyParseError::UnknownStrategy(other.to_string())),
        }
    }
}

/// Error returned when parsing a [`MiningStrategy`] fails.
#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum StrategyParseError {
    #[error("unknown mining strategy '{0}'")]
    UnknownStrategy(String),
}

/// How a resolve request was served.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// Empty selection; the canonical empty model is live immediately.
    EmptyPublished,
    /// The memo matched, so the current model already reflects the set.
    Republished,
    /// A background mining request was started.
    Scheduled,
}

/// Outcome drained from the background channel by [`MiningCoordinator::poll`].
#[derive(Debug)]
pub enum PollEvent {
    Published(Arc<PetriNet>),
    Failed(SynthesisError),
}

struct MineMessage {
    seq: u64,
    indices: BTreeSet<usize>,
    result: Result<PetriNet, SynthesisError>,
}

/// Owns the published model and decides, per effective set, between
/// republishing, mining in the background, or publishing the empty model.
///
/// Requests carry a monotonically increasing sequence number. Only the most
/// recent request may publish; anything older is discarded when its result
/// arrives. A failed mine leaves both the published model and the memo
/// untouched, so the screen keeps showing the last good state.
pub struct MiningCoordinator {
    fragments: Arc<FragmentCollection>,
    strategy: MiningStrategy,
    config: SynthesisConfig,
    synthesizer: Arc<dyn FullSynthesizer>,
    miners: HashMap<u64, Arc<dyn IncrementalMiner>>,
    memo: Option<BTreeSet<usize>>,
    model: Arc<PetriNet>,
    empty: Arc<PetriNet>,
    seq: u64,
    latest: Arc<AtomicU64>,
    active: Option<u64>,
    calls: u64,
    tx: Sender<MineMessage>,
    rx: Receiver<MineMessage>,
}

impl MiningCoordinator {
    pub fn new(
        fragments: Arc<FragmentCollection>,
        strategy: MiningStrategy,
        config: SynthesisConfig,
    ) -> Self {
        let (tx, rx) = mpsc::channel();
        let empty = Arc::new(PetriNet::default());
        Self {
            fragments,
            strategy,
            config,
            synthesizer: Arc::new(FoldSynthesizer),
            miners: HashMap::new(),
            memo: None,
            model: Arc::clone(&empty),
            empty,
            seq: 0,
            latest: Arc::new(AtomicU64::new(0)),
            active: None,
            calls: 0,
            tx,
            rx,
        }
    }

    /// Swap the full-synthesis backend. Intended for tests.
    pub fn with_synthesizer(mut self, synthesizer: Arc<dyn FullSynthesizer>) -> Self {
        self.synthesizer = synthesizer;
        self
    }

    pub fn fragments(&self) -> &Arc<FragmentCollection> {
        &self.fragments
    }

    /// Replace the fragment collection, e.g. after reloading the log.
    /// Invalidates the memo, the miner registry, and the published model.
    pub fn set_fragments(&mut self, fragments: Arc<FragmentCollection>) {
        self.seq += 1;
        self.latest.store(self.seq, Ordering::SeqCst);
        self.active = None;
        self.memo = None;
        self.miners.clear();
        self.model = Arc::clone(&self.empty);
        self.fragments = fragments;
    }

    pub fn strategy(&self) -> MiningStrategy {
        self.strategy
    }

    /// Both strategies produce the same model for the same set, so switching
    /// keeps the memo valid.
    pub fn set_strategy(&mut self, strategy: MiningStrategy) {
        self.strategy = strategy;
    }

    pub fn config(&self) -> SynthesisConfig {
        self.config
    }

    /// Changing configuration invalidates the memo and orphans any in-flight
    /// request. Cached miner state for other configurations is kept.
    pub fn set_config(&mut self, config: SynthesisConfig) {
        if config == self.config {
            return;
        }
        self.config = config;
        self.memo = None;
        self.active = None;
    }

    /// The currently published model. Starts out as the canonical empty model.
    pub fn model(&self) -> Arc<PetriNet> {
        Arc::clone(&self.model)
    }

    pub fn memo(&self) -> Option<&BTreeSet<usize>> {
        self.memo.as_ref()
    }

    pub fn is_mining(&self) -> bool {
        self.active.is_some()
    }

    /// Number of mining requests actually started. Republishes and empty
    /// publications do not count.
    pub fn mining_calls(&self) -> u64 {
        self.calls
    }

    pub fn configured_miners(&self) -> usize {
        self.miners.len()
    }

    /// Total cached partial results across all configurations.
    pub fn cached_pieces(&self) -> usize {
        self.miners.values().map(|miner| miner.cached_pieces()).sum()
    }

    /// Drop cached partial results in every registered miner. Leaves the
    /// memo and the published model alone.
    pub fn clear_cache(&self) {
        for miner in self.miners.values() {
            miner.clear_cache();
        }
        debug!(miners = self.miners.len(), "cleared incremental caches");
    }

    /// Bring the published model in line with `effective`. Compares against
    /// the memo first; only a genuinely new set starts a mining request.
    pub fn resolve(&mut self, effective: &BTreeSet<usize>) -> Resolution {
        self.seq += 1;
        self.latest.store(self.seq, Ordering::SeqCst);

        if effective.is_empty() {
            self.active = None;
            self.memo = None;
            self.model = Arc::clone(&self.empty);
            debug!("empty selection, published canonical empty model");
            return Resolution::EmptyPublished;
        }
        if self.memo.as_ref() == Some(effective) {
            self.active = None;
            debug!(size = effective.len(), "selection matches memo, republishing");
            return Resolution::Republished;
        }

        self.active = Some(self.seq);
        self.calls += 1;
        let seq = self.seq;
        let indices = effective.clone();
        let latest = Arc::clone(&self.latest);
        let tx = self.tx.clone();
        let config = self.config;
        debug!(seq, size = indices.len(), strategy = self.strategy.as_str(), "scheduling mine");

        match self.strategy {
            MiningStrategy::Full => {
                let synthesizer = Arc::clone(&self.synthesizer);
                let fragments = Arc::clone(&self.fragments);
                thread::spawn(move || {
                    if latest.load(Ordering::SeqCst) != seq {
                        debug!(seq, "request superseded before synthesis");
                        return;
                    }
                    let subset = fragments.subset(&indices);
                    let result = synthesizer.synthesize(&subset, &config);
                    let _ = tx.send(MineMessage { seq, indices, result });
                });
            }
            MiningStrategy::Incremental => {
                let miner = self.miner_handle();
                thread::spawn(move || {
                    if latest.load(Ordering::SeqCst) != seq {
                        debug!(seq, "request superseded before mining");
                        return;
                    }
                    let result = miner.mine(&indices, &config);
                    let _ = tx.send(MineMessage { seq, indices, result });
                });
            }
        }
        Resolution::Scheduled
    }

    /// Drain finished background requests. Superseded results are dropped;
    /// the freshest one either publishes a new model and memo or reports the
    /// failure while keeping the last good state.
    pub fn poll(&mut self) -> Vec<PollEvent> {
        let mut events = Vec::new();
        while let Ok(message) = self.rx.try_recv() {
            if self.active != Some(message.seq) {
                debug!(seq = message.seq, "discarding superseded mining result");
                continue;
            }
            self.active = None;
            match message.result {
                Ok(net) => {
                    self.model = Arc::new(net);
                    self.memo = Some(message.indices);
                    events.push(PollEvent::Published(Arc::clone(&self.model)));
                }
                Err(error) => {
                    warn!(%error, "mining failed, keeping last good model");
                    events.push(PollEvent::Failed(error));
                }
            }
        }
        events
    }

    fn miner_handle(&mut self) -> Arc<dyn IncrementalMiner> {
        let key = self.config.fingerprint();
        let fragments = Arc::clone(&self.fragments);
        let handle = self.miners.entry(key).or_insert_with(|| {
            debug!(key, "registering incremental miner for configuration");
            Arc::new(IncrementalFoldMiner::new(fragments))
        });
        Arc::clone(handle)
    }
}

impl Drop for MiningCoordinator {
    fn drop(&mut self) {
        // Workers that have not started yet will observe this and bail.
        self.latest.store(u64::MAX, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::fragment::Fragment;
    use crate::domain::order::PartialOrder;
    use std::sync::Mutex;
    use std::time::{Duration, Instant};

    fn collection() -> Arc<FragmentCollection> {
        let chain = PartialOrder::from_chain(["a", "b"]);
        let single = PartialOrder::from_chain(["c"]);
        Arc::new(FragmentCollection::rank(vec![(chain, 2), (single, 1)]))
    }

    fn settle(coordinator: &mut MiningCoordinator) -> Vec<PollEvent> {
        let deadline = Instant::now() + Duration::from_secs(5);
        let mut events = Vec::new();
        while coordinator.is_mining() && Instant::now() < deadline {
            events.extend(coordinator.poll());
            thread::sleep(Duration::from_millis(2));
        }
        events.extend(coordinator.poll());
        events
    }

    fn set(indices: impl IntoIterator<Item = usize>) -> BTreeSet<usize> {
        indices.into_iter().collect()
    }

    #[test]
    fn memo_hit_republishes_without_mining() {
        let mut coordinator = MiningCoordinator::new(
            collection(),
            MiningStrategy::Incremental,
            SynthesisConfig::default(),
        );
        assert_eq!(coordinator.resolve(&set([0])), Resolution::Scheduled);
        settle(&mut coordinator);
        assert_eq!(coordinator.mining_calls(), 1);
        let first = coordinator.model();
        assert!(!first.is_empty());

        assert_eq!(coordinator.resolve(&set([0])), Resolution::Republished);
        assert_eq!(coordinator.mining_calls(), 1);
        assert!(Arc::ptr_eq(&first, &coordinator.model()));
    }

    #[test]
    fn set_equality_ignores_request_order() {
        let mut coordinator = MiningCoordinator::new(
            collection(),
            MiningStrategy::Full,
            SynthesisConfig::default(),
        );
        coordinator.resolve(&set([0, 1]));
        settle(&mut coordinator);
        assert_eq!(coordinator.mining_calls(), 1);

        assert_eq!(coordinator.resolve(&set([1, 0])), Resolution::Republished);
        assert_eq!(coordinator.mining_calls(), 1);
    }

    #[test]
    fn empty_selection_publishes_canonical_empty_model() {
        let mut coordinator = MiningCoordinator::new(
            collection(),
            MiningStrategy::Incremental,
            SynthesisConfig::default(),
        );
        assert_eq!(coordinator.resolve(&set([])), Resolution::EmptyPublished);
        assert!(coordinator.model().is_empty());
        assert!(!coordinator.is_mining());
        assert_eq!(coordinator.mining_calls(), 0);
    }

    #[test]
    fn failure_keeps_model_and_memo() {
        let strict = SynthesisConfig {
            skip_connectivity_check: false,
            ..SynthesisConfig::default()
        };
        let mut coordinator =
            MiningCoordinator::new(collection(), MiningStrategy::Full, strict);

        coordinator.resolve(&set([0]));
        settle(&mut coordinator);
        let good = coordinator.model();
        assert!(!good.is_empty());

        // Fragments 0 and 1 share no activities, so this set is disconnected.
        coordinator.resolve(&set([0, 1]));
        let events = settle(&mut coordinator);
        assert!(matches!(events.as_slice(), [PollEvent::Failed(_)]));
        assert!(Arc::ptr_eq(&good, &coordinator.model()));
        assert_eq!(coordinator.memo(), Some(&set([0])));

        assert_eq!(coordinator.resolve(&set([0])), Resolution::Republished);
        assert_eq!(coordinator.mining_calls(), 2);
    }

    #[test]
    fn config_change_splits_miner_registry_and_memo() {
        let mut coordinator = MiningCoordinator::new(
            collection(),
            MiningStrategy::Incremental,
            SynthesisConfig::default(),
        );
        coordinator.resolve(&set([0, 1]));
        settle(&mut coordinator);
        assert_eq!(coordinator.configured_miners(), 1);

        let weighted = SynthesisConfig {
            one_bound_regions: false,
            ..SynthesisConfig::default()
        };
        coordinator.set_config(weighted);
        assert_eq!(coordinator.resolve(&set([0, 1])), Resolution::Scheduled);
        settle(&mut coordinator);
        assert_eq!(coordinator.configured_miners(), 2);

        // Switching back reuses the existing handle instead of adding one.
        coordinator.set_config(SynthesisConfig::default());
        assert_eq!(coordinator.resolve(&set([0, 1])), Resolution::Scheduled);
        settle(&mut coordinator);
        assert_eq!(coordinator.configured_miners(), 2);
    }

    struct GatedSynthesizer {
        release: Mutex<mpsc::Receiver<()>>,
    }

    impl FullSynthesizer for GatedSynthesizer {
        fn synthesize(
            &self,
            fragments: &[&Fragment],
            _config: &SynthesisConfig,
        ) -> Result<PetriNet, SynthesisError> {
            let gate = self.release.lock().unwrap();
            gate.recv().ok();
            // One place per fragment marks which request produced the model.
            let mut net = PetriNet::default();
            for (i, _) in fragments.iter().enumerate() {
                net.add_place(format!("p{i}"), 0);
            }
            Ok(net)
        }
    }

    #[test]
    fn newer_request_supersedes_older() {
        let (gate_tx, gate_rx) = mpsc::channel();
        let mut coordinator = MiningCoordinator::new(
            collection(),
            MiningStrategy::Full,
            SynthesisConfig::default(),
        )
        .with_synthesizer(Arc::new(GatedSynthesizer {
            release: Mutex::new(gate_rx),
        }));

        assert_eq!(coordinator.resolve(&set([0])), Resolution::Scheduled);
        assert_eq!(coordinator.resolve(&set([0, 1])), Resolution::Scheduled);
        gate_tx.send(()).unwrap();
        gate_tx.send(()).unwrap();

        let events = settle(&mut coordinator);
        let published: Vec<_> = events
            .iter()
            .filter(|event| matches!(event, PollEvent::Published(_)))
            .collect();
        assert_eq!(published.len(), 1);
        assert_eq!(coordinator.model().place_count(), 2);
        assert_eq!(coordinator.memo(), Some(&set([0, 1])));
    }

    #[test]
    fn fragment_swap_resets_everything() {
        let mut coordinator = MiningCoordinator::new(
            collection(),
            MiningStrategy::Incremental,
            SynthesisConfig::default(),
        );
        coordinator.resolve(&set([0]));
        settle(&mut coordinator);
        assert!(coordinator.memo().is_some());

        coordinator.set_fragments(collection());
        assert!(coordinator.memo().is_none());
        assert!(coordinator.model().is_empty());
        assert_eq!(coordinator.configured_miners(), 0);
    }
}
