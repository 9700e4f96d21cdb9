//! Building ranked fragments from a parsed log.

use std::collections::{BTreeSet, HashMap};

use tracing::debug;

use crate::domain::fragment::FragmentCollection;
use crate::domain::log::EventLog;
use crate::domain::order::PartialOrder;
use crate::mine::oracle::{ConcurrencyRelation, trace_symbols};

/// Options steering fragment production.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProducerOptions {
    /// Look-ahead distance for the concurrency window.
    pub look_ahead: usize,
    /// Treat repeated activities within a trace as distinct oracle symbols.
    pub distinguish_same_labels: bool,
    /// Drop traces that are strict prefixes of another retained trace.
    pub discard_prefixes: bool,
}

impl Default for ProducerOptions {
    fn default() -> Self {
        Self {
            look_ahead: 1,
            distinguish_same_labels: false,
            discard_prefixes: false,
        }
    }
}

/// Boundary interface: turns a log into the ranked fragment collection.
pub trait FragmentProducer {
    fn produce(&self, log: &EventLog, options: &ProducerOptions) -> FragmentCollection;
}

/// Default producer. Infers concurrency with a look-ahead window, builds one
/// reduced partial order per distinct trace, removes ordering between
/// concurrent occurrences, and merges content-identical orders by summing
/// their counts.
#[derive(Debug, Clone, Copy, Default)]
pub struct WindowProducer;

impl FragmentProducer for WindowProducer {
    fn produce(&self, log: &EventLog, options: &ProducerOptions) -> FragmentCollection {
        let relation =
            ConcurrencyRelation::discover(log, options.look_ahead, options.distinguish_same_labels);

        let mut counts: Vec<(Vec<String>, u64)> = Vec::new();
        let mut by_sequence: HashMap<Vec<String>, usize> = HashMap::new();
        for trace in &log.traces {
            if trace.is_empty() {
                continue;
            }
            match by_sequence.get(&trace.activities) {
                Some(&slot) => counts[slot].1 += trace.count,
                None => {
                    by_sequence.insert(trace.activities.clone(), counts.len());
                    counts.push((trace.activities.clone(), trace.count));
                }
            }
        }
        if options.discard_prefixes {
            counts = without_prefixes(counts);
        }

        let mut weighted: Vec<(PartialOrder, u64)> = Vec::new();
        let mut by_key: HashMap<String, usize> = HashMap::new();
        for (activities, count) in counts {
            let order = order_from_trace(&activities, &relation, options.distinguish_same_labels);
            let key = order.canonical_key();
            match by_key.get(&key) {
                Some(&slot) => weighted[slot].1 += count,
                None => {
                    by_key.insert(key, weighted.len());
                    weighted.push((order, count));
                }
            }
        }
        debug!(
            traces = log.traces.len(),
            fragments = weighted.len(),
            concurrency_pairs = relation.len(),
            "produced fragment candidates"
        );
        FragmentCollection::rank(weighted)
    }
}

/// Start from the trace's total order, drop every pair the oracle calls
/// concurrent, and reduce. Event labels stay plain activity names; symbols
/// only steer the oracle lookup.
fn order_from_trace(
    activities: &[String],
    relation: &ConcurrencyRelation,
    distinguish: bool,
) -> PartialOrder {
    let symbols = trace_symbols(activities, distinguish);
    let mut pairs = BTreeSet::new();
    for i in 0..activities.len() {
        for j in (i + 1)..activities.len() {
            if !relation.are_concurrent(&symbols[i], &symbols[j]) {
                pairs.insert((i, j));
            }
        }
    }
    PartialOrder::from_pairs(activities.iter().cloned(), pairs)
}

fn without_prefixes(counts: Vec<(Vec<String>, u64)>) -> Vec<(Vec<String>, u64)> {
    let keep: Vec<bool> = counts
        .iter()
        .map(|(sequence, _)| {
            !counts.iter().any(|(other, _)| {
                other.len() > sequence.len() && other[..sequence.len()] == sequence[..]
            })
        })
        .collect();
    counts
        .into_iter()
        .zip(keep)
        .filter_map(|(entry, keep)| keep.then_some(entry))
        .collect()
}
