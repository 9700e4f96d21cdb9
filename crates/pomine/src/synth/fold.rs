//! Fold-based synthesis: one transition per label, one place per folded
//! precedence pair.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use crate::domain::errors::SynthesisError;
use crate::domain::fragment::Fragment;
use crate::domain::net::PetriNet;
use crate::synth::{FullSynthesizer, SynthesisConfig};

/// Key of a folded place: source and target label, with `None` marking the
/// entry (no source) and exit (no target) side.
pub(crate) type PlaceKey = (Option<String>, Option<String>);

/// Stats for one folded place. `produce` is the arc weight per firing of the
/// source transition, `consume` per firing of the target transition, `tokens`
/// the initial marking. The active configuration is already applied; stats
/// computed under different configurations must never be merged, which is why
/// cached pieces live in per-configuration handles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct PlaceStat {
    pub produce: u64,
    pub consume: u64,
    pub tokens: u64,
}

/// One fragment's folded contribution: its labels in first-seen order and the
/// place stats it induces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct FoldPiece {
    pub labels: Vec<String>,
    pub places: BTreeMap<PlaceKey, PlaceStat>,
}

pub(crate) fn fold_fragment(fragment: &Fragment, config: &SynthesisConfig) -> FoldPiece {
    let order = &fragment.order;
    let mut labels: Vec<String> = Vec::new();
    for event in order.events() {
        if !labels.contains(&event.label) {
            labels.push(event.label.clone());
        }
    }

    // Multiplicities per single occurrence: how many same-labeled successors
    // one firing feeds, and how many same-labeled predecessors one firing
    // drains. The per-place weight is the maximum over occurrences so the
    // fragment itself stays replayable.
    let mut out_of: HashMap<(usize, &str), u64> = HashMap::new();
    let mut into: HashMap<(usize, &str), u64> = HashMap::new();
    for &(a, b) in order.edges() {
        *out_of.entry((a, order.label(b))).or_insert(0) += 1;
        *into.entry((b, order.label(a))).or_insert(0) += 1;
    }

    let mut places: BTreeMap<PlaceKey, PlaceStat> = BTreeMap::new();
    for &(a, b) in order.edges() {
        let key = (
            Some(order.label(a).to_string()),
            Some(order.label(b).to_string()),
        );
        let stat = places.entry(key).or_insert(PlaceStat {
            produce: 0,
            consume: 0,
            tokens: 0,
        });
        stat.produce = stat.produce.max(out_of[&(a, order.label(b))]);
        stat.consume = stat.consume.max(into[&(b, order.label(a))]);
    }
    for source in order.sources() {
        let key = (None, Some(order.label(source).to_string()));
        let stat = places.entry(key).or_insert(PlaceStat {
            produce: 0,
            consume: 1,
            tokens: 0,
        });
        stat.tokens += 1;
    }
    for sink in order.sinks() {
        let key = (Some(order.label(sink).to_string()), None);
        places.entry(key).or_insert(PlaceStat {
            produce: 1,
            consume: 0,
            tokens: 0,
        });
    }

    if config.no_arc_weights || config.one_bound_regions {
        for stat in places.values_mut() {
            stat.produce = stat.produce.min(1);
            stat.consume = stat.consume.min(1);
        }
    }
    if config.one_bound_regions {
        for stat in places.values_mut() {
            stat.tokens = stat.tokens.min(1);
        }
    }
    FoldPiece { labels, places }
}

/// Merge folded pieces (ascending fragment order) into one net. Place slots
/// follow the sorted key order so identical inputs always produce identical
/// nets.
pub(crate) fn assemble<'a, I>(pieces: I, config: &SynthesisConfig) -> Result<PetriNet, SynthesisError>
where
    I: IntoIterator<Item = &'a FoldPiece>,
{
    let mut labels: Vec<String> = Vec::new();
    let mut merged: BTreeMap<PlaceKey, PlaceStat> = BTreeMap::new();
    for piece in pieces {
        for label in &piece.labels {
            if !labels.contains(label) {
                labels.push(label.clone());
            }
        }
        for (key, stat) in &piece.places {
            merged
                .entry(key.clone())
                .and_modify(|existing| {
                    existing.produce = existing.produce.max(stat.produce);
                    existing.consume = existing.consume.max(stat.consume);
                    existing.tokens = existing.tokens.max(stat.tokens);
                })
                .or_insert(*stat);
        }
    }

    let mut net = PetriNet::new();
    let mut transition_of: HashMap<String, usize> = HashMap::new();
    for (i, label) in labels.iter().enumerate() {
        let t = net.add_transition(format!("t{i}"), label.clone());
        transition_of.insert(label.clone(), t);
    }
    for (slot, (key, stat)) in merged.iter().enumerate() {
        let place = net.add_place(format!("p{slot}"), stat.tokens);
        if let Some(source) = &key.0 {
            net.add_output_arc(transition_of[source], place, stat.produce);
        }
        if let Some(target) = &key.1 {
            net.add_input_arc(place, transition_of[target], stat.consume);
        }
    }

    if !config.skip_connectivity_check {
        let components = component_count(&net);
        if components > 1 {
            return Err(SynthesisError::Disconnected { components });
        }
    }
    Ok(net)
}

/// Stateless full synthesis: folds every fragment of the subset on every call.
#[derive(Debug, Clone, Copy, Default)]
pub struct FoldSynthesizer;

impl FullSynthesizer for FoldSynthesizer {
    fn synthesize(
        &self,
        fragments: &[&Fragment],
        config: &SynthesisConfig,
    ) -> Result<PetriNet, SynthesisError> {
        for fragment in fragments {
            if fragment.order.is_empty() {
                return Err(SynthesisError::EmptyFragment {
                    index: fragment.index,
                });
            }
        }
        let pieces: Vec<FoldPiece> = fragments
            .iter()
            .map(|fragment| fold_fragment(fragment, config))
            .collect();
        assemble(pieces.iter(), config)
    }
}

fn component_count(net: &PetriNet) -> usize {
    let total = net.place_count() + net.transition_count();
    if total == 0 {
        return 0;
    }
    let mut parent: Vec<usize> = (0..total).collect();
    for (t, transition) in net.transitions().iter().enumerate() {
        let t_node = net.place_count() + t;
        for &(place, _) in transition.inputs.iter().chain(transition.outputs.iter()) {
            union(&mut parent, t_node, place);
        }
    }
    let roots: BTreeSet<usize> = (0..total).map(|node| find(&mut parent, node)).collect();
    roots.len()
}

fn find(parent: &mut [usize], mut node: usize) -> usize {
    while parent[node] != node {
        parent[node] = parent[parent[node]];
        node = parent[node];
    }
    node
}

fn union(parent: &mut [usize], a: usize, b: usize) {
    let root_a = find(parent, a);
    let root_b = find(parent, b);
    if root_a != root_b {
        parent[root_a] = root_b;
    }
}
