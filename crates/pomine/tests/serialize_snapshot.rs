use std::collections::BTreeSet;

use insta::assert_snapshot;

use pomine::domain::fragment::FragmentCollection;
use pomine::domain::order::PartialOrder;
use pomine::synth::fold::FoldSynthesizer;
use pomine::synth::serialize::PnSerializer;
use pomine::synth::{FullSynthesizer, ModelSerializer, SynthesisConfig};

#[test]
fn three_step_chain_renders_stably() {
    let fragments = FragmentCollection::rank(vec![(
        PartialOrder::from_chain(["receive", "pay", "ship"]),
        3,
    )]);
    let indices: BTreeSet<usize> = [0].into_iter().collect();
    let net = FoldSynthesizer
        .synthesize(&fragments.subset(&indices), &SynthesisConfig::default())
        .unwrap();
    let rendered = PnSerializer.serialize(&net);
    assert_snapshot!("three_step_chain", rendered);
}
