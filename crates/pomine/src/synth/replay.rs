//! Token replay of partial orders against a model.

use std::collections::HashMap;

use crate::domain::errors::ValidationError;
use crate::domain::net::PetriNet;
use crate::domain::order::PartialOrder;
use crate::synth::{FireVerdict, FiringValidator};

/// Replays the stable topological linearization of a partial order, one
/// verdict per event. Unknown or ambiguous labels are structural errors;
/// firing continues past invalid steps so later events still get verdicts.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokenReplayValidator;

impl FiringValidator for TokenReplayValidator {
    fn validate(
        &self,
        net: &PetriNet,
        order: &PartialOrder,
    ) -> Result<Vec<FireVerdict>, ValidationError> {
        if net.is_empty() {
            return Err(ValidationError::EmptyModel);
        }

        let mut by_label: HashMap<&str, Vec<usize>> = HashMap::new();
        for (t, transition) in net.transitions().iter().enumerate() {
            by_label
                .entry(transition.label.as_str())
                .or_default()
                .push(t);
        }
        let mut mapping = Vec::with_capacity(order.len());
        for event in order.events() {
            let candidates = by_label
                .get(event.label.as_str())
                .map(Vec::as_slice)
                .unwrap_or(&[]);
            match candidates {
                [] => return Err(ValidationError::UnknownLabel(event.label.clone())),
                [t] => mapping.push(*t),
                _ => return Err(ValidationError::AmbiguousLabel(event.label.clone())),
            }
        }

        let mut marking = net.initial_marking();
        let mut verdicts = Vec::with_capacity(order.len());
        for event in order.topological_order() {
            let transition = mapping[event];
            let valid = net.is_enabled(&marking, transition);
            net.fire(&mut marking, transition);
            verdicts.push(FireVerdict { event, valid });
        }
        Ok(verdicts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::collections::BTreeSet;

    use crate::domain::fragment::Fragment;
    use crate::synth::fold::FoldSynthesizer;
    use crate::synth::{FullSynthesizer, SynthesisConfig};

    fn net_of(order: &PartialOrder, config: &SynthesisConfig) -> PetriNet {
        let fragment = Fragment {
            index: 0,
            order: order.clone(),
            frequency: 1,
        };
        FoldSynthesizer.synthesize(&[&fragment], config).unwrap()
    }

    #[test]
    fn fragment_replays_against_its_own_fold() {
        let order = PartialOrder::from_chain(["a", "b", "c"]);
        let net = net_of(&order, &SynthesisConfig::default());
        let verdicts = TokenReplayValidator.validate(&net, &order).unwrap();
        assert_eq!(verdicts.len(), 3);
        assert!(verdicts.iter().all(|v| v.valid));
    }

    #[test]
    fn concurrent_fragment_replays_cleanly() {
        let pairs: BTreeSet<(usize, usize)> =
            [(0, 1), (0, 2), (1, 3), (2, 3)].into_iter().collect();
        let diamond = PartialOrder::from_pairs(["a", "b", "c", "d"], pairs);
        let net = net_of(&diamond, &SynthesisConfig::default());
        let verdicts = TokenReplayValidator.validate(&net, &diamond).unwrap();
        assert!(verdicts.iter().all(|v| v.valid));
    }

    #[test]
    fn weighted_fold_still_replays() {
        let pairs: BTreeSet<(usize, usize)> = [(0, 2), (1, 2)].into_iter().collect();
        let doubled = PartialOrder::from_pairs(["a", "a", "b"], pairs);
        let weighted = SynthesisConfig {
            skip_connectivity_check: true,
            one_bound_regions: false,
            no_arc_weights: false,
        };
        let net = net_of(&doubled, &weighted);
        let verdicts = TokenReplayValidator.validate(&net, &doubled).unwrap();
        assert!(verdicts.iter().all(|v| v.valid));
    }

    #[test]
    fn reversed_order_collects_invalid_steps() {
        let forward = PartialOrder::from_chain(["a", "b"]);
        let net = net_of(&forward, &SynthesisConfig::default());
        let backward = PartialOrder::from_chain(["b", "a"]);
        let verdicts = TokenReplayValidator.validate(&net, &backward).unwrap();
        assert_eq!(verdicts.len(), 2);
        assert!(!verdicts[0].valid);
        assert!(verdicts[1].valid);
    }

    #[test]
    fn unknown_labels_are_structural_errors() {
        let order = PartialOrder::from_chain(["a", "b"]);
        let net = net_of(&order, &SynthesisConfig::default());
        let stranger = PartialOrder::from_chain(["z"]);
        let err = TokenReplayValidator.validate(&net, &stranger).unwrap_err();
        assert!(matches!(err, ValidationError::UnknownLabel(label) if label == "z"));
    }

    #[test]
    fn empty_model_is_a_structural_error() {
        let order = PartialOrder::from_chain(["a"]);
        let err = TokenReplayValidator
            .validate(&PetriNet::default(), &order)
            .unwrap_err();
        assert!(matches!(err, ValidationError::EmptyModel));
    }
}
