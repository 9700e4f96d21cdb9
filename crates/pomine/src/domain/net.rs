//! Place/transition nets with weighted arcs.

pub type Marking = Vec<u64>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Place {
    pub id: String,
    pub initial_marking: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub id: String,
    pub label: String,
    /// Input arcs as `(place index, weight)`.
    pub inputs: Vec<(usize, u64)>,
    /// Output arcs as `(place index, weight)`.
    pub outputs: Vec<(usize, u64)>,
}

/// A Petri net. The default value doubles as the canonical empty model.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PetriNet {
    places: Vec<Place>,
    transitions: Vec<Transition>,
}

impl PetriNet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_place(&mut self, id: impl Into<String>, initial_marking: u64) -> usize {
        self.places.push(Place {
            id: id.into(),
            initial_marking,
        });
        self.places.len() - 1
    }

    pub fn add_transition(&mut self, id: impl Into<String>, label: impl Into<String>) -> usize {
        self.transitions.push(Transition {
            id: id.into(),
            label: label.into(),
            inputs: Vec::new(),
            outputs: Vec::new(),
        });
        self.transitions.len() - 1
    }

    pub fn add_input_arc(&mut self, place: usize, transition: usize, weight: u64) {
        self.transitions[transition].inputs.push((place, weight));
    }

    pub fn add_output_arc(&mut self, transition: usize, place: usize, weight: u64) {
        self.transitions[transition].outputs.push((place, weight));
    }

    pub fn places(&self) -> &[Place] {
        &self.places
    }

    pub fn transitions(&self) -> &[Transition] {
        &self.transitions
    }

    pub fn place_count(&self) -> usize {
        self.places.len()
    }

    pub fn transition_count(&self) -> usize {
        self.transitions.len()
    }

    pub fn arc_count(&self) -> usize {
        self.transitions
            .iter()
            .map(|t| t.inputs.len() + t.outputs.len())
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.places.is_empty() && self.transitions.is_empty()
    }

    pub fn initial_marking(&self) -> Marking {
        self.places.iter().map(|p| p.initial_marking).collect()
    }

    pub fn is_enabled(&self, marking: &Marking, transition: usize) -> bool {
        self.transitions[transition]
            .inputs
            .iter()
            .all(|&(place, weight)| marking[place] >= weight)
    }

    /// Fire regardless of enabledness; consumption saturates at zero so a
    /// replay can keep walking after an invalid step.
    pub fn fire(&self, marking: &mut Marking, transition: usize) {
        for &(place, weight) in &self.transitions[transition].inputs {
            marking[place] = marking[place].saturating_sub(weight);
        }
        for &(place, weight) in &self.transitions[transition].outputs {
            marking[place] += weight;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_step_net() -> PetriNet {
        let mut net = PetriNet::new();
        let start = net.add_place("p0", 1);
        let mid = net.add_place("p1", 0);
        let a = net.add_transition("t0", "a");
        let b = net.add_transition("t1", "b");
        net.add_input_arc(start, a, 1);
        net.add_output_arc(a, mid, 1);
        net.add_input_arc(mid, b, 1);
        net
    }

    #[test]
    fn firing_moves_tokens() {
        let net = two_step_net();
        let mut marking = net.initial_marking();
        assert!(net.is_enabled(&marking, 0));
        assert!(!net.is_enabled(&marking, 1));
        net.fire(&mut marking, 0);
        assert_eq!(marking, vec![0, 1]);
        assert!(net.is_enabled(&marking, 1));
    }

    #[test]
    fn weighted_arcs_require_enough_tokens() {
        let mut net = PetriNet::new();
        let p = net.add_place("p0", 1);
        let t = net.add_transition("t0", "a");
        net.add_input_arc(p, t, 2);
        let marking = net.initial_marking();
        assert!(!net.is_enabled(&marking, 0));
    }

    #[test]
    fn default_net_is_empty() {
        let net = PetriNet::default();
        assert!(net.is_empty());
        assert_eq!(net.arc_count(), 0);
    }
}
