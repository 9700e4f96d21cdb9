//! Plain-text model rendering in the pn format.

use crate::domain::net::PetriNet;
use crate::synth::ModelSerializer;

/// Writes a model in the line-oriented pn format: a type header, then
/// transitions, places with their initial marking, and arcs. Arc weights are
/// printed only when they exceed one. Output order follows net construction
/// order, which the synthesizers keep deterministic.
#[derive(Debug, Clone, Copy, Default)]
pub struct PnSerializer;

impl ModelSerializer for PnSerializer {
    fn serialize(&self, net: &PetriNet) -> String {
        let mut out = String::from(".type pn\n");
        out.push_str(".transitions\n");
        for transition in net.transitions() {
            out.push_str(&format!("{} {}\n", transition.id, transition.label));
        }
        out.push_str(".places\n");
        for place in net.places() {
            out.push_str(&format!("{} {}\n", place.id, place.initial_marking));
        }
        out.push_str(".arcs\n");
        for transition in net.transitions() {
            for &(place, weight) in &transition.inputs {
                out.push_str(&arc_line(&net.places()[place].id, &transition.id, weight));
            }
            for &(place, weight) in &transition.outputs {
                out.push_str(&arc_line(&transition.id, &net.places()[place].id, weight));
            }
        }
        out
    }
}

fn arc_line(source: &str, target: &str, weight: u64) -> String {
    if weight > 1 {
        format!("{source} {target} {weight}\n")
    } else {
        format!("{source} {target}\n")
    }
}
