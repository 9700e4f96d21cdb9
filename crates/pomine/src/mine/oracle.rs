//! Window-based concurrency discovery over an event log.

use std::collections::{HashMap, HashSet};

use crate::domain::log::EventLog;

/// The oracle symbol for an activity occurrence. When same-label occurrences
/// are distinguished, the occurrence number becomes part of the symbol.
pub(crate) fn symbol(label: &str, occurrence: usize, distinguish: bool) -> String {
    if distinguish {
        format!("{label}#{occurrence}")
    } else {
        label.to_string()
    }
}

/// Unordered symbol pairs that were observed in both orders within the
/// look-ahead window somewhere in the log.
#[derive(Debug, Clone, Default)]
pub struct ConcurrencyRelation {
    pairs: HashSet<(String, String)>,
}

impl ConcurrencyRelation {
    /// Scan the log with a fixed look-ahead window. A pair of symbols is
    /// concurrent when each was seen before the other within the window.
    pub fn discover(log: &EventLog, look_ahead: usize, distinguish_same_labels: bool) -> Self {
        let mut before: HashSet<(String, String)> = HashSet::new();
        for trace in &log.traces {
            let symbols = trace_symbols(&trace.activities, distinguish_same_labels);
            for i in 0..symbols.len() {
                let upper = symbols.len().min(i + 1 + look_ahead);
                for j in (i + 1)..upper {
                    before.insert((symbols[i].clone(), symbols[j].clone()));
                }
            }
        }

        let mut pairs = HashSet::new();
        for (a, b) in &before {
            if before.contains(&(b.clone(), a.clone())) {
                pairs.insert(normalize(a, b));
            }
        }
        Self { pairs }
    }

    pub fn are_concurrent(&self, a: &str, b: &str) -> bool {
        self.pairs.contains(&normalize(a, b))
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

pub(crate) fn trace_symbols(activities: &[String], distinguish: bool) -> Vec<String> {
    let mut occurrences: HashMap<&str, usize> = HashMap::new();
    activities
        .iter()
        .map(|label| {
            let slot = occurrences.entry(label.as_str()).or_insert(0);
            let sym = symbol(label, *slot, distinguish);
            *slot += 1;
            sym
        })
        .collect()
}

fn normalize(a: &str, b: &str) -> (String, String) {
    if a <= b {
        (a.to_string(), b.to_string())
    } else {
        (b.to_string(), a.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::domain::log::Trace;

    #[test]
    fn swapped_neighbors_are_concurrent() {
        let log = EventLog::new(vec![Trace::new(["a", "b"]), Trace::new(["b", "a"])]);
        let relation = ConcurrencyRelation::discover(&log, 1, false);
        assert!(relation.are_concurrent("a", "b"));
        assert!(relation.are_concurrent("b", "a"));
    }

    #[test]
    fn one_directional_pairs_stay_ordered() {
        let log = EventLog::new(vec![Trace::new(["a", "b", "c"])]);
        let relation = ConcurrencyRelation::discover(&log, 1, false);
        assert!(relation.is_empty());
    }

    #[test]
    fn window_limits_witnesses() {
        let log = EventLog::new(vec![Trace::new(["a", "b", "c"]), Trace::new(["c", "a"])]);
        let narrow = ConcurrencyRelation::discover(&log, 1, false);
        assert!(!narrow.are_concurrent("a", "c"));
        let wide = ConcurrencyRelation::discover(&log, 2, false);
        assert!(wide.are_concurrent("a", "c"));
    }

    #[test]
    fn repeated_label_is_self_concurrent_unless_distinguished() {
        let log = EventLog::new(vec![Trace::new(["a", "a"])]);
        let merged = ConcurrencyRelation::discover(&log, 1, false);
        assert!(merged.are_concurrent("a", "a"));
        let split = ConcurrencyRelation::discover(&log, 1, true);
        assert!(!split.are_concurrent("a#0", "a#1"));
    }
}
