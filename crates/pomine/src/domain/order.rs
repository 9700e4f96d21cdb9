//! Labeled partial orders over trace events.

use std::collections::{BTreeSet, HashMap};

/// One occurrence of an activity inside a partial order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    pub label: String,
}

/// A partial order over labeled events.
///
/// Edges are held in transitively reduced form. Queries that need the full
/// precedence relation compute the closure on demand; fragments are small
/// enough that this never matters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartialOrder {
    events: Vec<Event>,
    edges: BTreeSet<(usize, usize)>,
}

impl PartialOrder {
    /// Build a total order from a sequence of labels.
    pub fn from_chain<I, S>(labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let events: Vec<Event> = labels
            .into_iter()
            .map(|label| Event { label: label.into() })
            .collect();
        let edges = (1..events.len()).map(|i| (i - 1, i)).collect();
        Self { events, edges }
    }

    /// Build from an explicit precedence relation. The relation must be
    /// acyclic; it is transitively reduced before storage.
    pub fn from_pairs<I, S>(labels: I, pairs: BTreeSet<(usize, usize)>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let events: Vec<Event> = labels
            .into_iter()
            .map(|label| Event { label: label.into() })
            .collect();
        let edges = transitive_reduction(events.len(), &pairs);
        Self { events, edges }
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn label(&self, index: usize) -> &str {
        &self.events[index].label
    }

    /// Reduced precedence edges as `(earlier, later)` index pairs.
    pub fn edges(&self) -> &BTreeSet<(usize, usize)> {
        &self.edges
    }

    /// Events without predecessors.
    pub fn sources(&self) -> Vec<usize> {
        let targets: BTreeSet<usize> = self.edges.iter().map(|&(_, b)| b).collect();
        (0..self.events.len()).filter(|i| !targets.contains(i)).collect()
    }

    /// Events without successors.
    pub fn sinks(&self) -> Vec<usize> {
        let origins: BTreeSet<usize> = self.edges.iter().map(|&(a, _)| a).collect();
        (0..self.events.len()).filter(|i| !origins.contains(i)).collect()
    }

    /// Whether `earlier` precedes `later` in the full relation.
    pub fn precedes(&self, earlier: usize, later: usize) -> bool {
        self.reachability()[earlier][later]
    }

    pub fn is_concurrent(&self, a: usize, b: usize) -> bool {
        a != b && {
            let reach = self.reachability();
            !reach[a][b] && !reach[b][a]
        }
    }

    /// Stable topological order: among ready events the smallest index first.
    pub fn topological_order(&self) -> Vec<usize> {
        let n = self.events.len();
        let mut indegree = vec![0usize; n];
        for &(_, b) in &self.edges {
            indegree[b] += 1;
        }
        let mut ready: BTreeSet<usize> = (0..n).filter(|&i| indegree[i] == 0).collect();
        let mut out = Vec::with_capacity(n);
        while let Some(&next) = ready.iter().next() {
            ready.remove(&next);
            out.push(next);
            for &(a, b) in &self.edges {
                if a == next {
                    indegree[b] -= 1;
                    if indegree[b] == 0 {
                        ready.insert(b);
                    }
                }
            }
        }
        out
    }

    /// Content identity: equal keys mean the same labeled order regardless of
    /// event numbering. Same-label events are numbered along the stable
    /// topological order, which keeps keys equal across the linearizations a
    /// trace log can produce for one underlying order.
    pub fn canonical_key(&self) -> String {
        let order = self.topological_order();
        let mut occurrence = vec![0usize; self.events.len()];
        let mut seen: HashMap<&str, usize> = HashMap::new();
        for &idx in &order {
            let slot = seen.entry(self.events[idx].label.as_str()).or_insert(0);
            occurrence[idx] = *slot;
            *slot += 1;
        }
        let name = |idx: usize| format!("{}#{}", self.events[idx].label, occurrence[idx]);
        let mut nodes: Vec<String> = (0..self.events.len()).map(name).collect();
        nodes.sort();
        let mut edges: Vec<String> = self
            .edges
            .iter()
            .map(|&(a, b)| format!("{}>{}", name(a), name(b)))
            .collect();
        edges.sort();
        format!("{}|{}", nodes.join(","), edges.join(","))
    }

    /// Short human-readable label sequence for list rendering.
    pub fn preview(&self, max: usize) -> String {
        let order = self.topological_order();
        let parts: Vec<&str> = order
            .iter()
            .take(max)
            .map(|&idx| self.events[idx].label.as_str())
            .collect();
        let rest = order.len().saturating_sub(max);
        let mut text = parts.join(" ");
        if rest > 0 {
            text.push_str(&format!(" +{rest}"));
        }
        text
    }

    fn reachability(&self) -> Vec<Vec<bool>> {
        let n = self.events.len();
        let mut reach = vec![vec![false; n]; n];
        for &(a, b) in &self.edges {
            reach[a][b] = true;
        }
        for k in 0..n {
            for i in 0..n {
                if reach[i][k] {
                    for j in 0..n {
                        if reach[k][j] {
                            reach[i][j] = true;
                        }
                    }
                }
            }
        }
        reach
    }
}

fn transitive_reduction(n: usize, pairs: &BTreeSet<(usize, usize)>) -> BTreeSet<(usize, usize)> {
    let mut reach = vec![vec![false; n]; n];
    for &(a, b) in pairs {
        debug_assert!(a < n && b < n && a != b, "edge out of range or reflexive");
        reach[a][b] = true;
    }
    for k in 0..n {
        for i in 0..n {
            if reach[i][k] {
                for j in 0..n {
                    if reach[k][j] {
                        reach[i][j] = true;
                    }
                }
            }
        }
    }
    debug_assert!((0..n).all(|i| !reach[i][i]), "precedence relation has a cycle");
    pairs
        .iter()
        .copied()
        .filter(|&(a, b)| !(0..n).any(|k| k != a && k != b && reach[a][k] && reach[k][b]))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn diamond() -> PartialOrder {
        // a before everything, b and c unordered, d last
        let pairs: BTreeSet<(usize, usize)> =
            [(0, 1), (0, 2), (0, 3), (1, 3), (2, 3)].into_iter().collect();
        PartialOrder::from_pairs(["a", "b", "c", "d"], pairs)
    }

    #[test]
    fn chain_is_already_reduced() {
        let order = PartialOrder::from_chain(["a", "b", "c"]);
        let expected: BTreeSet<(usize, usize)> = [(0, 1), (1, 2)].into_iter().collect();
        assert_eq!(order.edges(), &expected);
        assert_eq!(order.topological_order(), vec![0, 1, 2]);
    }

    #[test]
    fn reduction_drops_implied_pairs() {
        let order = diamond();
        let expected: BTreeSet<(usize, usize)> =
            [(0, 1), (0, 2), (1, 3), (2, 3)].into_iter().collect();
        assert_eq!(order.edges(), &expected);
    }

    #[test]
    fn concurrency_and_precedence_queries() {
        let order = diamond();
        assert!(order.precedes(0, 3));
        assert!(order.is_concurrent(1, 2));
        assert!(!order.is_concurrent(0, 3));
        assert!(!order.is_concurrent(1, 1));
    }

    #[test]
    fn sources_and_sinks() {
        let order = diamond();
        assert_eq!(order.sources(), vec![0]);
        assert_eq!(order.sinks(), vec![3]);
    }

    #[test]
    fn canonical_key_ignores_event_numbering() {
        // the same diamond entered with b and c swapped
        let swapped: BTreeSet<(usize, usize)> =
            [(0, 1), (0, 2), (0, 3), (1, 3), (2, 3)].into_iter().collect();
        let other = PartialOrder::from_pairs(["a", "c", "b", "d"], swapped);
        assert_eq!(diamond().canonical_key(), other.canonical_key());
    }

    #[test]
    fn canonical_key_distinguishes_orders() {
        let chain = PartialOrder::from_chain(["a", "b", "c", "d"]);
        assert_ne!(chain.canonical_key(), diamond().canonical_key());
    }

    #[test]
    fn preview_truncates() {
        let order = PartialOrder::from_chain(["a", "b", "c", "d"]);
        assert_eq!(order.preview(2), "a b +2");
        assert_eq!(order.preview(10), "a b c d");
    }
}
