//! Frequency-ranked partial-order fragments.

use std::collections::BTreeSet;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use crate::domain::order::PartialOrder;

/// One ranked fragment. Other components refer to fragments by index only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fragment {
    pub index: usize,
    pub order: PartialOrder,
    pub frequency: u64,
}

/// The ranked fragment list produced from one upload. Immutable after
/// construction; a new upload replaces the whole collection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FragmentCollection {
    fragments: Vec<Fragment>,
}

impl FragmentCollection {
    /// Rank weighted orders by descending frequency and assign dense indices.
    /// The sort is stable so equal frequencies keep their production order.
    pub fn rank(mut weighted: Vec<(PartialOrder, u64)>) -> Self {
        weighted.sort_by(|a, b| b.1.cmp(&a.1));
        let fragments = weighted
            .into_iter()
            .enumerate()
            .map(|(index, (order, frequency))| Fragment {
                index,
                order,
                frequency,
            })
            .collect();
        Self { fragments }
    }

    pub fn len(&self) -> usize {
        self.fragments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Fragment> {
        self.fragments.get(index)
    }

    pub fn fragments(&self) -> &[Fragment] {
        &self.fragments
    }

    pub fn total_weight(&self) -> u64 {
        self.fragments.iter().map(|f| f.frequency).sum()
    }

    pub fn max_weight(&self) -> u64 {
        self.fragments.iter().map(|f| f.frequency).max().unwrap_or(0)
    }

    /// Fragments at the given indices in ascending index order. Out-of-range
    /// indices are skipped; callers clamp before selecting.
    pub fn subset(&self, indices: &BTreeSet<usize>) -> Vec<&Fragment> {
        indices.iter().filter_map(|&i| self.fragments.get(i)).collect()
    }

    /// Content identity for the whole collection, used to decide whether a
    /// persisted selection still applies.
    pub fn fingerprint(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.fragments.len().hash(&mut hasher);
        for fragment in &self.fragments {
            fragment.order.canonical_key().hash(&mut hasher);
            fragment.frequency.hash(&mut hasher);
        }
        hasher.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn collection() -> FragmentCollection {
        FragmentCollection::rank(vec![
            (PartialOrder::from_chain(["a"]), 3),
            (PartialOrder::from_chain(["a", "b"]), 10),
            (PartialOrder::from_chain(["b"]), 5),
        ])
    }

    #[test]
    fn ranks_by_descending_frequency_with_dense_indices() {
        let ranked = collection();
        let freqs: Vec<u64> = ranked.fragments().iter().map(|f| f.frequency).collect();
        assert_eq!(freqs, vec![10, 5, 3]);
        let indices: Vec<usize> = ranked.fragments().iter().map(|f| f.index).collect();
        assert_eq!(indices, vec![0, 1, 2]);
    }

    #[test]
    fn subset_is_ascending_and_clamped() {
        let ranked = collection();
        let picked: BTreeSet<usize> = [2, 0, 9].into_iter().collect();
        let subset = ranked.subset(&picked);
        let indices: Vec<usize> = subset.iter().map(|f| f.index).collect();
        assert_eq!(indices, vec![0, 2]);
    }

    #[test]
    fn totals_and_maximum() {
        let ranked = collection();
        assert_eq!(ranked.total_weight(), 18);
        assert_eq!(ranked.max_weight(), 10);
    }

    #[test]
    fn fingerprint_tracks_content() {
        let a = collection();
        let b = collection();
        assert_eq!(a.fingerprint(), b.fingerprint());
        let changed = FragmentCollection::rank(vec![
            (PartialOrder::from_chain(["a", "b"]), 10),
            (PartialOrder::from_chain(["b"]), 5),
        ]);
        assert_ne!(a.fingerprint(), changed.fingerprint());
    }
}
