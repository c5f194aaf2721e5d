/*
Disjoint sets over arbitrary hashable elements.

The structure is open-world: any element not seen before is treated as a new
singleton set the first time it is referenced, so no registration step is
needed. Elements are never removed.

Find compresses the whole walked path onto the root. Union picks the surviving
root with a fair coin flip rather than by rank or size, so depth is only good
in expectation.
*/

use fnv::FnvBuildHasher;
use hashbrown::{HashMap, HashSet};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::hash::Hash;

#[derive(Debug, Clone)]
pub struct DisjointSets<K> {
    parent: HashMap<K, K, FnvBuildHasher>,
    rng: StdRng,
}

impl<K: Clone + Eq + Hash> Default for DisjointSets<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Clone + Eq + Hash> DisjointSets<K> {
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }

    /// Same as `new`, but union coin flips are reproducible.
    pub fn with_seed(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }

    fn with_rng(rng: StdRng) -> Self {
        Self {
            parent: HashMap::default(),
            rng,
        }
    }

    /// Number of elements seen so far, across all sets.
    pub fn len(&self) -> usize {
        self.parent.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parent.is_empty()
    }

    pub fn contains(&self, x: &K) -> bool {
        self.parent.contains_key(x)
    }

    /// Returns the representative element of the set containing `x`,
    /// inserting `x` as a new singleton set if it has not been seen before.
    /// Every element on the walk from `x` is repointed straight at the root.
    pub fn find(&mut self, x: K) -> K {
        let Some(first) = self.parent.get(&x) else {
            self.parent.insert(x.clone(), x.clone());
            return x;
        };

        let mut root = first.clone();
        loop {
            let up = &self.parent[&root];
            if *up == root {
                break;
            }
            root = up.clone();
        }

        let mut cur = x;
        while cur != root {
            match self.parent.insert(cur, root.clone()) {
                Some(next) => cur = next,
                None => break,
            }
        }
        root
    }

    /// Merges the set containing `x` with the set containing `y`.
    /// Returns false if they were already the same set.
    pub fn union(&mut self, x: K, y: K) -> bool {
        let p = self.find(x);
        let q = self.find(y);
        if p == q {
            return false;
        }
        if self.rng.gen_bool(0.5) {
            self.parent.insert(p, q);
        } else {
            self.parent.insert(q, p);
        }
        true
    }

    pub fn connected(&mut self, x: K, y: K) -> bool {
        self.find(x) == self.find(y)
    }

    /// All current representatives, one per set.
    pub fn reps(&mut self) -> HashSet<K, FnvBuildHasher> {
        let elements: Vec<K> = self.parent.keys().cloned().collect();
        elements.into_iter().map(|x| self.find(x)).collect()
    }

    /// Every set, keyed by its representative.
    pub fn sets(&mut self) -> HashMap<K, Vec<K>, FnvBuildHasher> {
        let elements: Vec<K> = self.parent.keys().cloned().collect();
        let mut sets: HashMap<K, Vec<K>, FnvBuildHasher> = HashMap::default();
        for x in elements {
            let rep = self.find(x.clone());
            sets.entry(rep).or_default().push(x);
        }
        sets
    }

    /// Parent pointer of `x` without compressing anything.
    #[cfg(test)]
    fn parent_of(&self, x: &K) -> Option<&K> {
        self.parent.get(x)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn unseen_element_is_its_own_singleton() {
        let mut ds = DisjointSets::with_seed(1);
        assert!(ds.is_empty());
        assert_eq!(ds.find("a"), "a");
        assert_eq!(ds.len(), 1);
        assert!(ds.contains(&"a"));
        assert!(!ds.contains(&"b"));
    }

    #[test]
    fn union_joins_and_reports_merges() {
        let mut ds = DisjointSets::with_seed(7);
        assert!(ds.union(1, 2));
        assert!(ds.union(3, 4));
        assert!(!ds.connected(1, 3));
        assert!(ds.union(2, 3));
        assert!(!ds.union(1, 4));
        assert!(ds.connected(1, 4));
        assert_eq!(ds.len(), 4);
    }

    #[test]
    fn find_compresses_full_path() {
        let mut ds = DisjointSets::with_seed(0);
        // Build a chain by hand: 4 -> 3 -> 2 -> 1 -> 1.
        ds.parent.insert(1, 1);
        ds.parent.insert(2, 1);
        ds.parent.insert(3, 2);
        ds.parent.insert(4, 3);

        assert_eq!(ds.find(4), 1);
        for x in [2, 3, 4] {
            assert_eq!(ds.parent_of(&x), Some(&1));
        }
    }

    #[test]
    fn reps_and_sets() {
        let mut ds = DisjointSets::with_seed(42);
        ds.union('a', 'b');
        ds.union('b', 'c');
        ds.union('x', 'y');
        ds.find('q');

        let reps = ds.reps();
        assert_eq!(reps.len(), 3);

        let sets = ds.sets();
        assert_eq!(sets.len(), 3);
        let mut sizes: Vec<usize> = sets.values().map(Vec::len).collect();
        sizes.sort_unstable();
        assert_eq!(sizes, vec![1, 2, 3]);

        for (rep, members) in &sets {
            assert!(reps.contains(rep));
            assert!(members.contains(rep));
            for m in members {
                assert_eq!(ds.find(*m), *rep);
            }
        }
    }

    #[test]
    fn cycle_detection_while_building_a_graph() {
        let edges = [(0, 1), (1, 2), (3, 4), (2, 0)];
        let mut ds = DisjointSets::new();
        let closing: Vec<(i32, i32)> = edges
            .iter()
            .copied()
            .filter(|&(u, v)| !ds.union(u, v))
            .collect();
        assert_eq!(closing, vec![(2, 0)]);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(200))]

        #[test]
        fn find_is_idempotent(
            seed in any::<u64>(),
            ops in proptest::collection::vec((0_u8..30, 0_u8..30), 0..60),
        ) {
            let mut ds = DisjointSets::with_seed(seed);
            for &(x, y) in &ops {
                ds.union(x, y);
            }
            for x in 0_u8..30 {
                let r = ds.find(x);
                prop_assert_eq!(ds.find(r), r);
            }
        }

        #[test]
        fn connectivity_matches_naive_labels(
            seed in any::<u64>(),
            ops in proptest::collection::vec((0_usize..20, 0_usize..20), 0..40),
        ) {
            // Naive reference: relabel whole components on every merge.
            let mut label: Vec<usize> = (0..20).collect();
            let mut ds = DisjointSets::with_seed(seed);
            for &(x, y) in &ops {
                ds.union(x, y);
                let (from, to) = (label[x], label[y]);
                for l in label.iter_mut() {
                    if *l == from {
                        *l = to;
                    }
                }
            }
            for x in 0..20 {
                for y in 0..20 {
                    prop_assert_eq!(ds.find(x) == ds.find(y), label[x] == label[y]);
                }
            }
            let distinct: std::collections::HashSet<usize> = label.iter().copied().collect();
            prop_assert_eq!(ds.sets().len(), distinct.len());
        }
    }
}
