// Walking predecessor maps back into concrete start-to-target paths.

use crate::search::Predecessors;
use fnv::FnvBuildHasher;
use hashbrown::HashSet;
use std::hash::Hash;

/// One shortest path from `start` to `target`, both ends included, following
/// the first recorded predecessor of every node.
///
/// Returns `None` when `target` was never reached, or if the map loops back on
/// itself before arriving at `start`.
pub fn path_to<T: Clone + Eq + Hash>(prev: &Predecessors<T>, start: &T, target: &T) -> Option<Vec<T>> {
    let mut path = vec![target.clone()];
    let mut seen: HashSet<&T, FnvBuildHasher> = HashSet::default();
    let mut cur = target;
    while cur != start {
        if !seen.insert(cur) {
            return None;
        }
        cur = prev.get(cur)?.first()?;
        path.push(cur.clone());
    }
    path.reverse();
    Some(path)
}

/// Every shortest path from `start` to `target` recorded in `prev`, each
/// ordered start to target. Only simple paths are produced, so zero-weight
/// cycles do not blow up the result.
pub fn all_paths_to<T: Clone + Eq + Hash>(prev: &Predecessors<T>, start: &T, target: &T) -> Vec<Vec<T>> {
    let mut out = Vec::new();
    let mut suffix = Vec::new();
    walk_back(prev, start, target, &mut suffix, &mut out);
    out
}

fn walk_back<T: Clone + Eq + Hash>(
    prev: &Predecessors<T>,
    start: &T,
    node: &T,
    suffix: &mut Vec<T>,
    out: &mut Vec<Vec<T>>,
) {
    suffix.push(node.clone());
    if node == start {
        out.push(suffix.iter().rev().cloned().collect());
    } else if let Some(preds) = prev.get(node) {
        for p in preds {
            if !suffix.contains(p) {
                walk_back(prev, start, p, suffix, out);
            }
        }
    }
    suffix.pop();
}
