/*
Single-source shortest paths on an unweighted directed graph.

Same conventions as the weighted search, but every edge weighs 1 and depths are
counted as usize. Because depths come out of a FIFO queue in order, no heap is
needed and no stale entries arise: a node is queued once, when first discovered.
*/

use crate::search::{Distances, Explored, Halted, Predecessors, Settled};
use hashbrown::hash_map::Entry;
use std::collections::VecDeque;
use std::hash::Hash;

/// Breadth-first flood fill from `start`, returning predecessors and depths.
///
/// `visit(node, depth)` is called once for every reachable node, in order of
/// non-decreasing depth, and returns the node's neighbours, `None`, or an
/// error. An error stops the fill and the partial state comes back inside
/// [`Halted`].
#[tracing::instrument(level = "debug", skip_all)]
pub fn flood_explore<T, E, I, X>(
    start: T,
    mut visit: X,
) -> Result<Explored<T, usize>, Halted<Explored<T, usize>, E>>
where
    T: Clone + Eq + Hash,
    X: FnMut(&T, usize) -> Result<Option<I>, E>,
    I: IntoIterator<Item = T>,
{
    let mut prev: Predecessors<T> = Predecessors::default();
    let mut dist: Distances<T, usize> = Distances::default();
    let mut queue = VecDeque::new();
    let mut done: Settled<T> = Settled::default();

    dist.insert(start.clone(), 0);
    queue.push_back(start);

    while let Some(node) = queue.pop_front() {
        let depth = dist[&node];
        done.insert(node.clone());
        let next = match visit(&node, depth) {
            Ok(next) => next,
            Err(error) => {
                tracing::debug!(settled = done.len(), depth, "flood fill halted by visit error");
                return Err(Halted {
                    partial: Explored { prev, dist, done },
                    error,
                });
            }
        };
        let Some(next) = next else {
            continue;
        };

        let next_depth = depth + 1;
        for neighbor in next {
            match dist.entry(neighbor) {
                Entry::Occupied(entry) => {
                    if *entry.get() == next_depth {
                        let preds = prev.entry(entry.key().clone()).or_default();
                        if preds.last() != Some(&node) {
                            preds.push(node.clone());
                        }
                    }
                }
                Entry::Vacant(entry) => {
                    let neighbor = entry.key().clone();
                    entry.insert(next_depth);
                    prev.insert(neighbor.clone(), vec![node.clone()]);
                    queue.push_back(neighbor);
                }
            }
        }
    }

    tracing::debug!(settled = done.len(), "flood fill complete");
    Ok(Explored { prev, dist, done })
}

/// Breadth-first flood fill from `start`, returning the predecessor map.
pub fn flood_fill<T, E, I, X>(
    start: T,
    visit: X,
) -> Result<Predecessors<T>, Halted<Predecessors<T>, E>>
where
    T: Clone + Eq + Hash,
    X: FnMut(&T, usize) -> Result<Option<I>, E>,
    I: IntoIterator<Item = T>,
{
    flood_explore(start, visit)
        .map(|explored| explored.prev)
        .map_err(|halted| halted.map_partial(|explored| explored.prev))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::shortest_path;
    use proptest::prelude::*;
    use std::collections::BTreeMap;
    use std::convert::Infallible;

    #[test]
    fn fills_a_small_grid() {
        // 3x3 grid with a wall in the middle.
        let open = |(x, y): (i32, i32)| (0..3).contains(&x) && (0..3).contains(&y) && (x, y) != (1, 1);
        let explored = flood_explore((0, 0), |&(x, y), _| {
            let next: Vec<(i32, i32)> = [(1, 0), (-1, 0), (0, 1), (0, -1)]
                .into_iter()
                .map(|(dx, dy)| (x + dx, y + dy))
                .filter(|&p| open(p))
                .collect();
            Ok::<_, Infallible>(Some(next))
        })
        .unwrap();
        assert_eq!(explored.done.len(), 8);
        assert_eq!(explored.dist[&(2, 2)], 4);
        assert!(!explored.dist.contains_key(&(1, 1)));
        let mut opposite = explored.prev[&(2, 2)].clone();
        opposite.sort_unstable();
        assert_eq!(opposite, vec![(1, 2), (2, 1)]);
    }

    #[test]
    fn visits_in_depth_order_once_each() {
        let edges: &[&[u8]] = &[&[1, 2], &[3, 0], &[3, 3], &[]];
        let mut visits = Vec::new();
        let prev = flood_fill(0_u8, |&n, depth| {
            visits.push((n, depth));
            let out = edges[n as usize];
            Ok::<_, Infallible>(if out.is_empty() { None } else { Some(out.iter().copied()) })
        })
        .unwrap();
        assert_eq!(visits, vec![(0, 0), (1, 1), (2, 1), (3, 2)]);
        assert_eq!(prev[&3], vec![1, 2]);
        assert!(!prev.contains_key(&0));
    }

    #[test]
    fn parallel_edges_record_predecessor_once() {
        let prev = flood_fill('A', |&n, _| {
            Ok::<_, Infallible>(if n == 'A' { Some(vec!['B', 'B']) } else { None })
        })
        .unwrap();
        assert_eq!(prev[&'B'], vec!['A']);
    }

    #[test]
    fn visit_error_halts() {
        let result = flood_fill(0_u32, |&n, _| if n == 2 { Err(n) } else { Ok(Some([n + 1, n + 10])) });
        let (prev, error) = result.unwrap_err().into_parts();
        assert_eq!(error, 2);
        // 0 -> {1, 10}, 1 -> {2, 11}, 10 -> {11, 20}, then 2 fails.
        assert_eq!(prev.len(), 5);
        assert_eq!(prev[&11], vec![1, 10]);
        assert!(!prev.contains_key(&3));
    }

    proptest! {
        #[test]
        fn agrees_with_unit_weight_dijkstra(
            n in 2_usize..10,
            edges in proptest::collection::vec((0_usize..10, 0_usize..10), 0..30),
        ) {
            let mut adj = vec![Vec::new(); n];
            for (u, v) in edges {
                if u < n && v < n {
                    adj[u].push(v);
                }
            }
            let normalise = |prev: Predecessors<usize>| -> BTreeMap<usize, Vec<usize>> {
                prev.into_iter()
                    .map(|(k, mut v)| {
                        v.sort_unstable();
                        v.dedup();
                        (k, v)
                    })
                    .collect()
            };

            let bfs = flood_fill(0_usize, |&u, _| Ok::<_, Infallible>(Some(adj[u].iter().copied()))).unwrap();
            let dijkstra = shortest_path(0_usize, |&u: &usize, _: u32| {
                Ok::<_, Infallible>(Some(adj[u].iter().map(|&v| (v, 1_u32))))
            })
            .unwrap();
            prop_assert_eq!(normalise(bfs), normalise(dijkstra));
        }
    }
}
