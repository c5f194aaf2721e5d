/*
Generic best-first search: A*, with Dijkstra as the zero-heuristic special case.

The caller owns the graph. The engine only sees a start node, a heuristic, and
an expansion callback that yields (neighbour, edge weight) pairs for a node the
first time that node is settled. Edge weights must be non-negative and the
heuristic must never overestimate for the results to be shortest paths; neither
precondition is checked.

Superseded queue entries are not removed when a shorter distance turns up.
The node is pushed again and the stale entry is skipped when it eventually
pops, because by then the node is already settled. This trades a few extra
pops for not needing decrease-key.
*/

use crate::priority_queue::PriQueue;
use fnv::FnvBuildHasher;
use hashbrown::hash_map::Entry;
use hashbrown::{HashMap, HashSet};
use std::cmp::Ordering;
use std::error::Error;
use std::fmt;
use std::hash::Hash;
use std::ops::Add;

/// For each discovered node, the node(s) immediately before it on shortest
/// paths found so far. More than one entry means tied shortest paths.
/// Only complete for settled nodes.
pub type Predecessors<T> = HashMap<T, Vec<T>, FnvBuildHasher>;

/// Tentative distance from the start to each discovered node.
pub type Distances<T, D> = HashMap<T, D, FnvBuildHasher>;

/// Nodes whose distance is final.
pub type Settled<T> = HashSet<T, FnvBuildHasher>;

/// Everything a search learned about the graph.
#[derive(Debug, Clone)]
pub struct Explored<T, D> {
    pub prev: Predecessors<T>,
    /// Final for settled nodes, tentative for the rest of the frontier.
    pub dist: Distances<T, D>,
    /// Nodes that have been expanded.
    pub done: Settled<T>,
}

impl<T: Eq + Hash, D: Copy> Explored<T, D> {
    /// Distance to `node` if it has been settled.
    pub fn settled_distance(&self, node: &T) -> Option<D> {
        if self.done.contains(node) {
            self.dist.get(node).copied()
        } else {
            None
        }
    }
}

/// A search stopped early because expansion failed.
///
/// `partial` holds whatever had been built when the error arrived; `error` is
/// exactly what the callback returned. Display and source are those of `error`.
#[derive(Debug)]
pub struct Halted<R, E> {
    pub partial: R,
    pub error: E,
}

impl<R, E> Halted<R, E> {
    pub fn into_parts(self) -> (R, E) {
        (self.partial, self.error)
    }

    pub fn map_partial<S>(self, f: impl FnOnce(R) -> S) -> Halted<S, E> {
        Halted {
            partial: f(self.partial),
            error: self.error,
        }
    }
}

impl<R, E: fmt::Display> fmt::Display for Halted<R, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.error.fmt(f)
    }
}

impl<R: fmt::Debug, E: Error> Error for Halted<R, E> {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        self.error.source()
    }
}

/// Runs A* from `start` and returns predecessors together with distances.
///
/// `heuristic(node)` estimates the remaining cost from `node` to the goal.
/// `expand(node, dist)` is called exactly once per settled node with its final
/// distance, and returns the node's out-edges, `None` for no out-edges, or an
/// error. An error stops the search immediately; the state built so far is
/// handed back inside [`Halted`].
#[tracing::instrument(level = "debug", skip_all)]
pub fn explore<T, D, E, I, H, X>(
    start: T,
    mut heuristic: H,
    mut expand: X,
) -> Result<Explored<T, D>, Halted<Explored<T, D>, E>>
where
    T: Clone + Eq + Hash,
    D: Copy + Ord + Add<Output = D> + Default,
    H: FnMut(&T) -> D,
    X: FnMut(&T, D) -> Result<Option<I>, E>,
    I: IntoIterator<Item = (T, D)>,
{
    let zero = D::default();
    let mut prev: Predecessors<T> = HashMap::default();
    let mut dist: Distances<T, D> = HashMap::default();
    let mut done: Settled<T> = HashSet::default();
    let mut pq = PriQueue::new();
    let mut stale = 0_usize;

    dist.insert(start.clone(), zero);
    pq.push(start, zero);

    while let Some((node, _)) = pq.pop() {
        if done.contains(&node) {
            stale += 1;
            continue;
        }
        let node_dist = dist[&node];
        done.insert(node.clone());
        tracing::trace!(settled = done.len(), frontier = pq.len(), "expanding");

        let next = match expand(&node, node_dist) {
            Ok(next) => next,
            Err(error) => {
                tracing::debug!(settled = done.len(), stale, "search halted by expansion error");
                return Err(Halted {
                    partial: Explored { prev, dist, done },
                    error,
                });
            }
        };
        let Some(next) = next else {
            continue;
        };

        for (neighbor, weight) in next {
            let new_dist = node_dist + weight;
            match dist.entry(neighbor) {
                Entry::Occupied(mut entry) => match entry.get().cmp(&new_dist) {
                    Ordering::Less => {}
                    Ordering::Equal => {
                        let preds = prev.entry(entry.key().clone()).or_default();
                        // parallel edges from the same node
                        if preds.last() != Some(&node) {
                            preds.push(node.clone());
                        }
                    }
                    Ordering::Greater => {
                        entry.insert(new_dist);
                        let neighbor = entry.key().clone();
                        prev.insert(neighbor.clone(), vec![node.clone()]);
                        let priority = new_dist + heuristic(&neighbor);
                        pq.push(neighbor, priority);
                    }
                },
                Entry::Vacant(entry) => {
                    let neighbor = entry.key().clone();
                    entry.insert(new_dist);
                    prev.insert(neighbor.clone(), vec![node.clone()]);
                    let priority = new_dist + heuristic(&neighbor);
                    pq.push(neighbor, priority);
                }
            }
        }
    }

    tracing::debug!(settled = done.len(), stale, "search complete");
    Ok(Explored { prev, dist, done })
}

/// A* search from `start`, returning the predecessor map.
///
/// If `heuristic` never overestimates the remaining distance, the map encodes
/// every shortest path to each settled node. See [`explore`] for the contract
/// of `expand`.
pub fn search<T, D, E, I, H, X>(
    start: T,
    heuristic: H,
    expand: X,
) -> Result<Predecessors<T>, Halted<Predecessors<T>, E>>
where
    T: Clone + Eq + Hash,
    D: Copy + Ord + Add<Output = D> + Default,
    H: FnMut(&T) -> D,
    X: FnMut(&T, D) -> Result<Option<I>, E>,
    I: IntoIterator<Item = (T, D)>,
{
    explore(start, heuristic, expand)
        .map(|explored| explored.prev)
        .map_err(|halted| halted.map_partial(|explored| explored.prev))
}

/// Dijkstra's algorithm: [`search`] with a heuristic that is always zero.
pub fn shortest_path<T, D, E, I, X>(
    start: T,
    expand: X,
) -> Result<Predecessors<T>, Halted<Predecessors<T>, E>>
where
    T: Clone + Eq + Hash,
    D: Copy + Ord + Add<Output = D> + Default,
    X: FnMut(&T, D) -> Result<Option<I>, E>,
    I: IntoIterator<Item = (T, D)>,
{
    search(start, |_: &T| D::default(), expand)
}
