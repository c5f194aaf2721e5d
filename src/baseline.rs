use crate::graph::{Cost, Graph, NodeId};
use orx_priority_queue::*;

/// Dijkstra from `start` to all nodes of an indexed graph. Returns distances,
/// `f64::INFINITY` when unreachable.
///
/// Distance-only and backed by a decrease-key heap, so it shares nothing with
/// the generic search beyond the idea. Used to cross-check it.
pub fn dijkstra_all(graph: &Graph, start: NodeId) -> Vec<Cost> {
    let n = graph.len();
    let mut dist = vec![f64::INFINITY; n];
    if start >= n {
        return dist;
    }
    let mut pq: BinaryHeapWithMap<NodeId, Cost> = BinaryHeapWithMap::new();

    dist[start] = 0.0;
    pq.push(start, 0.0);

    while let Some((node_id, cost)) = pq.pop() {
        for &(next, w) in graph.neighbors(node_id) {
            let next_cost = cost + w;
            if next_cost < dist[next] {
                dist[next] = next_cost;
                pq.decrease_key_or_push(&next, next_cost);
            }
        }
    }
    dist
}
