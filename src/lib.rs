//! Generic best-first graph search and the primitives around it.
//!
//! The centre is [`search::explore`], one A* engine that also serves as
//! Dijkstra (zero heuristic); [`flood_fill()`] is the unweighted breadth-first
//! special case. [`priority_queue::PriQueue`] backs the search and
//! [`union_find::DisjointSets`] answers connectivity questions alongside it.
//! [`graph`], [`baseline`], [`geo`] and [`stop`] support the two drivers.

pub mod baseline;
pub mod flood_fill;
pub mod geo;
pub mod graph;
pub mod logging;
pub mod paths;
pub mod priority_queue;
pub mod search;
pub mod stop;
pub mod union_find;

pub use flood_fill::{flood_explore, flood_fill};
pub use paths::{all_paths_to, path_to};
pub use priority_queue::{PriQueue, WeightedItem};
pub use search::{explore, search, shortest_path, Distances, Explored, Halted, Predecessors, Settled};
pub use union_find::DisjointSets;
