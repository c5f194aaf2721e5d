use anyhow::{bail, Context, Result};
use clap::{Parser, ValueEnum};
use csv::Writer;
use fnv::FnvHashMap;
use frontier::geo::{straight_line_to, Coord};
use frontier::graph::{Cost, Graph, NodeId};
use frontier::stop::{guard, split_outcome, Interrupt, Stop};
use frontier::{baseline, explore, logging, path_to, Explored};
use ordered_float::OrderedFloat;
use osmpbfreader::{NodeId as OsmNodeId, OsmObj, OsmPbfReader, Tags, WayId};
use std::collections::HashSet;
use std::fs::File;
use std::time::Instant;

#[derive(Parser, Debug)]
#[command(name = "osm")]
#[command(about = "Build a graph from an OSM .pbf and search it from a source node id.", long_about = None)]
struct Cli {
    /// Path to the .osm.pbf file
    #[arg(short, long, env = "FRONTIER_PBF")]
    pbf: String,

    /// OSM node id to search from
    #[arg(short, long)]
    source: i64,

    /// OSM node id to route to; the search stops once it is settled
    #[arg(short, long)]
    target: Option<i64>,

    #[arg(short, long, value_enum, default_value_t = Algorithm::Dijkstra, env = "FRONTIER_ALGORITHM")]
    algorithm: Algorithm,

    /// Output CSV (node_id, distance_m). If omitted, prints a summary to stdout.
    #[arg(short, long)]
    out: Option<String>,

    /// Include unreached nodes in output with infinite distance
    #[arg(long, default_value_t = false)]
    include_unreachable: bool,

    /// Only include 'highway' ways. If false, attempts to include all linear ways.
    #[arg(long, default_value_t = true, action = clap::ArgAction::Set)]
    only_highways: bool,

    /// Debug-level logging
    #[arg(short, long)]
    verbose: bool,

    /// Log filter, e.g. "trace" or "frontier=debug"
    #[arg(long, env = "FRONTIER_LOG_LEVEL")]
    log_level: Option<String>,

    /// Log as JSON lines
    #[arg(long)]
    log_json: bool,
}

impl Cli {
    /// Flag combinations that can be rejected before the extract is read.
    fn validate(&self) -> Result<()> {
        if self.algorithm == Algorithm::Astar && self.target.is_none() {
            bail!("--algorithm astar needs --target");
        }
        Ok(())
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum Algorithm {
    /// A* with a straight-line heuristic; needs --target
    Astar,
    /// Generic search with a zero heuristic
    Dijkstra,
    /// Distance-only Dijkstra with a decrease-key heap, over the whole graph
    Baseline,
}

#[derive(Clone, Debug)]
struct WayLite {
    id: WayId,
    nodes: Vec<OsmNodeId>,
    tags: Tags,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Direction {
    Forward,
    Backward,
    Both,
}

fn is_way_routable(tags: &Tags, only_highways: bool) -> bool {
    if only_highways && !tags.contains_key("highway") {
        return false;
    }
    // Exclude areas and non-linear ways
    !tags.get("area").map(|v| v == "yes").unwrap_or(false)
}

fn way_direction(tags: &Tags) -> Direction {
    match tags.get("oneway").map(|v| v.as_str()) {
        Some("yes" | "true" | "1") => return Direction::Forward,
        Some("-1") => return Direction::Backward,
        _ => {}
    }
    if tags
        .get("junction")
        .map(|v| v == "roundabout")
        .unwrap_or(false)
    {
        return Direction::Forward;
    }
    Direction::Both
}

/// The routable part of an extract, re-indexed densely.
struct RoadGraph {
    graph: Graph,
    coords: Vec<Coord>,
    idx_to_id: Vec<OsmNodeId>,
    id_to_idx: FnvHashMap<OsmNodeId, NodeId>,
}

impl RoadGraph {
    fn load(path: &str, only_highways: bool) -> Result<Self> {
        // Pass 1: collect routable ways and the set of node ids they reference
        let file = File::open(path).with_context(|| format!("opening {}", path))?;
        let mut pbf = OsmPbfReader::new(file);

        let mut needed_nodes: HashSet<OsmNodeId> = HashSet::new();
        let mut ways: Vec<WayLite> = Vec::new();
        for obj in pbf.iter() {
            if let OsmObj::Way(w) = obj? {
                if is_way_routable(&w.tags, only_highways) {
                    needed_nodes.extend(w.nodes.iter().copied());
                    ways.push(WayLite {
                        id: w.id,
                        nodes: w.nodes,
                        tags: w.tags,
                    });
                }
            }
        }
        tracing::info!(ways = ways.len(), nodes = needed_nodes.len(), "collected routable ways");

        // Pass 2: read coordinates for needed nodes
        let file = File::open(path).with_context(|| format!("reopening {}", path))?;
        let mut pbf = OsmPbfReader::new(file);

        let mut coords = Vec::with_capacity(needed_nodes.len());
        let mut idx_to_id = Vec::with_capacity(needed_nodes.len());
        let mut id_to_idx: FnvHashMap<OsmNodeId, NodeId> = FnvHashMap::default();
        for obj in pbf.iter() {
            if let OsmObj::Node(n) = obj? {
                if needed_nodes.contains(&n.id) {
                    id_to_idx.insert(n.id, idx_to_id.len());
                    idx_to_id.push(n.id);
                    coords.push(Coord::new(n.lat(), n.lon()));
                }
            }
        }
        tracing::info!(nodes = coords.len(), "loaded coordinates");

        let mut graph = Graph::with_nodes(coords.len());
        for w in &ways {
            let direction = way_direction(&w.tags);
            for pair in w.nodes.windows(2) {
                let (Some(&u), Some(&v)) = (id_to_idx.get(&pair[0]), id_to_idx.get(&pair[1])) else {
                    continue;
                };
                let weight: Cost = coords[u].haversine_meters(coords[v]);
                if !(weight.is_finite() && weight > 0.0) {
                    tracing::trace!(way = w.id.0, "skipping degenerate segment");
                    continue;
                }
                if direction != Direction::Backward {
                    graph.add_edge(u, v, weight)?;
                }
                if direction != Direction::Forward {
                    graph.add_edge(v, u, weight)?;
                }
            }
        }
        tracing::info!(nodes = graph.len(), edges = graph.edge_count(), "graph built");

        Ok(Self {
            graph,
            coords,
            idx_to_id,
            id_to_idx,
        })
    }

    fn index_of(&self, id: i64) -> Result<NodeId> {
        match self.id_to_idx.get(&OsmNodeId(id)) {
            Some(&idx) => Ok(idx),
            None => bail!("node {} is not on any routable way", id),
        }
    }
}

/// Settled distances (meters) per dense index, predecessors when recorded,
/// and why the search stopped early if it did.
struct Outcome {
    dist: Vec<Option<Cost>>,
    prev: Option<frontier::Predecessors<NodeId>>,
    stop: Option<Stop>,
}

impl Outcome {
    fn from_explored(n: usize, explored: Explored<NodeId, OrderedFloat<Cost>>, stop: Option<Stop>) -> Self {
        let dist = (0..n)
            .map(|v| explored.settled_distance(&v).map(OrderedFloat::into_inner))
            .collect();
        Self {
            dist,
            prev: Some(explored.prev),
            stop,
        }
    }
}

impl Algorithm {
    fn run(self, roads: &RoadGraph, source: NodeId, target: Option<NodeId>, interrupt: &Interrupt) -> Result<Outcome> {
        let graph = &roads.graph;
        let expand = guard(target, interrupt.clone(), |&u: &NodeId, _: OrderedFloat<Cost>| {
            graph.weighted_neighbors(u)
        });
        let outcome = match self {
            Algorithm::Astar => {
                let Some(goal) = target else {
                    bail!("--algorithm astar needs --target");
                };
                let heuristic = straight_line_to(&roads.coords, roads.coords[goal]);
                let (explored, stop) = split_outcome(explore(source, heuristic, expand));
                Outcome::from_explored(graph.len(), explored, stop)
            }
            Algorithm::Dijkstra => {
                let (explored, stop) = split_outcome(explore(source, |_| OrderedFloat(0.0), expand));
                Outcome::from_explored(graph.len(), explored, stop)
            }
            Algorithm::Baseline => Outcome {
                dist: baseline::dijkstra_all(graph, source)
                    .into_iter()
                    .map(|d| d.is_finite().then_some(d))
                    .collect(),
                prev: None,
                stop: None,
            },
        };
        Ok(outcome)
    }
}

fn write_csv(path: &str, roads: &RoadGraph, outcome: &Outcome, include_unreachable: bool) -> Result<()> {
    let mut wtr = Writer::from_path(path).with_context(|| format!("creating CSV {}", path))?;
    wtr.write_record(["node_id", "distance_m"])?;

    let mut rows: Vec<(NodeId, Cost)> = outcome
        .dist
        .iter()
        .enumerate()
        .map(|(idx, d)| (idx, d.unwrap_or(f64::INFINITY)))
        .filter(|(_, d)| d.is_finite() || include_unreachable)
        .collect();
    rows.sort_by(|a, b| a.1.total_cmp(&b.1));

    for &(idx, d) in &rows {
        let nid = roads.idx_to_id[idx].0;
        let val = if d.is_finite() {
            format!("{:.6}", d)
        } else {
            String::from("inf")
        };
        wtr.write_record(&[nid.to_string(), val])?;
    }
    wtr.flush()?;
    println!("Wrote distances for {} nodes to {}", rows.len(), path);
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init_tracing(cli.verbose, cli.log_level.as_deref(), cli.log_json)?;
    cli.validate()?;

    let roads = RoadGraph::load(&cli.pbf, cli.only_highways)?;
    println!(
        "Graph: {} nodes, {} directed edges",
        roads.graph.len(),
        roads.graph.edge_count()
    );

    let source = roads.index_of(cli.source)?;
    let target = cli.target.map(|t| roads.index_of(t)).transpose()?;

    let interrupt = Interrupt::on_ctrlc();
    let now = Instant::now();
    let outcome = cli.algorithm.run(&roads, source, target, &interrupt)?;
    println!("{} s", now.elapsed().as_secs_f64());
    if outcome.stop == Some(Stop::Interrupted) {
        tracing::warn!("interrupted; reporting the partial result");
    }

    if let (Some(goal), Some(goal_id)) = (target, cli.target) {
        match outcome.dist[goal] {
            Some(d) => {
                println!("Distance from {} to {} (m): {:.2}", cli.source, goal_id, d);
                if let Some(path) = outcome.prev.as_ref().and_then(|prev| path_to(prev, &source, &goal)) {
                    let ids: Vec<String> = path.iter().map(|&idx| roads.idx_to_id[idx].0.to_string()).collect();
                    println!("Path ({} nodes): {}", ids.len(), ids.join(" -> "));
                }
            }
            None => println!("No route from {} to {}", cli.source, goal_id),
        }
    }

    match cli.out {
        Some(out_path) => write_csv(&out_path, &roads, &outcome, cli.include_unreachable)?,
        None => {
            let reached: Vec<Cost> = outcome.dist.iter().flatten().copied().collect();
            println!("Nodes: {}", outcome.dist.len());
            println!("Reached from {}: {}", cli.source, reached.len());
            if let Some(maxd) = reached.iter().copied().reduce(f64::max) {
                println!("Max distance (m): {:.2}", maxd);
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        let mut argv = vec!["osm", "--pbf", "extract.osm.pbf", "--source", "42"];
        argv.extend_from_slice(args);
        Cli::try_parse_from(argv).unwrap()
    }

    #[test]
    fn astar_without_target_is_rejected_up_front() {
        let err = parse(&["--algorithm", "astar"]).validate().unwrap_err();
        assert_eq!(err.to_string(), "--algorithm astar needs --target");
        assert!(parse(&["--algorithm", "astar", "--target", "7"]).validate().is_ok());
        assert!(parse(&["--algorithm", "dijkstra"]).validate().is_ok());
    }
}
