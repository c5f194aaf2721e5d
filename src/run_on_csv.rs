use anyhow::{bail, Context, Result};
use clap::{Parser, ValueEnum};
use csv::Writer;
use frontier::graph::{Graph, NodeId};
use frontier::stop::{guard, split_outcome, Interrupt, Stop};
use frontier::{baseline, explore, flood_explore, logging, path_to, Explored, Predecessors};
use ordered_float::OrderedFloat;
use std::time::Instant;

#[derive(Parser, Debug)]
#[command(name = "csv")]
#[command(about = "Build a graph from a CSV with node_id,neighbor_id,weight per row and run a shortest-path search from a source node id.", long_about = None)]
struct Cli {
    /// Path to the .csv file
    #[arg(short, long, env = "FRONTIER_CSV")]
    csv: String,

    /// Node id to search from
    #[arg(short, long, default_value_t = 0)]
    source: NodeId,

    /// Stop once this node is settled and print a shortest path to it
    #[arg(short, long)]
    target: Option<NodeId>,

    /// Number of timed runs
    #[arg(short = 'n', long, default_value_t = 1)]
    runs: usize,

    #[arg(short, long, value_enum, default_value_t = Algorithm::Dijkstra, env = "FRONTIER_ALGORITHM")]
    algorithm: Algorithm,

    /// Output CSV (node_id, distance, predecessors). If omitted, prints a summary to stdout.
    #[arg(short, long)]
    out: Option<String>,

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

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum Algorithm {
    /// Generic search with a zero heuristic
    Dijkstra,
    /// Breadth-first; every edge counts as 1
    FloodFill,
    /// Distance-only Dijkstra with a decrease-key heap
    Baseline,
}

/// What a run found: settled distances per node, predecessors when the
/// algorithm records them, and why it stopped early if it did.
struct Outcome {
    dist: Vec<Option<f64>>,
    prev: Option<Predecessors<NodeId>>,
    stop: Option<Stop>,
}

impl Outcome {
    fn from_explored<D: Copy>(
        n: usize,
        explored: Explored<NodeId, D>,
        stop: Option<Stop>,
        to_f64: impl Fn(D) -> f64,
    ) -> Self {
        let dist = (0..n)
            .map(|v| explored.settled_distance(&v).map(&to_f64))
            .collect();
        Self {
            dist,
            prev: Some(explored.prev),
            stop,
        }
    }
}

impl Algorithm {
    fn run(self, graph: &Graph, source: NodeId, target: Option<NodeId>, interrupt: &Interrupt) -> Outcome {
        match self {
            Algorithm::Dijkstra => {
                let expand = guard(target, interrupt.clone(), |&u: &NodeId, _: OrderedFloat<f64>| {
                    graph.weighted_neighbors(u)
                });
                let (explored, stop) = split_outcome(explore(source, |_| OrderedFloat(0.0), expand));
                Outcome::from_explored(graph.len(), explored, stop, OrderedFloat::into_inner)
            }
            Algorithm::FloodFill => {
                let expand = guard(target, interrupt.clone(), |&u: &NodeId, _: usize| {
                    graph.unweighted_neighbors(u)
                });
                let (explored, stop) = split_outcome(flood_explore(source, expand));
                Outcome::from_explored(graph.len(), explored, stop, |depth| depth as f64)
            }
            Algorithm::Baseline => Outcome {
                dist: baseline::dijkstra_all(graph, source)
                    .into_iter()
                    .map(|d| d.is_finite().then_some(d))
                    .collect(),
                prev: None,
                stop: None,
            },
        }
    }
}

fn write_csv(path: &str, outcome: &Outcome) -> Result<()> {
    let mut wtr = Writer::from_path(path).with_context(|| format!("creating CSV {}", path))?;
    wtr.write_record(["node_id", "distance", "predecessors"])?;

    let mut reached: Vec<(NodeId, f64)> = outcome
        .dist
        .iter()
        .enumerate()
        .filter_map(|(v, d)| d.map(|d| (v, d)))
        .collect();
    reached.sort_by(|a, b| a.1.total_cmp(&b.1).then(a.0.cmp(&b.0)));

    for &(v, d) in &reached {
        let preds = outcome
            .prev
            .as_ref()
            .and_then(|prev| prev.get(&v))
            .map(|ps| ps.iter().map(ToString::to_string).collect::<Vec<_>>().join(";"))
            .unwrap_or_default();
        wtr.write_record(&[v.to_string(), format!("{:.6}", d), preds])?;
    }
    wtr.flush()?;
    println!("Wrote distances for {} nodes to {}", reached.len(), path);
    Ok(())
}

fn print_summary(source: NodeId, outcome: &Outcome) {
    let reached: Vec<f64> = outcome.dist.iter().flatten().copied().collect();
    println!("Nodes: {}", outcome.dist.len());
    println!("Reached from {}: {}", source, reached.len());
    if let Some(maxd) = reached.iter().copied().reduce(f64::max) {
        println!("Max distance: {:.2}", maxd);
    }
}

fn print_path(source: NodeId, target: NodeId, outcome: &Outcome) {
    let Some(d) = outcome.dist.get(target).copied().flatten() else {
        println!("No path from {} to {}", source, target);
        return;
    };
    match outcome.prev.as_ref().and_then(|prev| path_to(prev, &source, &target)) {
        Some(path) => {
            let hops: Vec<String> = path.iter().map(ToString::to_string).collect();
            println!("Path ({:.2}): {}", d, hops.join(" -> "));
        }
        None => println!("Distance from {} to {}: {:.2}", source, target, d),
    }
}

fn check_node(graph: &Graph, node: NodeId, flag: &str) -> Result<()> {
    if node >= graph.len() {
        bail!("--{} {} is out of range for a graph of {} nodes", flag, node, graph.len());
    }
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init_tracing(cli.verbose, cli.log_level.as_deref(), cli.log_json)?;

    let graph = Graph::from_csv_path(&cli.csv).with_context(|| format!("loading {}", &cli.csv))?;
    tracing::info!(nodes = graph.len(), edges = graph.edge_count(), "graph loaded");
    check_node(&graph, cli.source, "source")?;
    if let Some(target) = cli.target {
        check_node(&graph, target, "target")?;
    }

    let interrupt = Interrupt::on_ctrlc();
    let mut duration_millis = Vec::with_capacity(cli.runs);
    let mut last = None;
    for run in 0..cli.runs.max(1) {
        let now = Instant::now();
        let outcome = cli.algorithm.run(&graph, cli.source, cli.target, &interrupt);
        duration_millis.push(now.elapsed().as_secs_f64() * 1000.0);

        let interrupted = outcome.stop == Some(Stop::Interrupted);
        last = Some(outcome);
        if interrupted {
            tracing::warn!(run, "interrupted; reporting the partial result");
            break;
        }
    }
    println!("{:?}", duration_millis);

    let Some(outcome) = last else {
        return Ok(());
    };
    if let Some(target) = cli.target {
        print_path(cli.source, target, &outcome);
    }
    match cli.out {
        Some(out_path) => write_csv(&out_path, &outcome)?,
        None => print_summary(cli.source, &outcome),
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_nodes_outside_the_graph() {
        let graph = Graph::from_edges(&[(0, 1, 1.0), (1, 2, 1.0)]).unwrap();
        assert!(check_node(&graph, 2, "source").is_ok());
        let err = check_node(&graph, 3, "source").unwrap_err();
        assert_eq!(err.to_string(), "--source 3 is out of range for a graph of 3 nodes");
        assert!(check_node(&graph, 7, "target").is_err());
    }
}
