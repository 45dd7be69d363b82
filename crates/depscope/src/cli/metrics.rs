//! `depscope metrics` command implementation.

use std::path::Path;

use anyhow::Result;
use colored::Colorize;
use depscope::metrics::top_nodes;
use depscope::{GraphStats, NodeFactory, NodeKind, NodeMetrics, Ranking};
use serde::Serialize;

use super::display::node_label;
use super::load_graph;

#[derive(Serialize)]
struct RankedNode {
    kind: NodeKind,
    name: String,
    #[serde(flatten)]
    metrics: NodeMetrics,
}

#[derive(Serialize)]
struct MetricsReport {
    stats: GraphStats,
    most_depended_upon: Vec<RankedNode>,
    most_dependencies: Vec<RankedNode>,
}

/// Run the metrics command.
pub fn run(graph: &Path, strict: bool, top: usize, json: bool) -> Result<()> {
    let factory = load_graph(graph, strict)?;
    let stats = GraphStats::of(&factory);

    if json {
        let report = MetricsReport {
            stats,
            most_depended_upon: ranked(&factory, Ranking::Inbound, top),
            most_dependencies: ranked(&factory, Ranking::Outbound, top),
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("{}", "Graph Statistics".cyan().bold());
    println!();
    println!("  {}: {}", "Packages".white().bold(), stats.packages.to_string().green());
    println!("  {}: {}", "Types".white().bold(), stats.types.to_string().green());
    println!("  {}: {}", "Members".white().bold(), stats.members.to_string().green());
    println!(
        "  {}: {} confirmed, {} inferred",
        "Nodes".white().bold(),
        stats.confirmed.to_string().green(),
        stats.inferred.to_string().yellow()
    );
    println!("  {}: {}", "Dependencies".white().bold(), stats.edges.to_string().green());

    print_ranking(&factory, "Most depended upon", Ranking::Inbound, top);
    print_ranking(&factory, "Most dependencies", Ranking::Outbound, top);
    Ok(())
}

fn ranked(factory: &NodeFactory, ranking: Ranking, top: usize) -> Vec<RankedNode> {
    top_nodes(factory, ranking, top)
        .into_iter()
        .filter_map(|(id, metrics)| {
            let node = factory.node(id)?;
            Some(RankedNode {
                kind: node.kind(),
                name: node.name().to_string(),
                metrics,
            })
        })
        .collect()
}

fn print_ranking(factory: &NodeFactory, title: &str, ranking: Ranking, top: usize) {
    let nodes = top_nodes(factory, ranking, top);
    if nodes.is_empty() {
        return;
    }

    println!();
    println!("{}", title.cyan().bold());
    for (id, metrics) in nodes {
        let count = match ranking {
            Ranking::Inbound => metrics.inbound,
            Ranking::Outbound => metrics.outbound,
        };
        let kind = factory.node(id).map_or("?", |n| n.kind().as_str());
        println!(
            "  {:>5}  {:<7} {}",
            count.to_string().green(),
            kind.dimmed(),
            node_label(factory, id)
        );
    }
}
