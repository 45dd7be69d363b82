//! `depscope closure` command implementation.

use std::path::Path;

use anyhow::Result;
use colored::Colorize;
use depscope::{
    ClosureDirection, Error, NodeFactory, NodeId, NodeKind, SelectionCriteria, TransitiveClosure,
};

use super::display::node_label;
use super::{OutputArgs, load_graph};

/// Options of the closure command.
#[derive(Debug, Clone)]
pub struct ClosureOptions {
    /// Seed nodes as `kind:name`; all packages when empty.
    pub seeds: Vec<String>,
    /// Start criteria include patterns.
    pub start: Vec<String>,
    /// Stop criteria include patterns; nothing stops when empty.
    pub stop: Vec<String>,
    /// Follow dependents instead of dependencies.
    pub inbound: bool,
    /// Maximum number of layers past the seed layer.
    pub layers: Option<usize>,
}

/// Run the closure command.
pub fn run(graph: &Path, strict: bool, options: &ClosureOptions, output: &OutputArgs) -> Result<()> {
    let source = load_graph(graph, strict)?;
    let seeds = resolve_seeds(&source, &options.seeds)?;

    let start = SelectionCriteria::builder();
    let start = options.start.iter().fold(start, |b, p| b.include(p.as_str())).build()?;
    let stop = SelectionCriteria::builder();
    let stop = options.stop.iter().fold(stop, |b, p| b.include(p.as_str())).build()?;
    let direction = if options.inbound {
        ClosureDirection::Inbound
    } else {
        ClosureDirection::Outbound
    };

    let mut closure = TransitiveClosure::new(&source, seeds, &start, stop, direction);
    match options.layers {
        Some(count) => closure.compute_layers(count),
        None => closure.compute_all_layers(),
    };

    if !output.json {
        print_layers(&closure);
    }
    output.emit(closure.factory())
}

/// Parse `kind:name` seeds and look them up. An empty list seeds every package.
pub fn resolve_seeds(factory: &NodeFactory, seeds: &[String]) -> depscope::Result<Vec<NodeId>> {
    if seeds.is_empty() {
        return Ok(factory.packages().collect());
    }

    seeds
        .iter()
        .map(|seed| {
            let (kind, name) = parse_seed(seed)?;
            factory.lookup(kind, name).ok_or_else(|| Error::NodeNotFound {
                kind,
                name: name.to_string(),
            })
        })
        .collect()
}

fn parse_seed(seed: &str) -> depscope::Result<(NodeKind, &str)> {
    let (kind, name) = seed
        .split_once(':')
        .ok_or_else(|| Error::Config(format!("seed `{seed}` is not of the form kind:name")))?;
    let kind = match kind {
        "package" => NodeKind::Package,
        "type" => NodeKind::Type,
        "member" => NodeKind::Member,
        other => return Err(Error::Config(format!("unknown node kind `{other}` in seed `{seed}`"))),
    };
    Ok((kind, name))
}

fn print_layers(closure: &TransitiveClosure<'_>) {
    let factory = closure.factory();
    for (index, layer) in closure.layers().enumerate() {
        println!(
            "{} {} ({} nodes)",
            "Layer".cyan().bold(),
            index.to_string().cyan().bold(),
            layer.len()
        );
        for &id in layer {
            println!("    {} {}", "•".dimmed(), node_label(factory, id));
        }
    }
    println!();
}
