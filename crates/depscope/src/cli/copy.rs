//! `depscope copy` command implementation.

use std::path::Path;

use anyhow::Result;
use colored::Colorize;
use depscope::{GraphCopier, GraphStats};

use super::{OutputArgs, SelectionArgs, load_graph};

/// Run the copy command.
pub fn run(graph: &Path, strict: bool, selection: &SelectionArgs, output: &OutputArgs) -> Result<()> {
    let source = load_graph(graph, strict)?;
    let strategy = selection.profile()?.strategy()?;

    let mut copier = GraphCopier::new(strategy);
    copier.copy_all(&source);
    let derived = copier.into_factory();

    if !output.json {
        let stats = GraphStats::of(&derived);
        println!(
            "{} {} of {} nodes, {} edges",
            "Copied".cyan().bold(),
            stats.nodes().to_string().green(),
            source.len(),
            stats.edges.to_string().green()
        );
        println!();
    }
    output.emit(&derived)
}
