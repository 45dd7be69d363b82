//! Common display utilities for CLI commands.

use std::collections::HashMap;

use colored::Colorize;
use depscope::document::records;
use depscope::{NodeFactory, NodeId, NodeKind, NodeRecord};

/// Format a node name, marking inferred nodes with `*`.
pub fn node_label(factory: &NodeFactory, id: NodeId) -> String {
    match factory.node(id) {
        Some(node) if node.is_confirmed() => display_name(node.name()).to_string(),
        Some(node) => format!("{} {}", display_name(node.name()), "*".yellow()),
        None => id.to_string(),
    }
}

fn display_name(name: &str) -> &str {
    if name.is_empty() { "<default>" } else { name }
}

/// Print a graph as an indented package / type / member tree with its links.
pub fn print_graph(factory: &NodeFactory) {
    let by_name: HashMap<(NodeKind, String), NodeRecord> = records(factory, true)
        .into_iter()
        .map(|record| ((record.kind, record.name.clone()), record))
        .collect();

    for package in factory.packages() {
        print_node(factory, &by_name, package, 0);
    }
}

fn print_node(
    factory: &NodeFactory,
    by_name: &HashMap<(NodeKind, String), NodeRecord>,
    id: NodeId,
    depth: usize,
) {
    let Some(node) = factory.node(id) else {
        return;
    };
    let indent = "    ".repeat(depth);

    let label = node_label(factory, id);
    match node.kind() {
        NodeKind::Package => println!("{indent}{}", label.as_str().cyan().bold()),
        NodeKind::Type => println!("{indent}{}", label.as_str().white().bold()),
        NodeKind::Member => println!("{indent}{label}"),
    }

    if let Some(record) = by_name.get(&(node.kind(), node.name().to_string())) {
        for link in record.outbound.iter().chain(&record.inbound) {
            let marker = if link.confirmed { "" } else { " *" };
            println!(
                "{indent}    {} {}{}",
                link.direction.arrow().dimmed(),
                display_name(&link.name),
                marker.yellow()
            );
        }
    }

    let mut children: Vec<NodeId> = node.children().collect();
    children.sort_by_key(|&child| factory.node(child).map(|n| n.name().to_string()));
    for child in children {
        print_node(factory, by_name, child, depth + 1);
    }
}
