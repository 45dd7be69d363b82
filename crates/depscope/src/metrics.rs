//! Per-node and per-graph counts for reporting.

use std::cmp::Reverse;

use serde::Serialize;

use crate::factory::NodeFactory;
use crate::node::{NodeId, NodeKind};

/// Edge and containment counts of one node.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct NodeMetrics {
    /// Number of nodes depending on this node.
    pub inbound: usize,
    /// Number of nodes this node depends on.
    pub outbound: usize,
    /// Types of a package, members of a type.
    pub children: usize,
}

impl NodeMetrics {
    /// Count the edges and children of `id`. `None` if the node is not live.
    #[must_use]
    pub fn of(factory: &NodeFactory, id: NodeId) -> Option<Self> {
        let node = factory.node(id)?;
        Some(Self {
            inbound: factory.inbound_count(id),
            outbound: factory.outbound_count(id),
            children: node.child_count(),
        })
    }
}

/// Summary counts of one graph.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct GraphStats {
    /// Number of package nodes.
    pub packages: usize,
    /// Number of type nodes.
    pub types: usize,
    /// Number of member nodes.
    pub members: usize,
    /// Nodes observed as declarations.
    pub confirmed: usize,
    /// Nodes only known as dependency endpoints.
    pub inferred: usize,
    /// Dependency edges.
    pub edges: usize,
}

impl GraphStats {
    /// Compute the counts for a factory.
    #[must_use]
    pub fn of(factory: &NodeFactory) -> Self {
        let confirmed = factory
            .all_nodes()
            .filter_map(|id| factory.node(id))
            .filter(|node| node.is_confirmed())
            .count();

        Self {
            packages: factory.count_of(NodeKind::Package),
            types: factory.count_of(NodeKind::Type),
            members: factory.count_of(NodeKind::Member),
            confirmed,
            inferred: factory.len() - confirmed,
            edges: factory.edge_count(),
        }
    }

    /// Total number of nodes.
    #[must_use]
    pub fn nodes(&self) -> usize {
        self.packages + self.types + self.members
    }
}

/// Which count to rank nodes by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ranking {
    /// Most depended upon first.
    Inbound,
    /// Most dependencies first.
    Outbound,
}

/// The `limit` nodes with the highest count, ties broken by kind then name.
#[must_use]
pub fn top_nodes(factory: &NodeFactory, ranking: Ranking, limit: usize) -> Vec<(NodeId, NodeMetrics)> {
    let mut ranked: Vec<(NodeId, NodeMetrics)> = factory
        .all_nodes()
        .filter_map(|id| NodeMetrics::of(factory, id).map(|m| (id, m)))
        .filter(|(_, m)| match ranking {
            Ranking::Inbound => m.inbound > 0,
            Ranking::Outbound => m.outbound > 0,
        })
        .collect();

    // all_nodes is already kind-then-name ordered and the sort is stable
    ranked.sort_by_key(|(_, m)| {
        Reverse(match ranking {
            Ranking::Inbound => m.inbound,
            Ranking::Outbound => m.outbound,
        })
    });
    ranked.truncate(limit);
    ranked
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> NodeFactory {
        let mut factory = NodeFactory::new();
        let a = factory.create_confirmed(NodeKind::Member, "a.A.a");
        let b = factory.create_member("b.B.b");
        let c = factory.create_member("c.C.c");
        factory.add_dependency(a, b);
        factory.add_dependency(a, c);
        factory.add_dependency(c, b);
        factory
    }

    #[test]
    fn node_metrics_count_edges_and_children() {
        let factory = sample();
        let b = factory.lookup(NodeKind::Member, "b.B.b").expect("b");
        let ty = factory.lookup(NodeKind::Type, "a.A").expect("type");

        let metrics = NodeMetrics::of(&factory, b).expect("live");
        assert_eq!(metrics, NodeMetrics { inbound: 2, outbound: 0, children: 0 });
        assert_eq!(NodeMetrics::of(&factory, ty).expect("live").children, 1);
    }

    #[test]
    fn graph_stats_split_confirmed_and_inferred() {
        let stats = GraphStats::of(&sample());

        assert_eq!(stats.packages, 3);
        assert_eq!(stats.types, 3);
        assert_eq!(stats.members, 3);
        assert_eq!(stats.nodes(), 9);
        assert_eq!(stats.confirmed, 3);
        assert_eq!(stats.inferred, 6);
        assert_eq!(stats.edges, 3);
    }

    #[test]
    fn top_nodes_orders_by_count() {
        let factory = sample();

        let names: Vec<&str> = top_nodes(&factory, Ranking::Inbound, 5)
            .into_iter()
            .filter_map(|(id, _)| factory.node(id))
            .map(|n| n.name())
            .collect();

        assert_eq!(names, vec!["b.B.b", "c.C.c"]);
        assert_eq!(top_nodes(&factory, Ranking::Outbound, 1).len(), 1);
    }
}
