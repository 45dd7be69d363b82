//! Graph copier: materialize a filtered copy of a graph into a new factory.
//!
//! The copier walks from the given nodes through containment and outbound
//! dependencies, visiting each source node once. Every visited node that the
//! strategy puts in scope is recreated in the copier's own factory, confirmed
//! only if the source node is confirmed. Its edges are copied when the far
//! endpoint passes the strategy's filter; the far endpoint is created as
//! inferred unless a visit of its own confirms it.
//!
//! The derived factory shares nothing with the source: ids, nodes and edges
//! are fresh.

use std::collections::HashSet;

use tracing::{debug, trace};

use crate::factory::NodeFactory;
use crate::node::{Node, NodeId, NodeKind};
use crate::strategy::TraversalStrategy;

/// Builds a derived graph under a [`TraversalStrategy`].
#[derive(Debug)]
pub struct GraphCopier<S> {
    strategy: S,
    target: NodeFactory,
    visited: HashSet<NodeId>,
}

impl<S: TraversalStrategy> GraphCopier<S> {
    /// Create a copier with an empty target factory.
    pub fn new(strategy: S) -> Self {
        Self {
            strategy,
            target: NodeFactory::new(),
            visited: HashSet::new(),
        }
    }

    /// The strategy in use.
    pub fn strategy(&self) -> &S {
        &self.strategy
    }

    /// Copy everything reachable from `nodes` that the strategy admits.
    ///
    /// May be called repeatedly; source nodes already visited are skipped.
    /// Ids that are not live in `source` are ignored.
    pub fn copy<I>(&mut self, source: &NodeFactory, nodes: I)
    where
        I: IntoIterator<Item = NodeId>,
    {
        let nodes_before = self.target.len();
        let edges_before = self.target.edge_count();

        let mut pending: Vec<NodeId> = nodes.into_iter().collect();
        pending.reverse();

        while let Some(id) = pending.pop() {
            if !self.visited.insert(id) {
                continue;
            }
            let Some(node) = source.node(id) else {
                continue;
            };

            if self.strategy.in_scope(node) {
                self.copy_node_and_edges(source, id, node);
            }

            pending.extend(source.outbound(id).filter(|p| !self.visited.contains(p)));
            let mut children: Vec<NodeId> = node.children().collect();
            children.reverse();
            pending.extend(children);
        }

        if !self.strategy.show_empty_nodes() {
            prune_empty_nodes(&mut self.target);
        }

        debug!(
            nodes = self.target.len().saturating_sub(nodes_before),
            edges = self.target.edge_count().saturating_sub(edges_before),
            visited = self.visited.len(),
            "Copied graph"
        );
    }

    /// Copy the whole source graph, starting from its packages.
    pub fn copy_all(&mut self, source: &NodeFactory) {
        self.copy(source, source.packages().collect::<Vec<_>>());
    }

    /// The derived graph built so far.
    #[must_use]
    pub fn factory(&self) -> &NodeFactory {
        &self.target
    }

    /// Consume the copier and keep the derived graph.
    #[must_use]
    pub fn into_factory(self) -> NodeFactory {
        self.target
    }

    fn copy_node_and_edges(&mut self, source: &NodeFactory, id: NodeId, node: &Node) {
        let copy = replicate(&mut self.target, node, true);

        for partner_id in source.outbound(id) {
            let Some(partner) = source.node(partner_id) else {
                continue;
            };
            if self.strategy.in_filter(partner) {
                let partner_copy = replicate(&mut self.target, partner, false);
                self.target.add_dependency(copy, partner_copy);
                trace!(from = node.name(), to = partner.name(), "Copied outbound edge");
            }
        }

        for partner_id in source.inbound(id) {
            let Some(partner) = source.node(partner_id) else {
                continue;
            };
            if self.strategy.in_filter(partner) {
                let partner_copy = replicate(&mut self.target, partner, false);
                self.target.add_dependency(partner_copy, copy);
                trace!(from = partner.name(), to = node.name(), "Copied inbound edge");
            }
        }
    }
}

/// Create (or reuse) the equivalent of `node` in `target`.
///
/// With `keep_confirmed`, a confirmed source node is confirmed in the target.
/// Otherwise the copy is left as it is (inferred when new).
pub(crate) fn replicate(target: &mut NodeFactory, node: &Node, keep_confirmed: bool) -> NodeId {
    let id = target.create(node.kind(), node.name());
    if keep_confirmed && node.is_confirmed() {
        target.confirm(id);
    }
    id
}

/// Delete nodes with no edges and no children, members first.
///
/// Returns the number of nodes deleted. A type emptied by the member pass is
/// picked up by the type pass, and likewise for packages.
pub fn prune_empty_nodes(factory: &mut NodeFactory) -> usize {
    let mut deleted = 0;

    for kind in [NodeKind::Member, NodeKind::Type, NodeKind::Package] {
        let empty: Vec<NodeId> = factory
            .nodes_of(kind)
            .filter(|&id| is_empty_node(factory, id))
            .collect();
        for id in empty {
            if factory.delete_node(id) {
                deleted += 1;
            }
        }
    }

    if deleted > 0 {
        debug!(deleted, "Pruned empty nodes");
    }
    deleted
}

fn is_empty_node(factory: &NodeFactory, id: NodeId) -> bool {
    factory.node(id).is_some_and(|node| node.child_count() == 0)
        && factory.outbound_count(id) == 0
        && factory.inbound_count(id) == 0
}
