//! Layered transitive closure over dependency edges.
//!
//! ## Layers
//!
//! Layer 0 holds the seed nodes selected by the start criteria. Each further
//! layer holds the nodes first reached from the previous layer by following
//! edges in the configured [`ClosureDirection`]. A node belongs to at most one
//! layer, so expansion reaches a fixed point on any finite graph, cyclic or
//! not.
//!
//! ## Stop criteria
//!
//! A node matching the stop criteria is never expanded:
//!
//! - reached during expansion, it still joins its layer and marks the
//!   boundary of the closure;
//! - selected as a seed, its immediate neighbours are recorded in the output
//!   graph together with their edges, but they are not layered.
//!
//! A stop criteria that matches everything therefore yields a single layer
//! plus the seeds' direct neighbours.
//!
//! Every layered or recorded node is copied into the closure's own
//! [`NodeFactory`]; layers are reported as ids in that factory.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::copier::replicate;
use crate::criteria::SelectionCriteria;
use crate::factory::NodeFactory;
use crate::node::NodeId;

/// Which edges a closure follows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClosureDirection {
    /// From a node to the nodes it depends on.
    #[default]
    Outbound,
    /// From a node to the nodes that depend on it.
    Inbound,
}

#[derive(Debug, Default)]
struct Layer {
    /// Ids in the graph being explored.
    source: Vec<NodeId>,
    /// Ids of the same nodes in the closure's factory.
    copies: Vec<NodeId>,
}

/// Incremental transitive closure over a borrowed graph.
#[derive(Debug)]
pub struct TransitiveClosure<'g> {
    source: &'g NodeFactory,
    stop: SelectionCriteria,
    direction: ClosureDirection,
    factory: NodeFactory,
    layers: Vec<Layer>,
    visited: HashSet<NodeId>,
    copies: HashMap<NodeId, NodeId>,
}

impl<'g> TransitiveClosure<'g> {
    /// Select the seed layer.
    ///
    /// Seeds are searched through containment, so passing the packages of a
    /// graph considers every type and member as well. Only nodes matching
    /// `start` enter layer 0.
    pub fn new<I>(
        source: &'g NodeFactory,
        seeds: I,
        start: &SelectionCriteria,
        stop: SelectionCriteria,
        direction: ClosureDirection,
    ) -> Self
    where
        I: IntoIterator<Item = NodeId>,
    {
        let mut closure = Self {
            source,
            stop,
            direction,
            factory: NodeFactory::new(),
            layers: Vec::new(),
            visited: HashSet::new(),
            copies: HashMap::new(),
        };

        let mut seen = HashSet::new();
        let mut pending: Vec<NodeId> = seeds.into_iter().collect();
        pending.reverse();
        let mut layer = Layer::default();

        while let Some(id) = pending.pop() {
            if !seen.insert(id) {
                continue;
            }
            let Some(node) = source.node(id) else {
                continue;
            };
            if start.matches(node)
                && closure.visited.insert(id)
                && let Some(copy) = closure.record(id)
            {
                layer.source.push(id);
                layer.copies.push(copy);
            }
            let mut children: Vec<NodeId> = node.children().collect();
            children.reverse();
            pending.extend(children);
        }

        debug!(layer = 0, nodes = layer.source.len(), "Selected seed layer");
        closure.layers.push(layer);
        closure
    }

    /// Closure over every node of `source`, starting from its packages.
    pub fn over_all(
        source: &'g NodeFactory,
        start: &SelectionCriteria,
        stop: SelectionCriteria,
        direction: ClosureDirection,
    ) -> Self {
        Self::new(
            source,
            source.packages().collect::<Vec<_>>(),
            start,
            stop,
            direction,
        )
    }

    /// Compute one more layer.
    ///
    /// Returns `false`, leaving the layer count unchanged, once the frontier
    /// is exhausted. Calling it again after that is a no-op.
    pub fn compute_next_layer(&mut self) -> bool {
        let Some(depth) = self.layers.len().checked_sub(1) else {
            return false;
        };
        let frontier = self.layers[depth].source.clone();
        let source = self.source;

        let mut next = Layer::default();
        for id in frontier {
            let Some(node) = source.node(id) else {
                continue;
            };
            let is_stop = self.stop.matches(node);
            if is_stop && depth > 0 {
                trace!(name = node.name(), "Stopped at boundary node");
                continue;
            }

            for partner in self.partners(id) {
                let fresh = !self.visited.contains(&partner) && !is_stop;
                let Some(copy) = self.link(id, partner) else {
                    continue;
                };
                if fresh {
                    self.visited.insert(partner);
                    next.source.push(partner);
                    next.copies.push(copy);
                }
            }
        }

        if next.source.is_empty() {
            return false;
        }

        debug!(
            layer = depth + 1,
            nodes = next.source.len(),
            recorded = self.factory.len(),
            "Computed layer"
        );
        self.layers.push(next);
        true
    }

    /// Compute up to `count` more layers. Returns how many were added.
    pub fn compute_layers(&mut self, count: usize) -> usize {
        let mut added = 0;
        while added < count && self.compute_next_layer() {
            added += 1;
        }
        added
    }

    /// Compute layers until the fixed point. Returns how many were added.
    pub fn compute_all_layers(&mut self) -> usize {
        let mut added = 0;
        while self.compute_next_layer() {
            added += 1;
        }
        added
    }

    /// Number of layers, the seed layer included.
    #[must_use]
    pub fn layer_count(&self) -> usize {
        self.layers.len()
    }

    /// Nodes of layer `index`, as ids in [`factory`](Self::factory).
    #[must_use]
    pub fn layer(&self, index: usize) -> Option<&[NodeId]> {
        self.layers.get(index).map(|layer| layer.copies.as_slice())
    }

    /// Every layer in order.
    pub fn layers(&self) -> impl Iterator<Item = &[NodeId]> + '_ {
        self.layers.iter().map(|layer| layer.copies.as_slice())
    }

    /// The direction being followed.
    #[must_use]
    pub fn direction(&self) -> ClosureDirection {
        self.direction
    }

    /// The closure graph: every layered or recorded node and the edges between them.
    #[must_use]
    pub fn factory(&self) -> &NodeFactory {
        &self.factory
    }

    /// Consume the closure and keep its graph.
    #[must_use]
    pub fn into_factory(self) -> NodeFactory {
        self.factory
    }

    fn partners(&self, id: NodeId) -> Vec<NodeId> {
        match self.direction {
            ClosureDirection::Outbound => self.source.outbound(id).collect(),
            ClosureDirection::Inbound => self.source.inbound(id).collect(),
        }
    }

    /// Copy a source node into the closure graph, once.
    fn record(&mut self, id: NodeId) -> Option<NodeId> {
        if let Some(&copy) = self.copies.get(&id) {
            return Some(copy);
        }
        let node = self.source.node(id)?;
        let copy = replicate(&mut self.factory, node, true);
        self.copies.insert(id, copy);
        Some(copy)
    }

    /// Add the edge between `id` and `partner` in the closure graph.
    /// Returns the partner's copy.
    fn link(&mut self, id: NodeId, partner: NodeId) -> Option<NodeId> {
        let here = self.record(id)?;
        let there = self.record(partner)?;
        match self.direction {
            ClosureDirection::Outbound => self.factory.add_dependency(here, there),
            ClosureDirection::Inbound => self.factory.add_dependency(there, here),
        };
        Some(there)
    }
}
