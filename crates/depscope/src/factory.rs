//! Node factory: the arena that owns every node of one graph.
//!
//! ## Design
//!
//! - Nodes live in a `petgraph::StableDiGraph` so ids stay valid across deletions
//! - Each node gets a serial number; a [`NodeId`] only resolves while the slot
//!   it points at still holds the node with that serial
//! - Dependency edges are the arena's edges, directed from dependent to dependency
//! - Three name tables (packages, types, members) map names to ids
//!
//! Because a dependency is stored once, as a single directed edge, the outbound
//! set of `A` and the inbound set of `B` can never disagree: both are views of
//! the same edge list.
//!
//! ## Edge Direction Convention
//!
//! - **Edge source**: the node that has the dependency (the dependent)
//! - **Edge target**: the node being depended upon (the dependency)
//!
//! `a.A.m()` calling `b.B.n()` is stored as the edge `a.A.m() -> b.B.n()`.

use std::collections::{BTreeMap, BTreeSet};

use petgraph::Direction;
use petgraph::stable_graph::StableDiGraph;
use tracing::{debug, trace};

use crate::node::{Node, NodeDetail, NodeId, NodeKind, package_name_of, type_name_of};

/// Owning registry of the nodes and edges of one dependency graph.
///
/// Creation is idempotent: asking for a name that already exists returns the
/// existing node. New nodes start out inferred; [`confirm`](Self::confirm)
/// promotes them once their declaration has actually been seen.
#[derive(Debug, Clone, Default)]
pub struct NodeFactory {
    /// Node arena. Edge source depends on edge target.
    graph: StableDiGraph<Slot, ()>,

    /// Serial handed to the next created node.
    next_serial: u32,

    /// Package name -> id.
    packages: BTreeMap<String, NodeId>,

    /// Type name -> id.
    types: BTreeMap<String, NodeId>,

    /// Member name -> id.
    members: BTreeMap<String, NodeId>,
}

/// Arena weight: a node plus the serial its ids carry.
#[derive(Debug, Clone)]
struct Slot {
    serial: u32,
    node: Node,
}

impl NodeFactory {
    /// Create an empty factory.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // === Creation ===

    /// Return the package called `name`, creating it as inferred if needed.
    pub fn create_package(&mut self, name: &str) -> NodeId {
        if let Some(&id) = self.packages.get(name) {
            return id;
        }

        let id = self.insert(Node::new(
            name.to_string(),
            NodeDetail::Package {
                types: BTreeSet::new(),
            },
        ));
        self.packages.insert(name.to_string(), id);
        trace!(package = name, "Created package");
        id
    }

    /// Return the type called `name`, creating it and its package as inferred if needed.
    pub fn create_type(&mut self, name: &str) -> NodeId {
        if let Some(&id) = self.types.get(name) {
            return id;
        }

        let package = self.create_package(package_name_of(name));
        let id = self.insert(Node::new(
            name.to_string(),
            NodeDetail::Type {
                package,
                members: BTreeSet::new(),
            },
        ));
        if let Some(parent) = self.node_mut(package) {
            parent.add_child(id);
        }
        self.types.insert(name.to_string(), id);
        trace!(ty = name, "Created type");
        id
    }

    /// Return the member called `name`, creating it and its type as inferred if needed.
    pub fn create_member(&mut self, name: &str) -> NodeId {
        if let Some(&id) = self.members.get(name) {
            return id;
        }

        let owner = self.create_type(type_name_of(name));
        let id = self.insert(Node::new(name.to_string(), NodeDetail::Member { owner }));
        if let Some(parent) = self.node_mut(owner) {
            parent.add_child(id);
        }
        self.members.insert(name.to_string(), id);
        trace!(member = name, "Created member");
        id
    }

    /// Kind-dispatching form of the `create_*` methods.
    pub fn create(&mut self, kind: NodeKind, name: &str) -> NodeId {
        match kind {
            NodeKind::Package => self.create_package(name),
            NodeKind::Type => self.create_type(name),
            NodeKind::Member => self.create_member(name),
        }
    }

    /// Create (or reuse) a node and mark it confirmed.
    pub fn create_confirmed(&mut self, kind: NodeKind, name: &str) -> NodeId {
        let id = self.create(kind, name);
        self.confirm(id);
        id
    }

    /// Promote a node to confirmed.
    ///
    /// A declared member implies a declared type, and a declared type implies a
    /// declared package, so the enclosing nodes are confirmed too. Confirming is
    /// idempotent and never reversed. Returns `true` if `id` itself changed.
    pub fn confirm(&mut self, id: NodeId) -> bool {
        let mut changed = false;
        let mut current = Some(id);
        let mut first = true;

        while let Some(node_id) = current {
            let Some(node) = self.node_mut(node_id) else {
                break;
            };
            let promoted = node.confirm();
            if first {
                changed = promoted;
                first = false;
            }
            current = node.parent();
        }

        changed
    }

    // === Lookup ===

    /// Find a node by kind and name.
    #[must_use]
    pub fn lookup(&self, kind: NodeKind, name: &str) -> Option<NodeId> {
        self.table(kind).get(name).copied()
    }

    /// Borrow a node. `None` if the node was deleted, even when its slot
    /// has since been reused.
    ///
    /// Ids from another factory are not detected: one that happens to match a
    /// live slot and serial here resolves to this factory's node.
    #[must_use]
    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.graph
            .node_weight(id.index)
            .filter(|slot| slot.serial == id.serial)
            .map(|slot| &slot.node)
    }

    /// `true` if `id` names a live node of this factory.
    #[must_use]
    pub fn contains(&self, id: NodeId) -> bool {
        self.node(id).is_some()
    }

    /// Package ids in name order.
    pub fn packages(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.packages.values().copied()
    }

    /// Type ids in name order.
    pub fn types(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.types.values().copied()
    }

    /// Member ids in name order.
    pub fn members(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.members.values().copied()
    }

    /// Ids of one kind in name order.
    pub fn nodes_of(&self, kind: NodeKind) -> impl Iterator<Item = NodeId> + '_ {
        self.table(kind).values().copied()
    }

    /// Every node: packages, then types, then members, each in name order.
    pub fn all_nodes(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.packages().chain(self.types()).chain(self.members())
    }

    /// Number of nodes of one kind.
    #[must_use]
    pub fn count_of(&self, kind: NodeKind) -> usize {
        self.table(kind).len()
    }

    /// Total number of nodes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.graph.node_count()
    }

    /// `true` if the factory holds no nodes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    /// Total number of dependency edges.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    // === Dependencies ===

    /// Record that `from` depends on `to`.
    ///
    /// Idempotent; self-loops are allowed. Returns `true` if the edge is new.
    /// Ids that are not live in this factory make this a no-op.
    pub fn add_dependency(&mut self, from: NodeId, to: NodeId) -> bool {
        if !self.contains(from) || !self.contains(to) {
            return false;
        }
        if self.graph.find_edge(from.index, to.index).is_some() {
            return false;
        }
        self.graph.add_edge(from.index, to.index, ());
        true
    }

    /// Remove the dependency of `from` on `to`. Returns `true` if it existed.
    pub fn remove_dependency(&mut self, from: NodeId, to: NodeId) -> bool {
        if !self.contains(from) || !self.contains(to) {
            return false;
        }
        match self.graph.find_edge(from.index, to.index) {
            Some(edge) => self.graph.remove_edge(edge).is_some(),
            None => false,
        }
    }

    /// `true` if `from` depends on `to`.
    #[must_use]
    pub fn has_dependency(&self, from: NodeId, to: NodeId) -> bool {
        self.contains(from)
            && self.contains(to)
            && self.graph.find_edge(from.index, to.index).is_some()
    }

    /// Nodes that `id` depends on.
    pub fn outbound(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.neighbors(id, Direction::Outgoing)
    }

    /// Nodes that depend on `id`.
    pub fn inbound(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.neighbors(id, Direction::Incoming)
    }

    /// Number of nodes `id` depends on.
    #[must_use]
    pub fn outbound_count(&self, id: NodeId) -> usize {
        self.outbound(id).count()
    }

    /// Number of nodes depending on `id`.
    #[must_use]
    pub fn inbound_count(&self, id: NodeId) -> usize {
        self.inbound(id).count()
    }

    // === Deletion ===

    /// Delete a node together with the children it owns.
    ///
    /// The node is removed from its name table, unlinked from its parent, and
    /// every edge touching it is dropped from both endpoints. Returns `false`
    /// if the node was not live.
    pub fn delete_node(&mut self, id: NodeId) -> bool {
        let Some(node) = self.node(id) else {
            return false;
        };

        let children: Vec<NodeId> = node.children().collect();
        for child in children {
            self.delete_node(child);
        }

        let Some(Slot { node, .. }) = self.graph.remove_node(id.index) else {
            return false;
        };
        self.table_mut(node.kind()).remove(node.name());
        if let Some(parent) = node.parent()
            && let Some(parent) = self.node_mut(parent)
        {
            parent.remove_child(id);
        }

        debug!(kind = %node.kind(), name = node.name(), "Deleted node");
        true
    }

    fn insert(&mut self, node: Node) -> NodeId {
        let serial = self.next_serial;
        self.next_serial += 1;
        NodeId::new(self.graph.add_node(Slot { serial, node }), serial)
    }

    fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.graph
            .node_weight_mut(id.index)
            .filter(|slot| slot.serial == id.serial)
            .map(|slot| &mut slot.node)
    }

    /// Neighbours of a live node; a dead id has none.
    fn neighbors(&self, id: NodeId, direction: Direction) -> impl Iterator<Item = NodeId> + '_ {
        let live = self.contains(id);
        self.graph
            .neighbors_directed(id.index, direction)
            .filter(move |_| live)
            .filter_map(move |index| {
                self.graph
                    .node_weight(index)
                    .map(|slot| NodeId::new(index, slot.serial))
            })
    }

    fn table(&self, kind: NodeKind) -> &BTreeMap<String, NodeId> {
        match kind {
            NodeKind::Package => &self.packages,
            NodeKind::Type => &self.types,
            NodeKind::Member => &self.members,
        }
    }

    fn table_mut(&mut self, kind: NodeKind) -> &mut BTreeMap<String, NodeId> {
        match kind {
            NodeKind::Package => &mut self.packages,
            NodeKind::Type => &mut self.types,
            NodeKind::Member => &mut self.members,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn name(factory: &NodeFactory, id: NodeId) -> &str {
        factory.node(id).expect("live node").name()
    }

    #[test]
    fn create_is_idempotent() {
        let mut factory = NodeFactory::new();

        let first = factory.create_member("a.A.m()");
        let count = factory.len();
        let second = factory.create_member("a.A.m()");

        assert_eq!(first, second);
        assert_eq!(factory.len(), count);
    }

    #[test]
    fn create_member_builds_inferred_parent_chain() {
        let mut factory = NodeFactory::new();

        let member = factory.create_member("a.b.C.m(int)");

        let ty = factory.lookup(NodeKind::Type, "a.b.C").expect("type created");
        let package = factory.lookup(NodeKind::Package, "a.b").expect("package created");
        assert_eq!(factory.node(member).and_then(Node::parent), Some(ty));
        assert_eq!(factory.node(ty).and_then(Node::parent), Some(package));
        assert!(factory.node(ty).expect("type").children().any(|c| c == member));
        assert!(factory.node(package).expect("package").children().any(|c| c == ty));
        assert!(!factory.node(package).expect("package").is_confirmed());
        assert_eq!(factory.len(), 3);
    }

    #[test]
    fn confirm_propagates_to_enclosing_nodes() {
        let mut factory = NodeFactory::new();
        let member = factory.create_member("a.A.f");

        assert!(factory.confirm(member));
        assert!(!factory.confirm(member));

        for id in factory.all_nodes() {
            assert!(factory.node(id).expect("node").is_confirmed(), "{}", name(&factory, id));
        }
    }

    #[test]
    fn confirm_does_not_touch_children() {
        let mut factory = NodeFactory::new();
        let member = factory.create_member("a.A.f");
        let ty = factory.lookup(NodeKind::Type, "a.A").expect("type");

        factory.confirm(ty);

        assert!(!factory.node(member).expect("member").is_confirmed());
    }

    #[test]
    fn add_dependency_updates_both_views() {
        let mut factory = NodeFactory::new();
        let a = factory.create_type("a.A");
        let b = factory.create_type("b.B");

        assert!(factory.add_dependency(a, b));
        assert!(!factory.add_dependency(a, b));

        assert_eq!(factory.outbound(a).collect::<Vec<_>>(), vec![b]);
        assert_eq!(factory.inbound(b).collect::<Vec<_>>(), vec![a]);
        assert_eq!(factory.inbound_count(a), 0);
        assert_eq!(factory.outbound_count(b), 0);
        assert_eq!(factory.edge_count(), 1);
    }

    #[test]
    fn self_loop_is_allowed() {
        let mut factory = NodeFactory::new();
        let a = factory.create_type("a.A");

        assert!(factory.add_dependency(a, a));

        assert_eq!(factory.outbound(a).collect::<Vec<_>>(), vec![a]);
        assert_eq!(factory.inbound(a).collect::<Vec<_>>(), vec![a]);
    }

    #[test]
    fn remove_absent_dependency_is_noop() {
        let mut factory = NodeFactory::new();
        let a = factory.create_package("a");
        let b = factory.create_package("b");

        assert!(!factory.remove_dependency(a, b));
        factory.add_dependency(a, b);
        assert!(factory.remove_dependency(a, b));
        assert!(!factory.remove_dependency(a, b));
        assert_eq!(factory.inbound_count(b), 0);
    }

    #[test]
    fn delete_node_unlinks_edges_and_parent() {
        let mut factory = NodeFactory::new();
        let a = factory.create_member("a.A.a");
        let b = factory.create_member("b.B.b");
        let c = factory.create_member("c.C.c");
        factory.add_dependency(a, b);
        factory.add_dependency(b, c);
        let owner = factory.lookup(NodeKind::Type, "b.B").expect("type");

        assert!(factory.delete_node(b));

        assert_eq!(factory.outbound_count(a), 0);
        assert_eq!(factory.inbound_count(c), 0);
        assert_eq!(factory.lookup(NodeKind::Member, "b.B.b"), None);
        assert_eq!(factory.node(owner).expect("type").child_count(), 0);
        assert!(!factory.delete_node(b));
    }

    #[test]
    fn delete_package_cascades_to_owned_nodes() {
        let mut factory = NodeFactory::new();
        factory.create_member("a.A.a");
        factory.create_member("a.B.b");
        let package = factory.lookup(NodeKind::Package, "a").expect("package");

        factory.delete_node(package);

        assert!(factory.is_empty());
        assert_eq!(factory.count_of(NodeKind::Type), 0);
        assert_eq!(factory.count_of(NodeKind::Member), 0);
    }

    #[test]
    fn collections_iterate_in_name_order() {
        let mut factory = NodeFactory::new();
        factory.create_package("z");
        factory.create_package("a");
        factory.create_package("m");

        let names: Vec<&str> = factory.packages().map(|id| name(&factory, id)).collect();
        assert_eq!(names, vec!["a", "m", "z"]);
    }

    #[test]
    fn ids_outside_the_arena_are_ignored() {
        let mut factory = NodeFactory::new();
        let a = factory.create_package("a");
        let mut other = NodeFactory::new();
        other.create_package("x");
        let foreign = other.create_package("y");

        assert!(!factory.add_dependency(a, foreign));
        assert_eq!(factory.edge_count(), 0);
    }

    #[test]
    fn deleted_id_stays_dead_after_slot_reuse() {
        let mut factory = NodeFactory::new();
        let a = factory.create_package("a");
        let victim = factory.create_package("victim");
        factory.delete_node(victim);

        let fresh = factory.create_package("unrelated");

        assert_eq!(fresh.index(), victim.index(), "slot is reused");
        assert_ne!(fresh, victim);
        assert!(factory.node(victim).is_none());
        assert!(!factory.contains(victim));
        assert!(!factory.add_dependency(a, victim));
        assert!(!factory.has_dependency(a, fresh));
        assert!(!factory.confirm(victim));
        assert!(!factory.node(fresh).expect("fresh").is_confirmed());
        assert!(!factory.delete_node(victim));
        assert_eq!(name(&factory, fresh), "unrelated");
    }

    #[test]
    fn deleted_id_has_no_edges_after_slot_reuse() {
        let mut factory = NodeFactory::new();
        let a = factory.create_package("a");
        let victim = factory.create_package("victim");
        factory.delete_node(victim);
        let fresh = factory.create_package("unrelated");
        factory.add_dependency(a, fresh);
        factory.add_dependency(fresh, a);

        assert_eq!(factory.outbound_count(victim), 0);
        assert_eq!(factory.inbound_count(victim), 0);
        assert!(!factory.has_dependency(a, victim));
        assert!(!factory.remove_dependency(a, victim));
        assert!(factory.has_dependency(a, fresh));
        assert_eq!(factory.inbound(a).collect::<Vec<_>>(), vec![fresh]);
    }
}
