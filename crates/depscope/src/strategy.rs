//! Traversal strategies decide which nodes a traversal emits and which
//! dependency edges it keeps.

use crate::criteria::{MATCH_ALL, SelectionCriteria};
use crate::error::Result;
use crate::node::{Node, NodeKind};

/// Scope and filter decisions consulted by the copier.
pub trait TraversalStrategy {
    /// `true` if `node` is emitted into the derived graph.
    fn in_scope(&self, node: &Node) -> bool;

    /// `true` if an edge whose far endpoint is `node` is kept.
    fn in_filter(&self, node: &Node) -> bool;

    /// `false` asks the traversal to drop emitted nodes left without edges.
    fn show_empty_nodes(&self) -> bool {
        true
    }
}

/// Strategy built from a scope criteria and a filter criteria.
#[derive(Debug, Clone)]
pub struct SelectiveTraversalStrategy {
    scope: SelectionCriteria,
    filter: SelectionCriteria,
    show_empty_nodes: bool,
}

impl SelectiveTraversalStrategy {
    /// Create a strategy that keeps empty nodes.
    #[must_use]
    pub fn new(scope: SelectionCriteria, filter: SelectionCriteria) -> Self {
        Self {
            scope,
            filter,
            show_empty_nodes: true,
        }
    }

    /// Set whether nodes without surviving edges are kept.
    #[must_use]
    pub fn with_show_empty_nodes(mut self, show: bool) -> Self {
        self.show_empty_nodes = show;
        self
    }

    /// The criteria deciding which nodes are emitted.
    #[must_use]
    pub fn scope(&self) -> &SelectionCriteria {
        &self.scope
    }

    /// The criteria deciding which edges are kept.
    #[must_use]
    pub fn filter(&self) -> &SelectionCriteria {
        &self.filter
    }
}

impl TraversalStrategy for SelectiveTraversalStrategy {
    fn in_scope(&self, node: &Node) -> bool {
        self.scope.matches(node)
    }

    fn in_filter(&self, node: &Node) -> bool {
        self.filter.matches(node)
    }

    fn show_empty_nodes(&self) -> bool {
        self.show_empty_nodes
    }
}

/// Strategy that emits every node and keeps every edge.
#[derive(Debug, Clone, Copy, Default)]
pub struct ComprehensiveTraversalStrategy;

impl TraversalStrategy for ComprehensiveTraversalStrategy {
    fn in_scope(&self, _node: &Node) -> bool {
        true
    }

    fn in_filter(&self, _node: &Node) -> bool {
        true
    }
}

/// Report modes naming which kinds are emitted and which kinds edges may reach.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum KindSelection {
    /// Package to package (`p2p`).
    PackageToPackage,
    /// Type to package (`c2p`).
    TypeToPackage,
    /// Type to type (`c2c`).
    TypeToType,
    /// Member to member (`f2f`).
    MemberToMember,
    /// Every kind on both sides.
    #[default]
    All,
}

impl KindSelection {
    /// Kinds enabled in the scope criteria.
    #[must_use]
    pub fn scope_kinds(self) -> &'static [NodeKind] {
        match self {
            Self::PackageToPackage => &[NodeKind::Package],
            Self::TypeToPackage | Self::TypeToType => &[NodeKind::Type],
            Self::MemberToMember => &[NodeKind::Member],
            Self::All => &NodeKind::ALL,
        }
    }

    /// Kinds enabled in the filter criteria.
    #[must_use]
    pub fn filter_kinds(self) -> &'static [NodeKind] {
        match self {
            Self::PackageToPackage | Self::TypeToPackage => &[NodeKind::Package],
            Self::TypeToType => &[NodeKind::Type],
            Self::MemberToMember => &[NodeKind::Member],
            Self::All => &NodeKind::ALL,
        }
    }

    /// Restrict the matching flags of an existing scope/filter pair.
    pub fn apply(self, scope: &mut SelectionCriteria, filter: &mut SelectionCriteria) {
        for kind in NodeKind::ALL {
            scope.set_matching(kind, self.scope_kinds().contains(&kind));
            filter.set_matching(kind, self.filter_kinds().contains(&kind));
        }
    }

    /// A match-everything strategy restricted to this mode's kinds.
    ///
    /// # Errors
    ///
    /// Propagates criteria construction errors.
    pub fn strategy(self) -> Result<SelectiveTraversalStrategy> {
        let scope = SelectionCriteria::builder()
            .include(MATCH_ALL)
            .kinds(self.scope_kinds())
            .build()?;
        let filter = SelectionCriteria::builder()
            .include(MATCH_ALL)
            .kinds(self.filter_kinds())
            .build()?;
        Ok(SelectiveTraversalStrategy::new(scope, filter))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::factory::NodeFactory;
    use rstest::rstest;

    fn sample() -> (NodeFactory, [crate::NodeId; 3]) {
        let mut factory = NodeFactory::new();
        let member = factory.create_member("a.A.m()");
        let ty = factory.lookup(NodeKind::Type, "a.A").expect("type");
        let package = factory.lookup(NodeKind::Package, "a").expect("package");
        (factory, [package, ty, member])
    }

    #[rstest]
    #[case::p2p(KindSelection::PackageToPackage, [true, false, false], [true, false, false])]
    #[case::c2p(KindSelection::TypeToPackage, [false, true, false], [true, false, false])]
    #[case::c2c(KindSelection::TypeToType, [false, true, false], [false, true, false])]
    #[case::f2f(KindSelection::MemberToMember, [false, false, true], [false, false, true])]
    #[case::all(KindSelection::All, [true, true, true], [true, true, true])]
    fn presets_enable_expected_kinds(
        #[case] mode: KindSelection,
        #[case] scope: [bool; 3],
        #[case] filter: [bool; 3],
    ) {
        let (factory, ids) = sample();
        let strategy = mode.strategy().expect("presets compile");

        for (i, id) in ids.into_iter().enumerate() {
            let node = factory.node(id).expect("node");
            assert_eq!(strategy.in_scope(node), scope[i], "scope {}", node.kind());
            assert_eq!(strategy.in_filter(node), filter[i], "filter {}", node.kind());
        }
    }

    #[test]
    fn scope_and_filter_are_independent() {
        let (factory, [package, ty, _]) = sample();
        let strategy = SelectiveTraversalStrategy::new(
            SelectionCriteria::match_all(),
            SelectionCriteria::empty(),
        );

        let package = factory.node(package).expect("package");
        let ty = factory.node(ty).expect("type");
        assert!(strategy.in_scope(package));
        assert!(!strategy.in_filter(ty));
        assert!(strategy.show_empty_nodes());
    }

    #[test]
    fn comprehensive_accepts_everything() {
        let (factory, ids) = sample();
        for id in ids {
            let node = factory.node(id).expect("node");
            assert!(ComprehensiveTraversalStrategy.in_scope(node));
            assert!(ComprehensiveTraversalStrategy.in_filter(node));
        }
    }

    #[test]
    fn hide_empty_is_reported() {
        let strategy = SelectiveTraversalStrategy::new(
            SelectionCriteria::match_all(),
            SelectionCriteria::match_all(),
        )
        .with_show_empty_nodes(false);
        assert!(!strategy.show_empty_nodes());
    }
}
