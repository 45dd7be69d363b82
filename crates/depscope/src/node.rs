//! Node model for the symbol dependency graph.
//!
//! A node is one of three kinds, each carrying kind-specific containment data:
//!
//! | Kind | Parent | Children |
//! |------|--------|----------|
//! | `Package` | none | types |
//! | `Type` | package | members |
//! | `Member` | type | none |
//!
//! Containment is ownership and lives on the node itself. Dependency edges are
//! non-owning, may form cycles (including self-loops), and live in the
//! [`NodeFactory`](crate::NodeFactory) arena so that the outbound set of `A`
//! and the inbound set of `B` are two views of the same edge.

use std::collections::BTreeSet;
use std::fmt;

use petgraph::stable_graph::NodeIndex;
use serde::{Deserialize, Serialize};

/// Handle to a node inside one [`NodeFactory`](crate::NodeFactory).
///
/// An id pairs an arena slot with the serial number the factory gave the node
/// when it was created. Slots are reused after a deletion but serials never
/// are, so an id kept past `delete_node` stays dead even once its slot holds a
/// new node.
///
/// Ids are only meaningful for the factory that issued them. Derived graphs
/// (copies, closures) own their own factory and issue their own ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId {
    pub(crate) index: NodeIndex,
    pub(crate) serial: u32,
}

impl NodeId {
    pub(crate) fn new(index: NodeIndex, serial: u32) -> Self {
        Self { index, serial }
    }

    /// Extract the raw arena index.
    #[must_use]
    pub fn index(self) -> usize {
        self.index.index()
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.index.index())
    }
}

/// The three symbol kinds tracked by the graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    /// A package (namespace).
    Package,
    /// A class, interface or other declared type.
    Type,
    /// A field, method or constructor of a type.
    Member,
}

impl NodeKind {
    /// All kinds, outermost first.
    pub const ALL: [NodeKind; 3] = [NodeKind::Package, NodeKind::Type, NodeKind::Member];

    /// Lowercase name used in documents and messages.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Package => "package",
            Self::Type => "type",
            Self::Member => "member",
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind-specific containment data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeDetail {
    /// A package owns types.
    Package {
        /// Types declared in this package.
        types: BTreeSet<NodeId>,
    },
    /// A type belongs to a package and owns members.
    Type {
        /// Enclosing package.
        package: NodeId,
        /// Members declared in this type.
        members: BTreeSet<NodeId>,
    },
    /// A member belongs to a type.
    Member {
        /// Enclosing type.
        owner: NodeId,
    },
}

/// A symbol in the dependency graph.
///
/// Name and kind are fixed at creation. The only mutable attribute is the
/// `confirmed` flag, and it only ever moves from inferred to confirmed.
///
/// Two nodes are equal when they share kind and name; provenance and
/// containment do not take part.
#[derive(Debug, Clone)]
pub struct Node {
    name: String,
    confirmed: bool,
    detail: NodeDetail,
}

impl Node {
    pub(crate) fn new(name: String, detail: NodeDetail) -> Self {
        Self {
            name,
            confirmed: false,
            detail,
        }
    }

    /// Fully-qualified name, unique within the node's kind.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The node's kind, derived from its detail variant.
    #[must_use]
    pub fn kind(&self) -> NodeKind {
        match self.detail {
            NodeDetail::Package { .. } => NodeKind::Package,
            NodeDetail::Type { .. } => NodeKind::Type,
            NodeDetail::Member { .. } => NodeKind::Member,
        }
    }

    /// `true` if the symbol was observed as a real declaration.
    #[must_use]
    pub fn is_confirmed(&self) -> bool {
        self.confirmed
    }

    /// Kind-specific containment data.
    #[must_use]
    pub fn detail(&self) -> &NodeDetail {
        &self.detail
    }

    /// The enclosing node: package of a type, type of a member.
    #[must_use]
    pub fn parent(&self) -> Option<NodeId> {
        match &self.detail {
            NodeDetail::Package { .. } => None,
            NodeDetail::Type { package, .. } => Some(*package),
            NodeDetail::Member { owner } => Some(*owner),
        }
    }

    /// Owned children: types of a package, members of a type.
    pub fn children(&self) -> impl Iterator<Item = NodeId> + '_ {
        let set = match &self.detail {
            NodeDetail::Package { types } => Some(types),
            NodeDetail::Type { members, .. } => Some(members),
            NodeDetail::Member { .. } => None,
        };
        set.into_iter().flatten().copied()
    }

    /// Number of owned children.
    #[must_use]
    pub fn child_count(&self) -> usize {
        match &self.detail {
            NodeDetail::Package { types } => types.len(),
            NodeDetail::Type { members, .. } => members.len(),
            NodeDetail::Member { .. } => 0,
        }
    }

    /// Promote to confirmed. Returns `true` if the flag changed.
    pub(crate) fn confirm(&mut self) -> bool {
        !std::mem::replace(&mut self.confirmed, true)
    }

    pub(crate) fn add_child(&mut self, child: NodeId) {
        match &mut self.detail {
            NodeDetail::Package { types } => {
                types.insert(child);
            }
            NodeDetail::Type { members, .. } => {
                members.insert(child);
            }
            NodeDetail::Member { .. } => {}
        }
    }

    pub(crate) fn remove_child(&mut self, child: NodeId) {
        match &mut self.detail {
            NodeDetail::Package { types } => {
                types.remove(&child);
            }
            NodeDetail::Type { members, .. } => {
                members.remove(&child);
            }
            NodeDetail::Member { .. } => {}
        }
    }
}

impl PartialEq for Node {
    fn eq(&self, other: &Self) -> bool {
        self.kind() == other.kind() && self.name == other.name
    }
}

impl Eq for Node {}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// Name of the package enclosing a type.
///
/// Types without a `.` live in the default package, whose name is empty.
#[must_use]
pub fn package_name_of(type_name: &str) -> &str {
    type_name.rfind('.').map_or("", |i| &type_name[..i])
}

/// Name of the type enclosing a member.
///
/// A trailing parameter list is ignored when looking for the last segment, so
/// `a.A.m(java.lang.String)` belongs to `a.A` just like `a.A.f` does.
#[must_use]
pub fn type_name_of(member_name: &str) -> &str {
    let head = member_name
        .find('(')
        .map_or(member_name, |i| &member_name[..i]);
    head.rfind('.').map_or("", |i| &member_name[..i])
}
