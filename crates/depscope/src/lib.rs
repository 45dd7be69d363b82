//! # depscope: Symbol Dependency Graph Engine
//!
//! depscope stores dependency facts between packages, types and members, and
//! derives smaller graphs from them: filtered copies and layered transitive
//! closures. Facts come from an external extractor (or a saved JSON Lines
//! document); depscope never parses binaries itself.
//!
//! ## Design Philosophy
//!
//! - **Fact store** - Nodes and edges as observed; no call-target resolution
//! - **Provenance** - Every node is either confirmed (declared) or inferred (only referenced)
//! - **Derived graphs are independent** - Copies and closures own a fresh [`NodeFactory`]
//! - **Library first, CLI second**
//!
//! ## Quick Start
//!
//! ```
//! use depscope::{
//!     ClosureDirection, GraphCopier, NodeFactory, NodeKind, SelectionCriteria,
//!     SelectiveTraversalStrategy, TransitiveClosure,
//! };
//!
//! let mut graph = NodeFactory::new();
//! let main = graph.create_confirmed(NodeKind::Member, "app.Main.main()");
//! let run = graph.create_member("lib.Runner.run()");
//! graph.add_dependency(main, run);
//!
//! // Copy only the `app` side, keeping edges into anything
//! let scope = SelectionCriteria::builder().include("/^app/").build()?;
//! let mut copier = GraphCopier::new(SelectiveTraversalStrategy::new(
//!     scope,
//!     SelectionCriteria::match_all(),
//! ));
//! copier.copy_all(&graph);
//! assert_eq!(copier.factory().edge_count(), 1);
//!
//! // Everything `main` reaches, layer by layer
//! let start = SelectionCriteria::builder().include("app.Main.main()").build()?;
//! let mut closure = TransitiveClosure::over_all(
//!     &graph,
//!     &start,
//!     SelectionCriteria::empty(),
//!     ClosureDirection::Outbound,
//! );
//! closure.compute_all_layers();
//! assert_eq!(closure.layer_count(), 2);
//! # Ok::<(), depscope::Error>(())
//! ```

pub mod closure;
pub mod config;
pub mod copier;
pub mod criteria;
pub mod document;
mod error;
pub mod factory;
pub mod metrics;
pub mod node;
pub mod strategy;

pub use closure::{ClosureDirection, TransitiveClosure};
pub use config::{CriteriaProfile, CriteriaSection, KindPatterns};
pub use copier::{GraphCopier, prune_empty_nodes};
pub use criteria::{CriteriaBuilder, MATCH_ALL, Pattern, SelectionCriteria};
pub use document::{LinkDirection, LinkRecord, LoadWarning, NodeRecord};
pub use error::{Error, Result};
pub use factory::NodeFactory;
pub use metrics::{GraphStats, NodeMetrics, Ranking};
pub use node::{Node, NodeDetail, NodeId, NodeKind};
pub use strategy::{
    ComprehensiveTraversalStrategy, KindSelection, SelectiveTraversalStrategy, TraversalStrategy,
};
