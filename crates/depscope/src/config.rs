//! YAML criteria profiles.
//!
//! A profile stores the scope and filter criteria of a traversal so that a
//! report can be rerun without repeating every pattern on the command line:
//!
//! ```yaml
//! scope:
//!   kinds: [package, type]
//!   includes: ["/^com\\.acme/"]
//! filter:
//!   excludes: ["/^java\\./"]
//!   member:
//!     includes: ["/\\(\\)$/"]
//! show_empty_nodes: false
//! ```
//!
//! Every field is optional. A missing section selects all kinds and
//! includes everything (`//`).

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::criteria::{MATCH_ALL, SelectionCriteria};
use crate::error::{Error, Result};
use crate::node::NodeKind;
use crate::strategy::SelectiveTraversalStrategy;

/// Include and exclude patterns for a single kind.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct KindPatterns {
    /// Replaces the global includes for this kind when non-empty.
    pub includes: Vec<String>,
    /// Added to the global excludes for this kind.
    pub excludes: Vec<String>,
}

/// Serialized form of one [`SelectionCriteria`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CriteriaSection {
    /// Kinds with matching enabled.
    pub kinds: Vec<NodeKind>,
    /// Global include patterns.
    pub includes: Vec<String>,
    /// Global exclude patterns.
    pub excludes: Vec<String>,
    /// Package-specific patterns.
    pub package: KindPatterns,
    /// Type-specific patterns.
    #[serde(rename = "type")]
    pub type_: KindPatterns,
    /// Member-specific patterns.
    pub member: KindPatterns,
}

impl Default for CriteriaSection {
    fn default() -> Self {
        Self {
            kinds: NodeKind::ALL.to_vec(),
            includes: vec![MATCH_ALL.to_string()],
            excludes: Vec::new(),
            package: KindPatterns::default(),
            type_: KindPatterns::default(),
            member: KindPatterns::default(),
        }
    }
}

impl CriteriaSection {
    /// Patterns specific to `kind`.
    #[must_use]
    pub fn kind(&self, kind: NodeKind) -> &KindPatterns {
        match kind {
            NodeKind::Package => &self.package,
            NodeKind::Type => &self.type_,
            NodeKind::Member => &self.member,
        }
    }

    /// Mutable access to the patterns specific to `kind`.
    pub fn kind_mut(&mut self, kind: NodeKind) -> &mut KindPatterns {
        match kind {
            NodeKind::Package => &mut self.package,
            NodeKind::Type => &mut self.type_,
            NodeKind::Member => &mut self.member,
        }
    }

    /// Compile the section.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidPattern`] for a malformed regular expression.
    pub fn to_criteria(&self) -> Result<SelectionCriteria> {
        let mut criteria = SelectionCriteria::empty();
        criteria.set_global_includes(&self.includes)?;
        criteria.set_global_excludes(&self.excludes)?;
        for kind in NodeKind::ALL {
            criteria.set_matching(kind, self.kinds.contains(&kind));
            criteria.set_includes(kind, &self.kind(kind).includes)?;
            criteria.set_excludes(kind, &self.kind(kind).excludes)?;
        }
        Ok(criteria)
    }
}

/// Scope and filter criteria of a traversal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CriteriaProfile {
    /// Which nodes are emitted.
    pub scope: CriteriaSection,
    /// Which edges are kept.
    pub filter: CriteriaSection,
    /// Keep emitted nodes that end up without edges.
    pub show_empty_nodes: bool,
}

impl Default for CriteriaProfile {
    fn default() -> Self {
        Self {
            scope: CriteriaSection::default(),
            filter: CriteriaSection::default(),
            show_empty_nodes: true,
        }
    }
}

impl CriteriaProfile {
    /// Parse a profile from YAML text.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the text is not a valid profile.
    pub fn from_yaml(text: &str) -> Result<Self> {
        serde_yaml::from_str(text).map_err(|e| Error::Config(e.to_string()))
    }

    /// Load a profile file.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if the file cannot be read and [`Error::Config`]
    /// if it is not a valid profile.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_yaml(&content)
            .map_err(|e| Error::Config(format!("{}: {e}", path.display())))
    }

    /// Write the profile as YAML.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if serialization fails and [`Error::Io`] if
    /// the file cannot be written.
    pub fn save(&self, path: &Path) -> Result<()> {
        let yaml = serde_yaml::to_string(self).map_err(|e| Error::Config(format!("YAML error: {e}")))?;
        fs::write(path, yaml)?;
        Ok(())
    }

    /// Compile both sections into a traversal strategy.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidPattern`] for a malformed regular expression.
    pub fn strategy(&self) -> Result<SelectiveTraversalStrategy> {
        Ok(
            SelectiveTraversalStrategy::new(self.scope.to_criteria()?, self.filter.to_criteria()?)
                .with_show_empty_nodes(self.show_empty_nodes),
        )
    }
}
