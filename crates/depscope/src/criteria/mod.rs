//! Selection criteria: name-pattern predicates over nodes.
//!
//! A criteria object decides whether a node is selected. The rule, applied
//! per node kind:
//!
//! 1. matching must be enabled for the node's kind;
//! 2. the name must match an include pattern. The kind's own include list is
//!    used when it is non-empty, otherwise the global include list applies;
//! 3. the name must not match any exclude pattern, global or kind-specific.
//!
//! An empty include list for a kind therefore means "use the global list",
//! never "match nothing" and never "match everything".

mod pattern;

pub use pattern::Pattern;

use pattern::PatternCache;

use crate::error::Result;
use crate::node::{Node, NodeKind};

/// The pattern that matches every name.
pub const MATCH_ALL: &str = "//";

#[derive(Debug, Clone, Default)]
struct PatternLists {
    includes: Vec<Pattern>,
    excludes: Vec<Pattern>,
}

/// Include/exclude rules for selecting nodes by kind and name.
///
/// Patterns are compiled when set, so a malformed regular expression fails
/// the setter and leaves the criteria unchanged. Compiled patterns are cached
/// per instance.
#[derive(Debug, Clone)]
pub struct SelectionCriteria {
    matching: [bool; 3],
    global: PatternLists,
    per_kind: [PatternLists; 3],
    cache: PatternCache,
}

impl SelectionCriteria {
    /// Criteria with every kind enabled and no patterns. Selects nothing.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            matching: [true; 3],
            global: PatternLists::default(),
            per_kind: Default::default(),
            cache: PatternCache::default(),
        }
    }

    /// Criteria selecting every node of every kind.
    #[must_use]
    pub fn match_all() -> Self {
        let mut criteria = Self::empty();
        let all = Pattern::parse(MATCH_ALL).map(|p| vec![p]).unwrap_or_default();
        criteria.global.includes = all;
        criteria
    }

    /// Start a [`CriteriaBuilder`].
    #[must_use]
    pub fn builder() -> CriteriaBuilder {
        CriteriaBuilder::default()
    }

    /// Enable or disable matching for one kind.
    pub fn set_matching(&mut self, kind: NodeKind, enabled: bool) {
        self.matching[slot(kind)] = enabled;
    }

    /// `true` if nodes of `kind` can be selected at all.
    #[must_use]
    pub fn is_matching(&self, kind: NodeKind) -> bool {
        self.matching[slot(kind)]
    }

    /// Replace the global include list.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidPattern`](crate::Error::InvalidPattern) if any
    /// pattern is a malformed regular expression.
    pub fn set_global_includes<I, S>(&mut self, patterns: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.global.includes = self.cache.compile_all(patterns)?;
        Ok(())
    }

    /// Replace the global exclude list.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidPattern`](crate::Error::InvalidPattern) if any
    /// pattern is a malformed regular expression.
    pub fn set_global_excludes<I, S>(&mut self, patterns: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.global.excludes = self.cache.compile_all(patterns)?;
        Ok(())
    }

    /// Replace the include list for one kind. An empty list restores the
    /// global fallback for that kind.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidPattern`](crate::Error::InvalidPattern) if any
    /// pattern is a malformed regular expression.
    pub fn set_includes<I, S>(&mut self, kind: NodeKind, patterns: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.per_kind[slot(kind)].includes = self.cache.compile_all(patterns)?;
        Ok(())
    }

    /// Replace the exclude list for one kind. Global excludes still apply.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidPattern`](crate::Error::InvalidPattern) if any
    /// pattern is a malformed regular expression.
    pub fn set_excludes<I, S>(&mut self, kind: NodeKind, patterns: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.per_kind[slot(kind)].excludes = self.cache.compile_all(patterns)?;
        Ok(())
    }

    /// The include patterns in effect for `kind`.
    #[must_use]
    pub fn effective_includes(&self, kind: NodeKind) -> &[Pattern] {
        let own = &self.per_kind[slot(kind)].includes;
        if own.is_empty() {
            &self.global.includes
        } else {
            own
        }
    }

    /// Apply the selection rule to a node.
    #[must_use]
    pub fn matches(&self, node: &Node) -> bool {
        self.matches_name(node.kind(), node.name())
    }

    /// Apply the selection rule to a kind and fully-qualified name.
    #[must_use]
    pub fn matches_name(&self, kind: NodeKind, name: &str) -> bool {
        if !self.is_matching(kind) {
            return false;
        }

        let included = self
            .effective_includes(kind)
            .iter()
            .any(|p| p.is_match(name));
        if !included {
            return false;
        }

        let excluded = self
            .global
            .excludes
            .iter()
            .chain(&self.per_kind[slot(kind)].excludes)
            .any(|p| p.is_match(name));
        !excluded
    }
}

fn slot(kind: NodeKind) -> usize {
    match kind {
        NodeKind::Package => 0,
        NodeKind::Type => 1,
        NodeKind::Member => 2,
    }
}

/// Fluent construction of [`SelectionCriteria`].
///
/// Pattern text is collected as given and compiled once in
/// [`build`](Self::build).
///
/// # Example
///
/// ```
/// use depscope::{NodeKind, SelectionCriteria};
///
/// let criteria = SelectionCriteria::builder()
///     .include("//")
///     .exclude("/^java\\./")
///     .kinds(&[NodeKind::Type])
///     .build()
///     .expect("patterns compile");
///
/// assert!(criteria.matches_name(NodeKind::Type, "com.acme.Widget"));
/// assert!(!criteria.matches_name(NodeKind::Type, "java.lang.Object"));
/// assert!(!criteria.matches_name(NodeKind::Package, "com.acme"));
/// ```
#[derive(Debug, Clone)]
pub struct CriteriaBuilder {
    matching: [bool; 3],
    includes: Vec<String>,
    excludes: Vec<String>,
    kind_includes: [Vec<String>; 3],
    kind_excludes: [Vec<String>; 3],
}

impl Default for CriteriaBuilder {
    fn default() -> Self {
        Self {
            matching: [true; 3],
            includes: Vec::new(),
            excludes: Vec::new(),
            kind_includes: Default::default(),
            kind_excludes: Default::default(),
        }
    }
}

impl CriteriaBuilder {
    /// Add a global include pattern.
    #[must_use]
    pub fn include(mut self, pattern: impl Into<String>) -> Self {
        self.includes.push(pattern.into());
        self
    }

    /// Add a global exclude pattern.
    #[must_use]
    pub fn exclude(mut self, pattern: impl Into<String>) -> Self {
        self.excludes.push(pattern.into());
        self
    }

    /// Add an include pattern for one kind.
    #[must_use]
    pub fn include_for(mut self, kind: NodeKind, pattern: impl Into<String>) -> Self {
        self.kind_includes[slot(kind)].push(pattern.into());
        self
    }

    /// Add an exclude pattern for one kind.
    #[must_use]
    pub fn exclude_for(mut self, kind: NodeKind, pattern: impl Into<String>) -> Self {
        self.kind_excludes[slot(kind)].push(pattern.into());
        self
    }

    /// Enable matching for exactly the listed kinds.
    #[must_use]
    pub fn kinds(mut self, kinds: &[NodeKind]) -> Self {
        for kind in NodeKind::ALL {
            self.matching[slot(kind)] = kinds.contains(&kind);
        }
        self
    }

    /// Enable or disable matching for one kind.
    #[must_use]
    pub fn matching(mut self, kind: NodeKind, enabled: bool) -> Self {
        self.matching[slot(kind)] = enabled;
        self
    }

    /// Compile every pattern.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidPattern`](crate::Error::InvalidPattern) for the
    /// first malformed regular expression.
    pub fn build(self) -> Result<SelectionCriteria> {
        let mut criteria = SelectionCriteria::empty();
        criteria.matching = self.matching;
        criteria.set_global_includes(&self.includes)?;
        criteria.set_global_excludes(&self.excludes)?;
        for kind in NodeKind::ALL {
            criteria.set_includes(kind, &self.kind_includes[slot(kind)])?;
            criteria.set_excludes(kind, &self.kind_excludes[slot(kind)])?;
        }
        Ok(criteria)
    }
}
