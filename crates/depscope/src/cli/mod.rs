//! CLI command implementations.

mod display;

pub mod closure;
pub mod copy;
pub mod metrics;

use std::fs::File;
use std::io::{self, BufReader};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use depscope::document::{read_document, read_document_resilient, save_document, write_document};
use depscope::{CriteriaProfile, CriteriaSection, KindSelection, NodeFactory, NodeKind};

/// Where the derived graph goes.
#[derive(Args, Debug, Clone, Default)]
pub struct OutputArgs {
    /// Print the graph as a JSON Lines document instead of text
    #[arg(long)]
    pub json: bool,

    /// Also save the graph as a JSON Lines document
    #[arg(short, long, value_name = "FILE")]
    pub out: Option<PathBuf>,
}

impl OutputArgs {
    /// Print `factory` in the requested format and save it if asked to.
    pub fn emit(&self, factory: &NodeFactory) -> Result<()> {
        if self.json {
            write_document(factory, io::stdout().lock(), true)?;
        } else {
            display::print_graph(factory);
        }

        if let Some(path) = &self.out {
            save_document(factory, path, true)
                .with_context(|| format!("failed to save {}", path.display()))?;
            eprintln!("{} {}", "Saved".green(), path.display());
        }
        Ok(())
    }
}

/// Scope and filter selection flags shared by the graph commands.
///
/// Flags override the matching field of `--profile`; fields without a flag
/// keep the profile's value.
#[derive(Args, Debug, Clone, Default)]
#[allow(clippy::struct_excessive_bools)]
pub struct SelectionArgs {
    /// YAML criteria profile
    #[arg(long, value_name = "FILE")]
    pub profile: Option<PathBuf>,

    /// Global scope include pattern (repeatable; `/regex/` or substring)
    #[arg(long, value_name = "PATTERN")]
    pub scope_includes: Vec<String>,
    /// Global scope exclude pattern
    #[arg(long, value_name = "PATTERN")]
    pub scope_excludes: Vec<String>,
    /// Global filter include pattern
    #[arg(long, value_name = "PATTERN")]
    pub filter_includes: Vec<String>,
    /// Global filter exclude pattern
    #[arg(long, value_name = "PATTERN")]
    pub filter_excludes: Vec<String>,

    /// Package scope include pattern
    #[arg(long, value_name = "PATTERN")]
    pub package_scope_includes: Vec<String>,
    /// Package scope exclude pattern
    #[arg(long, value_name = "PATTERN")]
    pub package_scope_excludes: Vec<String>,
    /// Type scope include pattern
    #[arg(long, value_name = "PATTERN")]
    pub type_scope_includes: Vec<String>,
    /// Type scope exclude pattern
    #[arg(long, value_name = "PATTERN")]
    pub type_scope_excludes: Vec<String>,
    /// Member scope include pattern
    #[arg(long, value_name = "PATTERN")]
    pub member_scope_includes: Vec<String>,
    /// Member scope exclude pattern
    #[arg(long, value_name = "PATTERN")]
    pub member_scope_excludes: Vec<String>,

    /// Package filter include pattern
    #[arg(long, value_name = "PATTERN")]
    pub package_filter_includes: Vec<String>,
    /// Package filter exclude pattern
    #[arg(long, value_name = "PATTERN")]
    pub package_filter_excludes: Vec<String>,
    /// Type filter include pattern
    #[arg(long, value_name = "PATTERN")]
    pub type_filter_includes: Vec<String>,
    /// Type filter exclude pattern
    #[arg(long, value_name = "PATTERN")]
    pub type_filter_excludes: Vec<String>,
    /// Member filter include pattern
    #[arg(long, value_name = "PATTERN")]
    pub member_filter_includes: Vec<String>,
    /// Member filter exclude pattern
    #[arg(long, value_name = "PATTERN")]
    pub member_filter_excludes: Vec<String>,

    /// Packages to packages
    #[arg(long)]
    pub p2p: bool,
    /// Types to packages
    #[arg(long)]
    pub c2p: bool,
    /// Types to types
    #[arg(long)]
    pub c2c: bool,
    /// Members to members
    #[arg(long)]
    pub f2f: bool,
    /// Every kind to every kind
    #[arg(long)]
    pub all: bool,

    /// Drop nodes left without edges
    #[arg(long)]
    pub hide_empty: bool,
}

impl SelectionArgs {
    /// The report mode selected by the `--p2p`-style flags, if any.
    ///
    /// When several are given, the first in `p2p, c2p, c2c, f2f, all` order wins.
    pub fn mode(&self) -> Option<KindSelection> {
        [
            (self.p2p, KindSelection::PackageToPackage),
            (self.c2p, KindSelection::TypeToPackage),
            (self.c2c, KindSelection::TypeToType),
            (self.f2f, KindSelection::MemberToMember),
            (self.all, KindSelection::All),
        ]
        .into_iter()
        .find_map(|(set, mode)| set.then_some(mode))
    }

    /// Load `--profile` (or the default) and apply the flags on top.
    pub fn profile(&self) -> Result<CriteriaProfile> {
        let mut profile = match &self.profile {
            Some(path) => CriteriaProfile::load(path)?,
            None => CriteriaProfile::default(),
        };

        override_section(
            &mut profile.scope,
            &self.scope_includes,
            &self.scope_excludes,
            [
                (NodeKind::Package, &self.package_scope_includes, &self.package_scope_excludes),
                (NodeKind::Type, &self.type_scope_includes, &self.type_scope_excludes),
                (NodeKind::Member, &self.member_scope_includes, &self.member_scope_excludes),
            ],
        );
        override_section(
            &mut profile.filter,
            &self.filter_includes,
            &self.filter_excludes,
            [
                (NodeKind::Package, &self.package_filter_includes, &self.package_filter_excludes),
                (NodeKind::Type, &self.type_filter_includes, &self.type_filter_excludes),
                (NodeKind::Member, &self.member_filter_includes, &self.member_filter_excludes),
            ],
        );

        if let Some(mode) = self.mode() {
            profile.scope.kinds = mode.scope_kinds().to_vec();
            profile.filter.kinds = mode.filter_kinds().to_vec();
        }
        if self.hide_empty {
            profile.show_empty_nodes = false;
        }
        Ok(profile)
    }
}

fn override_section(
    section: &mut CriteriaSection,
    includes: &[String],
    excludes: &[String],
    per_kind: [(NodeKind, &Vec<String>, &Vec<String>); 3],
) {
    if !includes.is_empty() {
        section.includes = includes.to_vec();
    }
    if !excludes.is_empty() {
        section.excludes = excludes.to_vec();
    }
    for (kind, kind_includes, kind_excludes) in per_kind {
        let patterns = section.kind_mut(kind);
        if !kind_includes.is_empty() {
            patterns.includes.clone_from(kind_includes);
        }
        if !kind_excludes.is_empty() {
            patterns.excludes.clone_from(kind_excludes);
        }
    }
}

/// Read a graph document.
///
/// Unless `strict` is set, malformed lines are skipped and reported on stderr.
pub fn load_graph(path: &Path, strict: bool) -> Result<NodeFactory> {
    let file = File::open(path).with_context(|| format!("failed to open {}", path.display()))?;
    let reader = BufReader::new(file);

    if strict {
        return Ok(read_document(reader)?);
    }

    let (factory, warnings) = read_document_resilient(reader)?;
    for warning in &warnings {
        eprintln!("{}: {}: {warning}", "warning".yellow().bold(), path.display());
    }
    Ok(factory)
}
