//! JSON Lines graph documents.
//!
//! A document holds one [`NodeRecord`] per line: packages first, then types,
//! then members, each group in name order. Every record lists the node's
//! links, tagged with the partner's kind and a [`LinkDirection`]:
//!
//! ```text
//! {"kind":"member","name":"a.A.a","confirmed":true,"outbound":[{"kind":"member","name":"b.B.b","confirmed":false,"direction":"outbound"}],"inbound":[]}
//! ```
//!
//! Loading replays `create` / `confirm` / `add_dependency` on a fresh
//! [`NodeFactory`]. A record marked `confirmed` confirms its node and, as
//! [`NodeFactory::confirm`] does, the enclosing type and package, whatever
//! their own records say. The `confirmed` flag on a link is informational.
//!
//! Two loaders are provided. [`read_document`] fails on the first bad line;
//! [`read_document_resilient`] skips bad lines and reports them as
//! [`LoadWarning`]s.

use std::fmt;
use std::fs::{self, File};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::factory::NodeFactory;
use crate::node::{NodeId, NodeKind};

/// How a link relates the record's node to its partner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkDirection {
    /// The node depends on the partner.
    Outbound,
    /// The partner depends on the node.
    Inbound,
    /// Both depend on each other.
    Bidirectional,
}

impl LinkDirection {
    /// Arrow used in text output.
    #[must_use]
    pub fn arrow(self) -> &'static str {
        match self {
            Self::Outbound => "-->",
            Self::Inbound => "<--",
            Self::Bidirectional => "<->",
        }
    }
}

/// A reference from one node record to another node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkRecord {
    /// Partner kind.
    pub kind: NodeKind,
    /// Partner name.
    pub name: String,
    /// Partner provenance at the time the document was written.
    #[serde(default)]
    pub confirmed: bool,
    /// Orientation of the dependency.
    pub direction: LinkDirection,
}

/// One line of a graph document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeRecord {
    /// Node kind.
    pub kind: NodeKind,
    /// Fully-qualified name.
    pub name: String,
    /// Whether the node was observed as a declaration.
    #[serde(default)]
    pub confirmed: bool,
    /// Links to the nodes this node depends on, bidirectional ones included.
    #[serde(default)]
    pub outbound: Vec<LinkRecord>,
    /// Links from nodes depending on this node that it does not depend on back.
    #[serde(default)]
    pub inbound: Vec<LinkRecord>,
}

/// A non-fatal problem found while loading a document resiliently.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadWarning {
    /// The line is not a valid node record.
    MalformedRecord {
        /// 1-based line number.
        line_number: usize,
        /// Parser message.
        error: String,
    },
    /// The line was ignored.
    SkippedLine {
        /// 1-based line number.
        line_number: usize,
        /// Why it was ignored.
        reason: String,
    },
}

impl LoadWarning {
    /// The 1-based line the warning refers to.
    #[must_use]
    pub fn line_number(&self) -> usize {
        match self {
            Self::MalformedRecord { line_number, .. } | Self::SkippedLine { line_number, .. } => {
                *line_number
            }
        }
    }
}

impl fmt::Display for LoadWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MalformedRecord { line_number, error } => {
                write!(f, "line {line_number}: malformed record: {error}")
            }
            Self::SkippedLine {
                line_number,
                reason,
            } => write!(f, "line {line_number}: skipped: {reason}"),
        }
    }
}

// === Writing ===

/// Build the records describing a factory.
///
/// With `include_inbound` false, only outbound links are listed; the graph is
/// still fully described because every edge is outbound from one of its ends.
#[must_use]
pub fn records(factory: &NodeFactory, include_inbound: bool) -> Vec<NodeRecord> {
    factory
        .all_nodes()
        .filter_map(|id| record(factory, id, include_inbound))
        .collect()
}

fn record(factory: &NodeFactory, id: NodeId, include_inbound: bool) -> Option<NodeRecord> {
    let node = factory.node(id)?;

    let outbound = factory
        .outbound(id)
        .filter_map(|partner| {
            let direction = if factory.has_dependency(partner, id) {
                LinkDirection::Bidirectional
            } else {
                LinkDirection::Outbound
            };
            link(factory, partner, direction)
        })
        .collect();

    let inbound = if include_inbound {
        factory
            .inbound(id)
            .filter(|&partner| !factory.has_dependency(id, partner))
            .filter_map(|partner| link(factory, partner, LinkDirection::Inbound))
            .collect()
    } else {
        Vec::new()
    };

    let mut record = NodeRecord {
        kind: node.kind(),
        name: node.name().to_string(),
        confirmed: node.is_confirmed(),
        outbound,
        inbound,
    };
    record.outbound.sort_by(|a, b| (a.kind, &a.name).cmp(&(b.kind, &b.name)));
    record.inbound.sort_by(|a, b| (a.kind, &a.name).cmp(&(b.kind, &b.name)));
    Some(record)
}

fn link(factory: &NodeFactory, partner: NodeId, direction: LinkDirection) -> Option<LinkRecord> {
    let node = factory.node(partner)?;
    Some(LinkRecord {
        kind: node.kind(),
        name: node.name().to_string(),
        confirmed: node.is_confirmed(),
        direction,
    })
}

/// Write a factory as JSON Lines.
///
/// # Errors
///
/// Returns an error if serialization or writing fails.
pub fn write_document<W: Write>(factory: &NodeFactory, writer: W, include_inbound: bool) -> Result<()> {
    let mut writer = BufWriter::new(writer);
    for record in records(factory, include_inbound) {
        serde_json::to_writer(&mut writer, &record)?;
        writer.write_all(b"\n")?;
    }
    writer.flush()?;
    Ok(())
}

/// Save a factory to `path`.
///
/// The document is written to a sibling temporary file and renamed into
/// place, so an interrupted save leaves any previous document intact.
///
/// # Errors
///
/// Returns an error if the file cannot be written or renamed.
pub fn save_document(factory: &NodeFactory, path: &Path, include_inbound: bool) -> Result<()> {
    let temp_path = path.with_extension("tmp");
    let file = File::create(&temp_path)?;
    write_document(factory, file, include_inbound)?;
    fs::rename(&temp_path, path)?;

    debug!(
        path = %path.display(),
        nodes = factory.len(),
        edges = factory.edge_count(),
        "Saved graph document"
    );
    Ok(())
}

// === Reading ===

/// Add one record's node and links to `factory`.
///
/// A confirmed record also confirms the node's enclosing type and package.
pub fn apply_record(factory: &mut NodeFactory, record: &NodeRecord) {
    let id = factory.create(record.kind, &record.name);
    if record.confirmed {
        factory.confirm(id);
    }

    for link in record.outbound.iter().chain(&record.inbound) {
        let partner = factory.create(link.kind, &link.name);
        match link.direction {
            LinkDirection::Outbound => {
                factory.add_dependency(id, partner);
            }
            LinkDirection::Inbound => {
                factory.add_dependency(partner, id);
            }
            LinkDirection::Bidirectional => {
                factory.add_dependency(id, partner);
                factory.add_dependency(partner, id);
            }
        }
    }
}

/// Read a document, failing on the first malformed line.
///
/// Blank lines are ignored.
///
/// # Errors
///
/// Returns [`Error::Document`] for a malformed record and [`Error::Io`] if
/// reading fails.
pub fn read_document<R: BufRead>(reader: R) -> Result<NodeFactory> {
    let mut factory = NodeFactory::new();

    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let record: NodeRecord = serde_json::from_str(&line).map_err(|e| Error::Document {
            line_number: index + 1,
            message: e.to_string(),
        })?;
        apply_record(&mut factory, &record);
    }

    debug!(nodes = factory.len(), edges = factory.edge_count(), "Read graph document");
    Ok(factory)
}

/// Read a document, skipping lines that cannot be used.
///
/// # Errors
///
/// Only I/O failures are errors; bad lines become warnings.
pub fn read_document_resilient<R: BufRead>(reader: R) -> Result<(NodeFactory, Vec<LoadWarning>)> {
    let mut factory = NodeFactory::new();
    let mut warnings = Vec::new();

    for (index, line) in reader.lines().enumerate() {
        let line_number = index + 1;
        let line = line?;
        if line.trim().is_empty() {
            warnings.push(LoadWarning::SkippedLine {
                line_number,
                reason: "blank line".to_string(),
            });
            continue;
        }
        match serde_json::from_str::<NodeRecord>(&line) {
            Ok(record) => apply_record(&mut factory, &record),
            Err(e) => {
                warn!(line_number, error = %e, "Skipping malformed graph record");
                warnings.push(LoadWarning::MalformedRecord {
                    line_number,
                    error: e.to_string(),
                });
            }
        }
    }

    debug!(
        nodes = factory.len(),
        edges = factory.edge_count(),
        warnings = warnings.len(),
        "Read graph document"
    );
    Ok((factory, warnings))
}

/// Load a document from `path`, failing on the first malformed line.
///
/// # Errors
///
/// See [`read_document`].
pub fn load_document(path: &Path) -> Result<NodeFactory> {
    read_document(BufReader::new(File::open(path)?))
}

/// Load a document from `path`, skipping malformed lines.
///
/// # Errors
///
/// See [`read_document_resilient`].
pub fn load_document_resilient(path: &Path) -> Result<(NodeFactory, Vec<LoadWarning>)> {
    read_document_resilient(BufReader::new(File::open(path)?))
}
