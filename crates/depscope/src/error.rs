//! Error types for depscope operations.
//!
//! Only configuration and I/O problems are errors. Structural no-ops on the
//! graph (adding an edge twice, removing an edge that is not there, creating a
//! node that already exists) are absorbed silently and never surface here.

use std::io;
use thiserror::Error;

use crate::node::NodeKind;

/// Result type for depscope operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level error type for depscope operations.
#[derive(Debug, Error)]
pub enum Error {
    /// A `/.../` selection pattern is not a valid regular expression.
    #[error("invalid selection pattern `{pattern}`: {source}")]
    InvalidPattern {
        /// The pattern text as supplied by the caller.
        pattern: String,
        /// The underlying regex compilation error.
        #[source]
        source: regex::Error,
    },

    /// File system operation failed
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// JSON encoding or decoding failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Invalid configuration or arguments
    #[error("configuration error: {0}")]
    Config(String),

    /// A graph document line could not be turned into nodes and edges
    #[error("graph document error at line {line_number}: {message}")]
    Document {
        /// The 1-based line number of the offending record.
        line_number: usize,
        /// What went wrong.
        message: String,
    },

    /// A named node does not exist in the factory being queried
    #[error("{kind} not found: {name}")]
    NodeNotFound {
        /// Kind of the node that was looked up.
        kind: NodeKind,
        /// Fully-qualified name that was looked up.
        name: String,
    },
}
