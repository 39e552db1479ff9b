//! Error types for graph loading and lookups.

use goterm_obo::OboParseError;
use std::path::PathBuf;
use thiserror::Error;

/// Structural failure while turning staged term blocks into a graph.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BuildError {
    /// Two non-obsolete `[Term]` blocks declare the same id.
    #[error("duplicate term id {id}")]
    DuplicateId { id: String },

    /// An `is_a` parent id does not resolve to any materialized term.
    #[error("term {term_id} has is_a parent {missing_parent_id} which is not defined (obsolete or missing)")]
    DanglingReference {
        term_id: String,
        missing_parent_id: String,
    },

    /// A non-obsolete `[Term]` block (1-based ordinal among term blocks) has no `id`.
    #[error("term block #{block} has no id")]
    MissingId { block: usize },

    /// A term lists its own id under `is_a`.
    #[error("term {id} lists itself as an is_a parent")]
    SelfReference { id: String },

    /// More terms than a [`TermId`](crate::TermId) can address.
    #[error("ontology has more than {limit} terms")]
    TooManyTerms { limit: u64 },
}

/// Why an ontology could not be loaded. No partial graph is ever returned.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error(transparent)]
    Parse(#[from] OboParseError),

    #[error(transparent)]
    Build(#[from] BuildError),

    #[error("failed to open {}: {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Per-term failure of the external gene-mapping capability.
///
/// Aggregations recover from these locally: the term contributes nothing and
/// a warning is logged.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("lookup failed for {term_id}: {message}")]
pub struct LookupError {
    pub term_id: String,
    pub message: String,
}

impl LookupError {
    pub fn new(term_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            term_id: term_id.into(),
            message: message.into(),
        }
    }
}
