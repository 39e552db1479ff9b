//! Term graph for OBO ontologies
//!
//! Loading runs in two passes over a single input:
//!
//! 1. the [`goterm_obo`] tokenizer feeds [`TermGraphBuilder`], which stages
//!    every non-obsolete `[Term]` block into an arena keyed by id;
//! 2. [`TermGraphBuilder::finish`] resolves the staged `is_a` ids into
//!    parent/child links, failing on any id that was never defined.
//!
//! The resulting [`TermGraph`] is immutable and `Send + Sync`, so queries can
//! run from several threads without locking:
//!
//! - [`TermGraph::roots`], [`TermGraph::find`]
//! - [`TermGraph::descendants_and_self`]
//! - [`TermGraph::aggregate_over_subtree`], driven by an injected
//!   [`TermLookup`] (the gene-mapping collaborator)
//!
//! ```no_run
//! let graph = goterm_graph::load_path("gene_ontology.obo")?;
//! for root in graph.roots() {
//!     println!("{} {}", root.id(), root.name());
//! }
//! # Ok::<(), goterm_graph::LoadError>(())
//! ```

pub mod builder;
pub mod error;
pub mod graph;
pub mod lookup;
pub mod query;
pub mod term;

pub use builder::{is_a_parent_id, TermGraphBuilder, GO_ID_WIDTH};
pub use error::{BuildError, LoadError, LookupError};
pub use graph::{GraphStats, TermGraph};
pub use lookup::{lookup_or_empty, CachedLookup, ExternalRef, TermLookup};
pub use query::OutlineRow;
pub use term::{Term, TermId};

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Parse and build a graph from any buffered reader.
pub fn load<R: BufRead>(reader: R) -> Result<TermGraph, LoadError> {
    let mut builder = TermGraphBuilder::new();
    goterm_obo::parse_obo(reader, &mut builder)?;
    Ok(builder.finish()?)
}

pub fn load_str(text: &str) -> Result<TermGraph, LoadError> {
    let mut builder = TermGraphBuilder::new();
    goterm_obo::parse_obo_str(text, &mut builder)?;
    Ok(builder.finish()?)
}

pub fn load_path(path: impl AsRef<Path>) -> Result<TermGraph, LoadError> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|source| LoadError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    load(BufReader::new(file))
}
