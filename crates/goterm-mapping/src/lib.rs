//! GO term → gene mapping tables
//!
//! Reads the tab-delimited exports produced by BioMart-style tools:
//!
//! ```text
//! Ensembl Gene ID<TAB>GO Term Accession<TAB>...
//! ENSG00000105220<TAB>GO:0006096
//! ENSG00000111640<TAB>GO:0006096<TAB>ignored
//! ENSG00000000003<TAB>
//! ```
//!
//! - exactly one header row, which is skipped;
//! - column 1 is the gene id, column 2 the GO id, further columns are ignored;
//! - rows with an empty GO column (genes without annotation) are skipped.
//!
//! A [`GeneTable`] is a [`TermLookup`], so it plugs straight into
//! [`TermGraph::aggregate_over_subtree`](goterm_graph::TermGraph::aggregate_over_subtree).

use ahash::AHashMap;
use goterm_graph::{ExternalRef, LookupError, TermLookup};
use std::collections::BTreeSet;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

/// Data source label used when none is configured.
pub const DEFAULT_DATA_SOURCE: &str = "Ensembl Human";

#[derive(Debug, Error)]
pub enum MappingError {
    #[error("mapping table is empty (expected a header row)")]
    MissingHeader,

    #[error("mapping row {line} has fewer than two tab-separated columns: {text:?}")]
    MalformedRow { line: usize, text: String },

    #[error("failed to read mapping line {line}: {source}")]
    Io {
        line: usize,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to open mapping table {}: {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// In-memory GO id → gene id index.
#[derive(Debug, Clone)]
pub struct GeneTable {
    source: String,
    by_term: AHashMap<String, BTreeSet<String>>,
    rows: usize,
}

impl GeneTable {
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            by_term: AHashMap::new(),
            rows: 0,
        }
    }

    /// Build directly from `(gene_id, term_id)` pairs.
    pub fn from_pairs<'a>(
        source: impl Into<String>,
        pairs: impl IntoIterator<Item = (&'a str, &'a str)>,
    ) -> Self {
        let mut table = Self::new(source);
        for (gene, term) in pairs {
            table.insert(gene, term);
        }
        table
    }

    pub fn from_reader<R: BufRead>(reader: R, source: impl Into<String>) -> Result<Self, MappingError> {
        let mut table = Self::new(source);
        let mut lines = reader.lines().enumerate();

        match lines.next() {
            None => return Err(MappingError::MissingHeader),
            Some((_, Err(source))) => return Err(MappingError::Io { line: 1, source }),
            Some((_, Ok(header))) => debug!(header = %header.trim_end(), "mapping header"),
        }

        for (idx, line) in lines {
            let line_no = idx + 1;
            let line = line.map_err(|source| MappingError::Io {
                line: line_no,
                source,
            })?;
            let row = line.trim_end_matches(['\r', '\n']);
            if row.trim().is_empty() {
                continue;
            }
            let mut cols = row.split('\t');
            let gene = cols.next().unwrap_or_default().trim();
            let Some(term) = cols.next().map(str::trim) else {
                return Err(MappingError::MalformedRow {
                    line: line_no,
                    text: row.to_string(),
                });
            };
            if term.is_empty() || gene.is_empty() {
                continue;
            }
            table.insert(gene, term);
        }

        info!(
            terms = table.term_count(),
            rows = table.rows,
            source = %table.source,
            "loaded gene mapping table"
        );
        Ok(table)
    }

    pub fn from_path(path: impl AsRef<Path>, source: impl Into<String>) -> Result<Self, MappingError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| MappingError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_reader(BufReader::new(file), source)
    }

    fn insert(&mut self, gene: &str, term: &str) {
        let fresh = self
            .by_term
            .entry(term.to_string())
            .or_default()
            .insert(gene.to_string());
        if fresh {
            self.rows += 1;
        }
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// Number of distinct GO ids with at least one gene.
    pub fn term_count(&self) -> usize {
        self.by_term.len()
    }

    /// Number of distinct (gene, term) pairs.
    pub fn pair_count(&self) -> usize {
        self.rows
    }

    pub fn genes_for(&self, term_id: &str) -> Option<&BTreeSet<String>> {
        self.by_term.get(term_id)
    }
}

impl TermLookup for GeneTable {
    /// Terms absent from the table map to an empty set.
    fn map_term(&self, term_id: &str) -> Result<BTreeSet<ExternalRef>, LookupError> {
        Ok(self
            .genes_for(term_id)
            .into_iter()
            .flatten()
            .map(|gene| ExternalRef::new(self.source.as_str(), gene.as_str()))
            .collect())
    }
}
