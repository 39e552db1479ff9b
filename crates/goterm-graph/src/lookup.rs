//! The external gene-mapping capability used by aggregations.

use ahash::AHashMap;
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::collections::BTreeSet;
use std::fmt;
use tracing::warn;

use crate::error::LookupError;

/// Reference to an external gene record, e.g. `Ensembl Human:ENSG00000105220`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ExternalRef {
    /// Data source label (`Ensembl Human`, `Entrez Gene`, ...).
    pub source: String,
    pub id: String,
}

impl ExternalRef {
    pub fn new(source: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            id: id.into(),
        }
    }
}

impl fmt::Display for ExternalRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.source, self.id)
    }
}

/// Maps an ontology term id to the external references annotated with it.
pub trait TermLookup {
    fn map_term(&self, term_id: &str) -> Result<BTreeSet<ExternalRef>, LookupError>;
}

impl<F> TermLookup for F
where
    F: Fn(&str) -> Result<BTreeSet<ExternalRef>, LookupError>,
{
    fn map_term(&self, term_id: &str) -> Result<BTreeSet<ExternalRef>, LookupError> {
        self(term_id)
    }
}

/// Best-effort lookup: failures are logged and read as "no references".
pub fn lookup_or_empty<L: TermLookup + ?Sized>(lookup: &L, term_id: &str) -> BTreeSet<ExternalRef> {
    match lookup.map_term(term_id) {
        Ok(refs) => refs,
        Err(err) => {
            warn!(term = term_id, error = %err, "gene lookup failed; treating as empty");
            BTreeSet::new()
        }
    }
}

/// Memoizing wrapper: each term id reaches the inner lookup at most once.
///
/// Failures are cached as empty results. Not `Sync`; use one per traversal.
pub struct CachedLookup<'a, L: ?Sized> {
    inner: &'a L,
    cache: RefCell<AHashMap<String, BTreeSet<ExternalRef>>>,
}

impl<'a, L: TermLookup + ?Sized> CachedLookup<'a, L> {
    pub fn new(inner: &'a L) -> Self {
        Self {
            inner,
            cache: RefCell::new(AHashMap::new()),
        }
    }

    /// Number of distinct term ids looked up so far.
    pub fn len(&self) -> usize {
        self.cache.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.borrow().is_empty()
    }

    pub fn get(&self, term_id: &str) -> BTreeSet<ExternalRef> {
        if let Some(hit) = self.cache.borrow().get(term_id) {
            return hit.clone();
        }
        let refs = lookup_or_empty(self.inner, term_id);
        self.cache
            .borrow_mut()
            .insert(term_id.to_string(), refs.clone());
        refs
    }
}

impl<L: TermLookup + ?Sized> TermLookup for CachedLookup<'_, L> {
    fn map_term(&self, term_id: &str) -> Result<BTreeSet<ExternalRef>, LookupError> {
        Ok(self.get(term_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn closures_are_lookups() {
        let lookup = |id: &str| -> Result<BTreeSet<ExternalRef>, LookupError> {
            Ok(BTreeSet::from([ExternalRef::new("Test", id)]))
        };
        let refs = lookup.map_term("GO:1").expect("lookup");
        assert_eq!(refs.into_iter().next().map(|r| r.to_string()), Some("Test:GO:1".to_string()));
    }

    #[test]
    fn failures_become_empty() {
        let lookup = |id: &str| -> Result<BTreeSet<ExternalRef>, LookupError> {
            Err(LookupError::new(id, "database offline"))
        };
        assert!(lookup_or_empty(&lookup, "GO:1").is_empty());
    }

    #[test]
    fn cache_hits_inner_lookup_once_per_id() {
        let calls = Cell::new(0);
        let lookup = |id: &str| -> Result<BTreeSet<ExternalRef>, LookupError> {
            calls.set(calls.get() + 1);
            Ok(BTreeSet::from([ExternalRef::new("Test", id)]))
        };
        let cached = CachedLookup::new(&lookup);
        cached.get("GO:1");
        cached.get("GO:1");
        cached.get("GO:2");
        assert_eq!(calls.get(), 2);
        assert_eq!(cached.len(), 2);
    }
}
