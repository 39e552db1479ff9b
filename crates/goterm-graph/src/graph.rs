//! The immutable term graph.
//!
//! The graph is the sole owner of every [`Term`]: terms live in an arena and
//! parent/child links are [`TermId`] handles into that arena. Nothing outside
//! the builder can add, remove or relink terms.

use ahash::AHashMap;
use roaring::RoaringBitmap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::term::{Term, TermId};

#[derive(Debug, Default)]
pub struct TermGraph {
    terms: Vec<Term>,
    index: AHashMap<String, TermId>,
}

/// Summary counts, mostly for reporting.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphStats {
    pub terms: usize,
    pub roots: usize,
    pub edges: usize,
    /// Term count per namespace; terms without one are counted under `""`.
    pub namespaces: BTreeMap<String, usize>,
}

impl TermGraph {
    pub(crate) fn from_parts(terms: Vec<Term>, index: AHashMap<String, TermId>) -> Self {
        Self { terms, index }
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// All terms in file order.
    pub fn iter(&self) -> impl Iterator<Item = &Term> + '_ {
        self.terms.iter()
    }

    pub fn get(&self, handle: TermId) -> Option<&Term> {
        self.terms.get(handle.index())
    }

    /// Exact id lookup; no prefix or fuzzy matching.
    pub fn find(&self, id: &str) -> Option<&Term> {
        self.index.get(id).map(|h| &self.terms[h.index()])
    }

    pub fn find_handle(&self, id: &str) -> Option<TermId> {
        self.index.get(id).copied()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    /// Terms without parents. Order is unspecified; may be empty.
    pub fn roots(&self) -> Vec<&Term> {
        self.terms.iter().filter(|t| t.is_root()).collect()
    }

    pub fn parents_of(&self, handle: TermId) -> impl Iterator<Item = &Term> + '_ {
        self.linked(handle, |t| &t.parents)
    }

    pub fn children_of(&self, handle: TermId) -> impl Iterator<Item = &Term> + '_ {
        self.linked(handle, |t| &t.children)
    }

    fn linked<'a>(
        &'a self,
        handle: TermId,
        links: impl Fn(&'a Term) -> &'a Vec<TermId>,
    ) -> impl Iterator<Item = &'a Term> + 'a {
        self.get(handle)
            .map(|t| links(t).as_slice())
            .unwrap_or(&[])
            .iter()
            .map(move |h| &self.terms[h.index()])
    }

    /// Resolve a handle set (as returned by traversals) into terms, ordered by handle.
    pub fn terms_in<'a>(&'a self, set: &'a RoaringBitmap) -> impl Iterator<Item = &'a Term> + 'a {
        set.iter().filter_map(move |raw| self.terms.get(raw as usize))
    }

    /// Number of `is_a` edges.
    pub fn edge_count(&self) -> usize {
        self.terms.iter().map(|t| t.parents.len()).sum()
    }

    pub fn stats(&self) -> GraphStats {
        let mut namespaces = BTreeMap::new();
        for term in &self.terms {
            *namespaces
                .entry(term.namespace().unwrap_or_default().to_string())
                .or_insert(0) += 1;
        }
        GraphStats {
            terms: self.terms.len(),
            roots: self.terms.iter().filter(|t| t.is_root()).count(),
            edges: self.edge_count(),
            namespaces,
        }
    }

    pub(crate) fn term(&self, handle: TermId) -> &Term {
        &self.terms[handle.index()]
    }
}
