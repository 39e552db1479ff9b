//! Traversals over a built [`TermGraph`].
//!
//! Real ontologies share descendants heavily (a term typically has several
//! `is_a` parents), so every traversal tracks visited handles in a bitmap and
//! touches each reachable term exactly once. The visited set belongs to one
//! call and is never shared between concurrent traversals.

use ahash::AHashMap;
use rayon::prelude::*;
use roaring::RoaringBitmap;
use serde::Serialize;
use std::collections::BTreeSet;
use tracing::{debug, info};

use crate::graph::TermGraph;
use crate::lookup::{lookup_or_empty, CachedLookup, ExternalRef, TermLookup};
use crate::term::TermId;

/// One line of a subtree outline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutlineRow {
    pub depth: usize,
    pub term: TermId,
    /// References annotated directly on this term.
    pub direct_refs: BTreeSet<ExternalRef>,
    /// Size of the union over this term and all of its descendants.
    pub subtree_ref_count: usize,
}

impl TermGraph {
    /// `term` plus everything reachable through child links.
    ///
    /// Unknown handles yield an empty set.
    pub fn descendants_and_self(&self, term: TermId) -> RoaringBitmap {
        let mut visited = RoaringBitmap::new();
        if self.get(term).is_none() {
            return visited;
        }

        let mut stack = vec![term];
        visited.insert(term.raw());
        while let Some(current) = stack.pop() {
            for &child in self.term(current).children() {
                if visited.insert(child.raw()) {
                    stack.push(child);
                }
            }
        }
        visited
    }

    fn collect_subtree<L: TermLookup + ?Sized>(
        &self,
        term: TermId,
        lookup: &L,
    ) -> BTreeSet<ExternalRef> {
        let mut refs = BTreeSet::new();
        for handle in self.descendants_and_self(term).iter() {
            refs.extend(lookup_or_empty(lookup, self.term(TermId::new(handle)).id()));
        }
        refs
    }

    /// Union of `lookup` over `term` and all of its descendants.
    ///
    /// Each distinct term is looked up once. Lookup failures are logged and
    /// contribute nothing; they never abort the aggregation.
    pub fn aggregate_over_subtree<L: TermLookup + ?Sized>(
        &self,
        term: TermId,
        lookup: &L,
    ) -> BTreeSet<ExternalRef> {
        let refs = self.collect_subtree(term, lookup);
        if let Some(t) = self.get(term) {
            info!(term = t.name(), id = t.id(), refs = refs.len(), "aggregated subtree");
        }
        refs
    }

    /// [`aggregate_over_subtree`](Self::aggregate_over_subtree) for every root,
    /// one rayon task per root.
    pub fn aggregate_roots_parallel<L: TermLookup + Sync + ?Sized>(
        &self,
        lookup: &L,
    ) -> Vec<(TermId, BTreeSet<ExternalRef>)> {
        self.roots()
            .into_par_iter()
            .map(|root| (root.handle(), self.aggregate_over_subtree(root.handle(), lookup)))
            .collect()
    }

    /// Pre-order outline of the subtree under `term`.
    ///
    /// A term reachable through several parents appears once under each of
    /// them, as in a tree view. Subtrees whose aggregated reference set is
    /// empty are pruned (including `term` itself, which yields no rows). Each
    /// term id reaches `lookup` at most once per call, and each distinct
    /// term's subtree union is computed once per call.
    pub fn subtree_outline<L: TermLookup + ?Sized>(
        &self,
        term: TermId,
        lookup: &L,
    ) -> Vec<OutlineRow> {
        let mut rows = Vec::new();
        if self.get(term).is_none() {
            return rows;
        }
        let mut subtrees = SubtreeRefs::new(self, lookup);
        let mut path = RoaringBitmap::new();
        self.outline_into(term, 0, &mut subtrees, &mut path, &mut rows);
        debug!(
            rows = rows.len(),
            subtrees = subtrees.unions,
            lookups = subtrees.lookup.len(),
            "built subtree outline"
        );
        rows
    }

    fn outline_into<L: TermLookup + ?Sized>(
        &self,
        term: TermId,
        depth: usize,
        subtrees: &mut SubtreeRefs<'_, L>,
        path: &mut RoaringBitmap,
        rows: &mut Vec<OutlineRow>,
    ) {
        let subtree_ref_count = subtrees.count(term) as usize;
        if subtree_ref_count == 0 {
            return;
        }
        rows.push(OutlineRow {
            depth,
            term,
            direct_refs: subtrees.lookup.get(self.term(term).id()),
            subtree_ref_count,
        });

        // Guards against is_a cycles, which the builder does not reject.
        path.insert(term.raw());
        for &child in self.term(term).children() {
            if !path.contains(child.raw()) {
                self.outline_into(child, depth + 1, subtrees, path, rows);
            }
        }
        path.remove(term.raw());
    }
}

/// Per-call memo of subtree reference sets, as bitmaps over interned refs.
///
/// Acyclic regions are filled bottom-up in one post-order walk, so every term
/// unions its children's finished sets. Terms that sit on or above an `is_a`
/// cycle get their set from a full descendant walk instead.
struct SubtreeRefs<'a, L: ?Sized> {
    graph: &'a TermGraph,
    lookup: CachedLookup<'a, L>,
    /// Dense ids for refs; an outline sees far fewer than `u32::MAX` of them.
    interned: AHashMap<ExternalRef, u32>,
    direct: AHashMap<TermId, RoaringBitmap>,
    subtree: AHashMap<TermId, RoaringBitmap>,
    /// Subtree sets computed so far.
    unions: usize,
}

impl<'a, L: TermLookup + ?Sized> SubtreeRefs<'a, L> {
    fn new(graph: &'a TermGraph, lookup: &'a L) -> Self {
        Self {
            graph,
            lookup: CachedLookup::new(lookup),
            interned: AHashMap::new(),
            direct: AHashMap::new(),
            subtree: AHashMap::new(),
            unions: 0,
        }
    }

    /// Number of distinct refs over `term` and its descendants.
    fn count(&mut self, term: TermId) -> u64 {
        if !self.subtree.contains_key(&term) {
            self.fill_from(term);
        }
        self.subtree.get(&term).map_or(0, RoaringBitmap::len)
    }

    fn ensure_direct(&mut self, term: TermId) {
        if self.direct.contains_key(&term) {
            return;
        }
        let mut bits = RoaringBitmap::new();
        for r in self.lookup.get(self.graph.term(term).id()) {
            let next = self.interned.len() as u32;
            bits.insert(*self.interned.entry(r).or_insert(next));
        }
        self.direct.insert(term, bits);
    }

    fn fill_from(&mut self, root: TermId) {
        let graph = self.graph;
        let mut on_stack = RoaringBitmap::new();
        // Terms whose set depends on a cycle reachable below them.
        let mut cyclic = RoaringBitmap::new();
        let mut stack: Vec<(TermId, usize)> = vec![(root, 0)];
        on_stack.insert(root.raw());

        while let Some(frame) = stack.last_mut() {
            let term = frame.0;
            if let Some(&child) = graph.term(term).children().get(frame.1) {
                frame.1 += 1;
                if self.subtree.contains_key(&child) {
                    continue;
                }
                if on_stack.contains(child.raw()) || cyclic.contains(child.raw()) {
                    cyclic.insert(term.raw());
                    continue;
                }
                on_stack.insert(child.raw());
                stack.push((child, 0));
                continue;
            }

            stack.pop();
            on_stack.remove(term.raw());
            if cyclic.contains(term.raw()) {
                if let Some(&(parent, _)) = stack.last() {
                    cyclic.insert(parent.raw());
                }
                continue;
            }
            self.ensure_direct(term);
            let mut bits = self.direct.get(&term).cloned().unwrap_or_default();
            for child in graph.term(term).children() {
                if let Some(child_bits) = self.subtree.get(child) {
                    bits |= child_bits;
                }
            }
            self.unions += 1;
            self.subtree.insert(term, bits);
        }

        for raw in cyclic.iter() {
            let term = TermId::new(raw);
            let mut bits = RoaringBitmap::new();
            for d in graph.descendants_and_self(term).iter() {
                let d = TermId::new(d);
                self.ensure_direct(d);
                if let Some(direct) = self.direct.get(&d) {
                    bits |= direct;
                }
            }
            self.unions += 1;
            self.subtree.insert(term, bits);
        }
    }
}
