//! Two-pass construction of a [`TermGraph`] from tokenizer events.
//!
//! Pass 1 (driven by [`OboHandler`] callbacks) stages every `[Term]` block and
//! materializes it into the arena on block end, keeping its raw `is_a` ids in a
//! side table. Pass 2 ([`TermGraphBuilder::finish`]) resolves those ids into
//! bidirectional links. `is_a` may point at terms defined later in the file,
//! so no edge is created before the whole input has been read.

use ahash::AHashMap;
use goterm_obo::{BlockKind, OboHandler};
use std::collections::BTreeSet;
use tracing::{debug, info};

use crate::error::{BuildError, LoadError};
use crate::graph::TermGraph;
use crate::term::{Term, TermId};

/// Width of a `GO:nnnnnnn` id. Only this many characters of an `is_a` value
/// are kept as the parent id; ids of any other width are cut or padded with
/// whatever follows them and will fail to resolve.
pub const GO_ID_WIDTH: usize = 10;

/// Parent id carried by an `is_a` value such as `GO:0003674 ! molecular_function`.
///
/// Values shorter than [`GO_ID_WIDTH`] are taken whole.
pub fn is_a_parent_id(value: &str) -> &str {
    match value.char_indices().nth(GO_ID_WIDTH) {
        Some((end, _)) => &value[..end],
        None => value,
    }
}

/// Handle for the arena slot at `len`.
fn next_handle(len: usize) -> Result<TermId, BuildError> {
    u32::try_from(len)
        .map(TermId::new)
        .map_err(|_| BuildError::TooManyTerms {
            limit: u64::from(u32::MAX) + 1,
        })
}

#[derive(Debug, Default)]
struct StagingRecord {
    id: Option<String>,
    name: Option<String>,
    namespace: Option<String>,
    is_a: BTreeSet<String>,
    obsolete: bool,
    /// Whether any property was recorded since the last reset.
    touched: bool,
}

/// Event consumer that accumulates a term graph.
#[derive(Debug)]
pub struct TermGraphBuilder {
    kind: BlockKind,
    staging: StagingRecord,
    term_blocks: usize,
    obsolete: usize,
    terms: Vec<Term>,
    index: AHashMap<String, TermId>,
    /// Raw `is_a` ids per materialized term, indexed by handle.
    pending_parents: Vec<BTreeSet<String>>,
}

impl Default for TermGraphBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TermGraphBuilder {
    pub fn new() -> Self {
        Self {
            kind: BlockKind::Main,
            staging: StagingRecord::default(),
            term_blocks: 0,
            obsolete: 0,
            terms: Vec::new(),
            index: AHashMap::new(),
            pending_parents: Vec::new(),
        }
    }

    /// Number of terms materialized so far.
    pub fn staged_terms(&self) -> usize {
        self.terms.len()
    }

    fn close_block(&mut self) -> Result<(), BuildError> {
        let record = std::mem::take(&mut self.staging);
        if self.kind != BlockKind::Term || !record.touched {
            return Ok(());
        }
        if record.obsolete {
            self.obsolete += 1;
            debug!(id = record.id.as_deref().unwrap_or(""), "skipping obsolete term");
            return Ok(());
        }

        let Some(id) = record.id else {
            return Err(BuildError::MissingId {
                block: self.term_blocks,
            });
        };
        if self.index.contains_key(&id) {
            return Err(BuildError::DuplicateId { id });
        }

        let handle = next_handle(self.terms.len())?;
        self.index.insert(id.clone(), handle);
        self.terms.push(Term::new(
            handle,
            id,
            record.name.unwrap_or_default(),
            record.namespace,
        ));
        self.pending_parents.push(record.is_a);
        Ok(())
    }

    /// Close any block left open at end of input and resolve all `is_a`
    /// references.
    pub fn finish(mut self) -> Result<TermGraph, BuildError> {
        self.close_block()?;

        let pending = std::mem::take(&mut self.pending_parents);
        for (child_idx, parent_ids) in pending.into_iter().enumerate() {
            let child = next_handle(child_idx)?;
            for parent_id in parent_ids {
                if parent_id == self.terms[child_idx].id {
                    return Err(BuildError::SelfReference { id: parent_id });
                }
                let Some(&parent) = self.index.get(&parent_id) else {
                    return Err(BuildError::DanglingReference {
                        term_id: self.terms[child_idx].id.clone(),
                        missing_parent_id: parent_id,
                    });
                };
                self.terms[child_idx].parents.push(parent);
                self.terms[parent.index()].children.push(child);
            }
        }

        let graph = TermGraph::from_parts(self.terms, self.index);
        info!(
            terms = graph.len(),
            edges = graph.edge_count(),
            obsolete = self.obsolete,
            "built term graph"
        );
        Ok(graph)
    }
}

impl OboHandler for TermGraphBuilder {
    type Error = LoadError;

    fn start_block(&mut self, kind: BlockKind) -> Result<(), Self::Error> {
        self.staging = StagingRecord::default();
        self.kind = kind;
        if kind == BlockKind::Term {
            self.term_blocks += 1;
        }
        Ok(())
    }

    fn property(&mut self, key: &str, value: &str) -> Result<(), Self::Error> {
        if self.kind != BlockKind::Term {
            return Ok(());
        }
        let staging = &mut self.staging;
        staging.touched = true;
        match key {
            "id" => staging.id = Some(value.to_string()),
            "name" => staging.name = Some(value.to_string()),
            "namespace" => staging.namespace = Some(value.to_string()),
            "is_obsolete" => staging.obsolete = value == "true",
            "is_a" => {
                staging.is_a.insert(is_a_parent_id(value).to_string());
            }
            _ => {}
        }
        Ok(())
    }

    fn end_block(&mut self) -> Result<(), Self::Error> {
        Ok(self.close_block()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use goterm_obo::parse_obo_str;

    fn build(text: &str) -> Result<TermGraph, LoadError> {
        let mut builder = TermGraphBuilder::new();
        parse_obo_str(text, &mut builder)?;
        Ok(builder.finish()?)
    }

    #[test]
    fn is_a_keeps_first_ten_characters() {
        assert_eq!(is_a_parent_id("GO:0003674 ! molecular_function"), "GO:0003674");
        assert_eq!(is_a_parent_id("GO:0003674"), "GO:0003674");
        assert_eq!(is_a_parent_id("GO:12"), "GO:12");
        // Wider ids are silently cut.
        assert_eq!(is_a_parent_id("HP:00000012 ! x"), "HP:0000001");
    }

    #[test]
    fn forward_references_resolve() {
        let graph = build(
            "[Term]\nid: GO:0000002\nname: child\nis_a: GO:0000001 ! root\n\n\
             [Term]\nid: GO:0000001\nname: root\n\n",
        )
        .expect("build");
        let child = graph.find("GO:0000002").expect("child");
        let root = graph.find("GO:0000001").expect("root");
        assert_eq!(child.parents(), &[root.handle()]);
        assert_eq!(root.children(), &[child.handle()]);
    }

    #[test]
    fn typedef_and_main_blocks_contribute_nothing() {
        let graph = build(
            "format-version: 1.2\nid: not-a-term\n\n\
             [Typedef]\nid: part_of\nname: part of\n\n\
             [Term]\nid: GO:0000001\nname: root\n\n",
        )
        .expect("build");
        assert_eq!(graph.len(), 1);
        assert!(graph.find("part_of").is_none());
        assert!(graph.find("not-a-term").is_none());
    }

    #[test]
    fn obsolete_terms_are_dropped() {
        let graph = build(
            "[Term]\nid: GO:0000001\nname: root\n\n\
             [Term]\nid: GO:0000009\nname: gone\nis_a: GO:0000001\nis_obsolete: true\n\n",
        )
        .expect("build");
        assert!(graph.find("GO:0000009").is_none());
        assert!(graph.find("GO:0000001").expect("root").is_leaf());
    }

    #[test]
    fn is_obsolete_must_be_literal_true() {
        let graph = build("[Term]\nid: GO:0000001\nis_obsolete: TRUE\n\n").expect("build");
        assert!(graph.find("GO:0000001").is_some());
    }

    #[test]
    fn reference_to_obsolete_term_dangles() {
        let err = build(
            "[Term]\nid: GO:0000009\nis_obsolete: true\n\n\
             [Term]\nid: GO:0000002\nis_a: GO:0000009 ! gone\n\n",
        )
        .expect_err("dangling");
        assert!(matches!(
            err,
            LoadError::Build(BuildError::DanglingReference { ref term_id, ref missing_parent_id })
                if term_id == "GO:0000002" && missing_parent_id == "GO:0000009"
        ));
    }

    #[test]
    fn duplicate_ids_fail() {
        let err = build("[Term]\nid: GO:0000001\n\n[Term]\nid: GO:0000001\n\n").expect_err("dup");
        assert!(matches!(
            err,
            LoadError::Build(BuildError::DuplicateId { ref id }) if id == "GO:0000001"
        ));
    }

    #[test]
    fn duplicate_of_obsolete_term_is_allowed() {
        let graph = build(
            "[Term]\nid: GO:0000001\nis_obsolete: true\n\n[Term]\nid: GO:0000001\nname: live\n\n",
        )
        .expect("build");
        assert_eq!(graph.find("GO:0000001").expect("live").name(), "live");
    }

    #[test]
    fn self_reference_fails() {
        let err = build("[Term]\nid: GO:0000001\nis_a: GO:0000001\n\n").expect_err("self");
        assert!(matches!(err, LoadError::Build(BuildError::SelfReference { .. })));
    }

    #[test]
    fn term_without_id_fails() {
        let err = build("[Term]\nid: GO:0000001\n\n[Term]\nname: anonymous\n\n").expect_err("no id");
        assert!(matches!(err, LoadError::Build(BuildError::MissingId { block: 2 })));
    }

    #[test]
    fn unterminated_last_block_is_materialized() {
        let graph = build("[Term]\nid: GO:0000001\n\n[Term]\nid: GO:0000002\nis_a: GO:0000001").expect("build");
        assert_eq!(graph.len(), 2);
        assert_eq!(graph.roots().len(), 1);
    }

    #[test]
    fn repeated_blank_lines_do_not_duplicate_terms() {
        let graph = build("[Term]\nid: GO:0000001\n\n\n\n[Term]\nid: GO:0000002\n\n\n").expect("build");
        assert_eq!(graph.len(), 2);
    }

    #[test]
    fn malformed_line_aborts_the_load() {
        let err = build("[Term]\nid: GO:0000001\nfoo bar\n\n").expect_err("malformed");
        assert!(matches!(err, LoadError::Parse(_)));
    }

    #[test]
    fn header_without_trailing_blank_line_discards_nothing_else() {
        // An empty `[Term]` block (header immediately followed by another header)
        // is not a term and must not raise MissingId.
        let graph = build("[Term]\n[Term]\nid: GO:0000001\n\n").expect("build");
        assert_eq!(graph.len(), 1);
    }

    #[test]
    fn handles_stop_at_the_u32_range() {
        assert_eq!(next_handle(0), Ok(TermId::new(0)));
        assert_eq!(next_handle(u32::MAX as usize), Ok(TermId::new(u32::MAX)));
    }

    #[cfg(target_pointer_width = "64")]
    #[test]
    fn arena_past_u32_range_is_rejected() {
        let err = next_handle(u32::MAX as usize + 1).expect_err("overflow");
        assert_eq!(err, BuildError::TooManyTerms { limit: 4_294_967_296 });
        assert_eq!(err.to_string(), "ontology has more than 4294967296 terms");
    }
}
