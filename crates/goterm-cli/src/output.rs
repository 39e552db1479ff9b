//! JSON views and text rendering for `goterm` output.
//!
//! Graph types refer to each other through handles; the views here resolve
//! handles back to ids so the output is meaningful on its own.

use colored::Colorize;
use goterm_graph::{ExternalRef, OutlineRow, Term, TermGraph};
use serde::Serialize;
use std::collections::BTreeSet;

#[derive(Debug, Clone, Copy, Serialize)]
pub(crate) struct TermSummary<'a> {
    pub id: &'a str,
    pub name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub namespace: Option<&'a str>,
}

impl<'a> From<&'a Term> for TermSummary<'a> {
    fn from(term: &'a Term) -> Self {
        Self {
            id: term.id(),
            name: term.name(),
            namespace: term.namespace(),
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct TermDetail<'a> {
    #[serde(flatten)]
    pub term: TermSummary<'a>,
    pub parents: Vec<TermSummary<'a>>,
    pub children: Vec<TermSummary<'a>>,
}

impl<'a> TermDetail<'a> {
    pub fn new(graph: &'a TermGraph, term: &'a Term) -> Self {
        let mut parents: Vec<TermSummary<'a>> =
            graph.parents_of(term.handle()).map(TermSummary::from).collect();
        let mut children: Vec<TermSummary<'a>> =
            graph.children_of(term.handle()).map(TermSummary::from).collect();
        parents.sort_by(|a, b| a.id.cmp(b.id));
        children.sort_by(|a, b| a.id.cmp(b.id));
        Self {
            term: term.into(),
            parents,
            children,
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct GeneReport<'a> {
    pub term: TermSummary<'a>,
    pub refs: &'a BTreeSet<ExternalRef>,
}

#[derive(Debug, Serialize)]
pub(crate) struct OutlineEntry<'a> {
    pub depth: usize,
    pub id: &'a str,
    pub name: &'a str,
    pub genes: Vec<&'a str>,
    pub subtree_gene_count: usize,
}

impl<'a> OutlineEntry<'a> {
    pub fn new(graph: &'a TermGraph, row: &'a OutlineRow) -> Option<Self> {
        let term = graph.get(row.term)?;
        Some(Self {
            depth: row.depth,
            id: term.id(),
            name: term.name(),
            genes: row.direct_refs.iter().map(|r| r.id.as_str()).collect(),
            subtree_gene_count: row.subtree_ref_count,
        })
    }
}

/// Terms sorted by id, for stable listings.
pub(crate) fn sorted_summaries<'a>(terms: impl IntoIterator<Item = &'a Term>) -> Vec<TermSummary<'a>> {
    let mut out: Vec<TermSummary<'a>> = terms.into_iter().map(TermSummary::from).collect();
    out.sort_by(|a, b| a.id.cmp(b.id));
    out
}

pub(crate) fn term_line(t: &TermSummary<'_>) -> String {
    match t.namespace {
        Some(ns) => format!("{}\t{}\t{}", t.id.bold(), t.name, ns.dimmed()),
        None => format!("{}\t{}", t.id.bold(), t.name),
    }
}

pub(crate) fn outline_line(entry: &OutlineEntry<'_>) -> String {
    let indent = "  ".repeat(entry.depth);
    let mut line = format!(
        "{indent}{} {} ({} genes)",
        entry.id.bold(),
        entry.name,
        entry.subtree_gene_count
    );
    if !entry.genes.is_empty() {
        line.push_str(&format!(": {}", entry.genes.join(", ")));
    }
    line
}

#[cfg(test)]
mod tests {
    use super::*;
    use goterm_graph::load_str;

    const OBO: &str = "[Term]\nid: GO:0000001\nname: root\nnamespace: biological_process\n\n\
                       [Term]\nid: GO:0000003\nname: c\nis_a: GO:0000001\n\n\
                       [Term]\nid: GO:0000002\nname: b\nis_a: GO:0000001\n";

    #[test]
    fn detail_lists_neighbours_by_id() {
        let graph = load_str(OBO).expect("load");
        let root = graph.find("GO:0000001").expect("root");
        let detail = TermDetail::new(&graph, root);
        let json = serde_json::to_value(&detail).expect("json");
        assert_eq!(json["id"], "GO:0000001");
        assert_eq!(json["namespace"], "biological_process");
        assert_eq!(json["parents"].as_array().map(Vec::len), Some(0));
        let children: Vec<&str> = detail.children.iter().map(|c| c.id).collect();
        assert_eq!(children, vec!["GO:0000002", "GO:0000003"]);
    }

    #[test]
    fn namespace_is_omitted_when_absent() {
        let graph = load_str(OBO).expect("load");
        let json = serde_json::to_value(TermSummary::from(graph.find("GO:0000002").expect("b")))
            .expect("json");
        assert!(json.get("namespace").is_none());
    }

    #[test]
    fn outline_line_indents_by_depth() {
        colored::control::set_override(false);
        let entry = OutlineEntry {
            depth: 2,
            id: "GO:0006096",
            name: "glycolytic process",
            genes: vec!["ENSG1", "ENSG2"],
            subtree_gene_count: 2,
        };
        assert_eq!(
            outline_line(&entry),
            "    GO:0006096 glycolytic process (2 genes): ENSG1, ENSG2"
        );
    }
}
