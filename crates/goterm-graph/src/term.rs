use serde::{Deserialize, Serialize};

/// Compact handle of a term inside one [`TermGraph`](crate::TermGraph).
///
/// Handles are arena indices: they are only meaningful for the graph that
/// produced them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(transparent)]
pub struct TermId(u32);

impl TermId {
    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }

    pub const fn raw(self) -> u32 {
        self.0
    }

    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}

/// One ontology concept. Immutable once the graph is built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Term {
    pub(crate) handle: TermId,
    pub(crate) id: String,
    pub(crate) name: String,
    pub(crate) namespace: Option<String>,
    pub(crate) parents: Vec<TermId>,
    pub(crate) children: Vec<TermId>,
}

impl Term {
    pub(crate) fn new(handle: TermId, id: String, name: String, namespace: Option<String>) -> Self {
        Self {
            handle,
            id,
            name,
            namespace,
            parents: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn handle(&self) -> TermId {
        self.handle
    }

    /// Ontology id, e.g. `GO:0008150`.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Label; empty when the block had no `name`.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    pub fn parents(&self) -> &[TermId] {
        &self.parents
    }

    pub fn children(&self) -> &[TermId] {
        &self.children
    }

    pub fn is_root(&self) -> bool {
        self.parents.is_empty()
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }
}
