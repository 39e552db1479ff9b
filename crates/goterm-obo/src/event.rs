//! Structural events emitted by the tokenizer.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of block an OBO file is split into.
///
/// `Main` is the unheaded section at the top of the file (format version,
/// ontology name, ...). Every other block starts with a bracketed header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockKind {
    Main,
    Term,
    Typedef,
}

impl BlockKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Main => "Main",
            Self::Term => "Term",
            Self::Typedef => "Typedef",
        }
    }

    /// Block kind introduced by a header line, if the line is one.
    ///
    /// Headers must match exactly; `[Term] ` with trailing whitespace is not a
    /// header.
    pub fn from_header(line: &str) -> Option<Self> {
        match line {
            "[Term]" => Some(Self::Term),
            "[Typedef]" => Some(Self::Typedef),
            _ => None,
        }
    }
}

impl fmt::Display for BlockKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OboEvent {
    BlockStart(BlockKind),
    Property { key: String, value: String },
    BlockEnd,
}

impl OboEvent {
    pub fn property(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self::Property {
            key: key.into(),
            value: value.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn headers_are_exact() {
        assert_eq!(BlockKind::from_header("[Term]"), Some(BlockKind::Term));
        assert_eq!(BlockKind::from_header("[Typedef]"), Some(BlockKind::Typedef));
        assert_eq!(BlockKind::from_header("[Term] "), None);
        assert_eq!(BlockKind::from_header("[Instance]"), None);
        assert_eq!(BlockKind::from_header("Term"), None);
    }

    #[test]
    fn display_matches_header_name() {
        assert_eq!(BlockKind::Typedef.to_string(), "Typedef");
        assert_eq!(BlockKind::Main.as_str(), "Main");
    }
}
