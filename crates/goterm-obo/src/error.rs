use thiserror::Error;

/// Fatal tokenizer failure. A load that hits one of these is aborted.
#[derive(Debug, Error)]
pub enum OboParseError {
    /// A line is neither a block header, blank, nor `key: value`.
    #[error("malformed line {line}: {text:?} (expected a block header or `key: value`)")]
    MalformedLine { line: usize, text: String },

    /// The underlying line source failed.
    #[error("failed to read line {line}: {source}")]
    Io {
        line: usize,
        #[source]
        source: std::io::Error,
    },
}

impl OboParseError {
    /// 1-based line number the error refers to.
    pub fn line(&self) -> usize {
        match self {
            Self::MalformedLine { line, .. } | Self::Io { line, .. } => *line,
        }
    }
}
