//! Pull-based tokenizer.
//!
//! The tokenizer is a small state machine:
//!
//! ```text
//! Uninitialized --(first poll)--> InMainBlock
//! any state --"[Term]"-->    InTermBlock
//! any state --"[Typedef]"--> InTypedefBlock
//! ```
//!
//! Blank lines emit `BlockEnd` without changing state. There is no terminal
//! state: the consumer simply stops polling. End of input does **not** emit a
//! trailing `BlockEnd`; consumers that need the last block closed must handle
//! an open block themselves.

use std::collections::VecDeque;
use std::io::{self, BufRead};

use crate::error::OboParseError;
use crate::event::{BlockKind, OboEvent};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenizerState {
    Uninitialized,
    InMainBlock,
    InTermBlock,
    InTypedefBlock,
}

impl TokenizerState {
    fn entering(kind: BlockKind) -> Self {
        match kind {
            BlockKind::Main => Self::InMainBlock,
            BlockKind::Term => Self::InTermBlock,
            BlockKind::Typedef => Self::InTypedefBlock,
        }
    }
}

/// Split a `key: value` line.
///
/// The key is everything before the first colon and must be non-empty; the
/// value is the remainder with leading whitespace removed (trailing text such
/// as `! comment` is kept verbatim).
pub fn split_property(line: &str) -> Option<(&str, &str)> {
    let (key, value) = line.split_once(':')?;
    if key.is_empty() {
        return None;
    }
    Some((key, value.trim_start()))
}

/// Line source over an in-memory string.
pub struct TextLines<'a>(std::str::Lines<'a>);

impl<'a> Iterator for TextLines<'a> {
    type Item = io::Result<String>;

    fn next(&mut self) -> Option<Self::Item> {
        self.0.next().map(|l| Ok(l.to_string()))
    }
}

/// Lazily turns a line source into [`OboEvent`]s.
///
/// After the first error the tokenizer is exhausted; it cannot be resumed or
/// rewound. Re-tokenizing requires a fresh line source.
pub struct OboTokenizer<I> {
    lines: I,
    line_no: usize,
    state: TokenizerState,
    pending: VecDeque<OboEvent>,
    failed: bool,
}

impl<I> OboTokenizer<I>
where
    I: Iterator<Item = io::Result<String>>,
{
    pub fn new(lines: I) -> Self {
        Self {
            lines,
            line_no: 0,
            state: TokenizerState::Uninitialized,
            pending: VecDeque::with_capacity(2),
            failed: false,
        }
    }

    pub fn state(&self) -> TokenizerState {
        self.state
    }

    /// Number of lines consumed so far (1-based line of the last event's source).
    pub fn line_number(&self) -> usize {
        self.line_no
    }

    fn classify(&mut self, line: String) -> Result<(), OboParseError> {
        if let Some(kind) = BlockKind::from_header(&line) {
            self.state = TokenizerState::entering(kind);
            self.pending.push_back(OboEvent::BlockEnd);
            self.pending.push_back(OboEvent::BlockStart(kind));
            return Ok(());
        }

        if line.is_empty() {
            self.pending.push_back(OboEvent::BlockEnd);
            return Ok(());
        }

        match split_property(&line) {
            Some((key, value)) => {
                self.pending.push_back(OboEvent::property(key, value));
                Ok(())
            }
            None => Err(OboParseError::MalformedLine {
                line: self.line_no,
                text: line,
            }),
        }
    }
}

impl<R: BufRead> OboTokenizer<io::Lines<R>> {
    pub fn from_reader(reader: R) -> Self {
        Self::new(reader.lines())
    }
}

impl<'a> OboTokenizer<TextLines<'a>> {
    pub fn from_text(text: &'a str) -> Self {
        Self::new(TextLines(text.lines()))
    }
}

impl<I> Iterator for OboTokenizer<I>
where
    I: Iterator<Item = io::Result<String>>,
{
    type Item = Result<OboEvent, OboParseError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.state == TokenizerState::Uninitialized {
            self.state = TokenizerState::InMainBlock;
            return Some(Ok(OboEvent::BlockStart(BlockKind::Main)));
        }

        loop {
            if let Some(event) = self.pending.pop_front() {
                return Some(Ok(event));
            }
            if self.failed {
                return None;
            }

            match self.lines.next()? {
                Ok(line) => {
                    self.line_no += 1;
                    if let Err(err) = self.classify(line) {
                        self.failed = true;
                        return Some(Err(err));
                    }
                }
                Err(source) => {
                    self.failed = true;
                    return Some(Err(OboParseError::Io {
                        line: self.line_no + 1,
                        source,
                    }));
                }
            }
        }
    }
}
