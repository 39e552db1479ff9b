//! OBO block tokenizer
//!
//! OBO is a line-oriented, block-structured ontology text format. This crate
//! turns a stream of lines into structural events and knows nothing about the
//! meaning of individual tags:
//!
//! - `BlockStart(kind)` for the unheaded leading block (`Main`) and for every
//!   `[Term]` / `[Typedef]` header,
//! - `Property(key, value)` for every `key: value` line,
//! - `BlockEnd` for every blank line (and before every header).
//!
//! Consumers either pull events from [`OboTokenizer`] or implement
//! [`OboHandler`] and let [`parse_obo`] push events into it.
//!
//! Only the subset of the format needed to build an `is_a` hierarchy is
//! supported. Comments, escapes and other block kinds are rejected as
//! malformed lines.

pub mod error;
pub mod event;
pub mod handler;
pub mod tokenizer;

pub use error::OboParseError;
pub use event::{BlockKind, OboEvent};
pub use handler::{parse_obo, parse_obo_str, OboHandler};
pub use tokenizer::{split_property, OboTokenizer, TextLines, TokenizerState};
