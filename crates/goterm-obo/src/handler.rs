//! Push-based consumption of tokenizer events.

use std::io::BufRead;

use crate::error::OboParseError;
use crate::event::{BlockKind, OboEvent};
use crate::tokenizer::OboTokenizer;

/// Event consumer for [`parse_obo`].
///
/// Handlers may reject an event by returning an error; parsing stops at the
/// first error, whether it comes from the tokenizer or from the handler.
pub trait OboHandler {
    type Error: From<OboParseError>;

    /// Called when a block opens: once for `Main` before any line is read,
    /// then for every `[Term]` / `[Typedef]` header.
    fn start_block(&mut self, kind: BlockKind) -> Result<(), Self::Error>;

    /// Called for every `key: value` line.
    fn property(&mut self, key: &str, value: &str) -> Result<(), Self::Error>;

    /// Called for every blank line and right before every header.
    fn end_block(&mut self) -> Result<(), Self::Error>;
}

fn dispatch<H: OboHandler>(
    events: impl Iterator<Item = Result<OboEvent, OboParseError>>,
    handler: &mut H,
) -> Result<(), H::Error> {
    for event in events {
        match event? {
            OboEvent::BlockStart(kind) => handler.start_block(kind)?,
            OboEvent::Property { key, value } => handler.property(&key, &value)?,
            OboEvent::BlockEnd => handler.end_block()?,
        }
    }
    Ok(())
}

/// Drive `handler` with every event of `reader`.
pub fn parse_obo<R: BufRead, H: OboHandler>(reader: R, handler: &mut H) -> Result<(), H::Error> {
    dispatch(OboTokenizer::from_reader(reader), handler)
}

pub fn parse_obo_str<H: OboHandler>(text: &str, handler: &mut H) -> Result<(), H::Error> {
    dispatch(OboTokenizer::from_text(text), handler)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Recorder {
        log: Vec<String>,
    }

    impl OboHandler for Recorder {
        type Error = OboParseError;

        fn start_block(&mut self, kind: BlockKind) -> Result<(), Self::Error> {
            self.log.push(format!("start {kind}"));
            Ok(())
        }

        fn property(&mut self, key: &str, value: &str) -> Result<(), Self::Error> {
            self.log.push(format!("{key}={value}"));
            Ok(())
        }

        fn end_block(&mut self) -> Result<(), Self::Error> {
            self.log.push("end".to_string());
            Ok(())
        }
    }

    #[test]
    fn recorder_sees_events_in_order() {
        let mut rec = Recorder::default();
        parse_obo_str("a: 1\n\n[Term]\nid: X\n", &mut rec).expect("parse");
        assert_eq!(
            rec.log,
            vec!["start Main", "a=1", "end", "end", "start Term", "id=X"]
        );
    }

    #[test]
    fn reader_entry_point_stops_on_malformed_line() {
        let mut rec = Recorder::default();
        let err = parse_obo("[Term]\nnot a property\nid: X\n".as_bytes(), &mut rec)
            .expect_err("malformed");
        assert!(matches!(err, OboParseError::MalformedLine { line: 2, .. }));
        assert!(!rec.log.iter().any(|l| l == "id=X"));
    }

    #[derive(Debug)]
    enum Rejecting {
        Parse(OboParseError),
        Stop,
    }

    impl From<OboParseError> for Rejecting {
        fn from(err: OboParseError) -> Self {
            Self::Parse(err)
        }
    }

    struct StopAtTypedef;

    impl OboHandler for StopAtTypedef {
        type Error = Rejecting;

        fn start_block(&mut self, kind: BlockKind) -> Result<(), Self::Error> {
            if kind == BlockKind::Typedef {
                return Err(Rejecting::Stop);
            }
            Ok(())
        }

        fn property(&mut self, _key: &str, _value: &str) -> Result<(), Self::Error> {
            Ok(())
        }

        fn end_block(&mut self) -> Result<(), Self::Error> {
            Ok(())
        }
    }

    #[test]
    fn handler_errors_abort_parsing() {
        let err = parse_obo_str("[Typedef]\nbad line\n", &mut StopAtTypedef).expect_err("stop");
        assert!(matches!(err, Rejecting::Stop));
    }
}
