//! The parse/serialize seam used by the transforms.

use crate::ast::Document;
use crate::parse::{ParseResult, parse_svg};
use crate::serialize::serialize;

/// Turns markup text into a [`Document`] and back.
///
/// `serialize(parse(x))` must parse again to a structurally equal tree.
pub trait MarkupParser {
    fn parse(&self, text: &str) -> ParseResult;
    fn serialize(&self, doc: &Document) -> String;
}

/// The bundled implementation backed by `quick-xml`.
#[derive(Debug, Clone, Copy, Default)]
pub struct QuickXmlMarkup;

impl MarkupParser for QuickXmlMarkup {
    fn parse(&self, text: &str) -> ParseResult {
        parse_svg(text)
    }

    fn serialize(&self, doc: &Document) -> String {
        serialize(doc)
    }
}
