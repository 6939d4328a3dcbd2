//! SVG optimization passes.
//!
//! Tree passes run on the parsed document; text passes run on the
//! serialized output. Comments are removed before whitespace is collapsed
//! and numbers are rounded before the tree is serialized.

use std::borrow::Cow;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::Options;
use crate::ast::*;
use crate::error::ParseError;
use crate::markup::{MarkupParser, QuickXmlMarkup};
use crate::number::DecimalRounder;

static INTER_TAG_WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r">\s+<").unwrap());
static XML_DECLARATION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*<\?xml(?:\s[^>]*)?\?>").unwrap());
static DEFAULT_ROUNDER: Lazy<DecimalRounder> = Lazy::new(DecimalRounder::default);

/// Minify SVG text, returning the diagnostic if it cannot be parsed.
pub fn try_optimize(svg: &str, options: &Options) -> Result<String, ParseError> {
    try_optimize_with_parser(&QuickXmlMarkup, svg, options)
}

/// Minify SVG text. Unparseable input is returned unchanged.
pub fn optimize_with_parser(parser: &impl MarkupParser, svg: &str, options: &Options) -> String {
    match try_optimize_with_parser(parser, svg, options) {
        Ok(out) => out,
        Err(e) => {
            log::debug!("optimize: leaving input unchanged: {}", e);
            svg.to_string()
        }
    }
}

fn try_optimize_with_parser(
    parser: &impl MarkupParser,
    svg: &str,
    options: &Options,
) -> Result<String, ParseError> {
    let mut doc = parser.parse(svg)?;
    optimize_document(&mut doc, options);

    let mut out = parser.serialize(&doc);

    if options.collapse_whitespace {
        out = collapse_whitespace(&out);
    }

    if options.remove_xml_declaration {
        out = remove_xml_declaration(&out);
    }

    log::trace!("optimize: {}", SizeReport::new(svg, &out));
    Ok(out)
}

/// Apply the enabled tree passes to the document.
pub fn optimize_document(doc: &mut Document, options: &Options) {
    if options.remove_comments {
        doc.prolog.retain(|node| !matches!(node, Node::Comment(_)));
        remove_comments(&mut doc.root);
    }

    if options.remove_empty_attrs {
        doc.for_each_element_mut(remove_empty_attrs);
    }

    let rounder = rounder_for(options.precision);
    doc.for_each_element_mut(|elem| round_numbers(elem, &rounder));
}

/// The shared rounder for the default precision, a fresh one otherwise.
fn rounder_for(precision: u8) -> Cow<'static, DecimalRounder> {
    if precision == DEFAULT_ROUNDER.precision() {
        Cow::Borrowed(&*DEFAULT_ROUNDER)
    } else {
        Cow::Owned(DecimalRounder::new(precision))
    }
}

/// Remove comment nodes at every depth.
fn remove_comments(elem: &mut Element) {
    elem.children
        .retain(|node| !matches!(node, Node::Comment(_)));

    for child in elem.child_elements_mut() {
        remove_comments(child);
    }
}

/// Remove attributes whose value is the empty string.
fn remove_empty_attrs(elem: &mut Element) {
    elem.attributes.retain(|attr| !attr.value.is_empty());
}

/// Reduce over-precise numbers in every attribute value.
fn round_numbers(elem: &mut Element, rounder: &DecimalRounder) {
    for attr in &mut elem.attributes {
        if let Cow::Owned(rounded) = rounder.round_all(&attr.value) {
            attr.value = rounded;
        }
    }
}

/// Drop whitespace runs sitting directly between `>` and `<`.
pub fn collapse_whitespace(text: &str) -> String {
    INTER_TAG_WHITESPACE.replace_all(text, "><").into_owned()
}

/// Drop a leading `<?xml ...?>` declaration. Other processing instructions
/// such as `<?xml-stylesheet?>` are kept.
pub fn remove_xml_declaration(text: &str) -> String {
    XML_DECLARATION.replace(text, "").into_owned()
}

/// Byte counts before and after a transform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SizeReport {
    pub original: usize,
    pub optimized: usize,
}

impl SizeReport {
    pub fn new(original: &str, optimized: &str) -> Self {
        Self {
            original: original.len(),
            optimized: optimized.len(),
        }
    }

    pub fn saved(&self) -> usize {
        self.original.saturating_sub(self.optimized)
    }

    /// Percentage saved, 0 for empty input.
    pub fn percent(&self) -> f64 {
        if self.original > 0 {
            (self.saved() as f64 / self.original as f64) * 100.0
        } else {
            0.0
        }
    }
}

impl std::fmt::Display for SizeReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} -> {} bytes ({:.1}% smaller)",
            self.original,
            self.optimized,
            self.percent()
        )
    }
}
