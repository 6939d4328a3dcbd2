//! Re-indentation of SVG markup.
//!
//! Only the root element is rendered: the XML declaration, DOCTYPE and any
//! comments or processing instructions are dropped. Text children are trimmed
//! and whitespace-only text disappears, which loses content that relies on
//! significant whitespace (`xml:space="preserve"`).

use crate::ast::*;
use crate::error::ParseError;
use crate::markup::{MarkupParser, QuickXmlMarkup};
use crate::serialize::{push_escaped_attr, push_escaped_text};

/// Pretty-printer settings.
#[derive(Debug, Clone)]
pub struct BeautifyOptions {
    /// Spaces per nesting level (default: 2)
    pub indent: usize,
}

impl Default for BeautifyOptions {
    fn default() -> Self {
        Self { indent: 2 }
    }
}

/// Re-indent SVG text with default settings. Unparseable input is returned unchanged.
pub fn beautify(svg: &str) -> String {
    beautify_with_options(svg, &BeautifyOptions::default())
}

/// Re-indent SVG text. Unparseable input is returned unchanged.
pub fn beautify_with_options(svg: &str, options: &BeautifyOptions) -> String {
    match try_beautify(svg, options) {
        Ok(out) => out,
        Err(e) => {
            log::debug!("beautify: leaving input unchanged: {}", e);
            svg.to_string()
        }
    }
}

/// Re-indent SVG text, returning the diagnostic if it cannot be parsed.
pub fn try_beautify(svg: &str, options: &BeautifyOptions) -> Result<String, ParseError> {
    let doc = QuickXmlMarkup.parse(svg)?;
    Ok(render_document(&doc, options))
}

/// Render an already parsed document.
pub fn render_document(doc: &Document, options: &BeautifyOptions) -> String {
    let mut out = String::new();
    Printer {
        out: &mut out,
        indent: options.indent,
    }
    .element(&doc.root, 0);
    out
}

struct Printer<'a> {
    out: &'a mut String,
    indent: usize,
}

impl Printer<'_> {
    fn pad(&mut self, level: usize) {
        self.out
            .extend(std::iter::repeat_n(' ', self.indent * level));
    }

    fn element(&mut self, elem: &Element, level: usize) {
        self.pad(level);
        self.out.push('<');
        self.out.push_str(&elem.name.full_name());

        for attr in &elem.attributes {
            self.out.push(' ');
            self.out.push_str(&attr.name.full_name());
            self.out.push_str("=\"");
            push_escaped_attr(self.out, &attr.value);
            self.out.push('"');
        }

        if elem.children.is_empty() {
            self.out.push_str(" />");
            return;
        }

        self.out.push('>');

        // Children that render nothing (comments, blank text) still keep the
        // element from collapsing into a self-closing tag.
        let mut wrote_child = false;
        for child in &elem.children {
            match child {
                Node::Element(e) => {
                    self.out.push('\n');
                    self.element(e, level + 1);
                    wrote_child = true;
                }
                Node::Text(text) => {
                    let text = text.trim();
                    if !text.is_empty() {
                        self.out.push('\n');
                        self.pad(level + 1);
                        push_escaped_text(self.out, text);
                        wrote_child = true;
                    }
                }
                Node::CData(data) => {
                    self.out.push('\n');
                    self.pad(level + 1);
                    self.out.push_str("<![CDATA[");
                    self.out.push_str(data);
                    self.out.push_str("]]>");
                    wrote_child = true;
                }
                Node::Comment(_) | Node::ProcessingInstruction { .. } => {}
            }
        }

        if wrote_child {
            self.out.push('\n');
            self.pad(level);
        }

        self.out.push_str("</");
        self.out.push_str(&elem.name.full_name());
        self.out.push('>');
    }
}
