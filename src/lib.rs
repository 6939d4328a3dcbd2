//! svgviewer - SVG optimizer, beautifier and converter
//!
//! The optimizer strips comments, empty attributes, over-precise numbers,
//! inter-tag whitespace and the XML declaration. The beautifier re-indents
//! markup. The converter rasterizes SVG and writes PNG, JPEG, WebP or ICO.
//!
//! `optimize` and `beautify` never fail: input that does not parse is
//! returned unchanged. Use `try_optimize`/`try_beautify` to see why.

mod ast;
mod error;
mod export;
mod ico;
mod markup;
mod number;
mod optimize;
mod parse;
mod pretty;
mod raster;
mod serialize;

pub use ast::*;
pub use error::*;
pub use export::*;
pub use ico::*;
pub use markup::*;
pub use number::*;
pub use optimize::*;
pub use parse::*;
pub use pretty::*;
pub use raster::*;
pub use serialize::*;

/// Optimize an SVG string with default settings.
pub fn optimize(svg: &str) -> String {
    optimize_with_options(svg, &Options::default())
}

/// Optimize an SVG string with custom options.
pub fn optimize_with_options(svg: &str, options: &Options) -> String {
    optimize_with_parser(&QuickXmlMarkup, svg, options)
}

/// Optimization options.
#[derive(Debug, Clone)]
pub struct Options {
    /// Fractional digits kept in attribute numbers (default: 2)
    pub precision: u8,
    /// Remove comments
    pub remove_comments: bool,
    /// Remove attributes with an empty value
    pub remove_empty_attrs: bool,
    /// Remove whitespace between tags
    pub collapse_whitespace: bool,
    /// Remove XML declaration
    pub remove_xml_declaration: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            precision: 2,
            remove_comments: true,
            remove_empty_attrs: true,
            collapse_whitespace: true,
            remove_xml_declaration: true,
        }
    }
}
