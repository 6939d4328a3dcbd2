//! SVG parsing from XML.
//!
//! quick-xml checks tag balance, attribute syntax, comments and entity
//! references. The rest of the well-formedness rules that matter for a
//! faithful round trip (declaration placement, names, namespace prefixes,
//! raw `<` in attribute values and `]]>` in text) are enforced here.

use quick_xml::Reader;
use quick_xml::events::{BytesStart, BytesText, Event};

use crate::ast::*;
use crate::error::ParseError;

/// Outcome of parsing: a document, or the diagnostic explaining why not.
pub type ParseResult = Result<Document, ParseError>;

/// Parse an SVG string into a Document.
///
/// Text nodes are kept verbatim (including whitespace-only ones) so that
/// serializing the result reproduces the input structure.
pub fn parse_svg(svg: &str) -> ParseResult {
    let mut reader = Reader::from_str(svg.trim_start_matches('\u{feff}'));
    reader.config_mut().check_comments = true;

    let mut scope = NamespaceScope::default();
    let mut xml_declaration = None;
    let mut doctype = None;
    let mut prolog = Vec::new();
    let mut root = None;

    loop {
        let offset = reader.buffer_position();
        match reader.read_event()? {
            Event::Decl(decl) => {
                if offset != 0 {
                    return Err(ParseError::InvalidSvg(
                        "XML declaration must be at the start of the document".into(),
                    ));
                }
                xml_declaration = Some(XmlDeclaration {
                    version: String::from_utf8_lossy(decl.version()?.as_ref()).into_owned(),
                    encoding: decl
                        .encoding()
                        .transpose()
                        .ok()
                        .flatten()
                        .map(|e| String::from_utf8_lossy(e.as_ref()).into_owned()),
                    standalone: decl.standalone().transpose().ok().flatten().map(|s| {
                        let s = String::from_utf8_lossy(s.as_ref());
                        s == "yes"
                    }),
                });
            }
            Event::DocType(dt) => {
                if doctype.is_some() {
                    return Err(ParseError::InvalidSvg("Multiple DOCTYPE declarations".into()));
                }
                doctype = Some(String::from_utf8_lossy(&dt).into_owned());
            }
            Event::Start(start) => {
                root = Some(parse_element(&mut reader, &start, &mut scope)?);
                break;
            }
            Event::Empty(start) => {
                root = Some(parse_empty_element(&start, &mut scope)?);
                break;
            }
            Event::Comment(comment) => {
                prolog.push(Node::Comment(
                    String::from_utf8_lossy(&comment).into_owned(),
                ));
            }
            Event::PI(pi) => {
                prolog.push(parse_pi(&String::from_utf8_lossy(&pi))?);
            }
            Event::Text(text) => {
                if !text.unescape()?.trim().is_empty() {
                    return Err(ParseError::InvalidSvg(
                        "Text content before root element".into(),
                    ));
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    let root = root.ok_or_else(|| ParseError::InvalidSvg("No root element found".into()))?;

    // Whatever follows the root must be misc content only.
    loop {
        match reader.read_event()? {
            Event::Eof => break,
            Event::Start(_) | Event::Empty(_) => {
                return Err(ParseError::InvalidSvg(
                    "Multiple root elements".into(),
                ));
            }
            Event::Text(text) => {
                if !text.unescape()?.trim().is_empty() {
                    return Err(ParseError::InvalidSvg(
                        "Text content after root element".into(),
                    ));
                }
            }
            Event::PI(pi) => {
                parse_pi(&String::from_utf8_lossy(&pi))?;
            }
            Event::CData(_) | Event::DocType(_) | Event::Decl(_) => {
                return Err(ParseError::InvalidSvg(
                    "Unexpected content after root element".into(),
                ));
            }
            _ => {}
        }
    }

    Ok(Document {
        xml_declaration,
        doctype,
        prolog,
        root,
    })
}

/// Namespace prefixes declared by the currently open elements, innermost last.
#[derive(Debug, Default)]
struct NamespaceScope {
    prefixes: Vec<String>,
}

impl NamespaceScope {
    fn is_bound(&self, prefix: &str) -> bool {
        prefix == "xml" || self.prefixes.iter().any(|p| p == prefix)
    }
}

fn parse_element(
    reader: &mut Reader<&[u8]>,
    start: &BytesStart,
    scope: &mut NamespaceScope,
) -> Result<Element, ParseError> {
    let mark = scope.prefixes.len();
    let mut element = parse_element_start(start, scope)?;

    loop {
        match reader.read_event()? {
            Event::Start(start) => {
                element
                    .children
                    .push(Node::Element(parse_element(reader, &start, scope)?));
            }
            Event::Empty(start) => {
                element
                    .children
                    .push(Node::Element(parse_empty_element(&start, scope)?));
            }
            Event::End(_) => {
                break;
            }
            Event::Text(text) => {
                check_text(&text)?;
                element.children.push(Node::Text(text.unescape()?.into_owned()));
            }
            Event::Comment(comment) => {
                element
                    .children
                    .push(Node::Comment(String::from_utf8_lossy(&comment).into_owned()));
            }
            Event::CData(cdata) => {
                element
                    .children
                    .push(Node::CData(String::from_utf8_lossy(&cdata).into_owned()));
            }
            Event::PI(pi) => {
                element
                    .children
                    .push(parse_pi(&String::from_utf8_lossy(&pi))?);
            }
            Event::Decl(_) | Event::DocType(_) => {
                return Err(ParseError::InvalidSvg(format!(
                    "Declaration inside <{}>",
                    element.name.full_name()
                )));
            }
            Event::Eof => {
                return Err(ParseError::InvalidSvg(format!(
                    "Unexpected end of file, <{}> is not closed",
                    element.name.full_name()
                )));
            }
        }
    }

    scope.prefixes.truncate(mark);
    Ok(element)
}

fn parse_empty_element(start: &BytesStart, scope: &mut NamespaceScope) -> Result<Element, ParseError> {
    let mark = scope.prefixes.len();
    let element = parse_element_start(start, scope)?;
    scope.prefixes.truncate(mark);
    Ok(element)
}

/// Build the element from its start tag and push the prefixes it declares.
fn parse_element_start(start: &BytesStart, scope: &mut NamespaceScope) -> Result<Element, ParseError> {
    let name_bytes = start.name();
    let name = std::str::from_utf8(name_bytes.as_ref())?;
    check_qname(name)?;

    let mut element = Element {
        name: QName::parse(name),
        attributes: Vec::new(),
        children: Vec::new(),
    };

    // Attribute checks are on by default, so duplicates are rejected here.
    for attr in start.attributes() {
        let attr = attr.map_err(|e| ParseError::InvalidSvg(format!("Invalid attribute: {}", e)))?;
        let key = std::str::from_utf8(attr.key.as_ref())?;
        check_qname(key)?;
        if attr.value.contains(&b'<') {
            return Err(ParseError::InvalidSvg(format!(
                "Unescaped '<' in the value of '{}'",
                key
            )));
        }
        if let Some(prefix) = key.strip_prefix("xmlns:") {
            scope.prefixes.push(prefix.to_string());
        }
        let value = attr.unescape_value()?;
        element.attributes.push(Attribute {
            name: QName::parse(key),
            value: value.into_owned(),
        });
    }

    check_prefix(&element.name, scope)?;
    for attr in &element.attributes {
        if attr.name.prefix.as_deref() != Some("xmlns") {
            check_prefix(&attr.name, scope)?;
        }
    }

    Ok(element)
}

fn check_prefix(name: &QName, scope: &NamespaceScope) -> Result<(), ParseError> {
    match &name.prefix {
        Some(prefix) if !scope.is_bound(prefix) => Err(ParseError::InvalidSvg(format!(
            "Namespace prefix '{}' is not declared",
            prefix
        ))),
        _ => Ok(()),
    }
}

/// Character data may not contain the CDATA terminator.
fn check_text(text: &BytesText) -> Result<(), ParseError> {
    if text.windows(3).any(|w| w == b"]]>") {
        return Err(ParseError::InvalidSvg("']]>' in text content".into()));
    }
    Ok(())
}

/// `prefix:local` or `local`, where both parts are XML names without colons.
fn check_qname(name: &str) -> Result<(), ParseError> {
    let valid = match name.split_once(':') {
        Some((prefix, local)) => is_ncname(prefix) && is_ncname(local),
        None => is_ncname(name),
    };
    if valid {
        Ok(())
    } else {
        Err(ParseError::InvalidSvg(format!("Invalid name '{}'", name)))
    }
}

fn is_ncname(name: &str) -> bool {
    let mut chars = name.chars();
    chars.next().is_some_and(is_name_start_char) && chars.all(is_name_char)
}

fn is_name_start_char(c: char) -> bool {
    matches!(c,
        'A'..='Z' | '_' | 'a'..='z'
        | '\u{C0}'..='\u{D6}'
        | '\u{D8}'..='\u{F6}'
        | '\u{F8}'..='\u{2FF}'
        | '\u{370}'..='\u{37D}'
        | '\u{37F}'..='\u{1FFF}'
        | '\u{200C}'..='\u{200D}'
        | '\u{2070}'..='\u{218F}'
        | '\u{2C00}'..='\u{2FEF}'
        | '\u{3001}'..='\u{D7FF}'
        | '\u{F900}'..='\u{FDCF}'
        | '\u{FDF0}'..='\u{FFFD}'
        | '\u{10000}'..='\u{EFFFF}')
}

fn is_name_char(c: char) -> bool {
    is_name_start_char(c)
        || matches!(c,
            '-' | '.' | '0'..='9' | '\u{B7}'
            | '\u{300}'..='\u{36F}'
            | '\u{203F}'..='\u{2040}')
}

fn parse_pi(content: &str) -> Result<Node, ParseError> {
    let (target, rest) = content
        .split_once(char::is_whitespace)
        .map(|(t, r)| (t.to_string(), Some(r.trim_start().to_string())))
        .unwrap_or_else(|| (content.to_string(), None));
    if !is_ncname(&target) || target.eq_ignore_ascii_case("xml") {
        return Err(ParseError::InvalidSvg(format!(
            "Invalid processing instruction target '{}'",
            target
        )));
    }
    Ok(Node::ProcessingInstruction {
        target,
        content: rest,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_svg() {
        let svg = r#"<?xml version="1.0" encoding="UTF-8"?>
<svg xmlns="http://www.w3.org/2000/svg" width="100" height="100">
    <rect x="10" y="10" width="80" height="80" fill="red"/>
</svg>"#;

        let doc = parse_svg(svg).unwrap();
        let decl = doc.xml_declaration.unwrap();
        assert_eq!(decl.version, "1.0");
        assert_eq!(decl.encoding.as_deref(), Some("UTF-8"));
        assert!(doc.root.is("svg"));
        assert_eq!(doc.root.get_attr("width"), Some("100"));
    }

    #[test]
    fn test_parse_with_comments() {
        let svg = r#"<svg xmlns="http://www.w3.org/2000/svg">
    <!-- This is a comment -->
    <rect/>
</svg>"#;

        let doc = parse_svg(svg).unwrap();
        let comments: Vec<_> = doc
            .root
            .children
            .iter()
            .filter(|n| matches!(n, Node::Comment(_)))
            .collect();
        assert_eq!(comments.len(), 1);
    }

    #[test]
    fn test_parse_keeps_whitespace_text() {
        let doc = parse_svg("<svg>  <rect/>  </svg>").unwrap();
        assert_eq!(doc.root.children.len(), 3);
        assert_eq!(doc.root.children[0], Node::Text("  ".into()));
    }

    #[test]
    fn test_parse_namespaced() {
        let svg = r##"<svg xmlns="http://www.w3.org/2000/svg" xmlns:xlink="http://www.w3.org/1999/xlink">
    <use href="#a" xlink:href="#foo"/>
</svg>"##;

        let doc = parse_svg(svg).unwrap();
        let use_el = doc.root.child_elements().next().unwrap();
        assert_eq!(use_el.get_attr("href"), Some("#a"));
        assert_eq!(use_el.get_attr("xlink:href"), Some("#foo"));
    }

    #[test]
    fn test_parse_unescapes_entities() {
        let doc = parse_svg(r#"<svg><text a="x &amp; y">1 &lt; 2</text></svg>"#).unwrap();
        let text = doc.root.child_elements().next().unwrap();
        assert_eq!(text.get_attr("a"), Some("x & y"));
        assert_eq!(text.children[0], Node::Text("1 < 2".into()));
    }

    #[test]
    fn test_parse_prolog_comment_and_pi() {
        let svg = r#"<?xml-stylesheet href="a.css"?><!-- hi --><svg/>"#;
        let doc = parse_svg(svg).unwrap();
        assert_eq!(doc.prolog.len(), 2);
        assert!(matches!(
            &doc.prolog[0],
            Node::ProcessingInstruction { target, .. } if target == "xml-stylesheet"
        ));
    }

    #[test]
    fn test_parse_errors() {
        assert!(parse_svg("").is_err());
        assert!(parse_svg("not markup").is_err());
        assert!(parse_svg("<svg><rect></svg>").is_err());
        assert!(parse_svg("<svg>").is_err());
        assert!(parse_svg(r#"<svg a="1" a="2"/>"#).is_err());
        assert!(parse_svg("<svg/><svg/>").is_err());
        assert!(parse_svg("<svg/>trailing").is_err());
        assert!(parse_svg("<svg>&nbsp;</svg>").is_err());
    }

    #[test]
    fn test_parse_rejects_misplaced_declarations() {
        assert!(parse_svg("  <?xml version=\"1.0\"?><svg/>").is_err());
        assert!(parse_svg("<?xml version=\"1.0\"?><?xml version=\"1.0\"?><svg/>").is_err());
        assert!(parse_svg("<svg><?xml version=\"1.0\"?></svg>").is_err());
        assert!(parse_svg("<?XML version=\"1.0\"?><svg/>").is_err());
        assert!(parse_svg("\u{feff}<?xml version=\"1.0\"?><svg/>").is_ok());
    }

    #[test]
    fn test_parse_rejects_bad_character_data() {
        assert!(parse_svg(r#"<svg a="<"/>"#).is_err());
        assert!(parse_svg(r#"<svg a="&lt;"/>"#).is_ok());
        assert!(parse_svg("<svg><!-- a -- b --></svg>").is_err());
        assert!(parse_svg("<svg><!-- a ---></svg>").is_err());
        assert!(parse_svg("<!-- a -- b --><svg/>").is_err());
        assert!(parse_svg("<svg>]]></svg>").is_err());
        assert!(parse_svg("<svg>]]&gt;</svg>").is_ok());
    }

    #[test]
    fn test_parse_rejects_invalid_names() {
        assert!(parse_svg("<svg><1rect/></svg>").is_err());
        assert!(parse_svg(r#"<svg 2x="1"/>"#).is_err());
        assert!(parse_svg("<svg><a:b:c/></svg>").is_err());
        assert!(parse_svg(r#"<svg xmlns:a="x"><a:/></svg>"#).is_err());
        assert!(parse_svg("<svg><g-1 data-x.y=\"1\" _z=\"2\"/></svg>").is_ok());
    }

    #[test]
    fn test_parse_namespace_prefixes_must_be_declared() {
        assert!(parse_svg("<svg><a:b/></svg>").is_err());
        assert!(parse_svg(r#"<svg><use xlink:href="x"/></svg>"#).is_err());
        assert!(parse_svg(r#"<svg xmlns:a="urn:a"><a:b/></svg>"#).is_ok());
        assert!(parse_svg(r#"<a:svg xmlns:a="urn:a"/>"#).is_ok());
        assert!(parse_svg(r#"<svg xml:space="preserve"/>"#).is_ok());
        // A declaration only covers the element that makes it.
        assert!(parse_svg(r#"<svg><g xmlns:a="urn:a"/><a:b/></svg>"#).is_err());
        assert!(parse_svg(r#"<svg><g xmlns:a="urn:a"><a:b/></g></svg>"#).is_ok());
    }
}
