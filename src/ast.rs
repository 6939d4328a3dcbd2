//! Markup document tree

/// A parsed SVG/XML document.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    /// XML declaration (e.g., `<?xml version="1.0" encoding="UTF-8"?>`)
    pub xml_declaration: Option<XmlDeclaration>,
    /// DOCTYPE declaration
    pub doctype: Option<String>,
    /// Comments and processing instructions found before the root element
    pub prolog: Vec<Node>,
    /// The root element
    pub root: Element,
}

/// XML declaration attributes.
#[derive(Debug, Clone, PartialEq)]
pub struct XmlDeclaration {
    pub version: String,
    pub encoding: Option<String>,
    pub standalone: Option<bool>,
}

/// An SVG/XML element.
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    /// Element name with optional prefix (e.g., "svg", "svg:rect")
    pub name: QName,
    /// Attributes in document order, unique by full name
    pub attributes: Vec<Attribute>,
    /// Child nodes
    pub children: Vec<Node>,
}

/// A qualified name (possibly with namespace prefix).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QName {
    /// Namespace prefix (e.g., "svg", "xlink")
    pub prefix: Option<String>,
    /// Local name (e.g., "rect", "href")
    pub local: String,
}

impl QName {
    pub fn new(local: impl Into<String>) -> Self {
        Self {
            prefix: None,
            local: local.into(),
        }
    }

    pub fn with_prefix(prefix: impl Into<String>, local: impl Into<String>) -> Self {
        Self {
            prefix: Some(prefix.into()),
            local: local.into(),
        }
    }

    /// Parse a qualified name from a string like "prefix:local" or just "local".
    pub fn parse(s: &str) -> Self {
        if let Some((prefix, local)) = s.split_once(':') {
            Self::with_prefix(prefix, local)
        } else {
            Self::new(s)
        }
    }

    /// Get the full name as a string.
    pub fn full_name(&self) -> String {
        match &self.prefix {
            Some(p) => format!("{}:{}", p, self.local),
            None => self.local.clone(),
        }
    }

    /// Compare against a name written as "prefix:local" or "local".
    pub fn matches(&self, name: &str) -> bool {
        match (&self.prefix, name.split_once(':')) {
            (Some(p), Some((prefix, local))) => p == prefix && self.local == local,
            (None, None) => self.local == name,
            _ => false,
        }
    }
}

/// An attribute on an element.
#[derive(Debug, Clone, PartialEq)]
pub struct Attribute {
    pub name: QName,
    pub value: String,
}

impl Attribute {
    pub fn new(name: &str, value: impl Into<String>) -> Self {
        Self {
            name: QName::parse(name),
            value: value.into(),
        }
    }
}

/// A node in the document tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    /// An element node
    Element(Element),
    /// A text node, unescaped
    Text(String),
    /// A comment node
    Comment(String),
    /// A CDATA section
    CData(String),
    /// A processing instruction (e.g., `<?xml-stylesheet ... ?>`)
    ProcessingInstruction { target: String, content: Option<String> },
}

impl Element {
    pub fn new(name: &str) -> Self {
        Self {
            name: QName::parse(name),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Get an attribute value by full name (`href` and `xlink:href` are distinct).
    pub fn get_attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|a| a.name.matches(name))
            .map(|a| a.value.as_str())
    }

    /// Set an attribute value, keeping its position if it already exists.
    pub fn set_attr(&mut self, name: &str, value: impl Into<String>) {
        if let Some(attr) = self.attributes.iter_mut().find(|a| a.name.matches(name)) {
            attr.value = value.into();
        } else {
            self.attributes.push(Attribute::new(name, value));
        }
    }

    /// Remove an attribute by full name.
    pub fn remove_attr(&mut self, name: &str) {
        self.attributes.retain(|a| !a.name.matches(name));
    }

    /// Check if this element has a specific local name.
    pub fn is(&self, name: &str) -> bool {
        self.name.local == name
    }

    /// Iterate over child elements only (skip text, comments, etc.).
    pub fn child_elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(|n| match n {
            Node::Element(e) => Some(e),
            _ => None,
        })
    }

    /// Iterate over child elements mutably.
    pub fn child_elements_mut(&mut self) -> impl Iterator<Item = &mut Element> {
        self.children.iter_mut().filter_map(|n| match n {
            Node::Element(e) => Some(e),
            _ => None,
        })
    }
}

impl Document {
    /// Recursively visit all elements in the document.
    pub fn for_each_element(&self, mut f: impl FnMut(&Element)) {
        fn visit(elem: &Element, f: &mut impl FnMut(&Element)) {
            f(elem);
            for child in elem.child_elements() {
                visit(child, f);
            }
        }
        visit(&self.root, &mut f);
    }

    /// Recursively visit all elements mutably.
    pub fn for_each_element_mut(&mut self, mut f: impl FnMut(&mut Element)) {
        fn visit(elem: &mut Element, f: &mut impl FnMut(&mut Element)) {
            f(elem);
            for child in elem.child_elements_mut() {
                visit(child, f);
            }
        }
        visit(&mut self.root, &mut f);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_qname_matches_prefix_exactly() {
        let href = QName::parse("xlink:href");
        assert!(href.matches("xlink:href"));
        assert!(!href.matches("href"));
        assert!(QName::parse("href").matches("href"));
    }

    #[test]
    fn test_set_attr_keeps_position() {
        let mut rect = Element::new("rect");
        rect.set_attr("x", "1");
        rect.set_attr("y", "2");
        rect.set_attr("x", "3");
        let names: Vec<_> = rect.attributes.iter().map(|a| a.name.full_name()).collect();
        assert_eq!(names, ["x", "y"]);
        assert_eq!(rect.get_attr("x"), Some("3"));
    }

    #[test]
    fn test_remove_attr_leaves_prefixed_twin() {
        let mut use_el = Element::new("use");
        use_el.set_attr("href", "#a");
        use_el.set_attr("xlink:href", "#b");
        use_el.remove_attr("href");
        assert_eq!(use_el.get_attr("href"), None);
        assert_eq!(use_el.get_attr("xlink:href"), Some("#b"));
    }
}
