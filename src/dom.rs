//! Owned document tree parsed from the renderer's XML output.
//!
//! Queries match on local names, so documents serialized in the XHTML
//! namespace can be navigated with plain tag names (`html`, `body`, ...).

use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt::{self, Write as _};
use std::str::FromStr;

use tracing::warn;

use crate::{PhandomError, Result};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Document {
    root: Element,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Element {
    name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    namespace: Option<String>,
    /// Keyed by qualified name: `lang`, `xml:lang`, `xlink:href`.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    attributes: BTreeMap<String, String>,
    /// Prefix to namespace URI for the prefixed attributes above.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    prefixes: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    children: Vec<Node>,
}

const XML_NS: &str = "http://www.w3.org/XML/1998/namespace";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Node {
    Element(Element),
    Text(String),
}

/// Parses renderer output into a [`Document`].
///
/// Empty output is reported as [`PhandomError::EmptyOutput`]: the renderer
/// emits markup even for broken pages, so silence means the renderer itself
/// misbehaved. Anything else that fails to parse is logged in full and
/// reported as [`PhandomError::MalformedOutput`].
pub fn parse(xml: &str) -> Result<Document> {
    if xml.trim().is_empty() {
        return Err(PhandomError::EmptyOutput);
    }

    let options = roxmltree::ParsingOptions {
        allow_dtd: true,
        ..roxmltree::ParsingOptions::default()
    };
    let doc = roxmltree::Document::parse_with_options(xml, options).map_err(|e| {
        warn!(error = %e, output = %xml, "renderer output is not well-formed XML");
        PhandomError::MalformedOutput(e)
    })?;

    Ok(Document {
        root: Element::from_node(doc.root_element()),
    })
}

impl FromStr for Document {
    type Err = PhandomError;

    fn from_str(s: &str) -> Result<Self> {
        parse(s)
    }
}

impl Document {
    /// The document element.
    pub fn root(&self) -> &Element {
        &self.root
    }

    /// Elements matching a simple path.
    ///
    /// Supported forms: `/html/body/p` (absolute, starting at the root),
    /// `//p` (any descendant, including the root) and `//body/p`. A `*`
    /// step matches any element.
    pub fn select(&self, path: &str) -> Vec<&Element> {
        let (descendant, rest) = match path.strip_prefix("//") {
            Some(rest) => (true, rest),
            None => (false, path.trim_start_matches('/')),
        };
        let steps: Vec<&str> = rest.split('/').filter(|s| !s.is_empty()).collect();
        let Some((first, tail)) = steps.split_first() else {
            return Vec::new();
        };

        let mut current: Vec<&Element> = if descendant {
            std::iter::once(&self.root)
                .chain(self.root.descendants())
                .filter(|e| e.matches(first))
                .collect()
        } else if self.root.matches(first) {
            vec![&self.root]
        } else {
            Vec::new()
        };

        for step in tail {
            current = current
                .into_iter()
                .flat_map(|e| e.elements().filter(move |c| c.matches(step)))
                .collect();
        }
        current
    }

    /// First element matching [`Document::select`].
    pub fn select_first(&self, path: &str) -> Option<&Element> {
        self.select(path).into_iter().next()
    }

    pub fn count(&self, path: &str) -> usize {
        self.select(path).len()
    }

    /// First element with the given local name, in document order.
    pub fn find(&self, name: &str) -> Option<&Element> {
        if self.root.matches(name) {
            return Some(&self.root);
        }
        self.root.find(name)
    }

    pub fn find_all(&self, name: &str) -> Vec<&Element> {
        std::iter::once(&self.root)
            .chain(self.root.descendants())
            .filter(|e| e.matches(name))
            .collect()
    }

    /// All text content of the document.
    pub fn text(&self) -> String {
        self.root.text()
    }

    pub fn to_xml(&self) -> String {
        self.root.to_xml()
    }
}

impl Element {
    fn from_node(node: roxmltree::Node<'_, '_>) -> Self {
        let mut attributes = BTreeMap::new();
        let mut prefixes = BTreeMap::new();
        for attr in node.attributes() {
            let key = match attr.namespace() {
                None => attr.name().to_string(),
                Some(ns) => {
                    let prefix = attribute_prefix(node, ns, &prefixes);
                    if prefix != "xml" {
                        prefixes.insert(prefix.clone(), ns.to_string());
                    }
                    format!("{prefix}:{}", attr.name())
                }
            };
            attributes.insert(key, attr.value().to_string());
        }
        let children = node
            .children()
            .filter_map(|child| {
                if child.is_element() {
                    Some(Node::Element(Element::from_node(child)))
                } else if child.is_text() {
                    child.text().map(|t| Node::Text(t.to_string()))
                } else {
                    None
                }
            })
            .collect();

        Self {
            name: node.tag_name().name().to_string(),
            namespace: node.tag_name().namespace().map(str::to_string),
            attributes,
            prefixes,
            children,
        }
    }

    fn matches(&self, step: &str) -> bool {
        step == "*" || self.name == step
    }

    /// Local name, without prefix.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    /// Attribute by qualified name; `attr("lang")` and `attr("xml:lang")`
    /// are different attributes.
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    pub fn attributes(&self) -> &BTreeMap<String, String> {
        &self.attributes
    }

    pub fn children(&self) -> &[Node] {
        &self.children
    }

    /// Child elements, skipping text.
    pub fn elements(&self) -> impl DoubleEndedIterator<Item = &Element> {
        self.children.iter().filter_map(Node::as_element)
    }

    pub fn child(&self, name: &str) -> Option<&Element> {
        self.elements().find(|e| e.matches(name))
    }

    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Element> + 'a {
        self.elements().filter(move |e| e.matches(name))
    }

    /// Descendant elements in document order, excluding `self`.
    pub fn descendants(&self) -> Descendants<'_> {
        Descendants {
            stack: self.elements().rev().collect(),
        }
    }

    pub fn find(&self, name: &str) -> Option<&Element> {
        self.descendants().find(|e| e.matches(name))
    }

    pub fn find_all<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Element> + 'a {
        self.descendants().filter(move |e| e.matches(name))
    }

    /// Concatenated text of this element and all its descendants.
    pub fn text(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        for child in &self.children {
            match child {
                Node::Text(text) => out.push_str(text),
                Node::Element(e) => e.collect_text(out),
            }
        }
    }

    pub fn to_xml(&self) -> String {
        let mut out = String::new();
        self.write_xml(&mut out, None);
        out
    }

    fn write_xml(&self, out: &mut String, parent_ns: Option<&str>) {
        out.push('<');
        out.push_str(&self.name);
        match (self.namespace(), parent_ns) {
            (Some(ns), parent) if parent != Some(ns) => {
                let _ = write!(out, " xmlns=\"{}\"", escape(ns, true));
            }
            (None, Some(_)) => out.push_str(" xmlns=\"\""),
            _ => {}
        }
        for (prefix, uri) in &self.prefixes {
            let _ = write!(out, " xmlns:{}=\"{}\"", prefix, escape(uri, true));
        }
        for (name, value) in &self.attributes {
            let _ = write!(out, " {}=\"{}\"", name, escape(value, true));
        }
        if self.children.is_empty() {
            out.push_str("/>");
            return;
        }
        out.push('>');
        for child in &self.children {
            match child {
                Node::Text(text) => out.push_str(&escape(text, false)),
                Node::Element(e) => e.write_xml(out, self.namespace()),
            }
        }
        let _ = write!(out, "</{}>", self.name);
    }
}

impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_xml())
    }
}

impl Node {
    pub fn as_element(&self) -> Option<&Element> {
        match self {
            Node::Element(e) => Some(e),
            Node::Text(_) => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Node::Text(t) => Some(t),
            Node::Element(_) => None,
        }
    }
}

/// Prefix for a namespaced attribute, inventing `nsN` when the URI is only
/// bound as the default namespace.
fn attribute_prefix(
    node: roxmltree::Node<'_, '_>,
    ns: &str,
    taken: &BTreeMap<String, String>,
) -> String {
    if ns == XML_NS {
        return "xml".to_string();
    }
    if let Some(prefix) = node.lookup_prefix(ns).filter(|p| !p.is_empty()) {
        return prefix.to_string();
    }
    (0..)
        .map(|n| format!("ns{n}"))
        .find(|candidate| taken.get(candidate).map_or(true, |uri| uri == ns))
        .unwrap_or_else(|| "ns".to_string())
}

/// Pre-order iterator over descendant elements.
pub struct Descendants<'a> {
    stack: Vec<&'a Element>,
}

impl<'a> Iterator for Descendants<'a> {
    type Item = &'a Element;

    fn next(&mut self) -> Option<Self::Item> {
        let next = self.stack.pop()?;
        self.stack.extend(next.elements().rev());
        Some(next)
    }
}

fn escape(text: &str, attribute: bool) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' if attribute => out.push_str("&quot;"),
            _ => out.push(ch),
        }
    }
    out
}
